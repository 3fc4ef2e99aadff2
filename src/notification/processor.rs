//! # Notification Processors
//!
//! A processor is the object that knows how to execute a notification: it
//! takes the event that fired and the notification instance, renders
//! whatever the channel needs and performs the delivery. Delivery itself
//! (SMTP, webhooks, chat APIs) lives in processor implementations outside
//! this core; the trait only fixes the async execution seam and the
//! ownership link back to the notification type.
//!
//! Concrete processor types are registered with the
//! [`TypeRegistry`](crate::registry::TypeRegistry) carrying the abstract
//! base [`crate::constants::types::PROCESSOR_BASE`] in their supertype
//! chain; the factory enforces that chain before constructing one.

use crate::error::Result;
use crate::event::Event;
use crate::notification::Notification;
use crate::registry::TypeIdentifier;
use async_trait::async_trait;
use std::fmt::Debug;

/// Executes notifications of one notification type.
///
/// At most one processor instance exists per resolved notification type for
/// the process lifetime; implementations must therefore be stateless or
/// internally synchronized.
#[async_trait]
pub trait NotificationProcessor: Send + Sync + Debug {
    /// Identifier of the notification type this processor was constructed
    /// for.
    fn notification_type(&self) -> &TypeIdentifier;

    /// Execute the notification for the event that fired.
    ///
    /// Timeout and retry policy belong to the implementation; resolution
    /// never suspends, only this call does.
    async fn process(&self, event: &dyn Event, notification: &dyn Notification) -> Result<()>;
}
