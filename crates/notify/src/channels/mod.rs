//! Notification channel implementations.

pub mod slack;

use async_trait::async_trait;

use crate::error::NotifyError;
use crate::message::ReportMessage;

/// Trait for notification channels (Slack, etc.).
#[async_trait]
pub trait NotifyChannel: Send + Sync {
    /// Get the name of this channel.
    fn name(&self) -> &'static str;

    /// Check if this channel is configured.
    fn enabled(&self) -> bool;

    /// Deliver a report message to this channel.
    async fn send(&self, message: &ReportMessage) -> Result<(), NotifyError>;
}
