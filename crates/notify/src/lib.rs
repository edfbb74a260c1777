//! Chat delivery for the run-rate cost report.
//!
//! This crate wraps a rendered report in a chat payload and posts it to the
//! configured webhooks. Delivery is awaited and any failure is returned to
//! the caller, so a failed send fails the run.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use run_rate_notify::{NotifyChannel, Notifier, ReportMessage, SlackChannel};
//!
//! # async fn run() -> Result<(), run_rate_notify::NotifyError> {
//! let channels: Vec<Arc<dyn NotifyChannel>> = vec![Arc::new(SlackChannel::new(
//!     "https://hooks.slack.com/services/T000/B000/XXXX",
//! ))];
//! let notifier = Notifier::with_channels(channels);
//!
//! notifier
//!     .send(&ReportMessage::new("AWS Run Rate", "Account  Day  Month"))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`NotifyChannel`] trait defines the interface for notification channels
//! - [`SlackChannel`] implements Slack incoming webhooks
//! - [`Notifier`] delivers a message to every configured channel

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod error;
pub mod message;

pub use channels::slack::{SlackChannel, SlackPayload};
pub use channels::NotifyChannel;
pub use error::NotifyError;
pub use message::{ReportMessage, DEFAULT_TITLE};

use std::sync::Arc;
use tracing::{info, warn};

/// Report dispatcher.
///
/// Sends a message to each channel in order and stops at the first failure.
pub struct Notifier {
    channels: Vec<Arc<dyn NotifyChannel>>,
    dry_run: bool,
}

impl Notifier {
    /// Create a notifier with specific channels.
    #[must_use]
    pub fn with_channels(channels: Vec<Arc<dyn NotifyChannel>>) -> Self {
        Self {
            channels,
            dry_run: false,
        }
    }

    /// Create a notifier that logs messages instead of sending them.
    #[must_use]
    pub fn dry_run() -> Self {
        Self {
            channels: vec![],
            dry_run: true,
        }
    }

    /// Whether this notifier only logs.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Get the number of channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Deliver `message` to every channel.
    ///
    /// # Errors
    ///
    /// Returns the first channel failure. A channel that is not configured
    /// (e.g. an empty webhook URL) is still attempted so the transport error
    /// surfaces.
    pub async fn send(&self, message: &ReportMessage) -> Result<(), NotifyError> {
        if self.dry_run {
            info!(title = %message.title, "Dry run, not sending report");
            return Ok(());
        }

        if self.channels.is_empty() {
            return Err(NotifyError::NotConfigured(
                "no notification channels".to_string(),
            ));
        }

        for channel in &self.channels {
            let channel_name = channel.name();

            if !channel.enabled() {
                warn!(
                    channel = channel_name,
                    "Channel has no destination configured, send will fail"
                );
            }

            channel.send(message).await?;
            info!(channel = channel_name, "Report sent");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingChannel {
        sent: AtomicUsize,
        fail: bool,
        enabled: bool,
    }

    impl CountingChannel {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                sent: AtomicUsize::new(0),
                fail,
                enabled: true,
            })
        }

        fn unconfigured() -> Arc<Self> {
            Arc::new(Self {
                sent: AtomicUsize::new(0),
                fail: true,
                enabled: false,
            })
        }
    }

    #[async_trait]
    impl NotifyChannel for CountingChannel {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn enabled(&self) -> bool {
            self.enabled
        }

        async fn send(&self, _message: &ReportMessage) -> Result<(), NotifyError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(NotifyError::NotConfigured("counting".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn message() -> ReportMessage {
        ReportMessage::new(DEFAULT_TITLE, "table")
    }

    #[tokio::test]
    async fn test_sends_to_every_channel() {
        let first = CountingChannel::new(false);
        let second = CountingChannel::new(false);
        let channels: Vec<Arc<dyn NotifyChannel>> = vec![first.clone(), second.clone()];
        let notifier = Notifier::with_channels(channels);

        notifier.send(&message()).await.unwrap();
        assert_eq!(notifier.channel_count(), 2);
        assert_eq!(first.sent.load(Ordering::SeqCst), 1);
        assert_eq!(second.sent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stops_at_first_failure() {
        let failing = CountingChannel::new(true);
        let after = CountingChannel::new(false);
        let channels: Vec<Arc<dyn NotifyChannel>> = vec![failing.clone(), after.clone()];
        let notifier = Notifier::with_channels(channels);

        assert!(notifier.send(&message()).await.is_err());
        assert_eq!(after.sent.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unconfigured_channel_is_still_attempted() {
        let unconfigured = CountingChannel::unconfigured();
        let channels: Vec<Arc<dyn NotifyChannel>> = vec![unconfigured.clone()];
        let notifier = Notifier::with_channels(channels);

        assert!(notifier.send(&message()).await.is_err());
        assert_eq!(unconfigured.sent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dry_run_sends_nothing() {
        let notifier = Notifier::dry_run();
        assert!(notifier.is_dry_run());
        notifier.send(&message()).await.unwrap();
    }

    #[tokio::test]
    async fn test_no_channels_is_an_error() {
        let notifier = Notifier::with_channels(vec![]);
        assert!(matches!(
            notifier.send(&message()).await,
            Err(NotifyError::NotConfigured(_))
        ));
    }
}
