//! Slack incoming-webhook channel.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::NotifyError;
use crate::message::ReportMessage;
use crate::NotifyChannel;

/// Slack webhook notification channel.
pub struct SlackChannel {
    webhook_url: String,
    require_success: bool,
    client: reqwest::Client,
}

impl SlackChannel {
    /// Create a Slack channel posting to `webhook_url`.
    ///
    /// The URL is not validated here; an empty or malformed URL fails when
    /// the message is sent.
    #[must_use]
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            require_success: false,
            client: reqwest::Client::new(),
        }
    }

    /// Treat a non-2xx webhook response as a delivery failure.
    ///
    /// Off by default: the response status is only logged.
    #[must_use]
    pub fn require_success(mut self, require_success: bool) -> Self {
        self.require_success = require_success;
        self
    }

    /// Format a report as a Slack webhook payload.
    #[must_use]
    pub fn format_payload(message: &ReportMessage) -> SlackPayload {
        SlackPayload {
            blocks: vec![SlackBlock {
                block_type: "section".to_string(),
                text: SlackText {
                    text_type: "mrkdwn".to_string(),
                    text: message.to_mrkdwn(),
                },
            }],
        }
    }
}

#[async_trait]
impl NotifyChannel for SlackChannel {
    fn name(&self) -> &'static str {
        "slack"
    }

    fn enabled(&self) -> bool {
        !self.webhook_url.is_empty()
    }

    async fn send(&self, message: &ReportMessage) -> Result<(), NotifyError> {
        let body = serde_json::to_vec(&Self::format_payload(message))?;

        debug!(channel = "slack", bytes = body.len(), "Sending report");

        let response = self
            .client
            .post(&self.webhook_url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(channel = "slack", status = %status, "Report delivered");
            return Ok(());
        }

        let body = response_body(response).await;
        warn!(
            channel = "slack",
            status = %status,
            body = %body,
            "Slack webhook returned a non-success status"
        );

        if self.require_success {
            Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            })
        } else {
            Ok(())
        }
    }
}

/// Read a webhook response body for diagnostics, empty if it cannot be read.
async fn response_body(response: reqwest::Response) -> String {
    response.text().await.unwrap_or_else(|e| {
        debug!(channel = "slack", error = %e, "Failed to read webhook response body");
        String::new()
    })
}

// =============================================================================
// Slack API types
// =============================================================================

/// Slack webhook request body.
#[derive(Debug, Serialize)]
pub struct SlackPayload {
    pub blocks: Vec<SlackBlock>,
}

/// A Block Kit block.
#[derive(Debug, Serialize)]
pub struct SlackBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: SlackText,
}

/// A Block Kit text object.
#[derive(Debug, Serialize)]
pub struct SlackText {
    #[serde(rename = "type")]
    pub text_type: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn message() -> ReportMessage {
        ReportMessage::new("AWS Run Rate", "Account  Cost\nAlpha   10.00")
    }

    #[test]
    fn test_payload_shape() {
        let payload = serde_json::to_value(SlackChannel::format_payload(&message())).unwrap();
        assert_eq!(
            payload,
            json!({
                "blocks": [{
                    "type": "section",
                    "text": {
                        "type": "mrkdwn",
                        "text": "*AWS Run Rate*\n```Account  Cost\nAlpha   10.00```"
                    }
                }]
            })
        );
    }

    #[test]
    fn test_empty_url_is_not_enabled() {
        assert!(!SlackChannel::new("").enabled());
        assert!(SlackChannel::new("https://hooks.slack.com/services/T/B/X").enabled());
    }

    #[tokio::test]
    async fn test_posts_json_to_webhook() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/hook"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "blocks": [{
                    "type": "section",
                    "text": {
                        "type": "mrkdwn",
                        "text": "*AWS Run Rate*\n```Account  Cost\nAlpha   10.00```"
                    }
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let channel = SlackChannel::new(format!("{}/services/hook", server.uri()));
        channel.send(&message()).await.unwrap();
    }

    // The webhook status is not checked unless asked for; a 500 still counts
    // as delivered.
    #[tokio::test]
    async fn test_error_status_ignored_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("invalid_payload"))
            .mount(&server)
            .await;

        let channel = SlackChannel::new(server.uri());
        assert!(channel.send(&message()).await.is_ok());
    }

    #[tokio::test]
    async fn test_error_status_rejected_when_required() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no_service"))
            .mount(&server)
            .await;

        let channel = SlackChannel::new(server.uri()).require_success(true);
        let err = channel.send(&message()).await.unwrap_err();
        assert!(matches!(
            err,
            NotifyError::Rejected { status: 404, ref body } if body == "no_service"
        ));
    }

    #[tokio::test]
    async fn test_rejected_with_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let channel = SlackChannel::new(server.uri()).require_success(true);
        let err = channel.send(&message()).await.unwrap_err();
        assert!(matches!(
            err,
            NotifyError::Rejected { status: 403, ref body } if body.is_empty()
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_is_an_error() {
        let channel = SlackChannel::new("http://127.0.0.1:9/unreachable");
        let err = channel.send(&message()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Http(_)));
    }

    #[tokio::test]
    async fn test_empty_url_fails_at_send_time() {
        let err = SlackChannel::new("").send(&message()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Http(_)));
    }
}
