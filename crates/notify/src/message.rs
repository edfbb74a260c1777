//! Report message content.

/// Default bold title line.
pub const DEFAULT_TITLE: &str = "AWS Run Rate";

/// A titled preformatted report, ready to hand to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMessage {
    /// Title rendered in bold above the body.
    pub title: String,
    /// Preformatted body (the rendered table).
    pub body: String,
}

impl ReportMessage {
    /// Create a new message.
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Render as Slack `mrkdwn`: bold title, then the body in a code fence.
    #[must_use]
    pub fn to_mrkdwn(&self) -> String {
        format!("*{}*\n```{}```", self.title, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mrkdwn_wraps_body_in_code_fence() {
        let message = ReportMessage::new(DEFAULT_TITLE, "Account  Cost\nAlpha    1.00");
        assert_eq!(
            message.to_mrkdwn(),
            "*AWS Run Rate*\n```Account  Cost\nAlpha    1.00```"
        );
    }
}
