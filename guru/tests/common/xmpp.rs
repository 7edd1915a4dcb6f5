use async_trait::async_trait;
use std::sync::Mutex;

use crowdguru::error::{AppError, AppResult};
use crowdguru::xmpp::XmppSender;

/// A message captured instead of delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub recipients: Vec<String>,
    pub body: String,
}

/// XmppSender that records outbound messages for assertions
#[derive(Default)]
pub struct CapturingSender {
    sent: Mutex<Vec<SentMessage>>,
}

#[allow(dead_code)]
impl CapturingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured messages, in send order
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Bodies of every message addressed to `jid`, in send order
    pub fn sent_to(&self, jid: &str) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|message| message.recipients.iter().any(|r| r == jid))
            .map(|message| message.body.clone())
            .collect()
    }

    /// The most recent message addressed to `jid`, if any
    pub fn last_sent_to(&self, jid: &str) -> Option<String> {
        self.sent_to(jid).pop()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl XmppSender for CapturingSender {
    async fn send_message(&self, recipients: &[String], body: &str) -> AppResult<()> {
        self.sent.lock().unwrap().push(SentMessage {
            recipients: recipients.to_vec(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// XmppSender whose every delivery fails, for exercising the
/// log-and-continue path
#[derive(Default)]
pub struct FailingSender {
    attempted: Mutex<Vec<SentMessage>>,
}

#[allow(dead_code)]
impl FailingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delivery that was attempted, in send order
    pub fn attempted(&self) -> Vec<SentMessage> {
        self.attempted.lock().unwrap().clone()
    }
}

#[async_trait]
impl XmppSender for FailingSender {
    async fn send_message(&self, recipients: &[String], body: &str) -> AppResult<()> {
        self.attempted.lock().unwrap().push(SentMessage {
            recipients: recipients.to_vec(),
            body: body.to_string(),
        });
        Err(AppError::Internal("delivery refused".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_capture_and_filter() {
        let sender = CapturingSender::new();

        sender
            .send_message(&["alice@example.com".to_string()], "first")
            .await
            .unwrap();
        sender
            .send_message(
                &["bob@example.com".to_string(), "alice@example.com".to_string()],
                "second",
            )
            .await
            .unwrap();

        assert_eq!(sender.sent().len(), 2);
        assert_eq!(sender.sent_to("alice@example.com"), vec!["first", "second"]);
        assert_eq!(sender.sent_to("bob@example.com"), vec!["second"]);
        assert_eq!(sender.last_sent_to("bob@example.com").unwrap(), "second");
        assert!(sender.sent_to("carol@example.com").is_empty());
    }

    #[actix_rt::test]
    async fn test_failing_sender_errors_but_records() {
        let sender = FailingSender::new();

        let result = sender
            .send_message(&["alice@example.com".to_string()], "hello")
            .await;

        assert!(result.is_err());
        assert_eq!(sender.attempted().len(), 1);
        assert_eq!(sender.attempted()[0].body, "hello");
    }
}
