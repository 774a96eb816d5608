use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl MailMessage {
    pub fn verification_code(from: &str, to: &str, code: i32) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            subject: "Account verification mail".to_string(),
            body: format!("Your OTP is {}", code),
        }
    }
}

/// Outbound mail transport. Delivery is best effort; no receipt is consumed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<()>;
}

/// Records that a message was dropped. Used when no relay is configured; the
/// code itself is never logged, so no-relay deployments cannot verify accounts.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "mail relay not configured, message not delivered"
        );
        Ok(())
    }
}

/// Posts messages as JSON to an HTTP mail relay.
#[derive(Clone)]
pub struct HttpMailer {
    client: Client,
    relay_url: String,
}

impl HttpMailer {
    pub fn new(relay_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, relay_url })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        let resp = self
            .client
            .post(&self.relay_url)
            .json(message)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Internal(format!(
                "mail relay answered {}: {}",
                status, body
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_mail_embeds_the_code() {
        let message = MailMessage::verification_code("no-reply@quizbit.local", "a@b.io", 4321);
        assert_eq!(message.subject, "Account verification mail");
        assert_eq!(message.body, "Your OTP is 4321");
        assert_eq!(message.to, "a@b.io");
    }

    #[tokio::test]
    async fn log_mailer_drops_messages_without_failing() {
        let message = MailMessage::verification_code("no-reply@quizbit.local", "a@b.io", 4321);
        assert!(LogMailer.send(&message).await.is_ok());
    }
}
