//! Webhook mailer - hands messages to an HTTP mail API.

use async_trait::async_trait;

use quill_core::ports::{MailError, Mailer, OutgoingMail};

/// POSTs each message as JSON to a mail relay endpoint.
pub struct WebhookMailer {
    url: String,
    client: reqwest::Client,
}

impl WebhookMailer {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Mailer for WebhookMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        let payload = serde_json::json!({
            "from": mail.from,
            "to": mail.to,
            "subject": mail.subject,
            "text": mail.body,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MailError::Rejected(format!("relay answered {}", status)));
        }

        tracing::info!(to = ?mail.to, "Mail handed to relay");
        Ok(())
    }
}
