//! Console mailer - logs messages instead of delivering them.

use async_trait::async_trait;

use quill_core::ports::{MailError, Mailer, OutgoingMail};

/// Writes every message to the log. Used when no mail transport is
/// configured.
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        tracing::info!(
            from = %mail.from,
            to = ?mail.to,
            subject = %mail.subject,
            body = %mail.body,
            "Outgoing mail (console transport)"
        );
        Ok(())
    }
}
