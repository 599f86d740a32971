//! Outbound e-mail port.

use async_trait::async_trait;
use serde::Serialize;

/// A fully composed message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMail {
    pub subject: String,
    pub body: String,
    pub from: String,
    pub to: Vec<String>,
}

/// Mail transport trait - abstraction over delivery backends.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Hand the message to the transport. Acceptance is not delivery.
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

/// Mail transport errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Transport failed: {0}")]
    Transport(String),

    #[error("Message rejected: {0}")]
    Rejected(String),
}
