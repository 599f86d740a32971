//! Mail transports - console (development) and HTTP webhook.

mod console;

#[cfg(feature = "webhook-mail")]
mod webhook;

pub use console::ConsoleMailer;

#[cfg(feature = "webhook-mail")]
pub use webhook::WebhookMailer;
