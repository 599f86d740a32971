//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//! This crate contains the storage backends and mail transports.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL storage via SeaORM
//! - `webhook-mail` - Mail delivery through an HTTP relay via reqwest

pub mod database;
pub mod mail;

// Re-exports - In-Memory
pub use database::{DatabaseConfig, InMemoryStore};
pub use mail::ConsoleMailer;

#[cfg(feature = "postgres")]
pub use database::DatabaseConnections;

#[cfg(feature = "webhook-mail")]
pub use mail::WebhookMailer;
