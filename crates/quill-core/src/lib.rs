//! # Quill Core
//!
//! The domain layer of the Quill blog.
//! This crate contains the publishing rules and post discovery logic
//! with zero infrastructure dependencies.

pub mod discovery;
pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;
pub mod service;

pub use error::DomainError;
pub use service::{BlogConfig, BlogService, Repositories};
