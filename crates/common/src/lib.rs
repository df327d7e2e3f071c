//! Shared utilities, configuration, and error handling for ChatAI
//!
//! This crate provides common functionality used across the ChatAI backend:
//! - Configuration management following 12-factor principles
//! - Error types and their HTTP mapping
//! - Repository error conversion
//! - Validating JSON extractor

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;

pub use config::Config;
pub use db::RepositoryError;
pub use error::{Error, Result};
pub use extractors::ValidatedJson;
