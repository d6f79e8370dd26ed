//! # Tiraz Common Library
//!
//! Shared code for the Tiraz backend binaries:
//! - Settings loading and validation
//! - Database pool initialization and schema migrations
//! - Common error type
//! - Timestamp helpers

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod time;

pub use config::{Environment, Settings};
pub use error::{Error, Result};
