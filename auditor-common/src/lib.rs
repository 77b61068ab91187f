//! # Auditor Common Library
//!
//! Shared code for the audit engine and anything embedding it:
//! - Common error type
//! - TOML configuration loading and root folder resolution
//! - Tracing initialisation
//! - SQLite database bootstrap and lock-retry helper

pub mod config;
pub mod db;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
