//! # Quality Dashboard Common Library
//!
//! Shared code for the quality dashboard service:
//! - Error type
//! - Configuration loading (TOML bootstrap + compiled defaults)
//! - Table family field mappings
//! - Event record model
//! - Timestamp parsing and local clock helpers

pub mod config;
pub mod error;
pub mod family;
pub mod record;
pub mod time;

pub use error::{Error, Result};
pub use family::TableFamily;
pub use record::{EventRecord, ResultCode};
