//! Core types and shared functionality for the haven offline agent.
//!
//! This crate provides:
//! - Versioned cache generations with SQLite backend
//! - Request and stored-response models
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod request;
pub mod response;

pub use cache::{CacheStore, GenerationNames, MatchOptions};
pub use config::AppConfig;
pub use error::Error;
pub use request::{RequestDescriptor, RequestKind};
pub use response::StoredResponse;
