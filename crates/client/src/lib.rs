//! HTTP client for the haven offline agent.
//!
//! This crate provides the outbound fetch pipeline behind the [`Fetch`]
//! seam and the origin gate deciding which requests are eligible for
//! interception at all.

pub mod fetch;

pub use fetch::origin::{OriginError, OriginFilter};
pub use fetch::{Fetch, FetchConfig, FetchedResponse, HttpFetcher, Visibility};
