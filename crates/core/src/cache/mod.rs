//! SQLite-backed cache generations.
//!
//! A generation is a named, persistent store mapping request URLs to
//! responses. Two generations are live at any time: the static precache
//! filled at install and the runtime cache learned from traffic. Both
//! names are derived from the build version, so generations left over
//! from a previous version are recognizable by name and deleted during
//! activation.
//!
//! Lookups search every generation in creation order; writes go through
//! a handle to one named generation. Only GET responses are ever
//! stored, so entries are keyed by URL alone.

pub mod connection;
pub mod entries;
pub mod migrations;
pub mod names;

pub use crate::Error;

pub use connection::CacheStore;
pub use entries::{Generation, MatchOptions};
pub use names::{CACHE_PREFIX, CACHE_VERSION, GenerationNames};
