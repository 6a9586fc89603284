//! Offline-first caching agent.
//!
//! Intercepts same-origin GET requests for a single-page application
//! and serves them from versioned cache generations: page loads go
//! network-first with a cached fallback, subresources go cache-first
//! with background revalidation. A lifecycle controller provisions the
//! static generation at install time and evicts generations left over
//! from earlier versions on activation.
//!
//! The crate is host-agnostic: the embedding shell translates its
//! install/activate/message/fetch events into calls on [`Worker`], and
//! the two effects the agent needs back from the shell are behind the
//! [`Host`] trait.

pub mod host;
pub mod interceptor;
pub mod lifecycle;
pub mod precache;
pub mod work;
pub mod worker;

pub use host::{Host, Message, PROMOTE_KIND};
pub use interceptor::{FetchDecision, Interceptor, ROOT_DOCUMENT};
pub use lifecycle::{Lifecycle, LifecycleState};
pub use precache::PRECACHE_MANIFEST;
pub use work::WorkSet;
pub use worker::Worker;
