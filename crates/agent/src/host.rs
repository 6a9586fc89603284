//! Host-environment control surface.
//!
//! The agent runs embedded in a shell that owns the open pages and the
//! update pipeline. The two effects the agent needs from it are modeled
//! here so tests can substitute a recording fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Message kind a controlled page sends to push a waiting update live
/// without closing every tab.
pub const PROMOTE_KIND: &str = "skip-waiting";

/// Out-of-band message from a controlled page.
///
/// Payloads arrive as arbitrary JSON; anything that does not carry a
/// recognized `kind` is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub kind: String,
}

/// Control calls exposed by the host environment.
#[async_trait]
pub trait Host: Send + Sync {
    /// Promote this instance past the waiting state immediately,
    /// instead of waiting for the previous instance to wind down.
    async fn skip_waiting(&self);

    /// Route every currently open page through this instance from now
    /// on, rather than on each page's next navigation.
    async fn claim_clients(&self);
}
