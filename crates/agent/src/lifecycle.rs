//! Install/activate state machine.
//!
//! An agent instance moves through `Installing → Waiting → Activating →
//! Active`. Install provisions the static generation and asks for
//! immediate promotion, so a new deployment takes effect without every
//! tab closing first. Activation evicts generations left over from
//! earlier versions and takes control of the open pages. A controlled
//! page can also force promotion of a waiting instance with an
//! out-of-band message.

use std::future::Future;
use std::sync::{Arc, Mutex};

use haven_core::{CacheStore, GenerationNames};

use crate::host::{Host, Message, PROMOTE_KIND};

/// Phases of an agent instance, oldest to newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Installing,
    Waiting,
    Activating,
    Active,
}

pub struct Lifecycle {
    store: CacheStore,
    names: GenerationNames,
    host: Arc<dyn Host>,
    state: Mutex<LifecycleState>,
}

impl Lifecycle {
    pub fn new(store: CacheStore, names: GenerationNames, host: Arc<dyn Host>) -> Self {
        Self { store, names, host, state: Mutex::new(LifecycleState::Installing) }
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.lock().expect("lifecycle state lock poisoned")
    }

    fn set_state(&self, state: LifecycleState) {
        *self.state.lock().expect("lifecycle state lock poisoned") = state;
    }

    /// Install: run the precache batch to completion, then request
    /// immediate promotion past the default waiting behavior.
    pub async fn install<F>(&self, precache: F)
    where
        F: Future<Output = ()>,
    {
        self.set_state(LifecycleState::Installing);
        precache.await;
        self.host.skip_waiting().await;
        self.set_state(LifecycleState::Waiting);
        tracing::info!("installed, static generation {}", self.names.static_name());
    }

    /// Activate: evict every stale generation this agent owns, then
    /// take control of the open pages.
    ///
    /// Generations under a foreign prefix are untouched; a failed
    /// delete leaves that generation for the next activation.
    pub async fn activate(&self) {
        self.set_state(LifecycleState::Activating);

        match self.store.names().await {
            Ok(names) => {
                for name in names {
                    if self.names.is_stale(&name) {
                        match self.store.delete(&name).await {
                            Ok(_) => tracing::info!("evicted stale generation {name}"),
                            Err(e) => tracing::warn!("could not evict {name}: {e}"),
                        }
                    }
                }
            }
            Err(e) => tracing::warn!("could not enumerate generations: {e}"),
        }

        self.host.claim_clients().await;
        self.set_state(LifecycleState::Active);
    }

    /// Out-of-band message from a controlled page. A recognized
    /// promotion request triggers the same promotion used at install;
    /// anything else is ignored.
    pub async fn on_message(&self, payload: &serde_json::Value) {
        if let Ok(message) = serde_json::from_value::<Message>(payload.clone())
            && message.kind == PROMOTE_KIND
        {
            self.host.skip_waiting().await;
        }
    }
}
