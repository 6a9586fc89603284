//! Deferred background work.
//!
//! Cache refreshes run after the response has already been handed back
//! to the caller. The host must not tear the agent down while any of
//! them is in flight, so their handles are tracked here and awaited
//! explicitly. [`WorkSet::settle`] is also the deterministic sync point
//! tests use to observe background writes.

use std::future::Future;
use std::sync::Mutex;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
pub struct WorkSet {
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `fut` without blocking the caller, keeping the agent alive
    /// until it completes.
    pub fn defer<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(fut);
        self.tasks.lock().expect("work set lock poisoned").push(handle);
    }

    /// Wait for every deferred task registered so far to finish.
    pub async fn settle(&self) {
        let drained: Vec<JoinHandle<()>> = {
            let mut tasks = self.tasks.lock().expect("work set lock poisoned");
            tasks.drain(..).collect()
        };
        for handle in drained {
            let _ = handle.await;
        }
    }
}
