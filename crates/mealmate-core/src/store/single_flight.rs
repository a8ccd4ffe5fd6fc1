//! Coalescing gate for reloads of one collection.
//!
//! At most one reload runs at a time. A caller that arrives while a reload is
//! running waits; when its turn comes it skips the work if a reload that
//! started after its arrival has already succeeded. Any number of callers
//! that pile up behind one running reload therefore cause exactly one
//! follow-up reload between them.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct SingleFlight {
    /// Ticket handed to the most recent caller.
    requested: AtomicU64,
    /// Highest ticket covered by a successful run. Only touched under the lock.
    completed: Mutex<u64>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `reload` unless a run that started after this call already
    /// succeeded. A failed run covers nobody, so waiting callers retry it.
    pub async fn run<F, Fut, E>(&self, reload: F) -> Result<bool, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        let ticket = self.requested.fetch_add(1, Ordering::SeqCst) + 1;
        let mut completed = self.completed.lock().await;
        if *completed >= ticket {
            return Ok(false);
        }

        // Everyone who has arrived by now is covered by this run.
        let covers = self.requested.load(Ordering::SeqCst);
        reload().await?;
        *completed = covers;
        Ok(true)
    }
}
