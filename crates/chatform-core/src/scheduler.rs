//! Single-slot cancellable task scheduler
//!
//! Holds at most one spawned task. Arming a new task aborts the previous
//! one first, so two timers of the same kind can never race.

use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// One cancellable timer slot
///
/// Clones share the slot.
#[derive(Debug, Clone)]
pub struct Scheduler {
    name: &'static str,
    runtime: Handle,
    slot: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Scheduler {
    /// Create an empty slot spawning onto `runtime`
    #[must_use]
    pub fn new(name: &'static str, runtime: Handle) -> Self {
        Self {
            name,
            runtime,
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Spawn `task`, aborting whatever was armed before
    pub fn arm<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.slot.lock();
        if let Some(previous) = slot.take() {
            if !previous.is_finished() {
                tracing::debug!(timer = self.name, "superseding armed timer");
            }
            previous.abort();
        }
        *slot = Some(self.runtime.spawn(task));
    }

    /// Abort the armed task; true if one was still running
    pub fn cancel(&self) -> bool {
        match self.slot.lock().take() {
            Some(handle) => {
                let running = !handle.is_finished();
                handle.abort();
                if running {
                    tracing::debug!(timer = self.name, "timer cancelled");
                }
                running
            }
            None => false,
        }
    }

    /// True while an armed task has not completed
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.slot.lock().as_ref().is_some_and(|h| !h.is_finished())
    }
}
