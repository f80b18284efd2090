//! Debounced snapshot persistence.
//!
//! Each [`SaveDebouncer::arm`] replaces the pending job and restarts the
//! delay, so a burst of changes produces exactly one write once things go
//! quiet. The timer is a spawned tokio task that is aborted on re-arm, cancel
//! and drop. When it fires, the store call runs on the blocking pool.

use super::{SessionSnapshot, SnapshotStore};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Work carried out when the debounce delay expires
#[derive(Debug, Clone, PartialEq)]
pub enum PersistJob {
    Write(SessionSnapshot),
    /// Nothing left worth saving
    Clear,
}

impl PersistJob {
    /// Perform the job. Failures are logged; in-memory state stays authoritative
    /// and the next change retries.
    pub fn run<S: SnapshotStore + ?Sized>(self, store: &S) {
        let result = match &self {
            PersistJob::Write(snapshot) => store.save(snapshot),
            PersistJob::Clear => store.clear(),
        };
        if let Err(e) = result {
            log::error!("Failed to persist session snapshot: {:#}", e);
        }
    }
}

struct Pending {
    /// Taken by whichever of the timer and `flush` gets there first
    job: Arc<Mutex<Option<PersistJob>>>,
    timer: JoinHandle<()>,
}

/// Coalescing, last-write-wins persistence timer
pub struct SaveDebouncer<S: SnapshotStore> {
    store: Arc<S>,
    delay: Duration,
    runtime: Handle,
    pending: Option<Pending>,
}

impl<S: SnapshotStore> SaveDebouncer<S> {
    pub fn new(store: Arc<S>, delay: Duration, runtime: Handle) -> Self {
        Self {
            store,
            delay,
            runtime,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `job` after the delay, superseding any pending job
    pub fn arm(&mut self, job: PersistJob) {
        self.cancel();

        let slot = Arc::new(Mutex::new(Some(job)));
        let timer_slot = Arc::clone(&slot);
        let store = Arc::clone(&self.store);
        let delay = self.delay;
        let timer = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let job = timer_slot.lock().take();
            if let Some(job) = job {
                // Stores do blocking file I/O
                let written = tokio::task::spawn_blocking(move || job.run(store.as_ref())).await;
                if let Err(e) = written {
                    log::error!("Snapshot writer task failed: {}", e);
                }
            }
        });

        self.pending = Some(Pending { job: slot, timer });
    }

    /// Drop the pending job without running it
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.timer.abort();
            if pending.job.lock().take().is_some() {
                log::trace!("Superseded pending snapshot write");
            }
        }
    }

    /// Run the pending job now, if there is one. Returns whether a job ran.
    pub fn flush(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        pending.timer.abort();
        let job = pending.job.lock().take();
        match job {
            Some(job) => {
                job.run(self.store.as_ref());
                true
            }
            None => false,
        }
    }

    /// Whether a job is waiting for the delay to expire
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| pending.job.lock().is_some())
    }
}

impl<S: SnapshotStore> Drop for SaveDebouncer<S> {
    fn drop(&mut self) {
        self.cancel();
    }
}
