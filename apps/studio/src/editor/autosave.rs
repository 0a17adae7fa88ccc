//! Debounced autosave.
//!
//! `Debouncer` runs a job after a quiet period; scheduling again before it fires cancels the
//! earlier job. Cancellation only reaches a job that is still waiting: once the quiet period is
//! over the job runs to completion. `AutoSaver` uses it to persist only the latest draft state,
//! reporting progress through a `SaveStatus` watch channel.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::editor::persistence::{PersistedState, Persistence, PersistenceError};

// ────────────────────────────────────────────────────────────────────────────
// Debouncer
// ────────────────────────────────────────────────────────────────────────────

struct PendingJob {
    handle: JoinHandle<()>,
    /// Dropping or firing this cancels the job while it is still waiting.
    cancel: oneshot::Sender<()>,
}

pub struct Debouncer {
    quiet: Duration,
    pending: Option<PendingJob>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Runs `job` once the quiet period has passed, replacing any job still waiting.
    pub fn schedule<F>(&mut self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let quiet = self.quiet;
        let (cancel, cancelled) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled => return,
                _ = tokio::time::sleep(quiet) => {}
            }
            job.await;
        });
        self.pending = Some(PendingJob { handle, cancel });
    }

    /// Cancels the job if it is still waiting. Returns true if it was.
    ///
    /// A job past its quiet period is left running.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            // the receiver is gone once the job has left its wait
            Some(job) => job.cancel.send(()).is_ok(),
            None => false,
        }
    }

    /// Cancels a waiting job, or waits for a running one to finish.
    /// Returns true if a waiting job was cancelled.
    pub async fn settle(&mut self) -> bool {
        let Some(job) = self.pending.take() else {
            return false;
        };
        let cancelled = job.cancel.send(()).is_ok();
        if let Err(e) = job.handle.await {
            warn!("Debounced job did not complete: {e}");
        }
        cancelled
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|job| !job.handle.is_finished())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// AutoSaver
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Saving,
    Failed(String),
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveStatus::Saved => f.write_str("Saved"),
            SaveStatus::Saving => f.write_str("Saving..."),
            SaveStatus::Failed(_) => f.write_str("Save failed"),
        }
    }
}

/// The newest unsaved draft. `revision` grows with every scheduled draft, so a save only
/// clears the slot when nothing newer arrived while it ran.
#[derive(Default)]
struct DraftSlot {
    draft: Option<PersistedState>,
    revision: u64,
}

struct Shared {
    store: Arc<dyn Persistence>,
    slot: Mutex<DraftSlot>,
    /// Serializes saves and clears against the store.
    writer: Mutex<()>,
    status: watch::Sender<SaveStatus>,
}

pub struct AutoSaver {
    shared: Arc<Shared>,
    debouncer: Debouncer,
}

impl AutoSaver {
    pub fn new(store: Arc<dyn Persistence>, quiet: Duration) -> Self {
        let (status, _) = watch::channel(SaveStatus::Saved);
        Self {
            shared: Arc::new(Shared {
                store,
                slot: Mutex::new(DraftSlot::default()),
                writer: Mutex::new(()),
                status,
            }),
            debouncer: Debouncer::new(quiet),
        }
    }

    pub fn status(&self) -> SaveStatus {
        self.shared.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.shared.status.subscribe()
    }

    pub fn has_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Records `state` as the newest draft and (re)starts the quiet period.
    pub async fn schedule(&mut self, state: PersistedState) {
        {
            let mut slot = self.shared.slot.lock().await;
            slot.draft = Some(state);
            slot.revision += 1;
        }
        let shared = Arc::clone(&self.shared);
        self.debouncer.schedule(async move {
            let _ = shared.save_latest().await;
        });
    }

    /// Persists a still-pending draft immediately, after any save already in progress.
    /// Used on teardown.
    pub async fn flush(&mut self) -> Result<(), PersistenceError> {
        if self.debouncer.settle().await {
            debug!("Flushing pending autosave");
        }
        self.shared.save_latest().await
    }

    /// Drops the unsaved draft and removes the stored one.
    pub async fn discard(&mut self) -> Result<(), PersistenceError> {
        self.debouncer.settle().await;
        let _writer = self.shared.writer.lock().await;
        self.shared.slot.lock().await.draft = None;
        self.shared.store.clear().await?;
        self.shared.status.send_replace(SaveStatus::Saved);
        Ok(())
    }
}

impl Shared {
    async fn save_latest(&self) -> Result<(), PersistenceError> {
        let _writer = self.writer.lock().await;
        let (state, revision) = {
            let slot = self.slot.lock().await;
            match &slot.draft {
                Some(state) => (state.clone(), slot.revision),
                None => return Ok(()),
            }
        };

        self.status.send_replace(SaveStatus::Saving);
        match self.store.save(&state).await {
            Ok(()) => {
                let mut slot = self.slot.lock().await;
                if slot.revision == revision {
                    slot.draft = None;
                }
                self.status.send_replace(SaveStatus::Saved);
                Ok(())
            }
            Err(e) => {
                // the draft stays in the slot for the next flush or edit
                warn!("Autosave failed: {e}");
                self.status.send_replace(SaveStatus::Failed(e.to_string()));
                Err(e)
            }
        }
    }
}
