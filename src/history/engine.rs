//! Undo/redo over whole-canvas snapshots.
//!
//! The log is an append-only list of [`HistoryEntry`] values with a cursor. `save` appends a
//! snapshot when the canvas differs from the entry under the cursor, truncating any redo branch.
//! `restore` rebuilds the canvas from an entry while a [`HistoryGuard`] keeps the rebuild from
//! recording itself.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use crate::canvas::store::CanvasHandle;
use crate::config::HistoryConfig;
use crate::history::events::{HistoryEntry, HistoryEvent, HistoryStatus};
use crate::history::guard::{HistoryGuard, SuppressionFlag};
use crate::import::base::ImportContext;
use crate::import::importer::ObjectImporter;
use crate::layer::model::{Layer, Metadata};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct Log {
    entries: Vec<HistoryEntry>,
    index: usize,
}

impl Log {
    fn status(&self) -> HistoryStatus {
        HistoryStatus {
            has_undo: self.index > 0,
            has_redo: self.index + 1 < self.entries.len(),
            index: self.index,
            history: self.entries.clone(),
        }
    }
}

struct Inner {
    canvas: CanvasHandle,
    importer: ObjectImporter,
    config: HistoryConfig,
    log: Mutex<Log>,
    suppress: SuppressionFlag,
    last_navigation: Mutex<Option<Instant>>,
    events: broadcast::Sender<HistoryEvent>,
}

/// Cheaply clonable handle to one canvas's undo log.
#[derive(Clone)]
pub struct History {
    inner: Arc<Inner>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl History {
    /// History over `canvas`; restores rebuild objects through `importer`.
    pub fn new(canvas: CanvasHandle, importer: ObjectImporter, config: HistoryConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                canvas,
                importer,
                config,
                log: Mutex::new(Log::default()),
                suppress: SuppressionFlag::default(),
                last_navigation: Mutex::new(None),
                events,
            }),
        }
    }

    /// Receive `saved`, `changed` and `restored` notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<HistoryEvent> {
        self.inner.events.subscribe()
    }

    /// Whether snapshots are currently suppressed.
    pub fn is_active(&self) -> bool {
        self.inner.suppress.is_active()
    }

    /// Suppress snapshots until the guard drops.
    pub fn suppress(&self) -> HistoryGuard {
        self.inner.suppress.hold()
    }

    fn emit(&self, event: HistoryEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    /// Snapshot the whole canvas. Returns whether an entry was appended.
    ///
    /// No-op while suppressed or when the canvas equals the current entry. Serialization failures
    /// are logged and the snapshot is dropped.
    #[instrument(level = "debug", skip(self))]
    pub async fn save(&self) -> bool {
        if self.is_active() {
            debug!("save suppressed");
            return false;
        }
        let layers: Vec<Layer> = {
            let canvas = self.inner.canvas.lock().await;
            canvas
                .to_layers()
                .into_iter()
                .filter(Layer::is_renderable)
                .collect()
        };
        let objects = match normalize(&layers) {
            Ok(objects) => objects,
            Err(e) => {
                warn!(error = %e, "history snapshot dropped");
                return false;
            }
        };

        let status = {
            let mut log = lock(&self.inner.log);
            if log
                .entries
                .get(log.index)
                .is_some_and(|current| current.objects == objects)
            {
                return false;
            }
            if !log.entries.is_empty() {
                let keep = log.index + 1;
                log.entries.truncate(keep);
            }
            log.entries.push(HistoryEntry::new(objects));
            log.index = log.entries.len() - 1;
            log.status()
        };
        debug!(index = status.index, len = status.history.len(), "history saved");
        self.emit(HistoryEvent::Saved);
        self.emit(HistoryEvent::Changed(status));
        true
    }

    /// Merge side-channel values into the current entry without moving the cursor.
    pub fn amend(&self, extras: Metadata) {
        let mut log = lock(&self.inner.log);
        let index = log.index;
        if let Some(entry) = log.entries.get_mut(index) {
            entry.extras.extend(extras);
        }
    }

    /// Step back one entry. Calls inside the throttle window collapse into the first.
    pub async fn undo(&self) -> bool {
        if !self.admit_navigation() {
            return false;
        }
        let target = lock(&self.inner.log).index.saturating_sub(1);
        self.restore(target).await
    }

    /// Step forward one entry. Calls inside the throttle window collapse into the first.
    pub async fn redo(&self) -> bool {
        if !self.admit_navigation() {
            return false;
        }
        let target = lock(&self.inner.log).index + 1;
        self.restore(target).await
    }

    fn admit_navigation(&self) -> bool {
        let now = Instant::now();
        let mut last = lock(&self.inner.last_navigation);
        match *last {
            Some(prev) if now.duration_since(prev) < self.inner.config.undo_throttle() => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    /// Rebuild the canvas from entry `target` (clamped). Returns whether anything happened.
    #[instrument(level = "debug", skip(self))]
    pub async fn restore(&self, target: usize) -> bool {
        let (target, entry) = {
            let log = lock(&self.inner.log);
            let Some(last) = log.entries.len().checked_sub(1) else {
                return false;
            };
            let target = target.min(last);
            if target == log.index {
                return false;
            }
            (target, log.entries[target].clone())
        };

        let had_selection = self.inner.canvas.lock().await.discard_active();
        if had_selection {
            tokio::time::sleep(self.inner.config.deselect_grace()).await;
        }

        let guard = self.suppress();
        {
            let mut canvas = self.inner.canvas.lock().await;
            canvas.clear();
            for layer in entry.objects.iter().filter(|l| l.is_renderable()) {
                match self
                    .inner
                    .importer
                    .import(layer, ImportContext::absolute())
                    .await
                {
                    Ok(obj) => canvas.add(obj),
                    Err(e) => {
                        warn!(id = ?layer.id(), error = %e, "object dropped during restore");
                    }
                }
            }
            canvas.request_render();
        }

        let status = {
            let mut log = lock(&self.inner.log);
            log.index = target.min(log.entries.len().saturating_sub(1));
            log.status()
        };
        debug!(index = status.index, "history restored");
        self.emit(HistoryEvent::Restored(entry));
        self.emit(HistoryEvent::Changed(status));

        tokio::time::sleep(self.inner.config.settle()).await;
        drop(guard);
        true
    }

    /// Forget every entry.
    pub fn reset(&self) {
        let status = {
            let mut log = lock(&self.inner.log);
            *log = Log::default();
            log.status()
        };
        *lock(&self.inner.last_navigation) = None;
        self.emit(HistoryEvent::Changed(status));
    }

    /// Undo/redo availability plus a copy of the log.
    pub fn get_status(&self) -> HistoryStatus {
        lock(&self.inner.log).status()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        lock(&self.inner.log).entries.len()
    }

    /// Whether the log holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` with snapshots suppressed; the suppression ends when `f` completes.
    pub async fn run_without_affecting_history<F, Fut, T>(&self, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _guard = self.suppress();
        f().await
    }
}

impl std::fmt::Debug for History {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let log = lock(&self.inner.log);
        f.debug_struct("History")
            .field("len", &log.entries.len())
            .field("index", &log.index)
            .field("active", &self.inner.suppress.is_active())
            .finish()
    }
}

/// JSON round-trip so snapshots compare the way they serialize.
fn normalize(layers: &[Layer]) -> Result<Vec<Layer>, serde_json::Error> {
    serde_json::from_value(serde_json::to_value(layers)?)
}

#[cfg(test)]
#[path = "../../tests/unit/history/engine.rs"]
mod tests;
