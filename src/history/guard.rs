//! Re-entrancy guard for history snapshots.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts active suppressions. `save` is a no-op while any is held.
#[derive(Clone, Debug, Default)]
pub struct SuppressionFlag(Arc<AtomicUsize>);

impl SuppressionFlag {
    /// Whether any suppression is held.
    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst) > 0
    }

    /// Suppress until the returned guard drops.
    pub fn hold(&self) -> HistoryGuard {
        self.0.fetch_add(1, Ordering::SeqCst);
        HistoryGuard(self.0.clone())
    }
}

/// Releases its suppression on drop, including on early return or panic unwind.
#[derive(Debug)]
#[must_use = "history is only suppressed while the guard is alive"]
pub struct HistoryGuard(Arc<AtomicUsize>);

impl Drop for HistoryGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
