use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tsalign_core::{TimeInterval, TimeSeries, TsError};

/// Per-label sub-series extracted by a collector flush.
pub type Snapshot<T> = BTreeMap<String, TimeSeries<T>>;

/// One emitted chunk: the extracted records and the window they were emitted for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flush<T> {
    /// Records strictly before the flush boundary, keyed by label.
    ///
    /// A label's series starts with its continuity anchor from the previous
    /// flush, when one was retained. Labels with nothing before the boundary
    /// are absent.
    pub snapshot: Snapshot<T>,
    /// The last window `[lo, hi)` this chunk closes.
    ///
    /// A record that jumps several windows ahead closes all of them in one
    /// flush, but only the final window is reported here. Buffered records
    /// from the skipped windows still arrive in `snapshot`, before `lo`.
    /// Use `[previous hi, hi)` to cover everything a flush emits.
    pub interval: TimeInterval,
}

impl<T> Flush<T> {
    /// Split into the snapshot and interval, the pair a flush callback receives.
    #[must_use]
    pub fn into_parts(self) -> (Snapshot<T>, TimeInterval) {
        (self.snapshot, self.interval)
    }

    /// Total number of records across every label.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.snapshot.values().map(TimeSeries::len).sum()
    }
}

/// Handle to a flush callback running on the blocking pool.
///
/// Dropping the handle detaches the callback; it still runs to completion.
/// Callbacks from successive flushes may finish in any order.
#[derive(Debug)]
pub struct FlushTask {
    inner: JoinHandle<()>,
}

impl FlushTask {
    /// Run `callback` on `runtime`'s blocking pool.
    pub(crate) fn spawn_blocking<F>(runtime: &Handle, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            inner: runtime.spawn_blocking(callback),
        }
    }

    /// Whether the callback has returned (or panicked).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Wait for the callback to return.
    ///
    /// # Errors
    /// Returns `Err(TsError::Task)` if the callback panicked or the runtime
    /// shut down before it ran.
    pub async fn join(self) -> Result<(), TsError> {
        self.inner
            .await
            .map_err(|e| TsError::Task(format!("flush callback did not complete: {e}")))
    }
}
