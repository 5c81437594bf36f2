use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tsalign_core::{TimeInterval, TimeRecord, TsError};

use crate::collector::TimeSeriesCollector;
use crate::flush::{Flush, FlushTask, Snapshot};

/// Labelled record as carried over the input channel.
pub type Tagged<T> = (String, TimeRecord<T>);

enum Event<T> {
    Record(String, TimeRecord<T>),
    Idle,
    Closed,
}

async fn next_event<T>(rx: &mut mpsc::Receiver<Tagged<T>>, idle: Option<Duration>) -> Event<T> {
    let Some(idle) = idle else {
        return rx
            .recv()
            .await
            .map_or(Event::Closed, |(label, record)| Event::Record(label, record));
    };
    match tokio::time::timeout(idle, rx.recv()).await {
        Ok(Some((label, record))) => Event::Record(label, record),
        Ok(None) => Event::Closed,
        Err(_) => Event::Idle,
    }
}

/// Handle to a collector driven by a channel of labelled records.
///
/// The task applies every received record, hands each flush to the
/// callback on the blocking pool, and flushes whatever is buffered when
/// the configured idle timeout passes without input. When the channel
/// closes or [`stop`](Self::stop) is called, it flushes the open window,
/// waits for outstanding callbacks, and returns the collector.
///
/// Dropping the handle requests the same shutdown without waiting for it.
#[derive(Debug)]
pub struct CollectorHandle<T> {
    join: Option<JoinHandle<TimeSeriesCollector<T>>>,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl<T: Clone + Send + 'static> CollectorHandle<T> {
    /// Spawn the collector loop on the current Tokio runtime.
    ///
    /// # Errors
    /// Returns `Err(TsError::Task)` if called outside a Tokio runtime.
    pub fn spawn<F>(
        collector: TimeSeriesCollector<T>,
        rx: mpsc::Receiver<Tagged<T>>,
        callback: F,
    ) -> Result<Self, TsError>
    where
        F: Fn(Snapshot<T>, TimeInterval) + Send + Sync + 'static,
    {
        let runtime = Handle::try_current()
            .map_err(|e| TsError::Task(format!("no runtime for collector task: {e}")))?;
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let join = runtime.spawn(run(
            runtime.clone(),
            collector,
            rx,
            Arc::new(callback),
            stop_rx,
        ));
        Ok(Self {
            join: Some(join),
            stop_tx: Some(stop_tx),
        })
    }
}

impl<T> CollectorHandle<T> {
    /// Whether the collector loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Ask the loop to shut down, then wait for it and return the collector.
    ///
    /// Records still queued in the channel are not applied.
    ///
    /// # Errors
    /// Returns `Err(TsError::Task)` if the loop panicked or was cancelled.
    pub async fn stop(mut self) -> Result<TimeSeriesCollector<T>, TsError> {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        self.wait().await
    }

    /// Wait for the loop to end on its own, once every sender is dropped.
    ///
    /// # Errors
    /// Returns `Err(TsError::Task)` if the loop panicked or was cancelled.
    pub async fn join(mut self) -> Result<TimeSeriesCollector<T>, TsError> {
        self.wait().await
    }

    async fn wait(&mut self) -> Result<TimeSeriesCollector<T>, TsError> {
        let join = self
            .join
            .take()
            .ok_or_else(|| TsError::Task("collector task already joined".into()))?;
        join.await
            .map_err(|e| TsError::Task(format!("collector task did not complete: {e}")))
    }
}

impl<T> Drop for CollectorHandle<T> {
    fn drop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn dispatch<T, F>(runtime: &Handle, callback: &Arc<F>, flush: Flush<T>) -> FlushTask
where
    T: Send + 'static,
    F: Fn(Snapshot<T>, TimeInterval) + Send + Sync + 'static,
{
    let callback = Arc::clone(callback);
    FlushTask::spawn_blocking(runtime, move || {
        let (snapshot, interval) = flush.into_parts();
        callback(snapshot, interval);
    })
}

/// Unwrap a forced flush, logging the failure instead of dropping it silently.
fn forced_flush<T>(result: Result<Option<Flush<T>>, TsError>) -> Option<Flush<T>> {
    match result {
        Ok(flush) => flush,
        Err(_e) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_e, "forced flush failed; records stay buffered");
            None
        }
    }
}

async fn run<T, F>(
    runtime: Handle,
    mut collector: TimeSeriesCollector<T>,
    mut rx: mpsc::Receiver<Tagged<T>>,
    callback: Arc<F>,
    mut stop_rx: oneshot::Receiver<()>,
) -> TimeSeriesCollector<T>
where
    T: Clone + Send + 'static,
    F: Fn(Snapshot<T>, TimeInterval) + Send + Sync + 'static,
{
    let idle = collector.config().idle_timeout;
    let mut pending: Vec<FlushTask> = Vec::new();
    // records applied since the last forced flush
    let mut dirty = false;

    loop {
        let event = tokio::select! {
            biased;
            _ = &mut stop_rx => break,
            event = next_event(&mut rx, idle) => event,
        };
        let flushed = match event {
            Event::Record(label, record) => match collector.apply(label, record) {
                Ok(flush) => {
                    dirty = true;
                    flush
                }
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(error = %_e, "dropping record the collector rejected");
                    None
                }
            },
            Event::Idle if dirty => {
                dirty = false;
                #[cfg(feature = "tracing")]
                tracing::debug!(timer = collector.timer(), "idle timeout; flushing buffered records");
                forced_flush(collector.take_all())
            }
            Event::Idle => None,
            Event::Closed => break,
        };
        if let Some(flush) = flushed {
            pending.retain(|t| !t.is_finished());
            pending.push(dispatch(&runtime, &callback, flush));
        }
    }

    if dirty && let Some(flush) = forced_flush(collector.take_all()) {
        pending.push(dispatch(&runtime, &callback, flush));
    }
    for task in pending {
        if let Err(_e) = task.join().await {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_e, "flush callback failed");
        }
    }

    #[cfg(feature = "tracing")]
    tracing::info!(
        timer = collector.timer(),
        retained = collector.len(),
        "collector task stopped"
    );
    collector
}
