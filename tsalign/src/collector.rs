use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tsalign_core::{
    CollectorConfig, TimeInterval, TimeRecord, TimeSeries, TsError, epoch_seconds,
    latest_at_or_before,
};

use crate::flush::{Flush, FlushTask, Snapshot};

const NANOS_PER_SEC: f64 = 1e9;

// Window arithmetic runs on whole nanoseconds so boundaries like 0.3 s stay exact.
#[allow(clippy::cast_possible_truncation)]
fn to_nanos(t: f64) -> i128 {
    (t * NANOS_PER_SEC).round() as i128
}

#[allow(clippy::cast_precision_loss)]
fn from_nanos(ns: i128) -> f64 {
    ns as f64 / NANOS_PER_SEC
}

/// Buffers labelled records and cuts them into fixed-width chunks.
///
/// Each label owns a [`TimeSeries`]. Inserting a record whose timestamp,
/// less the configured delay, reaches the next interval boundary flushes
/// every label: records before the boundary are extracted into a snapshot
/// and evicted, except for the latest record at or before the boundary,
/// which stays behind as the anchor for the next window.
///
/// A record older than the current timer is still stored. It shows up in
/// the next snapshot, outside that snapshot's interval.
///
/// The collector is a plain single-writer value. Share it across tasks only
/// behind a lock, or hand it to [`crate::CollectorHandle::spawn`].
#[derive(Debug, Clone)]
pub struct TimeSeriesCollector<T> {
    cfg: CollectorConfig,
    timer: f64,
    data: BTreeMap<String, TimeSeries<T>>,
}

/// Builder for [`TimeSeriesCollector`], typed by the record value it will hold.
pub struct CollectorBuilder<T> {
    cfg: CollectorConfig,
    start: Option<f64>,
    _value: PhantomData<fn() -> T>,
}

impl<T> Default for CollectorBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for CollectorBuilder<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CollectorBuilder<T> {}

impl<T> fmt::Debug for CollectorBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectorBuilder")
            .field("cfg", &self.cfg)
            .field("start", &self.start)
            .finish()
    }
}

impl<T> CollectorBuilder<T> {
    /// Builder with the default configuration and no explicit start time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cfg: CollectorConfig::default(),
            start: None,
            _value: PhantomData,
        }
    }

    /// Set the chunk width. Zero flushes on every distinct new timestamp.
    #[must_use]
    pub const fn interval(mut self, interval: Duration) -> Self {
        self.cfg.interval = interval;
        self
    }

    /// Set the grace period that holds a boundary open for late records.
    #[must_use]
    pub const fn delay(mut self, delay: Duration) -> Self {
        self.cfg.delay = delay;
        self
    }

    /// Force a flush after this much silence when driven from a channel.
    #[must_use]
    pub const fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.idle_timeout = Some(timeout);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub const fn config(mut self, cfg: CollectorConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Start the first window from `t` (seconds since the epoch) instead of now.
    #[must_use]
    pub const fn start_at(mut self, t: f64) -> Self {
        self.start = Some(t);
        self
    }

    /// Start the first window from a wall-clock instant instead of now.
    #[must_use]
    pub fn start_at_datetime(self, at: DateTime<Utc>) -> Self {
        self.start_at(epoch_seconds(at))
    }

    /// Build the collector. The timer starts at the interval-aligned floor
    /// of the start time.
    ///
    /// # Errors
    /// Returns `Err(TsError::InvalidTimestamp)` if the start time is NaN.
    pub fn build(self) -> Result<TimeSeriesCollector<T>, TsError> {
        let start = match self.start {
            Some(t) => TsError::check_timestamp(t)?,
            None => epoch_seconds(Utc::now()),
        };
        Ok(TimeSeriesCollector::with_start(self.cfg, start))
    }
}

impl<T> TimeSeriesCollector<T> {
    /// Start building a collector.
    #[must_use]
    pub fn builder() -> CollectorBuilder<T> {
        CollectorBuilder::new()
    }

    /// Collector whose first window starts at the current wall-clock time.
    #[must_use]
    pub fn new(cfg: CollectorConfig) -> Self {
        Self::with_start(cfg, epoch_seconds(Utc::now()))
    }

    fn with_start(cfg: CollectorConfig, start: f64) -> Self {
        let mut out = Self {
            cfg,
            timer: 0.0,
            data: BTreeMap::new(),
        };
        out.timer = out.align(start);
        out
    }

    /// Boundary of the most recent flush (or the aligned start time).
    #[must_use]
    pub const fn timer(&self) -> f64 {
        self.timer
    }

    /// Chunk width.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.cfg.interval
    }

    /// Grace period for late records.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.cfg.delay
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &CollectorConfig {
        &self.cfg
    }

    /// Labels seen so far, in sorted order.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.data.keys().map(String::as_str)
    }

    /// Records currently buffered for `label`.
    #[must_use]
    pub fn series(&self, label: &str) -> Option<&TimeSeries<T>> {
        self.data.get(label)
    }

    /// Number of buffered records across all labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.values().map(TimeSeries::len).sum()
    }

    /// Whether no records are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.values().all(TimeSeries::is_empty)
    }

    fn step_nanos(&self) -> i128 {
        i128::try_from(self.cfg.interval.as_nanos()).unwrap_or(i128::MAX)
    }

    /// Interval-aligned floor of `t`, or `t` itself for a zero interval.
    fn align(&self, t: f64) -> f64 {
        let step = self.step_nanos();
        if step == 0 {
            return t;
        }
        let ns = to_nanos(t);
        from_nanos(ns - ns.rem_euclid(step))
    }

    /// `t` moved by `windows` whole intervals.
    fn shift(&self, t: f64, windows: i128) -> f64 {
        from_nanos(to_nanos(t).saturating_add(windows.saturating_mul(self.step_nanos())))
    }

    fn insert(&mut self, label: String, record: TimeRecord<T>) -> Result<(), TsError> {
        TsError::check_timestamp(record.ts)?;
        #[cfg(feature = "tracing")]
        if record.ts < self.timer {
            tracing::warn!(
                label = %label,
                ts = record.ts,
                timer = self.timer,
                "record behind the last flush boundary; it will land outside the next window"
            );
        }
        self.data.entry(label).or_default().push(record)?;
        Ok(())
    }
}

impl<T: Clone> TimeSeriesCollector<T> {
    /// Insert `record` under `label` and flush if it closes a window.
    ///
    /// A flush triggers when the aligned floor of `record.ts - delay` lies
    /// beyond the current timer; that floor becomes the new boundary. When
    /// that skips several windows, only the last one is reported as the
    /// flush interval.
    ///
    /// ```
    /// use std::time::Duration;
    /// use tsalign::{TimeRecord, TimeSeriesCollector};
    ///
    /// let mut c = TimeSeriesCollector::builder()
    ///     .interval(Duration::from_secs(1))
    ///     .start_at(0.5)
    ///     .build()
    ///     .unwrap();
    /// assert!(c.apply("A", TimeRecord::new(0.2, 1.0)).unwrap().is_none());
    /// let flush = c.apply("A", TimeRecord::new(1.3, 2.0)).unwrap().unwrap();
    /// assert_eq!((flush.interval.lo(), flush.interval.hi()), (0.0, 1.0));
    /// assert_eq!(flush.snapshot["A"].len(), 1);
    /// ```
    ///
    /// # Errors
    /// Returns `Err(TsError::InvalidTimestamp)` if `record.ts` is NaN; the
    /// collector is left unchanged.
    pub fn apply(
        &mut self,
        label: impl Into<String>,
        record: TimeRecord<T>,
    ) -> Result<Option<Flush<T>>, TsError> {
        let ts = record.ts;
        self.insert(label.into(), record)?;
        let boundary = self.align(ts - self.cfg.delay_secs());
        if boundary > self.timer {
            self.flush_at(boundary).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Like [`apply`](Self::apply), but hand any flush to `callback` on the
    /// current Tokio runtime's blocking pool and return a handle to that task.
    ///
    /// The call never waits for the callback. Callbacks spawned by successive
    /// flushes are not ordered with respect to each other.
    ///
    /// # Errors
    /// - `Err(TsError::Task)` if called outside a Tokio runtime; nothing is inserted.
    /// - `Err(TsError::InvalidTimestamp)` if `record.ts` is NaN.
    pub fn apply_with<F>(
        &mut self,
        label: impl Into<String>,
        record: TimeRecord<T>,
        callback: F,
    ) -> Result<Option<FlushTask>, TsError>
    where
        T: Send + 'static,
        F: FnOnce(Snapshot<T>, TimeInterval) + Send + 'static,
    {
        let runtime = Handle::try_current()
            .map_err(|e| TsError::Task(format!("no runtime for flush callback: {e}")))?;
        Ok(self.apply(label, record)?.map(|flush| {
            FlushTask::spawn_blocking(&runtime, move || {
                let (snapshot, interval) = flush.into_parts();
                callback(snapshot, interval);
            })
        }))
    }

    /// Force a flush as if a record stamped `t` had arrived, without inserting one.
    ///
    /// The boundary never moves backwards: when `t` would not advance the
    /// timer, the flush happens at the current timer and returns whatever is
    /// still buffered before it.
    ///
    /// # Errors
    /// Returns `Err(TsError::InvalidTimestamp)` if `t` is NaN.
    pub fn take(&mut self, t: f64) -> Result<Flush<T>, TsError> {
        TsError::check_timestamp(t)?;
        let boundary = self.align(t - self.cfg.delay_secs()).max(self.timer);
        self.flush_at(boundary)
    }

    /// Flush every buffered record, closing the window that holds the newest one.
    ///
    /// Returns `None` when nothing is buffered. Afterwards only the anchors
    /// (each label's latest record) remain.
    ///
    /// # Errors
    /// Propagates interval construction failures; none occur for finite timestamps.
    pub fn take_all(&mut self) -> Result<Option<Flush<T>>, TsError> {
        let Some(newest) = self
            .data
            .values()
            .filter_map(|s| s.last().map(|r| r.ts))
            .max_by(f64::total_cmp)
        else {
            return Ok(None);
        };
        let boundary = if self.cfg.interval.is_zero() {
            newest.next_up()
        } else {
            self.shift(self.align(newest), 1)
        };
        self.flush_at(boundary.max(self.timer)).map(Some)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "tsalign::collector::flush",
            level = "debug",
            skip(self),
            fields(timer = self.timer, labels = self.data.len()),
        )
    )]
    fn flush_at(&mut self, boundary: f64) -> Result<Flush<T>, TsError> {
        let lo = if self.cfg.interval.is_zero() {
            self.timer
        } else {
            self.shift(boundary, -1)
        };
        let interval = TimeInterval::new(lo, boundary)?;

        let mut snapshot = Snapshot::new();
        for (label, series) in &mut self.data {
            let cut = series.partition_point(|r| r.ts < boundary);
            if cut > 0 {
                snapshot.insert(label.clone(), TimeSeries::from_records(series[..cut].to_vec())?);
            }
            // anchor, plus any ties sitting on the boundary itself
            let keep_from = latest_at_or_before(series.as_slice(), boundary).map_or(0, |i| i.min(cut));
            series.delete_range(..keep_from)?;
        }
        self.timer = boundary;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            boundary,
            emitted = snapshot.len(),
            retained = self.len(),
            "collector flushed"
        );
        Ok(Flush { snapshot, interval })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector(interval: f64, delay: f64, start: f64) -> TimeSeriesCollector<f64> {
        TimeSeriesCollector::builder()
            .interval(Duration::from_secs_f64(interval))
            .delay(Duration::from_secs_f64(delay))
            .start_at(start)
            .build()
            .unwrap()
    }

    #[test]
    fn timer_starts_at_aligned_floor() {
        assert_eq!(collector(1.0, 0.0, 0.7).timer(), 0.0);
        assert_eq!(collector(5.0, 0.0, 12.5).timer(), 10.0);
        assert_eq!(collector(0.0, 0.0, 12.5).timer(), 12.5);
    }

    #[test]
    fn builder_rejects_nan_start() {
        let r = TimeSeriesCollector::<f64>::builder().start_at(f64::NAN).build();
        assert!(matches!(r, Err(TsError::InvalidTimestamp(_))));
    }

    #[test]
    fn anchor_is_latest_record_at_or_before_boundary() {
        let mut c = collector(1.0, 0.0, 0.0);
        for t in [0.1, 0.4, 0.9] {
            assert!(c.apply("A", TimeRecord::new(t, t)).unwrap().is_none());
        }
        let f = c.apply("A", TimeRecord::new(2.5, 2.5)).unwrap().unwrap();
        assert_eq!(f.snapshot["A"].timestamps().collect::<Vec<_>>(), vec![0.1, 0.4, 0.9]);
        assert_eq!((f.interval.lo(), f.interval.hi()), (1.0, 2.0));
        assert_eq!(c.timer(), 2.0);
        assert_eq!(c.series("A").unwrap().timestamps().collect::<Vec<_>>(), vec![0.9, 2.5]);
    }

    #[test]
    fn record_on_boundary_stays_out_of_snapshot() {
        let mut c = collector(1.0, 0.0, 0.0);
        c.apply("A", TimeRecord::new(0.5, 1.0)).unwrap();
        let f = c.apply("A", TimeRecord::new(1.0, 2.0)).unwrap().unwrap();
        assert_eq!(f.snapshot["A"].len(), 1);
        // the boundary record is itself the anchor
        assert_eq!(c.series("A").unwrap().timestamps().collect::<Vec<_>>(), vec![1.0]);
    }

    #[test]
    fn ties_on_boundary_are_all_retained() {
        let mut c = collector(1.0, 0.5, 0.0);
        for (t, v) in [(0.5, 1.0), (1.0, 2.0), (1.0, 3.0)] {
            assert!(c.apply("A", TimeRecord::new(t, v)).unwrap().is_none());
        }
        let f = c.apply("A", TimeRecord::new(1.6, 4.0)).unwrap().unwrap();
        assert_eq!(f.snapshot["A"].values().copied().collect::<Vec<_>>(), vec![1.0]);
        let kept = c.series("A").unwrap();
        assert_eq!(kept.values().copied().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn nan_record_leaves_collector_untouched() {
        let mut c = collector(1.0, 0.0, 0.0);
        assert!(c.apply("A", TimeRecord::new(f64::NAN, 1.0)).is_err());
        assert!(c.is_empty());
        assert_eq!(c.labels().count(), 0);
        assert!(c.take(f64::NAN).is_err());
    }
}
