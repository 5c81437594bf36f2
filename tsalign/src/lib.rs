//! tsalign turns irregularly sampled, labelled telemetry into fixed-width,
//! aligned chunks ready for multivariate processing.
//!
//! Overview
//! - [`TimeSeries`] keeps records in chronological order and only lets
//!   timestamps change through order-preserving operations.
//! - Search, interpolation (zero-order hold or linear), quadrature, and merge
//!   come from `tsalign-core` and are re-exported here.
//! - [`TimeSeriesCollector`] buffers per-label records and emits a
//!   [`Flush`] each time a record closes the current window.
//! - [`CollectorHandle`] drives a collector from a Tokio channel and hands
//!   each flush to a callback.
//!
//! Windowing
//! - The timer starts at the interval-aligned floor of the start time.
//! - A record at `t` flushes when `floor((t - delay) / interval) * interval`
//!   is beyond the timer; that value becomes the new boundary.
//! - Each label's snapshot holds its records before the boundary. The latest
//!   record at or before the boundary stays buffered as the anchor for the
//!   next window, so a zero-order hold over the next chunk has a starting value.
//! - A record older than the last boundary is still stored and appears in
//!   the next snapshot, but outside that snapshot's interval; a consumer that
//!   only looks inside the interval never sees it. A larger `delay` trades
//!   latency for fewer such records.
//!
//! Example
//! ```
//! use std::time::Duration;
//! use tsalign::{InterpOrder, TimeRecord, TimeSeriesCollector, average};
//!
//! let mut collector = TimeSeriesCollector::builder()
//!     .interval(Duration::from_secs(1))
//!     .start_at(0.0)
//!     .build()
//!     .unwrap();
//! collector.apply("speed", TimeRecord::new(0.2, 4.0)).unwrap();
//! collector.apply("speed", TimeRecord::new(0.6, 6.0)).unwrap();
//! let flush = collector.apply("speed", TimeRecord::new(1.1, 5.0)).unwrap().unwrap();
//!
//! let iv = flush.interval;
//! let mean = average(&flush.snapshot["speed"], &[iv.lo(), iv.hi()], InterpOrder::Hold).unwrap();
//! assert!((mean[0] - 4.8).abs() < 1e-12);
//! ```
#![warn(missing_docs)]

/// Windowed, per-label record buffer.
pub mod collector;
/// Flush results and callback task handles.
pub mod flush;
/// Channel-driven collector task.
pub mod task;

pub use collector::{CollectorBuilder, TimeSeriesCollector};
pub use flush::{Flush, FlushTask, Snapshot};
pub use task::{CollectorHandle, Tagged};

pub use tsalign_core::{
    CollectorConfig, Integrable, InterpOrder, Linear, TimeInterval, TimeRecord, TimeSeries,
    TsError, accumulate, average, epoch_seconds, find_inner, find_outer, get_inner, get_outer,
    hold_at, hold_many, integral, integrate, interpolate, interpolate_many, latest_at_or_before,
    linear_at, merge, merge_pair, merge_pair_with, merge_with, strict_interpolate,
    strict_interpolate_many, union_timestamps, view_inner, view_outer,
};
