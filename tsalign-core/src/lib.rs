//! tsalign-core
//!
//! Turns irregularly sampled, per-channel timestamped records into the aligned,
//! interpolated, and integrated forms multivariate algorithms expect.
//!
//! - `series`: the [`TimeSeries`] container and its order-preserving mutations.
//! - `value`: capability traits selecting which algebra an operation needs.
//! - `timeseries`: interval search, interpolation, quadrature, and merge.
//!
//! Everything here is synchronous and single-writer. A `TimeSeries` dereferences
//! to a read-only slice of records, so every routine in `timeseries` accepts
//! owned series and borrowed windows (`view_inner`/`view_outer`) alike.
#![warn(missing_docs)]

/// Owned, chronologically sorted record container.
pub mod series;
/// Time-series algorithms over sorted record slices.
pub mod timeseries;
pub mod types;
/// Value-type capability traits.
pub mod value;

pub use series::TimeSeries;
pub use timeseries::interpolate::{
    hold_at, hold_many, interpolate, interpolate_many, linear_at, strict_interpolate,
    strict_interpolate_many,
};
pub use timeseries::merge::{merge, merge_pair, merge_pair_with, merge_with, union_timestamps};
pub use timeseries::quadrature::{accumulate, average, integral, integrate};
pub use timeseries::search::{
    find_inner, find_outer, get_inner, get_outer, latest_at_or_before, view_inner, view_outer,
};
pub use types::*;
pub use value::{Integrable, Linear};
