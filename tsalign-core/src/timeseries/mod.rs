//! Time-series algorithms over sorted record slices.
//!
//! Modules include:
//! - `search`: inner/outer index ranges for a time interval
//! - `interpolate`: zero-order hold and linear estimates at arbitrary times
//! - `quadrature`: definite integrals, window averages, running integrals
//! - `merge`: align several series onto one timeline with a combiner
/// Order-0 and order-1 value estimation.
pub mod interpolate;
/// Merge-by-interpolation of multiple series.
pub mod merge;
/// Integration and averaging atop interpolation and search.
pub mod quadrature;
/// Binary-search range queries.
pub mod search;
mod util;
