//! Value types, configuration primitives, and the error type shared by the tsalign crates.
#![warn(missing_docs)]

mod config;
mod error;
mod interval;
mod record;

pub use config::{CollectorConfig, InterpOrder};
pub use error::TsError;
pub use interval::{TimeInterval, epoch_seconds};
pub use record::TimeRecord;
