//! Re-export of foundational types from `tsalign-types`.
// Consolidated re-exports so downstream crates can depend on `tsalign-core` only

pub use tsalign_types::{
    CollectorConfig, InterpOrder, TimeInterval, TimeRecord, TsError, epoch_seconds,
};
