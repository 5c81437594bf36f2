//! Configuration types shared by the interpolation routines and the collector.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::TsError;

/// Interpolation order used to estimate a value between samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpOrder {
    /// Order 0: zero-order hold, the latest sample at or before the query time.
    #[default]
    Hold,
    /// Order 1: straight line between the bracketing samples.
    Linear,
}

impl TryFrom<u8> for InterpOrder {
    type Error = TsError;

    fn try_from(order: u8) -> Result<Self, Self::Error> {
        match order {
            0 => Ok(Self::Hold),
            1 => Ok(Self::Linear),
            other => Err(TsError::InvalidArg(format!(
                "interpolation order must be 0 or 1, got {other}"
            ))),
        }
    }
}

/// Windowing parameters for a time-series collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Nominal chunk width. Zero flushes on every distinct new timestamp.
    pub interval: Duration,
    /// Grace period before a chunk boundary is finalized, absorbing late arrivals.
    pub delay: Duration,
    /// Force a flush when a bus-driven collector sees no input for this long.
    pub idle_timeout: Option<Duration>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            delay: Duration::ZERO,
            idle_timeout: None,
        }
    }
}

impl CollectorConfig {
    /// Chunk width in seconds.
    #[must_use]
    pub fn interval_secs(&self) -> f64 {
        self.interval.as_secs_f64()
    }

    /// Grace period in seconds.
    #[must_use]
    pub fn delay_secs(&self) -> f64 {
        self.delay.as_secs_f64()
    }
}
