//! Algebra a value type must support, by operation.
//!
//! - zero-order hold (`hold_at`, `hold_many`, search, `keep_latest`): `Clone` only
//! - linear interpolation and merge: [`Linear`]
//! - integration, averaging, accumulation: [`Integrable`]
//!
//! Both traits are blanket-implemented, so `f64`, numeric newtypes,
//! and user vector types qualify as soon as they provide the operations.
use core::ops::{Add, Mul};

use num_traits::Zero;

/// Values that can be blended linearly: `a * (1 - w) + b * w`.
pub trait Linear: Clone + Add<Output = Self> + Mul<f64, Output = Self> {}

impl<T> Linear for T where T: Clone + Add<Output = T> + Mul<f64, Output = T> {}

/// Values that can be integrated: linear plus an additive identity.
pub trait Integrable: Linear + Zero {}

impl<T> Integrable for T where T: Linear + Zero {}

#[cfg(test)]
mod tests {
    use super::*;

    fn needs_integrable<T: Integrable>(v: T) -> T {
        v.clone() + T::zero()
    }

    #[test]
    fn f64_is_integrable() {
        assert_eq!(needs_integrable(2.5_f64), 2.5);
    }
}
