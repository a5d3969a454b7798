//! Float trait abstraction for f32/f64 support.
//!
//! The solver is generic over the scalar type so that the same kernel can
//! run in single precision (the image path) or double precision (e.g. for
//! verifying discretisation properties at tighter tolerances).

use num_traits::{Float, FromPrimitive, NumAssign};
use std::fmt::{Debug, Display};
use std::iter::Sum;

/// Trait alias for floating point types supported by the TV solver.
///
/// Combines the bounds needed throughout the crate:
/// - Basic float operations (Float, NumAssign)
/// - Conversion from primitive types (FromPrimitive)
/// - Iteration support (Sum)
/// - Debug/Display printing
pub trait TvFloat:
    Float + FromPrimitive + NumAssign + Sum + Debug + Display + Send + Sync + 'static
{
    /// Create a value from an f64 constant.
    fn from_f64_c(val: f64) -> Self;

    /// Create a value from a usize constant.
    fn usize_as(val: usize) -> Self;

    /// Widen to f64 (for high-precision accumulation).
    fn to_f64_c(self) -> f64;
}

impl TvFloat for f32 {
    #[inline]
    fn from_f64_c(val: f64) -> Self {
        val as f32
    }

    #[inline]
    fn usize_as(val: usize) -> Self {
        val as f32
    }

    #[inline]
    fn to_f64_c(self) -> f64 {
        self as f64
    }
}

impl TvFloat for f64 {
    #[inline]
    fn from_f64_c(val: f64) -> Self {
        val
    }

    #[inline]
    fn usize_as(val: usize) -> Self {
        val as f64
    }

    #[inline]
    fn to_f64_c(self) -> f64 {
        self
    }
}
