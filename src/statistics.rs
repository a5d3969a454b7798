//! Interior min/max/mean/standard-deviation of a grid.
//!
//! Diagnostic only; the solver does not depend on this module.

use crate::float_trait::TvFloat;
use crate::grid::Grid;

/// Summary statistics of a grid interior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageStats<F> {
    pub min: F,
    pub max: F,
    pub mean: F,
    /// Population standard deviation (divisor N, not N - 1).
    pub std: F,
}

/// Compute min, max, mean and population standard deviation over the
/// interior of `u`.
///
/// Means are accumulated in f64 to limit rounding error on large images;
/// the standard deviation uses a second pass against the finished mean.
pub fn analyse<F: TvFloat>(u: &Grid<F>) -> ImageStats<F> {
    let (nx, ny) = (u.nx(), u.ny());
    let count = (nx * ny) as f64;

    let mut min = u[(1, 1)];
    let mut max = u[(1, 1)];
    let mut sum = 0.0f64;
    for i in 1..=nx {
        for j in 1..=ny {
            let value = u[(i, j)];
            if value < min {
                min = value;
            }
            if value > max {
                max = value;
            }
            sum += value.to_f64_c();
        }
    }
    let mean = sum / count;

    let mut sq_sum = 0.0f64;
    for i in 1..=nx {
        for j in 1..=ny {
            let deviation = u[(i, j)].to_f64_c() - mean;
            sq_sum += deviation * deviation;
        }
    }

    ImageStats {
        min,
        max,
        mean: F::from_f64_c(mean),
        std: F::from_f64_c((sq_sum / count).sqrt()),
    }
}
