//! Per-pixel Euclidean projection onto the dual feasible set.
//!
//! The TV dual variable is constrained to `sqrt(bx^2 + by^2) <= alpha` at
//! every interior pixel. The projection clips each pixel's vector
//! independently; there is no coupling across pixels.

use crate::float_trait::TvFloat;
use crate::grid::Grid;

/// Project the field `(dx, dy)` onto the closed disk of radius `alpha`,
/// pixel by pixel.
///
/// Pixels whose magnitude already lies within the disk are left bit-exact.
/// Rescaled pixels can land a rounding step outside the disk, so a second
/// projection may nudge them by an ulp; it never moves any pixel further
/// than that. `alpha` must be positive; the solver validates this before
/// any iteration runs.
pub fn project_onto_ball<F: TvFloat>(alpha: F, dx: &mut Grid<F>, dy: &mut Grid<F>) {
    let (nx, ny) = (dx.nx(), dx.ny());
    debug_assert_eq!((nx, ny), (dy.nx(), dy.ny()));
    debug_assert!(alpha > F::zero());

    for i in 1..=nx {
        for j in 1..=ny {
            let x = dx[(i, j)];
            let y = dy[(i, j)];
            let magnitude = (x * x + y * y).sqrt();
            if magnitude > alpha {
                let scale = alpha / magnitude;
                dx[(i, j)] = x * scale;
                dy[(i, j)] = y * scale;
            }
        }
    }
}
