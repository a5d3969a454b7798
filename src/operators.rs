//! Discrete gradient and divergence operators.
//!
//! `gradient` is the forward-difference operator D, `divergence` its formal
//! adjoint Dᵗ (negative backward differences). The pair satisfies
//! `<D u, p> = <u, Dᵗ p>` for every dual field `p` in the range of D,
//! i.e. with vanishing last row (x-component) and last column
//! (y-component) -- which is exactly where the solver's dual iterates
//! live. This identity anchors the correctness of the whole scheme and is
//! verified in the tests below.

use crate::float_trait::TvFloat;
use crate::grid::Grid;

/// Forward differences of `u` in both axis directions.
///
/// The halo of `u` is refreshed with a Neumann (mirror) extension first,
/// so the one-sided difference at the last row/column evaluates to zero.
/// The interior of `dx` and `dy` is overwritten.
pub fn gradient<F: TvFloat>(u: &mut Grid<F>, dx: &mut Grid<F>, dy: &mut Grid<F>) {
    let (nx, ny) = (u.nx(), u.ny());
    debug_assert_eq!((nx, ny), (dx.nx(), dx.ny()));
    debug_assert_eq!((nx, ny), (dy.nx(), dy.ny()));

    u.extend_neumann();

    for i in 1..=nx {
        for j in 1..=ny {
            dx[(i, j)] = u[(i + 1, j)] - u[(i, j)];
            dy[(i, j)] = u[(i, j + 1)] - u[(i, j)];
        }
    }
}

/// Negative backward differences of the field `(dx, dy)`, i.e. `out = Dᵗ (dx, dy)`.
///
/// The halos of `dx` and `dy` are zeroed (Dirichlet extension) first; this
/// is the boundary condition that makes the operator the adjoint of
/// [`gradient`]. The interior of `out` is overwritten.
pub fn divergence<F: TvFloat>(dx: &mut Grid<F>, dy: &mut Grid<F>, out: &mut Grid<F>) {
    let (nx, ny) = (out.nx(), out.ny());
    debug_assert_eq!((nx, ny), (dx.nx(), dx.ny()));
    debug_assert_eq!((nx, ny), (dy.nx(), dy.ny()));

    dx.extend_dirichlet();
    dy.extend_dirichlet();

    for i in 1..=nx {
        for j in 1..=ny {
            out[(i, j)] = dx[(i - 1, j)] - dx[(i, j)] + dy[(i, j - 1)] - dy[(i, j)];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use rand::prelude::*;

    fn random_grid(nx: usize, ny: usize, seed: u64) -> Grid<f32> {
        let mut rng = StdRng::seed_from_u64(seed);
        let interior = Array2::from_shape_fn((nx, ny), |_| rng.gen::<f32>() * 255.0);
        Grid::from_interior(interior.view())
    }

    /// Inner product over the interior, accumulated in f64.
    fn dot(a: &Grid<f32>, b: &Grid<f32>) -> f64 {
        let mut acc = 0.0f64;
        for i in 1..=a.nx() {
            for j in 1..=a.ny() {
                acc += a[(i, j)] as f64 * b[(i, j)] as f64;
            }
        }
        acc
    }

    #[test]
    fn test_gradient_forward_differences() {
        // 3x1 ramp 0, 1, 4: dx = 1, 3, 0 (mirrored at the far end).
        let interior = Array2::from_shape_vec((3, 1), vec![0.0f32, 1.0, 4.0]).unwrap();
        let mut u = Grid::from_interior(interior.view());
        let mut dx = Grid::new(3, 1);
        let mut dy = Grid::new(3, 1);

        gradient(&mut u, &mut dx, &mut dy);

        assert_eq!(dx[(1, 1)], 1.0);
        assert_eq!(dx[(2, 1)], 3.0);
        assert_eq!(dx[(3, 1)], 0.0, "mirror halo must zero the last difference");
        for i in 1..=3 {
            assert_eq!(dy[(i, 1)], 0.0, "ny=1 has no y-variation");
        }
    }

    #[test]
    fn test_gradient_of_constant_is_zero() {
        let interior = Array2::from_elem((5, 4), 42.0f32);
        let mut u = Grid::from_interior(interior.view());
        let mut dx = Grid::new(5, 4);
        let mut dy = Grid::new(5, 4);

        gradient(&mut u, &mut dx, &mut dy);

        for i in 1..=5 {
            for j in 1..=4 {
                assert_eq!(dx[(i, j)], 0.0);
                assert_eq!(dy[(i, j)], 0.0);
            }
        }
    }

    #[test]
    fn test_divergence_of_zero_field_is_zero() {
        let mut dx = Grid::<f32>::new(4, 4);
        let mut dy = Grid::<f32>::new(4, 4);
        let mut out = random_grid(4, 4, 7);

        divergence(&mut dx, &mut dy, &mut out);

        for i in 1..=4 {
            for j in 1..=4 {
                assert_eq!(out[(i, j)], 0.0);
            }
        }
    }

    #[test]
    fn test_adjointness_on_dual_range() {
        // The dual field must lie in the range of the gradient (zero last
        // row / column per component); generating it as D(w) for random w
        // makes the adjoint identity hold up to rounding only.
        for (nx, ny, seed) in [(8, 8, 1u64), (5, 9, 2), (16, 3, 3), (1, 7, 4)] {
            let mut u = random_grid(nx, ny, seed);
            let mut w = random_grid(nx, ny, seed + 100);
            let mut px = Grid::new(nx, ny);
            let mut py = Grid::new(nx, ny);
            gradient(&mut w, &mut px, &mut py);

            let mut du_x = Grid::new(nx, ny);
            let mut du_y = Grid::new(nx, ny);
            gradient(&mut u, &mut du_x, &mut du_y);
            let lhs = dot(&du_x, &px) + dot(&du_y, &py);

            let mut div_p = Grid::new(nx, ny);
            divergence(&mut px, &mut py, &mut div_p);
            let rhs = dot(&u, &div_p);

            let scale = lhs.abs().max(rhs.abs()).max(1.0);
            assert!(
                ((lhs - rhs) / scale).abs() < 1e-4,
                "adjointness violated for {}x{}: <Du,p>={} vs <u,Dtp>={}",
                nx,
                ny,
                lhs,
                rhs
            );
        }
    }

    #[test]
    fn test_divergence_matches_hand_computed_stencil() {
        // 2x2 field with only dx populated; dy zero.
        let dx_vals = Array2::from_shape_vec((2, 2), vec![1.0f32, 2.0, 3.0, 4.0]).unwrap();
        let mut dx = Grid::from_interior(dx_vals.view());
        let mut dy = Grid::<f32>::new(2, 2);
        let mut out = Grid::new(2, 2);

        divergence(&mut dx, &mut dy, &mut out);

        // out[i][j] = dx[i-1][j] - dx[i][j] with dx[0][j] = 0.
        assert_eq!(out[(1, 1)], -1.0);
        assert_eq!(out[(1, 2)], -2.0);
        assert_eq!(out[(2, 1)], 1.0 - 3.0);
        assert_eq!(out[(2, 2)], 2.0 - 4.0);
    }
}
