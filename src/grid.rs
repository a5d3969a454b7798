//! Halo-padded 2D grid and boundary extension.
//!
//! All fields handled by the solver (the image and both dual components)
//! share one representation: a dense `(nx + 2) x (ny + 2)` array whose
//! interior is addressed by `1..=nx` / `1..=ny` and whose outermost cells
//! form a one-cell halo. The halo is scratch space: it only carries
//! meaningful values between a boundary-extension call and the next
//! finite-difference pass over the interior.

use ndarray::{s, Array2, ArrayView2, ArrayViewMut2};
use std::ops::{Index, IndexMut};

use crate::float_trait::TvFloat;

/// Dense 2D field with a one-cell halo on every side.
///
/// Backed by a single contiguous `ndarray::Array2` allocation rather than
/// per-row allocations, so there is no partial-allocation state to clean up.
#[derive(Debug, Clone)]
pub struct Grid<F> {
    data: Array2<F>,
    nx: usize,
    ny: usize,
}

impl<F: TvFloat> Grid<F> {
    /// Create a zero-filled grid with interior size `nx x ny`.
    ///
    /// Both dimensions must be at least 1.
    pub fn new(nx: usize, ny: usize) -> Self {
        assert!(nx >= 1 && ny >= 1, "grid interior must be at least 1x1");
        Self {
            data: Array2::zeros((nx + 2, ny + 2)),
            nx,
            ny,
        }
    }

    /// Create a grid whose interior is copied from `interior`; the halo
    /// starts out zeroed.
    pub fn from_interior(interior: ArrayView2<F>) -> Self {
        let (nx, ny) = interior.dim();
        let mut grid = Self::new(nx, ny);
        grid.interior_mut().assign(&interior);
        grid
    }

    /// Interior size in the first axis.
    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Interior size in the second axis.
    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// View of the interior (halo excluded).
    pub fn interior(&self) -> ArrayView2<'_, F> {
        self.data.slice(s![1..=self.nx, 1..=self.ny])
    }

    /// Mutable view of the interior (halo excluded).
    pub fn interior_mut(&mut self) -> ArrayViewMut2<'_, F> {
        self.data.slice_mut(s![1..=self.nx, 1..=self.ny])
    }

    /// Extract the interior as an owned array.
    pub fn into_interior(self) -> Array2<F> {
        self.interior().to_owned()
    }

    /// Copy all cells (halo included) from another grid of the same size.
    pub fn assign_from(&mut self, other: &Grid<F>) {
        debug_assert_eq!((self.nx, self.ny), (other.nx, other.ny));
        self.data.assign(&other.data);
    }

    /// Fill the halo by mirroring the boundary-adjacent interior cells
    /// (reflecting / Neumann boundary condition).
    ///
    /// The second pass runs over the full `0..=ny+1` range, so the four
    /// corners are filled as well. Interior values are untouched.
    pub fn extend_neumann(&mut self) {
        let (nx, ny) = (self.nx, self.ny);
        for i in 1..=nx {
            self.data[[i, 0]] = self.data[[i, 1]];
            self.data[[i, ny + 1]] = self.data[[i, ny]];
        }
        for j in 0..=ny + 1 {
            self.data[[0, j]] = self.data[[1, j]];
            self.data[[nx + 1, j]] = self.data[[nx, j]];
        }
    }

    /// Fill every halo cell with zero (Dirichlet boundary condition).
    ///
    /// Interior values are untouched.
    pub fn extend_dirichlet(&mut self) {
        let (nx, ny) = (self.nx, self.ny);
        for i in 1..=nx {
            self.data[[i, 0]] = F::zero();
            self.data[[i, ny + 1]] = F::zero();
        }
        for j in 0..=ny + 1 {
            self.data[[0, j]] = F::zero();
            self.data[[nx + 1, j]] = F::zero();
        }
    }
}

impl<F: TvFloat> Index<(usize, usize)> for Grid<F> {
    type Output = F;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &F {
        &self.data[[i, j]]
    }
}

impl<F: TvFloat> IndexMut<(usize, usize)> for Grid<F> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut F {
        &mut self.data[[i, j]]
    }
}
