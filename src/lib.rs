//! Total-variation image denoising.
//!
//! Restores a greyscale image by solving a TV-regularised least-squares
//! problem with accelerated forward-backward splitting (FISTA) applied to
//! the dual formulation. The crate contains the numerical kernel (grid,
//! gradient/divergence operator pair, dual projection, accelerated
//! iteration), PGM image I/O and diagnostic statistics.

pub mod float_trait;
pub mod grid;
pub mod operators;
pub mod pgm;
pub mod projection;
pub mod solver;
pub mod statistics;

// Re-export commonly used types at the crate root
pub use float_trait::TvFloat;
pub use grid::Grid;
pub use operators::{divergence, gradient};
pub use pgm::{read_pgm, read_pgm_file, write_pgm, write_pgm_file, PgmError};
pub use projection::project_onto_ball;
pub use solver::{tv_denoise, tv_denoise_image, tv_denoise_stack, TvConfig, TvError};
pub use statistics::{analyse, ImageStats};
