//! Numerical constants for LTI computations
//!
//! Provides standardized tolerance values and defaults used throughout
//! the library. Components read these through [`crate::config::NumericConfig`]
//! rather than directly, so a caller can override them per component.

/// Absolute threshold below which an imaginary part is considered negligible.
/// A root or pole with |Im| below this value is treated as real.
pub const REAL_TOL: f64 = 1e-12;

/// Relative tolerance for matching a complex root with its conjugate partner.
pub const CONJUGATE_TOL: f64 = 1e-8;

/// Relative threshold for dropping spurious leading polynomial coefficients
/// produced by cancellation (e.g. in state-space to transfer function).
pub const COEFF_TOL: f64 = 1e-12;

/// Iteration bound for the Schur eigenvalue solver.
pub const EIG_MAX_ITERATIONS: usize = 10_000;

/// Number of points in an automatically generated frequency grid.
pub const DEFAULT_GRID_POINTS: usize = 2000;

/// Decades added on each side of the pole/zero features of a model
/// when generating its frequency grid.
pub const GRID_PERIPHERY_DECADES: f64 = 2.0;

/// Frequency (rad/s) used as the grid center when a model has no
/// non-zero poles or zeros.
pub const DEFAULT_GRID_CENTER: f64 = 1.0;
