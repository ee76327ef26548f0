//! Numeric configuration passed into each component
//!
//! Every converter, discretizer and analyzer owns a `NumericConfig`; the
//! free functions use the default.

use crate::constants::{
    CONJUGATE_TOL, COEFF_TOL, DEFAULT_GRID_CENTER, DEFAULT_GRID_POINTS, EIG_MAX_ITERATIONS,
    GRID_PERIPHERY_DECADES, REAL_TOL,
};

/// Tolerances and iteration limits for numerical routines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericConfig {
    /// |Im| below this marks a root as real
    pub real_tol: f64,
    /// Relative tolerance for conjugate pairing of roots
    pub conjugate_tol: f64,
    /// Relative threshold for trimming leading polynomial coefficients
    pub coeff_tol: f64,
    /// Iteration bound for the Schur eigenvalue solver
    pub max_eig_iterations: usize,
    /// Points in an automatically generated frequency grid
    pub grid_points: usize,
    /// Decades of margin around the model's features in a generated grid
    pub grid_periphery_decades: f64,
    /// Grid center (rad/s) for models without non-zero features
    pub grid_center: f64,
}

impl Default for NumericConfig {
    fn default() -> Self {
        Self {
            real_tol: REAL_TOL,
            conjugate_tol: CONJUGATE_TOL,
            coeff_tol: COEFF_TOL,
            max_eig_iterations: EIG_MAX_ITERATIONS,
            grid_points: DEFAULT_GRID_POINTS,
            grid_periphery_decades: GRID_PERIPHERY_DECADES,
            grid_center: DEFAULT_GRID_CENTER,
        }
    }
}

impl NumericConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style override of the frequency grid density
    pub fn with_grid_points(mut self, grid_points: usize) -> Self {
        self.grid_points = grid_points;
        self
    }

    /// Builder-style override of the eigenvalue iteration bound
    pub fn with_max_eig_iterations(mut self, max_eig_iterations: usize) -> Self {
        self.max_eig_iterations = max_eig_iterations;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_constants() {
        let cfg = NumericConfig::default();
        assert_eq!(cfg.real_tol, 1e-12);
        assert_eq!(cfg.max_eig_iterations, EIG_MAX_ITERATIONS);
        assert_eq!(cfg.grid_points, DEFAULT_GRID_POINTS);
    }

    #[test]
    fn test_builder_overrides() {
        let cfg = NumericConfig::new()
            .with_grid_points(500)
            .with_max_eig_iterations(3);
        assert_eq!(cfg.grid_points, 500);
        assert_eq!(cfg.max_eig_iterations, 3);
    }
}
