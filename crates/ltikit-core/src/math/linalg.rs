//! Linear algebra operations
//!
//! This module provides a unified interface for matrix operations.
//! Models store their matrices as ndarray arrays; nalgebra does the
//! factorizations. All ndarray<->nalgebra conversions are contained here.

use nalgebra::linalg::Schur;
use nalgebra::DMatrix;
use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{ControlError, Result};

// ============================================================================
// Conversion helpers (internal)
// ============================================================================

/// Convert ndarray Array2<Complex64> to nalgebra DMatrix<Complex<f64>>
#[inline]
fn to_na_complex(a: &Array2<Complex64>) -> DMatrix<nalgebra::Complex<f64>> {
    let (m, n) = a.dim();
    DMatrix::from_fn(m, n, |i, j| {
        nalgebra::Complex::new(a[[i, j]].re, a[[i, j]].im)
    })
}

/// Convert nalgebra DMatrix<Complex<f64>> to ndarray Array2<Complex64>
#[inline]
fn from_na_complex(m: &DMatrix<nalgebra::Complex<f64>>) -> Array2<Complex64> {
    let rows = m.nrows();
    let cols = m.ncols();
    Array2::from_shape_fn((rows, cols), |(i, j)| {
        Complex64::new(m[(i, j)].re, m[(i, j)].im)
    })
}

/// Convert ndarray Array2<f64> to nalgebra DMatrix<f64>
#[inline]
fn to_na_real(a: &Array2<f64>) -> DMatrix<f64> {
    let (m, n) = a.dim();
    DMatrix::from_fn(m, n, |i, j| a[[i, j]])
}

/// Convert nalgebra DMatrix<f64> to ndarray Array2<f64>
#[inline]
fn from_na_real(m: &DMatrix<f64>) -> Array2<f64> {
    let rows = m.nrows();
    let cols = m.ncols();
    Array2::from_shape_fn((rows, cols), |(i, j)| m[(i, j)])
}

// ============================================================================
// Matrix inversion and linear solves
// ============================================================================

/// Solve A X = B for real matrices with an LU factorization
///
/// Returns None if A is singular, non-square, or the row counts disagree.
pub fn solve_real(a: &Array2<f64>, b: &Array2<f64>) -> Option<Array2<f64>> {
    let (m, n) = a.dim();
    if m != n || b.nrows() != m {
        return None;
    }
    if m == 0 {
        return Some(Array2::zeros((0, b.ncols())));
    }

    let lu = to_na_real(a).lu();
    let x = lu.solve(&to_na_real(b))?;
    if x.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(from_na_real(&x))
}

/// Solve A X = B for complex matrices with an LU factorization
///
/// Returns None if A is singular, non-square, or the row counts disagree.
pub fn solve_complex(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Option<Array2<Complex64>> {
    let (m, n) = a.dim();
    if m != n || b.nrows() != m {
        return None;
    }
    if m == 0 {
        return Some(Array2::zeros((0, b.ncols())));
    }

    let lu = to_na_complex(a).lu();
    let x = lu.solve(&to_na_complex(b))?;
    if x.iter().any(|v| !v.re.is_finite() || !v.im.is_finite()) {
        return None;
    }
    Some(from_na_complex(&x))
}

// ============================================================================
// Eigenvalue decomposition
// ============================================================================

/// Compute complex eigenvalues of a real matrix
///
/// Uses a real Schur decomposition whose iteration count is bounded by
/// `max_iterations`; exceeding the bound is reported as non-convergence
/// instead of looping indefinitely.
pub fn eigenvalues(a: &Array2<f64>, max_iterations: usize) -> Result<Vec<Complex64>> {
    let (m, n) = a.dim();
    if m != n {
        return Err(ControlError::IncompatibleShape(format!(
            "eigenvalues need a square matrix, got {}x{}",
            m, n
        )));
    }
    if m == 0 {
        return Ok(Vec::new());
    }
    if m == 1 {
        return Ok(vec![Complex64::new(a[[0, 0]], 0.0)]);
    }
    if a.iter().any(|v| !v.is_finite()) {
        return Err(ControlError::InvalidArgument(
            "matrix contains non-finite entries".to_string(),
        ));
    }

    let schur = Schur::try_new(to_na_real(a), f64::EPSILON, max_iterations.max(1)).ok_or(
        ControlError::NumericalNonconvergence {
            solver: "Schur eigenvalue solver",
            order: m,
        },
    )?;
    let eigs = schur.complex_eigenvalues();

    Ok(eigs.iter().map(|e| Complex64::new(e.re, e.im)).collect())
}

// ============================================================================
// Matrix exponential
// ============================================================================

/// Matrix exponential of a real square matrix
pub fn expm(a: &Array2<f64>) -> Result<Array2<f64>> {
    let (m, n) = a.dim();
    if m != n {
        return Err(ControlError::IncompatibleShape(format!(
            "matrix exponential needs a square matrix, got {}x{}",
            m, n
        )));
    }
    if m == 0 {
        return Ok(Array2::zeros((0, 0)));
    }

    let exp = to_na_real(a).exp();
    Ok(from_na_real(&exp))
}
