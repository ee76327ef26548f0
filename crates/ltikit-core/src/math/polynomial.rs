//! Polynomial helpers
//!
//! Polynomials are coefficient slices in descending powers, so
//! `[1.0, 2.0, 3.0]` is s^2 + 2s + 3.

use ndarray::Array2;
use num_complex::Complex64;

use super::linalg;
use crate::error::{ControlError, Result};

/// Remove leading exact zeros, keeping at least one coefficient
pub fn trim_leading_zeros(p: &[f64]) -> Vec<f64> {
    match p.iter().position(|&c| c != 0.0) {
        Some(first) => p[first..].to_vec(),
        None => vec![0.0],
    }
}

/// Polynomial degree after trimming leading zeros
pub fn degree(p: &[f64]) -> usize {
    trim_leading_zeros(p).len() - 1
}

/// True if every coefficient is zero
pub fn is_zero(p: &[f64]) -> bool {
    p.iter().all(|&c| c == 0.0)
}

/// Left-pad with zeros to the given length
pub fn pad_left(p: &[f64], len: usize) -> Vec<f64> {
    if p.len() >= len {
        return p.to_vec();
    }
    let mut out = vec![0.0; len - p.len()];
    out.extend_from_slice(p);
    out
}

/// Sum of two polynomials
pub fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    let len = a.len().max(b.len());
    let a = pad_left(a, len);
    let b = pad_left(b, len);
    a.iter().zip(b.iter()).map(|(x, y)| x + y).collect()
}

/// Product of two polynomials
pub fn mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return vec![0.0];
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// Multiply every coefficient by a scalar
pub fn scale(p: &[f64], k: f64) -> Vec<f64> {
    p.iter().map(|c| c * k).collect()
}

/// Integer power of a polynomial
pub fn pow(p: &[f64], n: usize) -> Vec<f64> {
    (0..n).fold(vec![1.0], |acc, _| mul(&acc, p))
}

/// Evaluate at a complex point with Horner's rule
pub fn polyval(p: &[f64], s: Complex64) -> Complex64 {
    p.iter()
        .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * s + c)
}

/// Expand a monic polynomial from its roots: (s - r1)(s - r2)...(s - rn)
///
/// Roots are expected to be closed under conjugation; the residual
/// imaginary parts of the expanded coefficients are dropped.
pub fn poly_from_roots(roots: &[Complex64]) -> Vec<f64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];

    for &root in roots {
        let mut next = vec![Complex64::new(0.0, 0.0); coeffs.len() + 1];
        for (i, &c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= root * c;
        }
        coeffs = next;
    }

    coeffs.iter().map(|c| c.re).collect()
}

/// Roots of a real polynomial
///
/// Computed as eigenvalues of the companion matrix with a bounded Schur
/// iteration. Trailing zero coefficients yield exact roots at the origin.
pub fn roots(p: &[f64], max_iterations: usize) -> Result<Vec<Complex64>> {
    if p.iter().any(|c| !c.is_finite()) {
        return Err(ControlError::InvalidArgument(
            "polynomial has non-finite coefficients".to_string(),
        ));
    }
    let p = trim_leading_zeros(p);
    if is_zero(&p) {
        return Err(ControlError::InvalidArgument(
            "roots of the zero polynomial are undefined".to_string(),
        ));
    }

    let n_origin = p.iter().rev().take_while(|&&c| c == 0.0).count();
    let core = &p[..p.len() - n_origin];
    let degree = core.len() - 1;

    let mut out = Vec::with_capacity(degree + n_origin);
    match degree {
        0 => {}
        1 => out.push(Complex64::new(-core[1] / core[0], 0.0)),
        _ => {
            let lead = core[0];
            let mut companion = Array2::<f64>::zeros((degree, degree));
            for j in 0..degree {
                companion[[0, j]] = -core[j + 1] / lead;
            }
            for i in 1..degree {
                companion[[i, i - 1]] = 1.0;
            }
            out.extend(linalg::eigenvalues(&companion, max_iterations)?);
        }
    }
    out.extend(std::iter::repeat(Complex64::new(0.0, 0.0)).take(n_origin));

    Ok(out)
}

/// Zero out imaginary parts below `tol`
pub fn snap_real(values: &mut [Complex64], tol: f64) {
    for v in values.iter_mut() {
        if v.im.abs() < tol {
            v.im = 0.0;
        }
    }
}

/// Check that every complex value has its conjugate in the set
///
/// Values with |Im| < `real_tol` count as real. Matching uses a relative
/// tolerance `conj_tol` scaled by the value's magnitude.
pub fn is_conjugate_closed(values: &[Complex64], real_tol: f64, conj_tol: f64) -> bool {
    let mut used = vec![false; values.len()];

    for (i, v) in values.iter().enumerate() {
        if v.im.abs() < real_tol || used[i] {
            continue;
        }
        let target = v.conj();
        let tol = conj_tol * v.norm().max(1.0);
        let partner = values.iter().enumerate().position(|(j, w)| {
            j != i && !used[j] && w.im.abs() >= real_tol && (w - target).norm() <= tol
        });
        match partner {
            Some(j) => {
                used[i] = true;
                used[j] = true;
            }
            None => return false,
        }
    }
    true
}
