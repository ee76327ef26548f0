//! State-space representation
//!
//! dx = A x + B u, y = C x + D u, with dx the derivative (continuous) or
//! the next state (discrete).

use ndarray::Array2;
use num_complex::Complex64;

use super::{LtiSystem, Timebase};
use crate::constants::EIG_MAX_ITERATIONS;
use crate::error::{shape_str, ControlError, Result};
use crate::math::linalg;

/// State-space model (A, B, C, D)
#[derive(Debug, Clone, PartialEq)]
pub struct StateSpace {
    a: Array2<f64>,
    b: Array2<f64>,
    c: Array2<f64>,
    d: Array2<f64>,
    timebase: Timebase,
}

impl StateSpace {
    /// Create a state-space model, validating matrix shapes
    ///
    /// A must be n x n, B n x m, C p x n and D p x m. A model without
    /// states (n = 0) is a static gain D.
    pub fn new(
        a: Array2<f64>,
        b: Array2<f64>,
        c: Array2<f64>,
        d: Array2<f64>,
        timebase: Timebase,
    ) -> Result<Self> {
        timebase.validate()?;

        let (n, n2) = a.dim();
        if n != n2 {
            return Err(ControlError::IncompatibleShape(format!(
                "A must be square, got {}",
                shape_str(a.dim())
            )));
        }
        if b.nrows() != n {
            return Err(ControlError::IncompatibleShape(format!(
                "B must have {} rows to match A, got {}",
                n,
                shape_str(b.dim())
            )));
        }
        if c.ncols() != n {
            return Err(ControlError::IncompatibleShape(format!(
                "C must have {} columns to match A, got {}",
                n,
                shape_str(c.dim())
            )));
        }
        if d.dim() != (c.nrows(), b.ncols()) {
            return Err(ControlError::IncompatibleShape(format!(
                "D must be {} to match C rows and B columns, got {}",
                shape_str((c.nrows(), b.ncols())),
                shape_str(d.dim())
            )));
        }
        if [&a, &b, &c, &d]
            .iter()
            .any(|m| m.iter().any(|v| !v.is_finite()))
        {
            return Err(ControlError::InvalidArgument(
                "state-space matrices must be finite".to_string(),
            ));
        }

        Ok(Self {
            a,
            b,
            c,
            d,
            timebase,
        })
    }

    /// Create from row-major nested vectors, as a caller would write them by hand
    pub fn from_rows(
        a: &[Vec<f64>],
        b: &[Vec<f64>],
        c: &[Vec<f64>],
        d: &[Vec<f64>],
        timebase: Timebase,
    ) -> Result<Self> {
        Self::new(
            rows_to_array(a, "A")?,
            rows_to_array(b, "B")?,
            rows_to_array(c, "C")?,
            rows_to_array(d, "D")?,
            timebase,
        )
    }

    /// Static gain model without states
    pub fn static_gain(d: Array2<f64>, timebase: Timebase) -> Result<Self> {
        let (p, m) = d.dim();
        Self::new(
            Array2::zeros((0, 0)),
            Array2::zeros((0, m)),
            Array2::zeros((p, 0)),
            d,
            timebase,
        )
    }

    #[inline]
    pub fn a(&self) -> &Array2<f64> {
        &self.a
    }

    #[inline]
    pub fn b(&self) -> &Array2<f64> {
        &self.b
    }

    #[inline]
    pub fn c(&self) -> &Array2<f64> {
        &self.c
    }

    #[inline]
    pub fn d(&self) -> &Array2<f64> {
        &self.d
    }

    /// Number of states (model order)
    #[inline]
    pub fn nstates(&self) -> usize {
        self.a.nrows()
    }

    /// Poles of the model (eigenvalues of A)
    pub fn poles(&self) -> Result<Vec<Complex64>> {
        self.poles_bounded(EIG_MAX_ITERATIONS)
    }

    pub(crate) fn poles_bounded(&self, max_iterations: usize) -> Result<Vec<Complex64>> {
        linalg::eigenvalues(&self.a, max_iterations)
    }

    /// Evaluate C (sI - A)^-1 B + D at a complex point
    pub fn evaluate(&self, s: Complex64) -> Result<Array2<Complex64>> {
        let n = self.nstates();
        let d = self.d.mapv(|v| Complex64::new(v, 0.0));
        if n == 0 {
            return Ok(d);
        }

        let si_a = Array2::from_shape_fn((n, n), |(i, j)| {
            let diag = if i == j { s } else { Complex64::new(0.0, 0.0) };
            diag - self.a[[i, j]]
        });
        let b = self.b.mapv(|v| Complex64::new(v, 0.0));
        let x = linalg::solve_complex(&si_a, &b).ok_or_else(|| {
            ControlError::SingularConversion(format!("sI - A is singular at s = {}", s))
        })?;

        let c = self.c.mapv(|v| Complex64::new(v, 0.0));
        Ok(c.dot(&x) + d)
    }
}

impl LtiSystem for StateSpace {
    fn ninputs(&self) -> usize {
        self.b.ncols()
    }

    fn noutputs(&self) -> usize {
        self.c.nrows()
    }

    fn timebase(&self) -> Timebase {
        self.timebase
    }

    fn freq_eval(&self, w: f64) -> Result<Array2<Complex64>> {
        self.evaluate(self.timebase.frequency_point(w))
    }
}

fn rows_to_array(rows: &[Vec<f64>], name: &str) -> Result<Array2<f64>> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, |r| r.len());
    if rows.iter().any(|r| r.len() != ncols) {
        return Err(ControlError::IncompatibleShape(format!(
            "rows of {} have different lengths",
            name
        )));
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((nrows, ncols), flat)
        .map_err(|e| ControlError::IncompatibleShape(format!("{}: {}", name, e)))
}
