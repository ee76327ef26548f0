//! Transfer function representation
//!
//! One numerator/denominator polynomial pair per (output, input) channel,
//! coefficients in descending powers of s (or z).

use ndarray::Array2;
use num_complex::Complex64;

use super::{require_siso, LtiSystem, Timebase};
use crate::constants::EIG_MAX_ITERATIONS;
use crate::error::{ControlError, Result};
use crate::math::polynomial;

/// Transfer function model, entries indexed `[output][input]`
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction {
    pub(super) num: Vec<Vec<Vec<f64>>>,
    pub(super) den: Vec<Vec<Vec<f64>>>,
    pub(super) timebase: Timebase,
}

impl TransferFunction {
    /// Create a MIMO transfer function
    ///
    /// Leading zero coefficients are trimmed. Every denominator must be
    /// non-zero, and numerator/denominator tables must share one
    /// outputs x inputs shape.
    pub fn new(
        num: Vec<Vec<Vec<f64>>>,
        den: Vec<Vec<Vec<f64>>>,
        timebase: Timebase,
    ) -> Result<Self> {
        timebase.validate()?;

        let noutputs = num.len();
        let ninputs = num.first().map_or(0, |row| row.len());
        if noutputs == 0 || ninputs == 0 {
            return Err(ControlError::IncompatibleShape(
                "transfer function needs at least one output and one input".to_string(),
            ));
        }
        if den.len() != noutputs
            || num.iter().any(|row| row.len() != ninputs)
            || den.iter().any(|row| row.len() != ninputs)
        {
            return Err(ControlError::IncompatibleShape(format!(
                "numerator is {}x{} but denominator rows do not match",
                noutputs, ninputs
            )));
        }

        let mut num_t = Vec::with_capacity(noutputs);
        let mut den_t = Vec::with_capacity(noutputs);
        for (i, (num_row, den_row)) in num.iter().zip(den.iter()).enumerate() {
            let mut nr = Vec::with_capacity(ninputs);
            let mut dr = Vec::with_capacity(ninputs);
            for (j, (n, d)) in num_row.iter().zip(den_row.iter()).enumerate() {
                if n.iter().chain(d.iter()).any(|c| !c.is_finite()) {
                    return Err(ControlError::InvalidArgument(format!(
                        "channel ({}, {}) has non-finite coefficients",
                        i, j
                    )));
                }
                if d.is_empty() || polynomial::is_zero(d) {
                    return Err(ControlError::InvalidArgument(format!(
                        "denominator of channel ({}, {}) is zero",
                        i, j
                    )));
                }
                let n = if n.is_empty() {
                    vec![0.0]
                } else {
                    polynomial::trim_leading_zeros(n)
                };
                nr.push(n);
                dr.push(polynomial::trim_leading_zeros(d));
            }
            num_t.push(nr);
            den_t.push(dr);
        }

        Ok(Self {
            num: num_t,
            den: den_t,
            timebase,
        })
    }

    /// Create a single-input single-output transfer function
    pub fn siso(num: Vec<f64>, den: Vec<f64>, timebase: Timebase) -> Result<Self> {
        Self::new(vec![vec![num]], vec![vec![den]], timebase)
    }

    /// Numerator of channel (output i, input j)
    pub fn num(&self, i: usize, j: usize) -> &[f64] {
        &self.num[i][j]
    }

    /// Denominator of channel (output i, input j)
    pub fn den(&self, i: usize, j: usize) -> &[f64] {
        &self.den[i][j]
    }

    /// All numerators, `[output][input]`
    pub fn num_table(&self) -> &[Vec<Vec<f64>>] {
        &self.num
    }

    /// All denominators, `[output][input]`
    pub fn den_table(&self) -> &[Vec<Vec<f64>>] {
        &self.den
    }

    /// True when no numerator degree exceeds its denominator degree
    pub fn is_proper(&self) -> bool {
        self.num
            .iter()
            .flatten()
            .zip(self.den.iter().flatten())
            .all(|(n, d)| polynomial::is_zero(n) || n.len() <= d.len())
    }

    /// Evaluate every channel at a complex point
    pub fn evaluate(&self, s: Complex64) -> Result<Array2<Complex64>> {
        let mut out = Array2::<Complex64>::zeros((self.noutputs(), self.ninputs()));
        for i in 0..self.noutputs() {
            for j in 0..self.ninputs() {
                let den = polynomial::polyval(&self.den[i][j], s);
                if den.norm() == 0.0 {
                    return Err(ControlError::SingularConversion(format!(
                        "denominator of channel ({}, {}) vanishes at s = {}",
                        i, j, s
                    )));
                }
                out[[i, j]] = polynomial::polyval(&self.num[i][j], s) / den;
            }
        }
        Ok(out)
    }

    /// Poles of a SISO transfer function (roots of the denominator)
    pub fn poles(&self) -> Result<Vec<Complex64>> {
        require_siso(self, "transfer function poles")?;
        polynomial::roots(&self.den[0][0], EIG_MAX_ITERATIONS)
    }

    /// Zeros of a SISO transfer function (roots of the numerator)
    pub fn zeros(&self) -> Result<Vec<Complex64>> {
        require_siso(self, "transfer function zeros")?;
        if polynomial::is_zero(&self.num[0][0]) {
            return Ok(Vec::new());
        }
        polynomial::roots(&self.num[0][0], EIG_MAX_ITERATIONS)
    }
}

impl LtiSystem for TransferFunction {
    fn ninputs(&self) -> usize {
        self.num[0].len()
    }

    fn noutputs(&self) -> usize {
        self.num.len()
    }

    fn timebase(&self) -> Timebase {
        self.timebase
    }

    fn freq_eval(&self, w: f64) -> Result<Array2<Complex64>> {
        self.evaluate(self.timebase.frequency_point(w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_trims_leading_zeros() {
        let tf = TransferFunction::siso(vec![0.0, 0.0, 1.0], vec![0.0, 1.0, 2.0], Timebase::Continuous)
            .unwrap();
        assert_eq!(tf.num(0, 0), &[1.0]);
        assert_eq!(tf.den(0, 0), &[1.0, 2.0]);
    }

    #[test]
    fn test_zero_denominator_rejected() {
        let tf = TransferFunction::siso(vec![1.0], vec![0.0, 0.0], Timebase::Continuous);
        assert!(matches!(tf, Err(ControlError::InvalidArgument(_))));
        let tf = TransferFunction::siso(vec![1.0], vec![], Timebase::Continuous);
        assert!(tf.is_err());
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let tf = TransferFunction::new(
            vec![vec![vec![1.0], vec![1.0]]],
            vec![vec![vec![1.0, 1.0]]],
            Timebase::Continuous,
        );
        assert!(matches!(tf, Err(ControlError::IncompatibleShape(_))));
    }

    #[test]
    fn test_evaluate() {
        // (s + 1) / (s^2 + 2s + 2) at s = j
        let tf = TransferFunction::siso(vec![1.0, 1.0], vec![1.0, 2.0, 2.0], Timebase::Continuous)
            .unwrap();
        let h = tf.freq_eval(1.0).unwrap()[[0, 0]];
        let expected = Complex64::new(1.0, 1.0) / Complex64::new(1.0, 2.0);
        assert_relative_eq!(h.re, expected.re, epsilon = 1e-12);
        assert_relative_eq!(h.im, expected.im, epsilon = 1e-12);
    }

    #[test]
    fn test_mimo_dimensions() {
        let tf = TransferFunction::new(
            vec![vec![vec![1.0], vec![2.0]], vec![vec![1.0, 0.0], vec![3.0]]],
            vec![vec![vec![1.0, 1.0], vec![1.0, 2.0]], vec![vec![1.0, 3.0], vec![1.0, 4.0]]],
            Timebase::Continuous,
        )
        .unwrap();
        assert_eq!(tf.noutputs(), 2);
        assert_eq!(tf.ninputs(), 2);
        assert!(!tf.is_siso());
        assert!(tf.poles().is_err());
    }

    #[test]
    fn test_proper() {
        let proper = TransferFunction::siso(vec![1.0, 0.0], vec![1.0, 1.0], Timebase::Continuous)
            .unwrap();
        let improper =
            TransferFunction::siso(vec![1.0, 0.0, 0.0], vec![1.0, 1.0], Timebase::Continuous)
                .unwrap();
        assert!(proper.is_proper());
        assert!(!improper.is_proper());
    }

    #[test]
    fn test_poles_and_zeros() {
        // (s + 3) / ((s + 1)(s + 2))
        let tf = TransferFunction::siso(vec![1.0, 3.0], vec![1.0, 3.0, 2.0], Timebase::Continuous)
            .unwrap();
        let zeros = tf.zeros().unwrap();
        assert_eq!(zeros.len(), 1);
        assert_relative_eq!(zeros[0].re, -3.0, epsilon = 1e-12);

        let mut poles: Vec<f64> = tf.poles().unwrap().iter().map(|p| p.re).collect();
        poles.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_relative_eq!(poles[0], -2.0, epsilon = 1e-10);
        assert_relative_eq!(poles[1], -1.0, epsilon = 1e-10);
    }
}
