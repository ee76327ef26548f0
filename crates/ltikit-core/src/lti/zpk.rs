//! Zero-pole-gain representation (SISO)

use ndarray::Array2;
use num_complex::Complex64;

use super::{LtiSystem, Timebase};
use crate::constants::{CONJUGATE_TOL, REAL_TOL};
use crate::error::{ControlError, Result};
use crate::math::polynomial;

/// SISO model k * prod(s - z_i) / prod(s - p_i)
#[derive(Debug, Clone, PartialEq)]
pub struct Zpk {
    zeros: Vec<Complex64>,
    poles: Vec<Complex64>,
    gain: f64,
    timebase: Timebase,
}

impl Zpk {
    /// Create a zero-pole-gain model
    ///
    /// Zeros and poles must each be closed under complex conjugation so
    /// the model has real coefficients.
    pub fn new(
        zeros: Vec<Complex64>,
        poles: Vec<Complex64>,
        gain: f64,
        timebase: Timebase,
    ) -> Result<Self> {
        timebase.validate()?;

        if !gain.is_finite() {
            return Err(ControlError::InvalidArgument(format!(
                "gain must be finite, got {}",
                gain
            )));
        }
        for (name, roots) in [("zeros", &zeros), ("poles", &poles)] {
            if roots.iter().any(|r| !r.re.is_finite() || !r.im.is_finite()) {
                return Err(ControlError::InvalidArgument(format!(
                    "{} must be finite",
                    name
                )));
            }
            if !polynomial::is_conjugate_closed(roots, REAL_TOL, CONJUGATE_TOL) {
                return Err(ControlError::InvalidArgument(format!(
                    "{} are not closed under complex conjugation ({} given)",
                    name,
                    roots.len()
                )));
            }
        }

        Ok(Self {
            zeros,
            poles,
            gain,
            timebase,
        })
    }

    /// Create from real-valued zeros and poles
    pub fn from_real(zeros: &[f64], poles: &[f64], gain: f64, timebase: Timebase) -> Result<Self> {
        let to_c = |v: &[f64]| -> Vec<Complex64> {
            v.iter().map(|&x| Complex64::new(x, 0.0)).collect()
        };
        Self::new(to_c(zeros), to_c(poles), gain, timebase)
    }

    #[inline]
    pub fn zeros(&self) -> &[Complex64] {
        &self.zeros
    }

    #[inline]
    pub fn poles(&self) -> &[Complex64] {
        &self.poles
    }

    #[inline]
    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// Evaluate k * prod(s - z) / prod(s - p) at a complex point
    pub fn evaluate(&self, s: Complex64) -> Result<Complex64> {
        let num = self
            .zeros
            .iter()
            .fold(Complex64::new(self.gain, 0.0), |acc, z| acc * (s - z));
        let den = self
            .poles
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, p| acc * (s - p));
        if den.norm() == 0.0 {
            return Err(ControlError::SingularConversion(format!(
                "s = {} coincides with a pole",
                s
            )));
        }
        Ok(num / den)
    }
}

impl LtiSystem for Zpk {
    fn ninputs(&self) -> usize {
        1
    }

    fn noutputs(&self) -> usize {
        1
    }

    fn timebase(&self) -> Timebase {
        self.timebase
    }

    fn freq_eval(&self, w: f64) -> Result<Array2<Complex64>> {
        let h = self.evaluate(self.timebase.frequency_point(w))?;
        Ok(Array2::from_elem((1, 1), h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_conjugate_pairs_required() {
        let ok = Zpk::new(
            vec![],
            vec![Complex64::new(-1.0, 2.0), Complex64::new(-1.0, -2.0)],
            1.0,
            Timebase::Continuous,
        );
        assert!(ok.is_ok());

        let bad = Zpk::new(
            vec![],
            vec![Complex64::new(-1.0, 2.0), Complex64::new(-1.0, 0.0)],
            1.0,
            Timebase::Continuous,
        );
        assert!(matches!(bad, Err(ControlError::InvalidArgument(_))));
    }

    #[test]
    fn test_evaluate() {
        // 2 (s + 1) / (s + 2) at s = 0 -> 1
        let sys = Zpk::from_real(&[-1.0], &[-2.0], 2.0, Timebase::Continuous).unwrap();
        let h = sys.evaluate(Complex64::new(0.0, 0.0)).unwrap();
        assert_relative_eq!(h.re, 1.0, epsilon = 1e-12);

        let h = sys.freq_eval(1.0).unwrap();
        let expected = Complex64::new(2.0, 2.0) / Complex64::new(2.0, 1.0);
        assert_relative_eq!(h[[0, 0]].re, expected.re, epsilon = 1e-12);
        assert_relative_eq!(h[[0, 0]].im, expected.im, epsilon = 1e-12);
    }

    #[test]
    fn test_evaluate_at_pole() {
        let sys = Zpk::from_real(&[], &[0.0], 1.0, Timebase::Continuous).unwrap();
        assert!(sys.evaluate(Complex64::new(0.0, 0.0)).is_err());
    }
}
