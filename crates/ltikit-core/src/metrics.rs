//! Scalar metrics: DC gain, pole damping and natural frequency
//!
//! All metrics work on the state-space form; other representations are
//! converted first.

use ndarray::Array2;
use num_complex::Complex64;

use crate::config::NumericConfig;
use crate::convert::Converter;
use crate::error::{ControlError, Result};
use crate::lti::{Lti, LtiSystem, StateSpace, Timebase, TransferFunction, Zpk};
use crate::math::linalg;

/// Natural frequencies, damping ratios and poles, aligned by index
///
/// Poles keep the order the eigenvalue solver produced them in.
#[derive(Debug, Clone, PartialEq)]
pub struct Damping {
    pub wn: Vec<f64>,
    pub zeta: Vec<f64>,
    pub poles: Vec<Complex64>,
}

impl Damping {
    pub fn len(&self) -> usize {
        self.poles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poles.is_empty()
    }
}

/// DC gain, damping and pole/zero queries
#[derive(Debug, Clone, Copy, Default)]
pub struct Metrics {
    pub config: NumericConfig,
}

impl Metrics {
    pub fn new(config: NumericConfig) -> Self {
        Self { config }
    }

    fn converter(&self) -> Converter {
        Converter::new(self.config)
    }

    /// Steady-state gain of any parametric model
    ///
    /// Continuous: D - C A^-1 B. Discrete: D + C (I - A)^-1 B. A pole at
    /// s = 0 (or z = 1) makes the gain undefined and fails with
    /// `SingularConversion`.
    pub fn dc_gain(&self, sys: &Lti) -> Result<Array2<f64>> {
        let ss = self.converter().to_state_space(sys)?;
        state_space_gain(&ss)
    }

    /// DC gain of the model (A, B, C, D)
    pub fn dc_gain_from_state_space(
        &self,
        a: &Array2<f64>,
        b: &Array2<f64>,
        c: &Array2<f64>,
        d: &Array2<f64>,
    ) -> Result<Array2<f64>> {
        let ss = StateSpace::new(a.clone(), b.clone(), c.clone(), d.clone(), Timebase::Continuous)?;
        state_space_gain(&ss)
    }

    /// DC gain of the SISO transfer function num/den
    pub fn dc_gain_from_tf(&self, num: &[f64], den: &[f64]) -> Result<f64> {
        let tf = TransferFunction::siso(num.to_vec(), den.to_vec(), Timebase::Continuous)?;
        let ss = self.converter().tf2ss(&tf)?;
        Ok(state_space_gain(&ss)?[[0, 0]])
    }

    /// DC gain of the SISO model with the given zeros, poles and gain
    pub fn dc_gain_from_zpk(&self, zeros: &[Complex64], poles: &[Complex64], gain: f64) -> Result<f64> {
        let zpk = Zpk::new(zeros.to_vec(), poles.to_vec(), gain, Timebase::Continuous)?;
        let ss = self.converter().zpk2ss(&zpk)?;
        Ok(state_space_gain(&ss)?[[0, 0]])
    }

    /// Natural frequency and damping of each pole
    ///
    /// Real poles (|Im| below `real_tol`) report damping 1 and natural
    /// frequency -Re(p); complex poles report |p| and -Re(p)/|p|. Discrete
    /// poles are mapped through s = ln(z)/T first; the returned poles stay
    /// in the z-plane.
    pub fn damp(&self, sys: &Lti) -> Result<Damping> {
        let poles = self.poles(sys)?;
        let timebase = sys.timebase();

        let mut wn = Vec::with_capacity(poles.len());
        let mut zeta = Vec::with_capacity(poles.len());
        for &p in &poles {
            let s = match timebase {
                Timebase::Continuous => p,
                Timebase::Discrete(dt) => p.ln() / dt,
            };
            if s.im.abs() < self.config.real_tol {
                wn.push(-s.re);
                zeta.push(1.0);
            } else {
                let mag = s.norm();
                wn.push(mag);
                zeta.push(-s.re / mag);
            }
        }

        Ok(Damping { wn, zeta, poles })
    }

    /// Poles of any parametric model (eigenvalues of its realization)
    pub fn poles(&self, sys: &Lti) -> Result<Vec<Complex64>> {
        match sys {
            Lti::StateSpace(ss) => ss.poles_bounded(self.config.max_eig_iterations),
            other => self
                .converter()
                .to_state_space(other)?
                .poles_bounded(self.config.max_eig_iterations),
        }
    }

    /// Zeros of a SISO model
    pub fn zeros(&self, sys: &Lti) -> Result<Vec<Complex64>> {
        Ok(self.converter().to_zpk(sys)?.zeros().to_vec())
    }

    /// Whether every pole lies in the open left half plane (continuous)
    /// or strictly inside the unit circle (discrete)
    pub fn is_stable(&self, sys: &Lti) -> Result<bool> {
        let poles = self.poles(sys)?;
        Ok(match sys.timebase() {
            Timebase::Continuous => poles.iter().all(|p| p.re < 0.0),
            Timebase::Discrete(_) => poles.iter().all(|p| p.norm() < 1.0),
        })
    }
}

fn state_space_gain(ss: &StateSpace) -> Result<Array2<f64>> {
    if ss.nstates() == 0 {
        return Ok(ss.d().clone());
    }
    match ss.timebase() {
        Timebase::Continuous => {
            let x = linalg::solve_real(ss.a(), ss.b()).ok_or_else(|| {
                ControlError::SingularConversion(
                    "A is singular: the model has a pole at s = 0".to_string(),
                )
            })?;
            Ok(ss.d() - &ss.c().dot(&x))
        }
        Timebase::Discrete(_) => {
            let n = ss.nstates();
            let i_minus_a = Array2::<f64>::eye(n) - ss.a();
            let x = linalg::solve_real(&i_minus_a, ss.b()).ok_or_else(|| {
                ControlError::SingularConversion(
                    "I - A is singular: the model has a pole at z = 1".to_string(),
                )
            })?;
            Ok(ss.d() + &ss.c().dot(&x))
        }
    }
}

/// Steady-state gain with the default configuration
pub fn dc_gain(sys: &Lti) -> Result<Array2<f64>> {
    Metrics::default().dc_gain(sys)
}

/// DC gain of the model (A, B, C, D)
pub fn dc_gain_from_state_space(
    a: &Array2<f64>,
    b: &Array2<f64>,
    c: &Array2<f64>,
    d: &Array2<f64>,
) -> Result<Array2<f64>> {
    Metrics::default().dc_gain_from_state_space(a, b, c, d)
}

/// DC gain of the SISO transfer function num/den
pub fn dc_gain_from_tf(num: &[f64], den: &[f64]) -> Result<f64> {
    Metrics::default().dc_gain_from_tf(num, den)
}

/// DC gain of the SISO model with the given zeros, poles and gain
pub fn dc_gain_from_zpk(zeros: &[Complex64], poles: &[Complex64], gain: f64) -> Result<f64> {
    Metrics::default().dc_gain_from_zpk(zeros, poles, gain)
}

/// Natural frequency and damping of each pole
pub fn damp(sys: &Lti) -> Result<Damping> {
    Metrics::default().damp(sys)
}

/// Poles of any parametric model
pub fn pole(sys: &Lti) -> Result<Vec<Complex64>> {
    Metrics::default().poles(sys)
}

/// Zeros of a SISO model
pub fn zero(sys: &Lti) -> Result<Vec<Complex64>> {
    Metrics::default().zeros(sys)
}

/// Stability test on the pole locations
pub fn is_stable(sys: &Lti) -> Result<bool> {
    Metrics::default().is_stable(sys)
}
