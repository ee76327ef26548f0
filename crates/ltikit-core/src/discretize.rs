//! Continuous-to-discrete conversion
//!
//! `zoh` works on the state-space form through the matrix exponential of the
//! augmented block matrix, so a singular A needs no special handling.
//! `tustin` and `matched` are SISO transfer-function methods. `foh` and
//! `impulse` are recognized but not available.

use std::fmt;

use log::debug;
use ndarray::{s, Array2};
use num_complex::Complex64;

use crate::config::NumericConfig;
use crate::convert::Converter;
use crate::error::{ControlError, Result};
use crate::lti::{require_siso, Lti, LtiSystem, StateSpace, Timebase, TransferFunction, Zpk};
use crate::math::{linalg, polynomial};

/// Discretization method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Zero-order hold
    #[default]
    Zoh,
    /// First-order hold
    Foh,
    /// Impulse invariant
    Impulse,
    /// Bilinear (Tustin) transform
    Tustin,
    /// Matched pole-zero mapping
    Matched,
}

impl Method {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "zoh" => Some(Method::Zoh),
            "foh" => Some(Method::Foh),
            "impulse" => Some(Method::Impulse),
            "tustin" | "bilinear" => Some(Method::Tustin),
            "matched" => Some(Method::Matched),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Method::Zoh => "zoh",
            Method::Foh => "foh",
            Method::Impulse => "impulse",
            Method::Tustin => "tustin",
            Method::Matched => "matched",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Discretizer for continuous-time models
#[derive(Debug, Clone, Copy, Default)]
pub struct Discretizer {
    pub config: NumericConfig,
}

impl Discretizer {
    pub fn new(config: NumericConfig) -> Self {
        Self { config }
    }

    fn converter(&self) -> Converter {
        Converter::new(self.config)
    }

    /// Discretize a continuous model
    ///
    /// The result is in the method's natural representation: state space for
    /// `zoh`, transfer function for `tustin` and `matched`. Use [`c2d`] to
    /// keep the input representation.
    pub fn discretize(&self, sys: &Lti, dt: f64, method: Method) -> Result<Lti> {
        debug!(
            "discretizing {} model ({}x{}) with {} at dt = {}",
            sys.kind(),
            sys.noutputs(),
            sys.ninputs(),
            method,
            dt
        );

        if let Timebase::Discrete(existing) = sys.timebase() {
            return Err(ControlError::InvalidArgument(format!(
                "model is already discrete-time (dt = {})",
                existing
            )));
        }
        Timebase::discrete(dt)?;
        if matches!(sys, Lti::Frd(_)) {
            return Err(ControlError::NotImplemented(
                "discretization of frequency response data".to_string(),
            ));
        }

        match method {
            Method::Foh | Method::Impulse => Err(ControlError::NotImplemented(format!(
                "'{}' discretization method",
                method
            ))),
            Method::Zoh => {
                let ss = self.converter().to_state_space(sys)?;
                Ok(self.zoh(&ss, dt)?.into())
            }
            Method::Tustin => {
                require_siso(sys, method.name())?;
                let tf = self.converter().to_transfer_function(sys)?;
                Ok(self.bilinear(&tf, dt)?.into())
            }
            Method::Matched => {
                require_siso(sys, method.name())?;
                let zpk = self.converter().to_zpk(sys)?;
                let discrete = self.match_poles_zeros(&zpk, dt)?;
                Ok(self.converter().zpk2tf(&discrete)?.into())
            }
        }
    }

    /// Zero-order hold discretization of a state-space model
    pub fn zoh(&self, ss: &StateSpace, dt: f64) -> Result<StateSpace> {
        let timebase = Timebase::discrete(dt)?;
        let n = ss.nstates();
        let m = ss.ninputs();
        if n == 0 {
            return StateSpace::static_gain(ss.d().clone(), timebase);
        }

        // exp([[A, B], [0, 0]] dt) = [[Ad, Bd], [0, I]]
        let mut aug = Array2::<f64>::zeros((n + m, n + m));
        aug.slice_mut(s![..n, ..n]).assign(&(ss.a() * dt));
        aug.slice_mut(s![..n, n..]).assign(&(ss.b() * dt));
        let e = linalg::expm(&aug)?;

        let ad = e.slice(s![..n, ..n]).to_owned();
        let bd = e.slice(s![..n, n..]).to_owned();
        StateSpace::new(ad, bd, ss.c().clone(), ss.d().clone(), timebase)
    }

    /// Bilinear discretization of a SISO transfer function
    pub fn tustin(&self, tf: &TransferFunction, dt: f64) -> Result<TransferFunction> {
        if !tf.timebase().is_continuous() {
            return Err(ControlError::InvalidArgument(
                "tustin needs a continuous-time model".to_string(),
            ));
        }
        require_siso(tf, "tustin")?;
        Timebase::discrete(dt)?;
        self.bilinear(tf, dt)
    }

    /// Matched pole-zero discretization of a SISO transfer function
    pub fn matched(&self, tf: &TransferFunction, dt: f64) -> Result<TransferFunction> {
        if !tf.timebase().is_continuous() {
            return Err(ControlError::InvalidArgument(
                "matched needs a continuous-time model".to_string(),
            ));
        }
        require_siso(tf, "matched")?;
        let zpk = self.converter().tf2zpk(tf)?;
        Timebase::discrete(dt)?;
        let discrete = self.match_poles_zeros(&zpk, dt)?;
        self.converter().zpk2tf(&discrete)
    }

    /// Substitute s = (2/T)(z - 1)/(z + 1) and clear the (z + 1)^N factor
    fn bilinear(&self, tf: &TransferFunction, dt: f64) -> Result<TransferFunction> {
        let num = tf.num(0, 0);
        let den = tf.den(0, 0);
        let order = polynomial::degree(num).max(polynomial::degree(den));

        let c = 2.0 / dt;
        let substitute = |p: &[f64]| -> Vec<f64> {
            let p = polynomial::pad_left(p, order + 1);
            let mut out = vec![0.0; order + 1];
            for (i, coeff) in p.iter().enumerate() {
                if *coeff == 0.0 {
                    continue;
                }
                let k = order - i;
                let term = polynomial::mul(
                    &polynomial::pow(&[1.0, -1.0], k),
                    &polynomial::pow(&[1.0, 1.0], order - k),
                );
                out = polynomial::add(&out, &polynomial::scale(&term, coeff * c.powi(k as i32)));
            }
            out
        };

        let num_d = substitute(num);
        let den_d = polynomial::trim_leading_zeros(&substitute(den));
        if polynomial::is_zero(&den_d) {
            return Err(ControlError::SingularConversion(
                "bilinear transform produced a zero denominator".to_string(),
            ));
        }
        let lead = den_d[0];
        TransferFunction::siso(
            polynomial::scale(&num_d, 1.0 / lead),
            polynomial::scale(&den_d, 1.0 / lead),
            Timebase::Discrete(dt),
        )
    }

    /// Map every root through z = e^{pT} and match the gain at DC
    ///
    /// Roots at the origin are left out of the DC match; each origin pole
    /// maps 1/s to T/(z - 1) and each origin zero maps s to (z - 1)/T.
    fn match_poles_zeros(&self, zpk: &Zpk, dt: f64) -> Result<Zpk> {
        let timebase = Timebase::Discrete(dt);
        let tol = self.config.real_tol;
        let map = |roots: &[Complex64]| -> Vec<Complex64> {
            let mut mapped: Vec<Complex64> = roots.iter().map(|r| (*r * dt).exp()).collect();
            polynomial::snap_real(&mut mapped, tol);
            mapped
        };
        let zeros_d = map(zpk.zeros());
        let poles_d = map(zpk.poles());

        if zpk.gain() == 0.0 {
            return Zpk::new(zeros_d, poles_d, 0.0, timebase);
        }

        let is_origin = |r: &Complex64| r.norm() <= tol;
        let mut ratio = Complex64::new(zpk.gain(), 0.0);
        let mut origin_balance = 0_i32;
        for (z, zd) in zpk.zeros().iter().zip(&zeros_d) {
            if is_origin(z) {
                origin_balance -= 1;
            } else {
                ratio *= -*z / (1.0 - *zd);
            }
        }
        for (p, pd) in zpk.poles().iter().zip(&poles_d) {
            if is_origin(p) {
                origin_balance += 1;
            } else {
                ratio *= (1.0 - *pd) / -*p;
            }
        }
        let gain = ratio.re * dt.powi(origin_balance);
        if !gain.is_finite() {
            return Err(ControlError::SingularConversion(
                "matched gain is undefined: a mapped root lies at z = 1".to_string(),
            ));
        }

        Zpk::new(zeros_d, poles_d, gain, timebase)
    }
}

/// Discretize a continuous model with the default configuration
pub fn discretize(sys: &Lti, dt: f64, method: Method) -> Result<Lti> {
    Discretizer::default().discretize(sys, dt, method)
}

/// Discretize and convert back to the input's representation
///
/// State-space inputs come back as state space, transfer functions as
/// transfer functions and zero-pole-gain models as zero-pole-gain.
pub fn c2d(sys: &Lti, dt: f64, method: Method) -> Result<Lti> {
    let discretizer = Discretizer::default();
    let converter = discretizer.converter();
    let out = discretizer.discretize(sys, dt, method)?;
    Ok(match sys {
        Lti::StateSpace(_) => converter.to_state_space(&out)?.into(),
        Lti::TransferFunction(_) => converter.to_transfer_function(&out)?.into(),
        Lti::Zpk(_) => converter.to_zpk(&out)?.into(),
        Lti::Frd(_) => out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn integrator() -> StateSpace {
        StateSpace::from_rows(
            &[vec![0.0]],
            &[vec![1.0]],
            &[vec![1.0]],
            &[vec![0.0]],
            Timebase::Continuous,
        )
        .unwrap()
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!(Method::from_str("ZOH"), Some(Method::Zoh));
        assert_eq!(Method::from_str("bilinear"), Some(Method::Tustin));
        assert_eq!(Method::from_str("matched"), Some(Method::Matched));
        assert_eq!(Method::from_str("euler"), None);
    }

    #[test]
    fn test_zoh_integrator() {
        let d = Discretizer::default().zoh(&integrator(), 1.0).unwrap();
        assert_relative_eq!(d.a()[[0, 0]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(d.b()[[0, 0]], 1.0, epsilon = 1e-12);
        assert_eq!(d.timebase(), Timebase::Discrete(1.0));
    }

    #[test]
    fn test_zoh_first_order() {
        // 1/(s+1): Ad = e^{-T}, Bd = 1 - e^{-T}
        let ss = StateSpace::from_rows(
            &[vec![-1.0]],
            &[vec![1.0]],
            &[vec![1.0]],
            &[vec![0.0]],
            Timebase::Continuous,
        )
        .unwrap();
        let d = Discretizer::default().zoh(&ss, 0.5).unwrap();
        let e = (-0.5_f64).exp();
        assert_relative_eq!(d.a()[[0, 0]], e, epsilon = 1e-12);
        assert_relative_eq!(d.b()[[0, 0]], 1.0 - e, epsilon = 1e-12);
    }

    #[test]
    fn test_tustin_first_order() {
        let tf = TransferFunction::siso(vec![1.0], vec![1.0, 1.0], Timebase::Continuous).unwrap();
        let d = Discretizer::default().tustin(&tf, 0.1).unwrap();
        assert_relative_eq!(d.num(0, 0)[0], 1.0 / 21.0, epsilon = 1e-12);
        assert_relative_eq!(d.num(0, 0)[1], 1.0 / 21.0, epsilon = 1e-12);
        assert_relative_eq!(d.den(0, 0)[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(d.den(0, 0)[1], -19.0 / 21.0, epsilon = 1e-12);
    }

    #[test]
    fn test_matched_first_order() {
        // 1/(s+1) -> k/(z - e^{-T}) with k = 1 - e^{-T}
        let tf = TransferFunction::siso(vec![1.0], vec![1.0, 1.0], Timebase::Continuous).unwrap();
        let d = Discretizer::default().matched(&tf, 0.2).unwrap();
        let e = (-0.2_f64).exp();
        assert_relative_eq!(d.den(0, 0)[1], -e, epsilon = 1e-12);
        assert_relative_eq!(d.num(0, 0)[0], 1.0 - e, epsilon = 1e-12);
    }

    #[test]
    fn test_matched_integrator_gain() {
        // 1/s -> T/(z - 1)
        let tf = TransferFunction::siso(vec![1.0], vec![1.0, 0.0], Timebase::Continuous).unwrap();
        let d = Discretizer::default().matched(&tf, 0.5).unwrap();
        assert_relative_eq!(d.num(0, 0)[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(d.den(0, 0)[1], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_discrete_input() {
        let ss = Discretizer::default().zoh(&integrator(), 1.0).unwrap();
        assert!(matches!(
            discretize(&ss.into(), 1.0, Method::Zoh),
            Err(ControlError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rejects_bad_sample_time() {
        for dt in [0.0, -1.0, f64::NAN] {
            assert!(matches!(
                discretize(&integrator().into(), dt, Method::Zoh),
                Err(ControlError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_foh_and_impulse_not_implemented() {
        for method in [Method::Foh, Method::Impulse] {
            match discretize(&integrator().into(), 1.0, method) {
                Err(ControlError::NotImplemented(msg)) => assert!(msg.contains(method.name())),
                other => panic!("unexpected {:?}", other),
            }
        }
    }
}
