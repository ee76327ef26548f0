//! MATLAB-style function layer
//!
//! Functions here take the argument shapes of their MATLAB namesakes.
//! Calls whose arity selects the behavior (`margin`, `dcgain`) receive a
//! slice of [`MatlabArg`] and dispatch on its length.

use ndarray::{Array2, Array3};
use num_complex::Complex64;

use crate::convert;
use crate::discretize::{self, Method};
use crate::error::{ControlError, Result};
use crate::lti::{Lti, LtiSystem, StateSpace, Timebase, TransferFunction, Zpk};
use crate::margins;
use crate::math;
use crate::metrics::{self, Damping};

/// A positional argument of a MATLAB-style call
#[derive(Debug, Clone)]
pub enum MatlabArg {
    Model(Lti),
    Array(Vec<f64>),
    Matrix(Array2<f64>),
    Roots(Vec<Complex64>),
    Scalar(f64),
}

impl MatlabArg {
    fn kind(&self) -> &'static str {
        match self {
            MatlabArg::Model(_) => "model",
            MatlabArg::Array(_) => "array",
            MatlabArg::Matrix(_) => "matrix",
            MatlabArg::Roots(_) => "root list",
            MatlabArg::Scalar(_) => "scalar",
        }
    }

    fn mismatch(&self, position: usize, expected: &str) -> ControlError {
        ControlError::InvalidArgument(format!(
            "argument {} must be a {}, got a {}",
            position + 1,
            expected,
            self.kind()
        ))
    }

    fn as_model(&self, position: usize) -> Result<&Lti> {
        match self {
            MatlabArg::Model(sys) => Ok(sys),
            other => Err(other.mismatch(position, "model")),
        }
    }

    fn as_array(&self, position: usize) -> Result<Vec<f64>> {
        match self {
            MatlabArg::Array(v) => Ok(v.clone()),
            MatlabArg::Scalar(x) => Ok(vec![*x]),
            MatlabArg::Matrix(m) if m.nrows() == 1 || m.ncols() == 1 => {
                Ok(m.iter().copied().collect())
            }
            other => Err(other.mismatch(position, "vector")),
        }
    }

    fn as_matrix(&self, position: usize) -> Result<Array2<f64>> {
        match self {
            MatlabArg::Matrix(m) => Ok(m.clone()),
            MatlabArg::Scalar(x) => Ok(Array2::from_elem((1, 1), *x)),
            MatlabArg::Array(v) => Array2::from_shape_vec((1, v.len()), v.clone())
                .map_err(|_| self.mismatch(position, "matrix")),
            other => Err(other.mismatch(position, "matrix")),
        }
    }

    fn as_roots(&self, position: usize) -> Result<Vec<Complex64>> {
        match self {
            MatlabArg::Roots(r) => Ok(r.clone()),
            other => Ok(other
                .as_array(position)
                .map_err(|_| other.mismatch(position, "root list"))?
                .into_iter()
                .map(|x| Complex64::new(x, 0.0))
                .collect()),
        }
    }

    fn as_scalar(&self, position: usize) -> Result<f64> {
        match self {
            MatlabArg::Scalar(x) => Ok(*x),
            MatlabArg::Array(v) if v.len() == 1 => Ok(v[0]),
            other => Err(other.mismatch(position, "scalar")),
        }
    }
}

impl From<Lti> for MatlabArg {
    fn from(sys: Lti) -> Self {
        MatlabArg::Model(sys)
    }
}

impl From<StateSpace> for MatlabArg {
    fn from(sys: StateSpace) -> Self {
        MatlabArg::Model(sys.into())
    }
}

impl From<TransferFunction> for MatlabArg {
    fn from(sys: TransferFunction) -> Self {
        MatlabArg::Model(sys.into())
    }
}

impl From<Zpk> for MatlabArg {
    fn from(sys: Zpk) -> Self {
        MatlabArg::Model(sys.into())
    }
}

impl From<Vec<f64>> for MatlabArg {
    fn from(v: Vec<f64>) -> Self {
        MatlabArg::Array(v)
    }
}

impl From<&[f64]> for MatlabArg {
    fn from(v: &[f64]) -> Self {
        MatlabArg::Array(v.to_vec())
    }
}

impl From<Array2<f64>> for MatlabArg {
    fn from(m: Array2<f64>) -> Self {
        MatlabArg::Matrix(m)
    }
}

impl From<Vec<Complex64>> for MatlabArg {
    fn from(r: Vec<Complex64>) -> Self {
        MatlabArg::Roots(r)
    }
}

impl From<f64> for MatlabArg {
    fn from(x: f64) -> Self {
        MatlabArg::Scalar(x)
    }
}

fn timebase_of(dt: Option<f64>) -> Result<Timebase> {
    match dt {
        None => Ok(Timebase::Continuous),
        Some(dt) => Timebase::discrete(dt),
    }
}

// ============================================================================
// Model construction and conversion
// ============================================================================

/// State-space model; `dt = None` makes it continuous
pub fn ss(
    a: Array2<f64>,
    b: Array2<f64>,
    c: Array2<f64>,
    d: Array2<f64>,
    dt: Option<f64>,
) -> Result<StateSpace> {
    StateSpace::new(a, b, c, d, timebase_of(dt)?)
}

/// SISO transfer function num/den; `dt = None` makes it continuous
pub fn tf(num: &[f64], den: &[f64], dt: Option<f64>) -> Result<TransferFunction> {
    TransferFunction::siso(num.to_vec(), den.to_vec(), timebase_of(dt)?)
}

/// Zero-pole-gain model; `dt = None` makes it continuous
pub fn zpk(zeros: &[Complex64], poles: &[Complex64], gain: f64, dt: Option<f64>) -> Result<Zpk> {
    Zpk::new(zeros.to_vec(), poles.to_vec(), gain, timebase_of(dt)?)
}

pub fn ss2tf(sys: &Lti) -> Result<TransferFunction> {
    convert::to_transfer_function(sys)
}

pub fn tf2ss(sys: &Lti) -> Result<StateSpace> {
    convert::to_state_space(sys)
}

/// Numerator and denominator tables, indexed `[output][input]`
pub fn tfdata(sys: &Lti) -> Result<(Vec<Vec<Vec<f64>>>, Vec<Vec<Vec<f64>>>)> {
    let tf = convert::to_transfer_function(sys)?;
    Ok((tf.num_table().to_vec(), tf.den_table().to_vec()))
}

// ============================================================================
// Block diagrams
// ============================================================================

pub fn series(sys1: &Lti, sys2: &Lti) -> Result<TransferFunction> {
    convert::to_transfer_function(sys1)?.series(&convert::to_transfer_function(sys2)?)
}

pub fn parallel(sys1: &Lti, sys2: &Lti) -> Result<TransferFunction> {
    convert::to_transfer_function(sys1)?.parallel(&convert::to_transfer_function(sys2)?)
}

pub fn negate(sys: &Lti) -> Result<TransferFunction> {
    Ok(convert::to_transfer_function(sys)?.negate())
}

/// Negative feedback of `sys2` around `sys1`
pub fn feedback(sys1: &Lti, sys2: &Lti) -> Result<TransferFunction> {
    convert::to_transfer_function(sys1)?.feedback(&convert::to_transfer_function(sys2)?, -1.0)
}

// ============================================================================
// Frequency response
// ============================================================================

/// Evaluate the model at a complex point s (or z for discrete models)
pub fn evalfr(sys: &Lti, x: Complex64) -> Result<Array2<Complex64>> {
    match sys {
        Lti::StateSpace(ss) => ss.evaluate(x),
        Lti::TransferFunction(tf) => tf.evaluate(x),
        Lti::Zpk(zpk) => Ok(Array2::from_elem((1, 1), zpk.evaluate(x)?)),
        Lti::Frd(_) => Err(ControlError::NotImplemented(
            "evaluation of frequency response data off the imaginary axis".to_string(),
        )),
    }
}

/// Frequency response on a grid, shape [nfreq, noutputs, ninputs]
pub fn freqresp(sys: &Lti, omega: &[f64]) -> Result<Array3<Complex64>> {
    sys.freqresp(omega)
}

pub fn mag2db(mag: f64) -> f64 {
    math::mag_2_db(mag)
}

pub fn db2mag(db: f64) -> f64 {
    math::db_2_mag(db)
}

/// Unwrap a phase sequence in radians
pub fn unwrap(phase: &[f64]) -> Vec<f64> {
    math::unwrap_rad(phase)
}

// ============================================================================
// Analysis
// ============================================================================

/// Gain margin, phase margin, gain crossover and phase crossover frequency
///
/// Takes either a SISO model or the three arrays (magnitude, phase in
/// degrees, frequency in rad/s).
pub fn margin(args: &[MatlabArg]) -> Result<(f64, f64, f64, f64)> {
    let result = match args {
        [sys] => margins::stability_margins(sys.as_model(0)?)?,
        [mag, phase, omega] => margins::margins_from_arrays(
            &mag.as_array(0)?,
            &phase.as_array(1)?,
            &omega.as_array(2)?,
        )?,
        _ => {
            return Err(ControlError::InvalidArgument(format!(
                "margin needs 1 or 3 arguments; received {}",
                args.len()
            )))
        }
    };
    Ok((
        result.gain_margin,
        result.phase_margin,
        result.gain_crossover_freq,
        result.phase_crossover_freq,
    ))
}

/// Steady-state gain
///
/// Accepts (A, B, C, D), (zeros, poles, gain), (num, den) or a model.
pub fn dcgain(args: &[MatlabArg]) -> Result<Array2<f64>> {
    let scalar = |x: f64| Array2::from_elem((1, 1), x);
    match args {
        [a, b, c, d] => metrics::dc_gain_from_state_space(
            &a.as_matrix(0)?,
            &b.as_matrix(1)?,
            &c.as_matrix(2)?,
            &d.as_matrix(3)?,
        ),
        [z, p, k] => Ok(scalar(metrics::dc_gain_from_zpk(
            &z.as_roots(0)?,
            &p.as_roots(1)?,
            k.as_scalar(2)?,
        )?)),
        [num, den] => Ok(scalar(metrics::dc_gain_from_tf(
            &num.as_array(0)?,
            &den.as_array(1)?,
        )?)),
        [sys] => metrics::dc_gain(sys.as_model(0)?),
        _ => Err(ControlError::InvalidArgument(format!(
            "dcgain needs either 1, 2, 3 or 4 arguments; received {}",
            args.len()
        ))),
    }
}

/// Natural frequency, damping and poles
pub fn damp(sys: &Lti) -> Result<Damping> {
    metrics::damp(sys)
}

pub fn pole(sys: &Lti) -> Result<Vec<Complex64>> {
    metrics::pole(sys)
}

pub fn zero(sys: &Lti) -> Result<Vec<Complex64>> {
    metrics::zero(sys)
}

/// Discretize with a method given by name
///
/// State-space input stays state space even for methods that naturally
/// produce a transfer function.
pub fn c2d(sys: &Lti, ts: f64, method: &str) -> Result<Lti> {
    let method = Method::from_str(method).ok_or_else(|| {
        ControlError::InvalidArgument(format!("unknown discretization method '{}'", method))
    })?;
    discretize::c2d(sys, ts, method)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_margin_arity() {
        let sys: MatlabArg = tf(&[1.0], &[1.0, 1.0], None).unwrap().into();
        for n in [0usize, 2, 4] {
            let args = vec![sys.clone(); n];
            match margin(&args) {
                Err(ControlError::InvalidArgument(msg)) => {
                    assert!(msg.contains(&format!("received {}", n)))
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_margin_arrays() {
        let args: Vec<MatlabArg> = vec![
            vec![0.2, 0.2, 0.5, 0.5].into(),
            vec![-170.0, -190.0, -190.0, -170.0].into(),
            vec![1.0, 2.0, 3.0, 4.0].into(),
        ];
        let (gm, pm, wcg, wcp) = margin(&args).unwrap();
        assert_relative_eq!(gm, 2.0, epsilon = 1e-12);
        assert!(pm.is_infinite());
        assert!(wcg.is_nan());
        assert_relative_eq!(wcp, 3.5, epsilon = 1e-12);
    }

    #[test]
    fn test_dcgain_dispatch() {
        let four: Vec<MatlabArg> = vec![
            array![[-2.0, 0.0], [0.0, -3.0]].into(),
            array![[1.0], [1.0]].into(),
            array![[1.0, 1.0]].into(),
            0.0.into(),
        ];
        assert_relative_eq!(dcgain(&four).unwrap()[[0, 0]], 5.0 / 6.0, epsilon = 1e-12);

        let two: Vec<MatlabArg> = vec![vec![2.0, 5.0].into(), vec![1.0, 5.0, 6.0].into()];
        assert_relative_eq!(dcgain(&two).unwrap()[[0, 0]], 5.0 / 6.0, epsilon = 1e-12);

        let three: Vec<MatlabArg> = vec![vec![-2.5].into(), vec![-2.0, -3.0].into(), 2.0.into()];
        assert_relative_eq!(dcgain(&three).unwrap()[[0, 0]], 5.0 / 6.0, epsilon = 1e-10);

        assert!(matches!(dcgain(&[]), Err(ControlError::InvalidArgument(_))));
    }

    #[test]
    fn test_dcgain_wrong_argument_kind() {
        let args: Vec<MatlabArg> = vec![vec![1.0, 2.0].into()];
        assert!(matches!(dcgain(&args), Err(ControlError::InvalidArgument(_))));
    }

    #[test]
    fn test_c2d_method_names() {
        let sys: Lti = tf(&[1.0], &[1.0, 1.0], None).unwrap().into();
        assert!(c2d(&sys, 0.1, "bilinear").is_ok());
        assert!(matches!(
            c2d(&sys, 0.1, "euler"),
            Err(ControlError::InvalidArgument(_))
        ));
        assert!(matches!(
            c2d(&sys, 0.1, "foh"),
            Err(ControlError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_c2d_state_space_stays_state_space() {
        let sys: Lti = tf2ss(&tf(&[1.0], &[1.0, 1.0], None).unwrap().into())
            .unwrap()
            .into();
        assert!(matches!(c2d(&sys, 0.1, "tustin").unwrap(), Lti::StateSpace(_)));
        assert!(matches!(c2d(&sys, 0.1, "matched").unwrap(), Lti::StateSpace(_)));
    }

    #[test]
    fn test_feedback_unity() {
        // 1/s with unity feedback -> 1/(s + 1)
        let g: Lti = tf(&[1.0], &[1.0, 0.0], None).unwrap().into();
        let h: Lti = tf(&[1.0], &[1.0], None).unwrap().into();
        let cl = feedback(&g, &h).unwrap();
        assert_eq!(cl.den(0, 0), &[1.0, 1.0]);
    }

    #[test]
    fn test_evalfr() {
        let sys: Lti = zpk(&[], &[Complex64::new(-1.0, 0.0)], 2.0, None).unwrap().into();
        let h = evalfr(&sys, Complex64::new(1.0, 0.0)).unwrap();
        assert_relative_eq!(h[[0, 0]].re, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_db_helpers() {
        assert_relative_eq!(mag2db(10.0), 20.0, epsilon = 1e-12);
        assert_relative_eq!(db2mag(-20.0), 0.1, epsilon = 1e-12);
        let u = unwrap(&[3.0, -3.0]);
        assert_relative_eq!(u[1], -3.0 + 2.0 * std::f64::consts::PI, epsilon = 1e-12);
    }
}
