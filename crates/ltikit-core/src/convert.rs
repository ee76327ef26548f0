//! Conversions between model representations
//!
//! Every conversion returns a new model, carries the source timebase and
//! keeps real-valued coefficients for real-valued input. Eigenvalue and
//! root computations are bounded by `NumericConfig::max_eig_iterations`.

use log::debug;
use ndarray::{s, Array2};
use num_complex::Complex64;

use crate::config::NumericConfig;
use crate::error::{ControlError, Result};
use crate::lti::{FrequencyResponseData, Lti, LtiSystem, StateSpace, TransferFunction, Zpk};
use crate::math::{linalg, polynomial};

/// Converter between the four model representations
#[derive(Debug, Clone, Copy, Default)]
pub struct Converter {
    pub config: NumericConfig,
}

impl Converter {
    /// Create a converter with an explicit numeric configuration
    pub fn new(config: NumericConfig) -> Self {
        Self { config }
    }

    /// Convert any model to state-space form
    pub fn to_state_space(&self, sys: &Lti) -> Result<StateSpace> {
        debug!(
            "converting {} model ({}x{}) to state-space",
            sys.kind(),
            sys.noutputs(),
            sys.ninputs()
        );
        match sys {
            Lti::StateSpace(ss) => Ok(ss.clone()),
            Lti::TransferFunction(tf) => self.tf2ss(tf),
            Lti::Zpk(zpk) => self.zpk2ss(zpk),
            Lti::Frd(_) => Err(no_realization("state-space")),
        }
    }

    /// Convert any model to transfer-function form
    pub fn to_transfer_function(&self, sys: &Lti) -> Result<TransferFunction> {
        debug!(
            "converting {} model ({}x{}) to transfer function",
            sys.kind(),
            sys.noutputs(),
            sys.ninputs()
        );
        match sys {
            Lti::StateSpace(ss) => self.ss2tf(ss),
            Lti::TransferFunction(tf) => Ok(tf.clone()),
            Lti::Zpk(zpk) => self.zpk2tf(zpk),
            Lti::Frd(_) => Err(no_realization("transfer function")),
        }
    }

    /// Convert any SISO model to zero-pole-gain form
    pub fn to_zpk(&self, sys: &Lti) -> Result<Zpk> {
        debug!("converting {} model to zero-pole-gain", sys.kind());
        if !sys.is_siso() {
            return Err(ControlError::IncompatibleShape(format!(
                "zero-pole-gain form is SISO only, model has {} outputs and {} inputs",
                sys.noutputs(),
                sys.ninputs()
            )));
        }
        match sys {
            Lti::StateSpace(ss) => self.ss2zpk(ss),
            Lti::TransferFunction(tf) => self.tf2zpk(tf),
            Lti::Zpk(zpk) => Ok(zpk.clone()),
            Lti::Frd(_) => Err(no_realization("zero-pole-gain")),
        }
    }

    /// Sample any model on a frequency grid
    pub fn to_frd(&self, sys: &Lti, omega: &[f64]) -> Result<FrequencyResponseData> {
        match sys {
            Lti::Frd(frd) => frd.interpolate(omega),
            other => FrequencyResponseData::from_model(other, omega),
        }
    }

    /// State-space to transfer function
    ///
    /// The shared denominator is the characteristic polynomial of A. For
    /// each channel (i, j) the numerator follows from the adjugate identity
    /// c adj(sI - A) b = det(sI - A + b c) - det(sI - A), giving
    /// num = poly(A - b c) + (d - 1) den.
    pub fn ss2tf(&self, ss: &StateSpace) -> Result<TransferFunction> {
        let n = ss.nstates();
        let (p, m) = (ss.noutputs(), ss.ninputs());

        let den = self.char_poly(ss.a())?;
        let mut num_table = Vec::with_capacity(p);
        let mut den_table = Vec::with_capacity(p);

        for i in 0..p {
            let mut num_row = Vec::with_capacity(m);
            for j in 0..m {
                let d = ss.d()[[i, j]];
                if n == 0 {
                    num_row.push(vec![d]);
                    continue;
                }
                let b = ss.b().slice(s![.., j]);
                let c = ss.c().slice(s![i, ..]);
                let a_bc = Array2::from_shape_fn((n, n), |(r, k)| ss.a()[[r, k]] - b[r] * c[k]);
                let perturbed = self.char_poly(&a_bc)?;

                let num = polynomial::add(&perturbed, &polynomial::scale(&den, d - 1.0));
                num_row.push(self.trim_cancelled(&num, &perturbed, &den));
            }
            num_table.push(num_row);
            den_table.push(vec![den.clone(); m]);
        }

        TransferFunction::new(num_table, den_table, ss.timebase())
    }

    /// Transfer function to state space (controllable canonical form)
    ///
    /// Each channel is realized separately; MIMO realizations are stacked
    /// block-diagonally, so they are not minimal in general.
    pub fn tf2ss(&self, tf: &TransferFunction) -> Result<StateSpace> {
        let (p, m) = (tf.noutputs(), tf.ninputs());

        let mut blocks = Vec::with_capacity(p * m);
        for i in 0..p {
            for j in 0..m {
                let block = realize_siso(tf.num(i, j), tf.den(i, j)).map_err(|e| match e {
                    ControlError::InvalidArgument(msg) => {
                        ControlError::InvalidArgument(format!("channel ({}, {}): {}", i, j, msg))
                    }
                    other => other,
                })?;
                blocks.push((i, j, block));
            }
        }

        let n: usize = blocks.iter().map(|(_, _, blk)| blk.a.nrows()).sum();
        let mut a = Array2::<f64>::zeros((n, n));
        let mut b = Array2::<f64>::zeros((n, m));
        let mut c = Array2::<f64>::zeros((p, n));
        let mut d = Array2::<f64>::zeros((p, m));

        let mut offset = 0;
        for (i, j, blk) in &blocks {
            let k = blk.a.nrows();
            a.slice_mut(s![offset..offset + k, offset..offset + k])
                .assign(&blk.a);
            b.slice_mut(s![offset..offset + k, *j]).assign(&blk.b);
            c.slice_mut(s![*i, offset..offset + k]).assign(&blk.c);
            d[[*i, *j]] = blk.d;
            offset += k;
        }

        StateSpace::new(a, b, c, d, tf.timebase())
    }

    /// Zero-pole-gain to transfer function
    pub fn zpk2tf(&self, zpk: &Zpk) -> Result<TransferFunction> {
        let num = if zpk.gain() == 0.0 {
            vec![0.0]
        } else {
            polynomial::scale(&polynomial::poly_from_roots(zpk.zeros()), zpk.gain())
        };
        let den = polynomial::poly_from_roots(zpk.poles());
        TransferFunction::siso(num, den, zpk.timebase())
    }

    /// SISO transfer function to zero-pole-gain
    pub fn tf2zpk(&self, tf: &TransferFunction) -> Result<Zpk> {
        let num = tf.num(0, 0);
        let den = tf.den(0, 0);

        let poles = self.roots(den)?;
        if polynomial::is_zero(num) {
            return Zpk::new(Vec::new(), poles, 0.0, tf.timebase());
        }
        let zeros = self.roots(num)?;
        Zpk::new(zeros, poles, num[0] / den[0], tf.timebase())
    }

    /// Zero-pole-gain to state space, through the transfer function
    pub fn zpk2ss(&self, zpk: &Zpk) -> Result<StateSpace> {
        self.tf2ss(&self.zpk2tf(zpk)?)
    }

    /// SISO state space to zero-pole-gain
    ///
    /// Poles are the eigenvalues of A; zeros are the roots of the
    /// numerator from [`Converter::ss2tf`].
    pub fn ss2zpk(&self, ss: &StateSpace) -> Result<Zpk> {
        let mut poles = ss.poles_bounded(self.config.max_eig_iterations)?;
        polynomial::snap_real(&mut poles, self.config.real_tol);

        let tf = self.ss2tf(ss)?;
        let num = tf.num(0, 0);
        if polynomial::is_zero(num) {
            return Zpk::new(Vec::new(), poles, 0.0, ss.timebase());
        }
        let zeros = self.roots(num)?;
        // den is monic, so the gain is the leading numerator coefficient
        Zpk::new(zeros, poles, num[0], ss.timebase())
    }

    /// Characteristic polynomial det(sI - A), monic
    fn char_poly(&self, a: &Array2<f64>) -> Result<Vec<f64>> {
        let mut eigs = linalg::eigenvalues(a, self.config.max_eig_iterations)?;
        polynomial::snap_real(&mut eigs, self.config.real_tol);
        Ok(polynomial::poly_from_roots(&eigs))
    }

    fn roots(&self, p: &[f64]) -> Result<Vec<Complex64>> {
        let mut r = polynomial::roots(p, self.config.max_eig_iterations)?;
        polynomial::snap_real(&mut r, self.config.real_tol);
        Ok(r)
    }

    /// Drop leading numerator coefficients that are pure cancellation error
    fn trim_cancelled(&self, num: &[f64], perturbed: &[f64], den: &[f64]) -> Vec<f64> {
        let scale = perturbed
            .iter()
            .chain(den.iter())
            .fold(0.0_f64, |acc, c| acc.max(c.abs()));
        let threshold = self.config.coeff_tol * scale;
        match num.iter().position(|c| c.abs() > threshold) {
            Some(first) => num[first..].to_vec(),
            None => vec![0.0],
        }
    }
}

/// Controllable canonical realization of one SISO channel
struct SisoRealization {
    a: Array2<f64>,
    b: ndarray::Array1<f64>,
    c: ndarray::Array1<f64>,
    d: f64,
}

fn realize_siso(num: &[f64], den: &[f64]) -> Result<SisoRealization> {
    let den = polynomial::trim_leading_zeros(den);
    let num = polynomial::trim_leading_zeros(num);
    let empty = |d: f64| SisoRealization {
        a: Array2::zeros((0, 0)),
        b: ndarray::Array1::zeros(0),
        c: ndarray::Array1::zeros(0),
        d,
    };

    if polynomial::is_zero(&num) {
        return Ok(empty(0.0));
    }
    if num.len() > den.len() {
        return Err(ControlError::InvalidArgument(format!(
            "improper transfer function (numerator degree {} > denominator degree {})",
            num.len() - 1,
            den.len() - 1
        )));
    }

    let lead = den[0];
    let den_n = polynomial::scale(&den, 1.0 / lead);
    let num_n = polynomial::pad_left(&polynomial::scale(&num, 1.0 / lead), den.len());
    let n = den.len() - 1;
    let d = num_n[0];
    if n == 0 {
        return Ok(empty(d));
    }

    let mut a = Array2::<f64>::zeros((n, n));
    for k in 0..n {
        a[[0, k]] = -den_n[k + 1];
    }
    for k in 1..n {
        a[[k, k - 1]] = 1.0;
    }
    let mut b = ndarray::Array1::<f64>::zeros(n);
    b[0] = 1.0;
    let c = ndarray::Array1::from_shape_fn(n, |k| num_n[k + 1] - d * den_n[k + 1]);

    Ok(SisoRealization { a, b, c, d })
}

fn no_realization(target: &str) -> ControlError {
    ControlError::NotImplemented(format!(
        "conversion from frequency response data to {} form",
        target
    ))
}

/// Convert any model to state-space form with the default configuration
pub fn to_state_space(sys: &Lti) -> Result<StateSpace> {
    Converter::default().to_state_space(sys)
}

/// Convert any model to transfer-function form with the default configuration
pub fn to_transfer_function(sys: &Lti) -> Result<TransferFunction> {
    Converter::default().to_transfer_function(sys)
}

/// Convert any SISO model to zero-pole-gain form with the default configuration
pub fn to_zpk(sys: &Lti) -> Result<Zpk> {
    Converter::default().to_zpk(sys)
}

/// Sample any model on a frequency grid
pub fn to_frd(sys: &Lti, omega: &[f64]) -> Result<FrequencyResponseData> {
    Converter::default().to_frd(sys, omega)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lti::Timebase;
    use approx::assert_relative_eq;

    fn two_pole_ss() -> StateSpace {
        StateSpace::from_rows(
            &[vec![-2.0, 0.0], vec![0.0, -3.0]],
            &[vec![1.0], vec![1.0]],
            &[vec![1.0, 1.0]],
            &[vec![0.0]],
            Timebase::Continuous,
        )
        .unwrap()
    }

    #[test]
    fn test_ss2tf_diagonal() {
        // 1/(s+2) + 1/(s+3) = (2s + 5) / (s^2 + 5s + 6)
        let tf = Converter::default().ss2tf(&two_pole_ss()).unwrap();
        let num = tf.num(0, 0);
        let den = tf.den(0, 0);
        assert_eq!(num.len(), 2);
        assert_relative_eq!(num[0], 2.0, epsilon = 1e-10);
        assert_relative_eq!(num[1], 5.0, epsilon = 1e-10);
        assert_relative_eq!(den[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(den[1], 5.0, epsilon = 1e-10);
        assert_relative_eq!(den[2], 6.0, epsilon = 1e-10);
    }

    #[test]
    fn test_ss2tf_feedthrough() {
        let ss = StateSpace::from_rows(
            &[vec![-1.0]],
            &[vec![1.0]],
            &[vec![1.0]],
            &[vec![2.0]],
            Timebase::Continuous,
        )
        .unwrap();
        // 1/(s+1) + 2 = (2s + 3)/(s + 1)
        let tf = Converter::default().ss2tf(&ss).unwrap();
        assert_relative_eq!(tf.num(0, 0)[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(tf.num(0, 0)[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tf2ss_companion() {
        let tf = TransferFunction::siso(vec![1.0, 3.0], vec![2.0, 6.0, 4.0], Timebase::Continuous)
            .unwrap();
        let ss = Converter::default().tf2ss(&tf).unwrap();
        assert_eq!(ss.nstates(), 2);
        // normalized den s^2 + 3s + 2, first row [-3, -2]
        assert_relative_eq!(ss.a()[[0, 0]], -3.0);
        assert_relative_eq!(ss.a()[[0, 1]], -2.0);
        assert_relative_eq!(ss.a()[[1, 0]], 1.0);
        assert_relative_eq!(ss.b()[[0, 0]], 1.0);
        assert_relative_eq!(ss.c()[[0, 0]], 0.5);
        assert_relative_eq!(ss.c()[[0, 1]], 1.5);
        assert_relative_eq!(ss.d()[[0, 0]], 0.0);
    }

    #[test]
    fn test_tf2ss_biproper() {
        // (s + 2)/(s + 1) = 1 + 1/(s + 1)
        let tf = TransferFunction::siso(vec![1.0, 2.0], vec![1.0, 1.0], Timebase::Continuous)
            .unwrap();
        let ss = Converter::default().tf2ss(&tf).unwrap();
        assert_relative_eq!(ss.d()[[0, 0]], 1.0);
        assert_relative_eq!(ss.c()[[0, 0]], 1.0);
        assert_relative_eq!(ss.a()[[0, 0]], -1.0);
    }

    #[test]
    fn test_tf2ss_improper_rejected() {
        let tf = TransferFunction::siso(vec![1.0, 0.0, 0.0], vec![1.0, 1.0], Timebase::Continuous)
            .unwrap();
        assert!(matches!(
            Converter::default().tf2ss(&tf),
            Err(ControlError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_tf2ss_static_gain() {
        let tf = TransferFunction::siso(vec![3.0], vec![2.0], Timebase::Continuous).unwrap();
        let ss = Converter::default().tf2ss(&tf).unwrap();
        assert_eq!(ss.nstates(), 0);
        assert_relative_eq!(ss.d()[[0, 0]], 1.5);
    }

    #[test]
    fn test_tf2ss_mimo_block_diagonal() {
        let tf = TransferFunction::new(
            vec![vec![vec![1.0], vec![2.0]]],
            vec![vec![vec![1.0, 1.0], vec![1.0, 2.0]]],
            Timebase::Continuous,
        )
        .unwrap();
        let ss = Converter::default().tf2ss(&tf).unwrap();
        assert_eq!(ss.nstates(), 2);
        assert_eq!(ss.ninputs(), 2);
        assert_eq!(ss.noutputs(), 1);

        let h = ss.freq_eval(0.0).unwrap();
        assert_relative_eq!(h[[0, 0]].re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(h[[0, 1]].re, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zpk_tf_roundtrip_complex_poles() {
        let zpk = Zpk::new(
            vec![Complex64::new(-3.0, 0.0)],
            vec![Complex64::new(-1.0, 2.0), Complex64::new(-1.0, -2.0)],
            4.0,
            Timebase::Continuous,
        )
        .unwrap();
        let conv = Converter::default();
        let tf = conv.zpk2tf(&zpk).unwrap();
        assert_eq!(tf.num(0, 0), &[4.0, 12.0]);
        assert_eq!(tf.den(0, 0), &[1.0, 2.0, 5.0]);

        let back = conv.tf2zpk(&tf).unwrap();
        assert_relative_eq!(back.gain(), 4.0, epsilon = 1e-12);
        assert_relative_eq!(back.zeros()[0].re, -3.0, epsilon = 1e-12);
        for p in back.poles() {
            assert_relative_eq!(p.re, -1.0, epsilon = 1e-10);
            assert_relative_eq!(p.im.abs(), 2.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_ss2zpk() {
        let zpk = Converter::default().ss2zpk(&two_pole_ss()).unwrap();
        assert_eq!(zpk.poles().len(), 2);
        assert_eq!(zpk.zeros().len(), 1);
        assert_relative_eq!(zpk.zeros()[0].re, -2.5, epsilon = 1e-10);
        assert_relative_eq!(zpk.gain(), 2.0, epsilon = 1e-10);
        for p in zpk.poles() {
            assert_eq!(p.im, 0.0);
        }
    }

    #[test]
    fn test_zpk_requires_siso() {
        let tf = TransferFunction::new(
            vec![vec![vec![1.0], vec![2.0]]],
            vec![vec![vec![1.0, 1.0], vec![1.0, 2.0]]],
            Timebase::Continuous,
        )
        .unwrap();
        assert!(matches!(
            to_zpk(&tf.into()),
            Err(ControlError::IncompatibleShape(_))
        ));
    }

    #[test]
    fn test_frd_has_no_realization() {
        let frd = FrequencyResponseData::from_siso(
            vec![1.0, 2.0],
            vec![Complex64::new(1.0, 0.0); 2],
            Timebase::Continuous,
        )
        .unwrap();
        assert!(matches!(
            to_state_space(&frd.into()),
            Err(ControlError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_timebase_travels() {
        let tf = TransferFunction::siso(vec![1.0], vec![1.0, -0.5], Timebase::Discrete(0.1)).unwrap();
        let ss = to_state_space(&tf.into()).unwrap();
        assert_eq!(ss.timebase(), Timebase::Discrete(0.1));
        let zpk = to_zpk(&ss.into()).unwrap();
        assert_eq!(zpk.timebase(), Timebase::Discrete(0.1));
    }
}
