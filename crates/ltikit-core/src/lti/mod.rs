//! LTI model representations
//!
//! Four passive value types (state-space, transfer function, zero-pole-gain
//! and frequency response data), the [`Lti`] tagged union over them, and the
//! [`LtiSystem`] trait giving every form a common frequency evaluation.

mod frd;
mod operators;
mod statespace;
mod transfer_function;
mod zpk;

pub use frd::FrequencyResponseData;
pub use statespace::StateSpace;
pub use transfer_function::TransferFunction;
pub use zpk::Zpk;

use ndarray::{Array2, Array3};
use num_complex::Complex64;

use crate::error::{ControlError, Result};

/// Continuous or discrete time base of a model
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Timebase {
    #[default]
    Continuous,
    /// Discrete time with the given sample time in seconds
    Discrete(f64),
}

impl Timebase {
    /// Create a discrete timebase, validating the sample time
    pub fn discrete(dt: f64) -> Result<Self> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(ControlError::InvalidArgument(format!(
                "sample time must be positive and finite, got {}",
                dt
            )));
        }
        Ok(Timebase::Discrete(dt))
    }

    #[inline]
    pub fn is_continuous(&self) -> bool {
        matches!(self, Timebase::Continuous)
    }

    #[inline]
    pub fn is_discrete(&self) -> bool {
        matches!(self, Timebase::Discrete(_))
    }

    /// Sample time, `None` for continuous models
    #[inline]
    pub fn dt(&self) -> Option<f64> {
        match self {
            Timebase::Continuous => None,
            Timebase::Discrete(dt) => Some(*dt),
        }
    }

    /// Shared timebase of two models, or an error when they differ
    pub fn common(a: Timebase, b: Timebase) -> Result<Timebase> {
        if a == b {
            Ok(a)
        } else {
            Err(ControlError::TimebaseMismatch(format!("{} vs {}", a, b)))
        }
    }

    /// Point of the complex plane at which the frequency response is taken:
    /// s = jω for continuous models, z = e^{jωT} for discrete ones
    pub fn frequency_point(&self, w: f64) -> Complex64 {
        match self {
            Timebase::Continuous => Complex64::new(0.0, w),
            Timebase::Discrete(dt) => Complex64::from_polar(1.0, w * dt),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Timebase::Continuous => Ok(()),
            Timebase::Discrete(dt) => Timebase::discrete(*dt).map(|_| ()),
        }
    }
}

impl std::fmt::Display for Timebase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timebase::Continuous => write!(f, "continuous"),
            Timebase::Discrete(dt) => write!(f, "discrete (dt = {})", dt),
        }
    }
}

/// Common interface of every model representation
pub trait LtiSystem {
    /// Number of inputs
    fn ninputs(&self) -> usize;

    /// Number of outputs
    fn noutputs(&self) -> usize;

    /// Time base carried by the model
    fn timebase(&self) -> Timebase;

    /// Frequency response at ω (rad/s) as a noutputs x ninputs matrix
    fn freq_eval(&self, w: f64) -> Result<Array2<Complex64>>;

    /// True for single-input single-output models
    fn is_siso(&self) -> bool {
        self.ninputs() == 1 && self.noutputs() == 1
    }

    /// Frequency response over a grid, shape [nfreq, noutputs, ninputs]
    fn freqresp(&self, omega: &[f64]) -> Result<Array3<Complex64>> {
        let mut out = Array3::<Complex64>::zeros((omega.len(), self.noutputs(), self.ninputs()));
        for (k, &w) in omega.iter().enumerate() {
            let h = self.freq_eval(w)?;
            out.slice_mut(ndarray::s![k, .., ..]).assign(&h);
        }
        Ok(out)
    }
}

/// Any of the four model representations
#[derive(Debug, Clone)]
pub enum Lti {
    StateSpace(StateSpace),
    TransferFunction(TransferFunction),
    Zpk(Zpk),
    Frd(FrequencyResponseData),
}

impl Lti {
    /// Short name of the representation, as used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Lti::StateSpace(_) => "state-space",
            Lti::TransferFunction(_) => "transfer function",
            Lti::Zpk(_) => "zero-pole-gain",
            Lti::Frd(_) => "frequency response data",
        }
    }

    fn as_system(&self) -> &dyn LtiSystem {
        match self {
            Lti::StateSpace(sys) => sys,
            Lti::TransferFunction(sys) => sys,
            Lti::Zpk(sys) => sys,
            Lti::Frd(sys) => sys,
        }
    }
}

impl LtiSystem for Lti {
    fn ninputs(&self) -> usize {
        self.as_system().ninputs()
    }

    fn noutputs(&self) -> usize {
        self.as_system().noutputs()
    }

    fn timebase(&self) -> Timebase {
        self.as_system().timebase()
    }

    fn freq_eval(&self, w: f64) -> Result<Array2<Complex64>> {
        self.as_system().freq_eval(w)
    }
}

impl From<StateSpace> for Lti {
    fn from(sys: StateSpace) -> Self {
        Lti::StateSpace(sys)
    }
}

impl From<TransferFunction> for Lti {
    fn from(sys: TransferFunction) -> Self {
        Lti::TransferFunction(sys)
    }
}

impl From<Zpk> for Lti {
    fn from(sys: Zpk) -> Self {
        Lti::Zpk(sys)
    }
}

impl From<FrequencyResponseData> for Lti {
    fn from(sys: FrequencyResponseData) -> Self {
        Lti::Frd(sys)
    }
}

/// Fail with `UnsupportedShape` unless the model is SISO
pub(crate) fn require_siso<S: LtiSystem + ?Sized>(sys: &S, method: &str) -> Result<()> {
    if sys.is_siso() {
        Ok(())
    } else {
        Err(ControlError::UnsupportedShape {
            method: method.to_string(),
            noutputs: sys.noutputs(),
            ninputs: sys.ninputs(),
        })
    }
}
