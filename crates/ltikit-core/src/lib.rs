//! ltikit-core: LTI control-system toolkit
//!
//! Linear time-invariant models in state-space, transfer-function,
//! zero-pole-gain and frequency-response-data form.
//!
//! ## Modules
//!
//! - `lti` - Model representations and the `Lti` union
//! - `convert` - Conversions between representations
//! - `discretize` - Continuous-to-discrete sampling (zoh, tustin, matched)
//! - `margins` - Gain and phase stability margins
//! - `metrics` - DC gain, damping, poles and zeros
//! - `matlab` - MATLAB-style call shapes over the above
//! - `report` - Text rendering of results

pub mod config;
pub mod constants;
pub mod convert;
pub mod discretize;
pub mod error;
pub mod frequency;
pub mod lti;
pub mod margins;
pub mod math;
pub mod matlab;
pub mod metrics;
pub mod report;

pub use config::NumericConfig;
pub use convert::Converter;
pub use discretize::{Discretizer, Method};
pub use error::{ControlError, Result};
pub use frequency::FrequencyGrid;
pub use lti::{FrequencyResponseData, Lti, LtiSystem, StateSpace, Timebase, TransferFunction, Zpk};
pub use margins::{MarginAnalyzer, MarginResult};
pub use metrics::{Damping, Metrics};
