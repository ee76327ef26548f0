//! Error taxonomy for LTI operations
//!
//! Every fallible operation returns [`Result`]. Errors describe the
//! offending argument shapes or counts, never solver internals.

use thiserror::Error;

/// LTI operation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    #[error("Incompatible shape: {0}")]
    IncompatibleShape(String),

    #[error("Singular conversion: {0}")]
    SingularConversion(String),

    #[error("Unsupported shape for {method}: expected SISO, got {noutputs} outputs x {ninputs} inputs")]
    UnsupportedShape {
        method: String,
        noutputs: usize,
        ninputs: usize,
    },

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{solver} did not converge for a problem of order {order}")]
    NumericalNonconvergence { solver: &'static str, order: usize },

    #[error("Timebase mismatch: {0}")]
    TimebaseMismatch(String),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, ControlError>;

/// Format a (rows, cols) pair the way error messages report shapes
pub(crate) fn shape_str(dim: (usize, usize)) -> String {
    format!("{}x{}", dim.0, dim.1)
}
