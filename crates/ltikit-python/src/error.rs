//! Mapping of core errors onto Python exceptions

use ltikit_core::ControlError;
use pyo3::exceptions::{PyArithmeticError, PyNotImplementedError, PyRuntimeError, PyValueError};
use pyo3::PyErr;

/// Convert a core error to the matching Python exception
pub fn to_py_err(err: ControlError) -> PyErr {
    let msg = err.to_string();
    match err {
        ControlError::IncompatibleShape(_)
        | ControlError::UnsupportedShape { .. }
        | ControlError::InvalidArgument(_)
        | ControlError::TimebaseMismatch(_) => PyValueError::new_err(msg),
        ControlError::NotImplemented(_) => PyNotImplementedError::new_err(msg),
        ControlError::SingularConversion(_) => PyArithmeticError::new_err(msg),
        ControlError::NumericalNonconvergence { .. } => PyRuntimeError::new_err(msg),
    }
}
