//! Python bindings for ltikit-core
//!
//! This module exposes the MATLAB-style ltikit functions to Python via PyO3.
//!
//! ## Classes
//!
//! - `StateSpace` - State-space model (A, B, C, D)
//! - `TransferFunction` - SISO transfer function num/den
//!
//! ## Functions
//!
//! - `margin`, `dcgain`, `damp`, `c2d`, `ss2tf`, `tf2ss`

use pyo3::prelude::*;

mod error;
mod functions;
mod models;

pub use models::{PyStateSpace, PyTransferFunction};

/// ltikit_python - LTI control-system analysis in Rust
///
/// Example:
///     >>> import ltikit_python as lk
///     >>> sys = lk.TransferFunction([1.0], [1.0, 2.0, 1.0, 0.0])
///     >>> gm, pm, wcg, wcp = lk.margin(sys)
///     >>> wn, zeta, poles = lk.damp(sys)
#[pymodule]
fn ltikit_python(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Add classes with clean names (no Py prefix in Python)
    m.add_class::<PyStateSpace>()?;
    m.add_class::<PyTransferFunction>()?;

    m.add_function(wrap_pyfunction!(functions::margin, m)?)?;
    m.add_function(wrap_pyfunction!(functions::dcgain, m)?)?;
    m.add_function(wrap_pyfunction!(functions::damp, m)?)?;
    m.add_function(wrap_pyfunction!(functions::c2d, m)?)?;
    m.add_function(wrap_pyfunction!(functions::ss2tf, m)?)?;
    m.add_function(wrap_pyfunction!(functions::tf2ss, m)?)?;

    m.add("__version__", "0.1.0")?;

    Ok(())
}
