//! MATLAB-style module functions

use ltikit_core::lti::Lti;
use ltikit_core::matlab::{self, MatlabArg};
use ltikit_core::report::DampingTable;
use ndarray::Array2;
use num_complex::Complex64;
use numpy::{PyArray1, PyReadonlyArray1, PyReadonlyArray2, ToPyArray};
use pyo3::exceptions::PyTypeError;
use pyo3::prelude::*;
use pyo3::types::{PyFloat, PyTuple};

use crate::error::to_py_err;
use crate::models::{extract_model, model_into_py, PyStateSpace, PyTransferFunction};

/// Convert one positional Python argument
fn extract_arg(obj: &Bound<'_, PyAny>, position: usize) -> PyResult<MatlabArg> {
    if let Some(sys) = extract_model(obj) {
        return Ok(MatlabArg::Model(sys));
    }
    if let Ok(x) = obj.extract::<f64>() {
        return Ok(MatlabArg::Scalar(x));
    }
    if let Ok(m) = obj.extract::<PyReadonlyArray2<'_, f64>>() {
        return Ok(MatlabArg::Matrix(m.as_array().to_owned()));
    }
    if let Ok(v) = obj.extract::<PyReadonlyArray1<'_, f64>>() {
        return Ok(MatlabArg::Array(v.as_array().to_vec()));
    }
    if let Ok(v) = obj.extract::<Vec<f64>>() {
        return Ok(MatlabArg::Array(v));
    }
    if let Ok(r) = obj.extract::<Vec<Complex64>>() {
        return Ok(MatlabArg::Roots(r));
    }
    if let Ok(rows) = obj.extract::<Vec<Vec<f64>>>() {
        let ncols = rows.first().map_or(0, Vec::len);
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        if let Ok(m) = Array2::from_shape_vec((rows.len(), ncols), flat) {
            return Ok(MatlabArg::Matrix(m));
        }
    }
    Err(PyTypeError::new_err(format!(
        "argument {} is not a model, number, vector or matrix",
        position + 1
    )))
}

fn extract_args(args: &Bound<'_, PyTuple>) -> PyResult<Vec<MatlabArg>> {
    args.iter()
        .enumerate()
        .map(|(k, obj)| extract_arg(&obj, k))
        .collect()
}

fn extract_system(obj: &Bound<'_, PyAny>) -> PyResult<Lti> {
    extract_model(obj)
        .ok_or_else(|| PyTypeError::new_err("expected a StateSpace or TransferFunction"))
}

/// Gain and phase margins with their crossover frequencies
///
/// Call as margin(sys) or margin(mag, phase, w), with phase in degrees
/// and w in rad/s.
///
/// Returns:
///     (gm, pm, Wcg, Wcp): gain margin, phase margin (deg), gain crossover
///     frequency and phase crossover frequency
#[pyfunction]
#[pyo3(signature = (*args))]
pub fn margin(args: &Bound<'_, PyTuple>) -> PyResult<(f64, f64, f64, f64)> {
    let args = extract_args(args)?;
    matlab::margin(&args).map_err(to_py_err)
}

/// Steady-state gain
///
/// Call as dcgain(A, B, C, D), dcgain(Z, P, k), dcgain(num, den) or
/// dcgain(sys). SISO results are returned as a float.
#[pyfunction]
#[pyo3(signature = (*args))]
pub fn dcgain(py: Python<'_>, args: &Bound<'_, PyTuple>) -> PyResult<PyObject> {
    let args = extract_args(args)?;
    let gain = matlab::dcgain(&args).map_err(to_py_err)?;
    if gain.dim() == (1, 1) {
        Ok(PyFloat::new(py, gain[[0, 0]]).into_any().unbind())
    } else {
        Ok(gain.to_pyarray(py).into_any().unbind())
    }
}

/// Natural frequency, damping and poles of a system
///
/// Args:
///     sys: StateSpace or TransferFunction
///     doprint: Print the eigenvalue table (default: True)
///
/// Returns:
///     (wn, damping, poles) as numpy arrays
#[pyfunction]
#[pyo3(signature = (sys, doprint=true))]
#[allow(clippy::type_complexity)]
pub fn damp<'py>(
    py: Python<'py>,
    sys: &Bound<'py, PyAny>,
    doprint: bool,
) -> PyResult<(
    Bound<'py, PyArray1<f64>>,
    Bound<'py, PyArray1<f64>>,
    Bound<'py, PyArray1<Complex64>>,
)> {
    let sys = extract_system(sys)?;
    let d = matlab::damp(&sys).map_err(to_py_err)?;

    if doprint {
        let print = py.import("builtins")?.getattr("print")?;
        for line in DampingTable::new(&d).to_string().lines() {
            print.call1((line,))?;
        }
    }

    Ok((
        PyArray1::from_slice(py, &d.wn),
        PyArray1::from_slice(py, &d.zeta),
        PyArray1::from_slice(py, &d.poles),
    ))
}

/// Discretize a continuous-time system
///
/// Args:
///     sysc: Continuous StateSpace or TransferFunction
///     Ts: Sample time
///     method: 'zoh' (default), 'tustin'/'bilinear', 'matched';
///         'foh' and 'impulse' raise NotImplementedError
#[pyfunction]
#[pyo3(signature = (sysc, Ts, method="zoh"))]
#[allow(non_snake_case)]
pub fn c2d(py: Python<'_>, sysc: &Bound<'_, PyAny>, Ts: f64, method: &str) -> PyResult<PyObject> {
    let sys = extract_system(sysc)?;
    let sysd = matlab::c2d(&sys, Ts, method).map_err(to_py_err)?;
    model_into_py(py, sysd)
}

/// Convert a system to transfer-function form
#[pyfunction]
pub fn ss2tf(sys: &Bound<'_, PyAny>) -> PyResult<PyTransferFunction> {
    let sys = extract_system(sys)?;
    matlab::ss2tf(&sys)
        .map(PyTransferFunction::from_transfer_function)
        .map_err(to_py_err)
}

/// Convert a system to state-space form
#[pyfunction]
pub fn tf2ss(sys: &Bound<'_, PyAny>) -> PyResult<PyStateSpace> {
    let sys = extract_system(sys)?;
    matlab::tf2ss(&sys)
        .map(PyStateSpace::from_state_space)
        .map_err(to_py_err)
}
