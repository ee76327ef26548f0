//! Python bindings for the StateSpace and TransferFunction classes

use ltikit_core::lti::{Lti, LtiSystem, StateSpace, Timebase, TransferFunction};
use num_complex::Complex64;
use numpy::{PyArray1, PyArray2, PyArray3, PyReadonlyArray2, ToPyArray};
use pyo3::prelude::*;

use crate::error::to_py_err;

fn timebase_of(dt: Option<f64>) -> PyResult<Timebase> {
    match dt {
        None => Ok(Timebase::Continuous),
        Some(dt) => Timebase::discrete(dt).map_err(to_py_err),
    }
}

/// Python wrapper for StateSpace
#[pyclass(name = "StateSpace")]
#[derive(Clone)]
pub struct PyStateSpace {
    inner: StateSpace,
}

#[pymethods]
impl PyStateSpace {
    /// Create a state-space model
    ///
    /// Args:
    ///     A, B, C, D: System matrices as 2-D float arrays
    ///     dt: Sample time; None for a continuous-time model
    #[new]
    #[pyo3(signature = (a, b, c, d, dt=None))]
    pub fn new(
        a: PyReadonlyArray2<'_, f64>,
        b: PyReadonlyArray2<'_, f64>,
        c: PyReadonlyArray2<'_, f64>,
        d: PyReadonlyArray2<'_, f64>,
        dt: Option<f64>,
    ) -> PyResult<Self> {
        StateSpace::new(
            a.as_array().to_owned(),
            b.as_array().to_owned(),
            c.as_array().to_owned(),
            d.as_array().to_owned(),
            timebase_of(dt)?,
        )
        .map(|inner| Self { inner })
        .map_err(to_py_err)
    }

    #[getter(A)]
    pub fn a<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.inner.a().to_pyarray(py)
    }

    #[getter(B)]
    pub fn b<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.inner.b().to_pyarray(py)
    }

    #[getter(C)]
    pub fn c<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.inner.c().to_pyarray(py)
    }

    #[getter(D)]
    pub fn d<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.inner.d().to_pyarray(py)
    }

    /// Sample time, None for continuous-time models
    #[getter]
    pub fn dt(&self) -> Option<f64> {
        self.inner.timebase().dt()
    }

    #[getter]
    pub fn nstates(&self) -> usize {
        self.inner.nstates()
    }

    #[getter]
    pub fn ninputs(&self) -> usize {
        self.inner.ninputs()
    }

    #[getter]
    pub fn noutputs(&self) -> usize {
        self.inner.noutputs()
    }

    /// Poles (eigenvalues of A) as a complex array
    pub fn poles<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray1<Complex64>>> {
        let poles = self.inner.poles().map_err(to_py_err)?;
        Ok(PyArray1::from_vec(py, poles))
    }

    /// Frequency response [nfreq, noutputs, ninputs] at the given rad/s values
    pub fn freqresp<'py>(
        &self,
        py: Python<'py>,
        omega: Vec<f64>,
    ) -> PyResult<Bound<'py, PyArray3<Complex64>>> {
        let h = self.inner.freqresp(&omega).map_err(to_py_err)?;
        Ok(h.to_pyarray(py))
    }

    fn __repr__(&self) -> String {
        format!(
            "StateSpace({} states, {} inputs, {} outputs, {})",
            self.inner.nstates(),
            self.inner.ninputs(),
            self.inner.noutputs(),
            self.inner.timebase()
        )
    }
}

impl PyStateSpace {
    pub fn inner(&self) -> &StateSpace {
        &self.inner
    }

    pub fn from_state_space(inner: StateSpace) -> Self {
        Self { inner }
    }
}

/// Python wrapper for TransferFunction
#[pyclass(name = "TransferFunction")]
#[derive(Clone)]
pub struct PyTransferFunction {
    inner: TransferFunction,
}

#[pymethods]
impl PyTransferFunction {
    /// Create a SISO transfer function
    ///
    /// Args:
    ///     num: Numerator coefficients, descending powers
    ///     den: Denominator coefficients, descending powers
    ///     dt: Sample time; None for a continuous-time model
    #[new]
    #[pyo3(signature = (num, den, dt=None))]
    pub fn new(num: Vec<f64>, den: Vec<f64>, dt: Option<f64>) -> PyResult<Self> {
        TransferFunction::siso(num, den, timebase_of(dt)?)
            .map(|inner| Self { inner })
            .map_err(to_py_err)
    }

    /// Numerators as nested lists [output][input][coefficient]
    #[getter]
    pub fn num(&self) -> Vec<Vec<Vec<f64>>> {
        self.inner.num_table().to_vec()
    }

    /// Denominators as nested lists [output][input][coefficient]
    #[getter]
    pub fn den(&self) -> Vec<Vec<Vec<f64>>> {
        self.inner.den_table().to_vec()
    }

    #[getter]
    pub fn dt(&self) -> Option<f64> {
        self.inner.timebase().dt()
    }

    #[getter]
    pub fn ninputs(&self) -> usize {
        self.inner.ninputs()
    }

    #[getter]
    pub fn noutputs(&self) -> usize {
        self.inner.noutputs()
    }

    pub fn poles<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray1<Complex64>>> {
        let poles = self.inner.poles().map_err(to_py_err)?;
        Ok(PyArray1::from_vec(py, poles))
    }

    pub fn zeros<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray1<Complex64>>> {
        let zeros = self.inner.zeros().map_err(to_py_err)?;
        Ok(PyArray1::from_vec(py, zeros))
    }

    pub fn freqresp<'py>(
        &self,
        py: Python<'py>,
        omega: Vec<f64>,
    ) -> PyResult<Bound<'py, PyArray3<Complex64>>> {
        let h = self.inner.freqresp(&omega).map_err(to_py_err)?;
        Ok(h.to_pyarray(py))
    }

    fn __repr__(&self) -> String {
        if self.inner.is_siso() {
            format!(
                "TransferFunction({:?}, {:?}, {})",
                self.inner.num(0, 0),
                self.inner.den(0, 0),
                self.inner.timebase()
            )
        } else {
            format!(
                "TransferFunction({} inputs, {} outputs, {})",
                self.inner.ninputs(),
                self.inner.noutputs(),
                self.inner.timebase()
            )
        }
    }
}

impl PyTransferFunction {
    pub fn inner(&self) -> &TransferFunction {
        &self.inner
    }

    pub fn from_transfer_function(inner: TransferFunction) -> Self {
        Self { inner }
    }
}

/// Extract a model from a StateSpace or TransferFunction object
pub fn extract_model(obj: &Bound<'_, PyAny>) -> Option<Lti> {
    if let Ok(ss) = obj.downcast::<PyStateSpace>() {
        return Some(ss.borrow().inner().clone().into());
    }
    if let Ok(tf) = obj.downcast::<PyTransferFunction>() {
        return Some(tf.borrow().inner().clone().into());
    }
    None
}

/// Wrap a model in the matching Python class
pub fn model_into_py(py: Python<'_>, sys: Lti) -> PyResult<PyObject> {
    match sys {
        Lti::StateSpace(ss) => Ok(Py::new(py, PyStateSpace::from_state_space(ss))?.into_any()),
        Lti::TransferFunction(tf) => {
            Ok(Py::new(py, PyTransferFunction::from_transfer_function(tf))?.into_any())
        }
        other => {
            let tf = ltikit_core::convert::to_transfer_function(&other).map_err(to_py_err)?;
            Ok(Py::new(py, PyTransferFunction::from_transfer_function(tf))?.into_any())
        }
    }
}
