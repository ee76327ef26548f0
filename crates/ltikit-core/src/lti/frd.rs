//! Frequency response data
//!
//! Sampled complex gains H(jω) on a strictly increasing, non-negative
//! frequency grid.

use ndarray::{Array2, Array3};
use num_complex::Complex64;

use super::{LtiSystem, Timebase};
use crate::error::{ControlError, Result};
use crate::math::conversions::{complex_2_degree, complex_2_magnitude, unwrap_deg};

/// Frequency response data model
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyResponseData {
    /// Angular frequencies in rad/s
    omega: Vec<f64>,
    /// Response data [nfreq, noutputs, ninputs]
    response: Array3<Complex64>,
    timebase: Timebase,
}

impl FrequencyResponseData {
    /// Create from frequencies and a [nfreq, noutputs, ninputs] response array
    pub fn new(omega: Vec<f64>, response: Array3<Complex64>, timebase: Timebase) -> Result<Self> {
        timebase.validate()?;

        let (nfreq, noutputs, ninputs) = response.dim();
        if omega.is_empty() {
            return Err(ControlError::InvalidArgument(
                "frequency response data needs at least one frequency".to_string(),
            ));
        }
        if nfreq != omega.len() {
            return Err(ControlError::IncompatibleShape(format!(
                "{} frequencies but {} response samples",
                omega.len(),
                nfreq
            )));
        }
        if noutputs == 0 || ninputs == 0 {
            return Err(ControlError::IncompatibleShape(
                "response needs at least one output and one input".to_string(),
            ));
        }
        if omega.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ControlError::InvalidArgument(
                "frequencies must be finite and non-negative".to_string(),
            ));
        }
        if omega.windows(2).any(|p| p[1] <= p[0]) {
            return Err(ControlError::InvalidArgument(
                "frequencies must be strictly increasing".to_string(),
            ));
        }

        Ok(Self {
            omega,
            response,
            timebase,
        })
    }

    /// Create a SISO data set from a vector of complex gains
    pub fn from_siso(omega: Vec<f64>, h: Vec<Complex64>, timebase: Timebase) -> Result<Self> {
        let n = h.len();
        let response = Array3::from_shape_vec((n, 1, 1), h)
            .map_err(|e| ControlError::IncompatibleShape(e.to_string()))?;
        Self::new(omega, response, timebase)
    }

    /// Sample any model along a frequency grid
    pub fn from_model<S: LtiSystem + ?Sized>(sys: &S, omega: &[f64]) -> Result<Self> {
        let response = sys.freqresp(omega)?;
        Self::new(omega.to_vec(), response, sys.timebase())
    }

    /// Frequency vector in rad/s
    #[inline]
    pub fn omega(&self) -> &[f64] {
        &self.omega
    }

    /// Response data [nfreq, noutputs, ninputs]
    #[inline]
    pub fn response(&self) -> &Array3<Complex64> {
        &self.response
    }

    /// Number of frequency points
    #[inline]
    pub fn nfreq(&self) -> usize {
        self.omega.len()
    }

    /// Magnitude of channel (i, j) in absolute units
    pub fn magnitude(&self, i: usize, j: usize) -> Vec<f64> {
        (0..self.nfreq())
            .map(|k| complex_2_magnitude(self.response[[k, i, j]]))
            .collect()
    }

    /// Unwrapped phase of channel (i, j) in degrees
    pub fn phase_deg(&self, i: usize, j: usize) -> Vec<f64> {
        let wrapped: Vec<f64> = (0..self.nfreq())
            .map(|k| complex_2_degree(self.response[[k, i, j]]))
            .collect();
        unwrap_deg(&wrapped)
    }

    /// Interpolate to new frequencies
    ///
    /// Uses linear interpolation in the complex domain. Points outside the
    /// sampled band are rejected rather than extrapolated.
    pub fn interpolate(&self, new_omega: &[f64]) -> Result<FrequencyResponseData> {
        let (_, noutputs, ninputs) = self.response.dim();
        let mut data = Array3::<Complex64>::zeros((new_omega.len(), noutputs, ninputs));

        for (k, &w) in new_omega.iter().enumerate() {
            let h = self.interpolate_at(w)?;
            data.slice_mut(ndarray::s![k, .., ..]).assign(&h);
        }

        FrequencyResponseData::new(new_omega.to_vec(), data, self.timebase)
    }

    fn interpolate_at(&self, w: f64) -> Result<Array2<Complex64>> {
        let omega = &self.omega;
        let (nfreq, noutputs, ninputs) = self.response.dim();
        let out_of_band = || {
            ControlError::InvalidArgument(format!(
                "frequency {} outside sampled band [{}, {}]",
                w,
                omega[0],
                omega[nfreq - 1]
            ))
        };
        if w < omega[0] || w > omega[nfreq - 1] {
            return Err(out_of_band());
        }

        // First index with omega[idx] >= w
        let idx = omega.partition_point(|&x| x < w);
        if omega[idx] == w || idx == 0 {
            return Ok(self.response.slice(ndarray::s![idx, .., ..]).to_owned());
        }

        let (w0, w1) = (omega[idx - 1], omega[idx]);
        let t = (w - w0) / (w1 - w0);
        Ok(Array2::from_shape_fn((noutputs, ninputs), |(i, j)| {
            let h0 = self.response[[idx - 1, i, j]];
            let h1 = self.response[[idx, i, j]];
            h0 + (h1 - h0) * t
        }))
    }
}

impl LtiSystem for FrequencyResponseData {
    fn ninputs(&self) -> usize {
        self.response.dim().2
    }

    fn noutputs(&self) -> usize {
        self.response.dim().1
    }

    fn timebase(&self) -> Timebase {
        self.timebase
    }

    fn freq_eval(&self, w: f64) -> Result<Array2<Complex64>> {
        self.interpolate_at(w)
    }
}
