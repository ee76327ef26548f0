//! Frequency grids for margin searches
//!
//! Angular frequencies in rad/s, log-spaced between two decades.

use crate::error::{ControlError, Result};

/// Log-spaced angular frequency grid
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyGrid {
    w: Vec<f64>,
}

impl FrequencyGrid {
    /// Grid of `npoints` frequencies from 10^lo_decade to 10^hi_decade rad/s
    ///
    /// Adjacent points keep a constant ratio. A single point sits at the
    /// lower bound.
    ///
    /// # Example
    /// ```
    /// use ltikit_core::frequency::FrequencyGrid;
    /// let grid = FrequencyGrid::logspace(-1.0, 1.0, 50).unwrap();
    /// assert_eq!(grid.npoints(), 50);
    /// ```
    pub fn logspace(lo_decade: f64, hi_decade: f64, npoints: usize) -> Result<Self> {
        if npoints == 0 {
            return Err(ControlError::InvalidArgument(
                "frequency grid needs at least one point".to_string(),
            ));
        }
        if !(lo_decade.is_finite() && hi_decade.is_finite()) || hi_decade < lo_decade {
            return Err(ControlError::InvalidArgument(format!(
                "invalid decade range [{}, {}]",
                lo_decade, hi_decade
            )));
        }

        let w = if npoints == 1 {
            vec![10f64.powf(lo_decade)]
        } else {
            let step = (hi_decade - lo_decade) / (npoints - 1) as f64;
            (0..npoints)
                .map(|i| 10f64.powf(lo_decade + i as f64 * step))
                .collect()
        };
        Ok(Self { w })
    }

    /// Angular frequencies in rad/s
    #[inline]
    pub fn w(&self) -> &[f64] {
        &self.w
    }

    #[inline]
    pub fn npoints(&self) -> usize {
        self.w.len()
    }

    /// Lowest frequency in rad/s
    #[inline]
    pub fn start(&self) -> f64 {
        self.w[0]
    }

    /// Highest frequency in rad/s
    #[inline]
    pub fn stop(&self) -> f64 {
        self.w[self.w.len() - 1]
    }
}
