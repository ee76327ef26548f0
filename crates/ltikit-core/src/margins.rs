//! Gain and phase stability margins
//!
//! Margins are extracted from sampled frequency responses: the unwrapped
//! phase is scanned for crossings of -180 degrees (mod 360), the magnitude
//! for crossings of unity, and each crossing is located by linear
//! interpolation between the two bracketing samples.

use log::{trace, warn};
use num_complex::Complex64;

use crate::config::NumericConfig;
use crate::convert::Converter;
use crate::error::{ControlError, Result};
use crate::frequency::FrequencyGrid;
use crate::lti::{require_siso, Lti, LtiSystem, Timebase, Zpk};
use crate::math::{complex_2_degree, complex_2_magnitude, mag_2_db, unwrap_deg, wrap_deg};

/// Worst-case stability margins of a SISO loop
///
/// Margins without a matching crossover are `f64::INFINITY` and their
/// frequencies `f64::NAN`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginResult {
    /// Gain margin as a linear ratio
    pub gain_margin: f64,
    /// Phase margin in degrees
    pub phase_margin: f64,
    /// Frequency (rad/s) where |L| = 1, associated with the phase margin
    pub gain_crossover_freq: f64,
    /// Frequency (rad/s) where the phase is -180 deg, associated with the gain margin
    pub phase_crossover_freq: f64,
}

impl MarginResult {
    /// Result with no crossover of either kind
    pub fn undefined() -> Self {
        Self {
            gain_margin: f64::INFINITY,
            phase_margin: f64::INFINITY,
            gain_crossover_freq: f64::NAN,
            phase_crossover_freq: f64::NAN,
        }
    }

    /// Gain margin in dB
    pub fn gain_margin_db(&self) -> f64 {
        mag_2_db(self.gain_margin)
    }
}

impl Default for MarginResult {
    fn default() -> Self {
        Self::undefined()
    }
}

/// Every crossover found in a frequency response, in ascending frequency
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllMargins {
    pub gain_margins: Vec<f64>,
    pub phase_crossover_freqs: Vec<f64>,
    pub phase_margins: Vec<f64>,
    pub gain_crossover_freqs: Vec<f64>,
}

impl AllMargins {
    /// Reduce to the lowest margin of each kind; equal margins keep the
    /// lower frequency.
    pub fn worst_case(&self) -> MarginResult {
        let (gain_margin, phase_crossover_freq) =
            lowest(&self.gain_margins, &self.phase_crossover_freqs);
        let (phase_margin, gain_crossover_freq) =
            lowest(&self.phase_margins, &self.gain_crossover_freqs);
        MarginResult {
            gain_margin,
            phase_margin,
            gain_crossover_freq,
            phase_crossover_freq,
        }
    }
}

fn lowest(margins: &[f64], freqs: &[f64]) -> (f64, f64) {
    let mut best = (f64::INFINITY, f64::NAN);
    for (&m, &w) in margins.iter().zip(freqs) {
        // strict comparison on ascending frequencies keeps the first tie
        if m < best.0 || (best.1.is_nan() && m == best.0) {
            best = (m, w);
        }
    }
    best
}

/// A point where a sampled sequence reaches a level
#[derive(Debug, Clone, Copy)]
struct Crossing {
    index: usize,
    frac: f64,
    omega: f64,
}

impl Crossing {
    fn interpolate(&self, values: &[f64]) -> f64 {
        let v0 = values[self.index];
        match values.get(self.index + 1) {
            Some(v1) if self.frac != 0.0 => v0 + self.frac * (v1 - v0),
            _ => v0,
        }
    }
}

/// Find where `values` reaches `level`
///
/// A sample equal to the level counts as a crossing at that sample; a
/// strict sign change between two samples counts once, interpolated.
fn level_crossings(values: &[f64], omega: &[f64], level: f64) -> Vec<Crossing> {
    let mut out = Vec::new();
    for i in 0..values.len() {
        let d0 = values[i] - level;
        if d0 == 0.0 {
            out.push(Crossing {
                index: i,
                frac: 0.0,
                omega: omega[i],
            });
            continue;
        }
        if let Some(&v1) = values.get(i + 1) {
            let d1 = v1 - level;
            if d0 * d1 < 0.0 {
                let frac = d0 / (d0 - d1);
                out.push(Crossing {
                    index: i,
                    frac,
                    omega: omega[i] + frac * (omega[i + 1] - omega[i]),
                });
            }
        }
    }
    out
}

/// Frequency-domain margin analyzer
#[derive(Debug, Clone, Copy, Default)]
pub struct MarginAnalyzer {
    pub config: NumericConfig,
}

impl MarginAnalyzer {
    pub fn new(config: NumericConfig) -> Self {
        Self { config }
    }

    /// Worst-case margins of a SISO model
    ///
    /// Parametric models are sampled on [`MarginAnalyzer::frequency_grid`];
    /// frequency response data is used as sampled.
    pub fn stability_margins(&self, sys: &Lti) -> Result<MarginResult> {
        Ok(self.all_margins(sys)?.worst_case())
    }

    /// Every gain and phase crossover of a SISO model
    pub fn all_margins(&self, sys: &Lti) -> Result<AllMargins> {
        require_siso(sys, "margin")?;
        let (mag, phase, omega) = self.sample(sys)?;
        self.all_margins_from_arrays(&mag, &phase, &omega)
    }

    /// Worst-case margins from magnitude, phase (degrees) and frequency arrays
    pub fn margins_from_arrays(
        &self,
        mag: &[f64],
        phase_deg: &[f64],
        omega: &[f64],
    ) -> Result<MarginResult> {
        Ok(self.all_margins_from_arrays(mag, phase_deg, omega)?.worst_case())
    }

    /// Every crossover in magnitude, phase (degrees) and frequency arrays
    pub fn all_margins_from_arrays(
        &self,
        mag: &[f64],
        phase_deg: &[f64],
        omega: &[f64],
    ) -> Result<AllMargins> {
        if mag.len() != phase_deg.len() || mag.len() != omega.len() {
            return Err(ControlError::InvalidArgument(format!(
                "magnitude, phase and frequency arrays differ in length ({}, {}, {})",
                mag.len(),
                phase_deg.len(),
                omega.len()
            )));
        }
        if omega.len() < 2 {
            warn!(
                "margin search needs at least two samples, got {}",
                omega.len()
            );
            return Ok(AllMargins::default());
        }

        let phase = unwrap_deg(phase_deg);
        let mut all = AllMargins::default();

        // phase crossovers at -180 + 360k for every k inside the phase range
        let (lo, hi) = phase
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &p| {
                (lo.min(p), hi.max(p))
            });
        let mut phase_crossings = Vec::new();
        if lo.is_finite() && hi.is_finite() {
            let k_lo = ((lo + 180.0) / 360.0).ceil() as i64;
            let k_hi = ((hi + 180.0) / 360.0).floor() as i64;
            for k in k_lo..=k_hi {
                let level = -180.0 + 360.0 * k as f64;
                phase_crossings.extend(level_crossings(&phase, omega, level));
            }
        }
        phase_crossings.sort_by(|a, b| a.omega.total_cmp(&b.omega));
        for c in &phase_crossings {
            let m = c.interpolate(mag);
            trace!("phase crossover at w = {:.6} (|L| = {:.6})", c.omega, m);
            all.gain_margins.push(1.0 / m);
            all.phase_crossover_freqs.push(c.omega);
        }

        for c in level_crossings(mag, omega, 1.0) {
            let p = c.interpolate(&phase);
            trace!("gain crossover at w = {:.6} (phase = {:.3} deg)", c.omega, p);
            all.phase_margins.push(wrap_deg(180.0 + p));
            all.gain_crossover_freqs.push(c.omega);
        }

        Ok(all)
    }

    /// Log-spaced grid covering the features of a model
    ///
    /// Features are the non-zero pole and zero frequencies plus the
    /// frequencies where the low- and high-frequency asymptotes of |L| reach
    /// unity, so crossovers set by the loop gain fall inside the grid. The
    /// grid spans the smallest and largest feature with
    /// `grid_periphery_decades` on each side. Discrete models map their
    /// roots through s = ln(z)/T and always end at the Nyquist frequency.
    pub fn frequency_grid(&self, sys: &Lti) -> Result<FrequencyGrid> {
        let zpk = Converter::new(self.config).to_zpk(sys)?;
        let timebase = sys.timebase();

        let features: Vec<f64> = zpk
            .zeros()
            .iter()
            .chain(zpk.poles())
            .filter_map(|r| feature_frequency(*r, timebase))
            .chain(self.asymptotic_crossovers(&zpk))
            .filter(|w| *w > self.config.real_tol && w.is_finite())
            .collect();

        let periphery = 10f64.powf(self.config.grid_periphery_decades);
        let (mut lo, mut hi) = if features.is_empty() {
            (
                self.config.grid_center / periphery,
                self.config.grid_center * periphery,
            )
        } else {
            let (min, max) = features
                .iter()
                .fold((f64::INFINITY, 0.0_f64), |(lo, hi), &w| (lo.min(w), hi.max(w)));
            (min / periphery, max * periphery)
        };

        if let Timebase::Discrete(dt) = timebase {
            hi = std::f64::consts::PI / dt;
            if lo >= hi {
                lo = hi / (periphery * periphery);
            }
        }
        trace!("margin grid [{:e}, {:e}] rad/s from {} features", lo, hi, features.len());

        FrequencyGrid::logspace(lo.log10(), hi.log10(), self.config.grid_points)
    }

    /// Frequencies where the asymptotes of |L| cross unity
    ///
    /// As ω -> 0, |L| ~ c ω^e where e counts zeros minus poles at s = 0
    /// (z = 1 for discrete models, where z - 1 ~ jωT). As ω -> ∞ a
    /// continuous model behaves like |k| ω^(nz - np). Flat asymptotes
    /// contribute nothing.
    fn asymptotic_crossovers(&self, zpk: &Zpk) -> Vec<f64> {
        let gain = zpk.gain().abs();
        if gain == 0.0 {
            return Vec::new();
        }
        let (anchor, dt) = match zpk.timebase() {
            Timebase::Continuous => (Complex64::new(0.0, 0.0), None),
            Timebase::Discrete(dt) => (Complex64::new(1.0, 0.0), Some(dt)),
        };
        let at_anchor = |r: &Complex64| (*r - anchor).norm() <= self.config.real_tol;

        let mut c_low = gain;
        let mut e_low = 0_i32;
        for z in zpk.zeros() {
            if at_anchor(z) {
                e_low += 1;
            } else {
                c_low *= (anchor - *z).norm();
            }
        }
        for p in zpk.poles() {
            if at_anchor(p) {
                e_low -= 1;
            } else {
                c_low /= (anchor - *p).norm();
            }
        }
        if let Some(dt) = dt {
            c_low *= dt.powi(e_low);
        }

        let mut out = Vec::with_capacity(2);
        if e_low != 0 {
            out.push(c_low.powf(-1.0 / e_low as f64));
        }
        if dt.is_none() {
            let e_high = zpk.zeros().len() as i32 - zpk.poles().len() as i32;
            if e_high != 0 {
                out.push(gain.powf(-1.0 / e_high as f64));
            }
        }
        out
    }

    /// Magnitude, phase (degrees) and frequency samples of a SISO model
    fn sample(&self, sys: &Lti) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>)> {
        if let Lti::Frd(frd) = sys {
            return Ok((frd.magnitude(0, 0), frd.phase_deg(0, 0), frd.omega().to_vec()));
        }

        let grid = self.frequency_grid(sys)?;
        let n = grid.npoints();
        let mut mag = Vec::with_capacity(n);
        let mut phase = Vec::with_capacity(n);
        let mut omega = Vec::with_capacity(n);
        for &w in grid.w() {
            let h: Complex64 = match sys.freq_eval(w) {
                Ok(h) => h[[0, 0]],
                // a grid point exactly on a pole carries no usable sample
                Err(ControlError::SingularConversion(_)) => {
                    trace!("skipping grid point w = {} on a pole", w);
                    continue;
                }
                Err(e) => return Err(e),
            };
            mag.push(complex_2_magnitude(h));
            phase.push(complex_2_degree(h));
            omega.push(w);
        }
        Ok((mag, phase, omega))
    }
}

/// Natural frequency of a root, mapping discrete roots through s = ln(z)/T
fn feature_frequency(r: Complex64, timebase: Timebase) -> Option<f64> {
    match timebase {
        Timebase::Continuous => Some(r.norm()),
        Timebase::Discrete(dt) => {
            if r.norm() == 0.0 {
                None
            } else {
                Some((r.ln() / dt).norm())
            }
        }
    }
}

/// Worst-case margins of a SISO model with the default configuration
pub fn stability_margins(sys: &Lti) -> Result<MarginResult> {
    MarginAnalyzer::default().stability_margins(sys)
}

/// Worst-case margins from magnitude, phase (degrees) and frequency arrays
pub fn margins_from_arrays(mag: &[f64], phase_deg: &[f64], omega: &[f64]) -> Result<MarginResult> {
    MarginAnalyzer::default().margins_from_arrays(mag, phase_deg, omega)
}

/// Every crossover of a SISO model with the default configuration
pub fn all_margins(sys: &Lti) -> Result<AllMargins> {
    MarginAnalyzer::default().all_margins(sys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lti::TransferFunction;
    use approx::assert_relative_eq;

    #[test]
    fn test_level_crossings_interpolated() {
        let omega = [1.0, 2.0, 3.0];
        let values = [0.0, 2.0, 0.0];
        let c = level_crossings(&values, &omega, 1.0);
        assert_eq!(c.len(), 2);
        assert_relative_eq!(c[0].omega, 1.5);
        assert_relative_eq!(c[1].omega, 2.5);
    }

    #[test]
    fn test_level_crossing_exact_sample_counted_once() {
        let omega = [1.0, 2.0, 3.0];
        let values = [2.0, 1.0, 0.0];
        let c = level_crossings(&values, &omega, 1.0);
        assert_eq!(c.len(), 1);
        assert_relative_eq!(c[0].omega, 2.0);
    }

    #[test]
    fn test_lowest_margin_wins() {
        let omega = [1.0, 2.0, 3.0, 4.0];
        let phase = [-170.0, -190.0, -190.0, -170.0];
        let mag = [0.2, 0.2, 0.5, 0.5];
        let r = margins_from_arrays(&mag, &phase, &omega).unwrap();
        assert_relative_eq!(r.gain_margin, 2.0, epsilon = 1e-12);
        assert_relative_eq!(r.phase_crossover_freq, 3.5, epsilon = 1e-12);
        assert!(r.phase_margin.is_infinite());
        assert!(r.gain_crossover_freq.is_nan());
    }

    #[test]
    fn test_equal_margins_take_lower_frequency() {
        let omega = [1.0, 2.0, 3.0, 4.0];
        let phase = [-170.0, -190.0, -190.0, -170.0];
        let mag = [0.5, 0.5, 0.5, 0.5];
        let r = margins_from_arrays(&mag, &phase, &omega).unwrap();
        assert_relative_eq!(r.gain_margin, 2.0, epsilon = 1e-12);
        assert_relative_eq!(r.phase_crossover_freq, 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_wrapped_phase_is_unwrapped() {
        // -170, then -190 reported wrapped as +170
        let omega = [1.0, 2.0];
        let phase = [-170.0, 170.0];
        let mag = [0.25, 0.25];
        let r = margins_from_arrays(&mag, &phase, &omega).unwrap();
        assert_relative_eq!(r.gain_margin, 4.0, epsilon = 1e-12);
        assert_relative_eq!(r.phase_crossover_freq, 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_mismatched_lengths() {
        let r = margins_from_arrays(&[1.0, 2.0], &[0.0], &[1.0, 2.0]);
        assert!(matches!(r, Err(ControlError::InvalidArgument(_))));
    }

    #[test]
    fn test_no_crossover() {
        let r = margins_from_arrays(&[0.5, 0.4], &[-10.0, -20.0], &[1.0, 2.0]).unwrap();
        assert_eq!(r.gain_margin, f64::INFINITY);
        assert_eq!(r.phase_margin, f64::INFINITY);
        assert!(r.gain_crossover_freq.is_nan());
        assert!(r.phase_crossover_freq.is_nan());
    }

    #[test]
    fn test_grid_spans_features() {
        let tf = TransferFunction::siso(vec![1.0], vec![1.0, 11.0, 10.0], Timebase::Continuous)
            .unwrap();
        let grid = MarginAnalyzer::default().frequency_grid(&tf.into()).unwrap();
        assert_relative_eq!(grid.start(), 0.01, max_relative = 1e-9);
        assert_relative_eq!(grid.stop(), 1000.0, max_relative = 1e-9);
        assert_eq!(grid.npoints(), 2000);
    }

    #[test]
    fn test_grid_reaches_gain_crossover() {
        // 1e5 / (s (s + 1)): high-frequency asymptote 1e5 / w^2 hits 1 at 316
        let tf = TransferFunction::siso(vec![1e5], vec![1.0, 1.0, 0.0], Timebase::Continuous)
            .unwrap();
        let grid = MarginAnalyzer::default().frequency_grid(&tf.into()).unwrap();
        assert!(grid.start() <= 0.01 * (1.0 + 1e-9));
        // low-frequency asymptote 1e5 / w hits 1 at 1e5
        assert_relative_eq!(grid.stop(), 1e7, max_relative = 1e-9);
    }

    #[test]
    fn test_grid_for_pure_integrator_follows_gain() {
        let tf = TransferFunction::siso(vec![1e-4], vec![1.0, 0.0], Timebase::Continuous).unwrap();
        let grid = MarginAnalyzer::default().frequency_grid(&tf.into()).unwrap();
        assert_relative_eq!(grid.start(), 1e-6, max_relative = 1e-9);
        assert_relative_eq!(grid.stop(), 1e-2, max_relative = 1e-9);
    }

    #[test]
    fn test_grid_capped_at_nyquist() {
        let tf = TransferFunction::siso(vec![1.0], vec![1.0, -0.5], Timebase::Discrete(0.1))
            .unwrap();
        let grid = MarginAnalyzer::default().frequency_grid(&tf.into()).unwrap();
        assert_relative_eq!(grid.stop(), std::f64::consts::PI / 0.1, max_relative = 1e-9);
    }

    #[test]
    fn test_margins_mimo_rejected() {
        let tf = TransferFunction::new(
            vec![vec![vec![1.0], vec![1.0]]],
            vec![vec![vec![1.0, 1.0], vec![1.0, 2.0]]],
            Timebase::Continuous,
        )
        .unwrap();
        assert!(matches!(
            stability_margins(&tf.into()),
            Err(ControlError::UnsupportedShape { .. })
        ));
    }
}
