//! Unit conversion functions
//!
//! Provides conversions between magnitude, dB, radians and degrees, and
//! phase unwrapping for frequency response data.

use num_complex::Complex64;
use std::f64::consts::PI;

/// Convert complex number to magnitude
pub fn complex_2_magnitude(z: Complex64) -> f64 {
    z.norm()
}

/// Convert complex number to phase in degrees
pub fn complex_2_degree(z: Complex64) -> f64 {
    radian_2_degree(z.arg())
}

/// Convert magnitude to dB (20*log10(mag))
pub fn mag_2_db(mag: f64) -> f64 {
    20.0 * mag.log10()
}

/// Convert dB to magnitude (10^(dB/20))
pub fn db_2_mag(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Convert radians to degrees
pub fn radian_2_degree(rad: f64) -> f64 {
    rad * 180.0 / PI
}

/// Convert degrees to radians
pub fn degree_2_radian(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Unwrap a phase sequence given in degrees
///
/// Adds multiples of 360 so that consecutive samples never jump by more
/// than 180 degrees.
pub fn unwrap_deg(phase: &[f64]) -> Vec<f64> {
    unwrap_with_period(phase, 360.0)
}

/// Unwrap a phase sequence given in radians
pub fn unwrap_rad(phase: &[f64]) -> Vec<f64> {
    unwrap_with_period(phase, 2.0 * PI)
}

fn unwrap_with_period(phase: &[f64], period: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(phase.len());
    let mut offset = 0.0;

    for (i, &p) in phase.iter().enumerate() {
        if i > 0 {
            let delta = p - phase[i - 1];
            if delta.abs() > period / 2.0 {
                offset -= (delta / period).round() * period;
            }
        }
        out.push(p + offset);
    }
    out
}

/// Wrap an angle in degrees into (-180, 180]
pub fn wrap_deg(deg: f64) -> f64 {
    let wrapped = (deg + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}
