//! Plain-text rendering of analysis results
//!
//! Rendering only reads the values it is given; nothing here feeds back
//! into a computation.

use std::fmt;

use crate::constants::REAL_TOL;
use crate::margins::MarginResult;
use crate::metrics::Damping;

/// Table header for pole/damping/frequency listings
pub const DAMPING_HEADER: &str = "_____Eigenvalue______ Damping___ Frequency_";

/// Pole, damping and natural frequency listing, one line per pole
///
/// ```
/// use ltikit_core::lti::{Timebase, TransferFunction};
/// use ltikit_core::metrics::damp;
/// use ltikit_core::report::DampingTable;
///
/// let tf = TransferFunction::siso(vec![1.0], vec![1.0, 2.0], Timebase::Continuous).unwrap();
/// let d = damp(&tf.into()).unwrap();
/// let text = DampingTable::new(&d).to_string();
/// assert!(text.lines().nth(1).unwrap().trim_start().starts_with("-2"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DampingTable<'a> {
    damping: &'a Damping,
}

impl<'a> DampingTable<'a> {
    pub fn new(damping: &'a Damping) -> Self {
        Self { damping }
    }
}

impl fmt::Display for DampingTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", DAMPING_HEADER)?;
        let d = self.damping;
        for ((p, zeta), wn) in d.poles.iter().zip(&d.zeta).zip(&d.wn) {
            if p.im.abs() < REAL_TOL {
                writeln!(
                    f,
                    "{:>10}            {:>10} {:>10}",
                    format_g(p.re, 4, false),
                    format_g(*zeta, 4, false),
                    format_g(*wn, 4, false)
                )?;
            } else {
                writeln!(
                    f,
                    "{:>10}{:>10}j {:>10} {:>10}",
                    format_g(p.re, 4, false),
                    format_g(p.im, 4, true),
                    format_g(*zeta, 4, false),
                    format_g(*wn, 4, false)
                )?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for MarginResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Gm = {} dB (at {} rad/s), Pm = {} deg (at {} rad/s)",
            format_g(self.gain_margin_db(), 4, false),
            format_g(self.phase_crossover_freq, 4, false),
            format_g(self.phase_margin, 4, false),
            format_g(self.gain_crossover_freq, 4, false)
        )
    }
}

/// Format a number like C's `%.{precision}g`, optionally with a forced sign
///
/// Uses fixed notation when the decimal exponent lies in
/// `[-4, precision)` and scientific notation otherwise; trailing zeros are
/// removed in both cases.
pub fn format_g(value: f64, precision: usize, force_sign: bool) -> String {
    let body = if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "inf" } else { "-inf" }.to_string()
    } else if value == 0.0 {
        if value.is_sign_negative() { "-0" } else { "0" }.to_string()
    } else {
        let p = precision.max(1);
        let sci = format!("{:.*e}", p - 1, value);
        let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
        let exp: i32 = exp.parse().unwrap_or(0);
        if exp < -4 || exp >= p as i32 {
            format!(
                "{}e{}{:02}",
                strip_trailing_zeros(mantissa),
                if exp < 0 { '-' } else { '+' },
                exp.abs()
            )
        } else {
            let decimals = (p as i32 - 1 - exp).max(0) as usize;
            strip_trailing_zeros(&format!("{:.*}", decimals, value)).to_string()
        }
    };

    if force_sign && !body.starts_with('-') {
        format!("+{}", body)
    } else {
        body
    }
}

fn strip_trailing_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn test_format_g_fixed() {
        assert_eq!(format_g(0.4472136, 4, false), "0.4472");
        assert_eq!(format_g(2.0, 4, false), "2");
        assert_eq!(format_g(-2.5, 4, false), "-2.5");
        assert_eq!(format_g(2.0, 4, true), "+2");
        assert_eq!(format_g(1234.4, 4, false), "1234");
    }

    #[test]
    fn test_format_g_scientific() {
        assert_eq!(format_g(123456.0, 4, false), "1.235e+05");
        assert_eq!(format_g(0.00001, 4, false), "1e-05");
        assert_eq!(format_g(-3.0e7, 4, true), "-3e+07");
    }

    #[test]
    fn test_format_g_special() {
        assert_eq!(format_g(0.0, 4, false), "0");
        assert_eq!(format_g(f64::INFINITY, 4, false), "inf");
        assert_eq!(format_g(f64::NAN, 4, false), "nan");
    }

    #[test]
    fn test_margin_result_display_in_db() {
        let r = MarginResult {
            gain_margin: 2.0,
            phase_margin: 45.0,
            gain_crossover_freq: 0.5,
            phase_crossover_freq: 1.0,
        };
        assert_eq!(
            r.to_string(),
            "Gm = 6.021 dB (at 1 rad/s), Pm = 45 deg (at 0.5 rad/s)"
        );
        assert_eq!(
            MarginResult::undefined().to_string(),
            "Gm = inf dB (at nan rad/s), Pm = inf deg (at nan rad/s)"
        );
    }

    #[test]
    fn test_damping_table_layout() {
        let d = Damping {
            wn: vec![2.0, 2.236],
            zeta: vec![1.0, 0.4472],
            poles: vec![Complex64::new(-2.0, 0.0), Complex64::new(-1.0, 2.0)],
        };
        let text = DampingTable::new(&d).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], DAMPING_HEADER);
        assert_eq!(lines[1], "        -2                     1          2");
        assert_eq!(lines[2], "        -1        +2j     0.4472      2.236");
    }
}
