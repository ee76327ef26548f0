//! Block-diagram operations on transfer functions
//!
//! Provides series, parallel, negation and feedback interconnections.
//! Results are not reduced: common factors are kept.

use std::ops::{Add, Mul, Neg, Sub};

use super::transfer_function::TransferFunction;
use super::{require_siso, LtiSystem, Timebase};
use crate::error::{ControlError, Result};
use crate::math::polynomial;

impl TransferFunction {
    /// Parallel connection (self + other), element-wise for MIMO models
    pub fn parallel(&self, other: &TransferFunction) -> Result<TransferFunction> {
        let timebase = Timebase::common(self.timebase(), other.timebase())?;
        if (self.noutputs(), self.ninputs()) != (other.noutputs(), other.ninputs()) {
            return Err(ControlError::IncompatibleShape(format!(
                "cannot add a {}x{} system to a {}x{} system",
                other.noutputs(),
                other.ninputs(),
                self.noutputs(),
                self.ninputs()
            )));
        }

        let mut num = Vec::with_capacity(self.noutputs());
        let mut den = Vec::with_capacity(self.noutputs());
        for i in 0..self.noutputs() {
            let mut num_row = Vec::with_capacity(self.ninputs());
            let mut den_row = Vec::with_capacity(self.ninputs());
            for j in 0..self.ninputs() {
                let (n1, d1) = (self.num(i, j), self.den(i, j));
                let (n2, d2) = (other.num(i, j), other.den(i, j));
                if d1 == d2 {
                    num_row.push(polynomial::add(n1, n2));
                    den_row.push(d1.to_vec());
                } else {
                    num_row.push(polynomial::add(
                        &polynomial::mul(n1, d2),
                        &polynomial::mul(n2, d1),
                    ));
                    den_row.push(polynomial::mul(d1, d2));
                }
            }
            num.push(num_row);
            den.push(den_row);
        }

        TransferFunction::new(num, den, timebase)
    }

    /// Series connection (other after self), SISO only
    pub fn series(&self, other: &TransferFunction) -> Result<TransferFunction> {
        require_siso(self, "series")?;
        require_siso(other, "series")?;
        let timebase = Timebase::common(self.timebase(), other.timebase())?;

        TransferFunction::siso(
            polynomial::mul(self.num(0, 0), other.num(0, 0)),
            polynomial::mul(self.den(0, 0), other.den(0, 0)),
            timebase,
        )
    }

    /// Negated system
    pub fn negate(&self) -> TransferFunction {
        let num = self
            .num
            .iter()
            .map(|row| row.iter().map(|n| polynomial::scale(n, -1.0)).collect())
            .collect();
        TransferFunction {
            num,
            den: self.den.clone(),
            timebase: self.timebase,
        }
    }

    /// Feedback interconnection, SISO only
    ///
    /// Returns self / (1 - sign * self * other); `sign = -1.0` is the usual
    /// negative feedback.
    pub fn feedback(&self, other: &TransferFunction, sign: f64) -> Result<TransferFunction> {
        require_siso(self, "feedback")?;
        require_siso(other, "feedback")?;
        let timebase = Timebase::common(self.timebase(), other.timebase())?;

        let (n1, d1) = (self.num(0, 0), self.den(0, 0));
        let (n2, d2) = (other.num(0, 0), other.den(0, 0));

        let num = polynomial::mul(n1, d2);
        let den = polynomial::add(
            &polynomial::mul(d1, d2),
            &polynomial::scale(&polynomial::mul(n1, n2), -sign),
        );
        if polynomial::is_zero(&den) {
            return Err(ControlError::SingularConversion(
                "closed loop denominator is identically zero".to_string(),
            ));
        }

        TransferFunction::siso(num, den, timebase)
    }
}

impl Add for &TransferFunction {
    type Output = Result<TransferFunction>;

    fn add(self, rhs: &TransferFunction) -> Self::Output {
        self.parallel(rhs)
    }
}

impl Sub for &TransferFunction {
    type Output = Result<TransferFunction>;

    fn sub(self, rhs: &TransferFunction) -> Self::Output {
        self.parallel(&rhs.negate())
    }
}

impl Mul for &TransferFunction {
    type Output = Result<TransferFunction>;

    fn mul(self, rhs: &TransferFunction) -> Self::Output {
        self.series(rhs)
    }
}

impl Neg for &TransferFunction {
    type Output = TransferFunction;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}
