//! SI dimension algebra.
//!
//! A [`DimensionVector`] holds the integer exponents of the nine base
//! dimensions. Vectors are compared exactly and combined by adding or
//! subtracting exponents, which is all that is needed to check that two
//! quantities are compatible or what a product/quotient of them measures.
//!
//! The compact text form concatenates base symbols with optional exponents,
//! and a single `/` switches to the negative part:
//!
//! ```text
//! kgm2/s3A2   ==   kg · m² · s⁻³ · A⁻²   (ohm)
//! ```

use std::fmt;
use std::ops::{Div, Mul};
use std::str::FromStr;

use crate::error::DimensionError;

/// The nine base dimensions, in canonical rendering order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BaseDimension {
    Mass,
    Length,
    Time,
    Current,
    Temperature,
    Amount,
    LuminousIntensity,
    PlaneAngle,
    SolidAngle,
}

impl BaseDimension {
    pub const ALL: [BaseDimension; 9] = [
        BaseDimension::Mass,
        BaseDimension::Length,
        BaseDimension::Time,
        BaseDimension::Current,
        BaseDimension::Temperature,
        BaseDimension::Amount,
        BaseDimension::LuminousIntensity,
        BaseDimension::PlaneAngle,
        BaseDimension::SolidAngle,
    ];

    /// Symbol of the SI base unit used in the compact grammar.
    pub fn symbol(self) -> &'static str {
        match self {
            BaseDimension::Mass => "kg",
            BaseDimension::Length => "m",
            BaseDimension::Time => "s",
            BaseDimension::Current => "A",
            BaseDimension::Temperature => "K",
            BaseDimension::Amount => "mol",
            BaseDimension::LuminousIntensity => "cd",
            BaseDimension::PlaneAngle => "rad",
            BaseDimension::SolidAngle => "sr",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

// Longest symbols first so that `mol` is not read as `m` followed by junk.
const PARSE_ORDER: [BaseDimension; 9] = [
    BaseDimension::Amount,
    BaseDimension::PlaneAngle,
    BaseDimension::Mass,
    BaseDimension::LuminousIntensity,
    BaseDimension::SolidAngle,
    BaseDimension::Length,
    BaseDimension::Time,
    BaseDimension::Current,
    BaseDimension::Temperature,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DimensionOp {
    Multiply,
    Divide,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DimensionVector(pub [i8; 9]);

impl DimensionVector {
    pub const ZERO: DimensionVector = DimensionVector([0; 9]);

    pub const MASS: DimensionVector = DimensionVector([1, 0, 0, 0, 0, 0, 0, 0, 0]);
    pub const LENGTH: DimensionVector = DimensionVector([0, 1, 0, 0, 0, 0, 0, 0, 0]);
    pub const TIME: DimensionVector = DimensionVector([0, 0, 1, 0, 0, 0, 0, 0, 0]);
    pub const CURRENT: DimensionVector = DimensionVector([0, 0, 0, 1, 0, 0, 0, 0, 0]);
    pub const TEMPERATURE: DimensionVector = DimensionVector([0, 0, 0, 0, 1, 0, 0, 0, 0]);
    pub const AMOUNT: DimensionVector = DimensionVector([0, 0, 0, 0, 0, 1, 0, 0, 0]);
    pub const LUMINOUS_INTENSITY: DimensionVector = DimensionVector([0, 0, 0, 0, 0, 0, 1, 0, 0]);
    pub const PLANE_ANGLE: DimensionVector = DimensionVector([0, 0, 0, 0, 0, 0, 0, 1, 0]);
    pub const SOLID_ANGLE: DimensionVector = DimensionVector([0, 0, 0, 0, 0, 0, 0, 0, 1]);

    pub fn exponent(&self, base: BaseDimension) -> i8 {
        self.0[base.index()]
    }

    pub fn with_exponent(mut self, base: BaseDimension, exp: i8) -> Self {
        self.0[base.index()] = exp;
        self
    }

    pub fn is_dimensionless(&self) -> bool {
        *self == Self::ZERO
    }

    /// Combine exponents component-wise: added for [`DimensionOp::Multiply`],
    /// subtracted for [`DimensionOp::Divide`]. Exponents saturate at the
    /// `i8` bounds.
    pub fn combine(&self, other: &DimensionVector, op: DimensionOp) -> DimensionVector {
        let mut out = [0i8; 9];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = match op {
                DimensionOp::Multiply => self.0[i].saturating_add(other.0[i]),
                DimensionOp::Divide => self.0[i].saturating_sub(other.0[i]),
            };
        }
        DimensionVector(out)
    }

    pub fn powi(&self, n: i8) -> DimensionVector {
        let mut out = [0i8; 9];
        for (slot, exp) in out.iter_mut().zip(self.0) {
            *slot = exp.saturating_mul(n);
        }
        DimensionVector(out)
    }

    pub fn recip(&self) -> DimensionVector {
        Self::ZERO.combine(self, DimensionOp::Divide)
    }

    pub fn parse(text: &str) -> Result<DimensionVector, DimensionError> {
        Parser::new(text).parse()
    }

    /// Render in base order (kg, m, s, A, K, mol, cd, rad, sr): positive
    /// terms first, then a single `/` and the negative terms. The
    /// dimensionless vector renders as `1`, a purely negative one as `1/…`.
    pub fn to_canonical_string(&self) -> String {
        let mut numerator = String::new();
        let mut denominator = String::new();
        for base in BaseDimension::ALL {
            let exp = self.exponent(base);
            let out = match exp.signum() {
                1 => &mut numerator,
                -1 => &mut denominator,
                _ => continue,
            };
            out.push_str(base.symbol());
            let magnitude = exp.unsigned_abs();
            if magnitude != 1 {
                out.push_str(&magnitude.to_string());
            }
        }

        match (numerator.is_empty(), denominator.is_empty()) {
            (true, true) => "1".to_string(),
            (false, true) => numerator,
            (true, false) => format!("1/{denominator}"),
            (false, false) => format!("{numerator}/{denominator}"),
        }
    }
}

impl fmt::Display for DimensionVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl FromStr for DimensionVector {
    type Err = DimensionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DimensionVector::parse(s)
    }
}

impl Mul for DimensionVector {
    type Output = DimensionVector;

    fn mul(self, rhs: DimensionVector) -> DimensionVector {
        self.combine(&rhs, DimensionOp::Multiply)
    }
}

impl Div for DimensionVector {
    type Output = DimensionVector;

    fn div(self, rhs: DimensionVector) -> DimensionVector {
        self.combine(&rhs, DimensionOp::Divide)
    }
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn err(&self, message: &'static str) -> DimensionError {
        DimensionError::Malformed {
            text: self.text.to_string(),
            pos: self.pos,
            message,
        }
    }

    fn parse(mut self) -> Result<DimensionVector, DimensionError> {
        if self.bytes.is_empty() {
            return Err(self.err("empty dimension string"));
        }
        if self.text == "1" {
            return Ok(DimensionVector::ZERO);
        }
        // `1/s` is the canonical spelling of a purely negative vector.
        if self.text.starts_with("1/") {
            self.pos = 1;
        }

        let mut exps = [0i8; 9];
        let mut sign: i8 = 1;
        let mut expect_term = true;

        while self.pos < self.bytes.len() {
            if self.bytes[self.pos] == b'/' {
                if sign < 0 {
                    return Err(self.err("only one '/' is allowed"));
                }
                sign = -1;
                self.pos += 1;
                expect_term = true;
                continue;
            }

            let base = self.base_symbol()?;
            let exp = self.exponent()?;
            let current = exps[base.index()];
            exps[base.index()] = exp
                .checked_mul(sign)
                .and_then(|e| current.checked_add(e))
                .ok_or_else(|| self.err("exponent out of range"))?;
            expect_term = false;
        }

        if expect_term {
            return Err(self.err("expected a base unit symbol"));
        }
        Ok(DimensionVector(exps))
    }

    fn base_symbol(&mut self) -> Result<BaseDimension, DimensionError> {
        let rest = &self.text[self.pos..];
        for base in PARSE_ORDER {
            if rest.starts_with(base.symbol()) {
                self.pos += base.symbol().len();
                return Ok(base);
            }
        }
        Err(self.err("unrecognized base unit symbol"))
    }

    fn exponent(&mut self) -> Result<i8, DimensionError> {
        let start = self.pos;
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        if start == self.pos {
            return Ok(1);
        }
        self.text[start..self.pos].parse::<i8>().map_err(|_| {
            self.pos = start;
            self.err("exponent out of range")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ohm() {
        let d = DimensionVector::parse("kgm2/s3A2").unwrap();
        assert_eq!(d.exponent(BaseDimension::Mass), 1);
        assert_eq!(d.exponent(BaseDimension::Length), 2);
        assert_eq!(d.exponent(BaseDimension::Time), -3);
        assert_eq!(d.exponent(BaseDimension::Current), -2);
        assert_eq!(d.to_canonical_string(), "kgm2/s3A2");
    }

    #[test]
    fn longest_symbol_wins() {
        assert_eq!(
            DimensionVector::parse("mol").unwrap(),
            DimensionVector::AMOUNT
        );
        assert_eq!(
            DimensionVector::parse("sr").unwrap(),
            DimensionVector::SOLID_ANGLE
        );
        assert_eq!(
            DimensionVector::parse("ms").unwrap(),
            DimensionVector::LENGTH * DimensionVector::TIME
        );
    }

    #[test]
    fn repeated_terms_accumulate() {
        assert_eq!(
            DimensionVector::parse("mm").unwrap(),
            DimensionVector::LENGTH.powi(2)
        );
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["", "/", "kg/", "x", "m/s/s", "m 2", "M", "m999"] {
            assert!(
                matches!(
                    DimensionVector::parse(bad),
                    Err(DimensionError::Malformed { .. })
                ),
                "expected '{bad}' to be rejected"
            );
        }
    }

    #[test]
    fn canonical_dimensionless_and_inverse() {
        assert_eq!(DimensionVector::ZERO.to_canonical_string(), "1");
        assert_eq!(DimensionVector::TIME.recip().to_canonical_string(), "1/s");
        assert_eq!(
            DimensionVector::parse("1/s").unwrap(),
            DimensionVector::parse("/s").unwrap()
        );
        assert_eq!(DimensionVector::parse("1").unwrap(), DimensionVector::ZERO);
    }
}
