//! Conversion laws between a unit's own representation and the base (SI)
//! representation of its dimension.

use std::f64::consts::FRAC_PI_2;
use std::fmt;
use std::sync::Arc;

use crate::error::UnitError;

/// A custom, non-proportional conversion law.
///
/// Implementations must provide both directions. Where the inverse is not
/// defined for some inputs the conversion returns `NaN` or `±Infinity`
/// rather than failing.
pub trait ScaleFormula: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn to_base(&self, value: f64) -> f64;

    fn from_base(&self, value: f64) -> f64;
}

#[derive(Clone, Debug)]
pub enum Scale {
    /// `base = value`
    Identity,
    /// `base = value * factor`
    Linear { factor: f64 },
    /// `base = value * factor + offset`
    OffsetLinear { factor: f64, offset: f64 },
    NonLinear(Arc<dyn ScaleFormula>),
}

impl Scale {
    /// A proportional scale. A factor of exactly one collapses to
    /// [`Scale::Identity`].
    pub fn linear(factor: f64) -> Result<Scale, UnitError> {
        check_factor(factor)?;
        if factor == 1.0 {
            return Ok(Scale::Identity);
        }
        Ok(Scale::Linear { factor })
    }

    /// An affine scale. A zero offset collapses to [`Scale::linear`].
    pub fn offset_linear(factor: f64, offset: f64) -> Result<Scale, UnitError> {
        check_factor(factor)?;
        if !offset.is_finite() {
            return Err(UnitError::InvalidOffset(offset));
        }
        if offset == 0.0 {
            return Scale::linear(factor);
        }
        Ok(Scale::OffsetLinear { factor, offset })
    }

    pub fn non_linear(formula: impl ScaleFormula + 'static) -> Scale {
        Scale::NonLinear(Arc::new(formula))
    }

    /// Percent grade of a slope against an angle in radians.
    pub fn grade() -> Scale {
        Scale::non_linear(GradeFormula)
    }

    pub fn to_base(&self, value: f64) -> f64 {
        match self {
            Scale::Identity => value,
            Scale::Linear { factor } => value * factor,
            Scale::OffsetLinear { factor, offset } => value * factor + offset,
            Scale::NonLinear(formula) => formula.to_base(value),
        }
    }

    pub fn from_base(&self, value: f64) -> f64 {
        match self {
            Scale::Identity => value,
            Scale::Linear { factor } => value / factor,
            Scale::OffsetLinear { factor, offset } => (value - offset) / factor,
            Scale::NonLinear(formula) => formula.from_base(value),
        }
    }

    /// The proportional factor, if this scale is proportional.
    pub fn linear_factor(&self) -> Option<f64> {
        match self {
            Scale::Identity => Some(1.0),
            Scale::Linear { factor } => Some(*factor),
            Scale::OffsetLinear { .. } | Scale::NonLinear(_) => None,
        }
    }

    pub fn is_linear(&self) -> bool {
        self.linear_factor().is_some()
    }
}

impl PartialEq for Scale {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scale::Identity, Scale::Identity) => true,
            (Scale::Linear { factor: a }, Scale::Linear { factor: b }) => a == b,
            (
                Scale::OffsetLinear {
                    factor: fa,
                    offset: oa,
                },
                Scale::OffsetLinear {
                    factor: fb,
                    offset: ob,
                },
            ) => fa == fb && oa == ob,
            (Scale::NonLinear(a), Scale::NonLinear(b)) => {
                Arc::ptr_eq(a, b) || a.name() == b.name()
            }
            _ => false,
        }
    }
}

fn check_factor(factor: f64) -> Result<(), UnitError> {
    if factor == 0.0 || !factor.is_finite() {
        return Err(UnitError::InvalidFactor(factor));
    }
    Ok(())
}

/// Slope grade in percent: 100 % is a 45° slope, a vertical slope has
/// infinite grade.
///
/// Angles at or beyond ±90° have no finite grade and map to ±Infinity; they
/// are not clamped and not wrapped around.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GradeFormula;

impl ScaleFormula for GradeFormula {
    fn name(&self) -> &str {
        "grade"
    }

    fn to_base(&self, value: f64) -> f64 {
        (value / 100.0).atan()
    }

    fn from_base(&self, value: f64) -> f64 {
        if value.abs() >= FRAC_PI_2 {
            return f64::INFINITY.copysign(value);
        }
        value.tan() * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn unit_factor_is_identity() {
        assert_eq!(Scale::linear(1.0).unwrap(), Scale::Identity);
        assert_eq!(
            Scale::offset_linear(2.0, 0.0).unwrap(),
            Scale::Linear { factor: 2.0 }
        );
    }

    #[test]
    fn rejects_degenerate_factors() {
        assert!(matches!(
            Scale::linear(0.0),
            Err(UnitError::InvalidFactor(_))
        ));
        assert!(Scale::linear(f64::NAN).is_err());
        assert!(Scale::offset_linear(1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn grade_maps_hundred_percent_to_forty_five_degrees() {
        let grade = Scale::grade();
        assert!((grade.to_base(100.0) - FRAC_PI_4).abs() < 1e-12);
        assert!((grade.from_base(FRAC_PI_4) - 100.0).abs() < 1e-9);
        assert!((grade.to_base(f64::INFINITY) - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn grade_diverges_at_the_asymptote() {
        let grade = Scale::grade();
        assert!(grade.from_base(FRAC_PI_2 - 1e-9) > 1e9);
        assert_eq!(grade.from_base(FRAC_PI_2), f64::INFINITY);
        assert_eq!(grade.from_base(-FRAC_PI_2), f64::NEG_INFINITY);
        assert!(grade.from_base(f64::NAN).is_nan());
    }

    #[test]
    fn nan_propagates() {
        let s = Scale::offset_linear(1.8, 32.0).unwrap();
        assert!(s.to_base(f64::NAN).is_nan());
        assert_eq!(s.to_base(f64::INFINITY), f64::INFINITY);
    }
}
