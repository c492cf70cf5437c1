use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::dimension::{DimensionOp, DimensionVector};
use crate::error::{Error, ParseError, Result};
use crate::locale::{Locale, NumberFormat};
use crate::registry::QuantityRegistry;
use crate::scan::{LenientNumberScanner, NumberScanner};
use crate::unit::Unit;

/// A numeric value expressed in a display unit.
///
/// The physical quantity is the base value (`unit.to_base(value)`); changing
/// the display unit re-expresses it without changing it.
#[derive(Clone)]
pub struct QuantityValue {
    value: f64,
    unit: Arc<Unit>,
    registry: Arc<QuantityRegistry>,
}

impl QuantityValue {
    pub fn new(value: f64, unit: &Arc<Unit>) -> Result<Self> {
        Ok(Self {
            value,
            registry: unit.registry()?,
            unit: unit.clone(),
        })
    }

    /// A value in the registry's standard unit.
    pub fn in_standard_unit(value: f64, registry: &Arc<QuantityRegistry>) -> Result<Self> {
        let unit = registry
            .standard_unit()
            .ok_or_else(|| Error::UnknownDimension(registry.name().to_string()))?;
        Ok(Self {
            value,
            unit,
            registry: registry.clone(),
        })
    }

    /// Express a base value in `unit`.
    pub fn from_base(base: f64, unit: &Arc<Unit>) -> Result<Self> {
        Self::new(unit.from_base(base), unit)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> &Arc<Unit> {
        &self.unit
    }

    pub fn registry(&self) -> &Arc<QuantityRegistry> {
        &self.registry
    }

    pub fn dimension(&self) -> DimensionVector {
        self.registry.dimension()
    }

    pub fn to_base(&self) -> f64 {
        self.unit.to_base(self.value)
    }

    /// Re-express this value in `unit` without checking that `unit` measures
    /// the same dimension; see [`QuantityValue::convert_to`] for the checked
    /// variant.
    pub fn with_display_unit(&self, unit: &Arc<Unit>) -> QuantityValue {
        QuantityValue {
            value: unit.from_base(self.to_base()),
            registry: unit.registry().unwrap_or_else(|_| self.registry.clone()),
            unit: unit.clone(),
        }
    }

    pub fn convert_to(&self, unit: &Arc<Unit>) -> Result<QuantityValue> {
        let target = unit.registry()?;
        self.check_same_dimension(target.dimension())?;
        Ok(self.with_display_unit(unit))
    }

    /// Convert to the unit spelled `abbreviation` in this value's registry.
    pub fn convert_to_abbreviation(
        &self,
        abbreviation: &str,
        locale: &Locale,
    ) -> Result<QuantityValue> {
        let unit = self
            .registry
            .resolve_with_locale(abbreviation.trim(), locale)
            .ok_or_else(|| ParseError::UnknownUnit {
                unit: abbreviation.to_string(),
                text: abbreviation.to_string(),
                locale: locale.clone(),
            })?;
        Ok(self.with_display_unit(&unit))
    }

    pub fn to_standard(&self) -> Result<QuantityValue> {
        let standard = self
            .registry
            .standard_unit()
            .ok_or_else(|| Error::UnknownDimension(self.registry.name().to_string()))?;
        Ok(self.with_display_unit(&standard))
    }

    /// Sum in this value's unit; `other` is first converted to it.
    pub fn add(&self, other: &QuantityValue) -> Result<QuantityValue> {
        self.check_same_dimension(other.dimension())?;
        Ok(self.with_value(self.value + self.unit.from_base(other.to_base())))
    }

    pub fn sub(&self, other: &QuantityValue) -> Result<QuantityValue> {
        self.check_same_dimension(other.dimension())?;
        Ok(self.with_value(self.value - self.unit.from_base(other.to_base())))
    }

    pub fn scale(&self, factor: f64) -> QuantityValue {
        self.with_value(self.value * factor)
    }

    pub fn compare(&self, other: &QuantityValue) -> Result<Option<Ordering>> {
        self.check_same_dimension(other.dimension())?;
        Ok(self.to_base().partial_cmp(&other.to_base()))
    }

    pub fn product_dimension(&self, other: &QuantityValue) -> DimensionVector {
        self.dimension()
            .combine(&other.dimension(), DimensionOp::Multiply)
    }

    pub fn quotient_dimension(&self, other: &QuantityValue) -> DimensionVector {
        self.dimension().combine(&other.dimension(), DimensionOp::Divide)
    }

    /// Multiply base values into a quantity of `target`, which must measure
    /// the product dimension. The result is in the target's standard unit.
    pub fn multiply_into(
        &self,
        other: &QuantityValue,
        target: &Arc<QuantityRegistry>,
    ) -> Result<QuantityValue> {
        self.combine_into(other, target, DimensionOp::Multiply)
    }

    pub fn divide_into(
        &self,
        other: &QuantityValue,
        target: &Arc<QuantityRegistry>,
    ) -> Result<QuantityValue> {
        self.combine_into(other, target, DimensionOp::Divide)
    }

    fn combine_into(
        &self,
        other: &QuantityValue,
        target: &Arc<QuantityRegistry>,
        op: DimensionOp,
    ) -> Result<QuantityValue> {
        let expected = self.dimension().combine(&other.dimension(), op);
        if expected != target.dimension() {
            return Err(Error::IncompatibleDimensions {
                from: expected.to_canonical_string(),
                to: target.dimension().to_canonical_string(),
            });
        }
        let base = match op {
            DimensionOp::Multiply => self.to_base() * other.to_base(),
            DimensionOp::Divide => self.to_base() / other.to_base(),
        };
        QuantityValue::in_standard_unit(base, target)
    }

    /// Parse `"12.5 km/h"` using the lenient number scanner.
    pub fn parse(
        text: &str,
        registry: &Arc<QuantityRegistry>,
        locale: &Locale,
    ) -> Result<QuantityValue, ParseError> {
        Self::parse_with(text, registry, locale, &LenientNumberScanner)
    }

    /// Parse with a caller-supplied number scanner. The text after the number
    /// is trimmed and resolved as a unit abbreviation of `registry`.
    pub fn parse_with(
        text: &str,
        registry: &Arc<QuantityRegistry>,
        locale: &Locale,
        scanner: &dyn NumberScanner,
    ) -> Result<QuantityValue, ParseError> {
        if text.trim().is_empty() {
            return Err(ParseError::Empty);
        }

        let scanned = scanner
            .scan(text, locale)
            .map_err(|source| ParseError::Malformed {
                text: text.to_string(),
                locale: locale.clone(),
                source,
            })?;

        let remainder = text.get(scanned.end..).unwrap_or_default().trim();
        let unit = registry
            .resolve_with_locale(remainder, locale)
            .ok_or_else(|| ParseError::UnknownUnit {
                unit: remainder.to_string(),
                text: text.to_string(),
                locale: locale.clone(),
            })?;

        tracing::trace!(
            text,
            dimension = registry.name(),
            unit = unit.id(),
            "Parsed quantity"
        );
        Ok(QuantityValue {
            value: scanned.value,
            unit,
            registry: registry.clone(),
        })
    }

    /// Render with the locale's separators and localized display
    /// abbreviation. The output parses back to the same value in `locale`.
    pub fn format(&self, locale: &Locale) -> String {
        let number = format_number(self.value, &locale.number_format());
        let abbreviation = self.registry.display_abbreviation(&self.unit, locale);
        if abbreviation.is_empty() {
            number
        } else {
            format!("{number} {abbreviation}")
        }
    }

    fn with_value(&self, value: f64) -> QuantityValue {
        QuantityValue {
            value,
            unit: self.unit.clone(),
            registry: self.registry.clone(),
        }
    }

    fn check_same_dimension(&self, other: DimensionVector) -> Result<()> {
        if self.dimension() != other {
            return Err(Error::IncompatibleDimensions {
                from: self.dimension().to_canonical_string(),
                to: other.to_canonical_string(),
            });
        }
        Ok(())
    }
}

/// Digits grouped by three, locale decimal separator, no exponent.
pub fn format_number(value: f64, format: &NumberFormat) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞" } else { "-∞" }.to_string();
    }

    let digits = value.abs().to_string();
    let (integer, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), ""));

    let mut out = String::new();
    if value < 0.0 {
        out.push('-');
    }
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            out.push(format.group_separator);
        }
        out.push(c);
    }
    if !fraction.is_empty() {
        out.push(format.decimal_separator);
        out.push_str(fraction);
    }
    out
}

impl PartialEq for QuantityValue {
    fn eq(&self, other: &Self) -> bool {
        self.dimension() == other.dimension() && self.to_base() == other.to_base()
    }
}

impl PartialOrd for QuantityValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other).ok().flatten()
    }
}

impl fmt::Display for QuantityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(&Locale::invariant()))
    }
}

impl fmt::Debug for QuantityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuantityValue")
            .field("value", &self.value)
            .field("unit", &self.unit.id())
            .field("dimension", &self.registry.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_and_separators() {
        let en = NumberFormat::INVARIANT;
        assert_eq!(format_number(1234567.25, &en), "1,234,567.25");
        assert_eq!(format_number(-999.0, &en), "-999");
        assert_eq!(format_number(0.001, &en), "0.001");

        let de = Locale::parse("de").unwrap().number_format();
        assert_eq!(format_number(1234.5, &de), "1.234,5");
    }

    #[test]
    fn special_values() {
        let en = NumberFormat::INVARIANT;
        assert_eq!(format_number(f64::NAN, &en), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY, &en), "-∞");
    }
}
