//! Serializable results for the subcommands, rendered as text or JSON.

use std::fmt;

use mensura_units::{DimensionVector, Locale, QuantityValue, Unit};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct QuantityReport {
    pub value: f64,
    pub unit: String,
    pub dimension: String,
    pub base_value: f64,
    pub standard_unit: Option<String>,
    pub formatted: String,
}

impl QuantityReport {
    pub fn new(quantity: &QuantityValue, locale: &Locale) -> Self {
        Self {
            value: quantity.value(),
            unit: quantity.unit().id().to_string(),
            dimension: quantity.registry().name().to_string(),
            base_value: quantity.to_base(),
            standard_unit: quantity
                .registry()
                .standard_unit()
                .map(|u| u.id().to_string()),
            formatted: quantity.format(locale),
        }
    }
}

impl fmt::Display for QuantityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formatted)?;
        if let Some(standard) = &self.standard_unit {
            if *standard != self.unit {
                write!(f, " (= {} {standard})", self.base_value)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ConversionReport {
    pub from: QuantityReport,
    pub to: QuantityReport,
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.from.formatted, self.to.formatted)
    }
}

#[derive(Debug, Serialize)]
pub struct DimensionReport {
    pub canonical: String,
    pub exponents: [i8; 9],
    pub dimensionless: bool,
    /// Registered dimensions measured by this vector.
    pub matches: Vec<String>,
}

impl DimensionReport {
    pub fn new(dimension: DimensionVector, matches: Vec<String>) -> Self {
        Self {
            canonical: dimension.to_canonical_string(),
            exponents: dimension.0,
            dimensionless: dimension.is_dimensionless(),
            matches,
        }
    }
}

impl fmt::Display for DimensionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.matches.is_empty() {
            write!(f, "{}", self.canonical)
        } else {
            write!(f, "{} ({})", self.canonical, self.matches.join(", "))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UnitRow {
    pub id: String,
    pub name: String,
    pub display: String,
    pub abbreviations: Vec<String>,
    pub system: String,
    pub generated: bool,
    /// Base units per unit; absent for affine and non-linear scales.
    pub factor: Option<f64>,
}

impl UnitRow {
    pub fn new(unit: &Unit, display: String) -> Self {
        Self {
            id: unit.id().to_string(),
            name: unit.name().to_string(),
            display,
            abbreviations: unit.abbreviations().to_vec(),
            system: unit.system().to_string(),
            generated: unit.is_generated(),
            factor: unit.scale().linear_factor(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UnitsReport {
    pub dimension: String,
    pub standard_unit: Option<String>,
    pub units: Vec<UnitRow>,
}

impl fmt::Display for UnitsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.units.iter().map(|u| u.display.chars().count()).max().unwrap_or(0);
        for (i, unit) in self.units.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let marker = if self.standard_unit.as_deref() == Some(unit.id.as_str()) {
                "*"
            } else {
                " "
            };
            let pad = width - unit.display.chars().count();
            write!(
                f,
                "{marker} {}{:pad$}  {} [{}]",
                unit.display, "", unit.name, unit.system
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct DimensionsReport {
    pub dimensions: Vec<DimensionSummary>,
}

#[derive(Debug, Serialize)]
pub struct DimensionSummary {
    pub name: String,
    pub dimension: String,
    pub units: usize,
}

impl fmt::Display for DimensionsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.dimensions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}  {}  ({} units)", d.name, d.dimension, d.units)?;
        }
        Ok(())
    }
}

/// Print `report` to stdout, as pretty JSON when `json` is set.
pub fn emit<T: Serialize + fmt::Display>(report: &T, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_report_lists_matches() {
        let speed = DimensionVector::LENGTH / DimensionVector::TIME;
        let report = DimensionReport::new(speed, vec!["speed".to_string()]);
        assert_eq!(report.to_string(), "m/s (speed)");
        assert_eq!(
            DimensionReport::new(DimensionVector::ZERO, Vec::new()).to_string(),
            "1"
        );
    }

    #[test]
    fn quantity_report_shows_base_value() {
        let registries = mensura_units::registries();
        let speed = registries.require("speed").unwrap();
        let q = QuantityValue::parse("36 km/h", &speed, &Locale::invariant()).unwrap();
        let report = QuantityReport::new(&q, &Locale::invariant());
        assert_eq!(report.unit, "km/h");
        assert_eq!(report.standard_unit.as_deref(), Some("m/s"));
        assert!(report.to_string().starts_with("36 km/h (= 10"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["dimension"], "speed");
    }
}
