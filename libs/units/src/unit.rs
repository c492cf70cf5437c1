//! Units: named, scaled members of a dimension, and SI-prefix derivation.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::error::UnitError;
use crate::registry::QuantityRegistry;
use crate::scale::Scale;

/// Classification of a unit by the system it belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum UnitSystem {
    SiBase,
    SiDerived,
    SiAccepted,
    Imperial,
    UsCustomary,
    Cgs,
    #[default]
    Other,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::SiBase => "si_base",
            UnitSystem::SiDerived => "si_derived",
            UnitSystem::SiAccepted => "si_accepted",
            UnitSystem::Imperial => "imperial",
            UnitSystem::UsCustomary => "us_customary",
            UnitSystem::Cgs => "cgs",
            UnitSystem::Other => "other",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SiPrefix {
    pub name: &'static str,
    pub symbol: &'static str,
    /// Other accepted spellings of the symbol (`u` and Greek mu for micro).
    pub alternates: &'static [&'static str],
    pub exponent: i32,
    pub multiplier: f64,
}

impl SiPrefix {
    const fn new(name: &'static str, symbol: &'static str, exponent: i32, multiplier: f64) -> Self {
        Self {
            name,
            symbol,
            alternates: &[],
            exponent,
            multiplier,
        }
    }
}

pub const SI_PREFIXES: [SiPrefix; 24] = [
    SiPrefix::new("quetta", "Q", 30, 1e30),
    SiPrefix::new("ronna", "R", 27, 1e27),
    SiPrefix::new("yotta", "Y", 24, 1e24),
    SiPrefix::new("zetta", "Z", 21, 1e21),
    SiPrefix::new("exa", "E", 18, 1e18),
    SiPrefix::new("peta", "P", 15, 1e15),
    SiPrefix::new("tera", "T", 12, 1e12),
    SiPrefix::new("giga", "G", 9, 1e9),
    SiPrefix::new("mega", "M", 6, 1e6),
    SiPrefix::new("kilo", "k", 3, 1e3),
    SiPrefix::new("hecto", "h", 2, 1e2),
    SiPrefix::new("deca", "da", 1, 1e1),
    SiPrefix::new("deci", "d", -1, 1e-1),
    SiPrefix::new("centi", "c", -2, 1e-2),
    SiPrefix::new("milli", "m", -3, 1e-3),
    SiPrefix {
        name: "micro",
        symbol: "µ",
        alternates: &["μ", "u"],
        exponent: -6,
        multiplier: 1e-6,
    },
    SiPrefix::new("nano", "n", -9, 1e-9),
    SiPrefix::new("pico", "p", -12, 1e-12),
    SiPrefix::new("femto", "f", -15, 1e-15),
    SiPrefix::new("atto", "a", -18, 1e-18),
    SiPrefix::new("zepto", "z", -21, 1e-21),
    SiPrefix::new("yocto", "y", -24, 1e-24),
    SiPrefix::new("ronto", "r", -27, 1e-27),
    SiPrefix::new("quecto", "q", -30, 1e-30),
];

/// A registered unit.
///
/// Units are only handed out by [`UnitBuilder::register`] (or the
/// derivation helpers built on it), so every `Unit` in circulation belongs
/// to a registry.
pub struct Unit {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) abbreviations: Vec<String>,
    pub(crate) display_abbreviation: String,
    pub(crate) scale: Scale,
    pub(crate) system: UnitSystem,
    pub(crate) generated: bool,
    pub(crate) dimension: String,
    pub(crate) registry: Weak<QuantityRegistry>,
}

impl Unit {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Textual abbreviations; the first one is the canonical spelling.
    pub fn abbreviations(&self) -> &[String] {
        &self.abbreviations
    }

    pub fn display_abbreviation(&self) -> &str {
        &self.display_abbreviation
    }

    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    pub fn system(&self) -> UnitSystem {
        self.system
    }

    /// True for units produced by SI-prefix generation.
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// Name of the dimension this unit belongs to.
    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    pub fn registry(&self) -> Result<Arc<QuantityRegistry>, UnitError> {
        self.registry
            .upgrade()
            .ok_or_else(|| UnitError::Detached(self.id.clone()))
    }

    pub fn to_base(&self, value: f64) -> f64 {
        self.scale.to_base(value)
    }

    pub fn from_base(&self, value: f64) -> f64 {
        self.scale.from_base(value)
    }

    /// A builder for a unit scaled by `extra_factor` relative to this one,
    /// pre-filled with the composed scale and this unit's system. Only
    /// proportional units can be derived from.
    pub fn derived(
        &self,
        id: impl Into<String>,
        extra_factor: f64,
    ) -> Result<UnitBuilder, UnitError> {
        let factor = self
            .scale
            .linear_factor()
            .ok_or_else(|| UnitError::UnsupportedScale(self.id.clone()))?;
        Ok(UnitBuilder::new(id)
            .scale(Scale::linear(factor * extra_factor)?)
            .system(self.system))
    }

    /// Derive a unit scaled by `extra_factor` and register it next to this
    /// one.
    pub fn derive(
        &self,
        id: &str,
        display_abbreviation: &str,
        name: &str,
        extra_factor: f64,
        system: UnitSystem,
    ) -> Result<Arc<Unit>, UnitError> {
        let registry = self.registry()?;
        let builder = self
            .derived(id, extra_factor)?
            .abbreviation(display_abbreviation)
            .display(display_abbreviation)
            .name(name)
            .system(system);
        registry
            .register(builder)?
            .ok_or_else(|| UnitError::DuplicateUnitId {
                dimension: self.dimension.clone(),
                id: id.to_string(),
            })
    }

    /// Generate and register the SI-prefixed variants of this unit.
    ///
    /// `allow_negative_exp`/`allow_positive_exp` select the sub- and
    /// super-unit prefixes; `power` raises each prefix multiplier, so area
    /// units pass `2.0` (1 km² = 10⁶ m²). Returns the units that were
    /// indexed; generated units that lose to an explicit unit on every
    /// index are left out. A collision error registers none of them.
    pub fn generate_si_prefixes(
        &self,
        allow_negative_exp: bool,
        allow_positive_exp: bool,
        power: f64,
    ) -> Result<Vec<Arc<Unit>>, UnitError> {
        let factor = self
            .scale
            .linear_factor()
            .ok_or_else(|| UnitError::UnsupportedScale(self.id.clone()))?;
        let registry = self.registry()?;

        let mut builders = Vec::new();
        for prefix in SI_PREFIXES.iter().filter(|p| {
            (p.exponent < 0 && allow_negative_exp) || (p.exponent > 0 && allow_positive_exp)
        }) {
            let mut abbreviations = Vec::new();
            for symbol in std::iter::once(&prefix.symbol).chain(prefix.alternates) {
                for abbreviation in &self.abbreviations {
                    abbreviations.push(format!("{symbol}{abbreviation}"));
                }
            }

            builders.push(
                UnitBuilder::new(format!("{}{}", prefix.symbol, self.id))
                    .name(format!("{}{}", prefix.name, self.name))
                    .abbreviations(abbreviations)
                    .display(format!("{}{}", prefix.symbol, self.display_abbreviation))
                    .scale(Scale::linear(factor * prefix.multiplier.powf(power))?)
                    .system(self.system)
                    .generated(),
            );
        }

        let out = registry.register_all(builders)?;

        tracing::debug!(
            dimension = %self.dimension,
            unit = %self.id,
            generated = out.len(),
            "Generated SI-prefixed units"
        );
        Ok(out)
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("id", &self.id)
            .field("dimension", &self.dimension)
            .field("abbreviations", &self.abbreviations)
            .field("display_abbreviation", &self.display_abbreviation)
            .field("scale", &self.scale)
            .field("system", &self.system)
            .field("generated", &self.generated)
            .finish()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_abbreviation)
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.dimension == other.dimension
            && self.id == other.id
            && self.generated == other.generated
            && self.scale == other.scale
    }
}

/// Describes a unit before it is registered.
///
/// Defaults: the id doubles as name and sole abbreviation, the display
/// abbreviation is the first abbreviation, and the scale is the identity.
#[derive(Clone, Debug)]
#[must_use = "a unit only exists once it is registered"]
pub struct UnitBuilder {
    id: String,
    name: Option<String>,
    abbreviations: Vec<String>,
    display: Option<String>,
    scale: Scale,
    system: UnitSystem,
    generated: bool,
}

impl UnitBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            abbreviations: Vec::new(),
            display: None,
            scale: Scale::Identity,
            system: UnitSystem::default(),
            generated: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn abbreviation(mut self, abbreviation: impl Into<String>) -> Self {
        let abbreviation = abbreviation.into();
        if !self.abbreviations.contains(&abbreviation) {
            self.abbreviations.push(abbreviation);
        }
        self
    }

    pub fn abbreviations<I, S>(mut self, abbreviations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for abbreviation in abbreviations {
            self = self.abbreviation(abbreviation);
        }
        self
    }

    pub fn display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn scale(mut self, scale: Scale) -> Self {
        self.scale = scale;
        self
    }

    pub fn system(mut self, system: UnitSystem) -> Self {
        self.system = system;
        self
    }

    pub(crate) fn generated(mut self) -> Self {
        self.generated = true;
        self
    }

    pub fn register(self, registry: &Arc<QuantityRegistry>) -> Result<Option<Arc<Unit>>, UnitError> {
        registry.register(self)
    }

    pub(crate) fn build(self, registry: &Arc<QuantityRegistry>) -> Unit {
        let abbreviations = if self.abbreviations.is_empty() {
            vec![self.id.clone()]
        } else {
            self.abbreviations
        };
        let display_abbreviation = self
            .display
            .unwrap_or_else(|| abbreviations[0].clone());
        Unit {
            name: self.name.unwrap_or_else(|| self.id.clone()),
            id: self.id,
            abbreviations,
            display_abbreviation,
            scale: self.scale,
            system: self.system,
            generated: self.generated,
            dimension: registry.name().to_string(),
            registry: Arc::downgrade(registry),
        }
    }
}
