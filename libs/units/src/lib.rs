#![forbid(unsafe_code)]

#[cfg(feature = "catalog")]
pub mod catalog;
mod dimension;
mod error;
mod locale;
mod quantity;
mod registry;
mod scale;
mod scan;
mod unit;

pub use dimension::{BaseDimension, DimensionOp, DimensionVector};
pub use error::{
    DimensionError, Error, LocalizeError, ParseError, Result, ScanError, UnitError,
};
pub use locale::{
    Locale, LocalizedAbbreviations, Localizer, NoLocalization, NumberFormat, StaticLocalizer,
};
pub use quantity::{format_number, QuantityValue};
pub use registry::{normalize_abbreviation, QuantityRegistry, Registries};
pub use scale::{GradeFormula, Scale, ScaleFormula};
pub use scan::{LenientNumberScanner, NumberScanner, ScannedNumber};
pub use unit::{SiPrefix, Unit, UnitBuilder, UnitSystem, SI_PREFIXES};

#[cfg(feature = "catalog")]
static REGISTRIES: once_cell::sync::Lazy<Registries> = once_cell::sync::Lazy::new(|| {
    let registries = Registries::with_localizer(std::sync::Arc::new(catalog::localizations()));
    catalog::install(&registries).expect("failed to install the built-in unit catalog");
    registries
});

/// The process-wide registries, loaded with the built-in catalog on first
/// use. Units registered here are visible to every caller.
#[cfg(feature = "catalog")]
pub fn registries() -> &'static Registries {
    &REGISTRIES
}
