use thiserror::Error;

use crate::locale::Locale;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Dimension(#[from] DimensionError),

    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("incompatible dimensions: '{from}' vs '{to}'")]
    IncompatibleDimensions { from: String, to: String },

    #[error("unknown dimension '{0}'")]
    UnknownDimension(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DimensionError {
    #[error("malformed dimension string '{text}' at byte {pos}: {message}")]
    Malformed {
        text: String,
        pos: usize,
        message: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    #[error("unit '{0}' does not have a linear scale and cannot be derived")]
    UnsupportedScale(String),

    #[error("scale factor must be finite and non-zero, got {0}")]
    InvalidFactor(f64),

    #[error("scale offset must be finite, got {0}")]
    InvalidOffset(f64),

    #[error("duplicate unit id '{id}' in dimension '{dimension}'")]
    DuplicateUnitId { dimension: String, id: String },

    #[error("duplicate abbreviation '{abbreviation}' in dimension '{dimension}' (units '{existing}' and '{incoming}')")]
    DuplicateUnitAbbreviation {
        dimension: String,
        abbreviation: String,
        existing: String,
        incoming: String,
    },

    #[error("unit '{0}' is not attached to a live registry")]
    Detached(String),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("quantity text is empty")]
    Empty,

    #[error("malformed quantity '{text}' for locale '{locale}'")]
    Malformed {
        text: String,
        locale: Locale,
        #[source]
        source: ScanError,
    },

    #[error("unknown unit '{unit}' in '{text}' for locale '{locale}'")]
    UnknownUnit {
        unit: String,
        text: String,
        locale: Locale,
    },
}

/// Raised by a [`NumberScanner`](crate::scan::NumberScanner) when no number
/// can be read from the start of the text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("no digits at byte {0}")]
    NoDigits(usize),

    #[error("invalid number literal '{0}'")]
    InvalidLiteral(String),
}

/// Raised by a [`Localizer`](crate::locale::Localizer) when a resource
/// bundle cannot be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocalizeError {
    #[error("no localization bundle for locale '{0}'")]
    MissingBundle(String),

    #[error("localization bundle error: {0}")]
    Bundle(String),

    #[error("invalid locale tag '{0}'")]
    InvalidTag(String),
}
