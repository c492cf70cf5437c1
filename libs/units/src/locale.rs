//! Locales, their numeric conventions, and the localization seam used to
//! look up translated unit abbreviations.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::error::LocalizeError;

/// A language with an optional region, e.g. `de-CH`.
///
/// The empty language is the invariant locale: `.` as decimal separator,
/// `,` for grouping and the default (non-localized) unit abbreviations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Locale {
    language: String,
    region: Option<String>,
}

impl Locale {
    pub fn invariant() -> Self {
        Self::default()
    }

    pub fn new(language: &str, region: Option<&str>) -> Self {
        Self {
            language: language.to_ascii_lowercase(),
            region: region
                .filter(|r| !r.is_empty())
                .map(|r| r.to_ascii_uppercase()),
        }
    }

    /// Parse `de-DE`, `de_DE`, `de` or `de-DE.UTF-8`. An empty tag, `C`,
    /// `POSIX` and `und` give the invariant locale.
    pub fn parse(tag: &str) -> Result<Self, LocalizeError> {
        let tag = tag.trim();
        let tag = tag.split(['.', '@']).next().unwrap_or(tag);
        if tag.is_empty() || matches!(tag, "C" | "POSIX" | "und" | "invariant") {
            return Ok(Self::invariant());
        }

        let mut parts = tag.split(['-', '_']);
        let language = parts.next().unwrap_or_default();
        if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(LocalizeError::InvalidTag(tag.to_string()));
        }
        let region = parts.find(|p| {
            (p.len() == 2 && p.chars().all(|c| c.is_ascii_alphabetic()))
                || (p.len() == 3 && p.chars().all(|c| c.is_ascii_digit()))
        });
        Ok(Self::new(language, region))
    }

    pub fn is_invariant(&self) -> bool {
        self.language.is_empty()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// The same language without a region.
    pub fn language_only(&self) -> Locale {
        Locale {
            language: self.language.clone(),
            region: None,
        }
    }

    pub fn number_format(&self) -> NumberFormat {
        NumberFormat::for_locale(self)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invariant() {
            return f.write_str("invariant");
        }
        match &self.region {
            Some(region) => write!(f, "{}-{}", self.language, region),
            None => f.write_str(&self.language),
        }
    }
}

impl FromStr for Locale {
    type Err = LocalizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::parse(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = LocalizeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Locale::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(value: Locale) -> Self {
        value.to_string()
    }
}

/// Decimal and digit-grouping separators of a locale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NumberFormat {
    pub decimal_separator: char,
    pub group_separator: char,
}

impl NumberFormat {
    pub const INVARIANT: NumberFormat = NumberFormat {
        decimal_separator: '.',
        group_separator: ',',
    };

    pub fn for_locale(locale: &Locale) -> NumberFormat {
        let (decimal_separator, group_separator) =
            match (locale.language(), locale.region()) {
                ("de" | "it" | "fr", Some("CH")) | ("rm", _) => ('.', '\u{2019}'),
                ("fr", _) => (',', '\u{202F}'),
                (
                    "de" | "es" | "it" | "nl" | "pt" | "id" | "tr" | "da" | "el" | "ro" | "hr"
                    | "sl" | "sr" | "is",
                    _,
                ) => (',', '.'),
                (
                    "ru" | "pl" | "cs" | "sk" | "sv" | "nb" | "nn" | "no" | "fi" | "uk" | "hu"
                    | "bg" | "lt" | "lv" | "et" | "be" | "kk",
                    _,
                ) => (',', '\u{A0}'),
                _ => ('.', ','),
            };
        NumberFormat {
            decimal_separator,
            group_separator,
        }
    }

    /// Whether `c` acts as a grouping separator. Locales that group with a
    /// (narrow) no-break space also accept a plain space.
    pub fn is_group_separator(&self, c: char) -> bool {
        c == self.group_separator
            || (matches!(self.group_separator, '\u{A0}' | '\u{202F}')
                && matches!(c, ' ' | '\u{A0}' | '\u{202F}'))
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::INVARIANT
    }
}

/// Localized abbreviations of a single unit, decoded from the
/// `display|text` entry format.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalizedAbbreviations {
    pub display: Option<String>,
    pub text: Option<String>,
}

impl LocalizedAbbreviations {
    pub fn parse(entry: &str) -> Self {
        let mut parts = entry.splitn(2, '|');
        let non_empty = |s: Option<&str>| {
            s.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let display = non_empty(parts.next());
        let text = non_empty(parts.next());
        Self { display, text }
    }
}

/// Source of localized unit abbreviations.
///
/// Returns the raw `display|text` entry for a unit, `Ok(None)` when the
/// bundle has no entry for it, or an error when the bundle itself is
/// unavailable. Callers fall back to the unit's default abbreviations in
/// both of the latter cases.
pub trait Localizer: Send + Sync {
    fn lookup(
        &self,
        dimension: &str,
        unit_id: &str,
        locale: &Locale,
    ) -> Result<Option<String>, LocalizeError>;
}

/// A [`Localizer`] without any bundles.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLocalization;

impl Localizer for NoLocalization {
    fn lookup(
        &self,
        _dimension: &str,
        _unit_id: &str,
        _locale: &Locale,
    ) -> Result<Option<String>, LocalizeError> {
        Ok(None)
    }
}

/// In-memory [`Localizer`]. Lookups for `de-AT` fall back to entries
/// registered for `de`.
#[derive(Clone, Debug, Default)]
pub struct StaticLocalizer {
    entries: HashMap<(Locale, String, String), String>,
    locales: HashSet<Locale>,
}

impl StaticLocalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        locale: Locale,
        dimension: impl Into<String>,
        unit_id: impl Into<String>,
        entry: impl Into<String>,
    ) {
        self.locales.insert(locale.clone());
        self.entries
            .insert((locale, dimension.into(), unit_id.into()), entry.into());
    }

    pub fn with(
        mut self,
        locale: Locale,
        dimension: impl Into<String>,
        unit_id: impl Into<String>,
        entry: impl Into<String>,
    ) -> Self {
        self.insert(locale, dimension, unit_id, entry);
        self
    }

    fn get(&self, locale: &Locale, dimension: &str, unit_id: &str) -> Option<&String> {
        self.entries
            .get(&(locale.clone(), dimension.to_string(), unit_id.to_string()))
    }
}

impl Localizer for StaticLocalizer {
    fn lookup(
        &self,
        dimension: &str,
        unit_id: &str,
        locale: &Locale,
    ) -> Result<Option<String>, LocalizeError> {
        if locale.is_invariant() {
            return Ok(None);
        }
        let language = locale.language_only();
        if !self.locales.contains(locale) && !self.locales.contains(&language) {
            return Err(LocalizeError::MissingBundle(locale.to_string()));
        }
        Ok(self
            .get(locale, dimension, unit_id)
            .or_else(|| self.get(&language, dimension, unit_id))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tags() {
        let l = Locale::parse("de_CH.UTF-8").unwrap();
        assert_eq!(l.language(), "de");
        assert_eq!(l.region(), Some("CH"));
        assert_eq!(l.to_string(), "de-CH");
        assert!(Locale::parse("C").unwrap().is_invariant());
        assert!(Locale::parse("x").is_err());
    }

    #[test]
    fn number_formats() {
        let de = Locale::parse("de-DE").unwrap().number_format();
        assert_eq!(de.decimal_separator, ',');
        assert_eq!(de.group_separator, '.');
        let ch = Locale::parse("de-CH").unwrap().number_format();
        assert_eq!(ch.decimal_separator, '.');
        assert_eq!(Locale::invariant().number_format(), NumberFormat::INVARIANT);
        let fr = Locale::parse("fr-FR").unwrap().number_format();
        assert!(fr.is_group_separator(' '));
    }

    #[test]
    fn decodes_entries() {
        let e = LocalizedAbbreviations::parse("°C|degC");
        assert_eq!(e.display.as_deref(), Some("°C"));
        assert_eq!(e.text.as_deref(), Some("degC"));
        let e = LocalizedAbbreviations::parse("км");
        assert_eq!(e.text, None);
        assert_eq!(LocalizedAbbreviations::parse("|"), LocalizedAbbreviations::default());
    }

    #[test]
    fn static_localizer_falls_back_to_language() {
        let de = Locale::parse("de").unwrap();
        let loc = StaticLocalizer::new().with(de, "length", "m", "m|Meter");
        let at = Locale::parse("de-AT").unwrap();
        assert_eq!(
            loc.lookup("length", "m", &at).unwrap().as_deref(),
            Some("m|Meter")
        );
        assert_eq!(loc.lookup("length", "km", &at).unwrap(), None);
        assert!(loc
            .lookup("length", "m", &Locale::parse("ja").unwrap())
            .is_err());
    }
}
