//! Per-dimension unit registries and the process-wide map of them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::dimension::DimensionVector;
use crate::error::{Error, LocalizeError, Result, UnitError};
use crate::locale::{Locale, LocalizedAbbreviations, Localizer, NoLocalization};
use crate::unit::{Unit, UnitBuilder};

/// Characters dropped from an abbreviation before the second lookup attempt.
const IGNORED_IN_ABBREVIATIONS: [char; 3] = [' ', '.', '^'];

/// Strip the characters that are insignificant in unit abbreviations, so
/// that `" m "`, `"m^2"` and `"km/h."` match `m`, `m2` and `km/h`.
pub fn normalize_abbreviation(text: &str) -> String {
    text.chars()
        .filter(|c| !IGNORED_IN_ABBREVIATIONS.contains(c))
        .collect()
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone, Default)]
struct Indices {
    by_id: HashMap<String, Arc<Unit>>,
    by_abbreviation: HashMap<String, Arc<Unit>>,
}

impl Indices {
    /// Every unit that holds at least one index entry, explicit units first,
    /// then by id.
    fn live_units(&self) -> Vec<Arc<Unit>> {
        let mut units: Vec<Arc<Unit>> = Vec::new();
        for unit in self.by_id.values().chain(self.by_abbreviation.values()) {
            if !units.iter().any(|u| Arc::ptr_eq(u, unit)) {
                units.push(unit.clone());
            }
        }
        units.sort_by(|a, b| (a.generated, &a.id).cmp(&(b.generated, &b.id)));
        units
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Insert,
    Replace,
    Keep,
}

/// Explicit units override generated ones, generated units never override
/// explicit ones, and two units of the same kind may not share a key.
fn claim(existing: Option<&Arc<Unit>>, incoming: &Unit) -> std::result::Result<Slot, ()> {
    match existing {
        None => Ok(Slot::Insert),
        Some(existing) => match (existing.generated, incoming.generated) {
            (true, false) => Ok(Slot::Replace),
            (false, true) => Ok(Slot::Keep),
            _ => Err(()),
        },
    }
}

struct LocalizedIndex {
    generation: u64,
    by_abbreviation: HashMap<String, Arc<Unit>>,
    display: HashMap<String, String>,
}

/// The units of one physical dimension.
///
/// The first unit registered becomes the standard unit. Units are indexed by
/// id and by abbreviation; a localized abbreviation index is built per
/// locale on demand and rebuilt when the registry's contents change.
pub struct QuantityRegistry {
    name: String,
    dimension: DimensionVector,
    standard: OnceLock<Arc<Unit>>,
    indices: RwLock<Indices>,
    localizer: RwLock<Arc<dyn Localizer>>,
    localized: RwLock<HashMap<Locale, LocalizedIndex>>,
    generation: AtomicU64,
}

impl QuantityRegistry {
    pub fn new(name: impl Into<String>, dimension: DimensionVector) -> Arc<Self> {
        Self::with_localizer(name, dimension, Arc::new(NoLocalization))
    }

    pub fn with_localizer(
        name: impl Into<String>,
        dimension: DimensionVector,
        localizer: Arc<dyn Localizer>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            dimension,
            standard: OnceLock::new(),
            indices: RwLock::new(Indices::default()),
            localizer: RwLock::new(localizer),
            localized: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimension(&self) -> DimensionVector {
        self.dimension
    }

    /// The first unit ever registered; `None` until then.
    pub fn standard_unit(&self) -> Option<Arc<Unit>> {
        self.standard.get().cloned()
    }

    pub fn set_localizer(&self, localizer: Arc<dyn Localizer>) {
        *write(&self.localizer) = localizer;
        // Indices built before the swap are stale.
        self.generation.fetch_add(1, Ordering::AcqRel);
        write(&self.localized).clear();
    }

    /// Register a unit.
    ///
    /// Id and abbreviation keys are claimed independently: an explicit unit
    /// replaces a generated one, a generated unit colliding with an explicit
    /// one is skipped for that key, and two units of the same kind on one
    /// key are an error. Nothing is changed when an error is returned.
    ///
    /// Returns `None` when a generated unit lost every key it asked for.
    pub fn register(
        self: &Arc<Self>,
        builder: UnitBuilder,
    ) -> Result<Option<Arc<Unit>>, UnitError> {
        let unit = Arc::new(builder.build(self));
        let mut indices = write(&self.indices);
        let indexed = self.claim_keys(&mut indices, &unit)?;
        drop(indices);

        if !indexed {
            return Ok(None);
        }
        self.registered(std::slice::from_ref(&unit));
        Ok(Some(unit))
    }

    /// Register several units as one step: either every unit is claimed or,
    /// on the first collision error, none is. Units that lost every key are
    /// left out of the result.
    pub fn register_all(
        self: &Arc<Self>,
        builders: Vec<UnitBuilder>,
    ) -> Result<Vec<Arc<Unit>>, UnitError> {
        let units: Vec<Arc<Unit>> = builders
            .into_iter()
            .map(|builder| Arc::new(builder.build(self)))
            .collect();

        let mut indices = write(&self.indices);
        let mut staged = indices.clone();
        let mut out = Vec::with_capacity(units.len());
        for unit in units {
            if self.claim_keys(&mut staged, &unit)? {
                out.push(unit);
            }
        }
        *indices = staged;
        drop(indices);

        if !out.is_empty() {
            self.registered(&out);
        }
        Ok(out)
    }

    /// Claim the id and abbreviation keys of `unit` in `indices`. Every
    /// claim is checked before any key is written.
    fn claim_keys(&self, indices: &mut Indices, unit: &Arc<Unit>) -> Result<bool, UnitError> {
        let id_slot = claim(indices.by_id.get(&unit.id), unit).map_err(|()| {
            UnitError::DuplicateUnitId {
                dimension: self.name.clone(),
                id: unit.id.clone(),
            }
        })?;

        let mut keys: Vec<&str> = Vec::new();
        for key in unit
            .abbreviations
            .iter()
            .chain(std::iter::once(&unit.display_abbreviation))
        {
            if !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }

        let mut abbreviation_slots = Vec::with_capacity(keys.len());
        for key in keys {
            let existing = indices.by_abbreviation.get(key);
            let slot = claim(existing, unit).map_err(|()| UnitError::DuplicateUnitAbbreviation {
                dimension: self.name.clone(),
                abbreviation: key.to_string(),
                existing: existing.map(|u| u.id.clone()).unwrap_or_default(),
                incoming: unit.id.clone(),
            })?;
            abbreviation_slots.push((key, slot));
        }

        let claimed = id_slot != Slot::Keep
            || abbreviation_slots.iter().any(|(_, slot)| *slot != Slot::Keep);
        if !claimed {
            tracing::trace!(
                dimension = %self.name,
                unit = %unit.id,
                "Generated unit shadowed by explicit units"
            );
            return Ok(false);
        }

        if id_slot != Slot::Keep {
            indices.by_id.insert(unit.id.clone(), unit.clone());
        }
        for (key, slot) in abbreviation_slots {
            if slot != Slot::Keep {
                indices.by_abbreviation.insert(key.to_string(), unit.clone());
            }
        }
        tracing::trace!(
            dimension = %self.name,
            unit = %unit.id,
            generated = unit.generated,
            replaced = id_slot == Slot::Replace,
            "Claimed unit keys"
        );
        Ok(true)
    }

    /// Bookkeeping after units were committed to the indices.
    fn registered(&self, units: &[Arc<Unit>]) {
        if let Some(first) = units.first() {
            if self.standard.get().is_none() {
                let _ = self.standard.set(first.clone());
                tracing::debug!(dimension = %self.name, unit = %first.id, "Standard unit set");
            }
        }
        self.generation.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(
            dimension = %self.name,
            units = units.len(),
            "Registered units"
        );
    }

    /// Remove every index entry held by `unit`. The standard unit stays the
    /// standard unit even if it is unregistered.
    pub fn unregister(&self, unit: &Unit) -> bool {
        let mut indices = write(&self.indices);
        let holds = |entry: &Arc<Unit>| std::ptr::eq(Arc::as_ptr(entry), unit) || **entry == *unit;

        let before = indices.by_id.len() + indices.by_abbreviation.len();
        indices.by_id.retain(|_, entry| !holds(entry));
        indices.by_abbreviation.retain(|_, entry| !holds(entry));
        let removed = before != indices.by_id.len() + indices.by_abbreviation.len();

        if removed {
            self.generation.fetch_add(1, Ordering::AcqRel);
            tracing::debug!(dimension = %self.name, unit = %unit.id, "Unregistered unit");
        }
        removed
    }

    pub fn contains(&self, unit: &Unit) -> bool {
        let indices = read(&self.indices);
        indices
            .by_id
            .values()
            .chain(indices.by_abbreviation.values())
            .any(|entry| **entry == *unit)
    }

    pub fn resolve_by_id(&self, id: &str) -> Option<Arc<Unit>> {
        read(&self.indices).by_id.get(id).cloned()
    }

    /// Resolve an abbreviation using the default (non-localized) spellings.
    pub fn resolve_by_abbreviation(&self, text: &str) -> Option<Arc<Unit>> {
        self.resolve_with_locale(text, &Locale::invariant())
    }

    /// Resolve an abbreviation, trying in order: the localized spellings of
    /// `locale`, the same with insignificant characters stripped, the default
    /// spellings, the same stripped, and finally `text` read as a dimension
    /// string equal to this registry's dimension (giving the standard unit).
    pub fn resolve_with_locale(&self, text: &str, locale: &Locale) -> Option<Arc<Unit>> {
        let normalized = normalize_abbreviation(text);

        if !locale.is_invariant() {
            let hit = self.with_localized(locale, |index| {
                index
                    .by_abbreviation
                    .get(text)
                    .or_else(|| index.by_abbreviation.get(&normalized))
                    .cloned()
            });
            if hit.is_some() {
                return hit;
            }
        }

        let hit = {
            let indices = read(&self.indices);
            indices
                .by_abbreviation
                .get(text)
                .or_else(|| indices.by_abbreviation.get(&normalized))
                .cloned()
        };
        if hit.is_some() {
            return hit;
        }

        let matches_dimension = [text, normalized.as_str()].iter().any(|candidate| {
            DimensionVector::parse(candidate).is_ok_and(|d| d == self.dimension)
        });
        if matches_dimension {
            tracing::trace!(dimension = %self.name, text, "Resolved unit through dimension string");
            return self.standard_unit();
        }
        None
    }

    /// The display abbreviation of `unit` in `locale`, falling back to the
    /// unit's default display abbreviation.
    pub fn display_abbreviation(&self, unit: &Unit, locale: &Locale) -> String {
        if locale.is_invariant() {
            return unit.display_abbreviation.clone();
        }
        self.with_localized(locale, |index| index.display.get(&unit.id).cloned())
            .unwrap_or_else(|| unit.display_abbreviation.clone())
    }

    /// Units indexed by id, sorted by id.
    pub fn units(&self) -> Vec<Arc<Unit>> {
        let mut units: Vec<Arc<Unit>> = read(&self.indices).by_id.values().cloned().collect();
        units.sort_by(|a, b| a.id.cmp(&b.id));
        units
    }

    pub fn len(&self) -> usize {
        read(&self.indices).by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_localized<R>(&self, locale: &Locale, f: impl FnOnce(&LocalizedIndex) -> R) -> R {
        let generation = self.generation.load(Ordering::Acquire);
        {
            let cache = read(&self.localized);
            if let Some(index) = cache.get(locale).filter(|i| i.generation == generation) {
                return f(index);
            }
        }

        // Re-check under the write lock so that concurrent callers build once.
        let mut cache = write(&self.localized);
        if let Some(index) = cache.get(locale).filter(|i| i.generation == generation) {
            return f(index);
        }
        let index = self.build_localized(locale, generation);
        let out = f(&index);
        cache.insert(locale.clone(), index);
        out
    }

    fn build_localized(&self, locale: &Locale, generation: u64) -> LocalizedIndex {
        let units = read(&self.indices).live_units();
        let localizer = read(&self.localizer).clone();

        let mut index = LocalizedIndex {
            generation,
            by_abbreviation: HashMap::new(),
            display: HashMap::new(),
        };
        let mut bundle_available = true;

        for unit in &units {
            let localized = if bundle_available {
                match localizer.lookup(&self.name, &unit.id, locale) {
                    Ok(entry) => entry.map(|e| LocalizedAbbreviations::parse(&e)),
                    Err(LocalizeError::MissingBundle(_)) => {
                        tracing::debug!(
                            dimension = %self.name,
                            locale = %locale,
                            "No localization bundle, using default abbreviations"
                        );
                        bundle_available = false;
                        None
                    }
                    Err(e) => {
                        tracing::warn!(
                            dimension = %self.name,
                            locale = %locale,
                            error = %e,
                            "Localized abbreviations unavailable, using defaults"
                        );
                        bundle_available = false;
                        None
                    }
                }
            } else {
                None
            };
            let localized = localized.unwrap_or_default();

            let display = localized
                .display
                .clone()
                .unwrap_or_else(|| unit.display_abbreviation.clone());
            index.display.entry(unit.id.clone()).or_insert(display);

            let keys: Vec<String> = if localized.display.is_none() && localized.text.is_none() {
                unit.abbreviations
                    .iter()
                    .chain(std::iter::once(&unit.display_abbreviation))
                    .cloned()
                    .collect()
            } else {
                localized.display.into_iter().chain(localized.text).collect()
            };
            for key in keys {
                // Units are visited explicit-first, so the first claim wins.
                index.by_abbreviation.entry(key).or_insert_with(|| unit.clone());
            }
        }

        tracing::debug!(
            dimension = %self.name,
            locale = %locale,
            units = units.len(),
            "Rebuilt localized abbreviation index"
        );
        index
    }
}

impl std::fmt::Debug for QuantityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuantityRegistry")
            .field("name", &self.name)
            .field("dimension", &self.dimension)
            .field("standard", &self.standard.get().map(|u| u.id.clone()))
            .field("units", &self.len())
            .finish()
    }
}

/// Map from dimension name to its registry.
pub struct Registries {
    registries: RwLock<HashMap<String, Arc<QuantityRegistry>>>,
    localizer: Arc<dyn Localizer>,
}

impl Registries {
    pub fn new() -> Self {
        Self::with_localizer(Arc::new(NoLocalization))
    }

    pub fn with_localizer(localizer: Arc<dyn Localizer>) -> Self {
        Self {
            registries: RwLock::new(HashMap::new()),
            localizer,
        }
    }

    /// The registry for `name`, created on first use. Asking for an existing
    /// name with a different dimension is an error.
    pub fn registry(&self, name: &str, dimension: DimensionVector) -> Result<Arc<QuantityRegistry>> {
        if let Some(existing) = read(&self.registries).get(name) {
            return check_dimension(existing, dimension);
        }

        let mut registries = write(&self.registries);
        if let Some(existing) = registries.get(name) {
            return check_dimension(existing, dimension);
        }
        let registry = QuantityRegistry::with_localizer(name, dimension, self.localizer.clone());
        registries.insert(name.to_string(), registry.clone());
        tracing::debug!(dimension = name, vector = %dimension, "Created quantity registry");
        Ok(registry)
    }

    /// A registry that has at least one unit.
    pub fn get(&self, name: &str) -> Option<Arc<QuantityRegistry>> {
        read(&self.registries)
            .get(name)
            .filter(|r| r.standard_unit().is_some())
            .cloned()
    }

    pub fn require(&self, name: &str) -> Result<Arc<QuantityRegistry>> {
        self.get(name)
            .ok_or_else(|| Error::UnknownDimension(name.to_string()))
    }

    /// Registries measuring `dimension`, sorted by name. Several dimensions
    /// can share a vector (energy and torque, for instance).
    pub fn by_dimension(&self, dimension: &DimensionVector) -> Vec<Arc<QuantityRegistry>> {
        let mut out: Vec<Arc<QuantityRegistry>> = read(&self.registries)
            .values()
            .filter(|r| r.dimension == *dimension && r.standard_unit().is_some())
            .cloned()
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = read(&self.registries)
            .values()
            .filter(|r| r.standard_unit().is_some())
            .map(|r| r.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Resolve an abbreviation in every registry. More than one result means
    /// the abbreviation is ambiguous across dimensions.
    pub fn resolve(&self, text: &str, locale: &Locale) -> Vec<Arc<Unit>> {
        let registries: Vec<Arc<QuantityRegistry>> =
            read(&self.registries).values().cloned().collect();
        let mut out: Vec<Arc<Unit>> = registries
            .iter()
            .filter_map(|r| r.resolve_with_locale(text, locale))
            .collect();
        out.sort_by(|a, b| a.dimension.cmp(&b.dimension));
        out
    }

    pub fn unregister_dimension(&self, name: &str) -> Option<Arc<QuantityRegistry>> {
        write(&self.registries).remove(name)
    }
}

impl Default for Registries {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registries")
            .field("dimensions", &self.names())
            .finish()
    }
}

fn check_dimension(
    registry: &Arc<QuantityRegistry>,
    dimension: DimensionVector,
) -> Result<Arc<QuantityRegistry>> {
    if registry.dimension != dimension {
        return Err(Error::IncompatibleDimensions {
            from: registry.dimension.to_canonical_string(),
            to: dimension.to_canonical_string(),
        });
    }
    Ok(registry.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_strips_insignificant_characters() {
        assert_eq!(normalize_abbreviation(" m "), "m");
        assert_eq!(normalize_abbreviation("m^2"), "m2");
        assert_eq!(normalize_abbreviation("km/h."), "km/h");
    }

    #[test]
    fn claim_policy() {
        let registry = QuantityRegistry::new("length", DimensionVector::LENGTH);
        let explicit = Arc::new(UnitBuilder::new("m").build(&registry));
        let generated = Arc::new(UnitBuilder::new("m").generated().build(&registry));

        assert_eq!(claim(None, &explicit), Ok(Slot::Insert));
        assert_eq!(claim(Some(&generated), &explicit), Ok(Slot::Replace));
        assert_eq!(claim(Some(&explicit), &generated), Ok(Slot::Keep));
        assert!(claim(Some(&explicit), &explicit).is_err());
        assert!(claim(Some(&generated), &generated).is_err());
    }
}
