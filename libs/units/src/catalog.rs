//! A compact built-in catalog of dimensions and units.
//!
//! Each dimension gets its standard unit first (which makes it the base of
//! the dimension), then explicit units, then SI-prefixed variants. Explicit
//! units always win over generated ones, so `kg` stays the authored
//! kilogram even though prefixing the gram generates a `kg` too.

use std::f64::consts::PI;
use std::sync::Arc;

use crate::dimension::DimensionVector;
use crate::error::{Result, UnitError};
use crate::locale::{Locale, StaticLocalizer};
use crate::registry::{QuantityRegistry, Registries};
use crate::scale::Scale;
use crate::unit::{Unit, UnitBuilder, UnitSystem};

pub const LENGTH: &str = "length";
pub const MASS: &str = "mass";
pub const TIME: &str = "time";
pub const SPEED: &str = "speed";
pub const TEMPERATURE: &str = "temperature";
pub const ANGLE: &str = "angle";
pub const AREA: &str = "area";
pub const VOLUME: &str = "volume";
pub const ENERGY: &str = "energy";
pub const POWER: &str = "power";
pub const PRESSURE: &str = "pressure";
pub const FREQUENCY: &str = "frequency";
pub const FORCE: &str = "force";
pub const RATIO: &str = "ratio";

/// Register the catalog into `registries`. Installing twice into the same
/// map fails with a duplicate-unit error.
pub fn install(registries: &Registries) -> Result<()> {
    length(registries)?;
    mass(registries)?;
    time(registries)?;
    speed(registries)?;
    temperature(registries)?;
    angle(registries)?;
    area(registries)?;
    volume(registries)?;
    energy(registries)?;
    power(registries)?;
    pressure(registries)?;
    frequency(registries)?;
    force(registries)?;
    ratio(registries)?;
    tracing::debug!(dimensions = registries.names().len(), "Installed unit catalog");
    Ok(())
}

/// Localized abbreviations shipped with the catalog.
pub fn localizations() -> StaticLocalizer {
    let ru = Locale::new("ru", None);
    let de = Locale::new("de", None);
    let entries: [(&Locale, &str, &str, &str); 17] = [
        (&ru, LENGTH, "m", "м"),
        (&ru, LENGTH, "km", "км"),
        (&ru, LENGTH, "cm", "см"),
        (&ru, LENGTH, "mm", "мм"),
        (&ru, MASS, "kg", "кг"),
        (&ru, MASS, "g", "г"),
        (&ru, MASS, "t", "т"),
        (&ru, TIME, "s", "с|сек"),
        (&ru, TIME, "min", "мин"),
        (&ru, TIME, "h", "ч"),
        (&ru, TIME, "d", "сут"),
        (&ru, SPEED, "m/s", "м/с"),
        (&ru, SPEED, "km/h", "км/ч"),
        (&ru, TEMPERATURE, "K", "К"),
        (&de, TIME, "h", "h|Std"),
        (&de, TIME, "d", "d|Tg"),
        (&de, SPEED, "km/h", "km/h|kmh"),
    ];

    let mut localizer = StaticLocalizer::new();
    for (locale, dimension, unit, entry) in entries {
        localizer.insert(locale.clone(), dimension, unit, entry);
    }
    localizer
}

fn add(registry: &Arc<QuantityRegistry>, builder: UnitBuilder) -> Result<Arc<Unit>> {
    let id = builder.id().to_string();
    let unit = registry
        .register(builder)?
        .ok_or_else(|| UnitError::DuplicateUnitId {
            dimension: registry.name().to_string(),
            id,
        })?;
    Ok(unit)
}

fn linear(
    id: &str,
    name: &str,
    abbreviations: &[&str],
    factor: f64,
    system: UnitSystem,
) -> Result<UnitBuilder, UnitError> {
    Ok(UnitBuilder::new(id)
        .name(name)
        .abbreviations(abbreviations.iter().copied())
        .scale(Scale::linear(factor)?)
        .system(system))
}

fn length(registries: &Registries) -> Result<()> {
    let r = registries.registry(LENGTH, DimensionVector::LENGTH)?;
    let m = add(&r, linear("m", "metre", &["m"], 1.0, UnitSystem::SiBase)?)?;
    m.generate_si_prefixes(true, true, 1.0)?;

    add(&r, linear("in", "inch", &["in", "inch"], 0.0254, UnitSystem::Imperial)?)?;
    add(&r, linear("ft", "foot", &["ft", "feet"], 0.3048, UnitSystem::Imperial)?)?;
    add(&r, linear("yd", "yard", &["yd"], 0.9144, UnitSystem::Imperial)?)?;
    add(&r, linear("mi", "mile", &["mi"], 1609.344, UnitSystem::Imperial)?)?;
    add(&r, linear("nmi", "nautical mile", &["nmi", "NM"], 1852.0, UnitSystem::Other)?)?;
    add(&r, linear("Å", "ångström", &["Å"], 1e-10, UnitSystem::Other)?)?;
    add(
        &r,
        linear("au", "astronomical unit", &["au", "AU"], 149_597_870_700.0, UnitSystem::SiAccepted)?,
    )?;
    add(
        &r,
        linear("ly", "light-year", &["ly"], 9_460_730_472_580_800.0, UnitSystem::Other)?,
    )?;
    Ok(())
}

fn mass(registries: &Registries) -> Result<()> {
    let r = registries.registry(MASS, DimensionVector::MASS)?;
    let kg = add(&r, linear("kg", "kilogram", &["kg"], 1.0, UnitSystem::SiBase)?)?;

    // Mass is prefixed from the gram; the generated `kg` loses to the
    // authored one.
    let g = kg.derive("g", "g", "gram", 1e-3, UnitSystem::SiBase)?;
    g.generate_si_prefixes(true, true, 1.0)?;

    add(&r, linear("t", "tonne", &["t"], 1e3, UnitSystem::SiAccepted)?)?;
    add(&r, linear("lb", "pound", &["lb", "lbs"], 0.453_592_37, UnitSystem::Imperial)?)?;
    add(&r, linear("oz", "ounce", &["oz"], 0.028_349_523_125, UnitSystem::Imperial)?)?;
    add(&r, linear("st", "stone", &["st"], 6.350_293_18, UnitSystem::Imperial)?)?;
    Ok(())
}

fn time(registries: &Registries) -> Result<()> {
    let r = registries.registry(TIME, DimensionVector::TIME)?;
    let s = add(&r, linear("s", "second", &["s", "sec"], 1.0, UnitSystem::SiBase)?)?;
    // `h` and `d` are hour and day, so only sub-second prefixes apply.
    s.generate_si_prefixes(true, false, 1.0)?;

    add(&r, linear("min", "minute", &["min"], 60.0, UnitSystem::SiAccepted)?)?;
    add(&r, linear("h", "hour", &["h", "hr"], 3_600.0, UnitSystem::SiAccepted)?)?;
    add(&r, linear("d", "day", &["d", "day"], 86_400.0, UnitSystem::SiAccepted)?)?;
    add(&r, linear("wk", "week", &["wk"], 604_800.0, UnitSystem::Other)?)?;
    add(&r, linear("a", "julian year", &["a", "yr"], 31_557_600.0, UnitSystem::Other)?)?;
    Ok(())
}

fn speed(registries: &Registries) -> Result<()> {
    let r = registries.registry(SPEED, DimensionVector::LENGTH / DimensionVector::TIME)?;
    let mps = add(
        &r,
        linear("m/s", "metre per second", &["m/s"], 1.0, UnitSystem::SiDerived)?,
    )?;

    add(
        &r,
        mps.derived("km/h", 1_000.0 / 3_600.0)?
            .name("kilometre per hour")
            .abbreviations(["km/h", "kph"])
            .system(UnitSystem::SiAccepted),
    )?;
    add(&r, linear("mph", "mile per hour", &["mph", "mi/h"], 0.447_04, UnitSystem::Imperial)?)?;
    add(&r, linear("kn", "knot", &["kn", "kt"], 1_852.0 / 3_600.0, UnitSystem::Other)?)?;
    add(&r, linear("ft/s", "foot per second", &["ft/s", "fps"], 0.3048, UnitSystem::Imperial)?)?;
    Ok(())
}

fn temperature(registries: &Registries) -> Result<()> {
    let r = registries.registry(TEMPERATURE, DimensionVector::TEMPERATURE)?;
    let k = add(&r, linear("K", "kelvin", &["K"], 1.0, UnitSystem::SiBase)?)?;
    k.generate_si_prefixes(true, true, 1.0)?;

    add(
        &r,
        UnitBuilder::new("°C")
            .name("degree Celsius")
            .abbreviations(["°C", "degC", "C"])
            .scale(Scale::offset_linear(1.0, 273.15)?)
            .system(UnitSystem::SiDerived),
    )?;
    add(
        &r,
        UnitBuilder::new("°F")
            .name("degree Fahrenheit")
            .abbreviations(["°F", "degF", "F"])
            .scale(Scale::offset_linear(5.0 / 9.0, 273.15 - 32.0 * 5.0 / 9.0)?)
            .system(UnitSystem::Imperial),
    )?;
    add(
        &r,
        linear("°R", "degree Rankine", &["°R", "degR", "R"], 5.0 / 9.0, UnitSystem::Imperial)?,
    )?;
    Ok(())
}

fn angle(registries: &Registries) -> Result<()> {
    let r = registries.registry(ANGLE, DimensionVector::PLANE_ANGLE)?;
    let rad = add(&r, linear("rad", "radian", &["rad"], 1.0, UnitSystem::SiDerived)?)?;
    rad.generate_si_prefixes(true, false, 1.0)?;

    add(&r, linear("°", "degree", &["°", "deg"], PI / 180.0, UnitSystem::SiAccepted)?)?;
    add(
        &r,
        linear("′", "arcminute", &["′", "'", "arcmin"], PI / 10_800.0, UnitSystem::SiAccepted)?,
    )?;
    add(
        &r,
        linear("″", "arcsecond", &["″", "\"", "arcsec"], PI / 648_000.0, UnitSystem::SiAccepted)?,
    )?;
    add(&r, linear("gon", "gradian", &["gon", "grad"], PI / 200.0, UnitSystem::Other)?)?;
    add(&r, linear("rev", "revolution", &["rev", "turn"], 2.0 * PI, UnitSystem::Other)?)?;
    add(
        &r,
        UnitBuilder::new("%")
            .name("percent grade")
            .abbreviations(["%", "percent"])
            .scale(Scale::grade())
            .system(UnitSystem::Other),
    )?;
    Ok(())
}

fn area(registries: &Registries) -> Result<()> {
    let r = registries.registry(AREA, DimensionVector::LENGTH.powi(2))?;
    let m2 = add(
        &r,
        linear("m²", "square metre", &["m²", "m2"], 1.0, UnitSystem::SiDerived)?,
    )?;
    m2.generate_si_prefixes(true, true, 2.0)?;

    add(&r, linear("ha", "hectare", &["ha"], 1e4, UnitSystem::SiAccepted)?)?;
    add(&r, linear("ac", "acre", &["ac"], 4_046.856_422_4, UnitSystem::Imperial)?)?;
    add(
        &r,
        linear("ft²", "square foot", &["ft²", "ft2", "sq ft"], 0.092_903_04, UnitSystem::Imperial)?,
    )?;
    add(
        &r,
        linear("in²", "square inch", &["in²", "in2", "sq in"], 0.000_645_16, UnitSystem::Imperial)?,
    )?;
    add(
        &r,
        linear("mi²", "square mile", &["mi²", "mi2", "sq mi"], 2_589_988.110_336, UnitSystem::Imperial)?,
    )?;
    Ok(())
}

fn volume(registries: &Registries) -> Result<()> {
    let r = registries.registry(VOLUME, DimensionVector::LENGTH.powi(3))?;
    let m3 = add(
        &r,
        linear("m³", "cubic metre", &["m³", "m3"], 1.0, UnitSystem::SiDerived)?,
    )?;
    m3.generate_si_prefixes(true, true, 3.0)?;

    let l = add(&r, linear("L", "litre", &["L", "l"], 1e-3, UnitSystem::SiAccepted)?)?;
    l.generate_si_prefixes(true, true, 1.0)?;

    add(&r, linear("gal", "US gallon", &["gal"], 0.003_785_411_784, UnitSystem::UsCustomary)?)?;
    add(&r, linear("qt", "US quart", &["qt"], 0.000_946_352_946, UnitSystem::UsCustomary)?)?;
    add(&r, linear("pt", "US pint", &["pt"], 0.000_473_176_473, UnitSystem::UsCustomary)?)?;
    add(
        &r,
        linear("fl oz", "US fluid ounce", &["fl oz", "floz"], 2.957_352_956_25e-5, UnitSystem::UsCustomary)?,
    )?;
    Ok(())
}

fn energy(registries: &Registries) -> Result<()> {
    let dimension = DimensionVector::MASS * DimensionVector::LENGTH.powi(2) / DimensionVector::TIME.powi(2);
    let r = registries.registry(ENERGY, dimension)?;
    let j = add(&r, linear("J", "joule", &["J"], 1.0, UnitSystem::SiDerived)?)?;
    j.generate_si_prefixes(true, true, 1.0)?;

    let wh = add(&r, linear("Wh", "watt-hour", &["Wh"], 3_600.0, UnitSystem::SiAccepted)?)?;
    wh.generate_si_prefixes(false, true, 1.0)?;
    let ev = add(&r, linear("eV", "electronvolt", &["eV"], 1.602_176_634e-19, UnitSystem::SiAccepted)?)?;
    ev.generate_si_prefixes(false, true, 1.0)?;
    let cal = add(&r, linear("cal", "calorie", &["cal"], 4.184, UnitSystem::Other)?)?;
    cal.generate_si_prefixes(false, true, 1.0)?;

    add(&r, linear("BTU", "British thermal unit", &["BTU", "Btu"], 1_055.055_852_62, UnitSystem::Imperial)?)?;
    add(&r, linear("erg", "erg", &["erg"], 1e-7, UnitSystem::Cgs)?)?;
    Ok(())
}

fn power(registries: &Registries) -> Result<()> {
    let dimension = DimensionVector::MASS * DimensionVector::LENGTH.powi(2) / DimensionVector::TIME.powi(3);
    let r = registries.registry(POWER, dimension)?;
    let w = add(&r, linear("W", "watt", &["W"], 1.0, UnitSystem::SiDerived)?)?;
    w.generate_si_prefixes(true, true, 1.0)?;

    add(&r, linear("hp", "horsepower", &["hp"], 745.699_871_582_270_2, UnitSystem::Imperial)?)?;
    add(&r, linear("PS", "metric horsepower", &["PS"], 735.498_75, UnitSystem::Other)?)?;
    add(&r, linear("BTU/h", "BTU per hour", &["BTU/h"], 0.293_071_070_17, UnitSystem::Imperial)?)?;
    Ok(())
}

fn pressure(registries: &Registries) -> Result<()> {
    let dimension = DimensionVector::MASS / (DimensionVector::LENGTH * DimensionVector::TIME.powi(2));
    let r = registries.registry(PRESSURE, dimension)?;
    let pa = add(&r, linear("Pa", "pascal", &["Pa"], 1.0, UnitSystem::SiDerived)?)?;
    pa.generate_si_prefixes(true, true, 1.0)?;

    let bar = add(&r, linear("bar", "bar", &["bar"], 1e5, UnitSystem::Other)?)?;
    bar.generate_si_prefixes(true, true, 1.0)?;
    add(&r, linear("atm", "standard atmosphere", &["atm"], 101_325.0, UnitSystem::Other)?)?;
    add(&r, linear("psi", "pound per square inch", &["psi"], 6_894.757_293_168_361, UnitSystem::Imperial)?)?;
    add(&r, linear("mmHg", "millimetre of mercury", &["mmHg"], 133.322_387_415, UnitSystem::Other)?)?;
    add(&r, linear("Torr", "torr", &["Torr"], 101_325.0 / 760.0, UnitSystem::Other)?)?;
    Ok(())
}

fn frequency(registries: &Registries) -> Result<()> {
    let r = registries.registry(FREQUENCY, DimensionVector::TIME.recip())?;
    let hz = add(&r, linear("Hz", "hertz", &["Hz"], 1.0, UnitSystem::SiDerived)?)?;
    hz.generate_si_prefixes(true, true, 1.0)?;
    add(&r, linear("rpm", "revolution per minute", &["rpm"], 1.0 / 60.0, UnitSystem::Other)?)?;
    Ok(())
}

fn force(registries: &Registries) -> Result<()> {
    let dimension = DimensionVector::MASS * DimensionVector::LENGTH / DimensionVector::TIME.powi(2);
    let r = registries.registry(FORCE, dimension)?;
    let n = add(&r, linear("N", "newton", &["N"], 1.0, UnitSystem::SiDerived)?)?;
    n.generate_si_prefixes(true, true, 1.0)?;
    add(&r, linear("lbf", "pound-force", &["lbf"], 4.448_221_615_260_5, UnitSystem::Imperial)?)?;
    add(&r, linear("dyn", "dyne", &["dyn"], 1e-5, UnitSystem::Cgs)?)?;
    Ok(())
}

fn ratio(registries: &Registries) -> Result<()> {
    let r = registries.registry(RATIO, DimensionVector::ZERO)?;
    add(
        &r,
        UnitBuilder::new("ratio")
            .name("ratio")
            .abbreviations(["", "ratio"])
            .display("")
            .system(UnitSystem::SiDerived),
    )?;
    add(&r, linear("pct", "percent", &["%", "pct"], 1e-2, UnitSystem::Other)?.display("%"))?;
    add(&r, linear("‰", "per mille", &["‰"], 1e-3, UnitSystem::Other)?)?;
    add(&r, linear("ppm", "parts per million", &["ppm"], 1e-6, UnitSystem::Other)?)?;
    add(&r, linear("ppb", "parts per billion", &["ppb"], 1e-9, UnitSystem::Other)?)?;
    Ok(())
}
