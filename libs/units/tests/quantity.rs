use std::cmp::Ordering;
use std::f64::consts::FRAC_PI_4;
use std::sync::Arc;

use mensura_units::{
    catalog, Error, Locale, ParseError, QuantityRegistry, QuantityValue, Registries, ScanError,
};

fn installed() -> Registries {
    let registries = Registries::with_localizer(Arc::new(catalog::localizations()));
    catalog::install(&registries).unwrap();
    registries
}

fn locale(tag: &str) -> Locale {
    Locale::parse(tag).unwrap()
}

fn parse(registry: &Arc<QuantityRegistry>, text: &str) -> QuantityValue {
    QuantityValue::parse(text, registry, &Locale::invariant()).unwrap()
}

fn approx(actual: f64, expected: f64) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "{actual} != {expected}"
    );
}

#[test]
fn parses_speed_in_kilometres_per_hour() {
    let registries = installed();
    let speed = registries.require(catalog::SPEED).unwrap();
    let q = parse(&speed, "12.5 km/h");
    assert_eq!(q.value(), 12.5);
    assert_eq!(q.unit().id(), "km/h");
    approx(q.to_base(), 3.472_222_222_222_222);
    approx(q.to_standard().unwrap().value(), 3.472_222_222_222_222);
}

#[test]
fn temperature_scales_are_affine() {
    let registries = installed();
    let temperature = registries.require(catalog::TEMPERATURE).unwrap();
    let celsius = temperature.resolve_by_id("°C").unwrap();
    let fahrenheit = temperature.resolve_by_id("°F").unwrap();
    assert_eq!(celsius.to_base(0.0), 273.15);
    approx(fahrenheit.to_base(32.0), 273.15);

    let boiling = parse(&temperature, "100 °C");
    approx(boiling.convert_to(&fahrenheit).unwrap().value(), 212.0);
    approx(parse(&temperature, "-40 degF").convert_to(&celsius).unwrap().value(), -40.0);
    approx(parse(&temperature, "0 K").convert_to(&celsius).unwrap().value(), -273.15);
}

#[test]
fn grade_follows_the_slope_angle() {
    let registries = installed();
    let angle = registries.require(catalog::ANGLE).unwrap();
    let grade = angle.resolve_by_abbreviation("%").unwrap();

    approx(parse(&angle, "100 %").to_base(), FRAC_PI_4);
    approx(parse(&angle, "45°").convert_to(&grade).unwrap().value(), 100.0);

    let vertical = parse(&angle, "90 deg").convert_to(&grade).unwrap().value();
    assert!(vertical.is_infinite() || vertical > 1e15, "{vertical}");
    assert!(parse(&angle, "100 deg").convert_to(&grade).unwrap().value().is_infinite());
}

#[test]
fn mass_is_prefixed_from_the_gram() {
    let registries = installed();
    let mass = registries.require(catalog::MASS).unwrap();
    let kg = mass.resolve_by_abbreviation("kg").unwrap();
    assert!(!kg.is_generated());
    assert!(Arc::ptr_eq(&mass.standard_unit().unwrap(), &kg));

    approx(parse(&mass, "1 mg").to_base(), 1e-6);
    approx(parse(&mass, "2 t").to_base(), 2000.0);
    approx(parse(&mass, "1 lb").to_base(), 0.453_592_37);
}

#[test]
fn area_and_volume_prefixes_use_powers() {
    let registries = installed();
    let area = registries.require(catalog::AREA).unwrap();
    approx(parse(&area, "1 km²").to_base(), 1e6);
    approx(parse(&area, "3 cm2").to_base(), 3e-4);
    approx(parse(&area, "1 ha").to_base(), 1e4);

    let volume = registries.require(catalog::VOLUME).unwrap();
    let ml = parse(&volume, "1 mL");
    let cm3 = parse(&volume, "1 cm³");
    approx(ml.to_base(), cm3.to_base());
    approx(parse(&volume, "1 gal").convert_to(ml.unit()).unwrap().value(), 3785.411_784);
}

#[test]
fn time_only_has_sub_second_prefixes() {
    let registries = installed();
    let time = registries.require(catalog::TIME).unwrap();
    approx(parse(&time, "250 ms").to_base(), 0.25);
    approx(parse(&time, "1.5 h").to_base(), 5400.0);
    assert!(time.resolve_by_abbreviation("ks").is_none());
}

#[test]
fn locale_aware_parsing() {
    let registries = installed();
    let length = registries.require(catalog::LENGTH).unwrap();
    let speed = registries.require(catalog::SPEED).unwrap();

    let q = QuantityValue::parse("1.234,5 km", &length, &locale("de-DE")).unwrap();
    assert_eq!(q.value(), 1234.5);
    assert_eq!(q.unit().id(), "km");

    let q = QuantityValue::parse("12,5 км/ч", &speed, &locale("ru")).unwrap();
    assert_eq!(q.value(), 12.5);
    assert_eq!(q.unit().id(), "km/h");

    let q = QuantityValue::parse("3 Std", &registries.require(catalog::TIME).unwrap(), &locale("de-AT"))
        .unwrap();
    approx(q.to_base(), 10_800.0);
}

#[test]
fn format_uses_locale_separators_and_spellings() {
    let registries = installed();
    let speed = registries.require(catalog::SPEED).unwrap();
    let q = parse(&speed, "1234.5 km/h");

    assert_eq!(q.format(&Locale::invariant()), "1,234.5 km/h");
    assert_eq!(q.to_string(), "1,234.5 km/h");
    assert_eq!(q.format(&locale("de-DE")), "1.234,5 km/h");
    assert_eq!(q.format(&locale("ru")), "1\u{a0}234,5 км/ч");

    for tag in ["en-US", "de-DE", "fr-FR", "ru", "de-CH"] {
        let l = locale(tag);
        let back = QuantityValue::parse(&q.format(&l), &speed, &l).unwrap();
        assert_eq!(back.value(), q.value(), "{tag}");
        assert_eq!(back.unit().id(), "km/h", "{tag}");
    }
}

#[test]
fn parse_errors_carry_text_and_locale() {
    let registries = installed();
    let length = registries.require(catalog::LENGTH).unwrap();
    let de = locale("de-DE");

    assert!(matches!(
        QuantityValue::parse("   ", &length, &de),
        Err(ParseError::Empty)
    ));
    match QuantityValue::parse("km", &length, &de) {
        Err(ParseError::Malformed { text, locale, source }) => {
            assert_eq!(text, "km");
            assert_eq!(locale, de);
            assert_eq!(source, ScanError::NoDigits(0));
        }
        other => panic!("unexpected {other:?}"),
    }
    match QuantityValue::parse("12 furlongs", &length, &de) {
        Err(ParseError::UnknownUnit { unit, text, .. }) => {
            assert_eq!(unit, "furlongs");
            assert_eq!(text, "12 furlongs");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(
        QuantityValue::parse("12", &length, &de),
        Err(ParseError::UnknownUnit { ref unit, .. }) if unit.is_empty()
    ));
}

#[test]
fn bare_numbers_are_ratios() {
    let registries = installed();
    let ratio = registries.require(catalog::RATIO).unwrap();
    let q = parse(&ratio, "0.5");
    assert_eq!(q.unit().id(), "ratio");
    approx(parse(&ratio, "12 %").to_base(), 0.12);
    assert_eq!(q.to_string(), "0.5");
}

#[test]
fn conversion_checks_dimensions() {
    let registries = installed();
    let length = registries.require(catalog::LENGTH).unwrap();
    let time = registries.require(catalog::TIME).unwrap();
    let seconds = time.standard_unit().unwrap();

    let q = parse(&length, "3 ft");
    assert!(matches!(
        q.convert_to(&seconds),
        Err(Error::IncompatibleDimensions { .. })
    ));
    let inches = q.convert_to_abbreviation("in", &Locale::invariant()).unwrap();
    approx(inches.value(), 36.0);
    assert!(q
        .convert_to_abbreviation("parsec", &Locale::invariant())
        .is_err());
}

#[test]
fn arithmetic_stays_in_the_left_unit() {
    let registries = installed();
    let length = registries.require(catalog::LENGTH).unwrap();
    let km = parse(&length, "1 km");
    let m = parse(&length, "500 m");

    let sum = km.add(&m).unwrap();
    assert_eq!(sum.unit().id(), "km");
    approx(sum.value(), 1.5);
    approx(m.sub(&km).unwrap().value(), -500.0);
    approx(km.scale(3.0).to_base(), 3000.0);

    assert_eq!(km.compare(&m).unwrap(), Some(Ordering::Greater));
    assert!(parse(&length, "1 mi") > km);
    assert_eq!(parse(&length, "1000 m"), km);

    let time = registries.require(catalog::TIME).unwrap();
    assert!(km.add(&parse(&time, "1 s")).is_err());
}

#[test]
fn products_and_quotients_land_in_target_dimension() {
    let registries = installed();
    let length = registries.require(catalog::LENGTH).unwrap();
    let time = registries.require(catalog::TIME).unwrap();
    let area = registries.require(catalog::AREA).unwrap();
    let speed = registries.require(catalog::SPEED).unwrap();

    let a = parse(&length, "2 m").multiply_into(&parse(&length, "3 km"), &area).unwrap();
    assert_eq!(a.unit().id(), "m²");
    approx(a.value(), 6000.0);

    let v = parse(&length, "100 km").divide_into(&parse(&time, "2 h"), &speed).unwrap();
    let kmh = speed.resolve_by_id("km/h").unwrap();
    approx(v.convert_to(&kmh).unwrap().value(), 50.0);

    assert!(matches!(
        parse(&length, "2 m").divide_into(&parse(&time, "1 s"), &area),
        Err(Error::IncompatibleDimensions { .. })
    ));
}

#[test]
fn catalog_is_installed_once() {
    let registries = installed();
    assert!(catalog::install(&registries).is_err());
    assert_eq!(registries.names().len(), 14);
    assert_eq!(
        registries
            .by_dimension(&registries.require(catalog::ENERGY).unwrap().dimension())
            .len(),
        1
    );
}

#[test]
fn process_wide_registries_have_the_catalog() {
    let length = mensura_units::registries().require(catalog::LENGTH).unwrap();
    assert_eq!(length.standard_unit().unwrap().id(), "m");
    let hits = mensura_units::registries().resolve("%", &Locale::invariant());
    assert_eq!(hits.len(), 2);
}
