//! Property-based tests using QuickCheck

use mensura_units::{DimensionOp, DimensionVector, Scale};
use quickcheck::{QuickCheck, TestResult};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

fn vector(exps: [i8; 9]) -> DimensionVector {
    // Keep exponents small so that combining never saturates.
    DimensionVector(exps.map(|e| e % 16))
}

/// Property: from_base(to_base(v)) == v for linear scales
#[test]
fn prop_linear_round_trip() {
    fn prop(value: f64, factor: f64) -> TestResult {
        if !value.is_finite() || value.abs() > 1e12 || !factor.is_finite() {
            return TestResult::discard();
        }
        let factor = factor.abs();
        if !(1e-6..=1e6).contains(&factor) {
            return TestResult::discard();
        }
        let scale = Scale::linear(factor).unwrap();
        TestResult::from_bool(close(scale.from_base(scale.to_base(value)), value))
    }

    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(f64, f64) -> TestResult);
}

/// Property: from_base(to_base(v)) == v for affine scales
#[test]
fn prop_offset_linear_round_trip() {
    fn prop(value: i32, factor: u16, offset: i16) -> TestResult {
        if factor == 0 {
            return TestResult::discard();
        }
        let value = f64::from(value) / 100.0;
        let scale =
            Scale::offset_linear(f64::from(factor) / 1000.0, f64::from(offset) / 10.0).unwrap();
        TestResult::from_bool(close(scale.from_base(scale.to_base(value)), value))
    }

    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(i32, u16, i16) -> TestResult);
}

/// Property: Multiply is commutative
#[test]
fn prop_combine_commutative() {
    fn prop(left: (i8, i8, i8, i8, i8, i8), right: (i8, i8, i8)) -> bool {
        let (kg, m, s, k, rad, sr) = left;
        let (x, y, z) = right;
        let a = vector([kg, m, s, 0, k, 0, 0, rad, sr]);
        let b = vector([x, y, z, x, 0, y, z, 0, 0]);
        a.combine(&b, DimensionOp::Multiply) == b.combine(&a, DimensionOp::Multiply)
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn((i8, i8, i8, i8, i8, i8), (i8, i8, i8)) -> bool);
}

/// Property: Multiply is associative and Divide undoes it
#[test]
fn prop_combine_associative() {
    fn prop(seed: (i8, i8, i8, i8, i8, i8)) -> bool {
        let (x, y, z, u, v, w) = seed;
        let a = vector([x, y, z, 0, 1, 0, 0, 0, 0]);
        let b = vector([u, v, w, 1, 0, 0, 0, 0, 0]);
        let c = vector([w, x, u, 0, 0, 0, 0, 2, -1]);

        let left = a.combine(&b, DimensionOp::Multiply).combine(&c, DimensionOp::Multiply);
        let right = a.combine(&b.combine(&c, DimensionOp::Multiply), DimensionOp::Multiply);
        let undone = (a * b) / b;
        left == right && undone == a
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn((i8, i8, i8, i8, i8, i8)) -> bool);
}

/// Property: the canonical string parses back to the same vector
#[test]
fn prop_canonical_string_parses_back() {
    fn prop(seed: (i8, i8, i8, i8, i8)) -> bool {
        let (kg, m, s, a, rad) = seed;
        let d = vector([kg, m, s, a, 0, 0, 0, rad, 0]);
        DimensionVector::parse(&d.to_canonical_string()) == Ok(d)
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn((i8, i8, i8, i8, i8)) -> bool);
}
