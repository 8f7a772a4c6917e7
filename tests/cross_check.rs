//! End-to-end checks against known-correct IEEE-754 bit patterns and
//! cross-format behavior, as opposed to the unit tests alongside each
//! module, which exercise one routine's internals in isolation.

use softfp::{CompareOp, Format, SoftFloat};

fn bits64(v: SoftFloat) -> u64 {
    let (b, _) = v.to_wire();
    (b[1] as u64) << 32 | b[0] as u64
}

#[test]
fn decimal_literals_match_known_bit_patterns() {
    assert_eq!(bits64(SoftFloat::parse("1.0", Format::Binary64).unwrap()), 0x3ff0_0000_0000_0000);
    assert_eq!(bits64(SoftFloat::parse("0.1", Format::Binary64).unwrap()), 0x3fb9_9999_9999_999a);
    assert_eq!(bits64(SoftFloat::parse("-1.0", Format::Binary64).unwrap()), 0xbff0_0000_0000_0000);
    assert_eq!(bits64(SoftFloat::parse("2.0", Format::Binary64).unwrap()), 0x4000_0000_0000_0000);
}

#[test]
fn smallest_subnormal_binary64() {
    let v = SoftFloat::parse("4.9406564584124654e-324", Format::Binary64).unwrap();
    assert_eq!(bits64(v), 1);
}

#[test]
fn overflow_to_infinity_on_literal() {
    let v = SoftFloat::parse("1e400", Format::Binary64).unwrap();
    assert_eq!(bits64(v), 0x7ff0_0000_0000_0000);
}

#[test]
fn one_third_is_correctly_rounded() {
    let one = SoftFloat::from_int(1, false, Format::Binary64);
    let three = SoftFloat::from_int(3, false, Format::Binary64);
    let v = one.div(&three).cast(Format::Binary64);
    assert_eq!(bits64(v), 0x3fd5_5555_5555_5555);
}

#[test]
fn gradual_underflow_keeps_precision_near_the_bottom() {
    // The smallest normal binary64, halved, should land exactly on a
    // subnormal rather than collapsing straight to zero.
    let smallest_normal = SoftFloat::parse("2.2250738585072014e-308", Format::Binary64).unwrap();
    let two = SoftFloat::from_int(2, false, Format::Binary64);
    let halved = smallest_normal.div(&two).cast(Format::Binary64);
    assert_eq!(halved.classify(), softfp::Class::Subnormal);
    assert!(!halved.is_zero());
}

#[test]
fn nan_and_zero_comparison_semantics() {
    let nan = SoftFloat::nan(Format::Binary64, None);
    let zero = SoftFloat::from_int(0, false, Format::Binary64);
    let neg_zero = zero.neg();

    assert!(zero.compare(&neg_zero, CompareOp::Eq));
    assert!(!nan.compare(&nan, CompareOp::Eq));
    assert!(nan.compare(&nan, CompareOp::Ne));
    assert!(!zero.compare(&nan, CompareOp::Lt));
    assert!(!zero.compare(&nan, CompareOp::Ge));
}

#[test]
fn i64_min_round_trips_through_binary_x80() {
    let v = SoftFloat::from_int(i64::MIN, false, Format::BinaryX80);
    assert_eq!(v.to_int(), i64::MIN);
}

#[test]
fn cast_chain_widen_and_narrow() {
    let a = SoftFloat::parse("3.14159", Format::Binary32).unwrap();
    let widened = a.cast(Format::BinaryX80);
    let back = widened.cast(Format::Binary32);
    assert_eq!(a.to_wire().0, back.to_wire().0);
}

#[test]
fn hex_float_literal_matches_decimal_equivalent() {
    let hex = SoftFloat::parse("0x1.8p+1", Format::Binary64).unwrap();
    let dec = SoftFloat::parse("3.0", Format::Binary64).unwrap();
    assert_eq!(bits64(hex), bits64(dec));
}

#[test]
fn addition_respects_operand_magnitude_difference() {
    // Adding something far smaller than one ULP shouldn't move the result
    // at all once rounded back to binary64.
    let big = SoftFloat::parse("1e20", Format::Binary64).unwrap();
    let tiny = SoftFloat::parse("1.0", Format::Binary64).unwrap();
    let sum = big.add(&tiny).cast(Format::Binary64);
    assert_eq!(bits64(sum), bits64(big));
}
