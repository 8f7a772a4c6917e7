//! Round-to-nearest-even and the normalize/pack step shared by every target
//! format.
//!
//! Every arithmetic kernel operation produces a raw `(exponent, mantissa)`
//! pair at whatever bit width its own bookkeeping left it at — a product can
//! be twice as wide as either factor, a sum can have grown or shrunk by a
//! bit from a carry or a cancellation. [`normalize`] is the one place that
//! raw pair gets forced down to a target format's exact width, rounding
//! correctly and catching overflow to infinity and underflow to a subnormal
//! (or zero) along the way. [`grs_round`] is the same rounding step alone,
//! for division, which has already done its own overflow/underflow
//! reasoning by the time it needs to round.
//!
//! Both keep [`RNDBIT`] extra low bits below the target width while they
//! work, then collapse those bits with guard/round/sticky logic: the guard
//! bit decides whether we're above, below, or exactly at the halfway point,
//! and the sticky bit (the OR of everything below the guard bit) breaks the
//! "exactly at" case away from a true tie. A true tie rounds to whichever
//! neighbor has an even low bit.

use crate::bigint::BigUint;
use crate::format::{Class, Format, RNDBIT};

/// Collapse the low `extra_bits` bits of `m` using round-to-nearest-even,
/// leaving `m` at `extra_bits` fewer bits. A carry out of the top can grow
/// `m` by one bit past where it started; callers that care (the maxexp
/// overflow check in [`normalize`]) have already ruled that out before
/// calling this, and callers that don't (everyone narrowing into a wire
/// format) rely on that growth carrying straight into the exponent field
/// the way `Format::pack` composes it.
fn round_half_to_even(m: &mut BigUint, extra_bits: u32) {
    if extra_bits == 0 {
        return;
    }
    let guard = m.bit(extra_bits - 1);
    let sticky = if extra_bits > 1 {
        let mut low = m.clone();
        low.shr(extra_bits - 1, true);
        low.bit(0)
    } else {
        false
    };
    m.shr(extra_bits, false);
    if guard && (sticky || m.bit(0)) {
        *m = m.add(&BigUint::from_u16(1));
    }
}

/// Slide `m`'s top bit to sit exactly `RNDBIT` bits above `bno`, the target
/// format's hidden-bit position. Shifting left is exact; shifting right
/// folds the bits it drops into the new bit 0 (sticky), so nothing below
/// the guard bit is lost before rounding gets a chance to look at it.
fn align_to_guard_distance(m: &mut BigUint, bno: u32) {
    let t = m.topbit();
    let bno = bno as i64;
    let dist = t as i64 - bno;
    match dist.cmp(&(RNDBIT as i64)) {
        std::cmp::Ordering::Less => m.shl((RNDBIT as i64 - dist) as u32),
        std::cmp::Ordering::Greater => m.shr((dist - RNDBIT as i64) as u32, true),
        std::cmp::Ordering::Equal => {}
    }
}

/// Round `m` using half-to-even, same as [`normalize`]'s final step but
/// without any of the overflow/underflow reclassification: the caller (only
/// division) has already worked out the result's class and exponent from
/// its own quotient/remainder bookkeeping and just needs the combined
/// quotient mantissa rounded down to `RNDBIT` guard bits before handing it
/// to `Format::pack`.
pub fn grs_round(fmt: Format, m: &mut BigUint) {
    let bno = fmt.descriptor().nbits - 1;
    align_to_guard_distance(m, bno);
    round_half_to_even(m, RNDBIT);
}

/// Force a raw `(exponent, mantissa)` pair to the shape `fmt` expects,
/// rounding to nearest-even and reclassifying as needed:
///
/// - `exponent > fmt.maxexp`, or rounding would carry the mantissa past the
///   top of the exponent range: `Class::Infinite`.
/// - `exponent < fmt.minexp`: shift the mantissa down by the shortfall
///   (losing precision gracefully into the sticky bit, per gradual
///   underflow) and report `Class::Subnormal`. A round-up that fills the
///   mantissa back out to a full `nbits` bits is left alone here — the
///   value is still reported as `Class::Subnormal`, and `Format::pack`'s bit
///   layout for that class promotes it to the smallest normal value on its
///   own, the same way the exponent field picks up a carry in the ordinary
///   normal case.
/// - rounding collapses the mantissa to zero: `Class::Zero`.
/// - otherwise: `Class::Normal`, with `exponent` unchanged from what was
///   passed in (the caller is responsible for having already worked out the
///   exponent that goes with this magnitude of mantissa; normalizing only
///   ever changes the mantissa's bit width, never what exponent means it).
pub fn normalize(fmt: Format, exponent: i32, mut mantissa: BigUint) -> (Class, i32, BigUint) {
    if mantissa.is_zero() {
        return (Class::Zero, 0, BigUint::zero());
    }
    let desc = fmt.descriptor();
    let bno = desc.nbits - 1;

    align_to_guard_distance(&mut mantissa, bno);

    let mut issub = false;
    if exponent < desc.minexp {
        mantissa.shr((desc.minexp - exponent) as u32, true);
        issub = true;
    } else if exponent >= desc.maxexp {
        if exponent > desc.maxexp {
            return (Class::Infinite, 0, BigUint::zero());
        }
        let half_ulp = BigUint::from_u64(1u64 << (RNDBIT - 1));
        let bumped = mantissa.add(&half_ulp);
        if bumped.topbit() == mantissa.topbit() + 1 {
            return (Class::Infinite, 0, BigUint::zero());
        }
    }

    round_half_to_even(&mut mantissa, RNDBIT);

    if mantissa.is_zero() {
        (Class::Zero, 0, BigUint::zero())
    } else if issub {
        (Class::Subnormal, exponent, mantissa)
    } else {
        (Class::Normal, exponent, mantissa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_value_round_trips() {
        // 1.0 in binary32: mantissa is exactly the hidden bit, nothing to round.
        let m = BigUint::from_u16(1);
        let mut wide = m.clone();
        wide.shl(23);
        let (class, exp, mant) = normalize(Format::Binary32, 0, wide);
        assert_eq!(class, Class::Normal);
        assert_eq!(exp, 0);
        assert_eq!(mant.to_u64(), 1u64 << 23);
    }

    #[test]
    fn exact_tie_rounds_to_even_neighbor() {
        // topbit 33 sits exactly RNDBIT (10) bits above binary32's bno
        // (23), so normalize's alignment step is a no-op here and these
        // bit positions survive straight through to the round step.
        let base = 1u64 << 33;

        // Kept bit0 (pre-shift bit 10) is 1 (odd), guard (bit 9) is 1, no
        // sticky below it: an exact tie, rounds up to the even neighbor.
        let odd_with_tie = BigUint::from_u64(base | (1 << 10) | (1 << 9));
        let (class, _, rounded) = normalize(Format::Binary32, 0, odd_with_tie);
        assert_eq!(class, Class::Normal);
        assert_eq!(rounded.to_u64(), (1u64 << 23) | 0b10);

        // Same guard bit, but the kept bit0 is already even: the tie stays.
        let even_with_tie = BigUint::from_u64(base | (1 << 9));
        let (_, _, rounded) = normalize(Format::Binary32, 0, even_with_tie);
        assert_eq!(rounded.to_u64(), 1u64 << 23);
    }

    #[test]
    fn overflow_to_infinity_at_max_exponent() {
        // All-ones mantissa at the top exponent rounds up past the top of
        // the exponent range.
        let mut mant = BigUint::zero();
        for _ in 0..34 {
            mant.shl(1);
            mant = mant.add(&BigUint::from_u16(1));
        }
        let (class, _, _) = normalize(Format::Binary32, 127, mant);
        assert_eq!(class, Class::Infinite);
    }

    #[test]
    fn underflow_reports_subnormal_with_minexp() {
        let mut mant = BigUint::from_u16(1);
        mant.shl(23);
        let (class, exp, _) = normalize(Format::Binary32, -130, mant);
        assert_eq!(class, Class::Subnormal);
        assert_eq!(exp, -130);
    }

    #[test]
    fn underflow_past_bottom_collapses_to_zero() {
        let mut mant = BigUint::from_u16(1);
        mant.shl(23);
        let (class, _, _) = normalize(Format::Binary32, -500, mant);
        assert_eq!(class, Class::Zero);
    }

    #[test]
    fn grs_round_narrows_without_reclassifying() {
        let mut mant = BigUint::from_u16(1);
        mant.shl(30);
        grs_round(Format::Binary32, &mut mant);
        assert_eq!(mant.to_u64(), 1u64 << 23);
    }
}
