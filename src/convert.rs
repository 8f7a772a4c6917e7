//! Conversions between `SoftFloat` and native integers, and between formats.

use crate::bigint::BigUint;
use crate::format::{Class, Format};
use crate::SoftFloat;

impl SoftFloat {
    /// Convert a native integer to the nearest representable value in
    /// `format`, rounding to nearest-even if the integer needs more bits
    /// than the format's mantissa holds. `is_unsigned` says whether `value`
    /// should be read as signed or as bits of an unsigned quantity.
    ///
    /// Decodes at [`Format::working`] precision first and narrows via
    /// [`SoftFloat::cast`], same as every other operation in this crate —
    /// there's no need for a format-specific fast path here.
    pub fn from_int(value: i64, is_unsigned: bool, format: Format) -> SoftFloat {
        let (sign, magnitude) = if is_unsigned {
            (false, value as u64)
        } else if value < 0 {
            // `i64::unsigned_abs` handles `i64::MIN` correctly (no overflow),
            // unlike a plain negate-then-cast.
            (true, value.unsigned_abs())
        } else {
            (false, value as u64)
        };

        let working = Format::working();
        if magnitude == 0 {
            let bits = working.pack(Class::Zero, false, 0, BigUint::zero());
            return SoftFloat { format: working, bits }.cast(format);
        }

        let exponent = 63 - magnitude.leading_zeros() as i32;
        let bits = working.pack(Class::Normal, sign, exponent, BigUint::from_u64(magnitude));
        SoftFloat { format: working, bits }.cast(format)
    }

    /// Truncate toward zero. Infinities, NaNs, and zero all convert to `0`.
    pub fn to_int(&self) -> i64 {
        let wide = self.cast(Format::working());
        let desc = Format::working().descriptor();
        let bno = (desc.nbits - 1) as i32;
        let (class, sign, exponent, mantissa) = Format::working().unpack(&wide.bits);
        if matches!(class, Class::Nan | Class::Infinite | Class::Zero) {
            return 0;
        }

        // `value == mantissa * 2^(exponent - bno)`: shift the other way to
        // recover an integer, losing any fractional bits (truncation).
        let shift = exponent - bno;
        let raw = mantissa.to_u64();
        let magnitude = if shift >= 0 {
            if shift >= 64 {
                0
            } else {
                raw.wrapping_shl(shift as u32)
            }
        } else if -shift >= 64 {
            0
        } else {
            raw >> (-shift) as u32
        };

        if sign {
            (magnitude as i64).wrapping_neg()
        } else {
            magnitude as i64
        }
    }

    /// Re-encode `self` in a different format, rounding to nearest-even if
    /// narrowing loses precision, or widening exactly if not.
    pub fn cast(&self, format: Format) -> SoftFloat {
        if format == self.format {
            return *self;
        }
        let (class, sign, exponent, mantissa) = self.format.unpack(&self.bits);
        let bits = format.pack(class, sign, exponent, mantissa);
        SoftFloat { format, bits }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_int_zero_is_positive_zero() {
        let z = SoftFloat::from_int(0, false, Format::Binary64);
        assert_eq!(z.classify(), Class::Zero);
        assert!(!z.is_negative());
    }

    #[test]
    fn from_int_min_i64_round_trips_through_unsigned_abs() {
        let v = SoftFloat::from_int(i64::MIN, false, Format::Binary64);
        assert_eq!(v.to_int(), i64::MIN);
    }

    #[test]
    fn from_int_and_back_small_values() {
        for n in [1i64, -1, 42, -42, 1_000_000, i32::MAX as i64] {
            let v = SoftFloat::from_int(n, false, Format::BinaryX80);
            assert_eq!(v.to_int(), n);
        }
    }

    #[test]
    fn cast_widen_then_narrow_is_exact_for_representable_values() {
        let v = SoftFloat::from_int(3, false, Format::Binary32);
        let widened = v.cast(Format::BinaryX80);
        let back = widened.cast(Format::Binary32);
        assert_eq!(back.to_wire(), v.to_wire());
    }

    #[test]
    fn to_int_of_nan_and_infinity_is_zero() {
        assert_eq!(SoftFloat::nan(Format::Binary64, None).to_int(), 0);
        assert_eq!(SoftFloat::infinity(Format::Binary64, false).to_int(), 0);
    }
}
