//! The arithmetic kernel: negation, the four basic operations, comparison,
//! and classification. Every binary operation is carried out at
//! [`Format::working`] precision regardless of the operands' formats, and
//! hands back a value in that same working format — callers narrow with
//! [`SoftFloat::cast`] once they're done combining a chain of operations,
//! the same strategy that gets double rounding right for free.

use crate::bigint::{signed_add, BigUint};
use crate::format::{Class, Format};
use crate::{CompareOp, SoftFloat};

impl SoftFloat {
    /// Flip the sign bit in place, in whatever format `self` is already in.
    /// No rounding is possible, so unlike every other operation here this
    /// doesn't go through `working` precision at all.
    pub fn neg(&self) -> SoftFloat {
        let mut bits = self.bits;
        match self.format {
            Format::Binary32 => bits[0] ^= 1 << 31,
            Format::Binary64 => bits[1] ^= 1 << 31,
            Format::BinaryX80 => bits[2] ^= 1 << 15,
            Format::Binary16 | Format::Binary128 => unreachable!(),
        }
        SoftFloat { format: self.format, bits }
    }

    /// `self + other`.
    pub fn add(&self, other: &SoftFloat) -> SoftFloat {
        let working = Format::working();
        let (c1, s1, e1, m1) = working.unpack(&self.cast(working).bits);
        let (c2, s2, e2, m2) = working.unpack(&other.cast(working).bits);
        let (class, sign, exponent, mantissa) = add_kernel(working, c1, s1, e1, m1, c2, s2, e2, m2);
        SoftFloat { format: working, bits: working.pack(class, sign, exponent, mantissa) }
    }

    /// `self - other`.
    pub fn sub(&self, other: &SoftFloat) -> SoftFloat {
        self.add(&other.neg())
    }

    /// `self * other`.
    pub fn mul(&self, other: &SoftFloat) -> SoftFloat {
        let working = Format::working();
        let (c1, s1, e1, m1) = working.unpack(&self.cast(working).bits);
        let (c2, s2, e2, m2) = working.unpack(&other.cast(working).bits);
        let (class, sign, exponent, mantissa) = mul_kernel(working, c1, s1, e1, m1, c2, s2, e2, m2);
        SoftFloat { format: working, bits: working.pack(class, sign, exponent, mantissa) }
    }

    /// `self / other`.
    pub fn div(&self, other: &SoftFloat) -> SoftFloat {
        let working = Format::working();
        let (c1, s1, e1, m1) = working.unpack(&self.cast(working).bits);
        let (c2, s2, e2, m2) = working.unpack(&other.cast(working).bits);
        let (class, sign, exponent, mantissa) = div_kernel(working, c1, s1, e1, m1, c2, s2, e2, m2);
        SoftFloat { format: working, bits: working.pack(class, sign, exponent, mantissa) }
    }

    /// Evaluate one of the six IEEE relational operators. A NaN operand
    /// makes every comparison `false`, except `Ne`, which is `true`
    /// whenever `Eq` would be `false`.
    pub fn compare(&self, other: &SoftFloat, op: CompareOp) -> bool {
        let working = Format::working();
        let (c1, s1, e1, m1) = working.unpack(&self.cast(working).bits);
        let (c2, s2, e2, m2) = working.unpack(&other.cast(working).bits);

        if c1 == Class::Nan || c2 == Class::Nan {
            return op == CompareOp::Ne;
        }

        let eq = cmp_eq(c1, c2, s1, s2, e1, e2, &m1, &m2);
        match op {
            CompareOp::Eq => eq,
            CompareOp::Ne => !eq,
            CompareOp::Lt => !eq && cmp_gl(c1, c2, s1, s2, e1, e2, &m1, &m2, true),
            CompareOp::Le => eq || cmp_gl(c1, c2, s1, s2, e1, e2, &m1, &m2, true),
            CompareOp::Gt => !eq && cmp_gl(c1, c2, s1, s2, e1, e2, &m1, &m2, false),
            CompareOp::Ge => eq || cmp_gl(c1, c2, s1, s2, e1, e2, &m1, &m2, false),
        }
    }

    /// The value's IEEE class, distinguishing true subnormals from normals
    /// (unlike the coarse internal classifier this crate's arithmetic kernel
    /// uses, which only needs to tell Nan/Infinite/Zero from "proceed with
    /// the general case").
    pub fn classify(&self) -> Class {
        self.format.classify(&self.bits)
    }

    pub fn is_zero(&self) -> bool {
        self.classify() == Class::Zero
    }

    /// The sign bit, independent of class — true for a negative number,
    /// negative zero, or negative infinity.
    pub fn is_negative(&self) -> bool {
        match self.format {
            Format::Binary32 => (self.bits[0] >> 31) & 1 != 0,
            Format::Binary64 => (self.bits[1] >> 31) & 1 != 0,
            Format::BinaryX80 => (self.bits[2] >> 15) & 1 != 0,
            Format::Binary16 | Format::Binary128 => unreachable!(),
        }
    }

    /// Build a signed infinity directly, without going through arithmetic
    /// that happens to overflow.
    pub fn infinity(format: Format, negative: bool) -> SoftFloat {
        let bits = format.pack(Class::Infinite, negative, 0, BigUint::zero());
        SoftFloat { format, bits }
    }

    /// Build a quiet NaN. The payload isn't threaded through this crate's
    /// narrow/widen paths (there's nothing downstream that inspects it), so
    /// it's accepted and ignored rather than wired up half-way.
    pub fn nan(format: Format, _payload: Option<u64>) -> SoftFloat {
        let bits = format.pack(Class::Nan, false, 0, BigUint::zero());
        SoftFloat { format, bits }
    }
}

/// `x1 + x2`'s class/sign/exponent/mantissa, all four already unpacked at
/// working precision.
fn add_kernel(
    working: Format,
    c1: Class,
    s1: bool,
    e1: i32,
    m1: BigUint,
    c2: Class,
    s2: bool,
    e2: i32,
    m2: BigUint,
) -> (Class, bool, i32, BigUint) {
    if c1 == Class::Nan || c2 == Class::Nan {
        return (Class::Nan, false, 0, BigUint::zero());
    }
    if c1 == Class::Infinite && c2 == Class::Infinite {
        return if s1 != s2 {
            (Class::Nan, false, 0, BigUint::zero())
        } else {
            (Class::Infinite, s1, 0, BigUint::zero())
        };
    }
    if c1 == Class::Infinite {
        return (Class::Infinite, s1, 0, BigUint::zero());
    }
    if c2 == Class::Infinite {
        return (Class::Infinite, s2, 0, BigUint::zero());
    }

    let bno = (working.descriptor().nbits - 1) as i32;
    let ediff = e1 - e2;
    // Operands too far apart in magnitude for the smaller one to affect the
    // rounded result at all: the bigger one wins outright.
    if ediff > bno + 2 {
        return (c1, s1, e1, m1);
    }
    if ediff < -(bno + 2) {
        return (c2, s2, e2, m2);
    }

    let (wide1, wide2, mtop, base_exp) = if e1 > e2 {
        let mut w1 = m1;
        w1.shl(ediff as u32);
        (w1, m2, bno + ediff, e1)
    } else {
        let mut w2 = m2;
        w2.shl((-ediff) as u32);
        (m1, w2, bno - ediff, e2)
    };

    let (sum, sign) = signed_add(&wide1, s1, &wide2, s2);
    if sum.is_zero() {
        return (Class::Zero, false, 0, BigUint::zero());
    }
    let exponent = base_exp + (sum.topbit() as i32 - mtop);
    (Class::Normal, sign, exponent, sum)
}

fn mul_kernel(
    working: Format,
    c1: Class,
    s1: bool,
    e1: i32,
    m1: BigUint,
    c2: Class,
    s2: bool,
    e2: i32,
    m2: BigUint,
) -> (Class, bool, i32, BigUint) {
    if c1 == Class::Nan || c2 == Class::Nan {
        return (Class::Nan, false, 0, BigUint::zero());
    }
    if c1 == Class::Infinite && c2 == Class::Infinite {
        return (Class::Infinite, s1 != s2, 0, BigUint::zero());
    }
    if (c1 == Class::Infinite && c2 == Class::Zero) || (c2 == Class::Infinite && c1 == Class::Zero) {
        return (Class::Nan, false, 0, BigUint::zero());
    }
    if c1 == Class::Infinite || c2 == Class::Infinite {
        return (Class::Infinite, s1 != s2, 0, BigUint::zero());
    }
    // Handled ahead of the general path (unlike the C original, which feeds
    // a zero mantissa into the same `topbit` call used for the nonzero
    // case): a zero operand's mantissa has no top bit to speak of.
    if c1 == Class::Zero || c2 == Class::Zero {
        return (Class::Zero, s1 != s2, 0, BigUint::zero());
    }

    let bno = (working.descriptor().nbits - 1) as i32;
    let product = m1.mul(&m2);
    let ee = product.topbit() as i32 - 2 * bno;
    let exponent = e1 + e2 + ee;
    (Class::Normal, s1 != s2, exponent, product)
}

fn div_kernel(
    working: Format,
    c1: Class,
    s1: bool,
    e1: i32,
    m1: BigUint,
    c2: Class,
    s2: bool,
    e2: i32,
    m2: BigUint,
) -> (Class, bool, i32, BigUint) {
    if c1 == Class::Nan || c2 == Class::Nan {
        return (Class::Nan, false, 0, BigUint::zero());
    }
    if c1 == Class::Infinite {
        return if c2 == Class::Infinite {
            (Class::Nan, false, 0, BigUint::zero())
        } else {
            (Class::Infinite, s1 != s2, 0, BigUint::zero())
        };
    }
    if c1 == Class::Zero {
        return if c2 == Class::Zero {
            (Class::Nan, s1 == s2, 0, BigUint::zero())
        } else {
            (Class::Zero, s1 == s2, 0, BigUint::zero())
        };
    }
    if c2 == Class::Zero {
        return (Class::Infinite, s1 != s2, 0, BigUint::zero());
    }
    if c2 == Class::Infinite {
        return (Class::Zero, s1 == s2, 0, BigUint::zero());
    }

    let nbits = working.descriptor().nbits;

    // Divide with nbits of extra precision so the quotient has a full
    // mantissa width of its own.
    let mut scaled1 = m1;
    scaled1.shl(nbits);
    let (q, r) = scaled1.div_rem(&m2);
    let sh = q.topbit() as i32 - nbits as i32;

    // Divide the remainder too, scaled the same way, purely to get extra
    // guard/round/sticky bits below the quotient for correct rounding.
    let mut scaled_r = r;
    scaled_r.shl(nbits);
    let (extra, _) = scaled_r.div_rem(&m2);

    let mut scaled_q = q;
    scaled_q.shl(nbits);
    let mut combined = scaled_q.add(&extra);

    crate::round::grs_round(working, &mut combined);

    let exponent = e1 - e2 + sh;
    (Class::Normal, s1 != s2, exponent, combined)
}

/// `x1 == x2`, with the IEEE rule that all zeros compare equal regardless of
/// sign.
fn cmp_eq(c1: Class, c2: Class, s1: bool, s2: bool, e1: i32, e2: i32, m1: &BigUint, m2: &BigUint) -> bool {
    if c1 == Class::Zero && c2 == Class::Zero {
        return true;
    }
    if s1 != s2 {
        return false;
    }
    e1 == e2 && m1 == m2
}

/// `x1 < x2` if `isless`, `x1 > x2` otherwise. Only ever called once `cmp_eq`
/// has ruled out equality and NaN has already been ruled out by the caller.
fn cmp_gl(
    c1: Class,
    c2: Class,
    s1: bool,
    s2: bool,
    e1: i32,
    e2: i32,
    m1: &BigUint,
    m2: &BigUint,
    isless: bool,
) -> bool {
    if c1 == Class::Zero && c2 == Class::Zero {
        return false;
    }
    if s1 != s2 {
        return if isless { !s2 } else { s2 };
    }
    let mut rv = if e1 > e2 {
        !isless
    } else if e1 < e2 {
        isless
    } else if m1 == m2 {
        return false;
    } else if m1 > m2 {
        !isless
    } else {
        isless
    };
    if s2 {
        rv = !rv;
    }
    rv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Format;

    fn f64v(bits: u64) -> SoftFloat {
        SoftFloat::from_wire(Format::Binary64, [bits as u32, (bits >> 32) as u32, 0])
    }

    #[test]
    fn one_plus_one_is_two() {
        let one = SoftFloat::from_int(1, false, Format::Binary64);
        let two = one.add(&one).cast(Format::Binary64);
        assert_eq!(two.to_wire().0, SoftFloat::from_int(2, false, Format::Binary64).to_wire().0);
    }

    #[test]
    fn addition_of_opposite_signs_cancels_to_positive_zero() {
        let a = SoftFloat::from_int(5, false, Format::Binary64);
        let b = a.neg();
        let sum = a.add(&b).cast(Format::Binary64);
        assert_eq!(sum.classify(), Class::Zero);
        assert!(!sum.is_negative());
    }

    #[test]
    fn multiply_by_zero_is_zero_not_a_panic() {
        let a = SoftFloat::from_int(7, false, Format::Binary64);
        let z = SoftFloat::from_int(0, false, Format::Binary64);
        let p = a.mul(&z).cast(Format::Binary64);
        assert_eq!(p.classify(), Class::Zero);
    }

    #[test]
    fn multiply_of_infinities_and_signed_infinite_times_finite_follow_xor_sign() {
        let pos_inf = SoftFloat::infinity(Format::Binary64, false);
        let neg_inf = SoftFloat::infinity(Format::Binary64, true);
        let five = SoftFloat::from_int(5, false, Format::Binary64);

        assert!(!pos_inf.mul(&pos_inf).is_negative());
        assert!(pos_inf.mul(&neg_inf).is_negative());
        assert!(neg_inf.mul(&neg_inf).cast(Format::Binary64).compare(&pos_inf, CompareOp::Eq));
        assert!(!pos_inf.mul(&five).is_negative());
        assert!(neg_inf.mul(&five).is_negative());
    }

    #[test]
    fn divide_by_zero_is_infinity() {
        let a = SoftFloat::from_int(1, false, Format::Binary64);
        let z = SoftFloat::from_int(0, false, Format::Binary64);
        let q = a.div(&z).cast(Format::Binary64);
        assert_eq!(q.classify(), Class::Infinite);
        assert!(!q.is_negative());
    }

    #[test]
    fn one_third_matches_hardware_rounding() {
        let one = SoftFloat::from_int(1, false, Format::Binary64);
        let three = SoftFloat::from_int(3, false, Format::Binary64);
        let third = one.div(&three).cast(Format::Binary64);
        assert_eq!(third.to_wire().0[0], 0x5555_5555);
        assert_eq!(third.to_wire().0[1], 0x3fd5_5555);
    }

    #[test]
    fn nan_compares_false_to_everything_including_itself() {
        let nan = SoftFloat::nan(Format::Binary64, None);
        let one = SoftFloat::from_int(1, false, Format::Binary64);
        assert!(!nan.compare(&nan, CompareOp::Eq));
        assert!(nan.compare(&nan, CompareOp::Ne));
        assert!(!nan.compare(&one, CompareOp::Lt));
        assert!(!nan.compare(&one, CompareOp::Gt));
    }

    #[test]
    fn positive_and_negative_zero_compare_equal() {
        let pos_zero = f64v(0);
        let neg_zero = f64v(1u64 << 63);
        assert!(pos_zero.compare(&neg_zero, CompareOp::Eq));
        assert!(!pos_zero.compare(&neg_zero, CompareOp::Lt));
    }

    #[test]
    fn ordering_across_signs_and_magnitudes() {
        let a = SoftFloat::from_int(-3, false, Format::Binary64);
        let b = SoftFloat::from_int(2, false, Format::Binary64);
        assert!(a.compare(&b, CompareOp::Lt));
        assert!(b.compare(&a, CompareOp::Gt));
        assert!(a.compare(&a, CompareOp::Le));
        assert!(a.compare(&a, CompareOp::Ge));
    }
}
