//! Decimal and hexadecimal floating-point literal parsing.
//!
//! The grammar accepted is the usual one: an optional sign, then either
//!
//! - `[0-9]+([Ee][+-]?[0-9]+)?`
//! - `[0-9]*.[0-9]+([Ee][+-]?[0-9]+)?`
//! - `[0-9]+.[0-9]*([Ee][+-]?[0-9]+)?`
//!
//! or, after a `0x`/`0X` prefix, the same shape in hex digits with a
//! mandatory `[Pp][+-]?[0-9]+` binary exponent instead of an optional
//! decimal one.
//!
//! Parsing happens in two stages. First the literal is decoded into an
//! exact rational `mantissa / divisor` (no rounding yet — a decimal
//! fraction and a power-of-ten scale, or a hex fraction and a power-of-two
//! scale). Then [`scale_to_precision`] divides that rational down to
//! [`Format::working`]'s mantissa width, rounding to nearest-even, and hands
//! the result to [`Format::pack`] — which takes care of reclassifying an
//! exponent that's out of range as infinity, a subnormal, or zero, the same
//! as every other operation in this crate.

use std::iter::Peekable;
use std::str::Chars;

use crate::bigint::BigUint;
use crate::error::ParseFloatError;
use crate::format::{Class, Format};
use crate::SoftFloat;

/// A literal's magnitude, before sign is applied.
enum Magnitude {
    Zero,
    /// Guaranteed to overflow `Format::working`'s range; no point doing the
    /// arbitrary-precision scaling to find out by how much.
    Overflow,
    Rational(BigUint, BigUint),
}

/// Decimal exponents (in digit count) beyond this guarantee overflow or
/// underflow for every format this crate implements — `BinaryX80`'s maxexp
/// is 16383, and `10^4932` already exceeds it by itself.
const DECIMAL_EXPONENT_LIMIT: i64 = 6_000;

/// Binary exponents (in bits) beyond this guarantee overflow or underflow
/// the same way.
const BINARY_EXPONENT_LIMIT: i64 = 200_000;

impl SoftFloat {
    /// Parse a floating-point literal, rounding to nearest-even if `format`
    /// can't represent it exactly.
    pub fn parse(s: &str, format: Format) -> Result<SoftFloat, ParseFloatError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseFloatError::Empty);
        }
        let (negative, body) = match trimmed.as_bytes()[0] {
            b'+' => (false, &trimmed[1..]),
            b'-' => (true, &trimmed[1..]),
            _ => (false, trimmed),
        };
        if body.is_empty() {
            return Err(ParseFloatError::Empty);
        }

        let magnitude = if let Some(hex_digits) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
            parse_hex(hex_digits)?
        } else {
            parse_decimal(body)?
        };

        let working = Format::working();
        let bits = match magnitude {
            Magnitude::Zero => working.pack(Class::Zero, negative, 0, BigUint::zero()),
            Magnitude::Overflow => working.pack(Class::Infinite, negative, 0, BigUint::zero()),
            Magnitude::Rational(mantissa, divisor) => {
                let (exponent, rounded) = scale_to_precision(working, &mantissa, &divisor);
                working.pack(Class::Normal, negative, exponent, rounded)
            }
        };
        Ok(SoftFloat { format: working, bits }.cast(format))
    }
}

fn parse_decimal(s: &str) -> Result<Magnitude, ParseFloatError> {
    let mut chars = s.chars().peekable();
    let mut mantissa = BigUint::zero();
    let ten = BigUint::from_u16(10);
    let mut digit_count = 0usize;
    let mut exp10: i64 = 0;
    let mut saw_dot = false;

    loop {
        match chars.peek().copied() {
            Some(c) if c.is_ascii_digit() => {
                mantissa = mantissa.mul(&ten).add(&BigUint::from_u16(c.to_digit(10).unwrap() as u16));
                digit_count += 1;
                if saw_dot {
                    exp10 -= 1;
                }
                chars.next();
            }
            Some('.') if !saw_dot => {
                saw_dot = true;
                chars.next();
            }
            _ => break,
        }
    }
    if digit_count == 0 {
        return Err(ParseFloatError::InvalidDigit {
            digit: chars.peek().copied().unwrap_or('\0'),
            radix: 10,
        });
    }

    if matches!(chars.peek(), Some('e') | Some('E')) {
        chars.next();
        exp10 = exp10.saturating_add(parse_signed_exponent(&mut chars)?);
    }
    if let Some(c) = chars.next() {
        return Err(ParseFloatError::InvalidDigit { digit: c, radix: 10 });
    }

    if mantissa.is_zero() {
        return Ok(Magnitude::Zero);
    }
    if exp10 > DECIMAL_EXPONENT_LIMIT {
        return Ok(Magnitude::Overflow);
    }
    if exp10 < -DECIMAL_EXPONENT_LIMIT {
        return Ok(Magnitude::Zero);
    }

    let mut divisor = BigUint::from_u16(1);
    if exp10 < 0 {
        divisor = scale_pow10(divisor, -exp10);
    } else {
        mantissa = scale_pow10(mantissa, exp10);
    }
    Ok(Magnitude::Rational(mantissa, divisor))
}

fn parse_hex(s: &str) -> Result<Magnitude, ParseFloatError> {
    let mut chars = s.chars().peekable();
    let mut mantissa = BigUint::zero();
    let mut digit_count = 0usize;
    let mut exp2: i64 = 0;
    let mut saw_dot = false;

    loop {
        match chars.peek().copied() {
            Some(c) if c.is_ascii_hexdigit() => {
                mantissa.shl(4);
                mantissa = mantissa.add(&BigUint::from_u16(c.to_digit(16).unwrap() as u16));
                digit_count += 1;
                if saw_dot {
                    exp2 -= 4;
                }
                chars.next();
            }
            Some('.') if !saw_dot => {
                saw_dot = true;
                chars.next();
            }
            _ => break,
        }
    }
    if digit_count == 0 {
        return Err(ParseFloatError::InvalidDigit {
            digit: chars.peek().copied().unwrap_or('\0'),
            radix: 16,
        });
    }

    match chars.next() {
        Some('p') | Some('P') => {}
        _ => return Err(ParseFloatError::MissingBinaryExponent),
    }
    exp2 = exp2.saturating_add(parse_signed_exponent(&mut chars)?);
    if let Some(c) = chars.next() {
        return Err(ParseFloatError::InvalidDigit { digit: c, radix: 16 });
    }

    if mantissa.is_zero() {
        return Ok(Magnitude::Zero);
    }
    if exp2 > BINARY_EXPONENT_LIMIT {
        return Ok(Magnitude::Overflow);
    }
    if exp2 < -BINARY_EXPONENT_LIMIT {
        return Ok(Magnitude::Zero);
    }

    let mut divisor = BigUint::from_u16(1);
    if exp2 < 0 {
        divisor.shl((-exp2) as u32);
    } else {
        mantissa.shl(exp2 as u32);
    }
    Ok(Magnitude::Rational(mantissa, divisor))
}

fn parse_signed_exponent(chars: &mut Peekable<Chars>) -> Result<i64, ParseFloatError> {
    let negative = match chars.peek() {
        Some('-') => {
            chars.next();
            true
        }
        Some('+') => {
            chars.next();
            false
        }
        _ => false,
    };
    let mut value: i64 = 0;
    let mut any_digits = false;
    while let Some(c) = chars.peek().and_then(|c| c.to_digit(10)) {
        value = value.saturating_mul(10).saturating_add(c as i64);
        any_digits = true;
        chars.next();
    }
    if !any_digits {
        return Err(ParseFloatError::MalformedExponent);
    }
    Ok(if negative { -value } else { value })
}

fn scale_pow10(mut base: BigUint, n: i64) -> BigUint {
    let ten = BigUint::from_u16(10);
    for _ in 0..n {
        base = base.mul(&ten);
    }
    base
}

/// Divide the exact rational `mantissa / divisor` down to `working`'s
/// mantissa width, rounding to nearest-even. Returns the raw unbiased
/// exponent and mantissa, at whatever width the rounding step landed on
/// (`nbits - 1` ordinarily, possibly one short of that for the caller to
/// treat as a Subnormal candidate — `Format::pack`'s `normalize` sorts that
/// out from the exponent alone).
fn scale_to_precision(working: Format, mantissa: &BigUint, divisor: &BigUint) -> (i32, BigUint) {
    let desc = working.descriptor();
    let nbits = desc.nbits as i32;
    let t = mantissa.topbit() as i32;
    let u = divisor.topbit() as i32;

    if t - u < nbits {
        // The mantissa needs scaling up before dividing so the quotient
        // comes out with a full `nbits` bits.
        let mut scale = nbits - (t - u) - 1;
        let mut scaled = mantissa.clone();
        scaled.shl(scale as u32);
        let (mut q, mut r) = scaled.div_rem(divisor);
        while q.topbit() < (nbits - 1) as u32 {
            scaled.shl(1);
            let next = scaled.div_rem(divisor);
            q = next.0;
            r = next.1;
            scale += 1;
        }
        round_quotient(divisor, &mut q, r);
        if q.topbit() == nbits as u32 {
            q.shr(1, false);
            scale -= 1;
        }
        (nbits - scale - desc.expadj, q)
    } else {
        // The mantissa already dwarfs the divisor: scale the divisor up
        // instead of growing the mantissa further.
        let mut scale = (t - u) - nbits + 1;
        let mut scaled_divisor = divisor.clone();
        scaled_divisor.shl(scale as u32);
        let (mut q, mut r) = mantissa.div_rem(&scaled_divisor);
        if q.topbit() < (nbits - 1) as u32 {
            scaled_divisor.shr(1, false);
            let next = mantissa.div_rem(&scaled_divisor);
            q = next.0;
            r = next.1;
            scale -= 1;
        }
        round_quotient(&scaled_divisor, &mut q, r);
        if q.topbit() == nbits as u32 {
            q.shr(1, false);
            scale += 1;
        }
        (nbits + scale - desc.expadj, q)
    }
}

/// Round a truncating division's quotient to nearest-even, given its
/// remainder: double the remainder and compare against the divisor to place
/// it above, below, or exactly on the halfway point.
fn round_quotient(divisor: &BigUint, quotient: &mut BigUint, mut remainder: BigUint) {
    remainder.shl(1);
    if remainder >= *divisor {
        let exactly_half = remainder == *divisor;
        if !exactly_half || quotient.bit(0) {
            *quotient = quotient.add(&BigUint::from_u16(1));
        }
    }
}
