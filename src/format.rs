//! Target floating-point format descriptors.
//!
//! A [`Format`] is a closed enum rather than a vtable of function pointers:
//! there are exactly three implemented targets, plus two reserved variants
//! for formats this crate does not implement yet. Dispatch is an ordinary
//! `match`, which the optimizer inlines just as well as a function-pointer
//! call would and is a lot easier to read a stack trace through.

use crate::bigint::BigUint;

/// The five-way classification of a floating-point value.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Class {
    Zero,
    Infinite,
    Nan,
    Normal,
    Subnormal,
}

/// A supported (or reserved) target floating-point format.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Format {
    /// IEEE-754 `binary32`, a.k.a. C `float`.
    Binary32,
    /// IEEE-754 `binary64`, a.k.a. C `double`.
    Binary64,
    /// Intel-style 80-bit extended precision, a.k.a. C `long double` on x87.
    BinaryX80,
    /// IEEE-754 `binary16`. Reserved: not yet implemented.
    Binary16,
    /// IEEE-754 `binary128`. Reserved: not yet implemented.
    Binary128,
}

/// Immutable per-format constants: significand width, wire width, exponent
/// bias and range, and the positional correction applied when composing the
/// biased exponent field.
#[derive(Copy, Clone, Debug)]
pub struct FormatDescriptor {
    /// Significand width in bits, including the hidden bit.
    pub nbits: u32,
    /// Wire width in bits.
    pub storage: u32,
    /// Exponent bias.
    pub bias: i32,
    /// Minimum unbiased exponent for a Normal value.
    pub minexp: i32,
    /// Maximum unbiased exponent for a Normal value.
    pub maxexp: i32,
    /// Positional correction applied when composing the biased exponent.
    pub expadj: i32,
    /// Number of wire words (`u32`s) the format occupies.
    pub words: usize,
}

/// The round-to-nearest-even engine keeps this many guard/round/sticky bits
/// below the target mantissa width while normalizing. See [`crate::round`].
pub const RNDBIT: u32 = 10;

const BINARY32: FormatDescriptor = FormatDescriptor {
    nbits: 24,
    storage: 32,
    bias: 127,
    minexp: -126,
    maxexp: 127,
    expadj: 1,
    words: 1,
};

const BINARY64: FormatDescriptor = FormatDescriptor {
    nbits: 53,
    storage: 64,
    bias: 1023,
    minexp: -1022,
    maxexp: 1023,
    expadj: 1,
    words: 2,
};

const BINARYX80: FormatDescriptor = FormatDescriptor {
    nbits: 64,
    storage: 80,
    bias: 16383,
    minexp: -16382,
    maxexp: 16383,
    expadj: 1,
    words: 3,
};

impl Format {
    /// The format's immutable descriptor.
    pub const fn descriptor(self) -> FormatDescriptor {
        match self {
            Format::Binary32 => BINARY32,
            Format::Binary64 => BINARY64,
            Format::BinaryX80 => BINARYX80,
            Format::Binary16 | Format::Binary128 => {
                panic!("binary16/binary128 are reserved and not implemented")
            }
        }
    }

    /// The working precision every arithmetic kernel operation is carried
    /// out in, regardless of the operands' or result's nominal format.
    pub const fn working() -> Format {
        Format::BinaryX80
    }

    fn require_implemented(self) {
        assert!(
            matches!(self, Format::Binary32 | Format::Binary64 | Format::BinaryX80),
            "{:?} is reserved and not implemented",
            self
        );
    }

    /// Inspect the wire bits only, with no interpretation of sign/exponent
    /// beyond what's needed to tell the five classes apart.
    pub fn classify(self, bits: &[u32; 3]) -> Class {
        self.require_implemented();
        match self {
            Format::Binary32 => {
                let val = bits[0] & 0x7fff_ffff;
                if val == 0x7f80_0000 {
                    Class::Infinite
                } else if val == 0x7fc0_0000 {
                    Class::Nan
                } else if val == 0 {
                    Class::Zero
                } else if val & 0x7f80_0000 != 0 {
                    Class::Normal
                } else {
                    Class::Subnormal
                }
            }
            Format::Binary64 => {
                let hi = bits[1];
                let lo = bits[0];
                let exp_bits = hi & 0x7ff0_0000;
                let is_inf_or_nan = exp_bits == 0x7ff0_0000;
                if is_inf_or_nan {
                    if (hi & 0xf_ffff) == 0 && lo == 0 {
                        Class::Infinite
                    } else {
                        Class::Nan
                    }
                } else if (hi & 0x7fff_ffff) == 0 && lo == 0 {
                    Class::Zero
                } else if exp_bits != 0 {
                    Class::Normal
                } else {
                    Class::Subnormal
                }
            }
            Format::BinaryX80 => {
                let exp = (bits[2] & 0x7fff) as u16;
                let mid = bits[1];
                let lo = bits[0];
                if exp == 0x7fff {
                    if mid == 0x8000_0000 && lo == 0 {
                        Class::Infinite
                    } else {
                        Class::Nan
                    }
                } else if exp == 0 && mid == 0 && lo == 0 {
                    Class::Zero
                } else if exp != 0 {
                    Class::Normal
                } else {
                    Class::Subnormal
                }
            }
            Format::Binary16 | Format::Binary128 => unreachable!(),
        }
    }

    /// Decompose the wire bits into (class, sign, unbiased exponent,
    /// mantissa). A Subnormal wire value comes back as `Class::Normal` with
    /// `exponent == minexp` and no hidden bit set, exactly as the rounding
    /// and packing logic expects to re-detect subnormality from the exponent
    /// range rather than carrying the distinction separately.
    pub fn unpack(self, bits: &[u32; 3]) -> (Class, bool, i32, BigUint) {
        self.require_implemented();
        let raw_class = self.classify(bits);
        let desc = self.descriptor();
        let (sign, mut exp, mut mant) = match self {
            Format::Binary32 => {
                let sign = (bits[0] >> 31) & 1 != 0;
                let exp = ((bits[0] >> 23) & 0xff) as i32 - desc.bias;
                let frac = (bits[0] & 0x7f_ffff) as u64;
                (sign, exp, frac)
            }
            Format::Binary64 => {
                let sign = (bits[1] >> 31) & 1 != 0;
                let exp = ((bits[1] >> 20) & 0x7ff) as i32 - desc.bias;
                let mant = ((bits[1] as u64 & 0xf_ffff) << 32) | bits[0] as u64;
                (sign, exp, mant)
            }
            Format::BinaryX80 => {
                let sign = (bits[2] >> 15) & 1 != 0;
                let exp = (bits[2] & 0x7fff) as i32 - desc.bias;
                // x80 stores the hidden bit explicitly, already in the wire form.
                let mant = ((bits[1] as u64) << 32) | bits[0] as u64;
                (sign, exp, mant)
            }
            Format::Binary16 | Format::Binary128 => unreachable!(),
        };
        if raw_class == Class::Normal && self != Format::BinaryX80 {
            mant |= 1u64 << (desc.nbits - 1);
        }
        // A Subnormal wire value is reported to the rest of the engine as
        // Normal with the exponent pinned to minexp and no hidden bit — the
        // rounding/packing logic re-detects subnormality from that exponent
        // range rather than carrying the distinction as a separate class.
        let class = if raw_class == Class::Subnormal {
            exp = desc.minexp;
            Class::Normal
        } else {
            raw_class
        };
        (class, sign, exp, BigUint::from_u64(mant))
    }

    /// Compose wire bits for `(class, sign, unbiased exponent, mantissa)`.
    /// For `Class::Normal` this first runs the result through
    /// [`crate::round::normalize`], which may reclassify it as `Zero`,
    /// `Subnormal`, or `Infinite`.
    pub fn pack(self, class: Class, sign: bool, exponent: i32, mantissa: BigUint) -> [u32; 3] {
        self.require_implemented();
        let desc = self.descriptor();
        let (class, exponent, mantissa) = if class == Class::Normal {
            crate::round::normalize(self, exponent, mantissa)
        } else {
            (class, exponent, mantissa)
        };

        let mant_limbs = mantissa_as_u64(&mantissa);
        let sign_bit = sign as u32;

        match self {
            // For binary32/binary64 the hidden bit is folded into the
            // exponent field by plain integer addition rather than being
            // masked off: the mantissa (as normalized) always carries that
            // bit at position `nbits - 1`, and `desc.bias - 1` pre-compensates
            // for the `+1` it contributes once added. As a bonus, a rounding
            // carry that pushes the mantissa one bit past `nbits - 1` rolls
            // straight into the exponent field for free, with no separate
            // overflow check needed (contrast x80 below, which stores the
            // hidden bit explicitly and so has no such free carry path).
            Format::Binary32 => {
                let mut word = sign_bit << 31;
                match class {
                    Class::Zero => {}
                    Class::Infinite => word |= 0x7f80_0000,
                    Class::Nan => word |= 0x7fc0_0000,
                    Class::Normal => {
                        let biased = (exponent + desc.bias - 1) as u32;
                        word |= (biased & 0xff) << 23;
                        word = word.wrapping_add(mant_limbs as u32);
                    }
                    Class::Subnormal => {
                        word = word.wrapping_add(mant_limbs as u32);
                    }
                }
                [word, 0, 0]
            }
            Format::Binary64 => {
                let mut hi = sign_bit << 31;
                let mut lo = 0u32;
                match class {
                    Class::Zero => {}
                    Class::Infinite => hi |= 0x7ff0_0000,
                    Class::Nan => hi |= 0x7ff8_0000,
                    Class::Normal => {
                        let biased = (exponent + desc.bias - 1) as u32;
                        lo = mant_limbs as u32;
                        hi |= (mant_limbs >> 32) as u32;
                        hi = hi.wrapping_add(biased << 20);
                    }
                    Class::Subnormal => {
                        lo = mant_limbs as u32;
                        hi |= (mant_limbs >> 32) as u32;
                    }
                }
                [lo, hi, 0]
            }
            Format::BinaryX80 => {
                let mut lo = 0u32;
                let mut mid = 0u32;
                let mut exp_word = sign_bit << 15;
                match class {
                    Class::Zero => {}
                    Class::Infinite => {
                        mid = 0x8000_0000;
                        exp_word |= 0x7fff;
                    }
                    Class::Nan => {
                        mid = 0xc000_0000;
                        exp_word |= 0x7fff;
                    }
                    Class::Normal => {
                        let biased = (exponent + desc.bias) as u32;
                        lo = mant_limbs as u32;
                        mid = (mant_limbs >> 32) as u32;
                        exp_word |= biased & 0x7fff;
                        if mantissa_overflowed_to_extra_bit(&mantissa) {
                            exp_word = exp_word.wrapping_add(1);
                        }
                    }
                    Class::Subnormal => {
                        lo = mant_limbs as u32;
                        mid = (mant_limbs >> 32) as u32;
                    }
                }
                [lo, mid, exp_word]
            }
            Format::Binary16 | Format::Binary128 => unreachable!(),
        }
    }
}

/// Truncate a mantissa down to the low 64 bits for wire assembly. Rounding in
/// [`crate::round::normalize`] has already shrunk the value to at most
/// `nbits` bits (or `nbits + 1` on an x80 round-up carry, detected
/// separately by [`mantissa_overflowed_to_extra_bit`]).
fn mantissa_as_u64(m: &BigUint) -> u64 {
    m.to_u64()
}

/// For x80, a rounding carry can push the explicit 64-bit mantissa to bit
/// 64; the packer folds that into an exponent increment instead of losing it.
fn mantissa_overflowed_to_extra_bit(m: &BigUint) -> bool {
    m.bit(64)
}
