//! A host-independent software floating-point engine.
//!
//! This crate emulates IEEE-754 `binary32`/`binary64` and Intel-style 80-bit
//! extended precision entirely in software, so a cross-compiler folding
//! floating-point constants at compile time gets bit-for-bit the same answer
//! the target hardware would produce, regardless of what the compiler itself
//! happens to be running on.
//!
//! [`SoftFloat`] is the value type: an opaque wire representation plus the
//! [`Format`] it's encoded in. Every arithmetic operation is infallible and
//! total in the IEEE sense — overflow produces an infinity, underflow a
//! subnormal or zero, an invalid operation a quiet NaN. The one place this
//! crate can fail is decoding a literal that isn't syntactically a
//! floating-point number at all ([`SoftFloat::parse`]).
//!
//! Internally, every arithmetic operation is carried out at
//! [`Format::working`] precision (the widest format, `BinaryX80`) and
//! narrowed only when producing the final wire form — the same strategy the
//! engine this one is modeled on uses to get correct double rounding
//! behavior for free.

mod arith;
mod bigint;
mod convert;
mod error;
mod format;
mod literal;
mod round;

pub use bigint::BigUint;
pub use error::ParseFloatError;
pub use format::{Class, Format, FormatDescriptor};

/// A floating-point value in one of this crate's supported [`Format`]s,
/// stored as its exact wire representation.
///
/// `SoftFloat` is a plain value: cloning, comparing by reference, and
/// passing by value are all free of hidden allocation (the wire form is a
/// fixed `[u32; 3]`, unused high words simply left zero for narrower
/// formats).
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SoftFloat {
    pub(crate) format: Format,
    pub(crate) bits: [u32; 3],
}

/// The six relational operators `SoftFloat::compare` understands, matching
/// IEEE-754's total set of numeric comparisons (a NaN operand makes every
/// one of these `false`, including `Ne`... except `Ne` itself, which is
/// `true` whenever `Eq` would be `false` — NaN is never equal to anything,
/// including itself).
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl SoftFloat {
    /// The format this value is encoded in.
    pub fn format(&self) -> Format {
        self.format
    }

    /// The raw wire words (low word first) and the format's storage width
    /// in bits. Unused high words for narrower formats are zero.
    pub fn to_wire(&self) -> ([u32; 3], u32) {
        (self.bits, self.format.descriptor().storage)
    }

    /// Build a value directly from wire bits, trusting the caller that they
    /// are a valid encoding of `format`.
    pub fn from_wire(format: Format, bits: [u32; 3]) -> SoftFloat {
        SoftFloat { format, bits }
    }
}
