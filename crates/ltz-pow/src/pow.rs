//! Proof-of-work targets.
//!
//! This module defines the Target and CompactTarget types used for representing
//! proof-of-work thresholds.
//!
//! A Target is a 256-bit value that a block hash must not exceed. The lower the
//! target, the higher the difficulty. CompactTarget is the 32-bit encoding of a
//! target stored in block headers as `bits`: a one byte exponent followed by a
//! 24-bit mantissa whose top bit is a sign flag.
//!
//! Compact targets are approximate. Encoding keeps the three most significant
//! bytes of a target and rounds toward zero, so only targets whose remaining
//! bytes are zero survive an encode/decode round trip unchanged.

use std::fmt;

use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Sign bit of the compact mantissa.
const SIGN_BIT: u32 = 0x0080_0000;

/// Mantissa bits of a compact target, excluding the sign bit.
const MANTISSA_MASK: u32 = 0x007f_ffff;

/// Represents a target value expressed as an unsigned 256-bit integer.
///
/// # Example
///
/// ```ignore
/// use ltz_pow::pow::{Target, CompactTarget};
///
/// let target = Target::from_hex("0007ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff").unwrap();
///
/// // Convert to the compact format used in block headers
/// let compact = target.to_compact();
/// assert_eq!(compact, CompactTarget::new(0x1f07ffff));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Target(U256);

impl Target {
    /// Creates a new Target instance with the specified U256 value.
    pub const fn new(target: U256) -> Self {
        Target(target)
    }

    /// Creates a new `Target` from a hexadecimal string representation.
    ///
    /// # Arguments
    ///
    /// * `hex` - A big-endian hexadecimal string of at most 64 digits
    ///
    /// # Returns
    ///
    /// A new `Target` instance, or `None` if the string is not valid hex or
    /// does not fit in 256 bits
    pub fn from_hex(hex: &str) -> Option<Self> {
        U256::from_str_radix(hex, 16).ok().map(Target)
    }

    /// Creates a Target from bytes (big-endian).
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        Self(U256::from_big_endian(bytes))
    }

    /// Creates a Target from bytes (little-endian).
    ///
    /// Block hashes are compared against targets as little-endian integers, so
    /// this is the conversion used for the raw bytes of a block hash.
    pub fn from_le_bytes(bytes: &[u8; 32]) -> Self {
        Self(U256::from_little_endian(bytes))
    }

    /// Returns the little-endian byte representation of this target.
    pub fn to_le_bytes(self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (chunk, limb) in bytes.chunks_exact_mut(8).zip(self.0 .0.iter()) {
            chunk.copy_from_slice(&limb.to_le_bytes());
        }
        bytes
    }

    /// Creates a new instance of `Target` with a zero-valued underlying `U256` integer.
    pub const fn zero() -> Self {
        Target(U256::zero())
    }

    /// Returns `true` if the target is zero. A zero target can never be met.
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Returns the underlying 256-bit integer.
    pub const fn value(self) -> U256 {
        self.0
    }

    /// Calculates the difficulty of the current target relative to the
    /// proof-of-work limit.
    ///
    /// This divides the limit (the easiest permitted target) by the current
    /// target, so the limit itself has difficulty 1.
    ///
    /// # Arguments
    /// * `pow_limit` - The network's maximum target
    ///
    /// # Returns
    /// * `Some(u128)` - The difficulty, capped at `u128::MAX`
    /// * `None` - When the current target is zero
    pub fn difficulty(self, pow_limit: Target) -> Option<u128> {
        let diff = pow_limit.0.checked_div(self.0)?;
        if diff > U256::from(u128::MAX) {
            Some(u128::MAX)
        } else {
            Some(diff.as_u128())
        }
    }

    /// Converts the target into the expected number of hashes needed to meet
    /// it, `2^256 / (target + 1)`.
    ///
    /// The computation uses `(~target / (target + 1)) + 1` so it never needs
    /// a 257-bit intermediate.
    pub fn to_work(self) -> Option<Work> {
        if self.0 == U256::MAX {
            return Some(Work(U256::one()));
        }

        let increment = self.0.checked_add(U256::one())?;
        let inverted = !self.0;
        let result = inverted.checked_div(increment)?;
        Some(Work(result.checked_add(U256::one())?))
    }

    /// Converts a compact target into a Target, rejecting every encoding that
    /// is not a usable proof-of-work threshold.
    ///
    /// # Returns
    ///
    /// * `Some(Target)` - The decoded target
    /// * `None` - If the encoding has its sign bit set, overflows 256 bits or
    ///   decodes to zero
    ///
    /// # Example
    ///
    /// ```ignore
    /// use ltz_pow::pow::{Target, CompactTarget};
    ///
    /// let target = Target::from_compact(CompactTarget::new(0x03123456));
    /// # assert_eq!(target.unwrap().value(), primitive_types::U256::from(0x123456));
    /// ```
    pub fn from_compact(compact: CompactTarget) -> Option<Self> {
        let decoded = compact.decode();
        if decoded.negative || decoded.overflow || decoded.target.is_zero() {
            return None;
        }
        Some(decoded.target)
    }

    /// Converts a target value into its compact representation.
    ///
    /// The conversion follows these rules:
    /// - The byte length of the value becomes the exponent.
    /// - Values of at most three bytes are left-aligned into the mantissa.
    /// - Larger values keep their three most significant bytes; everything
    ///   below them is truncated.
    /// - If the mantissa would have its sign bit set, it is shifted right by
    ///   one byte and the exponent is incremented, so encoded targets are
    ///   never negative.
    ///
    /// Zero encodes as `0x00000000`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use ltz_pow::pow::{Target, CompactTarget};
    ///
    /// let target = Target::from_hex("0000000000000000000000000000000000000000000000000000000000800000").unwrap();
    /// assert_eq!(target.to_compact(), CompactTarget::new(0x04008000));
    /// ```
    #[allow(
        clippy::arithmetic_side_effects,
        clippy::cast_possible_truncation,
        reason = "A U256 has at most 256 bits, so the size is at most 32 and every shift is in range"
    )]
    pub fn to_compact(self) -> CompactTarget {
        let mut size = (self.0.bits() as u32 + 7) / 8;

        let mut mantissa = if size <= 3 {
            self.0.low_u32() << (8 * (3 - size))
        } else {
            (self.0 >> (8 * (size - 3))).low_u32()
        };

        if mantissa & SIGN_BIT != 0 {
            mantissa >>= 8;
            size += 1;
        }

        CompactTarget(mantissa | (size << 24))
    }
}

impl From<U256> for Target {
    fn from(value: U256) -> Self {
        Target(value)
    }
}

impl fmt::LowerHex for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// A decoded compact target together with the flags describing malformed
/// encodings.
///
/// `negative` and `overflow` never make decoding fail on their own; callers
/// that validate blocks treat either flag as a rejection, while retargeting
/// sums the raw `target` the same way regardless.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DecodedTarget {
    /// The decoded value. Bits shifted past 256 are discarded.
    pub target: Target,
    /// The mantissa is non-zero and its sign bit is set.
    pub negative: bool,
    /// The exponent shifts a non-zero mantissa beyond 256 bits.
    pub overflow: bool,
}

/// Compact representation of a Target, as used in block headers.
///
/// # Example
///
/// ```ignore
/// use ltz_pow::pow::CompactTarget;
///
/// let compact = CompactTarget::new(0x1d00ffff);
/// # assert_eq!(compact.to_consensus(), 0x1d00ffff);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CompactTarget(u32);

impl CompactTarget {
    /// Wraps a raw `bits` value.
    pub const fn new(target: u32) -> Self {
        CompactTarget(target)
    }

    /// Returns the raw `bits` value as stored in the header.
    pub const fn to_consensus(self) -> u32 {
        self.0
    }

    /// Unpacks the exponent and mantissa into a 256-bit value.
    ///
    /// The value is `mantissa * 256^(exponent - 3)`, computed with the sign
    /// bit masked off. Exponents of three or less shift the mantissa right,
    /// dropping the low bytes.
    ///
    /// # Returns
    ///
    /// A [`DecodedTarget`] carrying the value and the `negative` / `overflow`
    /// flags. Both flags are only ever set for a non-zero mantissa, taken
    /// after the low bytes are dropped.
    #[allow(
        clippy::arithmetic_side_effects,
        reason = "The exponent is a single byte and shifts of 256 bits or more are handled explicitly"
    )]
    pub fn decode(self) -> DecodedTarget {
        let size = self.0 >> 24;
        let mut word = self.0 & MANTISSA_MASK;

        let value = if size <= 3 {
            word >>= 8 * (3 - size);
            U256::from(word)
        } else {
            let shift = 8 * (size - 3);
            if shift >= 256 {
                U256::zero()
            } else {
                U256::from(word) << shift
            }
        };

        let negative = word != 0 && self.0 & SIGN_BIT != 0;
        let overflow = word != 0
            && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));

        DecodedTarget {
            target: Target(value),
            negative,
            overflow,
        }
    }
}

impl From<u32> for CompactTarget {
    fn from(bits: u32) -> Self {
        CompactTarget(bits)
    }
}

impl fmt::LowerHex for CompactTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Expected number of hash attempts represented by a target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Work(U256);

impl Work {
    /// Wraps a raw work value.
    pub fn new(work: U256) -> Self {
        Work(work)
    }

    /// Returns the underlying 256-bit integer.
    pub fn value(self) -> U256 {
        self.0
    }
}
