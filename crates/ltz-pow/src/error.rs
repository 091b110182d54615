use thiserror::Error;

use crate::pow::CompactTarget;

/// Reasons a block header fails proof-of-work validation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PowError {
    /// The compact target has its sign bit set.
    #[error("Negative target in bits {0:#010x}")]
    NegativeTarget(CompactTarget),
    /// The compact target decodes to zero.
    #[error("Zero target in bits {0:#010x}")]
    ZeroTarget(CompactTarget),
    /// The compact target does not fit in 256 bits.
    #[error("Target in bits {0:#010x} overflows 256 bits")]
    TargetOverflow(CompactTarget),
    /// The decoded target is easier than the network allows.
    #[error("Target in bits {0:#010x} exceeds the proof-of-work limit")]
    TargetAboveLimit(CompactTarget),
    /// The block hash does not meet the claimed target.
    #[error("Block hash is above the target")]
    HashAboveTarget,
    /// No Equihash parameters are defined for the solution length.
    #[error("Unsupported Equihash solution size: {0}")]
    UnsupportedSolutionSize(usize),
    /// The Equihash solution does not solve the header's puzzle.
    #[error("Invalid Equihash solution for n={n}, k={k}")]
    InvalidSolution {
        /// Equihash `n` parameter.
        n: u32,
        /// Equihash `k` parameter.
        k: u32,
    },
}
