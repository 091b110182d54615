//! Equihash parameter selection and solution verification.
//!
//! Headers do not carry their Equihash parameters; they are recovered from
//! the solution length, which is `2^k * (n / (k + 1) + 1) / 8` bytes. Only the
//! parameter sets listed in [`EquihashParams::SUPPORTED`] are accepted.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// The `(n, k)` parameters of an Equihash puzzle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EquihashParams {
    /// Hash output length in bits.
    pub n: u32,
    /// Number of collision rounds.
    pub k: u32,
}

impl EquihashParams {
    /// Mainnet and testnet genesis parameters.
    pub const N200_K9: Self = Self::new(200, 9);
    /// Regtest genesis parameters.
    pub const N48_K5: Self = Self::new(48, 5);
    /// `(192, 7)`, 400 byte solutions.
    pub const N192_K7: Self = Self::new(192, 7);
    /// `(144, 5)`, 100 byte solutions.
    pub const N144_K5: Self = Self::new(144, 5);
    /// `(96, 5)`, 68 byte solutions.
    pub const N96_K5: Self = Self::new(96, 5);

    /// Every accepted parameter set.
    pub const SUPPORTED: [Self; 5] = [
        Self::N200_K9,
        Self::N48_K5,
        Self::N192_K7,
        Self::N144_K5,
        Self::N96_K5,
    ];

    /// Creates a new parameter pair.
    pub const fn new(n: u32, k: u32) -> Self {
        Self { n, k }
    }

    /// Looks up the parameters producing solutions of `size` bytes.
    ///
    /// # Returns
    ///
    /// * `Some(EquihashParams)` - For the 1344, 36, 400, 100 and 68 byte sizes
    /// * `None` - For any other length
    pub fn from_solution_size(size: usize) -> Option<Self> {
        match size {
            1344 => Some(Self::N200_K9),
            36 => Some(Self::N48_K5),
            400 => Some(Self::N192_K7),
            100 => Some(Self::N144_K5),
            68 => Some(Self::N96_K5),
            _ => None,
        }
    }

    /// Length in bytes of a solution for these parameters.
    #[allow(
        clippy::arithmetic_side_effects,
        clippy::integer_division,
        reason = "Only meaningful for k < n, which keeps every term small"
    )]
    pub fn solution_size(&self) -> usize {
        let indices = 1_usize << self.k;
        let bits_per_index = self.n as usize / (self.k as usize + 1) + 1;
        indices * bits_per_index / 8
    }
}

/// Checks Equihash solutions against a puzzle input.
///
/// Parameter selection and input framing happen before a verifier is
/// called, so an implementation only answers whether `solution` solves the
/// puzzle seeded by `input` and `nonce`.
pub trait SolutionVerifier {
    /// Returns whether `solution` is valid for the given parameters.
    ///
    /// # Arguments
    ///
    /// * `params` - Equihash parameters selected from the solution length
    /// * `input` - The serialized header without nonce and solution (`I`)
    /// * `nonce` - The 32-byte header nonce (`V`)
    /// * `solution` - The minimal-encoded solution indices
    fn is_valid_solution(
        &self,
        params: EquihashParams,
        input: &[u8],
        nonce: &[u8],
        solution: &[u8],
    ) -> bool;
}

/// Verifies solutions with the BLAKE2b based Equihash of the `equihash`
/// crate, personalised per `(n, k)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Blake2bVerifier;

impl SolutionVerifier for Blake2bVerifier {
    fn is_valid_solution(
        &self,
        params: EquihashParams,
        input: &[u8],
        nonce: &[u8],
        solution: &[u8],
    ) -> bool {
        match ::equihash::is_valid_solution(params.n, params.k, input, nonce, solution) {
            Ok(()) => true,
            Err(e) => {
                debug!(
                    "Equihash ({}, {}) solution rejected: {}",
                    params.n, params.k, e
                );
                false
            }
        }
    }
}
