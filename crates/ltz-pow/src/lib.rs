//! Proof-of-work consensus rules for an Equihash chain.
//!
//! This library provides compact target encoding, the Digishield and LWMA
//! difficulty retargeting algorithms with their height-based dispatch, and
//! the proof-of-work and Equihash solution checks used by block validation.
//! Every entry point takes the consensus [`consensus::Params`] of the active
//! network explicitly; nothing is read from global state.

#![cfg_attr(test, allow(clippy::arithmetic_side_effects))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::cast_sign_loss))]
#![cfg_attr(test, allow(clippy::indexing_slicing))]
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::cast_possible_truncation))]

/// Block header view used by validation.
pub mod blockdata;
/// Read-only chain index contract and an in-memory chain.
pub mod chain;
/// Consensus parameters per network.
pub mod consensus;
/// Difficulty retargeting.
pub mod difficulty;
/// Equihash parameter selection and solution verification.
pub mod equihash;
/// Validation errors.
pub mod error;
/// Network types and constants.
pub mod network;
/// Proof of Work related functionality.
pub mod pow;
/// Utility functions and types.
pub mod util;
/// Proof-of-work and Equihash checks.
pub mod validation;

pub use blockdata::BlockHeader;
pub use chain::{ActiveChain, BlockRecord, ChainNode};
pub use consensus::Params;
pub use difficulty::next_work_required;
pub use error::PowError;
pub use network::Network;
pub use pow::{CompactTarget, Target};
pub use validation::{
    check_equihash_solution, check_proof_of_work, verify_equihash_solution, verify_proof_of_work,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
