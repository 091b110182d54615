//! Proof-of-work checks run during block validation.
//!
//! Each check comes in two forms: a `verify_*` function reporting why a
//! header is rejected, and a `check_*` wrapper returning only the verdict.

use bitcoin::BlockHash;
use tracing::{debug, warn};

use crate::blockdata::BlockHeader;
use crate::consensus::Params;
use crate::equihash::{Blake2bVerifier, EquihashParams, SolutionVerifier};
use crate::error::PowError;
use crate::pow::{CompactTarget, Target};
use crate::util::blockhash_to_target;

/// Verifies that `hash` satisfies the target encoded in `bits`.
///
/// The hash is read as a little-endian 256-bit integer and must not exceed
/// the decoded target. A hash equal to the target is valid.
///
/// # Returns
///
/// * `Ok(Target)` - The decoded target the hash was checked against
/// * `Err(PowError)` - If `bits` is negative, overflowing, zero or easier than
///   `params.pow_limit`, or if the hash is above the target
pub fn verify_proof_of_work(
    hash: &BlockHash,
    bits: CompactTarget,
    params: &Params,
) -> Result<Target, PowError> {
    let decoded = bits.decode();

    if decoded.negative {
        return Err(PowError::NegativeTarget(bits));
    }
    if decoded.overflow {
        return Err(PowError::TargetOverflow(bits));
    }
    if decoded.target.is_zero() {
        return Err(PowError::ZeroTarget(bits));
    }
    if decoded.target > params.pow_limit {
        return Err(PowError::TargetAboveLimit(bits));
    }

    if blockhash_to_target(hash) > decoded.target {
        return Err(PowError::HashAboveTarget);
    }

    Ok(decoded.target)
}

/// Returns whether `hash` satisfies the target encoded in `bits`.
pub fn check_proof_of_work(hash: &BlockHash, bits: CompactTarget, params: &Params) -> bool {
    verify_proof_of_work(hash, bits, params).is_ok()
}

/// Verifies the header's Equihash solution with `verifier`.
///
/// The parameters are selected from the solution length. An unsupported
/// length is rejected before the verifier is consulted.
///
/// # Returns
///
/// * `Ok(EquihashParams)` - The parameters the solution was verified with
/// * `Err(PowError::UnsupportedSolutionSize)` - If no parameters match the
///   solution length
/// * `Err(PowError::InvalidSolution)` - If the verifier rejects the solution
pub fn verify_equihash_solution<V: SolutionVerifier>(
    header: &BlockHeader,
    verifier: &V,
) -> Result<EquihashParams, PowError> {
    let size = header.solution.len();
    let Some(params) = EquihashParams::from_solution_size(size) else {
        warn!("Unsupported Equihash solution size of {}", size);
        return Err(PowError::UnsupportedSolutionSize(size));
    };

    debug!("Selected Equihash n, k: {}, {}", params.n, params.k);

    let input = header.equihash_input();
    if !verifier.is_valid_solution(params, &input, &header.nonce, &header.solution) {
        return Err(PowError::InvalidSolution {
            n: params.n,
            k: params.k,
        });
    }

    Ok(params)
}

/// Returns whether the header carries a valid Equihash solution.
pub fn check_equihash_solution(header: &BlockHeader) -> bool {
    verify_equihash_solution(header, &Blake2bVerifier).is_ok()
}
