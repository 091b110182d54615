//! Linearly weighted moving average (LWMA) retargeting.
//!
//! Solve times of the last `N` blocks are weighted `1..=N`, oldest first, so
//! recent blocks dominate the estimate. Targets are summed after dividing each
//! by `k * N^2`, and the next target is the weighted solve time times that
//! sum. With every solve time equal to the target spacing and a constant
//! target, the result reproduces that target.

use primitive_types::U256;
use tracing::{debug, warn};

use crate::blockdata::BlockHeader;
use crate::chain::ChainNode;
use crate::consensus::Params;
use crate::pow::{CompactTarget, Target};

/// Computes the next required target with LWMA.
///
/// Returns the proof-of-work limit for the genesis block and, on networks
/// allowing min-difficulty blocks, for candidates arriving more than two
/// target spacings after the tip.
#[allow(
    clippy::arithmetic_side_effects,
    reason = "Block times and spacings are far from the i64 bounds"
)]
pub fn next_work_required<N: ChainNode>(
    prev: Option<&N>,
    candidate: Option<&BlockHeader>,
    params: &Params,
) -> CompactTarget {
    let Some(prev) = prev else {
        return params.pow_limit.to_compact();
    };

    if params.pow_allow_min_difficulty_blocks {
        if let Some(header) = candidate {
            if header.block_time() > prev.time() + params.pow_target_spacing * 2 {
                debug!(
                    "Allowing min-difficulty block at height {}",
                    prev.height().saturating_add(1)
                );
                return params.pow_limit.to_compact();
            }
        }
    }

    calculate_next_work_required(prev, params)
}

/// Runs the weighted average over the `N` blocks ending at `prev`.
///
/// # Returns
///
/// `prev.bits()` unchanged when retargeting is disabled, the proof-of-work
/// limit while the chain is no longer than the averaging window, otherwise
/// the new target capped at the proof-of-work limit
#[allow(
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "The weighted sum is a 32-bit accumulator and U256 arithmetic wraps"
)]
pub fn calculate_next_work_required<N: ChainNode>(prev: &N, params: &Params) -> CompactTarget {
    if params.pow_no_retargeting {
        return prev.bits();
    }

    let pow_limit = params.pow_limit.to_compact();
    let height = prev.height().saturating_add(1);
    let window = params.lwma_averaging_window;
    let spacing = params.pow_target_spacing;
    let weight = params.lwma_adjusted_weight;
    let n = i64::from(window);

    if height <= window {
        warn!(
            "LWMA invoked at height {} with an averaging window of {}",
            height, window
        );
        return pow_limit;
    }

    let Some(divisor) = u64::try_from(weight * n * n)
        .ok()
        .filter(|divisor| *divisor != 0)
        .map(U256::from)
    else {
        return pow_limit;
    };

    let Some(mut previous) = prev.ancestor(height - window - 1) else {
        return pow_limit;
    };

    let mut sum_target = U256::zero();
    let mut weighted_solvetime: i32 = 0;

    for (j, i) in (1_i64..).zip(height - window..height) {
        let Some(block) = prev.ancestor(i) else {
            return pow_limit;
        };

        let mut solvetime = block.time() - previous.time();
        if params.lwma_solvetime_limitation && solvetime > 6 * spacing {
            solvetime = 6 * spacing;
        }

        weighted_solvetime = (i64::from(weighted_solvetime) + solvetime * j) as i32;

        let target = block.bits().decode().target.value();
        sum_target = sum_target.overflowing_add(target / divisor).0;

        previous = block;
    }

    let floor = (n * weight)
        .checked_div(params.lwma_min_denominator)
        .unwrap_or_default() as i32;
    if weighted_solvetime < floor {
        debug!(
            "Weighted solve time {} raised to floor {}",
            weighted_solvetime, floor
        );
        weighted_solvetime = floor;
    }

    let mut next = Target::new(
        sum_target
            .overflowing_mul(U256::from(i64::from(weighted_solvetime) as u64))
            .0,
    );
    if next > params.pow_limit {
        next = params.pow_limit;
    }

    debug!(
        "LWMA height={} weighted solve time={} next={:08x}",
        height,
        weighted_solvetime,
        next.to_compact()
    );

    next.to_compact()
}
