//! Digishield retargeting.
//!
//! The next target is the average target of the last
//! `digishield_averaging_window` blocks, scaled by how long that window took
//! to mine. The elapsed time is measured between median-time-past values and
//! only a quarter of its deviation from the ideal timespan is applied before
//! clamping.

use primitive_types::U256;
use tracing::debug;

use crate::blockdata::BlockHeader;
use crate::chain::ChainNode;
use crate::consensus::Params;
use crate::network::Network;
use crate::pow::{CompactTarget, Target};

/// First height of the post-fork reset window on the main network. Other
/// networks start the window at `equihash_fork_height`.
pub const MAINNET_RESET_WINDOW_START: u32 = 95_005;

/// Computes the next required target with Digishield.
///
/// Returns the proof-of-work limit for the genesis block, for stale
/// candidates on networks allowing min-difficulty blocks, inside the reset
/// window following the Equihash fork, and while the chain is shorter than
/// the averaging window.
#[allow(
    clippy::arithmetic_side_effects,
    reason = "Block times and spacings are far from the i64 bounds"
)]
pub fn next_work_required<N: ChainNode>(
    prev: Option<&N>,
    candidate: Option<&BlockHeader>,
    params: &Params,
) -> CompactTarget {
    let pow_limit = params.pow_limit.to_compact();

    let Some(prev) = prev else {
        return pow_limit;
    };

    debug!(
        "prev height={}, equihash fork height={}, averaging window={}",
        prev.height(),
        params.equihash_fork_height,
        params.digishield_averaging_window
    );

    if params.pow_allow_min_difficulty_blocks {
        if let Some(header) = candidate {
            if header.block_time() > prev.time() + params.digishield_target_spacing * 6 {
                debug!(
                    "Allowing min-difficulty block at height {}",
                    prev.height().saturating_add(1)
                );
                return pow_limit;
            }
        }
    }

    if in_reset_window(prev.height(), params) {
        debug!(
            "Reset the difficulty for the algorithm change: {:08x}",
            pow_limit
        );
        return pow_limit;
    }

    let window = params.digishield_averaging_window;
    let Some(first) = prev
        .height()
        .checked_sub(window)
        .and_then(|height| prev.ancestor(height))
    else {
        debug!(
            "Not enough blocks for a {} block average at height {}",
            window,
            prev.height()
        );
        return pow_limit;
    };

    let mut total = U256::zero();
    for height in first.height() + 1..=prev.height() {
        let Some(node) = prev.ancestor(height) else {
            return pow_limit;
        };
        total = total.overflowing_add(node.bits().decode().target.value()).0;
    }

    let Some(average) = total.checked_div(U256::from(window)) else {
        return pow_limit;
    };

    calculate_next_work_required(prev, Target::new(average), first.median_time_past(), params)
}

/// Scales an average target by the damped and clamped window timespan.
///
/// # Arguments
///
/// * `prev` - The current chain tip
/// * `average` - Average target over the averaging window
/// * `first_block_time` - Median-time-past of the block preceding the window
/// * `params` - Consensus parameters of the active network
///
/// # Returns
///
/// `prev.bits()` unchanged when retargeting is disabled, otherwise the new
/// target capped at the proof-of-work limit
#[allow(
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "The clamped timespan is positive and fits in 32 bits; U256 arithmetic wraps"
)]
pub fn calculate_next_work_required<N: ChainNode>(
    prev: &N,
    average: Target,
    first_block_time: i64,
    params: &Params,
) -> CompactTarget {
    if params.pow_no_retargeting {
        return prev.bits();
    }

    let raw_timespan = prev.median_time_past() - first_block_time;
    debug!("  actual timespan = {}  before dampening", raw_timespan);
    let mut actual_timespan = damp_timespan(raw_timespan, params);
    debug!("  actual timespan = {}  before bounds", actual_timespan);

    if actual_timespan < params.digishield_min_actual_timespan() {
        actual_timespan = params.digishield_min_actual_timespan();
    }
    if actual_timespan > params.digishield_max_actual_timespan() {
        actual_timespan = params.digishield_max_actual_timespan();
    }

    let window_timespan = params.digishield_averaging_window_timespan();
    let Some(scaled) = average
        .value()
        .checked_div(U256::from(window_timespan as u64))
    else {
        return params.pow_limit.to_compact();
    };
    let mut next = Target::new(
        scaled
            .overflowing_mul(U256::from(actual_timespan as u32))
            .0,
    );

    if next > params.pow_limit {
        next = params.pow_limit;
    }

    debug!(
        "Retarget: window timespan = {}, actual timespan = {}",
        window_timespan, actual_timespan
    );
    debug!(
        "Current average: {:08x}  {:064x}",
        average.to_compact(),
        average
    );
    debug!("After: {:08x}  {:064x}", next.to_compact(), next);

    next.to_compact()
}

/// Applies a quarter of the deviation from the ideal window timespan.
#[allow(
    clippy::arithmetic_side_effects,
    clippy::integer_division,
    reason = "Timespans are far from the i64 bounds; division truncates toward zero"
)]
pub fn damp_timespan(raw_timespan: i64, params: &Params) -> i64 {
    let ideal = params.digishield_averaging_window_timespan();
    ideal + (raw_timespan - ideal) / 4
}

/// Whether the block after `prev_height` falls in the window that restarts
/// difficulty at the proof-of-work limit after the Equihash fork.
fn in_reset_window(prev_height: u32, params: &Params) -> bool {
    let start = match params.network {
        Network::Mainnet => MAINNET_RESET_WINDOW_START,
        Network::Testnet | Network::Regtest => params.equihash_fork_height,
    };
    let end = params
        .equihash_fork_height
        .saturating_add(params.digishield_averaging_window);

    u64::from(prev_height) + 1 >= u64::from(start) && prev_height < end
}
