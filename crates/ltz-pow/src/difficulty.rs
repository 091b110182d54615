//! Difficulty retargeting.
//!
//! Two algorithms are in use, selected purely by the height of the block being
//! produced: [`digishield`] below `lwma_activation_height`, [`lwma`] from it
//! onwards. Both stay separate implementations because historical blocks of
//! each era must keep validating bit-for-bit.

use tracing::debug;

use crate::blockdata::BlockHeader;
use crate::chain::ChainNode;
use crate::consensus::Params;
use crate::pow::CompactTarget;

pub mod digishield;
pub mod lwma;

/// Computes the compact target the next block must carry.
///
/// # Arguments
///
/// * `prev` - The current chain tip, `None` when producing the genesis block
/// * `candidate` - The header being validated or assembled, if available. Only
///   its timestamp is read, for the min-difficulty rule of test networks.
/// * `params` - Consensus parameters of the active network
///
/// # Returns
///
/// The required `bits` for the block at height `prev.height() + 1`
pub fn next_work_required<N: ChainNode>(
    prev: Option<&N>,
    candidate: Option<&BlockHeader>,
    params: &Params,
) -> CompactTarget {
    let height = prev.map_or(0, |prev| prev.height().saturating_add(1));

    if height < params.lwma_activation_height {
        debug!("Using Digishield for height {}", height);
        digishield::next_work_required(prev, candidate, params)
    } else {
        debug!("Using LWMA for height {}", height);
        lwma::next_work_required(prev, candidate, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ActiveChain, BlockRecord};

    const BITS: CompactTarget = CompactTarget::new(0x1d6a9a0a);

    fn chain(len: i64, spacing: i64) -> ActiveChain {
        (0..len)
            .map(|i| BlockRecord::new(1_600_000_000 + i * spacing, BITS))
            .collect()
    }

    #[test]
    fn test_genesis_returns_pow_limit() {
        let params = Params::MAINNET;
        let none: Option<&crate::chain::ChainEntry<'_>> = None;
        assert_eq!(
            next_work_required(none, None, &params),
            params.pow_limit.to_compact()
        );
    }

    #[test]
    fn test_dispatch_by_height() {
        // on test networks LWMA only applies the min-difficulty rule after
        // two spacings, Digishield after six
        let params = Params {
            lwma_activation_height: 50,
            ..Params::TESTNET
        };
        let chain = chain(60, 150);
        let late = BlockHeader {
            time: 1_600_000_000 + 49 * 150 + 400,
            ..BlockHeader::default()
        };

        // candidate at height 49: Digishield, 400s is not stale yet
        let prev = chain.at(48).unwrap();
        let late_48 = BlockHeader {
            time: 1_600_000_000 + 48 * 150 + 400,
            ..BlockHeader::default()
        };
        assert_ne!(
            next_work_required(Some(&prev), Some(&late_48), &params),
            params.pow_limit.to_compact()
        );

        // candidate at height 50: LWMA, 400s is past 2 * 150
        let prev = chain.at(49).unwrap();
        assert_eq!(
            next_work_required(Some(&prev), Some(&late), &params),
            params.pow_limit.to_compact()
        );
    }

    #[test]
    fn test_lwma_steady_state_through_dispatcher() {
        let params = Params {
            lwma_activation_height: 50,
            ..Params::MAINNET
        };
        let chain = chain(60, 150);
        let tip = chain.tip().unwrap();
        assert_eq!(next_work_required(Some(&tip), None, &params), BITS);
    }
}
