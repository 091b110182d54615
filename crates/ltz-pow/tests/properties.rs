use bitcoin::hashes::Hash;
use bitcoin::BlockHash;
use proptest::prelude::*;

use ltz_pow::chain::ChainEntry;
use ltz_pow::pow::{CompactTarget, Target};
use ltz_pow::util::blockhash_to_target;
use ltz_pow::{check_proof_of_work, next_work_required, ActiveChain, BlockRecord, Params};
use primitive_types::U256;

const START: i64 = 1_600_000_000;

/// Builds a chain from per-block solve times and compact targets.
fn chain(blocks: &[(i64, u32)]) -> ActiveChain {
    let mut time = START;
    blocks
        .iter()
        .map(|&(solvetime, bits)| {
            time += solvetime;
            BlockRecord::new(time, CompactTarget::new(bits))
        })
        .collect()
}

fn network_params() -> impl Strategy<Value = Params> {
    prop_oneof![
        Just(Params {
            lwma_activation_height: 60,
            ..Params::MAINNET
        }),
        Just(Params {
            equihash_fork_height: 30,
            lwma_activation_height: 90,
            ..Params::TESTNET
        }),
        Just(Params::MAINNET),
    ]
}

fn history() -> impl Strategy<Value = Vec<(i64, u32)>> {
    // exponents 0x18..=0x20 and arbitrary mantissas, sign bit included
    prop::collection::vec((-600i64..3_000, (0x18u32..=0x20, 0u32..0x0100_0000)), 1..140)
        .prop_map(|blocks| {
            blocks
                .into_iter()
                .map(|(solvetime, (exponent, mantissa))| (solvetime, exponent << 24 | mantissa))
                .collect()
        })
}

proptest! {
    /// The required target never exceeds the network limit.
    #[test]
    fn next_work_never_exceeds_pow_limit(params in network_params(), blocks in history()) {
        let chain = chain(&blocks);
        let tip = chain.tip().unwrap();
        let bits = next_work_required(Some(&tip), None, &params);
        prop_assert!(bits.decode().target <= params.pow_limit);
    }

    /// Identical history and parameters give identical results.
    #[test]
    fn next_work_is_deterministic(params in network_params(), blocks in history()) {
        let first = chain(&blocks);
        let second = chain(&blocks);
        let a = next_work_required(first.tip().as_ref(), None, &params);
        let b = next_work_required(second.tip().as_ref(), None, &params);
        let c = next_work_required(first.tip().as_ref(), None, &params);
        prop_assert_eq!(a, b);
        prop_assert_eq!(a, c);
    }

    /// Targets with at most three significant bytes survive encoding.
    #[test]
    fn exact_targets_round_trip(mantissa in 1u32..0x0080_0000, shift in 0usize..29) {
        let value = U256::from(mantissa) << (8 * shift);
        let compact = Target::new(value).to_compact();
        let decoded = compact.decode();
        prop_assert!(!decoded.negative);
        prop_assert!(!decoded.overflow);
        prop_assert_eq!(decoded.target.value(), value);
    }

    /// Encoding only ever rounds toward zero.
    #[test]
    fn encoding_rounds_down(bytes in prop::array::uniform32(0u8..)) {
        let target = Target::from_be_bytes(&bytes);
        let decoded = target.to_compact().decode();
        prop_assert!(!decoded.negative);
        prop_assert!(decoded.target <= target);
    }

    /// A hash passing the check also passes any easier valid target.
    #[test]
    fn easier_targets_accept_more(
        hash_bytes in prop::array::uniform32(0u8..),
        mantissa in 1u32..0x0080_0000,
        exponent in 4u32..0x1f,
    ) {
        let params = Params::MAINNET;
        let hash = BlockHash::from_byte_array(hash_bytes);
        let bits = CompactTarget::new(exponent << 24 | mantissa);
        let easier = CompactTarget::new((exponent + 1) << 24 | mantissa);
        if check_proof_of_work(&hash, bits, &params) {
            prop_assert!(blockhash_to_target(&hash) <= bits.decode().target);
            if easier.decode().target <= params.pow_limit {
                prop_assert!(check_proof_of_work(&hash, easier, &params));
            }
        }
    }
}

#[test]
fn genesis_is_deterministic() {
    let params = Params::TESTNET;
    let a = next_work_required(None::<&ChainEntry<'_>>, None, &params);
    let b = next_work_required(None::<&ChainEntry<'_>>, None, &params);
    assert_eq!(a, b);
    assert_eq!(a, params.pow_limit.to_compact());
}
