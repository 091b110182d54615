use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::{network::Network, pow::Target};

/// `0007ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff`
const MAINNET_POW_LIMIT: Target = Target::new(U256([
    u64::MAX,
    u64::MAX,
    u64::MAX,
    0x0007_ffff_ffff_ffff,
]));

/// `07ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff`
const TESTNET_POW_LIMIT: Target = Target::new(U256([
    u64::MAX,
    u64::MAX,
    u64::MAX,
    0x07ff_ffff_ffff_ffff,
]));

/// `0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f`
const REGTEST_POW_LIMIT: Target = Target::new(U256([0x0f0f_0f0f_0f0f_0f0f; 4]));

/// Consensus parameters for different networks.
///
/// Every spacing, window and weight is expected to be non-zero; the network
/// constants below satisfy that and custom parameter sets must as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Network for which these parameters are defined.
    pub network: Network,
    /// The maximum attainable target value for these params.
    pub pow_limit: Target,
    /// Expected amount of time to mine one block, in seconds.
    pub pow_target_spacing: i64,
    /// Determines whether minimal difficult may be used for blocks or not.
    pub pow_allow_min_difficulty_blocks: bool,
    /// Determines whether retargeting is disabled for this network or not.
    pub pow_no_retargeting: bool,
    /// Number of blocks averaged by Digishield.
    pub digishield_averaging_window: u32,
    /// Maximum percentage by which Digishield may lower the difficulty.
    pub digishield_max_adjust_down: i64,
    /// Maximum percentage by which Digishield may raise the difficulty.
    pub digishield_max_adjust_up: i64,
    /// Block spacing Digishield retargets towards, in seconds.
    pub digishield_target_spacing: i64,
    /// The block height at which the Equihash parameters changed. Digishield
    /// resets to the proof-of-work limit for one averaging window after it.
    pub equihash_fork_height: u32,
    /// The block height from which LWMA replaces Digishield. Must exceed
    /// `lwma_averaging_window`.
    pub lwma_activation_height: u32,
    /// Number of blocks averaged by LWMA (`N`).
    pub lwma_averaging_window: u32,
    /// LWMA weight constant (`k`), `(N + 1) / 2 * pow_target_spacing` for an
    /// unbiased average.
    pub lwma_adjusted_weight: i64,
    /// LWMA minimum denominator (`dnorm`) bounding the weighted solve time
    /// from below.
    pub lwma_min_denominator: i64,
    /// Whether LWMA caps each solve time at six target spacings.
    pub lwma_solvetime_limitation: bool,
}

impl Params {
    /// Consensus parameters for the main network.
    pub const MAINNET: Self = Self {
        network: Network::Mainnet,
        pow_limit: MAINNET_POW_LIMIT,
        pow_target_spacing: 150, // 2.5 minutes
        pow_allow_min_difficulty_blocks: false,
        pow_no_retargeting: false,
        digishield_averaging_window: 17,
        digishield_max_adjust_down: 32, // 32% adjustment down
        digishield_max_adjust_up: 16,   // 16% adjustment up
        digishield_target_spacing: 150,
        equihash_fork_height: 95_000,
        lwma_activation_height: 95_100,
        lwma_averaging_window: 45,
        lwma_adjusted_weight: 3_450, // (45 + 1) / 2 * 150
        lwma_min_denominator: 10,
        lwma_solvetime_limitation: true,
    };
    /// Consensus parameters for the test network.
    pub const TESTNET: Self = Self {
        network: Network::Testnet,
        pow_limit: TESTNET_POW_LIMIT,
        pow_target_spacing: 150, // 2.5 minutes
        pow_allow_min_difficulty_blocks: true,
        pow_no_retargeting: false,
        digishield_averaging_window: 17,
        digishield_max_adjust_down: 32,
        digishield_max_adjust_up: 16,
        digishield_target_spacing: 150,
        equihash_fork_height: 100,
        lwma_activation_height: 200,
        lwma_averaging_window: 45,
        lwma_adjusted_weight: 3_450,
        lwma_min_denominator: 10,
        lwma_solvetime_limitation: true,
    };
    /// Consensus parameters for the regression-test network.
    pub const REGTEST: Self = Self {
        network: Network::Regtest,
        pow_limit: REGTEST_POW_LIMIT,
        pow_target_spacing: 150, // 2.5 minutes
        pow_allow_min_difficulty_blocks: true,
        pow_no_retargeting: true,
        digishield_averaging_window: 17,
        digishield_max_adjust_down: 0, // Turn off adjustment down
        digishield_max_adjust_up: 0,   // Turn off adjustment up
        digishield_target_spacing: 150,
        equihash_fork_height: 0,
        lwma_activation_height: 100,
        lwma_averaging_window: 45,
        lwma_adjusted_weight: 3_450,
        lwma_min_denominator: 10,
        lwma_solvetime_limitation: true,
    };

    /// The ideal duration of one Digishield averaging window, in seconds.
    #[allow(
        clippy::arithmetic_side_effects,
        reason = "Window and spacing are small configuration values"
    )]
    pub fn digishield_averaging_window_timespan(&self) -> i64 {
        i64::from(self.digishield_averaging_window) * self.digishield_target_spacing
    }

    /// Lower bound of the damped Digishield timespan.
    #[allow(
        clippy::arithmetic_side_effects,
        reason = "Percentages and timespans are small configuration values"
    )]
    pub fn digishield_min_actual_timespan(&self) -> i64 {
        self.digishield_averaging_window_timespan() * (100 - self.digishield_max_adjust_up) / 100
    }

    /// Upper bound of the damped Digishield timespan.
    #[allow(
        clippy::arithmetic_side_effects,
        reason = "Percentages and timespans are small configuration values"
    )]
    pub fn digishield_max_actual_timespan(&self) -> i64 {
        self.digishield_averaging_window_timespan() * (100 + self.digishield_max_adjust_down) / 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pow_limits() {
        assert_eq!(
            Params::MAINNET.pow_limit,
            Target::from_hex("0007ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff")
                .unwrap()
        );
        assert_eq!(
            Params::TESTNET.pow_limit,
            Target::from_hex("07ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff")
                .unwrap()
        );
        assert_eq!(
            Params::REGTEST.pow_limit,
            Target::from_hex("0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f")
                .unwrap()
        );
    }

    #[test]
    fn test_digishield_timespans() {
        let params = Params::MAINNET;
        assert_eq!(params.digishield_averaging_window_timespan(), 17 * 150);
        assert_eq!(params.digishield_min_actual_timespan(), 2550 * 84 / 100);
        assert_eq!(params.digishield_max_actual_timespan(), 2550 * 132 / 100);
    }

    #[test]
    fn test_lwma_activation_exceeds_window() {
        for params in [Params::MAINNET, Params::TESTNET, Params::REGTEST] {
            assert!(params.lwma_activation_height > params.lwma_averaging_window);
        }
    }

    #[test]
    fn test_lwma_weight_is_unbiased() {
        for params in [Params::MAINNET, Params::TESTNET, Params::REGTEST] {
            let n = i64::from(params.lwma_averaging_window);
            assert_eq!(params.lwma_adjusted_weight * 2, (n + 1) * params.pow_target_spacing);
        }
    }

    #[test]
    fn test_params_serde_round_trip() {
        let json = serde_json::to_string(&Params::TESTNET).unwrap();
        let params: Params = serde_json::from_str(&json).unwrap();
        assert_eq!(params, Params::TESTNET);
    }
}
