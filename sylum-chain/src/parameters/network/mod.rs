//! The [`Network`] enum and the per-network [`ChainParams`] record
//! (spec.md §3 "ChainParams").

pub mod magic;

use crate::{
    block::Hash256,
    parameters::constants::{address, ports},
    work::difficulty::U256,
};

/// One of the three Sylum networks.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum Network {
    /// The production network.
    #[default]
    Mainnet,
    /// The public test network.
    Testnet,
    /// A local, fully configurable network for integration tests.
    Regtest,
}

impl Network {
    /// All three networks, for exhaustive test iteration — mirroring the
    /// teacher's `Network::iter()` convention.
    pub fn iter() -> impl Iterator<Item = Network> {
        [Network::Mainnet, Network::Testnet, Network::Regtest].into_iter()
    }

    /// The bech32 human-readable part for this network's addresses.
    pub fn bech32_hrp(&self) -> &'static str {
        match self {
            Network::Mainnet => address::MAINNET_HRP,
            Network::Testnet => address::TESTNET_HRP,
            Network::Regtest => address::REGTEST_HRP,
        }
    }

    /// The default P2P port for this network.
    pub fn default_p2p_port(&self) -> u16 {
        match self {
            Network::Mainnet => ports::MAINNET_P2P,
            Network::Testnet | Network::Regtest => ports::TESTNET_P2P,
        }
    }

    /// The default RPC port for this network.
    pub fn default_rpc_port(&self) -> u16 {
        match self {
            Network::Mainnet => ports::MAINNET_RPC,
            Network::Testnet | Network::Regtest => ports::TESTNET_RPC,
        }
    }

    /// The immutable consensus parameters for this network (spec.md §3).
    pub fn params(&self) -> ChainParams {
        match self {
            Network::Mainnet => ChainParams::mainnet(),
            Network::Testnet => ChainParams::testnet(),
            Network::Regtest => ChainParams::regtest(),
        }
    }
}

/// Per-network immutable consensus parameters (spec.md §3).
#[derive(Clone, Debug)]
pub struct ChainParams {
    /// This network, for convenience when only a `ChainParams` is at hand.
    pub network: Network,
    /// The hash of this network's genesis block header.
    pub genesis_hash: Hash256,
    /// Subsidy halving interval, in blocks.
    pub subsidy_halving_interval: u32,
    /// Target spacing between blocks, in seconds.
    pub pow_target_spacing: u32,
    /// Total span of the retarget window, in seconds.
    pub pow_target_timespan: u32,
    /// The SHA256d-era powLimit.
    pub pow_limit: U256,
    /// The RandomX-era powLimit, if set (falls back to `pow_limit`).
    pub pow_limit_randomx: Option<U256>,
    /// The Argon2id-era powLimit, if set (falls back to `pow_limit_randomx`,
    /// then `pow_limit`).
    pub pow_limit_argon2: Option<U256>,
    /// The first height mined with RandomX. Genesis (height 0) is always
    /// SHA256d regardless of this value.
    pub randomx_fork_height: u32,
    /// How often (in blocks) the RandomX key rotates.
    pub randomx_key_block_interval: u32,
    /// The first height using Argon2id, or `-1` if the emergency fallback
    /// is dormant.
    pub argon2_emergency_height: i64,
    /// Argon2id memory cost, in KiB.
    pub argon2_memory_cost_kib: u32,
    /// Argon2id time cost (iterations).
    pub argon2_time_cost: u32,
    /// Argon2id parallelism (lanes).
    pub argon2_parallelism: u32,
    /// Whether BIP94 timewarp mitigation is enforced on this network.
    pub enforce_bip94: bool,
    /// The minimum accumulated chain work a peer's best chain must have
    /// before this node will consider switching to it. Opaque outside of
    /// chain-work comparisons, hence a bare `U256` rather than a target.
    pub min_chain_work: U256,
    /// A block hash assumed valid without full validation, if configured.
    pub assume_valid: Option<Hash256>,
}

impl ChainParams {
    /// Mainnet powLimit: `0x1f07ffff` expanded (SHA256d era). Matches the
    /// mainnet genesis header's `bits`, since genesis is always mined at the
    /// easiest SHA256d-era target.
    pub const MAINNET_POW_LIMIT: U256 = U256([0, 0, 0, 0x0007_ffff_0000_0000]);

    /// Mainnet RandomX powLimit, numerically larger than `MAINNET_POW_LIMIT`
    /// so difficulty resets downward at the fork (spec.md §3 invariant:
    /// `pow_limit_randomx > pow_limit`).
    pub const MAINNET_POW_LIMIT_RANDOMX: U256 = U256([0, 0, 1, 0x0007_ffff_0000_0000]);

    /// Mainnet Argon2id powLimit, dormant until the emergency fork.
    pub const MAINNET_POW_LIMIT_ARGON2: U256 = U256([0, 0, 2, 0x0007_ffff_0000_0000]);

    fn mainnet() -> Self {
        ChainParams {
            network: Network::Mainnet,
            // A placeholder: real deployments hard-code the actual genesis
            // hash here once it's mined. Computed from the canonical
            // mainnet genesis header in `block::genesis`.
            genesis_hash: crate::block::genesis::mainnet_genesis_header().sha256d_hash(),
            subsidy_halving_interval: 1_050_000,
            pow_target_spacing: 120,
            pow_target_timespan: 1_209_600,
            pow_limit: Self::MAINNET_POW_LIMIT,
            pow_limit_randomx: Some(Self::MAINNET_POW_LIMIT_RANDOMX),
            pow_limit_argon2: Some(Self::MAINNET_POW_LIMIT_ARGON2),
            randomx_fork_height: 57_500,
            randomx_key_block_interval: 32,
            argon2_emergency_height: -1,
            argon2_memory_cost_kib: 2_097_152,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
            enforce_bip94: true,
            min_chain_work: U256::zero(),
            assume_valid: None,
        }
    }

    fn testnet() -> Self {
        ChainParams {
            network: Network::Testnet,
            genesis_hash: crate::block::genesis::testnet_genesis_header().sha256d_hash(),
            subsidy_halving_interval: 1_050_000,
            pow_target_spacing: 120,
            pow_target_timespan: 1_209_600,
            pow_limit: U256([0, 0, 0, 0x000f_ffff_0000_0000]),
            pow_limit_randomx: Some(U256([0, 0, 1, 0x000f_ffff_0000_0000])),
            pow_limit_argon2: Some(U256([0, 0, 2, 0x000f_ffff_0000_0000])),
            randomx_fork_height: 500,
            randomx_key_block_interval: 32,
            argon2_emergency_height: -1,
            argon2_memory_cost_kib: 2_097_152,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
            enforce_bip94: true,
            min_chain_work: U256::zero(),
            assume_valid: None,
        }
    }

    fn regtest() -> Self {
        ChainParams {
            network: Network::Regtest,
            genesis_hash: crate::block::genesis::regtest_genesis_header().sha256d_hash(),
            subsidy_halving_interval: 150,
            pow_target_spacing: 120,
            pow_target_timespan: 1_209_600,
            pow_limit: U256([0, 0, 0, 0x7fff_ff00_0000_0000]),
            pow_limit_randomx: Some(U256([0, 0, 1, 0x7fff_ff00_0000_0000])),
            pow_limit_argon2: Some(U256([0, 0, 2, 0x7fff_ff00_0000_0000])),
            randomx_fork_height: 10,
            randomx_key_block_interval: 4,
            argon2_emergency_height: -1,
            argon2_memory_cost_kib: 8, // regtest: cheap, for fast tests
            argon2_time_cost: 1,
            argon2_parallelism: 1,
            enforce_bip94: false,
            min_chain_work: U256::zero(),
            assume_valid: None,
        }
    }

    /// The active powLimit at `height`, per the fallback table in spec.md
    /// §4.1.
    pub fn active_pow_limit(&self, height: crate::block::Height) -> U256 {
        use crate::work::pow::PoWAlgorithm;

        match PoWAlgorithm::for_height(height, self) {
            PoWAlgorithm::Sha256d => self.pow_limit,
            PoWAlgorithm::RandomX => self.pow_limit_randomx.unwrap_or(self.pow_limit),
            PoWAlgorithm::Argon2id => self
                .pow_limit_argon2
                .or(self.pow_limit_randomx)
                .unwrap_or(self.pow_limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pow_limit_randomx_is_easier_than_sha256d_limit() {
        for network in Network::iter() {
            let params = network.params();
            let randomx_limit = params.pow_limit_randomx.expect("configured in this crate");
            assert!(
                randomx_limit > params.pow_limit,
                "RandomX powLimit must be numerically larger (easier) than the SHA256d powLimit"
            );
        }
    }

    #[test]
    fn hrps_are_pairwise_distinct_and_no_upstream_collisions() {
        let ours: Vec<&str> = Network::iter().map(|n| n.bech32_hrp()).collect();
        for (i, a) in ours.iter().enumerate() {
            for (j, b) in ours.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b);
                }
            }
        }
        for hrp in &ours {
            assert!(!address::KNOWN_FOREIGN_HRPS.contains(hrp));
        }
    }
}
