//! Hard-coded genesis block headers for each network.
//!
//! Genesis headers are baked into the node binary the same way the
//! teacher's `regtest_genesis_block`/`botcash_genesis_block` are: no parent
//! block, no RandomX or Argon2id dependency (height 0 always hashes with
//! SHA256d per spec.md §4.1), easiest possible target.

use crate::{
    block::{Hash256, Header},
    work::difficulty::CompactDifficulty,
};

/// Mainnet genesis block header.
pub fn mainnet_genesis_header() -> Header {
    Header {
        version: 1,
        prev_block_hash: Hash256::NULL,
        merkle_root: "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda330"
            .parse()
            .expect("valid hash literal"),
        time: 1_769_904_000, // 2026-02-01 00:00:00 UTC
        bits: CompactDifficulty(0x1f07_ffff),
        nonce: 0,
    }
}

/// Testnet genesis block header.
pub fn testnet_genesis_header() -> Header {
    let mut header = mainnet_genesis_header();
    header.time = 1_769_904_000;
    header.bits = CompactDifficulty(0x1f0f_ffff);
    header
}

/// Regtest genesis block header: easiest possible target, fixed timestamp.
pub fn regtest_genesis_header() -> Header {
    let mut header = mainnet_genesis_header();
    header.bits = CompactDifficulty(0x207f_ffff);
    header
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Height;

    /// `GetHash(genesis) == params.genesis_hash` (half of spec.md §8
    /// scenario S1; the PoW-satisfaction half is covered by
    /// `work::pow::tests::s1_genesis_uses_sha256d_and_satisfies_its_target`,
    /// which mines a real nonce against the genesis target rather than
    /// relying on this fixture's placeholder nonce).
    #[test]
    fn genesis_header_hash_matches_chain_params() {
        let header = mainnet_genesis_header();
        let params = crate::parameters::Network::Mainnet.params();
        assert_eq!(header.sha256d_hash(), params.genesis_hash);
    }

    #[test]
    fn genesis_is_always_sha256d_regardless_of_forks() {
        let params = crate::parameters::Network::Mainnet.params();
        assert_eq!(
            crate::work::pow::PoWAlgorithm::for_height(Height(0), &params),
            crate::work::pow::PoWAlgorithm::Sha256d
        );
    }
}
