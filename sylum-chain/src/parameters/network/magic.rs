//! Network `Magic` type and implementation.

use std::fmt;

use crate::parameters::{constants::magics, Network};

#[cfg(feature = "proptest-impl")]
use proptest_derive::Arbitrary;

/// A magic number identifying the network.
#[derive(Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "proptest-impl", derive(Arbitrary))]
pub struct Magic(pub [u8; 4]);

impl fmt::Debug for Magic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Magic").field(&hex::encode(self.0)).finish()
    }
}

impl Network {
    /// Get the magic value associated with this `Network`.
    pub fn magic(&self) -> Magic {
        match self {
            Network::Mainnet => magics::MAINNET,
            Network::Testnet => magics::TESTNET,
            Network::Regtest => magics::REGTEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::constants::magics;

    #[test]
    fn magic_debug() {
        let _guard = sylum_test::init();

        assert_eq!(format!("{:?}", magics::MAINNET), "Magic(\"53594c4d\")");
        assert_eq!(format!("{:?}", magics::TESTNET), "Magic(\"53594c54\")");
    }

    /// Mainnet magic bytes spell "SYLM" in ASCII (spec.md §6).
    #[test]
    fn mainnet_magic_is_sylm() {
        assert_eq!(&magics::MAINNET.0, b"SYLM");
    }

    #[test]
    fn testnet_magic_is_sylt() {
        assert_eq!(&magics::TESTNET.0, b"SYLT");
    }

    #[test]
    fn network_magic_accessor() {
        assert_eq!(Network::Mainnet.magic(), magics::MAINNET);
        assert_eq!(Network::Testnet.magic(), magics::TESTNET);
        assert_eq!(Network::Regtest.magic(), magics::REGTEST);
    }

    /// Mainnet, testnet, and regtest magics are pairwise distinct, and
    /// distinct from every known upstream network (spec.md §6).
    #[test]
    fn magics_are_pairwise_distinct_and_no_upstream_collisions() {
        let ours = [magics::MAINNET, magics::TESTNET, magics::REGTEST];
        for (i, a) in ours.iter().enumerate() {
            for (j, b) in ours.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "our own network magics must be pairwise distinct");
                }
            }
            for foreign in magics::KNOWN_FOREIGN {
                assert_ne!(a, foreign, "must not collide with known upstream magics");
            }
        }
    }

    #[cfg(feature = "proptest-impl")]
    mod prop {
        use proptest::prelude::*;

        use super::super::Magic;

        proptest! {
            #[test]
            fn magic_from_array(data in any::<[u8; 4]>()) {
                prop_assert_eq!(format!("{:?}", Magic(data)), format!("Magic({:x?})", hex::encode(data)));
            }
        }
    }
}
