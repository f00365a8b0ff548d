//! Network-identifying constants: magic bytes, address prefixes, and ports
//! (spec.md §6).

/// Four-byte magic numbers identifying each Sylum network on the wire.
///
/// Must be pairwise distinct, and distinct from the magics of upstream
/// networks this crate is aware of (Bitcoin main/test/regtest, Litecoin,
/// Dogecoin, and the teacher's own Zcash/Botcash magics) — enforced by
/// `parameters::network::tests::magics_do_not_collide_with_known_networks`.
pub mod magics {
    use crate::parameters::network::magic::Magic;

    /// Mainnet: ASCII "SYLM".
    pub const MAINNET: Magic = Magic([0x53, 0x59, 0x4c, 0x4d]);
    /// Testnet: ASCII "SYLT".
    pub const TESTNET: Magic = Magic([0x53, 0x59, 0x4c, 0x54]);
    /// Regtest: distinct from both of the above and from upstream regtests.
    pub const REGTEST: Magic = Magic([0x53, 0x59, 0x4c, 0x52]);

    /// Known upstream network magics this crate's magics must not collide
    /// with (spec.md §6).
    pub const KNOWN_FOREIGN: &[Magic] = &[
        Magic([0xf9, 0xbe, 0xb4, 0xd9]), // Bitcoin mainnet
        Magic([0x0b, 0x11, 0x09, 0x07]), // Bitcoin testnet3
        Magic([0xfa, 0xbf, 0xb5, 0xda]), // Bitcoin regtest
        Magic([0xfb, 0xc0, 0xb6, 0xdb]), // Litecoin mainnet
        Magic([0xfc, 0xc1, 0xb7, 0xdc]), // Dogecoin mainnet
        Magic([0x24, 0xe9, 0x27, 0x64]), // Zcash mainnet (teacher's upstream)
    ];
}

/// Default P2P and RPC ports (spec.md §6: "defaults, not consensus").
pub mod ports {
    /// Mainnet default P2P port.
    pub const MAINNET_P2P: u16 = 9633;
    /// Mainnet default RPC port.
    pub const MAINNET_RPC: u16 = 9632;
    /// Testnet default P2P port.
    pub const TESTNET_P2P: u16 = 19633;
    /// Testnet default RPC port.
    pub const TESTNET_RPC: u16 = 19632;
}

/// Bech32 human-readable parts and legacy Base58Check version bytes
/// (spec.md §6).
pub mod address {
    /// Mainnet bech32 HRP.
    pub const MAINNET_HRP: &str = "syl";
    /// Testnet bech32 HRP.
    pub const TESTNET_HRP: &str = "tsyl";
    /// Regtest bech32 HRP.
    pub const REGTEST_HRP: &str = "rsyl";

    /// HRPs this crate's HRPs must stay distinct from (spec.md §6).
    pub const KNOWN_FOREIGN_HRPS: &[&str] = &["bc", "tb", "bcrt", "ltc", "tltc"];

    /// Base58Check version byte for legacy addresses: 35 (char 'F').
    pub const B58_PUBKEY_ADDRESS_PREFIX: u8 = 35;
}
