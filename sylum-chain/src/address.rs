//! Address encode/decode (spec.md §6): a bech32-encoded shielded-style
//! address over each network's HRP, and a legacy Base58Check transparent
//! address over the fixed version byte.
//!
//! This crate stops at the byte-level encode/decode that makes the
//! constants in [`crate::parameters::constants::address`] load-bearing
//! rather than declared-and-unused; script construction, key derivation,
//! and the wallet that produces the payload bytes are out of scope (spec.md
//! §1).

use bech32::{Bech32, Hrp};
use thiserror::Error;

use crate::parameters::{constants::address::B58_PUBKEY_ADDRESS_PREFIX, Network};

/// A transparent address payload: a 20-byte hash (RIPEMD160(SHA256(pubkey)),
/// the same shape as upstream P2PKH).
pub const TRANSPARENT_PAYLOAD_LEN: usize = 20;

/// Errors encoding or decoding an address.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum AddressError {
    /// Bech32 decoding failed.
    #[error("invalid bech32 address: {0}")]
    Bech32Decode(String),

    /// The decoded bech32 HRP did not match any known network.
    #[error("bech32 address has an unrecognized human-readable part: {0}")]
    UnknownHrp(String),

    /// Base58Check decoding failed (bad checksum, bad alphabet, wrong
    /// version byte).
    #[error("invalid base58check address: {0}")]
    Base58Decode(String),

    /// The decoded payload was not the expected length for its address
    /// kind.
    #[error("address payload is {actual} bytes, expected {expected}")]
    WrongLength {
        /// The length actually decoded.
        actual: usize,
        /// The length required for this address kind.
        expected: usize,
    },
}

/// Encode `payload` as a bech32 address for `network`, using that network's
/// HRP (spec.md §6).
pub fn encode_bech32(network: Network, payload: &[u8]) -> Result<String, AddressError> {
    let hrp = Hrp::parse(network.bech32_hrp()).expect("crate's own HRPs are valid bech32 HRPs");
    bech32::encode::<Bech32>(hrp, payload).map_err(|e| AddressError::Bech32Decode(e.to_string()))
}

/// Decode a bech32 address, returning the network it belongs to and its
/// raw payload bytes.
pub fn decode_bech32(address: &str) -> Result<(Network, Vec<u8>), AddressError> {
    let (hrp, data) =
        bech32::decode(address).map_err(|e| AddressError::Bech32Decode(e.to_string()))?;

    let network = Network::iter()
        .find(|n| n.bech32_hrp() == hrp.as_str())
        .ok_or_else(|| AddressError::UnknownHrp(hrp.to_string()))?;

    Ok((network, data))
}

/// Encode a 20-byte transparent payload as a legacy Base58Check address,
/// under the crate's fixed version byte (spec.md §6).
pub fn encode_transparent(payload: &[u8; TRANSPARENT_PAYLOAD_LEN]) -> String {
    bs58::encode(payload)
        .with_check_version(B58_PUBKEY_ADDRESS_PREFIX)
        .into_string()
}

/// Decode a legacy Base58Check transparent address, verifying the version
/// byte and the 20-byte payload length.
pub fn decode_transparent(address: &str) -> Result<[u8; TRANSPARENT_PAYLOAD_LEN], AddressError> {
    let payload = bs58::decode(address)
        .with_check(Some(B58_PUBKEY_ADDRESS_PREFIX))
        .into_vec()
        .map_err(|e| AddressError::Base58Decode(e.to_string()))?;

    // `bs58`'s `with_check` strips the checksum but keeps the version byte
    // at the front of the decoded payload.
    let payload = &payload[1..];

    payload.try_into().map_err(|_| AddressError::WrongLength {
        actual: payload.len(),
        expected: TRANSPARENT_PAYLOAD_LEN,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> [u8; TRANSPARENT_PAYLOAD_LEN] {
        let mut p = [0u8; TRANSPARENT_PAYLOAD_LEN];
        for (i, b) in p.iter_mut().enumerate() {
            *b = i as u8;
        }
        p
    }

    #[test]
    fn bech32_round_trips_and_identifies_its_network() {
        for network in Network::iter() {
            let data = [0xabu8; 32];
            let encoded = encode_bech32(network, &data).unwrap();
            let (decoded_network, decoded_data) = decode_bech32(&encoded).unwrap();
            assert_eq!(decoded_network, network);
            assert_eq!(decoded_data, data);
        }
    }

    #[test]
    fn bech32_addresses_start_with_the_right_hrp() {
        let encoded = encode_bech32(Network::Mainnet, &[1, 2, 3]).unwrap();
        assert!(encoded.starts_with("syl1"));
    }

    #[test]
    fn unknown_hrp_is_rejected() {
        let foreign = bech32::encode::<Bech32>(Hrp::parse("bc").unwrap(), &[1, 2, 3]).unwrap();
        assert_eq!(
            decode_bech32(&foreign),
            Err(AddressError::UnknownHrp("bc".to_string()))
        );
    }

    #[test]
    fn transparent_address_round_trips() {
        let p = payload();
        let encoded = encode_transparent(&p);
        let decoded = decode_transparent(&encoded).unwrap();
        assert_eq!(decoded, p);
    }

    #[test]
    fn transparent_address_rejects_corrupted_checksum() {
        let mut encoded = encode_transparent(&payload());
        encoded.push('x');
        assert!(decode_transparent(&encoded).is_err());
    }

    #[test]
    fn transparent_address_rejects_wrong_version_byte() {
        let encoded = bs58::encode(payload()).with_check_version(1).into_string();
        assert!(decode_transparent(&encoded).is_err());
    }
}
