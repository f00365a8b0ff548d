//! The 80-byte canonical block header (spec.md §3, §4.7).

use std::io;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

#[cfg(feature = "proptest-impl")]
use proptest_derive::Arbitrary;

use crate::{
    block::Hash256,
    serialization::{ConsensusDecode, ConsensusEncode, SerializationError},
    work::difficulty::CompactDifficulty,
};

/// Exactly 80 bytes: version, prev_block_hash, merkle_root, time, bits, nonce.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "proptest-impl", derive(Arbitrary))]
pub struct Header {
    /// The block version number, signed and little-endian on the wire.
    pub version: i32,
    /// The hash of the previous block's header.
    pub prev_block_hash: Hash256,
    /// The merkle root of the block's transactions.
    pub merkle_root: Hash256,
    /// Seconds since the Unix epoch.
    pub time: u32,
    /// The compact-encoded proof-of-work target ("nBits").
    pub bits: CompactDifficulty,
    /// The nonce miners vary to search for a valid proof of work.
    pub nonce: u32,
}

/// The length of a serialized header: 4 + 32 + 32 + 4 + 4 + 4.
pub const HEADER_LEN: usize = 80;

impl ConsensusEncode for Header {
    fn consensus_encode<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_i32::<LittleEndian>(self.version)?;
        self.prev_block_hash.consensus_encode(&mut writer)?;
        self.merkle_root.consensus_encode(&mut writer)?;
        writer.write_u32::<LittleEndian>(self.time)?;
        writer.write_u32::<LittleEndian>(self.bits.0)?;
        writer.write_u32::<LittleEndian>(self.nonce)?;
        Ok(())
    }
}

impl ConsensusDecode for Header {
    fn consensus_decode<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let version = reader.read_i32::<LittleEndian>()?;
        let prev_block_hash = Hash256::consensus_decode(&mut reader)?;
        let merkle_root = Hash256::consensus_decode(&mut reader)?;
        let time = reader.read_u32::<LittleEndian>()?;
        let bits = CompactDifficulty(reader.read_u32::<LittleEndian>()?);
        let nonce = reader.read_u32::<LittleEndian>()?;

        Ok(Header {
            version,
            prev_block_hash,
            merkle_root,
            time,
            bits,
            nonce,
        })
    }
}

impl Header {
    /// Serialize to exactly [`HEADER_LEN`] bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let encoded = self.consensus_encode_to_vec();
        debug_assert_eq!(encoded.len(), HEADER_LEN);
        let mut bytes = [0u8; HEADER_LEN];
        bytes.copy_from_slice(&encoded);
        bytes
    }

    /// `SHA256(SHA256(header))`, interpreted as a [`Hash256`] (spec.md
    /// §4.7). Height 0 (genesis) always uses this hash regardless of any
    /// RandomX/Argon2id fork configuration, so it needs no pool or chain
    /// parameters to compute.
    pub fn sha256d_hash(&self) -> Hash256 {
        use sha2::{Digest, Sha256};

        let bytes = self.to_bytes();
        let first = Sha256::digest(bytes);
        let second = Sha256::digest(first);
        let mut out = [0u8; 32];
        out.copy_from_slice(&second);
        Hash256(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::work::difficulty::CompactDifficulty;

    fn sample_header() -> Header {
        Header {
            version: 4,
            prev_block_hash: Hash256([1u8; 32]),
            merkle_root: Hash256([2u8; 32]),
            time: 1_769_904_000,
            bits: CompactDifficulty(0x1f07ffff),
            nonce: 42,
        }
    }

    #[test]
    fn serialized_length_is_80_bytes() {
        assert_eq!(sample_header().to_bytes().len(), HEADER_LEN);
    }

    #[test]
    fn round_trips_through_bytes() {
        let header = sample_header();
        let bytes = header.to_bytes();
        let parsed = Header::consensus_decode(&bytes[..]).unwrap();
        assert_eq!(header, parsed);
        assert_eq!(parsed.to_bytes(), bytes);
    }

    #[test]
    fn any_field_change_changes_the_bytes() {
        let header = sample_header();
        let mut other = header;
        other.nonce = other.nonce.wrapping_add(1);
        assert_ne!(header.to_bytes(), other.to_bytes());

        let mut other = header;
        other.time = other.time.wrapping_add(1);
        assert_ne!(header.to_bytes(), other.to_bytes());
    }

    /// Two distinct nonces on the same template yield distinct hashes
    /// (spec.md §3 invariant), and more generally any field change changes
    /// `GetHash()` (spec.md §8 invariant 4, for the SHA256d branch).
    #[test]
    fn distinct_headers_hash_differently() {
        let header = sample_header();
        let mut other = header;
        other.nonce = other.nonce.wrapping_add(1);
        assert_ne!(header.sha256d_hash(), other.sha256d_hash());
    }
}
