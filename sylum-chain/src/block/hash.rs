//! `Hash256`: a 256-bit hash, little-endian on the wire.

use std::{fmt, io, str::FromStr};

#[cfg(feature = "proptest-impl")]
use proptest_derive::Arbitrary;

use crate::serialization::{ConsensusDecode, ConsensusEncode, SerializationError};

/// A 256-bit hash. Stored internally in the same byte order as the wire
/// format (little-endian); big-endian only when interpreted as an
/// arithmetic integer for target comparison (see `work::difficulty::U256`).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "proptest-impl", derive(Arbitrary))]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// The null hash: all zeroes. Used as the `prev_block_hash` of genesis.
    pub const NULL: Hash256 = Hash256([0u8; 32]);

    /// `true` if every byte is zero.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Displayed big-endian (reversed), matching Bitcoin/Zcash block
        // explorers and RPC output.
        let mut reversed = self.0;
        reversed.reverse();
        f.debug_tuple("Hash256").field(&hex::encode(reversed)).finish()
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reversed = self.0;
        reversed.reverse();
        write!(f, "{}", hex::encode(reversed))
    }
}

impl FromStr for Hash256 {
    type Err = SerializationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = hex::decode(s).map_err(|e| {
            SerializationError::Io(io::Error::new(io::ErrorKind::InvalidInput, e))
        })?;
        if bytes.len() != 32 {
            return Err(SerializationError::TrailingBytes {
                expected: 32,
                actual: bytes.len(),
            });
        }
        bytes.reverse();
        let mut array = [0u8; 32];
        array.copy_from_slice(&bytes);
        Ok(Hash256(array))
    }
}

impl ConsensusEncode for Hash256 {
    fn consensus_encode<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&self.0)
    }
}

impl ConsensusDecode for Hash256 {
    fn consensus_decode<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let mut bytes = [0u8; 32];
        reader.read_exact(&mut bytes)?;
        Ok(Hash256(bytes))
    }
}

impl serde::Serialize for Hash256 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Hash256 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
