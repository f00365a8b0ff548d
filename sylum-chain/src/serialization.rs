//! Consensus-critical binary (de)serialization.
//!
//! Mirrors the shape of the teacher's `ZcashSerialize`/`ZcashDeserialize`
//! traits: every consensus type knows how to write itself to any [`Write`]
//! and parse itself from any [`Read`], with a deterministic, bit-exact
//! encoding. Two distinct values must never serialize to the same bytes, and
//! re-serializing a parsed value must reproduce the original bytes exactly
//! (spec.md invariant: "serialization is deterministic").

use std::io;

/// A type that can be written in its canonical consensus encoding.
pub trait ConsensusEncode {
    /// Write `self` to `writer` in consensus format.
    fn consensus_encode<W: io::Write>(&self, writer: W) -> io::Result<()>;

    /// Encode `self` into a freshly allocated `Vec<u8>`.
    fn consensus_encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.consensus_encode(&mut buf)
            .expect("serialization into a Vec can't fail");
        buf
    }
}

/// A type that can be parsed from its canonical consensus encoding.
pub trait ConsensusDecode: Sized {
    /// Try to parse `Self` from `reader`.
    fn consensus_decode<R: io::Read>(reader: R) -> Result<Self, SerializationError>;
}

/// Parse `Self` out of a byte slice, following the same convenience shape as
/// the teacher's `zcash_deserialize_into`.
pub trait ConsensusDecodeInto {
    /// Attempt to parse `T` out of `self`.
    fn consensus_decode_into<T: ConsensusDecode>(&self) -> Result<T, SerializationError>;
}

impl<S: AsRef<[u8]>> ConsensusDecodeInto for S {
    fn consensus_decode_into<T: ConsensusDecode>(&self) -> Result<T, SerializationError> {
        T::consensus_decode(self.as_ref())
    }
}

/// Errors produced while parsing consensus-encoded data.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// An I/O error occurred, usually truncated input.
    #[error("parse error: {0}")]
    Io(#[from] io::Error),

    /// The input had leftover bytes after a fixed-size value was parsed.
    #[error("unexpected trailing bytes: expected exactly {expected} bytes, got {actual}")]
    TrailingBytes {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },
}
