//! Argon2id emergency hasher (spec.md §4.4), dormant until
//! `argon2_emergency_height` activates it (spec.md §4.1).

use argon2::{Algorithm, Argon2, Params, Version};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use thiserror::Error;

use crate::block::{Hash256, Header};

/// Hard input-size limit (spec.md §4.4 DoS guard). Block headers are 80
/// bytes; this bounds any other caller of [`Argon2Hasher::hash`].
pub const MAX_INPUT_LEN: usize = 4 * 1024 * 1024;

/// Errors constructing or invoking the Argon2id hasher.
#[derive(Debug, Error)]
pub enum Argon2Error {
    /// Memory cost below the 8 KiB consensus-minimum.
    #[error("argon2 memory cost {0} KiB is below the 8 KiB minimum")]
    MemoryTooLow(u32),

    /// Time cost (iteration count) of zero.
    #[error("argon2 time cost must be at least 1")]
    TimeCostTooLow,

    /// Parallelism (lane count) of zero.
    #[error("argon2 parallelism must be at least 1")]
    ParallelismTooLow,

    /// `data` exceeded [`MAX_INPUT_LEN`].
    #[error("input of {0} bytes exceeds the {MAX_INPUT_LEN}-byte Argon2id input limit")]
    InputTooLarge(usize),

    /// The underlying `argon2` crate rejected the parameters or input.
    #[error("argon2 hashing failed: {0}")]
    Hashing(argon2::Error),
}

/// A mutex-guarded Argon2id hasher holding consensus-fixed parameters
/// (spec.md §4.4). Construct once per network and reuse; `hash` takes
/// `&self` and is safe to call concurrently, serialized through the
/// internal mutex since `Argon2` itself is `!Sync` on some backends.
pub struct Argon2Hasher {
    argon2: Mutex<Argon2<'static>>,
}

impl Argon2Hasher {
    /// Build a hasher validating the parameters per spec.md §4.4:
    /// memory ≥ 8 KiB, time ≥ 1, parallelism ≥ 1.
    pub fn new(memory_cost_kib: u32, time_cost: u32, parallelism: u32) -> Result<Self, Argon2Error> {
        if memory_cost_kib < 8 {
            return Err(Argon2Error::MemoryTooLow(memory_cost_kib));
        }
        if time_cost < 1 {
            return Err(Argon2Error::TimeCostTooLow);
        }
        if parallelism < 1 {
            return Err(Argon2Error::ParallelismTooLow);
        }

        let params = Params::new(memory_cost_kib, time_cost, parallelism, Some(32))
            .map_err(Argon2Error::Hashing)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        Ok(Argon2Hasher {
            argon2: Mutex::new(argon2),
        })
    }

    /// `hash(data, salt) → Hash256` (spec.md §4.4). The salt must be at
    /// least 8 bytes for the underlying crate; callers hashing a block
    /// header satisfy this by construction (`Hash256` is 32 bytes).
    pub fn hash(&self, data: &[u8], salt: &[u8]) -> Result<Hash256, Argon2Error> {
        if data.len() > MAX_INPUT_LEN {
            return Err(Argon2Error::InputTooLarge(data.len()));
        }

        let mut out = [0u8; 32];
        self.argon2
            .lock()
            .hash_password_into(data, salt, &mut out)
            .map_err(Argon2Error::Hashing)?;
        Ok(Hash256(out))
    }

    /// `hash_block(header) → Hash256`: serializes the 80-byte header and
    /// hashes it salted with `header.prev_block_hash`, per spec.md §4.4 —
    /// using the predecessor's hash as salt prevents precomputation, since
    /// every block has a salt determined by its (unique) parent.
    pub fn hash_block(&self, header: &Header) -> Result<Hash256, Argon2Error> {
        self.hash(&header.to_bytes(), &header.prev_block_hash.0)
    }
}

/// A process-wide consensus-parameter Argon2id hasher, built lazily from a
/// network's `ChainParams` (spec.md §4.4: "a single mutex-guarded hasher
/// singleton").
static GLOBAL: OnceCell<Argon2Hasher> = OnceCell::new();

/// Access the shared singleton, initializing it on first use with the
/// given consensus parameters. Subsequent calls with different parameters
/// are ignored — callers within one process must agree on one network.
pub fn global(memory_cost_kib: u32, time_cost: u32, parallelism: u32) -> &'static Argon2Hasher {
    GLOBAL.get_or_init(|| {
        Argon2Hasher::new(memory_cost_kib, time_cost, parallelism)
            .expect("consensus Argon2id parameters must be valid")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_hasher() -> Argon2Hasher {
        // Regtest-scale parameters so tests run fast; production networks
        // use the 2 GiB consensus parameters from `ChainParams`.
        Argon2Hasher::new(8, 1, 1).expect("valid parameters")
    }

    #[test]
    fn rejects_memory_below_8_kib() {
        assert!(matches!(
            Argon2Hasher::new(7, 1, 1),
            Err(Argon2Error::MemoryTooLow(7))
        ));
    }

    #[test]
    fn rejects_zero_time_cost() {
        assert!(matches!(
            Argon2Hasher::new(8, 0, 1),
            Err(Argon2Error::TimeCostTooLow)
        ));
    }

    #[test]
    fn rejects_zero_parallelism() {
        assert!(matches!(
            Argon2Hasher::new(8, 1, 0),
            Err(Argon2Error::ParallelismTooLow)
        ));
    }

    #[test]
    fn rejects_input_over_4mib() {
        let hasher = small_hasher();
        let data = vec![0u8; MAX_INPUT_LEN + 1];
        assert!(matches!(
            hasher.hash(&data, b"01234567"),
            Err(Argon2Error::InputTooLarge(_))
        ));
    }

    /// S8 — determinism across repeated and concurrent calls (spec.md §8
    /// scenario S8).
    #[test]
    fn s8_identical_input_and_salt_yield_identical_output() {
        let hasher = small_hasher();
        let a = hasher.hash(b"block header bytes", b"01234567").unwrap();
        let b = hasher.hash(b"block header bytes", b"01234567").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_salts_yield_different_output() {
        let hasher = small_hasher();
        let a = hasher.hash(b"same payload", b"saltsalt").unwrap();
        let b = hasher.hash(b"same payload", b"saltsalt2").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn hash_block_salts_with_prev_block_hash() {
        let hasher = small_hasher();
        let mut header = crate::block::genesis::regtest_genesis_header();
        let a = hasher.hash_block(&header).unwrap();

        header.prev_block_hash = Hash256([0xaa; 32]);
        let b = hasher.hash_block(&header).unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn concurrent_calls_are_deterministic() {
        use std::sync::Arc;
        use std::thread;

        let hasher = Arc::new(small_hasher());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let hasher = Arc::clone(&hasher);
                thread::spawn(move || hasher.hash(b"concurrent payload", b"01234567").unwrap())
            })
            .collect();

        let results: Vec<Hash256> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
    }
}
