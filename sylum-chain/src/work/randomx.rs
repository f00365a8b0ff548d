//! RandomX proof-of-work: key-block derivation and per-call hashing
//! primitives (spec.md §4.2, §4.3).
//!
//! The pool built on top of this module ([`crate::work::pool`]) is what
//! production code actually calls; the bare [`calculate_hash`] here exists
//! for the pool's internal use and for tests that don't need pooling.

use randomx_rs::{RandomXCache, RandomXError, RandomXFlag, RandomXVM};
use thiserror::Error;

use crate::block::Hash256;

/// Errors constructing a RandomX context or computing a hash with one.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to create a RandomX cache for a given key.
    #[error("failed to create RandomX cache: {0}")]
    CacheCreation(RandomXError),

    /// Failed to create a RandomX VM bound to a cache (and dataset, in full
    /// mode).
    #[error("failed to create RandomX VM: {0}")]
    VmCreation(RandomXError),

    /// The VM failed to compute a hash.
    #[error("failed to calculate RandomX hash: {0}")]
    HashCalculation(RandomXError),
}

/// Whether a [`crate::work::pool::RandomXPool`] runs light-mode contexts
/// (cache only, ~256 KiB, sufficient for validation) or full-mode contexts
/// (cache + dataset, ~2 GiB, required for competitive mining).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum RandomXMode {
    /// Validation: cache-only, no dataset.
    Light,
    /// Mining: cache plus the full dataset.
    Full,
}

impl RandomXMode {
    fn flags(self) -> RandomXFlag {
        match self {
            RandomXMode::Light => RandomXFlag::get_recommended_flags(),
            RandomXMode::Full => RandomXFlag::get_recommended_flags() | RandomXFlag::FLAG_FULL_MEM,
        }
    }
}

/// One live RandomX cache/VM pair, keyed by a key-block hash.
///
/// This is the unit of work a pool entry owns; constructing one is the
/// expensive operation the pool exists to amortize.
pub struct RandomXContext {
    key_hash: Hash256,
    mode: RandomXMode,
    vm: RandomXVM,
}

// `randomx-rs` wraps raw FFI pointers (`RandomXCache`/`RandomXDataset`/
// `RandomXVM`) that are not themselves `Send`/`Sync`. A `RandomXContext` is
// only ever touched through `RandomXPool`, which hands out exclusive access
// to one entry at a time behind its own mutex (spec.md §5: "entries are
// mutated only while holding the pool mutex"), so moving or sharing a
// context across threads under that external synchronization is sound.
unsafe impl Send for RandomXContext {}
unsafe impl Sync for RandomXContext {}

impl RandomXContext {
    /// Build a fresh context keyed by `key_hash`.
    pub fn new(key_hash: Hash256, mode: RandomXMode) -> Result<Self, Error> {
        let flags = mode.flags();
        let cache = RandomXCache::new(flags, &key_hash.0).map_err(Error::CacheCreation)?;
        let vm = RandomXVM::new(flags, Some(cache), None).map_err(Error::VmCreation)?;
        Ok(RandomXContext {
            key_hash,
            mode,
            vm,
        })
    }

    /// Re-key this context in place for a new key-block hash, without
    /// dropping and reallocating the VM's dataset (full mode) — the
    /// "reinitialize" half of the pool's LRU-with-key-match reuse policy
    /// (spec.md §4.3 step 2).
    pub fn reinit(&mut self, key_hash: Hash256) -> Result<(), Error> {
        let flags = self.mode.flags();
        let cache = RandomXCache::new(flags, &key_hash.0).map_err(Error::CacheCreation)?;
        self.vm = RandomXVM::new(flags, Some(cache), None).map_err(Error::VmCreation)?;
        self.key_hash = key_hash;
        Ok(())
    }

    /// The key-block hash this context is currently initialized for.
    pub fn key_hash(&self) -> Hash256 {
        self.key_hash
    }

    /// Hash `input` with this context's VM.
    pub fn hash(&self, input: &[u8]) -> Result<Hash256, Error> {
        let digest = self.vm.calculate_hash(input).map_err(Error::HashCalculation)?;
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest[..32]);
        Ok(Hash256(bytes))
    }
}

/// One-shot RandomX hash, building and discarding a light-mode context.
///
/// Used by tests and by any caller that doesn't go through
/// [`crate::work::pool::RandomXPool`]; production validation and mining
/// should acquire a pooled context instead, since construction here is the
/// expensive operation the pool amortizes.
pub fn calculate_hash(input: &[u8], key_hash: Hash256) -> Result<Hash256, Error> {
    RandomXContext::new(key_hash, RandomXMode::Light)?.hash(input)
}
