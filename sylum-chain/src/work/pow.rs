//! Proof-of-work algorithm dispatch and validation (spec.md §4.1, §4.2).

use thiserror::Error;
use tracing::instrument;

use crate::{
    block::Height,
    parameters::ChainParams,
    work::difficulty::{CompactDifficulty, U256},
};

/// Which of the three consensus PoW algorithms is active.
///
/// A tagged union with three branches, dispatched by value rather than by
/// subtyping (spec.md §9: "variants instead of inheritance").
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PoWAlgorithm {
    /// Double SHA-256, used from genesis until the RandomX fork.
    Sha256d,
    /// RandomX, used from the fork height until (if ever) the Argon2id
    /// emergency fallback activates.
    RandomX,
    /// Argon2id, the dormant memory-hard emergency fallback.
    Argon2id,
}

/// Errors validating a block's proof of work.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum PowError {
    /// `bits` decoded to zero, negative, or a target above the active
    /// powLimit.
    #[error("invalid target: {0:#010x} exceeds the active powLimit at this height")]
    InvalidTarget(u32),

    /// The proof-of-work hash exceeded the target.
    #[error("hash exceeds target: proof of work is insufficient")]
    BelowTarget,
}

impl PoWAlgorithm {
    /// Which algorithm is active at `height`, per spec.md §4.1:
    ///
    /// ```text
    /// if h >= argon2_emergency_height >= 0   -> Argon2id
    /// elif h >= randomx_fork_height           -> RandomX
    /// else                                    -> SHA256d
    /// ```
    ///
    /// Height 0 (genesis) always returns `Sha256d`, because
    /// `randomx_fork_height` and `argon2_emergency_height` are never
    /// negative-or-zero in a well-formed `ChainParams` — a fork can only
    /// activate strictly after genesis.
    pub fn for_height(height: Height, params: &ChainParams) -> PoWAlgorithm {
        if height == Height(0) {
            return PoWAlgorithm::Sha256d;
        }

        if params.argon2_emergency_height >= 0 && height.0 as i64 >= params.argon2_emergency_height
        {
            PoWAlgorithm::Argon2id
        } else if height.0 >= params.randomx_fork_height {
            PoWAlgorithm::RandomX
        } else {
            PoWAlgorithm::Sha256d
        }
    }
}

/// The key-block height `k(h)` whose hash seeds the RandomX cache for a
/// block at height `h` (spec.md §4.2):
///
/// ```text
/// k(h) = max(0, floor(h / I) * I - I)   where I = randomx_key_block_interval
/// ```
pub fn randomx_key_block_height(height: Height, interval: u32) -> Height {
    debug_assert!(interval > 0, "randomx_key_block_interval must be positive");

    let epoch_start = (height.0 / interval) * interval;
    Height(epoch_start.saturating_sub(interval))
}

/// Validate a proof of work: `CheckProofOfWork(hash, bits, height, params)`
/// (spec.md §4.1).
///
/// `hash` is the already-computed PoW hash for the algorithm active at
/// `height` (SHA256d via [`crate::block::Header::sha256d_hash`], RandomX via
/// [`crate::work::randomx_pool::RandomXPool`], or Argon2id via
/// [`crate::work::argon2::Argon2Hasher`]) — this function only performs the
/// target decode and comparison, not the hashing itself.
#[instrument(
    name = "pow.check_proof_of_work",
    skip(hash, params),
    fields(hash = %hash, bits = %format_args!("{:#010x}", bits.0), height = height.0)
)]
pub fn check_proof_of_work(
    hash: crate::block::Hash256,
    bits: CompactDifficulty,
    height: Height,
    params: &ChainParams,
) -> Result<(), PowError> {
    let target = bits.to_expanded().ok_or(PowError::InvalidTarget(bits.0))?;

    let active_limit = params.active_pow_limit(height);
    if target.as_u256() > active_limit {
        return Err(PowError::InvalidTarget(bits.0));
    }

    let hash_as_int = U256::from_hash(&hash);
    if hash_as_int > target.as_u256() {
        return Err(PowError::BelowTarget);
    }

    Ok(())
}
