//! Proof-of-work target encoding and difficulty retargeting (spec.md §4.5).

use std::cmp::{max, min};

use thiserror::Error;
use uint::construct_uint;

#[cfg(feature = "proptest-impl")]
use proptest_derive::Arbitrary;

use crate::parameters::ChainParams;

construct_uint! {
    /// A 256-bit unsigned integer, used as the big-endian arithmetic
    /// representation of a PoW hash or target (spec.md §3: "big-endian when
    /// interpreted as an arithmetic integer for target comparison").
    pub struct U256(4);
}

impl U256 {
    /// Build a `U256` from a hash's little-endian wire bytes, interpreting
    /// them as a big-endian integer (i.e. reversing byte order).
    pub fn from_hash(hash: &crate::block::Hash256) -> U256 {
        let mut bytes = hash.0;
        bytes.reverse();
        U256::from_big_endian(&bytes)
    }
}

/// The compact ("nBits") encoding of a PoW target: a 3-byte significand and
/// a 1-byte exponent, Bitcoin-style.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "proptest-impl", derive(Arbitrary))]
pub struct CompactDifficulty(pub u32);

/// A fully expanded 256-bit PoW target.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ExpandedDifficulty(U256);

/// Errors decoding or computing with a [`CompactDifficulty`].
#[derive(Debug, Error, Eq, PartialEq)]
pub enum DifficultyError {
    /// `bits` decoded to a zero, negative, or overflowing target.
    #[error("invalid compact difficulty encoding: {0:#010x}")]
    InvalidTarget(u32),

    /// The retarget window's timestamps were non-monotonic in a way that
    /// would cause the retarget computation to underflow.
    #[error("retarget window timestamps are inconsistent")]
    RetargetUnderflow,
}

impl ExpandedDifficulty {
    /// The target as a `U256`.
    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// Build an `ExpandedDifficulty` directly from a `U256`, without going
    /// through the compact encoding. Used for the mainnet powLimit
    /// constants, which spec.md §9 requires be literal constants rather
    /// than recomputed from a formula.
    pub const fn from_u256(value: U256) -> Self {
        ExpandedDifficulty(value)
    }

    /// Encode back into compact ("nBits") form.
    pub fn to_compact(self) -> CompactDifficulty {
        let bytes: [u8; 32] = self.0.to_big_endian();

        // Find the first non-zero byte (most significant first).
        let first_nonzero = bytes.iter().position(|&b| b != 0);

        let Some(first_nonzero) = first_nonzero else {
            return CompactDifficulty(0);
        };

        let mut size = (32 - first_nonzero) as u32;
        let mut significand_bytes = [0u8; 3];

        // The significand is the first three significant bytes. If the
        // high bit of the first one would be set, the value would be
        // interpreted as negative, so shift down a byte and bump the size.
        if bytes[first_nonzero] & 0x80 != 0 {
            significand_bytes[1] = bytes[first_nonzero];
            significand_bytes[2] = *bytes.get(first_nonzero + 1).unwrap_or(&0);
            size += 1;
        } else {
            significand_bytes[0] = bytes[first_nonzero];
            significand_bytes[1] = *bytes.get(first_nonzero + 1).unwrap_or(&0);
            significand_bytes[2] = *bytes.get(first_nonzero + 2).unwrap_or(&0);
        }

        let significand = u32::from_be_bytes([0, significand_bytes[0], significand_bytes[1], significand_bytes[2]]);

        CompactDifficulty((size << 24) | significand)
    }
}

impl From<U256> for ExpandedDifficulty {
    fn from(value: U256) -> Self {
        ExpandedDifficulty(value)
    }
}

impl CompactDifficulty {
    /// Decode into an [`ExpandedDifficulty`], failing if the encoded target
    /// is zero, negative (the sign-bit convention inherited from Bitcoin's
    /// nBits), or would overflow 256 bits.
    pub fn to_expanded(self) -> Option<ExpandedDifficulty> {
        let size = self.0 >> 24;
        let mut significand = self.0 & 0x007f_ffff;
        let is_negative = self.0 & 0x0080_0000 != 0;

        if significand == 0 || is_negative {
            return None;
        }

        // Bitcoin's nBits format allows `size` up to 32, shifting the
        // 3-byte significand left by `(size - 3)` bytes. Anything larger
        // would overflow a 256-bit target.
        if size > 32 {
            return None;
        }

        let mut bytes = [0u8; 32];
        if size >= 3 {
            let shift = 32 - size as usize;
            for i in 0..3 {
                if shift + i < 32 {
                    bytes[shift + i] = ((significand >> ((2 - i) * 8)) & 0xff) as u8;
                }
            }
        } else {
            // size < 3: the significand itself must be shifted right.
            significand >>= 8 * (3 - size);
            bytes[29] = ((significand >> 16) & 0xff) as u8;
            bytes[30] = ((significand >> 8) & 0xff) as u8;
            bytes[31] = (significand & 0xff) as u8;
        }

        let value = U256::from_big_endian(&bytes);
        if value.is_zero() {
            None
        } else {
            Some(ExpandedDifficulty(value))
        }
    }
}

/// The height-independent part of the retarget window: the number of blocks
/// between retargets, derived per spec.md §9's tie-break rule
/// (`timespan / spacing`, not the independently-stated 2016).
pub fn retarget_interval(params: &ChainParams) -> u32 {
    params.pow_target_timespan / params.pow_target_spacing
}

/// `true` if `height` is a retarget boundary (spec.md §4.5: "at height that
/// is a multiple of `interval`").
pub fn is_retarget_height(height: crate::block::Height, params: &ChainParams) -> bool {
    height.0.is_multiple_of(retarget_interval(params))
}

/// Compute the new target for a retarget window.
///
/// * `old_bits` — the `bits` inherited from the last block of the window.
/// * `last_block_time` — timestamp of the last block in the window.
/// * `first_block_time` — timestamp of the first block of the window
///   (spec.md's BIP94 mitigation: always the current window's first block,
///   never the previous window's last).
/// * `active_pow_limit` — the powLimit for the algorithm active at the
///   *new* height (spec.md §4.5: the retarget at/after the RandomX fork
///   height consults the RandomX powLimit).
pub fn retarget(
    old_bits: CompactDifficulty,
    first_block_time: u32,
    last_block_time: u32,
    params: &ChainParams,
    active_pow_limit: ExpandedDifficulty,
) -> Result<CompactDifficulty, DifficultyError> {
    let old_target = old_bits
        .to_expanded()
        .ok_or(DifficultyError::InvalidTarget(old_bits.0))?;

    let actual_timespan = (last_block_time as i64) - (first_block_time as i64);
    if actual_timespan < 0 {
        // Timestamps aren't guaranteed strictly increasing across a whole
        // window, but a negative total window span indicates broken input.
        return Err(DifficultyError::RetargetUnderflow);
    }

    let timespan = params.pow_target_timespan as i64;
    let clamped = clamp(actual_timespan, timespan / 4, timespan * 4);

    // new_target = old_target * actual / timespan, computed in 512 bits of
    // headroom (via U256 widening through a byte-wise multiply) to avoid
    // overflow, then capped at the active powLimit.
    let new_target = scale_target(old_target.as_u256(), clamped as u64, timespan as u64);
    let capped = min(new_target, active_pow_limit.as_u256());

    Ok(ExpandedDifficulty(capped).to_compact())
}

fn clamp(value: i64, low: i64, high: i64) -> i64 {
    max(low, min(value, high))
}

/// `target * numerator / denominator`, without overflowing `U256`.
///
/// `numerator`/`denominator` are bounded by `4 * pow_target_timespan`
/// (a few million seconds), so `target * numerator` can exceed `U256::MAX`
/// only if `target` is already implausibly close to it; we saturate in that
/// case rather than panic, matching the "reject, don't crash" posture of
/// the rest of this crate's consensus checks.
fn scale_target(target: U256, numerator: u64, denominator: u64) -> U256 {
    let numerator = U256::from(numerator);
    let denominator = U256::from(denominator);

    match target.checked_mul(numerator) {
        Some(scaled) => scaled / denominator,
        None => U256::max_value() / denominator,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::Network;

    #[test]
    fn compact_round_trips_through_expanded() {
        for bits in [0x1d00ffffu32, 0x1f07ffff, 0x207fffff, 0x1e00ffff] {
            let compact = CompactDifficulty(bits);
            let expanded = compact.to_expanded().expect("valid target");
            assert_eq!(expanded.to_compact(), compact);
        }
    }

    #[test]
    fn zero_and_negative_targets_are_rejected() {
        assert!(CompactDifficulty(0x0100_0000).to_expanded().is_none()); // zero significand region aside, negative bit unset but significand 0
        assert!(CompactDifficulty(0x0080_0001).to_expanded().is_none()); // sign bit set
    }

    /// S6 — a synthetic window running 4x faster than target must raise
    /// difficulty by at most 4x (spec.md §8, scenario S6).
    #[test]
    fn difficulty_rises_by_at_most_4x() {
        let params = Network::Mainnet.params();
        let old_bits = CompactDifficulty(0x1e00ffff);
        let old_target = old_bits.to_expanded().unwrap();

        let timespan = params.pow_target_timespan;
        let first_time = 1_700_000_000u32;
        let last_time = first_time + (timespan / 4); // 4x faster than target

        let new_bits = retarget(
            old_bits,
            first_time,
            last_time,
            &params,
            ExpandedDifficulty::from_u256(params.pow_limit),
        )
        .unwrap();
        let new_target = new_bits.to_expanded().unwrap();

        // Difficulty rising means the target shrinks; it must not shrink by
        // more than a factor of 4.
        assert!(new_target.as_u256() >= old_target.as_u256() / 4);
    }

    /// Over any retarget window: 1/4 <= new_target / old_target <= 4
    /// (spec.md §8, invariant 7).
    #[test]
    fn retarget_bounds_are_strict_both_directions() {
        let params = Network::Mainnet.params();
        let old_bits = CompactDifficulty(0x1e00ffff);
        let old_target = old_bits.to_expanded().unwrap().as_u256();
        let timespan = params.pow_target_timespan;

        for multiplier_num_den in [(1u32, 8u32), (8, 1)] {
            let (num, den) = multiplier_num_den;
            let first_time = 1_700_000_000u32;
            let last_time = first_time + (timespan / den) * num;

            let new_bits = retarget(
                old_bits,
                first_time,
                last_time,
                &params,
                ExpandedDifficulty::from_u256(params.pow_limit),
            )
            .unwrap();
            let new_target = new_bits.to_expanded().unwrap().as_u256();

            assert!(new_target >= old_target / 4);
            assert!(new_target <= old_target * 4);
        }
    }

    #[test]
    fn negative_window_span_is_rejected() {
        let params = Network::Mainnet.params();
        let old_bits = CompactDifficulty(0x1e00ffff);

        let result = retarget(
            old_bits,
            1_700_000_100,
            1_700_000_000,
            &params,
            ExpandedDifficulty::from_u256(params.pow_limit),
        );

        assert_eq!(result, Err(DifficultyError::RetargetUnderflow));
    }
}
