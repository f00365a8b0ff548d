//! Block subsidy schedule (spec.md §4.7): geometric halving of a fixed
//! initial reward, dropping to zero after 64 halvings.

use crate::{
    amount::{Amount, NonNegative},
    block::Height,
};

/// The block reward at height 0, before any halving: 10 000 SYL.
pub const INITIAL_SUBSIDY: i64 = 10_000 * crate::amount::COIN;

/// The era at which the subsidy has halved enough times to floor to zero
/// (`initial_reward >> 64` underflows a reward that's already below one
/// qirsh well before this, but spec.md §4.7 states the cutoff explicitly).
pub const ZERO_SUBSIDY_ERA: u32 = 64;

/// `Subsidy(h)` (spec.md §4.7): `initial_reward >> era`, where `era = h /
/// halving_interval`, floored to zero once `era >= 64`.
pub fn subsidy(height: Height, halving_interval: u32) -> Amount<NonNegative> {
    let era = height.0 / halving_interval;

    let qirsh = if era >= ZERO_SUBSIDY_ERA {
        0
    } else {
        INITIAL_SUBSIDY >> era
    };

    Amount::try_new(qirsh).expect("subsidy is always within [0, MAX_MONEY]")
}
