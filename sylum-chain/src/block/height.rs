//! Block height.

use std::fmt;

#[cfg(feature = "proptest-impl")]
use proptest_derive::Arbitrary;

/// A block height, counted from the genesis block at height zero.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "proptest-impl", derive(Arbitrary))]
pub struct Height(pub u32);

impl Height {
    /// The genesis height.
    pub const MIN: Height = Height(0);

    /// The maximum height representable without overflowing the dispatch
    /// logic in `work::pow` (spec.md §4.1 edge case: `height = INT32_MAX`
    /// must not overflow).
    pub const MAX: Height = Height(i32::MAX as u32);

    /// `self - 1`, saturating at [`Height::MIN`].
    pub fn saturating_sub(self, rhs: u32) -> Height {
        Height(self.0.saturating_sub(rhs))
    }

    /// `self + rhs`, saturating at [`Height::MAX`].
    pub fn saturating_add(self, rhs: u32) -> Height {
        Height(self.0.saturating_add(rhs).min(Height::MAX.0))
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Height {
    fn from(value: u32) -> Self {
        Height(value)
    }
}
