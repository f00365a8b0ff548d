//! An in-memory block-index tree (spec.md §3 "BlockIndex node"): the
//! minimal ancestor-lookup structure the retargeter (C5) and RandomX
//! key-block derivation (C4) need to "look back N blocks" from a tip,
//! without requiring the full chain-state database that owns persistence,
//! reorgs, and fork choice (out of scope, spec.md §1).

use std::sync::Arc;

use thiserror::Error;

use crate::{
    block::{Hash256, Height},
    work::{
        difficulty::{CompactDifficulty, U256},
        pool::KeyBlockSource,
        pow::randomx_key_block_height,
    },
};

/// One node of the block-index tree: a block's identity plus the
/// accumulated proof-of-work of its ancestry (spec.md §3: "chain_work
/// monotone non-decreasing along any ancestor chain").
pub struct BlockIndexNode {
    /// This block's hash.
    pub hash: Hash256,
    /// This block's height.
    pub height: Height,
    /// This block's timestamp.
    pub time: u32,
    /// This block's compact-encoded target.
    pub bits: CompactDifficulty,
    /// Total accumulated work from genesis through this block, inclusive.
    pub chain_work: U256,
    /// The previous block's node, or `None` for genesis.
    pub prev: Option<Arc<BlockIndexNode>>,
}

/// Errors extending a [`ChainIndex`] with a new tip.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ChainIndexError {
    /// The pushed node's height did not immediately follow the current tip.
    #[error("non-contiguous height: tip is at {tip}, pushed node is at {pushed}")]
    NonContiguousHeight {
        /// The current tip's height.
        tip: Height,
        /// The height of the node that was rejected.
        pushed: Height,
    },

    /// The pushed node's target decoded to an invalid (zero/negative)
    /// target, so its proof of work couldn't be accumulated.
    #[error("block at height {0} has an invalid compact difficulty encoding")]
    InvalidTarget(Height),
}

/// The work a block contributes to its chain, `(2**256 - target) / (target +
/// 1) + 1` — the standard "expected hashes to find a block at this target"
/// measure, computed without overflowing 256 bits (target is always
/// strictly less than `2**256 - 1`, so `!target`, expressed here as
/// `U256::max_value() - target`, never underflows).
pub fn block_work(bits: CompactDifficulty) -> Option<U256> {
    let target = bits.to_expanded()?.as_u256();
    let complement = U256::max_value() - target;
    Some(complement / (target + U256::one()) + U256::one())
}

impl BlockIndexNode {
    /// Build the genesis node: no parent, chain_work equal to its own block
    /// work.
    pub fn genesis(hash: Hash256, time: u32, bits: CompactDifficulty) -> Result<Arc<Self>, ChainIndexError> {
        let work = block_work(bits).ok_or(ChainIndexError::InvalidTarget(Height(0)))?;
        Ok(Arc::new(BlockIndexNode {
            hash,
            height: Height(0),
            time,
            bits,
            chain_work: work,
            prev: None,
        }))
    }

    /// Build a child node extending `self`.
    pub fn child(
        self: &Arc<Self>,
        hash: Hash256,
        time: u32,
        bits: CompactDifficulty,
    ) -> Result<Arc<Self>, ChainIndexError> {
        let height = self.height.saturating_add(1);
        let work = block_work(bits).ok_or(ChainIndexError::InvalidTarget(height))?;
        Ok(Arc::new(BlockIndexNode {
            hash,
            height,
            time,
            bits,
            chain_work: self.chain_work + work,
            prev: Some(Arc::clone(self)),
        }))
    }

    /// Walk back from `self` to the ancestor at `height`, or `None` if
    /// `height` exceeds `self.height` or underflows past genesis.
    pub fn ancestor(self: &Arc<Self>, height: Height) -> Option<Arc<Self>> {
        if height > self.height {
            return None;
        }

        let mut current = Arc::clone(self);
        while current.height > height {
            current = Arc::clone(current.prev.as_ref()?);
        }
        Some(current)
    }
}

/// A simple append-only height-indexed chain, built on top of
/// [`BlockIndexNode`] for O(1) height lookups without walking the ancestor
/// chain on every query.
///
/// This is the in-memory stand-in spec.md §3/§9 calls for: a full
/// chain-state database (reorgs, UTXO persistence, fork choice) is an
/// external collaborator out of scope for this crate.
pub struct ChainIndex {
    by_height: Vec<Arc<BlockIndexNode>>,
}

impl ChainIndex {
    /// Start a new index rooted at `genesis`.
    pub fn new(genesis: Arc<BlockIndexNode>) -> Self {
        ChainIndex {
            by_height: vec![genesis],
        }
    }

    /// The current tip.
    pub fn tip(&self) -> &Arc<BlockIndexNode> {
        self.by_height.last().expect("index is never empty")
    }

    /// Extend the index with a new tip, which must be the current tip's
    /// direct child.
    pub fn push(&mut self, node: Arc<BlockIndexNode>) -> Result<(), ChainIndexError> {
        let expected = self.tip().height.saturating_add(1);
        if node.height != expected {
            return Err(ChainIndexError::NonContiguousHeight {
                tip: self.tip().height,
                pushed: node.height,
            });
        }
        self.by_height.push(node);
        Ok(())
    }

    /// Look up the node at `height`, if it's been indexed.
    pub fn get(&self, height: Height) -> Option<&Arc<BlockIndexNode>> {
        self.by_height.get(height.0 as usize)
    }

    /// The hash of the block at `height`, if indexed.
    pub fn hash_at(&self, height: Height) -> Option<Hash256> {
        self.get(height).map(|node| node.hash)
    }
}

/// Resolves RandomX key-block hashes (spec.md §4.2) by walking a
/// [`ChainIndex`] — the seam [`crate::work::pool::RandomXPool::acquire`]'s
/// callers use to turn a height into the `key_hash` the pool's acquisition
/// contract expects (SPEC_FULL.md §4.3).
pub struct ChainIndexKeySource<'a> {
    index: &'a ChainIndex,
    randomx_key_block_interval: u32,
}

impl<'a> ChainIndexKeySource<'a> {
    /// Build a key source over `index`, rotating keys every
    /// `randomx_key_block_interval` blocks.
    pub fn new(index: &'a ChainIndex, randomx_key_block_interval: u32) -> Self {
        ChainIndexKeySource {
            index,
            randomx_key_block_interval,
        }
    }
}

impl KeyBlockSource for ChainIndexKeySource<'_> {
    fn key_hash(&self, height: Height) -> Hash256 {
        let key_height = randomx_key_block_height(height, self.randomx_key_block_interval);
        self.index.hash_at(key_height).unwrap_or(Hash256::NULL)
    }
}

// SAFETY note: `ChainIndexKeySource` borrows `ChainIndex` and is used from a
// single validating thread at a time in this crate's tests; a caller sharing
// one across threads would need to wrap the `ChainIndex` in a lock, which is
// a chain-state concern outside this crate's scope.
