//! The RandomX context pool (spec.md §4.3) — a bounded, key-aware,
//! priority-aware cache of expensive [`RandomXContext`]s.
//!
//! RandomX VM construction is expensive enough (light mode: ~256 KiB and a
//! JIT compile; full mode: ~2 GiB dataset init) that a naive
//! create-one-per-call or thread-local approach either stalls every caller
//! or accumulates unbounded memory under load. This pool amortizes
//! construction across callers while keeping total memory bounded by
//! `MAX_CONTEXTS`.

use std::{
    collections::VecDeque,
    sync::Arc,
    time::{Duration, Instant},
};

use parking_lot::{Condvar, Mutex};
use tracing::instrument;

use crate::block::{Hash256, Height};
use crate::work::randomx::{RandomXContext, RandomXMode};

/// Default pool capacity (spec.md §4.3).
pub const DEFAULT_MAX_CONTEXTS: usize = 8;

/// Acquisition priority. Ordered `ConsensusCritical > High > Normal`
/// (derived `Ord` relies on declaration order, highest variant last).
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// RPC, auxiliary callers. 30 second timeout.
    Normal,
    /// Mining. 120 second timeout.
    High,
    /// Block validation. Never times out.
    ConsensusCritical,
}

impl Priority {
    /// The blocking timeout for this priority, or `None` for unbounded
    /// (`ConsensusCritical`).
    pub fn timeout(self) -> Option<Duration> {
        match self {
            Priority::Normal => Some(Duration::from_secs(30)),
            Priority::High => Some(Duration::from_secs(120)),
            Priority::ConsensusCritical => None,
        }
    }
}

/// A source of key-block hashes for a given height, the seam that lets the
/// pool reinitialize a context for `key_hash` without owning a chain-state
/// dependency (SPEC_FULL.md §4.3).
pub trait KeyBlockSource: Send + Sync {
    /// The key-block hash for the RandomX epoch covering `height`.
    fn key_hash(&self, height: Height) -> Hash256;
}

/// A `KeyBlockSource` that always returns the same hash, for tests and for
/// any caller that has already resolved the key-block hash itself.
pub struct FixedKey(pub Hash256);

impl KeyBlockSource for FixedKey {
    fn key_hash(&self, _height: Height) -> Hash256 {
        self.0
    }
}

/// Read-only observation surface over the pool's lifetime counters
/// (spec.md §4.3).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    pub total_contexts: usize,
    pub active_contexts: usize,
    pub available_contexts: usize,
    pub total_acquisitions: u64,
    pub total_waits: u64,
    pub total_timeouts: u64,
    pub key_reinitializations: u64,
    pub consensus_critical_acquisitions: u64,
    pub high_priority_acquisitions: u64,
    pub priority_preemptions: u64,
}

struct Entry {
    context: RandomXContext,
    in_use: bool,
    last_used: Instant,
}

struct Waiter {
    priority: Priority,
    seq: u64,
}

struct PoolState {
    entries: Vec<Entry>,
    max_contexts: usize,
    waiters: VecDeque<Waiter>,
    next_seq: u64,
    stats: Stats,
}

impl PoolState {
    /// `true` if some other registered waiter outranks `(priority, seq)` —
    /// strictly higher priority, or the same priority registered earlier
    /// (spec.md §4.3: "wake-ups respect strict priority order first, FIFO
    /// second"). A caller for which this holds must not claim a freed or
    /// idle entry, even one that exactly matches its requested key, and must
    /// instead fall back to waiting.
    fn has_waiter_ahead(&self, priority: Priority, seq: u64) -> bool {
        self.waiters
            .iter()
            .any(|w| w.priority > priority || (w.priority == priority && w.seq < seq))
    }
}

/// A bounded pool of RandomX contexts, shared across threads.
///
/// Mirrors the teacher's use of `parking_lot::{Mutex, Condvar}` for
/// blocking coordination rather than the stdlib equivalents.
pub struct RandomXPool {
    mode: RandomXMode,
    state: Mutex<PoolState>,
    condvar: Condvar,
}

/// An RAII guard giving exclusive use of one pooled context. Dropping it
/// returns the context to the pool and wakes every blocked waiter; each one
/// re-checks whether any other waiter outranks it (by priority, then by
/// registration order) before attempting to claim the freed slot, so only
/// the rightful next waiter actually proceeds.
pub struct Guard<'a> {
    pool: &'a RandomXPool,
    index: usize,
}

impl<'a> Guard<'a> {
    /// Hash `input` with this guard's underlying context.
    pub fn hash(&self, input: &[u8]) -> Result<Hash256, crate::work::randomx::Error> {
        let state = self.pool.state.lock();
        state.entries[self.index].context.hash(input)
    }
}

impl<'a> Drop for Guard<'a> {
    fn drop(&mut self) {
        let mut state = self.pool.state.lock();
        state.entries[self.index].in_use = false;
        state.entries[self.index].last_used = Instant::now();
        state.stats.active_contexts -= 1;
        state.stats.available_contexts += 1;
        drop(state);
        self.pool.condvar.notify_all();
    }
}

impl RandomXPool {
    /// Create an empty pool with the given capacity and mode. Capacity may
    /// only be chosen here, before the first acquisition.
    pub fn new(max_contexts: usize, mode: RandomXMode) -> Self {
        RandomXPool {
            mode,
            state: Mutex::new(PoolState {
                entries: Vec::new(),
                max_contexts,
                waiters: VecDeque::new(),
                next_seq: 0,
                stats: Stats::default(),
            }),
            condvar: Condvar::new(),
        }
    }

    /// A snapshot of the pool's counters.
    pub fn stats(&self) -> Stats {
        self.state.lock().stats
    }

    /// Acquire exclusive use of a context reinitialized (if necessary) for
    /// `key_hash`, following the LRU-with-key-match reuse policy and
    /// priority-ordered fairness of spec.md §4.3. Returns `None` only on
    /// timeout (never for `ConsensusCritical`, which blocks unboundedly).
    #[instrument(
        name = "pool.acquire",
        skip(self, key_hash),
        fields(key_hash = %key_hash, priority = ?priority)
    )]
    pub fn acquire(&self, key_hash: Hash256, priority: Priority) -> Option<Guard<'_>> {
        let mut state = self.state.lock();
        let deadline = priority.timeout().map(|t| Instant::now() + t);
        let mut registered_wait = false;
        // Assigned up front (not just once blocking begins) so that every
        // caller, including one that never ends up waiting, is ordered the
        // same way a registered waiter would be.
        let seq = state.next_seq;
        state.next_seq += 1;

        loop {
            // A caller with a strictly-higher-priority or earlier
            // same-priority waiter ahead of it must not claim any entry —
            // not even an exact key match — before that waiter is served
            // (spec.md §4.3: "it must yield... rather than seize the
            // context").
            let must_yield = state.has_waiter_ahead(priority, seq);

            if !must_yield {
                // Step 1: idle entry already keyed for `key_hash`.
                if let Some(index) = state
                    .entries
                    .iter()
                    .position(|e| !e.in_use && e.context.key_hash() == key_hash)
                {
                    return self.claim(&mut state, index, priority, registered_wait, seq);
                }

                // Step 2: any idle entry, LRU pick, reinitialize.
                if let Some(index) = state
                    .entries
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| !e.in_use)
                    .min_by_key(|(_, e)| e.last_used)
                    .map(|(i, _)| i)
                {
                    if state.entries[index].context.reinit(key_hash).is_ok() {
                        state.stats.key_reinitializations += 1;
                        return self.claim(&mut state, index, priority, registered_wait, seq);
                    }
                }

                // Step 3: room to create a new entry.
                if state.entries.len() < state.max_contexts {
                    if let Ok(context) = RandomXContext::new(key_hash, self.mode) {
                        state.entries.push(Entry {
                            context,
                            in_use: false,
                            last_used: Instant::now(),
                        });
                        let index = state.entries.len() - 1;
                        state.stats.total_contexts += 1;
                        state.stats.available_contexts += 1;
                        return self.claim(&mut state, index, priority, registered_wait, seq);
                    }
                }
            } else if registered_wait {
                // Awakened, but a waiter with priority or seniority ahead of
                // ours is still pending: yield back to waiting rather than
                // seizing the context.
                state.stats.priority_preemptions += 1;
            }

            // Step 4: block.
            if !registered_wait {
                state.waiters.push_back(Waiter { priority, seq });
                registered_wait = true;
                state.stats.total_waits += 1;
            }

            match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        remove_waiter(&mut state.waiters, priority, seq);
                        state.stats.total_timeouts += 1;
                        return None;
                    }
                    let timed_out = self
                        .condvar
                        .wait_for(&mut state, deadline - now)
                        .timed_out();
                    if timed_out && Instant::now() >= deadline {
                        remove_waiter(&mut state.waiters, priority, seq);
                        state.stats.total_timeouts += 1;
                        return None;
                    }
                }
                None => {
                    self.condvar.wait(&mut state);
                }
            }
        }
    }

    fn claim<'a>(
        &'a self,
        state: &mut parking_lot::MutexGuard<'_, PoolState>,
        index: usize,
        priority: Priority,
        registered_wait: bool,
        seq: u64,
    ) -> Option<Guard<'a>> {
        if registered_wait {
            remove_waiter(&mut state.waiters, priority, seq);
        }
        state.entries[index].in_use = true;
        state.stats.active_contexts += 1;
        state.stats.available_contexts = state
            .stats
            .available_contexts
            .saturating_sub(1);
        state.stats.total_acquisitions += 1;
        match priority {
            Priority::ConsensusCritical => state.stats.consensus_critical_acquisitions += 1,
            Priority::High => state.stats.high_priority_acquisitions += 1,
            Priority::Normal => {}
        }
        Some(Guard { pool: self, index })
    }
}

fn remove_waiter(waiters: &mut VecDeque<Waiter>, priority: Priority, seq: u64) {
    if let Some(pos) = waiters
        .iter()
        .position(|w| w.priority == priority && w.seq == seq)
    {
        waiters.remove(pos);
    }
}

/// A thread-safe handle to a pool, for callers that want to share one pool
/// across threads without managing the `Arc` themselves.
pub type SharedPool = Arc<RandomXPool>;
