//! Cross-cutting scenario tests that don't fit neatly under a single
//! submodule (spec.md §8), mirroring the teacher's own top-level
//! `work/tests.rs`.

use std::{sync::Arc, thread, time::Duration};

use crate::block::Hash256;
use crate::work::pool::{Priority, RandomXPool};
use crate::work::randomx::RandomXMode;

fn key(byte: u8) -> Hash256 {
    Hash256([byte; 32])
}

/// S4 — pool priority preemption (spec.md §8 scenario S4): fill the pool to
/// capacity with a NORMAL holder, enqueue a NORMAL waiter then a
/// CONSENSUS_CRITICAL waiter, release the held slot. The CC waiter must wake
/// first; the NORMAL waiter must remain queued and record a preemption.
#[test]
fn s4_pool_priority_preemption() {
    let pool = Arc::new(RandomXPool::new(1, RandomXMode::Light));
    let holder = pool.acquire(key(1), Priority::Normal).expect("acquire");

    let normal_pool = Arc::clone(&pool);
    let normal_waiter = thread::spawn(move || {
        let guard = normal_pool
            .acquire(key(2), Priority::Normal)
            .expect("eventually acquires once the CC waiter is done");
        drop(guard);
    });

    // give the NORMAL waiter time to register and block
    thread::sleep(Duration::from_millis(100));

    let cc_pool = Arc::clone(&pool);
    let cc_done = Arc::new(std::sync::Mutex::new(false));
    let cc_done_writer = Arc::clone(&cc_done);
    let cc_waiter = thread::spawn(move || {
        let guard = cc_pool
            .acquire(key(3), Priority::ConsensusCritical)
            .expect("CC never times out");
        *cc_done_writer.lock().unwrap() = true;
        // hold briefly so the NORMAL waiter observes it still pending
        thread::sleep(Duration::from_millis(150));
        drop(guard);
    });

    // give the CC waiter time to register and block
    thread::sleep(Duration::from_millis(100));

    drop(holder);

    cc_waiter.join().expect("CC waiter thread joins");
    assert!(*cc_done.lock().unwrap(), "CC waiter must have acquired a context");

    normal_waiter.join().expect("NORMAL waiter thread joins");

    let stats = pool.stats();
    assert!(
        stats.priority_preemptions >= 1,
        "NORMAL waiting behind a pending CC waiter must be counted as a preemption"
    );
    assert_eq!(stats.consensus_critical_acquisitions, 1);
}

/// Variant of S4 where the freed entry's key exactly matches the NORMAL
/// waiter's requested key. `acquire`'s exact-key-match fast path (Step 1)
/// must still yield to a pending CC waiter rather than short-circuiting
/// past the priority check — the distinct-key setup in
/// `s4_pool_priority_preemption` never exercises this path, since Step 1
/// only fires on a key match.
#[test]
fn s4_priority_preemption_exact_key_match_still_yields() {
    let pool = Arc::new(RandomXPool::new(1, RandomXMode::Light));
    let holder = pool.acquire(key(1), Priority::Normal).expect("acquire");

    let order: Arc<std::sync::Mutex<Vec<&'static str>>> = Arc::new(std::sync::Mutex::new(Vec::new()));

    let normal_pool = Arc::clone(&pool);
    let normal_order = Arc::clone(&order);
    let normal_waiter = thread::spawn(move || {
        // Requests the same key the holder is using, so the freed entry is
        // an exact key match once released.
        let guard = normal_pool
            .acquire(key(1), Priority::Normal)
            .expect("eventually acquires once the CC waiter is done");
        normal_order.lock().unwrap().push("normal");
        drop(guard);
    });

    // give the NORMAL waiter time to register and block
    thread::sleep(Duration::from_millis(100));

    let cc_pool = Arc::clone(&pool);
    let cc_order = Arc::clone(&order);
    let cc_waiter = thread::spawn(move || {
        let guard = cc_pool
            .acquire(key(2), Priority::ConsensusCritical)
            .expect("CC never times out");
        cc_order.lock().unwrap().push("cc");
        // hold briefly so the NORMAL waiter observes it still pending
        thread::sleep(Duration::from_millis(150));
        drop(guard);
    });

    // give the CC waiter time to register and block
    thread::sleep(Duration::from_millis(100));

    drop(holder);

    cc_waiter.join().expect("CC waiter thread joins");
    normal_waiter.join().expect("NORMAL waiter thread joins");

    assert_eq!(
        *order.lock().unwrap(),
        vec!["cc", "normal"],
        "CC must acquire the freed, key-matching entry before NORMAL, even though NORMAL's \
         requested key is an exact match for the freed entry"
    );
    assert_eq!(pool.stats().consensus_critical_acquisitions, 1);
    assert!(pool.stats().priority_preemptions >= 1);
}

/// spec.md §8 invariant 5: across concurrent `acquire`/release, active
/// contexts never exceed the configured capacity.
#[test]
fn active_contexts_bounded_under_concurrent_load() {
    let pool = Arc::new(RandomXPool::new(3, RandomXMode::Light));
    let handles: Vec<_> = (0..12)
        .map(|i| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                if let Some(guard) = pool.acquire(key((i % 5) as u8), Priority::Normal) {
                    assert!(pool.stats().active_contexts <= 3);
                    thread::sleep(Duration::from_millis(5));
                    drop(guard);
                }
            })
        })
        .collect();

    for h in handles {
        h.join().expect("thread joins");
    }

    assert_eq!(pool.stats().active_contexts, 0);
    assert!(pool.stats().total_contexts <= 3);
}
