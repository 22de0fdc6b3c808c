// ==============================================
// SHARDED CACHE CONCURRENCY TESTS (integration)
// ==============================================
//
// Multi-threaded soak tests for the per-shard lock discipline. These
// require real thread interleavings and cannot live inline.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use bytecache::prelude::*;

fn cache() -> Arc<ShardedCache> {
    Arc::new(
        CacheBuilder::new()
            .shards(64)
            .life_window(Duration::from_secs(60))
            .max_entries_in_window(10_000)
            .max_entry_size(128)
            .try_build()
            .unwrap(),
    )
}

// ==============================================
// Parallel Writers
// ==============================================

#[test]
fn concurrent_writers_on_disjoint_keys() {
    let cache = cache();
    let threads = 8;
    let per_thread = 500;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..per_thread {
                    cache.set(&format!("t{t}-k{i}"), format!("t{t}-v{i}").as_bytes());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.size(), (threads * per_thread) as u64);
    for t in 0..threads {
        for i in (0..per_thread).step_by(97) {
            assert_eq!(
                cache.get(&format!("t{t}-k{i}")).unwrap(),
                format!("t{t}-v{i}").as_bytes()
            );
        }
    }
}

// ==============================================
// Readers Racing Writers
// ==============================================

#[test]
fn readers_observe_either_old_or_new_value() {
    let cache = cache();
    cache.set("shared", b"initial");

    let writers = 2;
    let readers = 6;
    let iterations = 2_000;
    let barrier = Arc::new(Barrier::new(writers + readers));
    let mut handles = Vec::new();

    for w in 0..writers {
        let cache = Arc::clone(&cache);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for i in 0..iterations {
                cache.set("shared", format!("w{w}-{i}").as_bytes());
            }
        }));
    }

    for _ in 0..readers {
        let cache = Arc::clone(&cache);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for _ in 0..iterations {
                // Every read must return some complete write, never a torn
                // or partial value.
                let value = cache.get("shared").unwrap();
                let text = String::from_utf8(value).unwrap();
                assert!(text == "initial" || text.starts_with('w'));
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

// ==============================================
// Clear Racing Writers
// ==============================================

#[test]
fn clear_races_with_writes_without_corruption() {
    let cache = cache();
    let barrier = Arc::new(Barrier::new(3));
    let mut handles = Vec::new();

    for t in 0..2 {
        let cache = Arc::clone(&cache);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for i in 0..1_000 {
                cache.set(&format!("t{t}-k{i}"), b"value");
                if let Ok(value) = cache.get(&format!("t{t}-k{i}")) {
                    assert_eq!(value, b"value");
                }
            }
        }));
    }

    {
        let cache = Arc::clone(&cache);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for _ in 0..50 {
                cache.clear();
                thread::yield_now();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    // Whatever survived the final clear must still read consistently.
    let mut resident = 0u64;
    cache.iterate(|_key, value| {
        assert_eq!(value, b"value");
        resident += 1;
    });
    assert_eq!(resident, cache.size());
}

// ==============================================
// Metrics Under Contention
// ==============================================

#[test]
fn metrics_account_for_every_operation() {
    let cache = cache();
    let threads = 4;
    let per_thread = 250;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..per_thread {
                    let key = format!("t{t}-k{i}");
                    cache.set(&key, b"v");
                    cache.get(&key).unwrap();
                    let _ = cache.get("never-set");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let metrics = cache.metrics();
    let total = (threads * per_thread) as u64;
    assert_eq!(metrics.insertions, total);
    assert_eq!(metrics.hits, total);
    assert_eq!(metrics.misses, total);
}
