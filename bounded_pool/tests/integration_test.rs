//! Cross-thread stress tests for the bounded pool.

use bounded_pool::{BorrowError, BoundedPool};
use crossbeam_channel::unbounded;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn counting_pool(capacity: usize) -> BoundedPool<usize> {
    let mut next = 0;
    BoundedPool::new(capacity, move || {
        next += 1;
        next
    })
    .unwrap()
}

#[test]
fn excess_borrowers_block_until_returns_flow() {
    const CAPACITY: usize = 2;
    const BORROWERS: usize = 5;

    let pool = counting_pool(CAPACITY);
    let (tx, rx) = unbounded();

    let mut workers = Vec::new();
    for _ in 0..BORROWERS {
        let pool = pool.clone();
        let tx = tx.clone();
        workers.push(thread::spawn(move || {
            let lease = pool.borrow();
            tx.send(*lease).unwrap();
            thread::sleep(Duration::from_millis(20));
            lease.give_back();
        }));
    }
    drop(tx);

    // Every borrower eventually completes once returns keep happening.
    let seen: Vec<usize> = rx.iter().collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(seen.len(), BORROWERS);
    assert!(seen.iter().all(|item| (1..=CAPACITY).contains(item)));
    assert_eq!(pool.available_count(), CAPACITY);
    assert_eq!(pool.in_use_count(), 0);
}

#[test]
fn concurrent_churn_never_violates_the_capacity_invariant() {
    const CAPACITY: usize = 4;
    const ITERATIONS: usize = 500;

    let borrowers = num_cpus::get().max(8);
    let pool = counting_pool(CAPACITY);
    let loaned = Arc::new(Mutex::new(HashSet::new()));

    let mut workers = Vec::new();
    for _ in 0..borrowers {
        let pool = pool.clone();
        let loaned = Arc::clone(&loaned);
        workers.push(thread::spawn(move || {
            for _ in 0..ITERATIONS {
                let lease = match pool.borrow_timeout(Duration::from_secs(5)) {
                    Ok(lease) => lease,
                    Err(BorrowError::Timeout(_)) => continue,
                    Err(err) => panic!("unexpected borrow failure: {err}"),
                };

                let fresh = loaned.lock().insert(*lease);
                assert!(fresh, "item {} lent to two borrowers at once", *lease);

                assert!((1..=CAPACITY).contains(&*lease));

                // Drop the tracker entry before the pool can re-lend it.
                loaned.lock().remove(&*lease);
                lease.give_back();
            }
        }));
    }

    // Sample the counts while the churn is running.
    for _ in 0..200 {
        let (available, in_use) = pool.counts();
        assert_eq!(available + in_use, CAPACITY);
        assert!(in_use <= CAPACITY);
        thread::sleep(Duration::from_micros(50));
    }

    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(pool.available_count(), CAPACITY);
    assert_eq!(pool.in_use_count(), 0);

    let stats = pool.stats();
    assert_eq!(stats.total_borrows, stats.total_returns);
    assert_eq!(stats.ignored_returns, 0);
}
