//! Fixed-capacity blocking pool of reusable items.
//!
//! All items are created up front by a caller-supplied factory; the pool
//! never grows, shrinks, or replaces them. Borrowers block while the pool is
//! drained and are woken one at a time as items come back.

use log::{debug, trace};
use parking_lot::{Condvar, Mutex};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::lease::Lease;

/// Token source shared by every pool in the process, so a token can never
/// collide across pools and a foreign entry is always detected on return.
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Error constructing a pool
#[derive(Error, Debug)]
pub enum PoolError {
    /// The requested capacity was zero
    #[error("pool capacity must be greater than zero")]
    ZeroCapacity,
}

/// Error borrowing an item from the pool
#[derive(Error, Debug)]
pub enum BorrowError {
    /// No item was available and the caller declined to wait
    #[error("no items available")]
    Exhausted,

    /// The wait for an item timed out; nothing was transferred
    #[error("timed out after {0:?} waiting for an item")]
    Timeout(Duration),
}

/// Cumulative counters for a pool
#[derive(Debug, Default, Clone)]
pub struct PoolStats {
    /// Total number of successful borrows
    pub total_borrows: usize,

    /// Total number of items returned to the idle queue
    pub total_returns: usize,

    /// Total number of borrow attempts that timed out
    pub total_timeouts: usize,

    /// Returns of items the pool does not track (double or foreign
    /// returns), dropped without touching the idle queue
    pub ignored_returns: usize,
}

/// An item plus the token that identifies it while on loan
pub(crate) struct Entry<T> {
    pub(crate) token: u64,
    pub(crate) item: T,
}

/// Both custody sets live under one lock so a transfer between them is
/// atomic to anyone reading the counts.
struct State<T> {
    /// Items eligible for borrowing, in return order
    idle: VecDeque<Entry<T>>,

    /// Tokens of items currently out on loan
    on_loan: HashSet<u64>,

    /// Cumulative counters
    stats: PoolStats,
}

/// State shared between the pool handles and the leases they hand out
pub(crate) struct Shared<T> {
    /// Custody state
    state: Mutex<State<T>>,

    /// Signalled once per reclaimed item
    item_returned: Condvar,

    /// Fixed number of items owned by the pool
    capacity: usize,
}

impl<T> Shared<T> {
    /// Take an entry back from a lease.
    ///
    /// Only entries whose token is still recorded on loan are re-queued;
    /// anything else (a double return, or an entry belonging to another
    /// pool) is dropped without touching the idle queue.
    pub(crate) fn release(&self, entry: Entry<T>) {
        let mut state = self.state.lock();

        if !state.on_loan.remove(&entry.token) {
            state.stats.ignored_returns += 1;
            trace!("ignoring return of untracked item (token {})", entry.token);
            return;
        }

        state.idle.push_back(entry);
        state.stats.total_returns += 1;
        trace!("reclaimed item ({} idle)", state.idle.len());

        drop(state);
        self.item_returned.notify_one();
    }
}

/// A fixed-capacity blocking pool of reusable items.
///
/// Cloning the pool produces another handle to the same items; see the
/// crate docs for the sharing pattern.
pub struct BoundedPool<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for BoundedPool<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> BoundedPool<T> {
    /// Create a pool holding exactly `capacity` items.
    ///
    /// The factory is invoked `capacity` times up front; the pool never
    /// calls it again. Fails with [`PoolError::ZeroCapacity`] when
    /// `capacity` is zero.
    pub fn new<F>(capacity: usize, mut factory: F) -> Result<Self, PoolError>
    where
        F: FnMut() -> T,
    {
        if capacity == 0 {
            return Err(PoolError::ZeroCapacity);
        }

        let mut idle = VecDeque::with_capacity(capacity);
        for _ in 0..capacity {
            let token = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
            idle.push_back(Entry {
                token,
                item: factory(),
            });
        }

        debug!("initialized pool with {} items", capacity);

        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    idle,
                    on_loan: HashSet::with_capacity(capacity),
                    stats: PoolStats::default(),
                }),
                item_returned: Condvar::new(),
                capacity,
            }),
        })
    }

    /// Borrow an item, blocking until one is available.
    ///
    /// The same item is never held by two borrowers at once; the handoff
    /// from idle to on-loan happens under the state lock.
    pub fn borrow(&self) -> Lease<T> {
        let mut state = self.shared.state.lock();

        loop {
            if let Some(entry) = state.idle.pop_front() {
                return self.admit(&mut state, entry);
            }
            self.shared.item_returned.wait(&mut state);
        }
    }

    /// Borrow an item without waiting.
    pub fn try_borrow(&self) -> Result<Lease<T>, BorrowError> {
        let mut state = self.shared.state.lock();

        match state.idle.pop_front() {
            Some(entry) => Ok(self.admit(&mut state, entry)),
            None => Err(BorrowError::Exhausted),
        }
    }

    /// Borrow an item, waiting at most `timeout`.
    ///
    /// On [`BorrowError::Timeout`] no item was transferred and the pool
    /// state is unchanged.
    pub fn borrow_timeout(&self, timeout: Duration) -> Result<Lease<T>, BorrowError> {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();

        loop {
            if let Some(entry) = state.idle.pop_front() {
                return Ok(self.admit(&mut state, entry));
            }

            if self
                .shared
                .item_returned
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                state.stats.total_timeouts += 1;
                trace!("borrow timed out after {:?}", timeout);
                return Err(BorrowError::Timeout(timeout));
            }
        }
    }

    /// Record the loan and wrap the entry in a lease.
    fn admit(&self, state: &mut State<T>, entry: Entry<T>) -> Lease<T> {
        state.on_loan.insert(entry.token);
        state.stats.total_borrows += 1;
        trace!("lent item ({} idle)", state.idle.len());
        Lease::new(entry, Arc::downgrade(&self.shared))
    }

    /// Number of items currently eligible for borrowing.
    pub fn available_count(&self) -> usize {
        self.shared.state.lock().idle.len()
    }

    /// Number of items currently out on loan.
    pub fn in_use_count(&self) -> usize {
        self.shared.state.lock().on_loan.len()
    }

    /// Both counts read under a single lock acquisition, so the pair is
    /// consistent: the sum always equals the capacity.
    pub fn counts(&self) -> (usize, usize) {
        let state = self.shared.state.lock();
        (state.idle.len(), state.on_loan.len())
    }

    /// Fixed number of items this pool owns.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Snapshot of the cumulative counters.
    pub fn stats(&self) -> PoolStats {
        self.shared.state.lock().stats.clone()
    }
}
