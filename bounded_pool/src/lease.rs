//! Leased handles for borrowed items.
//!
//! A [`Lease`] is the only way to hold a pooled item. It dereferences to the
//! item and hands it back when dropped, so a borrower cannot forget to
//! return what it took.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Weak;

use crate::pool::{Entry, Shared};

/// A borrowed item that returns itself to its pool when dropped.
pub struct Lease<T> {
    /// The entry, present until the lease is returned
    entry: Option<Entry<T>>,

    /// The pool this lease came from; weak, so a lease that outlives its
    /// pool simply drops the item
    pool: Weak<Shared<T>>,
}

impl<T> Lease<T> {
    pub(crate) fn new(entry: Entry<T>, pool: Weak<Shared<T>>) -> Self {
        Self {
            entry: Some(entry),
            pool,
        }
    }

    /// Return the item to the pool now, waking one blocked borrower.
    ///
    /// Equivalent to dropping the lease; use it where the return should be
    /// visible in the code.
    pub fn give_back(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(entry) = self.entry.take() {
            if let Some(pool) = self.pool.upgrade() {
                pool.release(entry);
            }
            // Pool is gone; the entry and its item drop here.
        }
    }
}

impl<T> Deref for Lease<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.entry.as_ref().expect("lease already returned").item
    }
}

impl<T> DerefMut for Lease<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.entry.as_mut().expect("lease already returned").item
    }
}

impl<T> Drop for Lease<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: fmt::Debug> fmt::Debug for Lease<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entry {
            Some(entry) => write!(f, "Lease({:?})", entry.item),
            None => write!(f, "Lease(returned)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::BoundedPool;
    use std::sync::Arc;

    #[test]
    fn deref_reaches_the_borrowed_item() {
        let pool = BoundedPool::new(1, || String::from("ready")).unwrap();

        let mut lease = pool.borrow();
        assert_eq!(lease.as_str(), "ready");

        lease.push_str(" again");
        lease.give_back();

        // Mutations through the lease stick with the pooled item.
        let lease = pool.borrow();
        assert_eq!(lease.as_str(), "ready again");
    }

    #[test]
    fn debug_shows_the_live_item() {
        let pool = BoundedPool::new(1, || 7u8).unwrap();
        let lease = pool.borrow();
        assert_eq!(format!("{lease:?}"), "Lease(7)");
    }

    #[test]
    fn lease_outliving_its_pool_drops_the_item() {
        let marker = Arc::new(());
        let pool = BoundedPool::new(1, || Arc::clone(&marker)).unwrap();

        let lease = pool.borrow();
        drop(pool);

        // Marker itself plus the copy held by the lease.
        assert_eq!(Arc::strong_count(&marker), 2);

        drop(lease);
        assert_eq!(Arc::strong_count(&marker), 1);
    }
}
