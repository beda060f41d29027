#![deny(warnings)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

//! # Bounded Pool
//!
//! A fixed-capacity blocking object pool.
//!
//! The pool eagerly creates `capacity` items with a caller-supplied factory
//! and from then on only transfers custody: items move between the idle
//! queue and the loan set, and are never destroyed or recreated while the
//! pool is alive.
//!
//! - Borrowers block on a drained pool instead of spinning
//! - Each successful return wakes exactly one blocked borrower
//! - `available_count() + in_use_count()` always equals the capacity
//!
//! ## Sharing a pool
//!
//! [`BoundedPool`] is a cheaply cloneable handle; clone it into the threads
//! that need it rather than holding it in a process-wide static.
//!
//! ```
//! use bounded_pool::BoundedPool;
//!
//! let mut next_id = 0u32;
//! let pool = BoundedPool::new(2, move || {
//!     next_id += 1;
//!     next_id
//! })?;
//!
//! let conn = pool.borrow();
//! assert_eq!(*conn, 1);
//! assert_eq!(pool.in_use_count(), 1);
//!
//! conn.give_back();
//! assert_eq!(pool.available_count(), 2);
//! # Ok::<(), bounded_pool::PoolError>(())
//! ```

/// Leased handles for borrowed items
pub mod lease;

/// The fixed-capacity blocking pool
pub mod pool;

// Re-export key types for easier access
pub use lease::Lease;
pub use pool::{BorrowError, BoundedPool, PoolError, PoolStats};
