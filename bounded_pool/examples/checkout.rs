//! Checkout demo: a pool of two fake connections shared by five workers.
//!
//! Run with `RUST_LOG=trace cargo run --example checkout` to watch the
//! lend/reclaim traffic.

use std::fmt;
use std::thread;
use std::time::Duration;

use bounded_pool::BoundedPool;

struct FakeConnection {
    id: u32,
}

impl fmt::Display for FakeConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FakeConnection(id={})", self.id)
    }
}

fn main() {
    env_logger::init();

    let mut next_id = 0;
    let pool = BoundedPool::new(2, move || {
        next_id += 1;
        FakeConnection { id: next_id }
    })
    .expect("capacity is non-zero");

    let mut workers = Vec::new();
    for worker in 0..5 {
        let pool = pool.clone();
        workers.push(thread::spawn(move || {
            let conn = pool.borrow();
            println!("worker {worker} borrowed {}", *conn);
            thread::sleep(Duration::from_millis(100));
            conn.give_back();
            println!("worker {worker} returned its connection");
        }));
    }

    for worker in workers {
        worker.join().expect("worker panicked");
    }

    println!(
        "done: {} available, {} in use",
        pool.available_count(),
        pool.in_use_count()
    );
}
