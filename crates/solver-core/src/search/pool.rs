//! Bounded worker admission for the parallel search.

use std::sync::{Condvar, Mutex};

/// Counting monitor over a fixed number of worker slots. Spawning a
/// search task first acquires a slot, blocking while the pool is full;
/// the task releases it on completion.
pub struct WorkerPool {
    free: Mutex<usize>,
    available: Condvar,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        assert!(workers > 0);
        WorkerPool {
            free: Mutex::new(workers),
            available: Condvar::new(),
        }
    }

    pub fn acquire(&self) {
        let mut free = self.free.lock().unwrap();
        while *free == 0 {
            free = self.available.wait(free).unwrap();
        }
        *free -= 1;
    }

    pub fn release(&self) {
        let mut free = self.free.lock().unwrap();
        *free += 1;
        drop(free);
        self.available.notify_one();
    }
}
