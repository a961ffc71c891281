use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// A held concurrency slot. Dropping it frees the slot.
pub type Slot = OwnedSemaphorePermit;

/// Fixed-size pool of concurrency slots shared by every job of a run.
pub struct SlotPool {
    sem: Arc<Semaphore>,
    capacity: usize,
}

impl Clone for SlotPool {
    fn clone(&self) -> Self { SlotPool { sem: self.sem.clone(), capacity: self.capacity } }
}

impl SlotPool {
    pub const DEFAULT_CAPACITY: usize = 50;

    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 { Self::DEFAULT_CAPACITY } else { capacity };
        SlotPool { sem: Arc::new(Semaphore::new(capacity)), capacity }
    }

    /// Build a pool from a user-supplied limit; zero or negative means the default.
    pub fn from_requested(parallel: i64) -> Self {
        Self::new(effective_parallel(parallel))
    }

    pub fn capacity(&self) -> usize { self.capacity }

    #[cfg(test)]
    fn available(&self) -> usize { self.sem.available_permits() }

    /// Wait until a slot frees up and take it.
    pub async fn acquire(&self) -> Slot {
        // The semaphore is owned here and never closed.
        self.sem.clone().acquire_owned().await.expect("slot pool closed")
    }
}

pub fn effective_parallel(parallel: i64) -> usize {
    if parallel <= 0 {
        return SlotPool::DEFAULT_CAPACITY;
    }
    usize::try_from(parallel).unwrap_or(SlotPool::DEFAULT_CAPACITY)
}
