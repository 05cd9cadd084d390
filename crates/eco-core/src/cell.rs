//! Atomically replaceable shared snapshots.
//!
//! Writers build a complete new value off to the side and [`publish`] it;
//! the only synchronised step is the replacement of one `Arc` pointer.
//! Readers [`load`] a clone of the current `Arc` and keep using it for as
//! long as they like, so a reader never observes a half-updated value and a
//! publish never waits for in-flight readers to finish.
//!
//! [`publish`]: SnapshotCell::publish
//! [`load`]: SnapshotCell::load

use std::sync::{Arc, PoisonError, RwLock};

/// A shared slot holding the latest immutable `T`.
#[derive(Debug)]
pub struct SnapshotCell<T> {
    slot: RwLock<Arc<T>>,
}

impl<T> SnapshotCell<T> {
    pub fn new(initial: T) -> Self {
        Self { slot: RwLock::new(Arc::new(initial)) }
    }

    /// Clone the current snapshot pointer.  O(1); the lock is held only for
    /// the `Arc` clone.
    pub fn load(&self) -> Arc<T> {
        let guard = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace the current snapshot and return the previous one.
    pub fn publish(&self, next: Arc<T>) -> Arc<T> {
        let mut guard = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }

    /// Build the next snapshot from the current one and publish it, holding
    /// the write slot so concurrent writers serialise.  Readers are only
    /// blocked for the duration of `f`, which should be cheap (e.g. bumping
    /// a version on an already-built payload).
    pub fn publish_with<F>(&self, f: F) -> Arc<T>
    where
        F: FnOnce(&T) -> T,
    {
        let mut guard = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        let next = Arc::new(f(&guard));
        *guard = Arc::clone(&next);
        next
    }
}

impl<T: Default> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
