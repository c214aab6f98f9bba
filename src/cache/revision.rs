//! Revision Module
//!
//! Defines the immutable, sequence-tagged wrapper the cache files into its indexes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

// == Bucket ==
/// The revisions filed under one index key, keyed by revision sequence.
///
/// Guarded as a whole so a reader always sees the bucket between two writes,
/// never part way through one.
pub(crate) struct Bucket<T> {
    revisions: RwLock<HashMap<u64, Arc<Revision<T>>>>,
}

impl<T> Bucket<T> {
    pub(crate) fn new() -> Self {
        Self {
            revisions: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<u64, Arc<Revision<T>>>> {
        match self.revisions.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Index bucket lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<u64, Arc<Revision<T>>>> {
        match self.revisions.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Index bucket lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Copies out the revisions currently filed here.
    pub(crate) fn snapshot(&self) -> Vec<Arc<Revision<T>>> {
        self.read().values().cloned().collect()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.read().len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, sequence: u64) -> bool {
        self.read().contains_key(&sequence)
    }
}

// == Sequence Generator ==
/// Hands out strictly increasing sequence numbers for one cache instance.
#[derive(Debug, Default)]
pub struct SequenceGenerator {
    next: AtomicU64,
}

impl SequenceGenerator {
    // == Constructor ==
    /// Creates a generator whose first value is 0.
    pub fn new() -> Self {
        Self::default()
    }

    // == Next ==
    /// Returns the next sequence number.
    ///
    /// Distinct across all threads calling concurrently; never reused.
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

// == Revision ==
/// One stored copy of an item, tagged with the sequence it was created under.
///
/// `memberships` records the exact bucket the revision was filed into in each
/// index, in index order, so it can be unfiled without recomputing any key.
pub(crate) struct Revision<T> {
    sequence: u64,
    item: T,
    memberships: Vec<Arc<Bucket<T>>>,
}

impl<T> Revision<T> {
    // == Constructor ==
    pub(crate) fn new(sequence: u64, item: T, memberships: Vec<Arc<Bucket<T>>>) -> Self {
        Self {
            sequence,
            item,
            memberships,
        }
    }

    pub(crate) fn sequence(&self) -> u64 {
        self.sequence
    }

    pub(crate) fn item(&self) -> &T {
        &self.item
    }

    // == File ==
    /// Inserts this revision into every bucket it belongs to.
    pub(crate) fn file(self: &Arc<Self>) {
        for bucket in &self.memberships {
            bucket.write().insert(self.sequence, Arc::clone(self));
        }
    }

    // == Unfile ==
    /// Removes this revision from every bucket it was filed into.
    ///
    /// Idempotent: unfiling twice, or unfiling a revision that a concurrent
    /// writer already removed, is a no-op.
    pub(crate) fn unfile(&self) {
        for bucket in &self.memberships {
            bucket.write().remove(&self.sequence);
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Revision<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Revision")
            .field("sequence", &self.sequence)
            .field("item", &self.item)
            .field("memberships", &self.memberships.len())
            .finish()
    }
}
