//! Index Module
//!
//! A secondary index: maps the key computed by one extractor to the bucket of
//! revisions currently filed under it.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;

use crate::cache::revision::Bucket;

/// Computes an index key from a cached item.
///
/// Must be pure and deterministic: the same item always yields the same key.
pub type KeyExtractor<T, K> = Box<dyn Fn(&T) -> K + Send + Sync>;

// == Index ==
pub(crate) struct Index<T, K> {
    extractor: KeyExtractor<T, K>,
    buckets: DashMap<K, Arc<Bucket<T>>>,
}

impl<T, K> Index<T, K>
where
    T: Eq + Hash + Clone,
    K: Eq + Hash,
{
    // == Constructor ==
    pub(crate) fn new(extractor: KeyExtractor<T, K>) -> Self {
        Self {
            extractor,
            buckets: DashMap::new(),
        }
    }

    // == Bucket For ==
    /// Returns the bucket `item` belongs in, creating it if absent.
    ///
    /// Buckets are never removed once created, so a handle recorded in a
    /// revision stays the live bucket for that key.
    pub(crate) fn bucket_for(&self, item: &T) -> Arc<Bucket<T>> {
        let key = (self.extractor)(item);

        if let Some(bucket) = self.buckets.get(&key) {
            return Arc::clone(bucket.value());
        }

        Arc::clone(
            self.buckets
                .entry(key)
                .or_insert_with(|| Arc::new(Bucket::new()))
                .value(),
        )
    }

    // == Lookup ==
    /// Returns the items filed under `key`, one per logical identity.
    ///
    /// While a replace is in flight a bucket can briefly hold two revisions of
    /// the same identity; the one with the higher sequence is returned.
    pub(crate) fn lookup<Q>(&self, key: &Q) -> HashSet<T>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let bucket = match self.buckets.get(key) {
            Some(bucket) => Arc::clone(bucket.value()),
            None => return HashSet::new(),
        };

        let mut revisions = bucket.snapshot();
        revisions.sort_unstable_by(|a, b| b.sequence().cmp(&a.sequence()));

        let mut items = HashSet::with_capacity(revisions.len());
        for revision in revisions {
            if !items.contains(revision.item()) {
                items.insert(revision.item().clone());
            }
        }
        items
    }

    /// Number of distinct keys ever filed into this index.
    #[cfg(test)]
    pub(crate) fn key_count(&self) -> usize {
        self.buckets.len()
    }
}
