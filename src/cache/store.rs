//! Indexed Cache Module
//!
//! Main cache engine: a concurrent identity map of current revisions plus any
//! number of secondary indexes, updated without a cache-wide lock.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

use crate::cache::index::{Index, KeyExtractor};
use crate::cache::revision::{Revision, SequenceGenerator};
use crate::error::{PriceError, Result};

// == Indexed Cache ==
/// Latest-value-per-identity cache with ordinal-addressed secondary indexes.
///
/// Logical identity is `T`'s `Eq`/`Hash`. Each configured [`KeyExtractor`]
/// becomes one index, queried by its position in the constructor list.
///
/// Indexes are eventually consistent with the identity map. During a replace
/// that changes an extracted key, the old and new values can be visible at
/// the same time under their two different keys; they are never returned
/// together from one key.
pub struct IndexedCache<T, K> {
    /// Identity -> current revision
    items: DashMap<T, Arc<Revision<T>>>,
    /// Secondary indexes, addressed by ordinal
    indexes: Vec<Index<T, K>>,
    /// Revision tie-breaker
    sequence: SequenceGenerator,
}

impl<T, K> IndexedCache<T, K>
where
    T: Eq + Hash + Clone,
    K: Eq + Hash,
{
    // == Constructor ==
    /// Creates a cache with one index per extractor, in the given order.
    ///
    /// # Errors
    /// `NoIndexesConfigured` if `extractors` is empty.
    pub fn new(extractors: Vec<KeyExtractor<T, K>>) -> Result<Self> {
        if extractors.is_empty() {
            return Err(PriceError::NoIndexesConfigured);
        }

        Ok(Self {
            items: DashMap::new(),
            indexes: extractors.into_iter().map(Index::new).collect(),
            sequence: SequenceGenerator::new(),
        })
    }

    // == Add Item ==
    /// Adds `item`, replacing any current value with the same identity.
    ///
    /// The new revision is filed into every index before it becomes current,
    /// and the superseded revision is unfiled only afterwards, so a lookup
    /// never finds zero copies of an identity that was present.
    pub fn add_item(&self, item: T) {
        let sequence = self.sequence.next();
        let memberships = self
            .indexes
            .iter()
            .map(|index| index.bucket_for(&item))
            .collect();

        let revision = Arc::new(Revision::new(sequence, item, memberships));
        revision.file();

        let previous = self
            .items
            .insert(revision.item().clone(), Arc::clone(&revision));

        if let Some(previous) = previous {
            trace!("Replaced revision {} with {}", previous.sequence(), sequence);
            previous.unfile();
        }
    }

    // == Get By Index ==
    /// Returns the items filed under `key` in the index at `ordinal`.
    ///
    /// # Errors
    /// `InvalidIndexOrdinal` if `ordinal` does not name a configured index.
    pub fn get_by_index<Q>(&self, ordinal: usize, key: &Q) -> Result<HashSet<T>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self
            .indexes
            .get(ordinal)
            .ok_or(PriceError::InvalidIndexOrdinal {
                ordinal,
                configured: self.indexes.len(),
            })?;

        Ok(index.lookup(key))
    }

    // == Get All ==
    /// Returns a snapshot of every current item.
    pub fn get_all(&self) -> HashSet<T> {
        self.items
            .iter()
            .map(|entry| entry.value().item().clone())
            .collect()
    }

    // == Evict ==
    /// Removes every current item matching `predicate` and returns them.
    ///
    /// Removal from the identity map only happens if the map still holds the
    /// exact revision that matched; a revision superseded by a concurrent
    /// `add_item` in the meantime is skipped and not reported.
    pub fn evict<P>(&self, predicate: P) -> HashSet<T>
    where
        P: Fn(&T) -> bool,
    {
        // Snapshot first: no shard guard may be held while `predicate` runs or
        // while entries are removed
        let current: Vec<Arc<Revision<T>>> =
            self.items.iter().map(|entry| Arc::clone(entry.value())).collect();

        let mut removed = HashSet::new();
        for revision in current {
            if !predicate(revision.item()) {
                continue;
            }

            revision.unfile();

            let was_current = self
                .items
                .remove_if(revision.item(), |_, current| Arc::ptr_eq(current, &revision))
                .is_some();

            if was_current {
                removed.insert(revision.item().clone());
            } else {
                trace!("Revision {} superseded before eviction", revision.sequence());
            }
        }
        removed
    }

    // == Index Count ==
    /// Returns the number of configured indexes.
    pub fn index_count(&self) -> usize {
        self.indexes.len()
    }

    // == Length ==
    /// Returns the number of distinct identities currently cached.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Eq + Hash, K> std::fmt::Debug for IndexedCache<T, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexedCache")
            .field("items", &self.items.len())
            .field("indexes", &self.indexes.len())
            .finish()
    }
}
