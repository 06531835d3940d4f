//! Bounded, expiring memo of dataset summaries.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dsync_model::{DatasetId, DatasetSummary, OwnerId};
use lru::LruCache;

type CacheKey = (OwnerId, DatasetId);

#[derive(Debug)]
struct Entry {
    summary: Arc<DatasetSummary>,
    stored_at: Instant,
}

#[derive(Debug)]
struct State {
    entries: LruCache<CacheKey, Entry>,
    generation: u64,
}

/// Memoizes column summaries per `(owner, dataset)`.
///
/// Pure optimization: a miss recomputes from the store. Entries expire
/// after the TTL and must be invalidated whenever content is replaced or
/// the dataset is deleted.
///
/// Every invalidation advances a generation counter. A summary computed
/// from a read that started before an invalidation carries the older
/// generation and is refused by [`SummaryCache::insert`].
#[derive(Debug)]
pub struct SummaryCache {
    state: Mutex<State>,
    ttl: Duration,
}

impl SummaryCache {
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            state: Mutex::new(State {
                entries: LruCache::new(capacity),
                generation: 0,
            }),
            ttl,
        }
    }

    /// Builds a cache from settings; `None` when `capacity` is zero.
    pub fn from_settings(capacity: usize, ttl: Duration) -> Option<Self> {
        NonZeroUsize::new(capacity).map(|capacity| Self::new(capacity, ttl))
    }

    pub fn get(&self, owner: &OwnerId, id: DatasetId) -> Option<Arc<DatasetSummary>> {
        let mut state = self.lock();
        let key = (owner.clone(), id);

        let entry = state.entries.get(&key)?;
        if entry.stored_at.elapsed() < self.ttl {
            return Some(Arc::clone(&entry.summary));
        }

        state.entries.pop(&key);
        None
    }

    /// Current generation. Read it before loading the dataset whose
    /// summary will be inserted.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Stores a summary computed at `generation`.
    ///
    /// Returns `false` and stores nothing when an invalidation happened
    /// since that generation was read.
    pub fn insert(
        &self,
        owner: &OwnerId,
        id: DatasetId,
        summary: Arc<DatasetSummary>,
        generation: u64,
    ) -> bool {
        let mut state = self.lock();
        if state.generation != generation {
            return false;
        }
        state.entries.put(
            (owner.clone(), id),
            Entry {
                summary,
                stored_at: Instant::now(),
            },
        );
        true
    }

    /// Drops the cached summary of one dataset.
    pub fn invalidate(&self, owner: &OwnerId, id: DatasetId) {
        let mut state = self.lock();
        state.generation = state.generation.wrapping_add(1);
        if state.entries.pop(&(owner.clone(), id)).is_some() {
            tracing::debug!(dataset_id = %id, "Invalidated cached summary");
        }
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.generation = state.generation.wrapping_add(1);
        state.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(rows: usize) -> Arc<DatasetSummary> {
        Arc::new(DatasetSummary {
            row_count: rows,
            columns: Vec::new(),
        })
    }

    fn cache(capacity: usize, ttl: Duration) -> SummaryCache {
        SummaryCache::from_settings(capacity, ttl).unwrap()
    }

    #[test]
    fn test_hit_and_invalidate() {
        let cache = cache(4, Duration::from_secs(60));
        let owner = OwnerId::from("ada");
        let id = DatasetId::generate();

        assert!(cache.get(&owner, id).is_none());
        cache.insert(&owner, id, summary(3), cache.generation());
        assert_eq!(cache.get(&owner, id).unwrap().row_count, 3);

        cache.invalidate(&owner, id);
        assert!(cache.get(&owner, id).is_none());
    }

    #[test]
    fn test_keyed_by_owner() {
        let cache = cache(4, Duration::from_secs(60));
        let id = DatasetId::generate();
        cache.insert(&OwnerId::from("ada"), id, summary(1), cache.generation());
        assert!(cache.get(&OwnerId::from("lin"), id).is_none());
    }

    #[test]
    fn test_expired_entries_are_dropped() {
        let cache = cache(4, Duration::ZERO);
        let owner = OwnerId::from("ada");
        let id = DatasetId::generate();
        cache.insert(&owner, id, summary(1), cache.generation());
        assert!(cache.get(&owner, id).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_evicts_least_recent() {
        let cache = cache(2, Duration::from_secs(60));
        let owner = OwnerId::from("ada");
        let (a, b, c) = (
            DatasetId::generate(),
            DatasetId::generate(),
            DatasetId::generate(),
        );
        cache.insert(&owner, a, summary(1), cache.generation());
        cache.insert(&owner, b, summary(2), cache.generation());
        cache.get(&owner, a);
        cache.insert(&owner, c, summary(3), cache.generation());

        assert!(cache.get(&owner, a).is_some());
        assert!(cache.get(&owner, b).is_none());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_insert_after_invalidation_is_refused() {
        let cache = cache(4, Duration::from_secs(60));
        let owner = OwnerId::from("ada");
        let id = DatasetId::generate();

        let before = cache.generation();
        cache.invalidate(&owner, id);
        assert!(!cache.insert(&owner, id, summary(1), before));
        assert!(cache.get(&owner, id).is_none());

        assert!(cache.insert(&owner, id, summary(3), cache.generation()));
        assert_eq!(cache.get(&owner, id).unwrap().row_count, 3);
    }

    #[test]
    fn test_zero_capacity_disables() {
        assert!(SummaryCache::from_settings(0, Duration::from_secs(60)).is_none());
    }
}
