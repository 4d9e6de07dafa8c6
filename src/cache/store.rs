//! In-process TTL cache with whole-entry replacement.

use super::CacheError;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

#[derive(Debug)]
struct Entry<V> {
    value: Arc<V>,
    expires_at: DateTime<Utc>,
    invalidated: bool,
}

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<V> {
    /// Within TTL and not invalidated.
    Fresh(Arc<V>),
    /// Expired or invalidated; kept until a recompute succeeds.
    Stale(Arc<V>),
    Miss,
}

/// Memoization store keyed by computation arguments.
///
/// Values are shared behind `Arc` and swapped in whole under the write lock,
/// so readers see either the old entry or the new one. Expiry and
/// invalidation only mark entries stale; they are never removed before a
/// replacement is inserted.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, Entry<V>>>,
}

impl<K: Eq + Hash, V> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &K, now: DateTime<Utc>) -> Result<Lookup<V>, CacheError> {
        let entries = self.entries.read().map_err(|_| CacheError::Poisoned)?;
        Ok(match entries.get(key) {
            Some(e) if !e.invalidated && now < e.expires_at => Lookup::Fresh(Arc::clone(&e.value)),
            Some(e) => Lookup::Stale(Arc::clone(&e.value)),
            None => Lookup::Miss,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn insert(&self, key: K, value: Arc<V>, now: DateTime<Utc>) -> Result<(), CacheError> {
        self.insert_until(key, value, now + self.ttl)
    }

    /// Insert with an explicit expiry instead of the configured TTL.
    pub fn insert_until(
        &self,
        key: K,
        value: Arc<V>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        let entry = Entry {
            value,
            expires_at,
            invalidated: false,
        };
        self.entries
            .write()
            .map_err(|_| CacheError::Poisoned)?
            .insert(key, entry);
        Ok(())
    }

    /// Serve the existing value for `key` as fresh again until `until`.
    /// Returns `false` if there is no entry to hold.
    pub fn hold(&self, key: &K, until: DateTime<Utc>) -> Result<bool, CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Poisoned)?;
        Ok(match entries.get_mut(key) {
            Some(entry) => {
                entry.expires_at = until;
                entry.invalidated = false;
                true
            }
            None => false,
        })
    }

    /// Expiry of the entry for `key`, if any. Invalidated entries report
    /// `None`.
    pub fn expires_at(&self, key: &K) -> Result<Option<DateTime<Utc>>, CacheError> {
        let entries = self.entries.read().map_err(|_| CacheError::Poisoned)?;
        Ok(entries
            .get(key)
            .filter(|e| !e.invalidated)
            .map(|e| e.expires_at))
    }

    /// Mark every entry stale. Returns how many entries were affected.
    pub fn invalidate_all(&self) -> Result<usize, CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Poisoned)?;
        for entry in entries.values_mut() {
            entry.invalidated = true;
        }
        Ok(entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_miss_then_fresh() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::seconds(60));
        assert_eq!(cache.get(&"k", t0()).unwrap(), Lookup::Miss);

        cache.insert("k", Arc::new(7), t0()).unwrap();
        assert_eq!(cache.get(&"k", t0()).unwrap(), Lookup::Fresh(Arc::new(7)));
        assert_eq!(
            cache.get(&"k", t0() + Duration::seconds(59)).unwrap(),
            Lookup::Fresh(Arc::new(7))
        );
    }

    #[test]
    fn test_expired_entry_is_stale_not_removed() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::seconds(60));
        cache.insert("k", Arc::new(7), t0()).unwrap();
        assert_eq!(
            cache.get(&"k", t0() + Duration::seconds(60)).unwrap(),
            Lookup::Stale(Arc::new(7))
        );
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_marks_stale_until_replaced() {
        let cache: TtlCache<u8, &str> = TtlCache::new(Duration::hours(1));
        cache.insert(1, Arc::new("a"), t0()).unwrap();
        cache.insert(2, Arc::new("b"), t0()).unwrap();

        assert_eq!(cache.invalidate_all().unwrap(), 2);
        assert_eq!(cache.get(&1, t0()).unwrap(), Lookup::Stale(Arc::new("a")));

        cache.insert(1, Arc::new("c"), t0()).unwrap();
        assert_eq!(cache.get(&1, t0()).unwrap(), Lookup::Fresh(Arc::new("c")));
        assert_eq!(cache.get(&2, t0()).unwrap(), Lookup::Stale(Arc::new("b")));
    }

    #[test]
    fn test_hold_revives_stale_entry_until_deadline() {
        let cache: TtlCache<u8, &str> = TtlCache::new(Duration::hours(1));
        assert!(!cache.hold(&1, t0()).unwrap());

        cache.insert(1, Arc::new("a"), t0()).unwrap();
        cache.invalidate_all().unwrap();
        assert_eq!(cache.expires_at(&1).unwrap(), None);

        let until = t0() + Duration::seconds(30);
        assert!(cache.hold(&1, until).unwrap());
        assert_eq!(cache.expires_at(&1).unwrap(), Some(until));
        assert_eq!(cache.get(&1, t0()).unwrap(), Lookup::Fresh(Arc::new("a")));
        assert_eq!(cache.get(&1, until).unwrap(), Lookup::Stale(Arc::new("a")));
    }

    #[test]
    fn test_insert_until_overrides_ttl() {
        let cache: TtlCache<u8, u8> = TtlCache::new(Duration::hours(1));
        let until = t0() + Duration::minutes(5);
        cache.insert_until(1, Arc::new(1), until).unwrap();
        assert_eq!(cache.expires_at(&1).unwrap(), Some(until));
        assert_eq!(
            cache.get(&1, t0() + Duration::minutes(6)).unwrap(),
            Lookup::Stale(Arc::new(1))
        );
    }

    #[test]
    fn test_readers_keep_their_snapshot_after_replace() {
        let cache: TtlCache<u8, Vec<u32>> = TtlCache::new(Duration::hours(1));
        cache.insert(0, Arc::new(vec![1, 2, 3]), t0()).unwrap();
        let Lookup::Fresh(held) = cache.get(&0, t0()).unwrap() else {
            panic!("expected fresh entry");
        };
        cache.insert(0, Arc::new(vec![9]), t0()).unwrap();
        assert_eq!(*held, vec![1, 2, 3]);
        assert_eq!(cache.get(&0, t0()).unwrap(), Lookup::Fresh(Arc::new(vec![9])));
    }
}
