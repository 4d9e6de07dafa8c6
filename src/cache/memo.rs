//! Async memoization over [`TtlCache`] with single-flight recompute and
//! serve-stale-on-error.

use super::{CacheError, Lookup, TtlCache};
use chrono::{DateTime, Duration, Utc};
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Seconds a stale value keeps being served after a failed recompute before
/// the next attempt.
pub const DEFAULT_RETRY_AFTER_SECS: i64 = 60;

#[derive(Debug)]
pub struct Memo<K, V> {
    name: &'static str,
    cache: TtlCache<K, V>,
    retry_after: Duration,
    gate: Mutex<()>,
}

impl<K, V> Memo<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            cache: TtlCache::new(ttl),
            retry_after: Duration::seconds(DEFAULT_RETRY_AFTER_SECS),
            gate: Mutex::new(()),
        }
    }

    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = retry_after;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// When the value currently served for `key` stops being fresh.
    pub fn expires_at(&self, key: &K) -> Option<DateTime<Utc>> {
        self.cache.expires_at(key).ok().flatten()
    }

    /// Return the cached value for `key`, computing it when missing or stale.
    ///
    /// Only one recompute runs at a time per memo; callers that queued behind
    /// it pick up its result. If the recompute fails and an older value is
    /// still held, that value is served and kept fresh for the retry window,
    /// so queued and later callers reuse it instead of retrying at once.
    /// Cache failures degrade to an uncached computation.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: K,
        now: DateTime<Utc>,
        compute: F,
    ) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: Display,
    {
        self.get_or_compute_until(key, now, move || async move {
            compute().await.map(|value| (value, None))
        })
        .await
    }

    /// Like [`Memo::get_or_compute`], but `compute` may also return a
    /// deadline past which its result must not be served as fresh. The
    /// entry expires at the earlier of that deadline and the TTL.
    pub async fn get_or_compute_until<F, Fut, E>(
        &self,
        key: K,
        now: DateTime<Utc>,
        compute: F,
    ) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(V, Option<DateTime<Utc>>), E>>,
        E: Display,
    {
        if let Ok(Lookup::Fresh(value)) = self.cache.get(&key, now) {
            debug!(cache = self.name, key = ?key, "cache hit");
            return Ok(value);
        }

        let _guard = self.gate.lock().await;

        let stale = match self.cache.get(&key, now) {
            Ok(Lookup::Fresh(value)) => {
                debug!(cache = self.name, key = ?key, "computed by concurrent caller");
                return Ok(value);
            }
            Ok(Lookup::Stale(value)) => Some(value),
            Ok(Lookup::Miss) => None,
            Err(e) => {
                warn!(cache = self.name, error = %e, "cache unavailable, computing uncached");
                None
            }
        };

        info!(cache = self.name, key = ?key, "recomputing");
        match compute().await {
            Ok((value, valid_until)) => {
                let value = Arc::new(value);
                let expires_at = match valid_until {
                    Some(deadline) => deadline.min(now + self.cache.ttl()),
                    None => now + self.cache.ttl(),
                };
                if let Err(e) = self.cache.insert_until(key, Arc::clone(&value), expires_at) {
                    warn!(cache = self.name, error = %e, "failed to store result");
                }
                Ok(value)
            }
            Err(e) => match stale {
                Some(value) => {
                    let retry_at = now + self.retry_after;
                    warn!(
                        cache = self.name,
                        error = %e,
                        retry_at = %retry_at,
                        "recompute failed, serving stale value"
                    );
                    if let Err(ce) = self.cache.hold(&key, retry_at) {
                        warn!(cache = self.name, error = %ce, "failed to hold stale value");
                    }
                    Ok(value)
                }
                None => {
                    error!(cache = self.name, error = %e, "recompute failed");
                    Err(e)
                }
            },
        }
    }

    pub fn invalidate(&self) -> Result<usize, CacheError> {
        self.cache.invalidate_all()
    }
}
