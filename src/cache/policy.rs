//! Daily refresh gate.

use super::CacheError;
use chrono::{DateTime, Utc};
use std::sync::Mutex;

/// Process-wide record of the last full refresh sweep.
///
/// Checked on request arrival: the first request on a new UTC day wins the
/// sweep, every other concurrent caller sees it already done.
#[derive(Debug, Default)]
pub struct RefreshPolicy {
    last_sweep: Mutex<Option<DateTime<Utc>>>,
}

impl RefreshPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a sweep already recorded at `at`.
    pub fn swept_at(at: DateTime<Utc>) -> Self {
        Self {
            last_sweep: Mutex::new(Some(at)),
        }
    }

    pub fn last_sweep(&self) -> Result<Option<DateTime<Utc>>, CacheError> {
        Ok(*self.last_sweep.lock().map_err(|_| CacheError::Poisoned)?)
    }

    /// Returns `true` if a UTC day boundary has passed since the last sweep
    /// (or no sweep has happened yet), recording `now` as the new sweep time.
    /// Exactly one caller observes `true` per boundary.
    pub fn check_and_maybe_invalidate(&self, now: DateTime<Utc>) -> Result<bool, CacheError> {
        let mut last = self.last_sweep.lock().map_err(|_| CacheError::Poisoned)?;
        let due = match *last {
            None => true,
            Some(prev) => now.date_naive() > prev.date_naive(),
        };
        if due {
            *last = Some(now);
        }
        Ok(due)
    }

    /// Record an on-demand sweep at `now`.
    pub fn force(&self, now: DateTime<Utc>) -> Result<(), CacheError> {
        *self.last_sweep.lock().map_err(|_| CacheError::Poisoned)? = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, h, m, 0).unwrap()
    }

    #[test]
    fn test_first_check_sweeps() {
        let policy = RefreshPolicy::new();
        assert!(policy.check_and_maybe_invalidate(at(1, 10, 0)).unwrap());
        assert_eq!(policy.last_sweep().unwrap(), Some(at(1, 10, 0)));
        assert!(!policy.check_and_maybe_invalidate(at(1, 23, 59)).unwrap());
    }

    #[test]
    fn test_day_boundary_triggers_once() {
        let policy = RefreshPolicy::swept_at(at(1, 23, 50));
        assert!(policy.check_and_maybe_invalidate(at(2, 0, 1)).unwrap());
        assert!(!policy.check_and_maybe_invalidate(at(2, 0, 2)).unwrap());
        assert!(!policy.check_and_maybe_invalidate(at(2, 23, 59)).unwrap());
        assert!(policy.check_and_maybe_invalidate(at(3, 0, 0)).unwrap());
    }

    #[test]
    fn test_clock_going_backwards_does_not_sweep() {
        let policy = RefreshPolicy::swept_at(at(5, 12, 0));
        assert!(!policy.check_and_maybe_invalidate(at(4, 12, 0)).unwrap());
    }

    #[test]
    fn test_force_resets_the_day() {
        let policy = RefreshPolicy::swept_at(at(1, 12, 0));
        policy.force(at(2, 8, 0)).unwrap();
        assert!(!policy.check_and_maybe_invalidate(at(2, 9, 0)).unwrap());
    }

    #[test]
    fn test_concurrent_checks_sweep_exactly_once() {
        let policy = Arc::new(RefreshPolicy::swept_at(at(1, 12, 0)));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let policy = Arc::clone(&policy);
                std::thread::spawn(move || policy.check_and_maybe_invalidate(at(2, 0, 5)).unwrap())
            })
            .collect();
        let sweeps = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|swept| *swept)
            .count();
        assert_eq!(sweeps, 1);
    }
}
