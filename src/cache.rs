use std::time::{Duration, Instant};

/// A single value that is recomputed once it has been held for longer than a
/// fixed time-to-live.  After a failed recomputation, the next attempt waits
/// for another full TTL unless the value is expired explicitly.
#[derive(Clone, Debug)]
pub(crate) struct TtlCache<T> {
    ttl: Duration,
    entry: Option<CacheEntry<T>>,
    failed_at: Option<Instant>,
}

#[derive(Clone, Debug)]
struct CacheEntry<T> {
    value: T,
    fetched_at: Instant,
    expired: bool,
}

impl<T> TtlCache<T> {
    pub(crate) fn new(ttl: Duration) -> TtlCache<T> {
        TtlCache {
            ttl,
            entry: None,
            failed_at: None,
        }
    }

    /// Returns the stored value, fresh or not
    pub(crate) fn get(&self) -> Option<&T> {
        self.entry.as_ref().map(|e| &e.value)
    }

    pub(crate) fn is_fresh(&self, now: Instant) -> bool {
        self.entry.as_ref().is_some_and(|e| {
            !e.expired && now.saturating_duration_since(e.fetched_at) < self.ttl
        })
    }

    /// How long ago the stored value was computed
    pub(crate) fn age(&self, now: Instant) -> Option<Duration> {
        self.entry
            .as_ref()
            .map(|e| now.saturating_duration_since(e.fetched_at))
    }

    /// Whether a failed recomputation happened less than a TTL before `now`
    pub(crate) fn is_backing_off(&self, now: Instant) -> bool {
        self.failed_at
            .is_some_and(|t| now.saturating_duration_since(t) < self.ttl)
    }

    /// Mark the stored value as stale without discarding it, and allow the
    /// next refresh to run even if the last one failed recently
    pub(crate) fn expire(&mut self) {
        if let Some(e) = self.entry.as_mut() {
            e.expired = true;
        }
        self.failed_at = None;
    }

    /// Recompute the value with `fetch` if there is none or it has expired.
    ///
    /// Returns `Ok(true)` if a new value was stored and `Ok(false)` if the
    /// stored value is still fresh or the last attempt failed too recently to
    /// try again.  If `fetch` fails, the previous value (if any) is kept as-is
    /// and the error is returned.
    pub(crate) fn refresh<E, F>(&mut self, now: Instant, fetch: F) -> Result<bool, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if self.is_fresh(now) || self.is_backing_off(now) {
            return Ok(false);
        }
        match fetch() {
            Ok(value) => {
                self.entry = Some(CacheEntry {
                    value,
                    fetched_at: now,
                    expired: false,
                });
                self.failed_at = None;
                Ok(true)
            }
            Err(e) => {
                self.failed_at = Some(now);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    #[test]
    fn test_first_refresh_fetches() {
        let mut cache = TtlCache::new(TTL);
        assert_eq!(cache.get(), None);
        let now = Instant::now();
        assert_eq!(cache.refresh(now, || Ok::<_, ()>(1)), Ok(true));
        assert_eq!(cache.get(), Some(&1));
        assert_eq!(cache.age(now), Some(Duration::ZERO));
    }

    #[test]
    fn test_fresh_value_served() {
        let mut cache = TtlCache::new(TTL);
        let start = Instant::now();
        cache.refresh(start, || Ok::<_, ()>(1)).unwrap();
        let later = start + Duration::from_secs(299);
        let r = cache.refresh(later, || -> Result<i32, ()> {
            panic!("fetched while fresh")
        });
        assert_eq!(r, Ok(false));
        assert_eq!(cache.get(), Some(&1));
    }

    #[test]
    fn test_expired_value_refetched() {
        let mut cache = TtlCache::new(TTL);
        let start = Instant::now();
        cache.refresh(start, || Ok::<_, ()>(1)).unwrap();
        let later = start + TTL;
        assert!(!cache.is_fresh(later));
        assert_eq!(cache.refresh(later, || Ok::<_, ()>(2)), Ok(true));
        assert_eq!(cache.get(), Some(&2));
        assert!(cache.is_fresh(later));
    }

    #[test]
    fn test_failed_refresh_keeps_value() {
        let mut cache = TtlCache::new(TTL);
        let start = Instant::now();
        cache.refresh(start, || Ok::<_, &str>(1)).unwrap();
        let later = start + TTL * 2;
        assert_eq!(cache.refresh(later, || Err("offline")), Err("offline"));
        assert_eq!(cache.get(), Some(&1));
        assert!(!cache.is_fresh(later));
        let retry = later + TTL;
        assert_eq!(cache.refresh(retry, || Ok::<_, &str>(3)), Ok(true));
        assert_eq!(cache.get(), Some(&3));
        assert!(!cache.is_backing_off(retry));
    }

    #[test]
    fn test_no_retry_right_after_failure() {
        let mut cache = TtlCache::new(TTL);
        let start = Instant::now();
        cache.refresh(start, || Ok::<_, &str>(1)).unwrap();
        let failed = start + TTL;
        assert_eq!(cache.refresh(failed, || Err("offline")), Err("offline"));
        assert!(cache.is_backing_off(failed));
        for secs in [0, 1, 299] {
            let now = failed + Duration::from_secs(secs);
            let r = cache.refresh(now, || -> Result<i32, &str> { panic!("retried too soon") });
            assert_eq!(r, Ok(false));
        }
        assert_eq!(cache.get(), Some(&1));
        assert_eq!(
            cache.refresh(failed + TTL, || Err("still offline")),
            Err("still offline")
        );
        assert!(cache.is_backing_off(failed + TTL));
    }

    #[test]
    fn test_expire_skips_backoff() {
        let mut cache = TtlCache::new(TTL);
        let start = Instant::now();
        assert_eq!(cache.refresh(start, || Err::<i32, _>("offline")), Err("offline"));
        assert_eq!(cache.get(), None);
        cache.expire();
        assert!(!cache.is_backing_off(start));
        assert_eq!(cache.refresh(start, || Ok::<_, &str>(2)), Ok(true));
        assert_eq!(cache.get(), Some(&2));
    }

    #[test]
    fn test_expire() {
        let mut cache = TtlCache::new(TTL);
        let now = Instant::now();
        cache.refresh(now, || Ok::<_, ()>(1)).unwrap();
        cache.expire();
        assert!(!cache.is_fresh(now));
        assert_eq!(cache.refresh(now, || Ok::<_, ()>(2)), Ok(true));
        assert_eq!(cache.get(), Some(&2));
    }
}
