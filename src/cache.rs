//! A key-value cache for derived dashboard aggregates.
//!
//! The cache is a read-through/write-invalidate layer: absence of a key is
//! not an error, it signals "recompute". Entries expire after a per-key TTL,
//! but TTL is only the fallback consistency mechanism; writers delete stale
//! keys eagerly via the [invalidation](crate::invalidation) registry.
//!
//! Values are stored as serialized JSON strings, mirroring how an external
//! store such as Redis would hold them.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use crate::{Error, month::Month};

/// TTL for the dashboard snapshot of the current calendar month, which
/// churns as transactions are recorded.
pub const DASHBOARD_CURRENT_MONTH_TTL: Duration = Duration::from_secs(60);
/// TTL for dashboard snapshots of historical months, which are immutable in
/// practice.
pub const DASHBOARD_TTL: Duration = Duration::from_secs(300);
/// TTL for per-month expense totals.
pub const MONTHLY_EXPENSES_TTL: Duration = Duration::from_secs(600);
/// TTL for per-month category breakdowns.
pub const CATEGORY_BREAKDOWN_TTL: Duration = Duration::from_secs(600);
/// TTL for per-month budget alerts.
pub const BUDGET_ALERTS_TTL: Duration = Duration::from_secs(180);

/// The cache key for a month's dashboard snapshot.
pub fn dashboard_key(month: Month) -> String {
    format!("dashboard:stats:{month}")
}

/// The cache key for a month's expense total.
pub fn monthly_expenses_key(month: Month) -> String {
    format!("expenses:monthly:{month}")
}

/// The cache key for a month's category breakdown.
pub fn category_breakdown_key(month: Month) -> String {
    format!("breakdown:category:{month}")
}

/// The cache key for a month's budget alerts.
pub fn budget_alerts_key(month: Month) -> String {
    format!("alerts:budget:{month}")
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// An in-process key-value cache with per-entry TTLs.
///
/// The handle is cheap to clone and is shared across request handlers; the
/// caller never observes internal locking. A poisoned lock surfaces as
/// [Error::CacheLockError], which callers treat as a miss (reads) or log
/// and swallow (writes).
#[derive(Debug, Clone, Default)]
pub struct Cache {
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl Cache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value stored at `key`, if it exists and has not expired.
    ///
    /// Expired entries are removed on access and reported as absent.
    pub fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let mut entries = self.entries.lock().map_err(|_| Error::CacheLockError)?;

        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Store `value` at `key` for `ttl`, replacing any existing entry.
    pub fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), Error> {
        let mut entries = self.entries.lock().map_err(|_| Error::CacheLockError)?;

        entries.insert(
            key.to_owned(),
            CacheEntry {
                value: value.to_owned(),
                expires_at: Instant::now() + ttl,
            },
        );

        Ok(())
    }

    /// Remove the entry at `key`. Deleting a missing key is not an error.
    pub fn delete(&self, key: &str) -> Result<(), Error> {
        let mut entries = self.entries.lock().map_err(|_| Error::CacheLockError)?;

        entries.remove(key);

        Ok(())
    }
}

#[cfg(test)]
mod cache_tests {
    use std::time::Duration;

    use super::{Cache, dashboard_key};
    use crate::month::Month;

    #[test]
    fn get_returns_stored_value() {
        let cache = Cache::new();
        cache
            .set("dashboard:stats:2024-03", "{}", Duration::from_secs(60))
            .unwrap();

        let value = cache.get("dashboard:stats:2024-03").unwrap();

        assert_eq!(value, Some("{}".to_string()));
    }

    #[test]
    fn missing_key_is_absent_not_an_error() {
        let cache = Cache::new();

        assert_eq!(cache.get("nothing:here").unwrap(), None);
    }

    #[test]
    fn expired_entry_counts_as_a_miss() {
        let cache = Cache::new();
        cache.set("short:lived", "x", Duration::ZERO).unwrap();

        assert_eq!(cache.get("short:lived").unwrap(), None);
    }

    #[test]
    fn delete_removes_entry_and_tolerates_missing_keys() {
        let cache = Cache::new();
        cache.set("a", "1", Duration::from_secs(60)).unwrap();

        cache.delete("a").unwrap();
        cache.delete("a").unwrap();

        assert_eq!(cache.get("a").unwrap(), None);
    }

    #[test]
    fn set_replaces_existing_value() {
        let cache = Cache::new();
        cache.set("a", "old", Duration::from_secs(60)).unwrap();
        cache.set("a", "new", Duration::from_secs(60)).unwrap();

        assert_eq!(cache.get("a").unwrap(), Some("new".to_string()));
    }

    #[test]
    fn keys_embed_the_month() {
        let month = Month::new(2024, 3).unwrap();

        assert_eq!(dashboard_key(month), "dashboard:stats:2024-03");
    }
}
