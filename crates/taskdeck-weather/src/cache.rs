//! In-memory TTL cache of weather snapshots keyed by normalized location.
//!
//! Time is passed in by the caller so freshness is deterministic in tests.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

use crate::types::WeatherSnapshot;

/// Default freshness window.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Cache key for a free-text location: trimmed and lowercased.
pub fn normalize_key(location: &str) -> String {
    location.trim().to_lowercase()
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub snapshot: WeatherSnapshot,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct WeatherCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
    max_entries: Option<usize>,
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl WeatherCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            max_entries: None,
        }
    }

    /// Cap the number of distinct locations kept. `None` means unbounded.
    pub fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Fresh snapshot for `location`, if any.
    pub fn get(&self, location: &str, now: DateTime<Utc>) -> Option<&WeatherSnapshot> {
        self.entries
            .get(&normalize_key(location))
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| &entry.snapshot)
    }

    /// Store `snapshot`, overwriting any previous entry for the same key.
    pub fn insert(&mut self, location: &str, snapshot: WeatherSnapshot, now: DateTime<Utc>) {
        let key = normalize_key(location);

        if let Some(max) = self.max_entries {
            if !self.entries.contains_key(&key) && self.entries.len() >= max {
                self.evict_oldest();
            }
        }

        self.entries.insert(
            key,
            CacheEntry {
                snapshot,
                fetched_at: now,
            },
        );
    }

    /// Drop every stale entry; returns how many were removed.
    pub fn purge_stale(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| Self::age(entry, now) < ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        Self::age(entry, now) < self.ttl
    }

    // Entries stamped in the future (clock moved back) count as brand new.
    fn age(entry: &CacheEntry, now: DateTime<Utc>) -> Duration {
        (now - entry.fetched_at).to_std().unwrap_or(Duration::ZERO)
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.fetched_at)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            tracing::debug!("Evicting weather cache entry: {}", key);
            self.entries.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot(temp: i32) -> WeatherSnapshot {
        WeatherSnapshot {
            location: Some("Paris".to_string()),
            temp,
            condition: "Clear".to_string(),
            icon: "https://openweathermap.org/img/wn/01d@2x.png".to_string(),
            humidity: Some(40),
            wind: None,
            last_updated: None,
        }
    }

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap() + chrono::Duration::minutes(minutes)
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  Paris "), "paris");
        assert_eq!(normalize_key("NEW YORK"), "new york");
    }

    #[test]
    fn test_hit_is_case_and_whitespace_insensitive() {
        let mut cache = WeatherCache::default();
        cache.insert("Paris", snapshot(18), at(0));
        assert_eq!(cache.get("  paris", at(5)), Some(&snapshot(18)));
    }

    #[test]
    fn test_entry_expires_at_ttl() {
        let mut cache = WeatherCache::default();
        cache.insert("paris", snapshot(18), at(0));
        assert!(cache.get("paris", at(29)).is_some());
        assert!(cache.get("paris", at(30)).is_none());
    }

    #[test]
    fn test_insert_overwrites_stale_entry() {
        let mut cache = WeatherCache::default();
        cache.insert("paris", snapshot(18), at(0));
        cache.insert("Paris", snapshot(12), at(45));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("paris", at(46)).map(|s| s.temp), Some(12));
    }

    #[test]
    fn test_future_timestamp_counts_as_fresh() {
        let mut cache = WeatherCache::default();
        cache.insert("paris", snapshot(18), at(10));
        assert!(cache.get("paris", at(0)).is_some());
    }

    #[test]
    fn test_purge_stale() {
        let mut cache = WeatherCache::default();
        cache.insert("paris", snapshot(18), at(0));
        cache.insert("oslo", snapshot(2), at(20));
        assert_eq!(cache.purge_stale(at(40)), 1);
        assert!(cache.get("oslo", at(40)).is_some());
    }

    #[test]
    fn test_unbounded_by_default() {
        let mut cache = WeatherCache::default();
        for i in 0..100 {
            cache.insert(&format!("city-{}", i), snapshot(i), at(0));
        }
        assert_eq!(cache.len(), 100);
    }

    #[test]
    fn test_max_entries_evicts_oldest() {
        let mut cache = WeatherCache::default().with_max_entries(Some(2));
        cache.insert("paris", snapshot(18), at(0));
        cache.insert("oslo", snapshot(2), at(1));
        cache.insert("rome", snapshot(24), at(2));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("paris", at(3)).is_none());
        assert!(cache.get("oslo", at(3)).is_some());
        assert!(cache.get("rome", at(3)).is_some());
    }

    #[test]
    fn test_max_entries_refresh_same_key_does_not_evict() {
        let mut cache = WeatherCache::default().with_max_entries(Some(2));
        cache.insert("paris", snapshot(18), at(0));
        cache.insert("oslo", snapshot(2), at(1));
        cache.insert("paris", snapshot(19), at(2));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("oslo", at(3)).is_some());
    }

    #[test]
    fn test_empty_until_insert() {
        let mut cache = WeatherCache::default();
        assert!(cache.is_empty());
        cache.insert("paris", snapshot(18), at(0));
        assert!(!cache.is_empty());
    }
}
