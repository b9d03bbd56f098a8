// Report Deduplication
//
// Collapses bursts of identical email-change requests into one report.
// Requests are keyed by (method, url, time bucket); a key already in the
// cache means "already reported". The cache is process-wide, shared across
// worker threads, and bounded by a wholesale clear on overflow.

use crate::config::DedupSettings;
use crate::models::Method;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashSet;

/// Dedup key: identical requests inside one bucket share a key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub method: Method,
    pub url: String,
    pub bucket: i64,
}

impl DedupKey {
    pub fn new(method: &Method, url: &str, now: DateTime<Utc>, bucket_secs: u64) -> Self {
        let width = i64::try_from(bucket_secs.max(1)).unwrap_or(i64::MAX);
        Self {
            method: method.clone(),
            url: url.to_string(),
            bucket: now.timestamp().div_euclid(width),
        }
    }
}

#[derive(Debug)]
pub struct DedupCache {
    settings: DedupSettings,
    seen: Mutex<HashSet<DedupKey>>,
}

impl Default for DedupCache {
    fn default() -> Self {
        Self::new(DedupSettings::default())
    }
}

impl DedupCache {
    pub fn new(settings: DedupSettings) -> Self {
        Self {
            settings,
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Returns true if this (method, url) has not been reported in the
    /// current bucket, recording it. Check and insert happen under one lock.
    ///
    /// Once the cache holds more than `max_entries` keys it is emptied, so a
    /// request seen just before the clear can be reported again.
    pub fn should_report(&self, method: &Method, url: &str, now: DateTime<Utc>) -> bool {
        let key = DedupKey::new(method, url, now, self.settings.bucket_secs);
        let mut seen = self.seen.lock();

        if !seen.insert(key) {
            return false;
        }

        if seen.len() > self.settings.max_entries {
            log::debug!("dedup cache exceeded {} entries, clearing", self.settings.max_entries);
            seen.clear();
        }
        true
    }

    pub fn contains(&self, method: &Method, url: &str, now: DateTime<Utc>) -> bool {
        let key = DedupKey::new(method, url, now, self.settings.bucket_secs);
        self.seen.lock().contains(&key)
    }

    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }
}
