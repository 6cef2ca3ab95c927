//! # Cache Module
//!
//! Memoizes per-file session summaries so repeated aggregation within a short
//! interval does not re-read unchanged transcripts.
//!
//! Entries are keyed by path only, so a file appended to while its entry is
//! fresh is served stale until the entry expires.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::models::SessionSummary;

/// Default cache TTL in seconds
pub const CACHE_TTL_SECONDS: u64 = 5;

/// How entry freshness is measured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheExpiry {
    /// Each entry expires `ttl` after it was stored
    #[default]
    PerEntry,
    /// All entries expire `ttl` after the most recent store anywhere in the cache
    Shared,
}

#[derive(Clone, Debug)]
struct CacheEntry {
    summary: SessionSummary,
    stored_at: Instant,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug)]
pub struct SummaryCache {
    ttl: Duration,
    expiry: CacheExpiry,
    entries: HashMap<PathBuf, CacheEntry>,
    last_write: Option<Instant>,
    hits: u64,
    misses: u64,
}

impl Default for SummaryCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(CACHE_TTL_SECONDS), CacheExpiry::default())
    }
}

impl SummaryCache {
    pub fn new(ttl: Duration, expiry: CacheExpiry) -> Self {
        SummaryCache {
            ttl,
            expiry,
            entries: HashMap::new(),
            last_write: None,
            hits: 0,
            misses: 0,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn expiry(&self) -> CacheExpiry {
        self.expiry
    }

    pub fn get_or_compute(&mut self, path: &Path) -> SessionSummary {
        self.get_or_compute_at(path, Instant::now())
    }

    pub fn get_or_compute_at(&mut self, path: &Path, now: Instant) -> SessionSummary {
        self.get_or_compute_with(path, now, crate::scanner::summarize)
    }

    /// Return the cached summary for `path` if fresh at `now`, else run
    /// `compute` and store its result.
    pub fn get_or_compute_with<F>(&mut self, path: &Path, now: Instant, compute: F) -> SessionSummary
    where
        F: FnOnce(&Path) -> SessionSummary,
    {
        if let Some(summary) = self.lookup(path, now) {
            self.hits += 1;
            return summary;
        }
        self.misses += 1;
        let summary = compute(path);
        self.entries.insert(
            path.to_path_buf(),
            CacheEntry {
                summary: summary.clone(),
                stored_at: now,
            },
        );
        self.last_write = Some(now);
        summary
    }

    fn lookup(&self, path: &Path, now: Instant) -> Option<SessionSummary> {
        let entry = self.entries.get(path)?;
        let written = match self.expiry {
            CacheExpiry::PerEntry => entry.stored_at,
            CacheExpiry::Shared => self.last_write?,
        };
        if now.saturating_duration_since(written) < self.ttl {
            Some(entry.summary.clone())
        } else {
            None
        }
    }

    /// Clear all cached data
    pub fn clear(&mut self) {
        self.entries.clear();
        self.last_write = None;
    }

    /// Get cache statistics (for debugging)
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn summary(id: &str, prompts: u64) -> SessionSummary {
        SessionSummary {
            session_id: id.to_string(),
            project: "p".to_string(),
            start_time: 0,
            end_time: 3600,
            duration_hours: 1.0,
            prompt_count: prompts,
            sonnet_response_count: 0,
            opus_response_count: 0,
        }
    }

    #[test]
    fn test_hit_within_ttl_skips_compute() {
        let mut cache = SummaryCache::default();
        let t0 = Instant::now();
        let calls = Cell::new(0);
        let compute = |_: &Path| {
            calls.set(calls.get() + 1);
            summary("a", calls.get())
        };
        let path = Path::new("/p/a.jsonl");
        assert_eq!(cache.get_or_compute_with(path, t0, compute).prompt_count, 1);
        let again = cache.get_or_compute_with(path, t0 + Duration::from_secs(4), compute);
        assert_eq!(again.prompt_count, 1);
        assert_eq!(calls.get(), 1);
        let later = cache.get_or_compute_with(path, t0 + Duration::from_secs(5), compute);
        assert_eq!(later.prompt_count, 2);
        assert_eq!(
            cache.stats(),
            CacheStats {
                entries: 1,
                hits: 1,
                misses: 2
            }
        );
    }

    #[test]
    fn test_shared_clock_keeps_old_entries_alive() {
        let t0 = Instant::now();
        let a = Path::new("/p/a.jsonl");
        let b = Path::new("/p/b.jsonl");

        let mut shared = SummaryCache::new(Duration::from_secs(5), CacheExpiry::Shared);
        shared.get_or_compute_with(a, t0, |_| summary("a", 1));
        shared.get_or_compute_with(b, t0 + Duration::from_secs(4), |_| summary("b", 1));
        let a_shared =
            shared.get_or_compute_with(a, t0 + Duration::from_secs(6), |_| summary("a", 2));
        assert_eq!(a_shared.prompt_count, 1);

        let mut per_entry = SummaryCache::new(Duration::from_secs(5), CacheExpiry::PerEntry);
        per_entry.get_or_compute_with(a, t0, |_| summary("a", 1));
        per_entry.get_or_compute_with(b, t0 + Duration::from_secs(4), |_| summary("b", 1));
        let a_fresh =
            per_entry.get_or_compute_with(a, t0 + Duration::from_secs(6), |_| summary("a", 2));
        assert_eq!(a_fresh.prompt_count, 2);
    }

    #[test]
    fn test_clear_forces_recompute() {
        let mut cache = SummaryCache::default();
        let t0 = Instant::now();
        let path = Path::new("/p/a.jsonl");
        cache.get_or_compute_with(path, t0, |_| summary("a", 1));
        cache.clear();
        let s = cache.get_or_compute_with(path, t0, |_| summary("a", 9));
        assert_eq!(s.prompt_count, 9);
        assert_eq!(cache.stats().entries, 1);
    }
}
