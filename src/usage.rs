//! # Usage Module
//!
//! Aggregates session transcripts under the Claude `projects/` roots into
//! windowed usage totals.
//!
//! ## Key Functions
//!
//! - `discover_session_logs`: lists `<root>/<project>/<session>.jsonl` files
//! - `UsageAggregator::compute`: applies the cycle and week windows and reduces
//!   per-session summaries into a `UsageSnapshot`

use chrono::{DateTime, Local, TimeZone};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::cache::SummaryCache;
use crate::models::{SessionSummary, UsageSnapshot};
use crate::utils::{now_epoch, round2};
use crate::window::WindowBounds;

const SESSION_LOG_EXTENSION: &str = "jsonl";

/// Session logs directly inside each project directory of `root`.
/// A missing root yields nothing.
pub fn discover_session_logs(root: &Path) -> Vec<PathBuf> {
    if !root.is_dir() {
        return Vec::new();
    }
    let mut logs: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(2)
        .max_depth(2)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext == SESSION_LOG_EXTENSION)
        })
        .collect();
    logs.sort();
    logs
}

/// Reduce session summaries into windowed totals. Sessions with zero
/// duration must already be filtered out.
pub fn aggregate_sessions(
    sessions: Vec<SessionSummary>,
    bounds: WindowBounds,
    generated_at: i64,
) -> UsageSnapshot {
    let cycle_prompt_count = sessions
        .iter()
        .filter(|s| s.start_time >= bounds.cycle_start)
        .map(|s| s.prompt_count)
        .sum();

    let week_sessions: Vec<SessionSummary> = sessions
        .into_iter()
        .filter(|s| s.start_time >= bounds.week_start)
        .collect();
    let week_prompt_count = week_sessions.iter().map(|s| s.prompt_count).sum();

    let mut sonnet_hours = 0.0f64;
    let mut opus_hours = 0.0f64;
    for s in &week_sessions {
        let (sonnet, opus) = s.apportioned_hours();
        sonnet_hours += sonnet;
        opus_hours += opus;
    }

    UsageSnapshot {
        cycle_prompt_count,
        cycle_start: bounds.cycle_start,
        week_sonnet_hours: round2(sonnet_hours),
        week_opus_hours: round2(opus_hours),
        week_prompt_count,
        week_start: bounds.week_start,
        generated_at,
        sessions: week_sessions,
    }
}

/// One-shot aggregation of a single root with a fresh cache.
pub fn compute_usage<Tz: TimeZone>(root: &Path, now: &DateTime<Tz>) -> UsageSnapshot {
    UsageAggregator::new(vec![root.to_path_buf()], SummaryCache::default()).compute(now)
}

pub struct UsageAggregator {
    roots: Vec<PathBuf>,
    cache: SummaryCache,
}

impl UsageAggregator {
    pub fn new(roots: Vec<PathBuf>, cache: SummaryCache) -> Self {
        UsageAggregator { roots, cache }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn cache(&self) -> &SummaryCache {
        &self.cache
    }

    /// Summaries of every session with a nonzero duration.
    ///
    /// A log reachable from several roots (a repeated or symlinked base
    /// directory) is summarized once.
    pub fn sessions(&mut self) -> Vec<SessionSummary> {
        let mut sessions = Vec::new();
        let mut seen: HashSet<PathBuf> = HashSet::new();
        for root in &self.roots {
            for path in discover_session_logs(root) {
                let canonical = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
                if !seen.insert(canonical) {
                    debug!(path = %path.display(), "skipping duplicate session log");
                    continue;
                }
                let summary = self.cache.get_or_compute(&path);
                if summary.duration_hours > 0.0 {
                    sessions.push(summary);
                }
            }
        }
        sessions
    }

    /// Windows are evaluated once against `now`, in `now`'s time zone.
    pub fn compute<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> UsageSnapshot {
        let bounds = WindowBounds::at(now);
        let sessions = self.sessions();
        debug!(
            sessions = sessions.len(),
            cycle_start = bounds.cycle_start,
            week_start = bounds.week_start,
            "aggregating session logs"
        );
        aggregate_sessions(sessions, bounds, now_epoch())
    }

    pub fn compute_now(&mut self) -> UsageSnapshot {
        self.compute(&Local::now())
    }
}
