//! Persists the aggregated usage to `usage_data.json` in the legacy layout
//! read by older status line scripts.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::models::UsageSnapshot;
use crate::utils::round2;

pub const SNAPSHOT_FILE_NAME: &str = "usage_data.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    /// Milliseconds since the epoch
    pub start_time: i64,
    pub total_prompts: u64,
    /// Legacy estimate: prompts / 10
    pub total_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekRecord {
    pub start_time: i64,
    pub sonnet4_hours: f64,
    pub opus4_hours: f64,
    pub total_sessions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub current_5h_cycle: CycleRecord,
    pub current_week: WeekRecord,
    pub last_updated: i64,
}

impl From<&UsageSnapshot> for SnapshotFile {
    fn from(s: &UsageSnapshot) -> Self {
        SnapshotFile {
            current_5h_cycle: CycleRecord {
                start_time: s.cycle_start * 1000,
                total_prompts: s.cycle_prompt_count,
                total_hours: round2(s.cycle_prompt_count as f64 / 10.0),
            },
            current_week: WeekRecord {
                start_time: s.week_start * 1000,
                sonnet4_hours: s.week_sonnet_hours,
                opus4_hours: s.week_opus_hours,
                total_sessions: s.sessions.len(),
            },
            last_updated: s.generated_at * 1000,
        }
    }
}

/// `CLAUDE_USAGE_SNAPSHOT_PATH`, else `<data dir>/claude-usage-line/usage_data.json`
pub fn default_snapshot_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("CLAUDE_USAGE_SNAPSHOT_PATH") {
        if !custom.trim().is_empty() {
            return Some(PathBuf::from(custom));
        }
    }
    directories::BaseDirs::new().map(|b| {
        b.data_dir()
            .join(crate::config::APP_DIR_NAME)
            .join(SNAPSHOT_FILE_NAME)
    })
}

/// Overwrite `path` with the snapshot. Not atomic; the last writer wins.
pub fn write_snapshot(path: &Path, snapshot: &UsageSnapshot) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create snapshot dir {}", parent.display()))?;
        }
    }
    let data = serde_json::to_string_pretty(&SnapshotFile::from(snapshot))
        .context("serialize usage snapshot")?;
    fs::write(path, data).with_context(|| format!("write snapshot {}", path.display()))?;
    Ok(())
}

/// Write the snapshot, downgrading failure to a warning.
pub fn persist_snapshot(path: &Path, snapshot: &UsageSnapshot) -> bool {
    match write_snapshot(path, snapshot) {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %format!("{err:#}"), "failed to persist usage snapshot");
            false
        }
    }
}

pub fn read_snapshot(path: &Path) -> Result<SnapshotFile> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("read snapshot {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse snapshot {}", path.display()))
}
