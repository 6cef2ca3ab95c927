use serde::Serialize;

use crate::models::session::SessionSummary;

/// Aggregated usage for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSnapshot {
    pub cycle_prompt_count: u64,
    pub cycle_start: i64,
    pub week_sonnet_hours: f64,
    pub week_opus_hours: f64,
    pub week_prompt_count: u64,
    pub week_start: i64,
    pub generated_at: i64,
    /// Week-filtered sessions, kept for inspection
    pub sessions: Vec<SessionSummary>,
}

impl UsageSnapshot {
    /// End of the current cycle window (epoch seconds)
    pub fn cycle_end(&self) -> i64 {
        self.cycle_start + crate::utils::WINDOW_DURATION_SECONDS
    }
}
