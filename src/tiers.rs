//! Subscription tier limits used to turn raw usage into percentages.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TierError {
    #[error("unknown subscription tier `{name}` (expected one of: {})", TIER_NAMES.join(", "))]
    Unknown { name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TierLimits {
    pub name: &'static str,
    /// Prompts per 5-hour cycle
    pub cycle_min: u64,
    pub cycle_max: u64,
    /// Sonnet hours per week
    pub week_sonnet_min: f64,
    pub week_sonnet_max: f64,
    /// Opus hours per week, for tiers that include Opus
    pub week_opus_min: Option<f64>,
    pub week_opus_max: Option<f64>,
}

pub const DEFAULT_TIER: &str = "pro";

pub const TIER_NAMES: [&str; 4] = ["free", "pro", "max_5x", "max_20x"];

static TIERS: [TierLimits; 4] = [
    TierLimits {
        name: "free",
        cycle_min: 10,
        cycle_max: 40,
        week_sonnet_min: 40.0,
        week_sonnet_max: 80.0,
        week_opus_min: None,
        week_opus_max: None,
    },
    TierLimits {
        name: "pro",
        cycle_min: 10,
        cycle_max: 40,
        week_sonnet_min: 40.0,
        week_sonnet_max: 80.0,
        week_opus_min: None,
        week_opus_max: None,
    },
    TierLimits {
        name: "max_5x",
        cycle_min: 50,
        cycle_max: 200,
        week_sonnet_min: 140.0,
        week_sonnet_max: 280.0,
        week_opus_min: Some(15.0),
        week_opus_max: Some(35.0),
    },
    TierLimits {
        name: "max_20x",
        cycle_min: 200,
        cycle_max: 800,
        week_sonnet_min: 240.0,
        week_sonnet_max: 480.0,
        week_opus_min: Some(24.0),
        week_opus_max: Some(40.0),
    },
];

fn canonical_name(name: &str) -> Option<&'static str> {
    match name.trim().to_lowercase().as_str() {
        "free" => Some("free"),
        "pro" => Some("pro"),
        "max_5x" | "max5x" | "max-5x" | "5x" => Some("max_5x"),
        "max_20x" | "max20x" | "max-20x" | "20x" => Some("max_20x"),
        _ => None,
    }
}

fn percent(current: f64, max: f64) -> f64 {
    if max > 0.0 { current * 100.0 / max } else { 0.0 }
}

impl TierLimits {
    pub fn lookup(name: &str) -> Result<&'static TierLimits, TierError> {
        canonical_name(name)
            .and_then(|canon| TIERS.iter().find(|t| t.name == canon))
            .ok_or_else(|| TierError::Unknown {
                name: name.to_string(),
            })
    }

    pub fn all() -> &'static [TierLimits] {
        &TIERS
    }

    pub fn cycle_percent(&self, prompts: u64) -> f64 {
        percent(prompts as f64, self.cycle_max as f64)
    }

    pub fn week_sonnet_percent(&self, hours: f64) -> f64 {
        percent(hours, self.week_sonnet_max)
    }

    pub fn week_opus_percent(&self, hours: f64) -> Option<f64> {
        self.week_opus_max.map(|max| percent(hours, max))
    }
}
