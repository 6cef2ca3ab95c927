//! # Display Module
//!
//! Renders the one-line status (`📁 project | 🌿 git | 🤖 model | ...`) and
//! the plain-text `--stats` report. Colors are 24-bit foreground escapes
//! applied per segment.

use chrono::{DateTime, FixedOffset, Local, Utc};
use std::env;
use std::fmt::Write as _;

#[cfg(feature = "colors")]
use owo_colors::OwoColorize;

// Provide a no-op color shim when "colors" feature is disabled
#[cfg(not(feature = "colors"))]
pub mod color_shim {
    use std::fmt::{self, Display, Formatter};

    #[derive(Clone)]
    pub struct Plain(pub String);

    impl Display for Plain {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    pub trait ColorizeShim {
        fn as_str(&self) -> &str;

        fn truecolor(&self, _r: u8, _g: u8, _b: u8) -> Plain {
            Plain(self.as_str().to_string())
        }
    }

    impl ColorizeShim for &str {
        fn as_str(&self) -> &str {
            self
        }
    }
    impl ColorizeShim for String {
        fn as_str(&self) -> &str {
            self.as_str()
        }
    }
}

#[cfg(not(feature = "colors"))]
use color_shim::ColorizeShim as OwoColorize;

use crate::models::{GitInfo, SessionSize, SizeLevel, UsageSnapshot};
use crate::tiers::TierLimits;
use crate::usage_api::{UsageLimit, UsageSummary};

pub type Rgb = (u8, u8, u8);

pub const GREEN: Rgb = (0, 255, 0);
pub const YELLOW: Rgb = (255, 255, 0);
pub const BRIGHT_RED: Rgb = (255, 150, 150);
pub const CONTEXT_RED: Rgb = (255, 100, 100);
pub const CONTEXT_BLUE: Rgb = (100, 200, 255);
pub const GIT_DIRTY: Rgb = (255, 215, 0);
pub const GIT_AHEAD: Rgb = (100, 150, 255);
pub const GIT_BEHIND: Rgb = (255, 165, 0);

const SEPARATOR: &str = " | ";
const MAX_BRANCH_CHARS: usize = 20;
const RESET_FORMAT: &str = "%m/%d %H:%M";

/// Usage bands for quota percentages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageLevel {
    Low,
    Moderate,
    High,
}

impl UsageLevel {
    /// Below 50 is low, below 75 moderate, 75 and up high.
    pub fn from_percent(pct: f64) -> Self {
        if pct < 50.0 {
            UsageLevel::Low
        } else if pct < 75.0 {
            UsageLevel::Moderate
        } else {
            UsageLevel::High
        }
    }

    pub fn rgb(self) -> Rgb {
        match self {
            UsageLevel::Low => GREEN,
            UsageLevel::Moderate => YELLOW,
            UsageLevel::High => BRIGHT_RED,
        }
    }
}

pub fn context_rgb(pct: f64) -> Rgb {
    if pct >= 80.0 {
        CONTEXT_RED
    } else if pct >= 50.0 {
        YELLOW
    } else {
        CONTEXT_BLUE
    }
}

pub fn size_rgb(level: SizeLevel) -> Rgb {
    match level {
        SizeLevel::Normal => GREEN,
        SizeLevel::Warning => YELLOW,
        SizeLevel::Critical => CONTEXT_RED,
    }
}

fn size_indicator(level: SizeLevel) -> &'static str {
    match level {
        SizeLevel::Normal => "",
        SizeLevel::Warning => "\u{26A0}\u{FE0F}",
        SizeLevel::Critical => "\u{1F534}",
    }
}

/// Colors are on unless `NO_COLOR` is set or the build lacks `colors`.
pub fn colors_enabled() -> bool {
    cfg!(feature = "colors") && env::var_os("NO_COLOR").is_none()
}

#[derive(Debug, Clone, Default)]
pub struct DisplayOptions {
    pub color: bool,
    /// Zone for reset times; local time when `None`
    pub offset: Option<FixedOffset>,
}

impl DisplayOptions {
    pub fn from_env(offset: Option<FixedOffset>) -> Self {
        DisplayOptions {
            color: colors_enabled(),
            offset,
        }
    }
}

pub fn colorize_rgb(text: &str, (r, g, b): Rgb, opts: &DisplayOptions) -> String {
    if opts.color {
        format!("{}", text.truecolor(r, g, b))
    } else {
        text.to_string()
    }
}

pub fn format_reset(at: DateTime<Utc>, offset: Option<FixedOffset>) -> String {
    match offset {
        Some(off) => at.with_timezone(&off).format(RESET_FORMAT).to_string(),
        None => at.with_timezone(&Local).format(RESET_FORMAT).to_string(),
    }
}

fn format_reset_epoch(secs: i64, offset: Option<FixedOffset>) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|at| format_reset(at, offset))
        .unwrap_or_else(|| "?".to_string())
}

pub fn truncate_branch(branch: &str) -> String {
    if branch.chars().count() <= MAX_BRANCH_CHARS {
        branch.to_string()
    } else {
        let head: String = branch.chars().take(MAX_BRANCH_CHARS).collect();
        format!("{head}...")
    }
}

/// `🌿 branch ↑a ↓b *`, colored by the most pressing state.
pub fn format_git_segment(info: &GitInfo, opts: &DisplayOptions) -> Option<String> {
    let label = match (&info.branch, &info.short_commit) {
        (Some(branch), _) => truncate_branch(branch),
        (None, Some(commit)) => format!("({commit})"),
        (None, None) => return None,
    };
    let ahead = info.ahead.unwrap_or(0);
    let behind = info.behind.unwrap_or(0);
    let dirty = info.is_clean == Some(false);

    let mut text = format!("🌿 {label}");
    if ahead > 0 {
        let _ = write!(text, " ↑{ahead}");
    }
    if behind > 0 {
        let _ = write!(text, " ↓{behind}");
    }
    if dirty {
        text.push_str(" *");
    }

    let rgb = if dirty {
        GIT_DIRTY
    } else if ahead > 0 {
        GIT_AHEAD
    } else if behind > 0 {
        GIT_BEHIND
    } else {
        GREEN
    };
    Some(colorize_rgb(&text, rgb, opts))
}

pub fn format_context_segment(pct: f64, opts: &DisplayOptions) -> String {
    colorize_rgb(&format!("📊 {pct:.0}%"), context_rgb(pct), opts)
}

/// `📄 <size>` for the transcript, with a marker once it grows large.
pub fn format_session_size_segment(size: SessionSize, opts: &DisplayOptions) -> String {
    let level = size.level();
    format!(
        "📄 {}{}",
        colorize_rgb(&size.format_display(), size_rgb(level), opts),
        size_indicator(level)
    )
}

fn api_limit_segment(icon: &str, limit: &UsageLimit, opts: &DisplayOptions) -> String {
    let pct = limit.utilization.unwrap_or(0.0);
    let reset = limit
        .resets_at
        .map(|at| format_reset(at, opts.offset))
        .unwrap_or_else(|| "?".to_string());
    colorize_rgb(
        &format!("{icon} {pct:.0}% @{reset}"),
        UsageLevel::from_percent(pct).rgb(),
        opts,
    )
}

/// `⚡` and `📅` segments from the usage API.
pub fn format_api_usage(summary: &UsageSummary, opts: &DisplayOptions) -> Vec<String> {
    vec![
        api_limit_segment("⚡", &summary.five_hour, opts),
        api_limit_segment("📅", &summary.seven_day, opts),
    ]
}

/// Estimated segments from local logs measured against the tier limits.
pub fn format_local_usage(
    snapshot: &UsageSnapshot,
    tier: &TierLimits,
    opts: &DisplayOptions,
) -> Vec<String> {
    let mut parts = Vec::with_capacity(3);

    let cycle_pct = tier.cycle_percent(snapshot.cycle_prompt_count);
    let reset = format_reset_epoch(snapshot.cycle_end(), opts.offset);
    parts.push(colorize_rgb(
        &format!("⚡ {cycle_pct:.0}% @{reset} (est)"),
        UsageLevel::from_percent(cycle_pct).rgb(),
        opts,
    ));

    let week_pct = tier.week_sonnet_percent(snapshot.week_sonnet_hours);
    parts.push(colorize_rgb(
        &format!("📅 {week_pct:.0}% (est)"),
        UsageLevel::from_percent(week_pct).rgb(),
        opts,
    ));

    if let Some(opus_pct) = tier.week_opus_percent(snapshot.week_opus_hours) {
        parts.push(colorize_rgb(
            &format!("O {opus_pct:.0}%"),
            UsageLevel::from_percent(opus_pct).rgb(),
            opts,
        ));
    }
    parts
}

pub enum UsageView<'a> {
    Api(&'a UsageSummary),
    Local {
        snapshot: &'a UsageSnapshot,
        tier: &'a TierLimits,
    },
}

pub struct StatusLine<'a> {
    pub project: String,
    pub git: Option<&'a GitInfo>,
    pub model: String,
    pub context_percent: Option<f64>,
    pub usage: UsageView<'a>,
    pub session_size: Option<SessionSize>,
}

pub fn build_status_line(line: &StatusLine<'_>, opts: &DisplayOptions) -> String {
    let mut parts = vec![format!("📁 {}", line.project)];
    if let Some(seg) = line.git.and_then(|g| format_git_segment(g, opts)) {
        parts.push(seg);
    }
    parts.push(format!("🤖 {}", line.model));
    if let Some(pct) = line.context_percent {
        parts.push(format_context_segment(pct, opts));
    }
    match &line.usage {
        UsageView::Api(summary) => parts.extend(format_api_usage(summary, opts)),
        UsageView::Local { snapshot, tier } => {
            parts.extend(format_local_usage(snapshot, tier, opts))
        }
    }
    if let Some(size) = line.session_size {
        parts.push(format_session_size_segment(size, opts));
    }
    parts.join(SEPARATOR)
}

/// Plain-text report printed by `--stats`.
pub fn format_stats(snapshot: &UsageSnapshot, tier: &TierLimits) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Claude Code Usage Statistics");
    let _ = writeln!(out, "{}", "=".repeat(40));
    let _ = writeln!(out, "Tier: {}", tier.name);
    let _ = writeln!(
        out,
        "5-hour cycle: {} prompts ({:.0}% of {})",
        snapshot.cycle_prompt_count,
        tier.cycle_percent(snapshot.cycle_prompt_count),
        tier.cycle_max
    );
    let _ = writeln!(
        out,
        "Cycle resets in: {}",
        crate::utils::format_time_remaining(snapshot.cycle_end() - snapshot.generated_at)
    );
    let _ = writeln!(out, "Weekly Sonnet: {:.1} hours", snapshot.week_sonnet_hours);
    let _ = writeln!(out, "Weekly Opus: {:.1} hours", snapshot.week_opus_hours);
    let _ = writeln!(out, "Total prompts this week: {}", snapshot.week_prompt_count);
    let _ = write!(out, "Sessions analyzed: {}", snapshot.sessions.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn plain() -> DisplayOptions {
        DisplayOptions {
            color: false,
            offset: FixedOffset::east_opt(9 * 3600),
        }
    }

    #[test]
    fn test_usage_level_boundaries() {
        assert_eq!(UsageLevel::from_percent(49.9), UsageLevel::Low);
        assert_eq!(UsageLevel::from_percent(50.0), UsageLevel::Moderate);
        assert_eq!(UsageLevel::from_percent(74.9), UsageLevel::Moderate);
        assert_eq!(UsageLevel::from_percent(75.0), UsageLevel::High);
        assert_eq!(UsageLevel::High.rgb(), (255, 150, 150));
    }

    #[test]
    fn test_context_colors() {
        assert_eq!(context_rgb(10.0), CONTEXT_BLUE);
        assert_eq!(context_rgb(50.0), YELLOW);
        assert_eq!(context_rgb(80.0), CONTEXT_RED);
    }

    #[test]
    fn test_truncate_branch() {
        assert_eq!(truncate_branch("main"), "main");
        assert_eq!(
            truncate_branch("feature/very-long-branch-name"),
            "feature/very-long-br..."
        );
    }

    #[test]
    fn test_git_segment_indicators() {
        let info = GitInfo {
            branch: Some("main".to_string()),
            short_commit: Some("abc1234".to_string()),
            is_clean: Some(false),
            ahead: Some(2),
            behind: Some(1),
        };
        assert_eq!(
            format_git_segment(&info, &plain()).unwrap(),
            "🌿 main ↑2 ↓1 *"
        );

        let detached = GitInfo {
            short_commit: Some("abc1234".to_string()),
            is_clean: Some(true),
            ..GitInfo::default()
        };
        assert_eq!(format_git_segment(&detached, &plain()).unwrap(), "🌿 (abc1234)");
        assert!(format_git_segment(&GitInfo::default(), &plain()).is_none());
    }

    #[cfg(feature = "colors")]
    #[test]
    fn test_colorize_emits_truecolor_escape() {
        let opts = DisplayOptions {
            color: true,
            offset: None,
        };
        assert_eq!(colorize_rgb("x", GIT_DIRTY, &opts), "\u{1b}[38;2;255;215;0mx\u{1b}[39m");
    }

    #[test]
    fn test_session_size_segment() {
        const MB: u64 = 1024 * 1024;
        assert_eq!(
            format_session_size_segment(SessionSize::new(300 * 1024), &plain()),
            "📄 300KB"
        );
        assert_eq!(
            format_session_size_segment(SessionSize::new(8 * MB), &plain()),
            "📄 8.0MB⚠️"
        );
        assert_eq!(
            format_session_size_segment(SessionSize::new(20 * MB), &plain()),
            "📄 20.0MB🔴"
        );
        assert_eq!(size_rgb(SessionSize::new(MB).level()), GREEN);
        assert_eq!(size_rgb(SessionSize::new(5 * MB).level()), YELLOW);
        assert_eq!(size_rgb(SessionSize::new(15 * MB).level()), CONTEXT_RED);
    }

    #[cfg(feature = "colors")]
    #[test]
    fn test_session_size_colors_only_the_size() {
        let opts = DisplayOptions {
            color: true,
            offset: None,
        };
        assert_eq!(
            format_session_size_segment(SessionSize::new(20 * 1024 * 1024), &opts),
            "📄 \u{1b}[38;2;255;100;100m20.0MB\u{1b}[39m🔴"
        );
    }

    #[test]
    fn test_format_reset_uses_offset() {
        let at = Utc.with_ymd_and_hms(2025, 1, 6, 15, 30, 0).unwrap();
        assert_eq!(format_reset(at, FixedOffset::east_opt(9 * 3600)), "01/07 00:30");
        assert_eq!(format_reset(at, FixedOffset::east_opt(0)), "01/06 15:30");
    }

    #[test]
    fn test_api_segments() {
        let summary = UsageSummary {
            five_hour: UsageLimit {
                utilization: Some(42.4),
                resets_at: Some(Utc.with_ymd_and_hms(2025, 1, 6, 15, 0, 0).unwrap()),
            },
            seven_day: UsageLimit::default(),
        };
        assert_eq!(
            format_api_usage(&summary, &plain()),
            vec!["⚡ 42% @01/07 00:00".to_string(), "📅 0% @?".to_string()]
        );
    }
}
