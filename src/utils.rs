use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::borrow::Cow;
use std::env;
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};

pub const WINDOW_DURATION_HOURS: i64 = 5;
pub const WINDOW_DURATION_SECONDS: i64 = WINDOW_DURATION_HOURS * 60 * 60;

/// Claude base directories that contain a `projects/` folder.
/// `override_env` is a comma-separated list (from `CLAUDE_CONFIG_DIR`).
pub fn claude_paths(override_env: Option<&str>) -> Vec<PathBuf> {
    let mut paths = vec![];
    if let Some(list) = override_env {
        let list = list.trim();
        if !list.is_empty() {
            for p in list.split(',') {
                let p = p.trim();
                if p.is_empty() {
                    continue;
                }
                let pb = PathBuf::from(p);
                if pb.join("projects").is_dir() {
                    paths.push(pb);
                }
            }
            if !paths.is_empty() {
                return paths;
            }
        }
    }
    let basedirs = directories::BaseDirs::new();
    let home = basedirs
        .as_ref()
        .map(|b| b.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~"));
    let xdg_config = basedirs
        .as_ref()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| home.join(".config"));
    // Prefer ~/.claude, then XDG config
    for base in [home.join(".claude"), xdg_config.join("claude")].into_iter() {
        if base.join("projects").is_dir() {
            paths.push(base);
        }
    }
    paths
}

/// The `projects/` roots under each Claude base directory.
pub fn projects_roots(bases: &[PathBuf]) -> Vec<PathBuf> {
    bases.iter().map(|b| b.join("projects")).collect()
}

/// Logs go to stderr; stdout carries only the status line.
/// `RUST_LOG` wins over the `debug` flag.
pub fn setup_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}

/// Hook payload from stdin; empty when stdin is a terminal.
pub fn read_stdin() -> anyhow::Result<Vec<u8>> {
    let mut stdin = std::io::stdin();
    let mut buf = Vec::new();
    if stdin.is_terminal() {
        return Ok(buf);
    }
    stdin.read_to_end(&mut buf).context("read hook payload from stdin")?;
    Ok(buf)
}

/// Parse a loosely formatted ISO-8601 timestamp into epoch seconds.
///
/// Fractional seconds are dropped, a trailing `Z` is read as UTC and explicit
/// offsets are honored. Strings without an offset are taken as UTC.
/// Anything unparsable yields `None`.
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() || s == "null" {
        return None;
    }
    let s = strip_fraction(s);
    let s = normalize_utc_designator(&s);

    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Some(dt.timestamp());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%d %H:%M:%S%z", "%Y-%m-%dT%H:%M%z"] {
        if let Ok(dt) = DateTime::parse_from_str(&s, fmt) {
            return Some(dt.timestamp());
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&s, fmt) {
            return Some(naive.and_utc().timestamp());
        }
    }
    NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp())
}

// "12:00:00.123+09:00" -> "12:00:00+09:00"
fn strip_fraction(s: &str) -> Cow<'_, str> {
    let Some(dot) = s.find('.') else {
        return Cow::Borrowed(s);
    };
    let rest = &s[dot + 1..];
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    Cow::Owned(format!("{}{}", &s[..dot], &rest[digits..]))
}

fn normalize_utc_designator(s: &str) -> Cow<'_, str> {
    match s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
        Some(head) => Cow::Owned(format!("{head}+00:00")),
        None => Cow::Borrowed(s),
    }
}

pub fn now_epoch() -> i64 {
    Utc::now().timestamp()
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn format_time_remaining(seconds: i64) -> String {
    if seconds <= 0 {
        return "resetting...".to_string();
    }
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{hours}h{minutes}m")
    } else {
        format!("{minutes}m")
    }
}

fn model_family_label(model: &str) -> Option<&'static str> {
    let m = model.to_lowercase();
    if m.contains("opus") {
        Some("Opus 4.5")
    } else if m.contains("haiku") {
        Some("Haiku 4.5")
    } else if m.contains("sonnet") {
        Some("Sonnet 4.5")
    } else {
        None
    }
}

/// Model label used when the hook payload carries none:
/// `CLAUDE_MODEL`, then the `model` key of `~/.claude/settings.json`.
pub fn fallback_model_name() -> String {
    if let Some(label) = env::var("CLAUDE_MODEL")
        .ok()
        .as_deref()
        .and_then(model_family_label)
    {
        return label.to_string();
    }
    let settings_model = directories::BaseDirs::new()
        .map(|b| b.home_dir().join(".claude").join("settings.json"))
        .and_then(|p| std::fs::read_to_string(p).ok())
        .and_then(|raw| serde_json::from_str::<serde_json::Value>(&raw).ok())
        .and_then(|v| v.get("model").and_then(|m| m.as_str()).map(str::to_owned));
    settings_model
        .as_deref()
        .and_then(model_family_label)
        .unwrap_or("Sonnet 4")
        .to_string()
}
