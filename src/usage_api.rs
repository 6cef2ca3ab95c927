//! Authoritative usage limits from the Claude OAuth usage endpoint.

use chrono::{DateTime, Utc};
use directories::BaseDirs;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
#[cfg(target_os = "macos")]
use std::process::Command;
use std::time::Duration;
use tracing::debug;

/// Sent when no version is configured. The usage endpoint only needs a
/// plausible Claude Code agent string.
const DEFAULT_CLI_VERSION: &str = "2.0.31";
const USAGE_ENDPOINT: &str = "https://api.anthropic.com/api/oauth/usage";
const ANTHROPIC_BETA: &str = "oauth-2025-04-20";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const KEYCHAIN_SERVICE: &str = "Claude Code-credentials";

static USER_AGENT: Lazy<String> = Lazy::new(resolve_user_agent);
static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+\.\d+\.\d+(?:-[A-Za-z0-9.]+)?)").unwrap());

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// `CLAUDE_USAGE_USER_AGENT` verbatim, else `claude-code/<CLAUDE_CODE_VERSION>`,
/// else a fixed default. Never spawns a process.
fn resolve_user_agent() -> String {
    if let Some(explicit) = non_empty_env("CLAUDE_USAGE_USER_AGENT") {
        return explicit;
    }
    let version = non_empty_env("CLAUDE_CODE_VERSION")
        .and_then(|raw| extract_version(&raw))
        .unwrap_or_else(|| DEFAULT_CLI_VERSION.to_string());
    format!("claude-code/{version}")
}

fn extract_version(text: &str) -> Option<String> {
    VERSION_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// `CLAUDE_USAGE_FETCH_API` set to a falsy value turns the API off.
pub fn fetch_enabled() -> bool {
    match env::var("CLAUDE_USAGE_FETCH_API") {
        Ok(val) => !matches!(
            val.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        Err(_) => true,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageLimit {
    /// Percent of the limit consumed
    pub utilization: Option<f64>,
    pub resets_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub five_hour: UsageLimit,
    pub seven_day: UsageLimit,
}

#[derive(Debug, Deserialize)]
struct UsageLimitDto {
    utilization: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    resets_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct UsageResponseDto {
    #[serde(default)]
    five_hour: Option<UsageLimitDto>,
    #[serde(default)]
    seven_day: Option<UsageLimitDto>,
}

impl From<UsageLimitDto> for UsageLimit {
    fn from(value: UsageLimitDto) -> Self {
        UsageLimit {
            utilization: value.utilization,
            resets_at: value.resets_at,
        }
    }
}

impl From<UsageResponseDto> for UsageSummary {
    fn from(dto: UsageResponseDto) -> Self {
        UsageSummary {
            five_hour: dto.five_hour.map(UsageLimit::from).unwrap_or_default(),
            seven_day: dto.seven_day.map(UsageLimit::from).unwrap_or_default(),
        }
    }
}

pub fn parse_usage_response(body: &str) -> Option<UsageSummary> {
    serde_json::from_str::<UsageResponseDto>(body)
        .ok()
        .map(UsageSummary::from)
}

/// Fetch the current limits. Any failure, including a missing token,
/// yields `None` so the caller can fall back to local estimates.
pub fn get_usage_summary(claude_paths: &[PathBuf]) -> Option<UsageSummary> {
    if !fetch_enabled() {
        return None;
    }
    let Some(token) = find_oauth_token(claude_paths) else {
        debug!("no OAuth token found, skipping usage API");
        return None;
    };
    fetch_usage_summary(&token)
}

fn fetch_usage_summary(token: &str) -> Option<UsageSummary> {
    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(REQUEST_TIMEOUT))
        .build()
        .into();

    let mut response = match agent
        .get(USAGE_ENDPOINT)
        .header("Authorization", &format!("Bearer {token}"))
        .header("User-Agent", USER_AGENT.as_str())
        .header("Accept", "application/json")
        .header("anthropic-beta", ANTHROPIC_BETA)
        .call()
    {
        Ok(response) => response,
        Err(err) => {
            debug!(error = %err, "usage API request failed");
            return None;
        }
    };

    if response.status().as_u16() != 200 {
        debug!(status = response.status().as_u16(), "usage API returned non-200");
        return None;
    }

    match response.body_mut().read_json::<UsageResponseDto>() {
        Ok(dto) => Some(UsageSummary::from(dto)),
        Err(err) => {
            debug!(error = %err, "usage API response did not parse");
            None
        }
    }
}

/// Pull `claudeAiOauth.accessToken` out of a credentials JSON document.
pub fn token_from_credentials(raw: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(raw).ok()?;
    let access = json
        .get("claudeAiOauth")
        .and_then(|v| v.get("accessToken"))
        .and_then(|v| v.as_str())?
        .trim();
    if access.is_empty() {
        None
    } else {
        Some(access.to_string())
    }
}

pub fn find_oauth_token(claude_paths: &[PathBuf]) -> Option<String> {
    for key in ["CLAUDE_CODE_OAUTH_TOKEN", "ANTHROPIC_AUTH_TOKEN"] {
        if let Some(token) = non_empty_env(key) {
            return Some(token);
        }
    }

    // macOS keeps credentials in the keychain rather than on disk
    #[cfg(target_os = "macos")]
    {
        if let Some(token) = read_from_macos_keychain() {
            return Some(token);
        }
    }

    let mut candidates: Vec<PathBuf> = claude_paths
        .iter()
        .map(|base| base.join(".credentials.json"))
        .collect();
    if let Some(base_dirs) = BaseDirs::new() {
        candidates.push(base_dirs.home_dir().join(".claude").join(".credentials.json"));
    }

    candidates
        .iter()
        .filter_map(|path| fs::read_to_string(path).ok())
        .find_map(|raw| token_from_credentials(&raw))
}

/// Keychain service name; a custom config dir gets an 8-hex-digit
/// SHA-256 suffix of its path.
pub fn keychain_service_name(config_dir: Option<&str>) -> String {
    use sha2::{Digest, Sha256};

    match config_dir.map(str::trim).filter(|d| !d.is_empty()) {
        Some(dir) => {
            let hash = Sha256::digest(dir.as_bytes());
            let suffix: String = format!("{hash:x}").chars().take(8).collect();
            format!("{KEYCHAIN_SERVICE}-{suffix}")
        }
        None => KEYCHAIN_SERVICE.to_string(),
    }
}

#[cfg(target_os = "macos")]
fn read_from_macos_keychain() -> Option<String> {
    let username = env::var("USER").ok()?;
    let config_dir = env::var("CLAUDE_CONFIG_DIR").ok();
    let service_name = keychain_service_name(config_dir.as_deref());

    let output = Command::new("security")
        .args([
            "find-generic-password",
            "-a",
            &username,
            "-s",
            &service_name,
            "-w",
        ])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    token_from_credentials(String::from_utf8_lossy(&output.stdout).trim())
}

fn deserialize_optional_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt {
        Some(s) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
