//! User configuration: subscription tier and display preferences,
//! persisted as JSON under the platform config directory.

use anyhow::{Context, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::cache::{CACHE_TTL_SECONDS, CacheExpiry};
use crate::tiers::{DEFAULT_TIER, TierLimits};

pub const APP_DIR_NAME: &str = "claude-usage-line";
const CONFIG_FILE_NAME: &str = "user_config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub subscription_tier: String,
    pub configured: bool,
    pub show_git_info: bool,
    /// Hours east of UTC for reset-time display; local time when unset
    pub timezone_offset: Option<i32>,
    pub cache_ttl_seconds: u64,
    pub cache_expiry: CacheExpiry,
}

impl Default for UserConfig {
    fn default() -> Self {
        UserConfig {
            subscription_tier: DEFAULT_TIER.to_string(),
            configured: false,
            show_git_info: true,
            timezone_offset: None,
            cache_ttl_seconds: CACHE_TTL_SECONDS,
            cache_expiry: CacheExpiry::default(),
        }
    }
}

/// `CLAUDE_USAGE_CONFIG`, else `<config dir>/claude-usage-line/user_config.json`
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("CLAUDE_USAGE_CONFIG") {
        if !custom.trim().is_empty() {
            return Some(PathBuf::from(custom));
        }
    }
    directories::BaseDirs::new().map(|b| b.config_dir().join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

impl UserConfig {
    pub fn load() -> Self {
        match default_config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Missing file gives defaults; a corrupt one is reported and ignored.
    pub fn load_from(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable config");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = default_config_path().context("no config directory available")?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create config dir {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(path, json).with_context(|| format!("write config {}", path.display()))
    }

    /// Validate and record the tier; the caller persists.
    pub fn set_tier(&mut self, name: &str) -> Result<&'static TierLimits> {
        let tier = TierLimits::lookup(name)?;
        self.subscription_tier = tier.name.to_string();
        self.configured = true;
        Ok(tier)
    }

    /// Effective tier: CLI value, then `CLAUDE_USAGE_TIER`, then the file.
    /// An unknown stored tier falls back to the default; an unknown explicit
    /// one is an error.
    pub fn resolve_tier(&self, cli_tier: Option<&str>) -> Result<&'static TierLimits> {
        if let Some(name) = cli_tier {
            return Ok(TierLimits::lookup(name)?);
        }
        if let Ok(name) = env::var("CLAUDE_USAGE_TIER") {
            if !name.trim().is_empty() {
                return Ok(TierLimits::lookup(&name)?);
            }
        }
        match TierLimits::lookup(&self.subscription_tier) {
            Ok(tier) => Ok(tier),
            Err(err) => {
                warn!(error = %err, "falling back to default tier");
                Ok(TierLimits::lookup(DEFAULT_TIER)?)
            }
        }
    }

    /// TTL: CLI value, then `CLAUDE_USAGE_CACHE_TTL`, then the file.
    pub fn cache_ttl(&self, cli_ttl: Option<u64>) -> Duration {
        let secs = cli_ttl
            .or_else(|| {
                env::var("CLAUDE_USAGE_CACHE_TTL")
                    .ok()
                    .and_then(|s| s.trim().parse::<u64>().ok())
            })
            .unwrap_or(self.cache_ttl_seconds);
        Duration::from_secs(secs)
    }

    pub fn display_offset(&self) -> Option<FixedOffset> {
        self.timezone_offset
            .and_then(|h| FixedOffset::east_opt(h.checked_mul(3600)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_config_default() {
        let config = UserConfig::default();
        assert_eq!(config.subscription_tier, "pro");
        assert!(config.show_git_info);
        assert_eq!(config.cache_ttl_seconds, 5);
        assert_eq!(config.cache_expiry, CacheExpiry::PerEntry);
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: UserConfig =
            serde_json::from_str(r#"{"subscription_tier":"max_5x","cache_expiry":"shared"}"#)
                .unwrap();
        assert_eq!(config.subscription_tier, "max_5x");
        assert_eq!(config.cache_expiry, CacheExpiry::Shared);
        assert!(config.show_git_info);
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("user_config.json");
        let mut config = UserConfig::default();
        config.set_tier("max20x").unwrap();
        config.timezone_offset = Some(9);
        config.save_to(&path).unwrap();

        let loaded = UserConfig::load_from(&path);
        assert_eq!(loaded.subscription_tier, "max_20x");
        assert!(loaded.configured);
        assert_eq!(loaded.display_offset(), FixedOffset::east_opt(9 * 3600));
    }

    #[test]
    fn test_corrupt_config_falls_back() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("user_config.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(UserConfig::load_from(&path), UserConfig::default());
    }

    #[test]
    fn test_set_tier_rejects_unknown() {
        let mut config = UserConfig::default();
        assert!(config.set_tier("gold").is_err());
        assert_eq!(config.subscription_tier, "pro");
    }

    #[test]
    #[serial]
    fn test_resolve_tier_precedence() {
        unsafe { env::remove_var("CLAUDE_USAGE_TIER") };
        let config = UserConfig {
            subscription_tier: "max_5x".to_string(),
            ..UserConfig::default()
        };
        assert_eq!(config.resolve_tier(None).unwrap().name, "max_5x");
        assert_eq!(config.resolve_tier(Some("free")).unwrap().name, "free");

        unsafe { env::set_var("CLAUDE_USAGE_TIER", "max_20x") };
        assert_eq!(config.resolve_tier(None).unwrap().name, "max_20x");
        unsafe { env::remove_var("CLAUDE_USAGE_TIER") };

        assert!(config.resolve_tier(Some("bogus")).is_err());

        let stale = UserConfig {
            subscription_tier: "legacy".to_string(),
            ..UserConfig::default()
        };
        assert_eq!(stale.resolve_tier(None).unwrap().name, "pro");
    }

    #[test]
    #[serial]
    fn test_cache_ttl_precedence() {
        unsafe { env::remove_var("CLAUDE_USAGE_CACHE_TTL") };
        let config = UserConfig::default();
        assert_eq!(config.cache_ttl(None), Duration::from_secs(5));
        assert_eq!(config.cache_ttl(Some(30)), Duration::from_secs(30));
        unsafe { env::set_var("CLAUDE_USAGE_CACHE_TTL", "12") };
        assert_eq!(config.cache_ttl(None), Duration::from_secs(12));
        unsafe { env::remove_var("CLAUDE_USAGE_CACHE_TTL") };
    }
}
