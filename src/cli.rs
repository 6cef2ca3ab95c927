use std::path::PathBuf;

use crate::cache::CacheExpiry;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheExpiryArg {
    /// Each cached session expires on its own clock
    PerEntry,
    /// Every cached session expires together after the latest write
    Shared,
}

impl From<CacheExpiryArg> for CacheExpiry {
    fn from(arg: CacheExpiryArg) -> Self {
        match arg {
            CacheExpiryArg::PerEntry => CacheExpiry::PerEntry,
            CacheExpiryArg::Shared => CacheExpiry::Shared,
        }
    }
}

#[derive(clap::Parser, Debug)]
#[command(name = "claude-usage-line", version, about = "Claude Code usage status line")]
pub struct Args {
    /// Force Claude data path(s), comma-separated. Defaults to ~/.claude and ~/.config/claude
    #[arg(long, env = "CLAUDE_CONFIG_DIR")]
    pub claude_config_dir: Option<String>,

    /// Subscription tier for this run: free|pro|max_5x|max_20x
    #[arg(long)]
    pub tier: Option<String>,

    /// Save the subscription tier to the user config and exit
    #[arg(long, value_name = "TIER")]
    pub set_tier: Option<String>,

    /// Print the aggregated usage snapshot as JSON
    #[arg(long, conflicts_with = "stats")]
    pub json: bool,

    /// Print a plain-text usage report
    #[arg(long)]
    pub stats: bool,

    /// Where to write usage_data.json
    #[arg(long)]
    pub snapshot_path: Option<PathBuf>,

    /// Session cache TTL in seconds
    #[arg(long)]
    pub cache_ttl: Option<u64>,

    /// Cache expiry mode: per-entry|shared
    #[arg(long, value_enum)]
    pub cache_expiry: Option<CacheExpiryArg>,

    /// Skip the remote usage API and show local estimates
    #[arg(long)]
    pub no_api: bool,

    /// Hide the git segment
    #[arg(long)]
    pub no_git: bool,

    /// Debug mode: verbose logging to stderr
    #[arg(long, env = "CLAUDE_USAGE_DEBUG")]
    pub debug: bool,
}

impl Args {
    pub fn parse() -> Self {
        <Args as clap::Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "claude-usage-line",
            "--tier",
            "max_5x",
            "--cache-ttl",
            "30",
            "--cache-expiry",
            "shared",
            "--no-api",
        ])
        .unwrap();
        assert_eq!(args.tier.as_deref(), Some("max_5x"));
        assert_eq!(args.cache_ttl, Some(30));
        assert_eq!(args.cache_expiry.map(CacheExpiry::from), Some(CacheExpiry::Shared));
        assert!(args.no_api);
        assert!(!args.no_git);
    }

    #[test]
    fn test_json_conflicts_with_stats() {
        assert!(Args::try_parse_from(["claude-usage-line", "--json", "--stats"]).is_err());
    }
}
