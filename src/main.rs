use anyhow::{Context, Result};
use tracing::{debug, warn};

use claude_usage_line::cache::{CacheExpiry, SummaryCache};
use claude_usage_line::cli::Args;
use claude_usage_line::config::UserConfig;
use claude_usage_line::display::{
    DisplayOptions, StatusLine, UsageView, build_status_line, format_stats,
};
use claude_usage_line::models::{GitInfo, HookJson};
use claude_usage_line::snapshot::{default_snapshot_path, persist_snapshot};
use claude_usage_line::usage::UsageAggregator;
use claude_usage_line::usage_api::get_usage_summary;
use claude_usage_line::utils::{
    claude_paths, fallback_model_name, projects_roots, read_stdin, setup_tracing,
};

fn main() -> Result<()> {
    let args = Args::parse();
    setup_tracing(args.debug);

    let mut config = UserConfig::load();
    if let Some(name) = args.set_tier.as_deref() {
        let tier = config.set_tier(name)?;
        let path = config.save()?;
        println!("Subscription tier set to {} ({})", tier.name, path.display());
        return Ok(());
    }
    let tier = config.resolve_tier(args.tier.as_deref())?;

    // Only the status line consumes the hook payload
    let stdin = if args.json || args.stats {
        Vec::new()
    } else {
        read_stdin().unwrap_or_else(|err| {
            debug!(error = %format!("{err:#}"), "no hook payload");
            Vec::new()
        })
    };

    let bases = claude_paths(args.claude_config_dir.as_deref());
    let expiry: CacheExpiry = args
        .cache_expiry
        .map(CacheExpiry::from)
        .unwrap_or(config.cache_expiry);
    let cache = SummaryCache::new(config.cache_ttl(args.cache_ttl), expiry);
    let mut aggregator = UsageAggregator::new(projects_roots(&bases), cache);
    let snapshot = aggregator.compute_now();
    debug!(
        roots = ?aggregator.roots(),
        sessions = snapshot.sessions.len(),
        cycle_prompts = snapshot.cycle_prompt_count,
        week_sonnet_hours = snapshot.week_sonnet_hours,
        week_opus_hours = snapshot.week_opus_hours,
        cache = ?aggregator.cache().stats(),
        "usage aggregated"
    );

    match args.snapshot_path.clone().or_else(default_snapshot_path) {
        Some(path) => {
            persist_snapshot(&path, &snapshot);
        }
        None => warn!("no data directory available, usage snapshot not written"),
    }

    if args.json {
        let json = serde_json::to_string_pretty(&snapshot).context("serialize usage snapshot")?;
        println!("{json}");
        return Ok(());
    }
    if args.stats {
        println!("{}", format_stats(&snapshot, tier));
        return Ok(());
    }

    let hook = HookJson::from_slice(&stdin);
    let git_info = if config.show_git_info && !args.no_git {
        read_git(&hook)
    } else {
        None
    };
    let api_summary = if args.no_api {
        None
    } else {
        get_usage_summary(&bases)
    };
    debug!(
        session = hook.session_id.as_deref().unwrap_or("-"),
        api = api_summary.is_some(),
        tier = tier.name,
        "rendering status line"
    );

    let line = StatusLine {
        project: hook.project_name(),
        git: git_info.as_ref(),
        model: hook
            .model_display_name()
            .map(str::to_owned)
            .unwrap_or_else(fallback_model_name),
        context_percent: hook.context_percent(),
        usage: match api_summary.as_ref() {
            Some(summary) => UsageView::Api(summary),
            None => UsageView::Local {
                snapshot: &snapshot,
                tier,
            },
        },
        session_size: hook.session_size(),
    };
    let opts = DisplayOptions::from_env(config.display_offset());
    println!("{}", build_status_line(&line, &opts));
    Ok(())
}

#[cfg(feature = "git")]
fn read_git(hook: &HookJson) -> Option<GitInfo> {
    let dir = hook.repo_dir()?;
    claude_usage_line::git::read_git_info(&dir)
}

#[cfg(not(feature = "git"))]
fn read_git(_hook: &HookJson) -> Option<GitInfo> {
    None
}
