//! # Claude Usage Line
//!
//! A status line for Claude Code that estimates subscription usage from the
//! session transcripts under `~/.claude/projects/`.
//!
//! ## Overview
//!
//! Each invocation scans the `*.jsonl` session logs, summarizes every session
//! (duration, prompts, responses per model family) and aggregates them over
//! two windows:
//! - the current 5-hour cycle, aligned to multiples of 18 000 s since the epoch
//! - the current week, starting Monday 00:00 local time
//!
//! The result is written to `usage_data.json` and rendered as one line on
//! stdout. When an OAuth token is available the rendered quota percentages
//! come from the Claude usage API instead of the local estimate.
//!
//! ## Features
//!
//! - `git` (default): Enables repository inspection via gix
//! - `colors` (default): Enables terminal color output via owo-colors

/// Per-file session summary cache
pub mod cache;

/// Command-line argument parsing
pub mod cli;

/// Persisted user configuration
pub mod config;

/// Status line and report formatting
pub mod display;

/// Git repository inspection (feature-gated)
#[cfg(feature = "git")]
pub mod git;

/// Data models for hooks, log events, sessions and Git info
pub mod models;

/// Session log scanning and summarization
pub mod scanner;

/// Legacy `usage_data.json` writer
pub mod snapshot;

/// Subscription tier limits
pub mod tiers;

/// Windowed aggregation across sessions
pub mod usage;

/// Online usage limits retrieved from the Claude OAuth API
pub mod usage_api;

/// Utility functions for paths, formatting, and time
pub mod utils;

/// Cycle and week window boundaries
pub mod window;
