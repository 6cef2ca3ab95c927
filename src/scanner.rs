//! # Scanner Module
//!
//! Reads one session transcript (one JSON object per line) and counts
//! qualifying prompts and per-model assistant responses.
//!
//! Transcripts are append-only and may be written while we read them, so a
//! broken line is skipped and an unreadable file scans as empty.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;
use tracing::debug;

use crate::models::{LogEvent, MessageContent, SessionScan, SessionSummary};

// Slash-command invocations and their echoed output are not prompts
static COMMAND_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<command-name>|<local-command-stdout>").unwrap());

/// Model family an assistant response is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    Opus,
    Sonnet,
}

impl ModelFamily {
    /// "opus" wins when both substrings are present.
    pub fn from_model_id(model: &str) -> Option<Self> {
        let m = model.to_lowercase();
        if m.contains("opus") {
            Some(ModelFamily::Opus)
        } else if m.contains("sonnet") {
            Some(ModelFamily::Sonnet)
        } else {
            None
        }
    }
}

pub fn is_command_message(content: &MessageContent) -> bool {
    content.texts().iter().any(|t| COMMAND_MARKER_RE.is_match(t))
}

/// Whether a line is an externally authored, non-command user prompt
pub fn is_prompt(event: &LogEvent) -> bool {
    if !event.is_type("user") || event.role() != Some("user") || event.is_meta {
        return false;
    }
    if event.user_type.as_deref() != Some("external") {
        return false;
    }
    match event.content() {
        Some(content) => !content.is_empty() && !is_command_message(content),
        None => false,
    }
}

pub fn response_family(event: &LogEvent) -> Option<ModelFamily> {
    if !event.is_type("assistant") {
        return None;
    }
    event.model().and_then(ModelFamily::from_model_id)
}

/// Fold one decoded line into the running scan.
pub fn apply_event(scan: &mut SessionScan, event: &LogEvent) {
    if let Some(ts) = event
        .timestamp
        .as_deref()
        .and_then(crate::utils::parse_timestamp)
    {
        scan.timestamps.push(ts);
    }
    if is_prompt(event) {
        scan.prompt_count += 1;
    } else {
        match response_family(event) {
            Some(ModelFamily::Opus) => scan.opus_count += 1,
            Some(ModelFamily::Sonnet) => scan.sonnet_count += 1,
            None => {}
        }
    }
}

/// Decode a single line; `None` when it is not a JSON object.
pub fn parse_line(line: &str) -> Option<LogEvent> {
    let value: serde_json::Value = serde_json::from_str(line).ok()?;
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}

pub fn scan_session_log(path: &Path) -> SessionScan {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "session log unreadable");
            return SessionScan::default();
        }
    };
    let reader = BufReader::new(file);
    let mut scan = SessionScan::default();

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            // Not UTF-8: a corrupt line, keep going
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                scan.skipped_lines += 1;
                continue;
            }
            Err(err) => {
                debug!(path = %path.display(), error = %err, "session log read failed");
                return SessionScan::default();
            }
        };
        let t = line.trim();
        if t.is_empty() {
            continue;
        }
        match parse_line(t) {
            Some(event) => apply_event(&mut scan, &event),
            None => scan.skipped_lines += 1,
        }
    }

    if scan.skipped_lines > 0 {
        debug!(
            path = %path.display(),
            skipped = scan.skipped_lines,
            "skipped malformed session log lines"
        );
    }
    scan
}

/// Scan and reduce one log file.
pub fn summarize(path: &Path) -> SessionSummary {
    SessionSummary::from_scan(path, &scan_session_log(path))
}
