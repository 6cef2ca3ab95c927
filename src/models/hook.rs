use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::session::SessionSize;

#[derive(Deserialize, Debug, Default)]
pub struct HookModel {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct HookWorkspace {
    #[serde(default)]
    pub current_dir: Option<String>,
    #[serde(default)]
    pub project_dir: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, Copy)]
pub struct ContextTokens {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub cache_creation_input_tokens: u64,
    #[serde(default)]
    pub cache_read_input_tokens: u64,
}

#[derive(Deserialize, Debug, Default)]
pub struct HookContextWindow {
    #[serde(default)]
    pub current_usage: Option<ContextTokens>,
    #[serde(default)]
    pub context_window_size: Option<u64>,
}

/// Payload Claude Code writes to the status line command's stdin.
/// Every field is optional; an empty or unparsable payload decodes to the default.
#[derive(Deserialize, Debug, Default)]
pub struct HookJson {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub transcript_path: Option<PathBuf>,
    #[serde(default)]
    pub cwd: Option<PathBuf>,
    #[serde(default)]
    pub model: Option<HookModel>,
    #[serde(default)]
    pub workspace: Option<HookWorkspace>,
    #[serde(default)]
    pub context_window: Option<HookContextWindow>,
}

const DEFAULT_CONTEXT_WINDOW: u64 = 200_000;

impl HookJson {
    pub fn from_slice(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Self::default();
        }
        match serde_json::from_slice(bytes) {
            Ok(hook) => hook,
            Err(err) => {
                tracing::debug!(error = %err, "ignoring unparsable hook payload");
                Self::default()
            }
        }
    }

    /// Directory the session runs in: `cwd`, then `workspace.current_dir`.
    pub fn working_dir(&self) -> Option<PathBuf> {
        self.cwd.clone().or_else(|| {
            self.workspace
                .as_ref()
                .and_then(|w| w.current_dir.as_ref())
                .map(PathBuf::from)
        })
    }

    /// Where to look for a repository: `workspace.project_dir`, then the
    /// working dir, then the process directory.
    pub fn repo_dir(&self) -> Option<PathBuf> {
        self.workspace
            .as_ref()
            .and_then(|w| w.project_dir.as_ref())
            .map(PathBuf::from)
            .or_else(|| self.working_dir())
            .or_else(|| std::env::current_dir().ok())
    }

    pub fn project_name(&self) -> String {
        let from_dir = |p: &Path| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .filter(|n| !n.is_empty())
        };
        self.working_dir()
            .as_deref()
            .and_then(from_dir)
            .or_else(|| std::env::current_dir().ok().as_deref().and_then(from_dir))
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub fn model_display_name(&self) -> Option<&str> {
        self.model
            .as_ref()
            .and_then(|m| m.display_name.as_deref())
            .filter(|s| !s.trim().is_empty())
    }

    /// Size of the transcript file. Missing or unreadable transcripts yield `None`.
    pub fn session_size(&self) -> Option<SessionSize> {
        let path = self.transcript_path.as_deref()?;
        match SessionSize::from_file(path) {
            Ok(size) => Some(size),
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "transcript size unavailable");
                None
            }
        }
    }

    /// Context window usage in percent, when reported.
    pub fn context_percent(&self) -> Option<f64> {
        let ctx = self.context_window.as_ref()?;
        let usage = ctx.current_usage?;
        let size = ctx.context_window_size.unwrap_or(DEFAULT_CONTEXT_WINDOW);
        let used =
            usage.input_tokens + usage.cache_creation_input_tokens + usage.cache_read_input_tokens;
        if size == 0 {
            return Some(0.0);
        }
        Some(used as f64 * 100.0 / size as f64)
    }
}
