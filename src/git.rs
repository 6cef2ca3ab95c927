//! Repository status for the status line git segment, read with gix.

use crate::models::git::GitInfo;
use std::path::Path;

pub fn read_git_info(start_dir: &Path) -> Option<GitInfo> {
    let repo = gix::discover(start_dir).ok()?;
    let mut info = GitInfo::default();

    let mut head = repo.head().ok()?;
    if let Some(name) = head.referent_name() {
        info.branch = Some(name.shorten().to_string());
    }
    let head_id = head.try_peel_to_id().ok().flatten();
    if let Some(id) = &head_id {
        info.short_commit = Some(id.to_hex().to_string().chars().take(7).collect());
    }

    // Untracked files do not count as dirty
    info.is_clean = repo.is_dirty().ok().map(|dirty| !dirty);

    if let (Some(branch), Some(head_id)) = (info.branch.as_deref(), head_id) {
        if let Some(upstream) = upstream_ref_name(&repo, branch) {
            if let Ok(mut up_ref) = repo.find_reference(upstream.as_str()) {
                if let Ok(up_id) = up_ref.peel_to_id() {
                    info.ahead = exclusive_commits(head_id, up_id);
                    info.behind = exclusive_commits(up_id, head_id);
                }
            }
        }
    }
    Some(info)
}

/// `refs/remotes/<remote>/<branch>` from `branch.<name>.remote` and `.merge`
fn upstream_ref_name(repo: &gix::Repository, branch: &str) -> Option<String> {
    let cfg = repo.config_snapshot();
    let remote = cfg.string(format!("branch.{branch}.remote").as_str())?.to_string();
    let merge = cfg.string(format!("branch.{branch}.merge").as_str())?.to_string();
    let merge_short = merge.strip_prefix("refs/heads/").unwrap_or(merge.as_str());
    Some(format!("refs/remotes/{remote}/{merge_short}"))
}

/// Commits reachable from `tip` but not from `other`, like
/// `git rev-list --count other..tip`. The walk stops at the merge base.
fn exclusive_commits(tip: gix::Id<'_>, other: gix::Id<'_>) -> Option<usize> {
    let walk = tip.ancestors().with_hidden([other.detach()]).all().ok()?;
    Some(walk.flatten().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    /// Runs git with a fixed identity; `None` when git is missing or fails.
    fn git(dir: &Path, args: &[&str]) -> Option<String> {
        let output = Command::new("git")
            .current_dir(dir)
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .args([
                "-c",
                "user.name=Test",
                "-c",
                "user.email=test@example.com",
                "-c",
                "commit.gpgsign=false",
            ])
            .args(args)
            .output()
            .ok()?;
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn commit(dir: &Path, message: &str) {
        git(dir, &["commit", "-q", "--allow-empty", "-m", message]).unwrap();
    }

    #[test]
    fn test_outside_repository_returns_none() {
        let temp_dir = tempfile::tempdir().unwrap();
        // tempdir may itself live under a repository on some hosts
        if gix::discover(temp_dir.path()).is_err() {
            assert!(read_git_info(temp_dir.path()).is_none());
        }
    }

    #[test]
    fn test_ahead_behind_counts_stop_at_merge_base() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path();
        if git(dir, &["init", "-q"]).is_none() {
            return;
        }
        git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]).unwrap();
        for i in 0..6 {
            commit(dir, &format!("shared {i}"));
        }
        git(dir, &["update-ref", "refs/remotes/origin/main", "HEAD"]).unwrap();
        git(dir, &["config", "branch.main.remote", "origin"]).unwrap();
        git(dir, &["config", "branch.main.merge", "refs/heads/main"]).unwrap();

        for i in 0..3 {
            commit(dir, &format!("local {i}"));
        }
        let upstream_only = git(
            dir,
            &[
                "commit-tree",
                "refs/remotes/origin/main^{tree}",
                "-p",
                "refs/remotes/origin/main",
                "-m",
                "upstream",
            ],
        )
        .unwrap();
        git(dir, &["update-ref", "refs/remotes/origin/main", &upstream_only]).unwrap();

        let info = read_git_info(dir).unwrap();
        assert_eq!(info.branch.as_deref(), Some("main"));
        assert_eq!(info.short_commit.as_ref().map(String::len), Some(7));
        assert_eq!(info.ahead, Some(3));
        assert_eq!(info.behind, Some(1));
    }

    #[test]
    fn test_no_upstream_leaves_counts_unset() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path();
        if git(dir, &["init", "-q"]).is_none() {
            return;
        }
        git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]).unwrap();
        commit(dir, "only");

        let info = read_git_info(dir).unwrap();
        assert_eq!(info.branch.as_deref(), Some("main"));
        assert_eq!(info.is_clean, Some(true));
        assert!(info.ahead.is_none());
        assert!(info.behind.is_none());
    }
}
