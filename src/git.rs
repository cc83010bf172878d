//! Repository inspection and mutation over the external `git` command line.
//!
//! [`Repository`] encapsulates a working-directory path; every query or
//! mutation shells out through the command runner. Read-only inspectors are
//! deliberately forgiving (branch queries fall back to `main`) while
//! mutations surface their stderr through [`GitError`].

pub mod locks;
pub mod process;

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::runner::{self, CommandError, CommandOutput};

#[derive(Debug)]
pub enum GitError {
    CommandFailed(String),
    ParseError(String),
}

impl std::fmt::Display for GitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitError::CommandFailed(msg) => write!(f, "{}", msg.trim()),
            GitError::ParseError(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for GitError {}

impl From<CommandError> for GitError {
    fn from(err: CommandError) -> Self {
        GitError::CommandFailed(err.text().to_string())
    }
}

/// Name used when the current-branch or branch-list queries come back empty.
pub const FALLBACK_BRANCH: &str = "main";

/// Position of the local branch relative to its upstream.
///
/// Severity-ordered: when the status header reports both ahead and behind
/// counts the state is `Diverged`, never one of the single-sided variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Divergence {
    Synced,
    Ahead(u32),
    Behind(u32),
    Diverged { ahead: u32, behind: u32 },
}

impl Divergence {
    /// Whether the state blocks a plain push and needs user resolution.
    /// `Ahead` is push-safe; `Synced` needs nothing.
    pub fn needs_resolution(self) -> bool {
        matches!(self, Divergence::Behind(_) | Divergence::Diverged { .. })
    }
}

impl std::fmt::Display for Divergence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Divergence::Synced => write!(f, "in sync with the remote"),
            Divergence::Ahead(n) => write!(f, "{n} commit(s) ahead of the remote"),
            Divergence::Behind(n) => write!(f, "{n} commit(s) behind the remote"),
            Divergence::Diverged { ahead, behind } => {
                write!(f, "diverged ({ahead} ahead, {behind} behind)")
            }
        }
    }
}

/// Repository context for git operations.
///
/// # Examples
///
/// ```no_run
/// use autopush::git::Repository;
///
/// let repo = Repository::at(".");
/// if repo.is_repository() {
///     let branch = repo.current_branch();
///     let clean = repo.is_clean()?;
/// }
/// # Ok::<(), autopush::git::GitError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Repository {
    path: PathBuf,
}

impl Repository {
    /// Create a repository context at the specified path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the path this repository context operates on.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The `.git` metadata directory for this repository.
    pub fn git_dir(&self) -> PathBuf {
        self.path.join(".git")
    }

    /// Check if the version-control metadata directory exists. O(1).
    pub fn is_repository(&self) -> bool {
        self.git_dir().exists()
    }

    /// Initialize a repository. A no-op success when one already exists;
    /// the underlying init command is not invoked in that case.
    pub fn init(&self) -> Result<(), GitError> {
        if self.is_repository() {
            return Ok(());
        }
        self.run_checked(&["init"]).map(|_| ())
    }

    /// Porcelain status covering tracked and untracked changes.
    pub fn status_porcelain(&self) -> Result<String, GitError> {
        self.run_checked(&["status", "--porcelain", "-u"])
    }

    /// Empty status output means a clean working tree.
    pub fn is_clean(&self) -> Result<bool, GitError> {
        Ok(self.status_porcelain()?.trim().is_empty())
    }

    /// Current branch name, defaulting to [`FALLBACK_BRANCH`] when the query
    /// fails or yields nothing (fresh repository, detached HEAD).
    pub fn current_branch(&self) -> String {
        match self.run_checked(&["branch", "--show-current"]) {
            Ok(stdout) if !stdout.trim().is_empty() => stdout.trim().to_string(),
            _ => FALLBACK_BRANCH.to_string(),
        }
    }

    /// Local branch names; falls back to a one-element list with
    /// [`FALLBACK_BRANCH`] when the listing fails or is empty.
    pub fn local_branches(&self) -> Vec<String> {
        let branches: Vec<String> = match self.run_checked(&["branch", "--format=%(refname:short)"])
        {
            Ok(stdout) => stdout
                .lines()
                .map(|line| line.trim().to_string())
                .filter(|line| !line.is_empty())
                .collect(),
            Err(_) => Vec::new(),
        };

        if branches.is_empty() {
            vec![FALLBACK_BRANCH.to_string()]
        } else {
            branches
        }
    }

    /// Derive the branch's position relative to its upstream from the
    /// `status --porcelain=v1 --branch` header line.
    pub fn divergence(&self) -> Result<Divergence, GitError> {
        let stdout = self.run_checked(&["status", "--porcelain=v1", "--branch"])?;
        let header = stdout.lines().next().unwrap_or("");
        Ok(parse_divergence(header))
    }

    /// URL of the named remote, or `None` when it is not configured.
    pub fn remote_url(&self, remote: &str) -> Option<String> {
        match self.run_checked(&["remote", "get-url", remote]) {
            Ok(stdout) if !stdout.trim().is_empty() => Some(stdout.trim().to_string()),
            _ => None,
        }
    }

    /// Register a new remote.
    pub fn add_remote(&self, name: &str, url: &str) -> Result<(), GitError> {
        self.run_checked(&["remote", "add", name, url]).map(|_| ())
    }

    /// Read a config value; `None` when unset.
    pub fn config_get(&self, key: &str) -> Option<String> {
        match self.run_checked(&["config", key]) {
            Ok(stdout) if !stdout.trim().is_empty() => Some(stdout.trim().to_string()),
            _ => None,
        }
    }

    /// Write a repository-local config value.
    pub fn config_set(&self, key: &str, value: &str) -> Result<(), GitError> {
        self.run_checked(&["config", key, value]).map(|_| ())
    }

    /// Write a placeholder identity when user.name or user.email is unset,
    /// so commits don't fail on a fresh machine.
    pub fn ensure_identity(&self) -> Result<(), GitError> {
        if self.config_get("user.name").is_none() {
            self.config_set("user.name", "Auto Committer")?;
        }
        if self.config_get("user.email").is_none() {
            self.config_set("user.email", "autocommit@example.com")?;
        }
        Ok(())
    }

    /// Stage all changes, including untracked files.
    pub fn stage_all(&self) -> Result<(), GitError> {
        self.run_checked(&["add", "."]).map(|_| ())
    }

    /// Create a commit with the given message.
    pub fn commit(&self, message: &str) -> Result<(), GitError> {
        self.run_checked(&["commit", "-m", message]).map(|_| ())
    }

    /// Push the branch to `origin`, optionally forced.
    pub fn push(&self, branch: &str, force: bool) -> Result<(), GitError> {
        if force {
            self.run_checked(&["push", "origin", branch, "--force"])
                .map(|_| ())
        } else {
            self.run_checked(&["push", "origin", branch]).map(|_| ())
        }
    }

    /// Push with upstream tracking (`-u`), the documented one-shot retry for
    /// first pushes.
    pub fn push_upstream(&self, branch: &str) -> Result<(), GitError> {
        self.run_checked(&["push", "-u", "origin", branch])
            .map(|_| ())
    }

    /// Overwrite the remote branch, guarded by a lease check.
    pub fn force_push_with_lease(&self, branch: &str) -> Result<(), GitError> {
        self.run_checked(&["push", "--force-with-lease", "origin", branch])
            .map(|_| ())
    }

    /// Plain merge pull.
    pub fn pull(&self) -> Result<(), GitError> {
        self.run_checked(&["pull"]).map(|_| ())
    }

    /// Rebase pull.
    pub fn pull_rebase(&self) -> Result<(), GitError> {
        self.run_checked(&["pull", "--rebase"]).map(|_| ())
    }

    /// Abort an in-progress merge.
    pub fn merge_abort(&self) -> Result<(), GitError> {
        self.run_checked(&["merge", "--abort"]).map(|_| ())
    }

    /// Run a git command in this repository's context.
    pub fn run(&self, args: &[&str]) -> Result<CommandOutput, CommandError> {
        runner::run_in(&self.path, "git", args)
    }

    fn run_checked(&self, args: &[&str]) -> Result<String, GitError> {
        Ok(self.run(args)?.stdout)
    }
}

/// Classify a `status --branch` header into a [`Divergence`].
///
/// Only a counted `ahead N`/`behind N` marker counts as divergence; a bare
/// substring (a branch named `lookahead`, say) does not. Both markers
/// present wins the tie-break to `Diverged`.
pub fn parse_divergence(header: &str) -> Divergence {
    // The header looks like: "## main...origin/main [ahead 3, behind 2]"
    let ahead = extract_count(header, r"ahead (\d+)");
    let behind = extract_count(header, r"behind (\d+)");

    match (ahead, behind) {
        (Some(ahead), Some(behind)) => Divergence::Diverged { ahead, behind },
        (Some(ahead), None) => Divergence::Ahead(ahead),
        (None, Some(behind)) => Divergence::Behind(behind),
        (None, None) => Divergence::Synced,
    }
}

fn extract_count(header: &str, pattern: &str) -> Option<u32> {
    let re = Regex::new(pattern).ok()?;
    re.captures(header)?.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_divergence_both_means_diverged() {
        let header = "## main...origin/main [ahead 3, behind 2]";
        assert_eq!(
            parse_divergence(header),
            Divergence::Diverged {
                ahead: 3,
                behind: 2
            }
        );
    }

    #[test]
    fn test_parse_divergence_ahead_only() {
        let header = "## main...origin/main [ahead 5]";
        assert_eq!(parse_divergence(header), Divergence::Ahead(5));
    }

    #[test]
    fn test_parse_divergence_behind_only() {
        let header = "## feature...origin/feature [behind 1]";
        assert_eq!(parse_divergence(header), Divergence::Behind(1));
    }

    #[test]
    fn test_parse_divergence_synced() {
        assert_eq!(
            parse_divergence("## main...origin/main"),
            Divergence::Synced
        );
    }

    #[test]
    fn test_parse_divergence_no_upstream() {
        assert_eq!(parse_divergence("## main"), Divergence::Synced);
    }

    #[test]
    fn test_parse_divergence_ignores_branch_names_with_marker_words() {
        assert_eq!(
            parse_divergence("## lookahead...origin/lookahead"),
            Divergence::Synced
        );
        assert_eq!(
            parse_divergence("## behind-fix...origin/behind-fix"),
            Divergence::Synced
        );
        // A real marker on such a branch still parses
        assert_eq!(
            parse_divergence("## behind-fix...origin/behind-fix [ahead 2]"),
            Divergence::Ahead(2)
        );
    }

    #[test]
    fn test_parse_divergence_empty_header() {
        assert_eq!(parse_divergence(""), Divergence::Synced);
    }

    #[test]
    fn test_needs_resolution() {
        assert!(!Divergence::Synced.needs_resolution());
        assert!(!Divergence::Ahead(4).needs_resolution());
        assert!(Divergence::Behind(1).needs_resolution());
        assert!(
            Divergence::Diverged {
                ahead: 1,
                behind: 1
            }
            .needs_resolution()
        );
    }

    #[test]
    fn test_is_repository_plain_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!Repository::at(dir.path()).is_repository());
    }

    #[test]
    fn test_current_branch_fallback_outside_repo() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::at(dir.path());
        assert_eq!(repo.current_branch(), FALLBACK_BRANCH);
        assert_eq!(repo.local_branches(), vec![FALLBACK_BRANCH.to_string()]);
    }
}
