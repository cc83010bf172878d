//! Stale lock-file detection and cleanup inside the `.git` directory.
//!
//! Git drops `*.lock` sentinels while mutating metadata; a crashed process
//! leaves them behind and blocks every later operation. We only detect and
//! delete, never hold a lock ourselves.

use std::path::{Path, PathBuf};

/// Well-known top-level lock files.
pub const LOCK_FILE_NAMES: &[&str] = &["index.lock", "HEAD.lock", "config.lock"];

/// Find pending lock files: the well-known set plus any `*.lock` under
/// `refs/` (branch- and remote-ref locks).
pub fn find_lock_files(git_dir: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();

    for name in LOCK_FILE_NAMES {
        let candidate = git_dir.join(name);
        if candidate.is_file() {
            found.push(candidate);
        }
    }

    collect_ref_locks(&git_dir.join("refs"), &mut found);
    found
}

fn collect_ref_locks(dir: &Path, found: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_ref_locks(&path, found);
        } else if path.extension().is_some_and(|ext| ext == "lock") {
            found.push(path);
        }
    }
}

/// Delete the given lock files. Returns the removed paths and the failures;
/// a failed deletion leaves that file in place and never aborts the rest.
pub fn remove_lock_files(paths: &[PathBuf]) -> (Vec<PathBuf>, Vec<(PathBuf, String)>) {
    let mut removed = Vec::new();
    let mut failed = Vec::new();

    for path in paths {
        match std::fs::remove_file(path) {
            Ok(()) => removed.push(path.clone()),
            Err(e) => failed.push((path.clone(), e.to_string())),
        }
    }

    (removed, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fake_git_dir() -> (tempfile::TempDir, PathBuf) {
        let temp = tempfile::tempdir().unwrap();
        let git_dir = temp.path().join(".git");
        fs::create_dir_all(git_dir.join("refs/heads")).unwrap();
        (temp, git_dir)
    }

    #[test]
    fn test_no_locks_found_in_clean_dir() {
        let (_temp, git_dir) = fake_git_dir();
        assert!(find_lock_files(&git_dir).is_empty());
    }

    #[test]
    fn test_finds_well_known_and_ref_locks() {
        let (_temp, git_dir) = fake_git_dir();
        fs::write(git_dir.join("index.lock"), "").unwrap();
        fs::write(git_dir.join("HEAD.lock"), "").unwrap();
        fs::write(git_dir.join("refs/heads/feature.lock"), "").unwrap();
        // A non-lock file must not match
        fs::write(git_dir.join("refs/heads/feature"), "abc123").unwrap();

        let found = find_lock_files(&git_dir);
        assert_eq!(found.len(), 3);
        assert!(found.iter().any(|p| p.ends_with("index.lock")));
        assert!(found.iter().any(|p| p.ends_with("HEAD.lock")));
        assert!(found.iter().any(|p| p.ends_with("refs/heads/feature.lock")));
    }

    #[test]
    fn test_remove_all_reports_count() {
        let (_temp, git_dir) = fake_git_dir();
        fs::write(git_dir.join("index.lock"), "").unwrap();
        fs::write(git_dir.join("HEAD.lock"), "").unwrap();

        let found = find_lock_files(&git_dir);
        let (removed, failed) = remove_lock_files(&found);
        assert_eq!(removed.len(), 2);
        assert!(failed.is_empty());
        assert!(!git_dir.join("index.lock").exists());
        assert!(!git_dir.join("HEAD.lock").exists());
    }

    #[test]
    fn test_remove_missing_file_is_reported_not_fatal() {
        let (_temp, git_dir) = fake_git_dir();
        let ghost = git_dir.join("index.lock");
        let (removed, failed) = remove_lock_files(&[ghost.clone()]);
        assert!(removed.is_empty());
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, ghost);
    }
}
