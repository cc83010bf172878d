//! Shared helpers for integration tests.
//!
//! `TestRepo` builds throwaway git repositories in scratch directories under
//! the build tree. `ScriptedPrompter` answers workflow prompts from a script
//! so the state machine can run unattended.

// Not every test file uses every helper.
#![allow(dead_code)]

use std::cell::RefCell;
use std::path::Path;
use std::process::Command;

use autopush::prompt::Prompter;
use tempfile::TempDir;

/// A scratch directory under `target/tmp`. Its path still matches the
/// classifier's substring-based system prefixes (`/tmp`), so workflow tests
/// pair it with a platform context carrying an empty prefix list.
pub fn scratch_dir() -> TempDir {
    tempfile::Builder::new()
        .prefix("autopush-test-")
        .tempdir_in(env!("CARGO_TARGET_TMPDIR"))
        .expect("create scratch dir")
}

/// A real git repository in a temporary directory, with a local identity so
/// commits work on any machine.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    pub fn new() -> Self {
        let repo = Self { dir: scratch_dir() };
        repo.git(&["init", "-b", "main"]);
        repo.git(&["config", "user.name", "Test User"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Run a git command in the repository, panicking on failure.
    pub fn git(&self, args: &[&str]) {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.dir.path())
            .output()
            .expect("run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    pub fn write_file(&self, name: &str, content: &str) {
        std::fs::write(self.dir.path().join(name), content).expect("write file");
    }

    pub fn commit_all(&self, message: &str) {
        self.git(&["add", "."]);
        self.git(&["commit", "-m", message]);
    }

    /// Create a bare repository and wire it up as this repo's `origin`.
    /// The returned guard keeps the bare repository alive.
    pub fn add_bare_origin(&self) -> TempDir {
        let bare = scratch_dir();
        let output = Command::new("git")
            .args(["init", "--bare"])
            .current_dir(bare.path())
            .output()
            .expect("run git init --bare");
        assert!(output.status.success());

        let url = bare.path().to_string_lossy().into_owned();
        self.git(&["remote", "add", "origin", &url]);
        bare
    }

    /// Number of commits on HEAD; 0 before the first commit.
    pub fn commit_count(&self) -> usize {
        let output = Command::new("git")
            .args(["rev-list", "--count", "HEAD"])
            .current_dir(self.dir.path())
            .output()
            .expect("run git rev-list");
        if !output.status.success() {
            return 0;
        }
        String::from_utf8_lossy(&output.stdout)
            .trim()
            .parse()
            .unwrap_or(0)
    }
}

/// Scripted answer for one prompt.
#[derive(Debug, Clone)]
pub enum Answer {
    Yes,
    No,
    Choice(usize),
    Text(String),
}

/// A [`Prompter`] that answers from substring-matched overrides, falling back
/// to a default confirmation answer. Questions are recorded for assertions.
pub struct ScriptedPrompter {
    default_confirm: bool,
    overrides: Vec<(String, Answer)>,
    asked: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn all_yes() -> Self {
        Self {
            default_confirm: true,
            overrides: Vec::new(),
            asked: RefCell::new(Vec::new()),
        }
    }

    /// Answer any prompt whose text contains `needle` with `answer`.
    pub fn with_override(mut self, needle: &str, answer: Answer) -> Self {
        self.overrides.push((needle.to_string(), answer));
        self
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    fn record(&self, question: &str) {
        self.asked.borrow_mut().push(question.to_string());
    }

    fn lookup(&self, question: &str) -> Option<&Answer> {
        self.overrides
            .iter()
            .find(|(needle, _)| question.contains(needle.as_str()))
            .map(|(_, answer)| answer)
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, question: &str) -> std::io::Result<bool> {
        self.record(question);
        match self.lookup(question) {
            Some(Answer::Yes) => Ok(true),
            Some(Answer::No) => Ok(false),
            _ => Ok(self.default_confirm),
        }
    }

    fn choose(&self, question: &str, _options: &[&str]) -> std::io::Result<usize> {
        self.record(question);
        match self.lookup(question) {
            Some(Answer::Choice(i)) => Ok(*i),
            _ => Ok(0),
        }
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> std::io::Result<String> {
        self.record(prompt);
        match self.lookup(prompt) {
            Some(Answer::Text(text)) => Ok(text.clone()),
            _ => Ok(default.unwrap_or_default().to_string()),
        }
    }

    fn wait_for_enter(&self, prompt: &str) -> std::io::Result<()> {
        self.record(prompt);
        Ok(())
    }
}
