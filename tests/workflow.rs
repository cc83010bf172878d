//! End-to-end workflow runs against real git repositories, with prompts
//! answered by a scripted responder and GitHub integration disabled.

mod common;

use std::path::Path;
use std::process::Command;

use autopush::github::GitHubClient;
use autopush::platform::PlatformContext;
use autopush::workflow::{PushOptions, RunOutcome, Workflow};

use common::{Answer, ScriptedPrompter, TestRepo, scratch_dir};

fn run_workflow(path: &Path, prompter: &ScriptedPrompter, options: PushOptions) -> RunOutcome {
    // Scratch directories live under target/tmp, which the real prefix list
    // flags as a system path; an empty list keeps the classification honest.
    let platform = PlatformContext::detect().with_system_prefixes(&[]);
    let workflow = Workflow::new(
        path,
        platform,
        GitHubClient::unavailable(),
        prompter,
        options,
    );
    workflow.run().expect("workflow run")
}

fn last_commit_subject(repo: &TestRepo) -> String {
    let output = Command::new("git")
        .args(["log", "-1", "--format=%s"])
        .current_dir(repo.path())
        .output()
        .expect("run git log");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn clean_tree_with_declined_push_succeeds() {
    let repo = TestRepo::new();
    repo.write_file("notes.md", "hello");
    repo.commit_all("initial");

    let prompter =
        ScriptedPrompter::all_yes().with_override("Push the current state", Answer::No);
    let outcome = run_workflow(repo.path(), &prompter, PushOptions::default());

    assert!(outcome.succeeded);
    assert!(!outcome.stages.init, "no init ran on an existing repo");
    assert!(outcome.stages.branch_sync);
    assert!(outcome.stages.staging);
    assert!(outcome.stages.commit);
    assert!(outcome.stages.push, "a deliberate skip counts as completed");
    assert!(!outcome.stages.browser_open, "gh is unavailable in tests");
    assert_eq!(repo.commit_count(), 1, "no new commit on a clean tree");
}

#[test]
fn empty_directory_gets_initialized() {
    let dir = scratch_dir();

    let prompter =
        ScriptedPrompter::all_yes().with_override("Push the current state", Answer::No);
    let outcome = run_workflow(dir.path(), &prompter, PushOptions::default());

    assert!(outcome.succeeded);
    assert!(outcome.stages.init);
    assert!(outcome.stages.branch_sync);
    assert!(outcome.stages.staging);
    assert!(outcome.stages.commit);
    assert!(outcome.stages.push);
    assert!(dir.path().join(".git").is_dir());

    // An ordinary empty folder initializes without any system-folder gate.
    let asked = prompter.asked();
    assert!(
        asked
            .iter()
            .all(|q| !q.contains("Continue anyway") && !q.contains("Really continue")),
        "unexpected system-folder prompts: {asked:?}"
    );
}

#[test]
fn dirty_repo_stages_commits_and_pushes_to_origin() {
    let repo = TestRepo::new();
    repo.write_file("base.txt", "v1");
    repo.commit_all("initial");
    let _origin = repo.add_bare_origin();
    repo.write_file("feature.txt", "new work");

    let prompter = ScriptedPrompter::all_yes();
    let options = PushOptions {
        message: Some("add feature file".to_string()),
        ..PushOptions::default()
    };
    let outcome = run_workflow(repo.path(), &prompter, options);

    assert!(outcome.succeeded);
    assert!(outcome.stages.staging);
    assert!(outcome.stages.commit);
    assert!(outcome.stages.push);
    assert_eq!(repo.commit_count(), 2);
    assert_eq!(last_commit_subject(&repo), "add feature file");
}

#[test]
fn default_commit_message_is_timestamped() {
    let repo = TestRepo::new();
    let _origin = repo.add_bare_origin();
    repo.write_file("data.txt", "content");

    let prompter = ScriptedPrompter::all_yes();
    let outcome = run_workflow(repo.path(), &prompter, PushOptions::default());

    assert!(outcome.succeeded);
    assert!(
        last_commit_subject(&repo).starts_with("Auto commit: "),
        "got: {}",
        last_commit_subject(&repo)
    );
}

#[test]
fn declined_staging_is_a_terminal_failure() {
    let repo = TestRepo::new();
    repo.write_file("base.txt", "v1");
    repo.commit_all("initial");
    repo.write_file("pending.txt", "uncommitted");

    let prompter = ScriptedPrompter::all_yes().with_override("Stage all changes", Answer::No);
    let outcome = run_workflow(repo.path(), &prompter, PushOptions::default());

    assert!(!outcome.succeeded);
    assert!(!outcome.stages.staging);
    assert!(!outcome.stages.commit);
    assert!(!outcome.stages.push);
    assert!(outcome.stages.branch_sync, "sync completed before the decline");
    assert_eq!(repo.commit_count(), 1);
}

#[test]
fn missing_directory_fails_with_empty_summary() {
    let missing = scratch_dir().path().join("does-not-exist");

    let prompter = ScriptedPrompter::all_yes();
    let outcome = run_workflow(&missing, &prompter, PushOptions::default());

    assert!(!outcome.succeeded);
    assert_eq!(outcome.stages.completed(), 0);
    assert!(prompter.asked().is_empty(), "nothing was prompted");
}

#[test]
fn unreachable_origin_fails_after_upstream_retry() {
    let repo = TestRepo::new();
    repo.git(&["remote", "add", "origin", "/nonexistent/autopush-no-remote"]);
    repo.write_file("work.txt", "content");

    let prompter = ScriptedPrompter::all_yes();
    let options = PushOptions {
        message: Some("doomed".to_string()),
        ..PushOptions::default()
    };
    let outcome = run_workflow(repo.path(), &prompter, options);

    assert!(!outcome.succeeded);
    assert!(outcome.stages.commit, "commit landed before the push failed");
    assert!(!outcome.stages.push);
    assert_eq!(repo.commit_count(), 1);
}

#[test]
fn behind_branch_deferred_to_manual_resolution() {
    let repo = TestRepo::new();
    repo.write_file("a.txt", "one");
    repo.commit_all("first");
    repo.write_file("b.txt", "two");
    repo.commit_all("second");
    let _origin = repo.add_bare_origin();
    repo.git(&["push", "-u", "origin", "main"]);
    repo.git(&["reset", "--hard", "HEAD~1"]);

    // Option 4 of the divergence menu: skip and resolve manually.
    let prompter = ScriptedPrompter::all_yes()
        .with_override("divergence", Answer::Choice(3))
        .with_override("Push the current state", Answer::No);
    let outcome = run_workflow(repo.path(), &prompter, PushOptions::default());

    assert!(outcome.succeeded);
    assert!(outcome.stages.branch_sync);
    assert_eq!(repo.commit_count(), 1, "deferral touches nothing");
}

#[test]
fn behind_branch_resolved_by_pull_rebase() {
    let repo = TestRepo::new();
    repo.write_file("a.txt", "one");
    repo.commit_all("first");
    repo.write_file("b.txt", "two");
    repo.commit_all("second");
    let _origin = repo.add_bare_origin();
    repo.git(&["push", "-u", "origin", "main"]);
    repo.git(&["reset", "--hard", "HEAD~1"]);

    // Option 1 (pull with rebase) fast-forwards back to the remote tip.
    let prompter =
        ScriptedPrompter::all_yes().with_override("Push the current state", Answer::No);
    let outcome = run_workflow(repo.path(), &prompter, PushOptions::default());

    assert!(outcome.succeeded);
    assert!(outcome.stages.branch_sync);
    assert_eq!(repo.commit_count(), 2, "rebase pulled the missing commit");
}

#[test]
fn declined_init_is_a_terminal_failure() {
    let dir = scratch_dir();

    let prompter =
        ScriptedPrompter::all_yes().with_override("Initialize a git repository", Answer::No);
    let outcome = run_workflow(dir.path(), &prompter, PushOptions::default());

    assert!(!outcome.succeeded);
    assert_eq!(outcome.stages.completed(), 0);
    assert!(!dir.path().join(".git").exists());
}
