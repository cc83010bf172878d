//! The end-to-end publish workflow.
//!
//! A linear state machine with conditional branches and recovery loops:
//! directory check → process/lock check → repository check (with classified
//! init gate) → divergence resolution → stage → commit → push (with
//! remote-creation and upstream retries) → browser confirmation → summary.
//!
//! Every interactive decision goes through the [`Prompter`] seam and every
//! exit path, success or not, prints the stage summary.

use std::io;
use std::path::{Path, PathBuf};

use color_print::cformat;

use crate::classify::{self, DirectoryAnalysis, FolderKind};
use crate::git::{Divergence, Repository, locks, process};
use crate::github::{GitHubClient, RemoteRepo, repository_name};
use crate::platform::PlatformContext;
use crate::prompt::Prompter;
use crate::runner;
use crate::styling::{
    error_message, format_heading, hint_message, info_message, println, progress_message,
    success_message, warning_message,
};

/// Options carried in from the command line.
#[derive(Debug, Default, Clone)]
pub struct PushOptions {
    /// Commit message; prompted with a timestamped default when absent.
    pub message: Option<String>,
    /// Branch to push; prompted with the current branch as default when absent.
    pub branch: Option<String>,
    /// Pass `--force` on the first push attempt.
    pub force: bool,
}

/// The six tracked stage outcomes for one workflow run.
///
/// A deliberately skipped stage (declined push on a clean tree, skipped lock
/// cleanup) counts as completed; only failures and never-reached stages stay
/// false.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StageResults {
    pub init: bool,
    pub branch_sync: bool,
    pub staging: bool,
    pub commit: bool,
    pub push: bool,
    pub browser_open: bool,
}

impl StageResults {
    pub const STAGE_COUNT: usize = 6;

    pub fn completed(&self) -> usize {
        [
            self.init,
            self.branch_sync,
            self.staging,
            self.commit,
            self.push,
            self.browser_open,
        ]
        .iter()
        .filter(|&&done| done)
        .count()
    }

    pub fn percentage(&self) -> f64 {
        self.completed() as f64 / Self::STAGE_COUNT as f64 * 100.0
    }
}

/// Final verdict of one run. `succeeded` drives the process exit code;
/// `stages` is what the summary printed.
#[derive(Debug)]
pub struct RunOutcome {
    pub succeeded: bool,
    pub stages: StageResults,
}

/// The publish workflow orchestrator. One instance per run.
pub struct Workflow<'a> {
    repo: Repository,
    platform: PlatformContext,
    github: GitHubClient,
    prompter: &'a dyn Prompter,
    options: PushOptions,
}

impl<'a> Workflow<'a> {
    pub fn new(
        target: &Path,
        platform: PlatformContext,
        github: GitHubClient,
        prompter: &'a dyn Prompter,
        options: PushOptions,
    ) -> Self {
        // Resolve symlinks/relative components while the directory exists;
        // a missing directory is caught (and reported) by run() itself.
        let resolved: PathBuf = std::fs::canonicalize(target).unwrap_or_else(|_| target.into());
        Self {
            repo: Repository::at(resolved),
            platform,
            github,
            prompter,
            options,
        }
    }

    /// Drive the full state machine. `Err` is reserved for broken I/O with
    /// the user; workflow-level failures come back as `succeeded: false`.
    pub fn run(&self) -> anyhow::Result<RunOutcome> {
        let mut stages = StageResults::default();

        println!("{}", progress_message("Auto push starting"));
        println!(
            "{}",
            info_message(cformat!(
                "Repository: <bold>{}</>",
                self.repo.path().display()
            ))
        );

        if !self.repo.path().is_dir() {
            println!(
                "{}",
                error_message(cformat!(
                    "Target directory not found: <bold>{}</>",
                    self.repo.path().display()
                ))
            );
            return self.finish(false, stages);
        }

        // Pre-run analysis; its warning (if any) gates continuation.
        let analysis = classify::analyze(self.repo.path(), &self.platform);
        self.print_analysis(&analysis);
        if let Some(warning) = analysis.warning {
            println!("{}", warning_message(warning));
            if !self.prompter.confirm("Continue anyway?")? {
                println!("{}", hint_message("Aborted"));
                return self.finish(false, stages);
            }
        }

        if !self.check_running_processes()? {
            return self.finish(false, stages);
        }

        if self.repo.is_repository() {
            self.handle_lock_files()?;
        }

        if !self.repo.is_repository() {
            println!(
                "{}",
                warning_message("This folder is not a git repository")
            );
            if !self.prompter.confirm("Initialize a git repository here?")? {
                println!("{}", hint_message("Aborted"));
                return self.finish(false, stages);
            }
            if !self.initialize_repository()? {
                return self.finish(false, stages);
            }
            stages.init = true;
        }

        if !self.sync_branch(&mut stages)? {
            return self.finish(false, stages);
        }

        let status = self.repo.status_porcelain().unwrap_or_default();
        if status.trim().is_empty() {
            return self.run_clean_tree(stages);
        }

        println!("{}", info_message("Changed files:"));
        for line in status.trim_end().lines() {
            println!("  {line}");
        }

        // Staging gate
        if !self.prompter.confirm("Stage all changes?")? {
            println!("{}", hint_message("Aborted before staging"));
            return self.finish(false, stages);
        }
        println!("{}", progress_message("Staging changes..."));
        if let Err(e) = self.repo.stage_all() {
            println!("{}", error_message(format!("Staging failed: {e}")));
            return self.finish(false, stages);
        }
        println!("{}", success_message("Staging complete"));
        stages.staging = true;

        // Commit gate
        if !self.prompter.confirm("Create a commit?")? {
            println!("{}", hint_message("Aborted before committing"));
            return self.finish(false, stages);
        }
        if !self.commit_changes()? {
            return self.finish(false, stages);
        }
        stages.commit = true;

        if !self.push_with_recovery()? {
            return self.finish(false, stages);
        }
        stages.push = true;

        stages.browser_open = self.confirm_in_browser();
        self.finish(true, stages)
    }

    /// Clean-tree shortcut: staging and commit are trivially satisfied; the
    /// push is offered but skippable, and a skip still counts as completed.
    fn run_clean_tree(&self, mut stages: StageResults) -> anyhow::Result<RunOutcome> {
        println!(
            "{}",
            info_message("Working tree is clean; all changes are already committed")
        );
        stages.staging = true;
        stages.commit = true;

        if self
            .prompter
            .confirm("Push the current state to the remote?")?
        {
            if !self.push_with_recovery()? {
                return self.finish(false, stages);
            }
            stages.push = true;
        } else {
            println!("{}", hint_message("Push skipped"));
            stages.push = true;
        }

        stages.browser_open = self.confirm_in_browser();
        self.finish(true, stages)
    }

    fn check_running_processes(&self) -> anyhow::Result<bool> {
        let processes = process::running_git_processes();
        if processes.is_empty() {
            log::debug!("no running git processes");
            return Ok(true);
        }
        println!("{}", warning_message("Running git processes found:"));
        for line in &processes {
            println!("  {line}");
        }
        if self
            .prompter
            .confirm("Another git process is active. Continue?")?
        {
            Ok(true)
        } else {
            println!("{}", hint_message("Aborted"));
            Ok(false)
        }
    }

    /// Lock handling never blocks the workflow; even "skip" proceeds.
    fn handle_lock_files(&self) -> anyhow::Result<()> {
        let found = locks::find_lock_files(&self.repo.git_dir());
        if found.is_empty() {
            log::debug!("no lock files");
            return Ok(());
        }

        println!("{}", warning_message("Lock files found:"));
        for lock in &found {
            println!("  {}", lock.display());
        }

        let choice = self.prompter.choose(
            "How should the lock files be handled?",
            &["Review and delete individually", "Delete all", "Skip"],
        )?;
        match choice {
            0 => {
                for lock in &found {
                    if self
                        .prompter
                        .confirm(&format!("Delete {}?", lock.display()))?
                    {
                        self.report_lock_removal(std::slice::from_ref(lock));
                    }
                }
            }
            1 => self.report_lock_removal(&found),
            _ => println!("{}", hint_message("Lock files left in place")),
        }
        Ok(())
    }

    fn report_lock_removal(&self, paths: &[PathBuf]) {
        let (removed, failed) = locks::remove_lock_files(paths);
        if !removed.is_empty() {
            println!(
                "{}",
                success_message(format!("Removed {} lock file(s)", removed.len()))
            );
        }
        for (path, reason) in failed {
            println!(
                "{}",
                error_message(format!("Could not delete {}: {reason}", path.display()))
            );
        }
    }

    /// Init with a fresh directory analysis and the classified policy gate.
    fn initialize_repository(&self) -> anyhow::Result<bool> {
        // Re-analyze right before acting; the directory may have changed.
        let analysis = classify::analyze(self.repo.path(), &self.platform);
        self.print_analysis(&analysis);

        if !self.should_proceed_with_init(&analysis)? {
            println!("{}", hint_message("git init cancelled"));
            return Ok(false);
        }

        println!("{}", progress_message("Running git init..."));
        match self.repo.init() {
            Ok(()) => {
                println!("{}", success_message("Repository initialized"));
                self.suggest_post_init(&analysis);
                Ok(true)
            }
            Err(e) => {
                println!(
                    "{}",
                    error_message(format!("Failed to initialize the repository: {e}"))
                );
                Ok(false)
            }
        }
    }

    /// Init policy: recommended classifications proceed automatically;
    /// system and nested folders need an extra, reluctant confirmation.
    fn should_proceed_with_init(&self, analysis: &DirectoryAnalysis) -> io::Result<bool> {
        match analysis.kind {
            FolderKind::ExistingRepository => {
                println!("{}", success_message("Already a git repository"));
                Ok(true)
            }
            FolderKind::SystemFolder => {
                println!(
                    "{}",
                    warning_message("git init inside a system folder is risky")
                );
                self.prompter
                    .confirm("Really continue? (recommended: no)")
            }
            FolderKind::NestedInRepository => {
                println!(
                    "{}",
                    warning_message("git init inside an existing repository is not recommended")
                );
                println!(
                    "{}",
                    hint_message("Consider a submodule or subtree instead")
                );
                self.prompter.confirm("Run git init here anyway?")
            }
            _ if !analysis.init_recommended => self.prompter.confirm("Proceed with git init?"),
            _ => Ok(true),
        }
    }

    fn suggest_post_init(&self, analysis: &DirectoryAnalysis) {
        println!("{}", info_message("Suggested next steps:"));
        match analysis.kind {
            FolderKind::EmptyFolder => {
                println!("{}", hint_message("Create a README file"));
                println!("{}", hint_message("Add a .gitignore file"));
            }
            FolderKind::SourceProject => {
                println!("{}", hint_message("Review or add a .gitignore file"));
            }
            _ => {}
        }
        println!(
            "{}",
            hint_message("Configure a remote repository (GitHub or similar)")
        );
    }

    /// Divergence check and, when needed, the interactive resolution menu.
    /// Returns whether the workflow may continue.
    fn sync_branch(&self, stages: &mut StageResults) -> anyhow::Result<bool> {
        match self.repo.divergence() {
            Ok(divergence) => {
                println!(
                    "{}",
                    info_message(format!("Branch state: {divergence}"))
                );
                if divergence.needs_resolution() {
                    if self.resolve_divergence(divergence)? {
                        stages.branch_sync = true;
                        Ok(true)
                    } else {
                        println!(
                            "{}",
                            error_message("Branch divergence was not resolved")
                        );
                        Ok(false)
                    }
                } else {
                    stages.branch_sync = true;
                    Ok(true)
                }
            }
            Err(e) => {
                // Indeterminate, not fatal: proceed but say so.
                log::debug!("divergence query failed: {e}");
                println!(
                    "{}",
                    warning_message("Could not determine the branch state; continuing")
                );
                stages.branch_sync = true;
                Ok(true)
            }
        }
    }

    fn resolve_divergence(&self, divergence: Divergence) -> anyhow::Result<bool> {
        println!(
            "{}",
            warning_message(format!("The branch needs syncing: {divergence}"))
        );
        loop {
            let choice = self.prompter.choose(
                "How should the divergence be resolved?",
                &[
                    "Pull with rebase (recommended)",
                    "Pull with merge",
                    "Force push with lease (overwrites remote commits)",
                    "Skip and resolve manually",
                ],
            )?;
            match choice {
                0 => return self.pull_and_handle_conflicts(true),
                1 => return self.pull_and_handle_conflicts(false),
                2 => {
                    if self
                        .prompter
                        .confirm("Force pushing can discard remote work. Continue?")?
                    {
                        return self.force_push_current();
                    }
                    // Danger confirmation declined; offer the menu again.
                }
                _ => {
                    println!("{}", hint_message("Deferring to manual resolution"));
                    return Ok(true);
                }
            }
        }
    }

    fn force_push_current(&self) -> anyhow::Result<bool> {
        let branch = self.repo.current_branch();
        println!(
            "{}",
            progress_message(cformat!("Force pushing <bold>{branch}</> with lease..."))
        );
        match self.repo.force_push_with_lease(&branch) {
            Ok(()) => {
                println!("{}", success_message("Force push completed"));
                Ok(true)
            }
            Err(e) => {
                println!("{}", error_message(format!("Force push failed: {e}")));
                Ok(false)
            }
        }
    }

    fn pull_and_handle_conflicts(&self, rebase: bool) -> anyhow::Result<bool> {
        let label = if rebase { "git pull --rebase" } else { "git pull" };
        println!("{}", progress_message(format!("Running {label}...")));

        let result = if rebase {
            self.repo.pull_rebase()
        } else {
            self.repo.pull()
        };
        match result {
            Ok(()) => {
                println!("{}", success_message("Branch synchronized"));
                Ok(true)
            }
            Err(e) => {
                let text = e.to_string();
                println!("{}", error_message(format!("{label} failed: {text}")));
                if text.contains("CONFLICT") {
                    self.handle_merge_conflict()
                } else {
                    Ok(false)
                }
            }
        }
    }

    fn handle_merge_conflict(&self) -> anyhow::Result<bool> {
        println!("{}", warning_message("Merge conflict detected"));
        loop {
            let choice = self.prompter.choose(
                "How should the conflict be resolved?",
                &[
                    "Open the editor and resolve there",
                    "Resolve manually in another terminal",
                    "Abort the merge",
                ],
            )?;
            match choice {
                0 => {
                    if let Err(e) = runner::run_in(self.repo.path(), "code", &["."]) {
                        println!(
                            "{}",
                            error_message(format!("Could not launch the editor: {e}"))
                        );
                        continue;
                    }
                    println!("{}", info_message("Editor opened"));
                    self.prompter
                        .wait_for_enter("Press Enter once the conflicts are resolved...")?;
                    return Ok(true);
                }
                1 => {
                    self.prompter
                        .wait_for_enter("Press Enter once the conflicts are resolved...")?;
                    return Ok(true);
                }
                _ => {
                    match self.repo.merge_abort() {
                        Ok(()) => println!("{}", success_message("Merge aborted")),
                        Err(e) => {
                            println!(
                                "{}",
                                error_message(format!("Failed to abort the merge: {e}"))
                            );
                        }
                    }
                    return Ok(false);
                }
            }
        }
    }

    fn commit_changes(&self) -> anyhow::Result<bool> {
        // Placeholder identity so the commit can't fail on a fresh machine.
        if let Err(e) = self.repo.ensure_identity() {
            log::warn!("could not ensure a git identity: {e}");
        }

        let message = match &self.options.message {
            Some(message) => message.clone(),
            None => {
                let default = format!(
                    "Auto commit: {}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
                );
                self.prompter.input("Commit message", Some(&default))?
            }
        };

        println!(
            "{}",
            progress_message(cformat!("Committing: <bold>{message}</>"))
        );
        match self.repo.commit(&message) {
            Ok(()) => {
                println!("{}", success_message("Commit created"));
                Ok(true)
            }
            Err(e) => {
                println!("{}", error_message(format!("Commit failed: {e}")));
                Ok(false)
            }
        }
    }

    /// Push, confirming the destination branch first. On failure: a missing
    /// `origin` remote triggers hosted-repository creation, then one retry
    /// with upstream tracking; an existing remote goes straight to the
    /// upstream retry. The second failure is terminal.
    fn push_with_recovery(&self) -> anyhow::Result<bool> {
        let branch = match &self.options.branch {
            Some(branch) => branch.clone(),
            None => {
                let current = self.repo.current_branch();
                let branches = self.repo.local_branches();
                println!(
                    "{}",
                    info_message(format!("Local branches: {}", branches.join(", ")))
                );
                let chosen = self.prompter.input("Branch to push", Some(&current))?;
                if !branches.contains(&chosen) {
                    println!(
                        "{}",
                        warning_message(cformat!(
                            "Branch <bold>{chosen}</> does not exist yet and will be created"
                        ))
                    );
                }
                chosen
            }
        };

        if !self
            .prompter
            .confirm(&format!("Push to branch '{branch}'?"))?
        {
            println!("{}", hint_message("Push cancelled"));
            return Ok(false);
        }

        println!(
            "{}",
            progress_message(cformat!("Pushing to <bold>{branch}</>..."))
        );
        match self.repo.push(&branch, self.options.force) {
            Ok(()) => {
                println!("{}", success_message("Push completed"));
                return Ok(true);
            }
            Err(e) => println!("{}", error_message(format!("Push failed: {e}"))),
        }

        if self.repo.remote_url("origin").is_none() {
            println!(
                "{}",
                warning_message("No 'origin' remote is configured")
            );
            if !self.recover_missing_origin()? {
                return Ok(false);
            }
            // origin now exists; set the upstream for this branch below.
        } else {
            println!(
                "{}",
                progress_message("Retrying with upstream tracking (-u)...")
            );
        }

        match self.repo.push_upstream(&branch) {
            Ok(()) => {
                println!("{}", success_message("Push completed"));
                Ok(true)
            }
            Err(e) => {
                println!("{}", error_message(format!("Push failed again: {e}")));
                Ok(false)
            }
        }
    }

    /// Wire up a missing `origin`. If the hosted repository already exists
    /// under the user's account, only the remote is added; otherwise it is
    /// created interactively. `Unknown` existence falls through to the
    /// creation path, which reports the unavailable prerequisites itself.
    fn recover_missing_origin(&self) -> anyhow::Result<bool> {
        let name = repository_name(self.repo.path());
        if let Some(login) = self.github.user_login(self.repo.path())
            && self
                .github
                .remote_repository(self.repo.path(), &login, &name)
                == RemoteRepo::Exists
        {
            let url = format!("https://github.com/{login}/{name}.git");
            println!(
                "{}",
                info_message(cformat!(
                    "Found existing <bold>{login}/{name}</> on GitHub; adding it as origin"
                ))
            );
            if let Err(e) = self.repo.add_remote("origin", &url) {
                println!(
                    "{}",
                    error_message(format!("Could not add the origin remote: {e}"))
                );
                return Ok(false);
            }
            return Ok(true);
        }
        Ok(self
            .github
            .create_repository(self.repo.path(), self.prompter)?)
    }

    /// Best-effort browser check; never fails the run.
    fn confirm_in_browser(&self) -> bool {
        println!();
        self.github.open_in_browser(self.repo.path(), &self.platform)
    }

    fn print_analysis(&self, analysis: &DirectoryAnalysis) {
        let yes_no = |flag: bool| if flag { "yes" } else { "no" };

        println!();
        println!(
            "{}",
            format_heading(
                "DIRECTORY ANALYSIS",
                Some(&analysis.path.display().to_string())
            )
        );
        println!("  Folder type:      {}", analysis.kind);
        println!("  Git repository:   {}", yes_no(analysis.is_repository));
        println!("  Empty:            {}", yes_no(analysis.is_empty));
        println!("  Source files:     {}", yes_no(analysis.has_source_files));
        println!("  System folder:    {}", yes_no(analysis.is_system_folder));
        println!(
            "  Nested in repo:   {}",
            yes_no(analysis.is_nested_in_repository)
        );
        println!("{}", info_message(analysis.recommendation));
        if analysis.init_recommended {
            println!("{}", success_message("git init is recommended here"));
        }
        println!();
    }

    fn finish(&self, succeeded: bool, stages: StageResults) -> anyhow::Result<RunOutcome> {
        print_summary(&stages);
        if succeeded {
            println!("{}", success_message("Auto push finished"));
        }
        Ok(RunOutcome { succeeded, stages })
    }
}

fn print_summary(stages: &StageResults) {
    println!();
    println!("{}", format_heading("EXECUTION SUMMARY", None));
    print_stage_line("Init", stages.init);
    print_stage_line("Branch sync", stages.branch_sync);
    print_stage_line("Staging", stages.staging);
    print_stage_line("Commit", stages.commit);
    print_stage_line("Push", stages.push);
    print_stage_line("Browser check", stages.browser_open);
    println!(
        "🎯 Completed: {}/{} ({:.1}%)",
        stages.completed(),
        StageResults::STAGE_COUNT,
        stages.percentage()
    );
    if stages.completed() < StageResults::STAGE_COUNT {
        println!(
            "{}",
            hint_message("Stages marked ❌ did not run or failed; see the messages above")
        );
    }
}

fn print_stage_line(label: &str, done: bool) {
    if done {
        println!("{}", cformat!("✅ {label}: <green>completed</>"));
    } else {
        println!("{}", cformat!("❌ {label}: <dim>not run or failed</>"));
    }
}
