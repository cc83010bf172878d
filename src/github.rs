//! Hosted-repository management via the GitHub CLI (`gh`).
//!
//! Availability is probed once per run; everything else degrades gracefully
//! when `gh` is missing or unauthenticated. Remote-repository existence is a
//! genuine tri-state: callers branch differently on [`RemoteRepo::Unknown`]
//! than on [`RemoteRepo::Missing`].

use std::io;
use std::path::Path;

use color_print::cformat;
use serde::Deserialize;

use crate::platform::PlatformContext;
use crate::prompt::Prompter;
use crate::runner;
use crate::styling::{
    error_message, hint_message, info_message, println, progress_message, success_message,
    warning_message,
};

/// Whether the hosted repository exists. `Unknown` covers every case where
/// the prerequisites to answer are missing (no CLI, no login) and must never
/// be collapsed to `Missing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteRepo {
    Exists,
    Missing,
    Unknown,
}

#[derive(Debug, Deserialize)]
struct GhUser {
    login: String,
}

/// Client for the external `gh` CLI. Construct once per run.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    available: bool,
}

impl GitHubClient {
    /// Probe for a usable `gh` binary (`which` lookup plus version check).
    pub fn detect() -> Self {
        let available = which::which("gh").is_ok()
            && runner::run_in(Path::new("."), "gh", &["--version"]).is_ok();
        log::debug!("GitHub CLI available: {available}");
        Self { available }
    }

    /// A client that treats the hosting CLI as absent. Used where probing
    /// or contacting GitHub is undesirable.
    pub fn unavailable() -> Self {
        Self { available: false }
    }

    pub fn available(&self) -> bool {
        self.available
    }

    /// Whether `gh` reports an authenticated session. Always false when the
    /// CLI itself is unavailable.
    pub fn authenticated(&self, dir: &Path) -> bool {
        self.available && self.run(dir, &["auth", "status"]).is_ok()
    }

    /// Login of the authenticated user, from the `gh api user` JSON object.
    /// `None` on any command or parse failure.
    pub fn user_login(&self, dir: &Path) -> Option<String> {
        if !self.available {
            return None;
        }
        let output = self.run(dir, &["api", "user"]).ok()?;
        let user: GhUser = serde_json::from_str(&output).ok()?;
        log::debug!("GitHub user: {}", user.login);
        Some(user.login)
    }

    /// Does `owner/name` exist on the host?
    pub fn remote_repository(&self, dir: &Path, owner: &str, name: &str) -> RemoteRepo {
        if !self.available {
            return RemoteRepo::Unknown;
        }
        let spec = format!("{owner}/{name}");
        match self.run(dir, &["repo", "view", &spec]) {
            Ok(_) => RemoteRepo::Exists,
            Err(runner::CommandError::NonZero { .. }) => RemoteRepo::Missing,
            Err(runner::CommandError::Launch(_)) => RemoteRepo::Unknown,
        }
    }

    /// Interactively create the hosted repository for `repo_path`.
    ///
    /// Prompts for visibility and an optional description, then delegates to
    /// `gh repo create --source=. --remote=origin --push`, which wires up the
    /// `origin` remote as part of creation. Returns whether creation
    /// succeeded; failures print the captured error text.
    pub fn create_repository(&self, repo_path: &Path, prompter: &dyn Prompter) -> io::Result<bool> {
        if !self.available {
            println!(
                "{}",
                error_message("GitHub CLI (gh) is unavailable; create the repository manually")
            );
            return Ok(false);
        }
        if !self.authenticated(repo_path) {
            println!(
                "{}",
                error_message("GitHub CLI is not authenticated; run 'gh auth login' first")
            );
            return Ok(false);
        }

        let name = repository_name(repo_path);
        println!(
            "{}",
            progress_message(cformat!("Creating GitHub repository <bold>{name}</>..."))
        );

        let choice = prompter.choose("Repository visibility:", &["public", "private"])?;
        let visibility = if choice == 0 { "--public" } else { "--private" };
        let description = prompter.input("Repository description (optional)", Some(""))?;

        let mut args = vec![
            "repo",
            "create",
            &name,
            visibility,
            "--source=.",
            "--remote=origin",
            "--push",
        ];
        if !description.is_empty() {
            args.push("--description");
            args.push(&description);
        }

        match self.run(repo_path, &args) {
            Ok(_) => {
                println!(
                    "{}",
                    success_message(cformat!(
                        "Created <bold>{name}</> and pushed the initial state"
                    ))
                );
                Ok(true)
            }
            Err(e) => {
                println!(
                    "{}",
                    error_message(format!("Failed to create the GitHub repository: {e}"))
                );
                Ok(false)
            }
        }
    }

    /// Open the hosted repository page in the default browser. Best effort:
    /// on any failure the URL is printed for manual use and `false` returned.
    pub fn open_in_browser(&self, repo_path: &Path, platform: &PlatformContext) -> bool {
        if !self.available {
            println!(
                "{}",
                warning_message("GitHub CLI unavailable; skipping the browser check")
            );
            return false;
        }
        let Some(login) = self.user_login(repo_path) else {
            println!(
                "{}",
                warning_message("Could not determine the GitHub username")
            );
            return false;
        };

        let name = repository_name(repo_path);
        let url = format!("https://github.com/{login}/{name}");
        println!(
            "{}",
            progress_message("Opening the GitHub repository in your browser...")
        );
        println!("{}", info_message(cformat!("URL: <bold>{url}</>")));

        let (program, args) = platform.browser_command(&url);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        match runner::run_in(repo_path, program, &arg_refs) {
            Ok(_) => {
                println!("{}", success_message("Opened the repository page"));
                true
            }
            Err(e) => {
                log::debug!("browser open failed: {e}");
                println!(
                    "{}",
                    hint_message(format!("Could not open a browser; visit {url} manually"))
                );
                false
            }
        }
    }

    fn run(&self, dir: &Path, args: &[&str]) -> Result<String, runner::CommandError> {
        // gh must never drop into its own interactive prompts underneath us
        runner::run_in_with_env(dir, "gh", args, &[("GH_PROMPT_DISABLED", "1")])
            .map(|output| output.stdout)
    }
}

/// The hosted repository name is the target directory's basename.
pub fn repository_name(repo_path: &Path) -> String {
    repo_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "repository".to_string())
}
