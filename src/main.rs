use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use autopush::github::GitHubClient;
use autopush::platform::PlatformContext;
use autopush::prompt::TerminalPrompter;
use autopush::styling::{error_message, println};
use autopush::workflow::{PushOptions, Workflow};

/// Interactive git publish assistant: analyze, init, sync, commit, push.
#[derive(Parser, Debug)]
#[command(name = "autopush", version, long_about = None)]
struct Cli {
    /// Directory to publish
    path: PathBuf,

    /// Commit message (skips the interactive prompt)
    #[arg(short, long)]
    message: Option<String>,

    /// Branch to push (skips the interactive prompt)
    #[arg(short, long)]
    branch: Option<String>,

    /// Force the first push attempt
    #[arg(short, long)]
    force: bool,

    /// Enable debug diagnostics on stderr
    #[arg(short, long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let platform = PlatformContext::detect();
    log::debug!("platform: {platform:?}");

    let github = GitHubClient::detect();
    let prompter = TerminalPrompter;
    let options = PushOptions {
        message: cli.message,
        branch: cli.branch,
        force: cli.force,
    };

    let workflow = Workflow::new(&cli.path, platform, github, &prompter, options);
    match workflow.run() {
        Ok(outcome) if outcome.succeeded => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            println!("{}", error_message(format!("{e:#}")));
            ExitCode::FAILURE
        }
    }
}
