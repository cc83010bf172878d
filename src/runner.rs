//! Synchronous external-command execution.
//!
//! Every external invocation in this crate funnels through [`run_in`], which
//! captures output, decodes it through an ordered encoding chain, and returns
//! a discriminated result. Failures never escape as panics; error text rides
//! along in [`CommandError`] so callers decide how to surface it.

use std::path::Path;
use std::process::{Command, Stdio};

/// Captured result of a successfully exited command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit status code (always 0 here; nonzero exits become `CommandError`).
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Why a command invocation produced no usable output.
#[derive(Debug)]
pub enum CommandError {
    /// The process could not be launched at all.
    Launch(String),
    /// The process ran but exited nonzero.
    NonZero { status: i32, stderr: String },
}

impl CommandError {
    /// The diagnostic text to show the user.
    pub fn text(&self) -> &str {
        match self {
            CommandError::Launch(msg) => msg,
            CommandError::NonZero { stderr, .. } => stderr,
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Launch(msg) => write!(f, "failed to launch command: {msg}"),
            CommandError::NonZero { status, stderr } => {
                write!(f, "command exited with status {status}: {}", stderr.trim())
            }
        }
    }
}

impl std::error::Error for CommandError {}

/// Run `program` with `args` in `dir`, blocking until it exits.
///
/// Stdin is detached so external tools can never hang waiting on input meant
/// for our own prompts.
pub fn run_in(dir: &Path, program: &str, args: &[&str]) -> Result<CommandOutput, CommandError> {
    run_in_with_env(dir, program, args, &[])
}

/// [`run_in`] with extra environment variables for the child process.
pub fn run_in_with_env(
    dir: &Path,
    program: &str,
    args: &[&str],
    envs: &[(&str, &str)],
) -> Result<CommandOutput, CommandError> {
    log::debug!("running: {program} {} (in {})", args.join(" "), dir.display());

    let mut cmd = Command::new(program);
    cmd.args(args).current_dir(dir).stdin(Stdio::null());
    for (key, value) in envs {
        cmd.env(key, value);
    }

    let output = cmd
        .output()
        .map_err(|e| CommandError::Launch(e.to_string()))?;

    let stdout = decode_output(&output.stdout);
    let stderr = decode_output(&output.stderr);
    let status = output.status.code().unwrap_or(-1);

    if output.status.success() {
        log::debug!("ok: stdout={:?} stderr={:?}", stdout.trim(), stderr.trim());
        Ok(CommandOutput {
            status,
            stdout,
            stderr,
        })
    } else {
        log::debug!("failed ({status}): {}", stderr.trim());
        Err(CommandError::NonZero { status, stderr })
    }
}

/// Decode captured process output through an ordered encoding chain.
///
/// UTF-8 is tried strictly first. Legacy console encodings follow for output
/// produced by tools configured for non-UTF-8 code pages (cp932 is the
/// Windows-likely candidate, Latin-1 the catch-all single-byte one). The
/// final lossy UTF-8 pass never fails.
pub fn decode_output(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_owned();
    }

    for encoding in [encoding_rs::SHIFT_JIS, encoding_rs::WINDOWS_1252] {
        let (text, _, had_errors) = encoding.decode(bytes);
        if !had_errors {
            return text.into_owned();
        }
    }

    String::from_utf8_lossy(bytes).into_owned()
}
