//! User interaction seam.
//!
//! The orchestrator only talks to [`Prompter`], so its decision logic can be
//! unit-tested with a scripted responder instead of a terminal. Prompts go
//! to stderr (answers arrive on stdin), keeping stdout clean for piping.

use std::io::{self, BufRead, Write};

use color_print::cformat;

use crate::styling::{PROMPT_EMOJI, eprint, eprintln};

/// Interactive prompt surface: confirmations, choice menus, text input.
pub trait Prompter {
    /// Yes/no confirmation. Loops until a valid answer; EOF counts as "no"
    /// so a detached stdin terminates the workflow instead of hanging it.
    fn confirm(&self, question: &str) -> io::Result<bool>;

    /// Numbered choice menu; returns the selected index. Loops until valid.
    fn choose(&self, question: &str, options: &[&str]) -> io::Result<usize>;

    /// Free-text input with an optional default shown in brackets.
    fn input(&self, prompt: &str, default: Option<&str>) -> io::Result<String>;

    /// Block until the user presses Enter (conflict-resolution handoff).
    fn wait_for_enter(&self, prompt: &str) -> io::Result<()>;
}

/// Terminal-backed [`Prompter`] reading stdin line by line.
pub struct TerminalPrompter;

impl TerminalPrompter {
    fn read_line(&self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let bytes = io::stdin().lock().read_line(&mut line)?;
        if bytes == 0 {
            Ok(None) // EOF
        } else {
            Ok(Some(line.trim().to_string()))
        }
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&self, question: &str) -> io::Result<bool> {
        loop {
            eprint!("{}", cformat!("{PROMPT_EMOJI} {question} <bold>[y/n]</> "));
            io::stderr().flush()?;

            let Some(answer) = self.read_line()? else {
                eprintln!();
                return Ok(false);
            };
            match answer.to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => eprintln!("Please answer 'y' or 'n'"),
            }
        }
    }

    fn choose(&self, question: &str, options: &[&str]) -> io::Result<usize> {
        eprintln!("{question}");
        for (i, option) in options.iter().enumerate() {
            eprintln!("  {}. {option}", i + 1);
        }
        loop {
            eprint!("{PROMPT_EMOJI} Choice (1-{}): ", options.len());
            io::stderr().flush()?;

            let Some(answer) = self.read_line()? else {
                eprintln!();
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "stdin closed while waiting for a menu choice",
                ));
            };
            if let Ok(n) = answer.parse::<usize>()
                && (1..=options.len()).contains(&n)
            {
                return Ok(n - 1);
            }
            eprintln!("Please choose a number between 1 and {}", options.len());
        }
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> io::Result<String> {
        match default {
            Some(value) if !value.is_empty() => {
                eprint!("{PROMPT_EMOJI} {prompt} [{value}]: ");
            }
            _ => eprint!("{PROMPT_EMOJI} {prompt}: "),
        }
        io::stderr().flush()?;

        let answer = self.read_line()?.unwrap_or_default();
        if answer.is_empty() {
            Ok(default.unwrap_or_default().to_string())
        } else {
            Ok(answer)
        }
    }

    fn wait_for_enter(&self, prompt: &str) -> io::Result<()> {
        eprint!("{prompt} ");
        io::stderr().flush()?;
        let _ = self.read_line()?;
        Ok(())
    }
}
