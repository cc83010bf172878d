//! Style constants and emojis for terminal output.
//!
//! User-facing messages go through `color_print::cformat!` with HTML-like
//! tags. Semantic mapping:
//!
//! - Errors: `<red>...</>`
//! - Warnings: `<yellow>...</>`
//! - Hints: `<dim>...</>`
//! - Progress: `<cyan>...</>`
//! - Success: `<green>...</>`

use std::fmt;

use color_print::cformat;

/// Auto-detecting print macros that respect NO_COLOR, CLICOLOR_FORCE, and
/// terminal capabilities.
pub use anstream::{eprint, eprintln, print, println};

// ============================================================================
// Message Emojis
// ============================================================================

/// Progress emoji: `cformat!("{PROGRESS_EMOJI} <cyan>message</>")`
pub const PROGRESS_EMOJI: &str = "🔄";

/// Success emoji: `cformat!("{SUCCESS_EMOJI} <green>message</>")`
pub const SUCCESS_EMOJI: &str = "✅";

/// Error emoji: `cformat!("{ERROR_EMOJI} <red>message</>")`
pub const ERROR_EMOJI: &str = "❌";

/// Warning emoji: `cformat!("{WARNING_EMOJI} <yellow>message</>")`
pub const WARNING_EMOJI: &str = "🟡";

/// Hint emoji: `cformat!("{HINT_EMOJI} <dim>message</>")`
pub const HINT_EMOJI: &str = "💡";

/// Info emoji - use for neutral status lines
pub const INFO_EMOJI: &str = "⚪";

/// Prompt emoji - use for questions requiring user input
pub const PROMPT_EMOJI: &str = "❓";

// ============================================================================
// Formatted Message Type
// ============================================================================

/// A message that has already been formatted with emoji and styling.
///
/// Message functions take `impl AsRef<str>` and return `FormattedMessage`.
/// Since `FormattedMessage` does NOT implement `AsRef<str>`, passing one back
/// into a message function is a compile error, preventing double-formatting.
#[derive(Debug, Clone)]
pub struct FormattedMessage(String);

impl FormattedMessage {
    /// Borrow the inner string for inspection (e.g., in tests).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormattedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<FormattedMessage> for String {
    fn from(msg: FormattedMessage) -> String {
        msg.0
    }
}

// ============================================================================
// Message Formatting Functions
// ============================================================================

/// Format an error message with emoji and red styling.
///
/// Content can include inner styling like `<bold>`:
/// ```
/// use color_print::cformat;
/// use autopush::styling::error_message;
///
/// let branch = "feature";
/// println!("{}", error_message(cformat!("Branch <bold>{branch}</> not found")));
/// ```
pub fn error_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{ERROR_EMOJI} <red>{}</>", content.as_ref()))
}

/// Format a hint message with emoji and dim styling
pub fn hint_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{HINT_EMOJI} <dim>{}</>", content.as_ref()))
}

/// Format a warning message with emoji and yellow styling
pub fn warning_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{WARNING_EMOJI} <yellow>{}</>", content.as_ref()))
}

/// Format a success message with emoji and green styling
pub fn success_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{SUCCESS_EMOJI} <green>{}</>", content.as_ref()))
}

/// Format a progress message with emoji and cyan styling
pub fn progress_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{PROGRESS_EMOJI} <cyan>{}</>", content.as_ref()))
}

/// Format an info message with emoji (no color - neutral status)
pub fn info_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{INFO_EMOJI} {}", content.as_ref()))
}

/// Format a section heading (cyan text with an optional suffix)
pub fn format_heading(title: &str, suffix: Option<&str>) -> String {
    match suffix {
        Some(s) => cformat!("<cyan>{}</>  {}", title, s),
        None => cformat!("<cyan>{}</>", title),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message() {
        let msg = error_message("Something went wrong");
        assert!(msg.as_str().contains("❌"));
        assert!(msg.as_str().contains("Something went wrong"));
    }

    #[test]
    fn test_success_message() {
        let msg = success_message("Push completed");
        assert!(msg.as_str().contains("✅"));
        assert!(msg.as_str().contains("Push completed"));
    }

    #[test]
    fn test_warning_message() {
        let msg = warning_message("Lock file present");
        assert!(msg.as_str().contains("🟡"));
        assert!(msg.as_str().contains("Lock file present"));
    }

    #[test]
    fn test_format_heading_with_suffix() {
        let heading = format_heading("DIRECTORY ANALYSIS", Some("/work/project"));
        assert!(heading.contains("DIRECTORY ANALYSIS"));
        assert!(heading.contains("/work/project"));
    }
}
