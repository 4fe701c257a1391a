//! Terminal UI utilities for progress indication and styled output.

use std::borrow::Cow;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use irre::{Token, TokenKind};

/// Spinner for indeterminate progress.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    /// Create a new spinner with a message; hidden when `quiet`.
    pub fn new(message: impl Into<Cow<'static, str>>, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };
        let spinner_style = ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    /// Clear the spinner.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// Print a success message to stderr.
pub fn success(message: &str) {
    eprintln!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message to stderr.
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), message);
}

/// Render disassembly tokens, colored when stdout is a terminal.
pub fn styled_tokens(tokens: &[Token]) -> String {
    tokens.iter().map(styled_token).collect()
}

fn styled_token(token: &Token) -> String {
    let text = token.text.as_str();
    match token.kind {
        TokenKind::Mnemonic => style(text).bold().to_string(),
        TokenKind::Register => style(text).cyan().to_string(),
        TokenKind::Integer | TokenKind::SignedInteger => style(text).yellow().to_string(),
        TokenKind::PossibleAddress => style(text).magenta().to_string(),
        TokenKind::Text
        | TokenKind::BeginMemoryOperand
        | TokenKind::EndMemoryOperand
        | TokenKind::OperandSeparator => text.to_string(),
    }
}

/// Dim a listing label or comment.
pub fn dim(text: &str) -> String {
    style(text).dim().to_string()
}
