//! Colored terminal output.

use console::{Style, Term};

/// Diagnostic writer on standard error.
///
/// Standard output carries the book, so nothing here ever writes to it.
pub(crate) struct Output {
    term: Term,
    red: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            red: Style::new().red(),
        }
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }
}
