//! Colored terminal output.

use console::{Style, Term};

/// Terminal output formatter writing to stderr.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
    dim: Style,
    cyan_bold: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            dim: Style::new().dim(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Section heading (cyan bold).
    pub(crate) fn highlight(&self, msg: &str) {
        let _ = self.term.write_line(&self.cyan_bold.apply_to(msg).to_string());
    }

    /// `name: yes/no` status line.
    pub(crate) fn flag(&self, name: &str, enabled: bool) {
        let line = if enabled {
            format!("  {name}: {}", self.green.apply_to("yes"))
        } else {
            format!("  {name}: {}", self.dim.apply_to("no"))
        };
        let _ = self.term.write_line(&line);
    }
}
