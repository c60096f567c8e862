//! Status reporting.
//!
//! Reconciliation reports one line per resource through a [`Reporter`], so
//! the library never writes to stdout itself.

use std::fmt;

/// What happened to a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The resource did not exist and was created.
    Created,
    /// The resource existed and was replaced or updated.
    Configured,
    /// The resource already matched.
    Unchanged,
    /// The resource was removed.
    Deleted,
}

impl Action {
    /// Lower-case word used in status lines.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Configured => "configured",
            Self::Unchanged => "unchanged",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `<kind>/<name> <action>` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// Lower-case kind.
    pub kind: String,
    /// Display name, e.g. `web` or `web/s1`.
    pub name: String,
    /// What happened.
    pub action: Action,
}

impl StatusLine {
    /// Build a status line.
    pub fn new(kind: impl Into<String>, name: impl Into<String>, action: Action) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            action,
        }
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} {}", self.kind, self.name, self.action)
    }
}

/// Receives status lines and preview text.
pub trait Reporter {
    /// A resource reached a final state.
    fn status(&mut self, line: &StatusLine);

    /// Free-form output (previews, notices).
    fn message(&mut self, text: &str);
}

/// Keeps everything in memory.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    /// Status lines in order.
    pub lines: Vec<StatusLine>,
    /// Messages in order.
    pub messages: Vec<String>,
}

impl RecordingReporter {
    /// Status lines rendered as text.
    #[must_use]
    pub fn rendered(&self) -> Vec<String> {
        self.lines.iter().map(ToString::to_string).collect()
    }
}

impl Reporter for RecordingReporter {
    fn status(&mut self, line: &StatusLine) {
        self.lines.push(line.clone());
    }

    fn message(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }
}
