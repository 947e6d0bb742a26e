// File: ./src/diagnostics.rs
// Per-event problems reported next to the results instead of failing the call.
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The event's RRULE could not be used; it was expanded as a single event.
    MalformedRecurrence { uid: String, reason: String },
    /// The rule produced more instances inside the window than are kept.
    TruncatedRecurrence { uid: String, limit: usize },
    /// A floating time or unknown TZID was read as UTC.
    AmbiguousTimezone { uid: String, detail: String },
    /// The VEVENT could not be turned into an event definition at all.
    SkippedEvent { uid: Option<String>, reason: String },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::AmbiguousTimezone { .. } => Severity::Info,
            Diagnostic::MalformedRecurrence { .. }
            | Diagnostic::TruncatedRecurrence { .. }
            | Diagnostic::SkippedEvent { .. } => Severity::Warning,
        }
    }

    /// Forward to the log at the matching level.
    pub(crate) fn emit(&self) {
        match self.severity() {
            Severity::Warning => tracing::warn!("{}", self),
            Severity::Info => tracing::info!("{}", self),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MalformedRecurrence { uid, reason } => {
                write!(f, "event {uid}: recurrence ignored ({reason})")
            }
            Diagnostic::TruncatedRecurrence { uid, limit } => {
                write!(f, "event {uid}: recurrence stopped after {limit} instances")
            }
            Diagnostic::AmbiguousTimezone { uid, detail } => {
                write!(f, "event {uid}: {detail}, interpreted as UTC")
            }
            Diagnostic::SkippedEvent { uid: Some(uid), reason } => {
                write!(f, "event {uid} skipped: {reason}")
            }
            Diagnostic::SkippedEvent { uid: None, reason } => {
                write!(f, "event skipped: {reason}")
            }
        }
    }
}

/// Collector handed through the pipeline.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        diagnostic.emit();
        self.entries.push(diagnostic);
    }

    /// Append entries that were already logged when first reported.
    pub fn extend(&mut self, other: impl IntoIterator<Item = Diagnostic>) {
        self.entries.extend(other);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
