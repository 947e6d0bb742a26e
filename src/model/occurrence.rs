// File: ./src/model/occurrence.rs
use crate::model::event::EventTime;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A start/end pair produced by the expander, still in the event's own time terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub start: EventTime,
    pub end: Option<EventTime>,
}

/// One concrete event instance with resolved instants.
///
/// Built only by the normalizer. `end > start` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    uid: String,
    summary: String,
    location: Option<String>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    all_day: bool,
}

impl Occurrence {
    pub(crate) fn new(
        uid: String,
        summary: String,
        location: Option<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        all_day: bool,
    ) -> Self {
        debug_assert!(end > start);
        Self {
            uid,
            summary,
            location,
            start,
            end,
            all_day,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn is_all_day(&self) -> bool {
        self.all_day
    }

    /// Started but not yet over.
    pub fn is_in_progress(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now < self.end
    }
}
