use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failures that abort a whole call. Per-event faults are diagnostics instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgendaError {
    #[error("invalid window: end {to} is not after start {from}")]
    InvalidWindow {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    #[error("window of {days} days from {from} is out of range")]
    WindowOutOfRange { from: DateTime<Utc>, days: u32 },
    #[error("calendar parse error: {0}")]
    Parse(String),
}
