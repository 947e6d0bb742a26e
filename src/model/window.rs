// File: ./src/model/window.rs
use crate::error::AgendaError;
use chrono::{DateTime, Duration, Utc};

/// Half-open time range `[from, to)` an expansion is limited to.
///
/// Construction is the only place an empty or inverted window is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionWindow {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl ExpansionWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, AgendaError> {
        if to <= from {
            return Err(AgendaError::InvalidWindow { from, to });
        }
        Ok(Self { from, to })
    }

    /// `[start, start + days)`.
    pub fn days_from(start: DateTime<Utc>, days: u32) -> Result<Self, AgendaError> {
        let to = start
            .checked_add_signed(Duration::days(i64::from(days)))
            .ok_or(AgendaError::WindowOutOfRange { from: start, days })?;
        Self::new(start, to)
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }

    /// Whether `[start, end)` intersects the window.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        end > self.from && start < self.to
    }
}
