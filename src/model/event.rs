// File: ./src/model/event.rs
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

/// A DTSTART/DTEND-style value exactly as the calendar document states it.
///
/// Nothing is resolved here: a floating time stays floating and a zoned time
/// keeps its TZID until the normalizer turns it into an instant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTime {
    /// Date-only value, used by all-day events.
    Date(NaiveDate),
    /// Local time without any zone information.
    Floating(NaiveDateTime),
    /// Absolute time (`...Z`).
    Utc(DateTime<Utc>),
    /// Local wall-clock time in a named zone (`TZID=...`).
    Zoned { local: NaiveDateTime, tzid: String },
}

impl EventTime {
    /// Parse a DATE or DATE-TIME value, using `tzid` for non-UTC local times.
    pub fn parse(value: &str, tzid: Option<&str>) -> Option<EventTime> {
        let val = value.trim();
        if val.len() == 8 {
            return NaiveDate::parse_from_str(val, "%Y%m%d")
                .ok()
                .map(EventTime::Date);
        }
        if let Some(stripped) = val.strip_suffix('Z') {
            return NaiveDateTime::parse_from_str(stripped, "%Y%m%dT%H%M%S")
                .ok()
                .map(|d| EventTime::Utc(d.and_utc()));
        }
        let local = NaiveDateTime::parse_from_str(val, "%Y%m%dT%H%M%S").ok()?;
        Some(match tzid {
            Some(tz) if !tz.is_empty() => EventTime::Zoned {
                local,
                tzid: tz.trim_matches('"').to_string(),
            },
            _ => EventTime::Floating(local),
        })
    }

    pub fn is_date(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }

    /// True when the value needs the reference-zone policy to become an instant.
    pub fn is_floating(&self) -> bool {
        match self {
            EventTime::Floating(_) => true,
            EventTime::Zoned { tzid, .. } => tzid.parse::<chrono_tz::Tz>().is_err(),
            _ => false,
        }
    }

    /// Shift by a nominal duration, keeping the value kind.
    ///
    /// Dates move by whole days; zoned values move on the wall clock.
    /// `None` when the result leaves the representable range.
    pub fn shifted(&self, by: Duration) -> Option<EventTime> {
        Some(match self {
            EventTime::Date(d) => {
                EventTime::Date(d.checked_add_signed(Duration::days(by.num_days()))?)
            }
            EventTime::Floating(dt) => EventTime::Floating(dt.checked_add_signed(by)?),
            EventTime::Utc(dt) => EventTime::Utc(dt.checked_add_signed(by)?),
            EventTime::Zoned { local, tzid } => EventTime::Zoned {
                local: local.checked_add_signed(by)?,
                tzid: tzid.clone(),
            },
        })
    }
}

/// One VEVENT, reduced to what recurrence expansion needs.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDefinition {
    pub uid: String,
    pub summary: String,
    pub location: Option<String>,
    pub start: EventTime,
    pub end: Option<EventTime>,
    /// Raw RRULE value. Interpreted (and possibly rejected) at expansion time.
    pub rrule: Option<String>,
    pub rdates: Vec<EventTime>,
    pub exdates: Vec<EventTime>,
    /// Set on overridden instances of a recurring event.
    pub recurrence_id: Option<EventTime>,
}

impl EventDefinition {
    pub fn new(uid: &str, summary: &str, start: EventTime) -> Self {
        Self {
            uid: uid.to_string(),
            summary: summary.to_string(),
            location: None,
            start,
            end: None,
            rrule: None,
            rdates: Vec::new(),
            exdates: Vec::new(),
            recurrence_id: None,
        }
    }

    pub fn is_all_day(&self) -> bool {
        self.start.is_date()
    }

    pub fn is_recurring(&self) -> bool {
        self.rrule.is_some()
    }

    /// Times that fall back to the reference zone, in document order.
    pub fn floating_times(&self) -> impl Iterator<Item = &EventTime> {
        std::iter::once(&self.start)
            .chain(self.end.iter())
            .chain(self.rdates.iter())
            .chain(self.exdates.iter())
            .filter(|t| t.is_floating())
    }
}

/// An already-parsed calendar: an ordered list of event definitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalendarDocument {
    pub events: Vec<EventDefinition>,
}

impl CalendarDocument {
    pub fn new(events: Vec<EventDefinition>) -> Self {
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
