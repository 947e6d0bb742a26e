// File: ./src/normalize.rs
//! Turns expanded candidates into absolute UTC instants.
//!
//! Floating values (no zone) and values with an unknown TZID are read as UTC.
//! The same rule applies to every field of every event; nothing is guessed
//! per call site.
//!
//! All-day events start at 00:00 UTC on their date and end at 23:59:59.999 UTC
//! on their last day. A DTEND date is exclusive, so `DTEND;VALUE=DATE:20240602`
//! on a 2024-06-01 event still ends on 2024-06-01.

use crate::model::{Candidate, EventDefinition, EventTime, Occurrence};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Length given to timed events that lack a usable end.
pub fn default_duration() -> Duration {
    Duration::hours(1)
}

pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Last representable millisecond of `date`.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date + Duration::days(1)) - Duration::milliseconds(1)
}

/// Resolve a local wall-clock time in `tz`.
///
/// Folds pick the earlier instant, gaps move forward by one hour.
pub fn resolve_local<T: TimeZone>(tz: &T, local: &NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(local)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(*local + Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| local.and_utc())
}

/// The instant a value denotes. Dates map to midnight.
pub fn resolve(time: &EventTime) -> DateTime<Utc> {
    match time {
        EventTime::Date(d) => start_of_day(*d),
        EventTime::Floating(local) => local.and_utc(),
        EventTime::Utc(dt) => *dt,
        EventTime::Zoned { local, tzid } => match tzid.parse::<Tz>() {
            Ok(tz) => resolve_local(&tz, local),
            Err(_) => local.and_utc(),
        },
    }
}

fn date_of(time: &EventTime) -> NaiveDate {
    match time {
        EventTime::Date(d) => *d,
        other => resolve(other).date_naive(),
    }
}

/// Start and end instants of a candidate, with the default-end rules applied.
///
/// The returned end is always strictly after the start.
pub fn span(candidate: &Candidate, all_day: bool) -> (DateTime<Utc>, DateTime<Utc>) {
    if all_day {
        let day = date_of(&candidate.start);
        let last_day = match candidate.end.as_ref().map(date_of) {
            Some(end) if end > day => end - Duration::days(1),
            _ => day,
        };
        (start_of_day(day), end_of_day(last_day))
    } else {
        let start = resolve(&candidate.start);
        let end = candidate
            .end
            .as_ref()
            .map(resolve)
            .filter(|end| *end > start)
            .unwrap_or(start + default_duration());
        (start, end)
    }
}

/// Build the final occurrence for one candidate of `event`.
pub fn normalize(event: &EventDefinition, candidate: &Candidate) -> Occurrence {
    let all_day = event.is_all_day();
    let (start, end) = span(candidate, all_day);
    Occurrence::new(
        event.uid.clone(),
        event.summary.clone(),
        event.location.clone(),
        start,
        end,
        all_day,
    )
}
