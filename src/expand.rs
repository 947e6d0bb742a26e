// File: ./src/expand.rs
//! Recurrence expansion for a single event definition.
//!
//! Rule stepping is delegated to `rrule`; this module decides which instants
//! belong to the event inside a window: DTSTART, rule instances, RDATEs, minus
//! EXDATEs, deduplicated by start instant.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::model::{
    Bound, ByDay, Candidate, EventDefinition, EventTime, ExpansionWindow, Frequency, Recurrence,
    RecurrenceError,
};
use crate::normalize::{end_of_day, resolve, span};
use chrono::{DateTime, Duration, Utc, Weekday};
use rrule::RRuleSet;
use std::collections::{BTreeMap, HashSet};

/// Upper bound on rule instances kept per event inside one window.
///
/// Instances before the window are stepped over without counting.
pub const MAX_STEPS: usize = 100_000;

/// Expand `event` into the candidates that intersect `window`, ordered by start.
///
/// A rule that cannot be interpreted is reported to `diagnostics` and the event
/// is treated as non-recurring.
pub fn expand(
    event: &EventDefinition,
    window: &ExpansionWindow,
    diagnostics: &mut Diagnostics,
) -> Vec<Candidate> {
    let Some(text) = event.rrule.as_deref() else {
        return single(event, window);
    };

    match text
        .parse::<Recurrence>()
        .and_then(|rule| recurrence_set(event, &rule))
    {
        Ok(set) => expand_set(event, set.as_ref(), window, diagnostics),
        Err(e) => {
            diagnostics.report(Diagnostic::MalformedRecurrence {
                uid: event.uid.clone(),
                reason: e.to_string(),
            });
            single(event, window)
        }
    }
}

fn single(event: &EventDefinition, window: &ExpansionWindow) -> Vec<Candidate> {
    let candidate = Candidate {
        start: event.start.clone(),
        end: event.end.clone(),
    };
    let (start, end) = span(&candidate, event.is_all_day());
    if window.overlaps(start, end) {
        vec![candidate]
    } else {
        vec![]
    }
}

/// Offset between base start and base end, if the source gives a usable one.
fn base_offset(event: &EventDefinition) -> Option<Duration> {
    let end = event.end.as_ref()?;
    match (&event.start, end) {
        (EventTime::Date(s), EventTime::Date(e)) => {
            let days = (*e - *s).num_days();
            (days > 0).then(|| Duration::days(days))
        }
        (start, end) => {
            let (s, e) = (resolve(start), resolve(end));
            (e > s).then(|| e - s)
        }
    }
}

fn candidate_at(start: EventTime, offset: Option<Duration>) -> Candidate {
    let end = offset.and_then(|d| start.shifted(d));
    Candidate { start, end }
}

fn known_zone(time: &EventTime) -> Option<chrono_tz::Tz> {
    match time {
        EventTime::Zoned { tzid, .. } => tzid.parse().ok(),
        _ => None,
    }
}

/// Instant an UNTIL value stands for, read in the event's own zone when it has one.
fn until_instant(until: &EventTime, start: &EventTime) -> DateTime<Utc> {
    let in_start_zone = |local| match start {
        EventTime::Zoned { tzid, .. } => resolve(&EventTime::Zoned {
            local,
            tzid: tzid.clone(),
        }),
        _ => resolve(&EventTime::Floating(local)),
    };
    match until {
        EventTime::Date(d) => in_start_zone(end_of_day(*d).naive_utc()),
        EventTime::Floating(local) => in_start_zone(*local),
        other => resolve(other),
    }
}

fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Canonical RRULE text for a validated rule. UNTIL is always emitted in UTC.
fn rule_text(rule: &Recurrence, until: Option<DateTime<Utc>>) -> String {
    let freq = match rule.frequency {
        Frequency::Yearly => "YEARLY",
        Frequency::Monthly => "MONTHLY",
        Frequency::Weekly => "WEEKLY",
        Frequency::Daily => "DAILY",
        Frequency::Hourly => "HOURLY",
    };
    let mut parts = vec![
        format!("FREQ={}", freq),
        format!("INTERVAL={}", rule.interval),
        format!("WKST={}", weekday_code(rule.week_start)),
    ];
    match (&rule.bound, until) {
        (Bound::Count(n), _) => parts.push(format!("COUNT={}", n)),
        (Bound::Until(_), Some(u)) => parts.push(format!("UNTIL={}", u.format("%Y%m%dT%H%M%SZ"))),
        _ => {}
    }
    if !rule.by_day.is_empty() {
        let days: Vec<String> = rule
            .by_day
            .iter()
            .map(|ByDay { nth, weekday }| match nth {
                Some(n) => format!("{}{}", n, weekday_code(*weekday)),
                None => weekday_code(*weekday).to_string(),
            })
            .collect();
        parts.push(format!("BYDAY={}", days.join(",")));
    }
    let lists = [
        ("BYMONTHDAY", join(&rule.by_month_day)),
        ("BYMONTH", join(&rule.by_month)),
        ("BYYEARDAY", join(&rule.by_year_day)),
        ("BYWEEKNO", join(&rule.by_week_no)),
        ("BYSETPOS", join(&rule.by_set_pos)),
        ("BYHOUR", join(&rule.by_hour)),
        ("BYMINUTE", join(&rule.by_minute)),
    ];
    for (name, values) in lists {
        if !values.is_empty() {
            parts.push(format!("{}={}", name, values));
        }
    }
    parts.join(";")
}

/// Build the `rrule` set for a typed rule anchored at the event's start.
///
/// Stepping happens on the wall clock of the event's zone; floating and
/// all-day starts step in UTC. `None` means the rule ends before it starts,
/// which leaves DTSTART as the only instance.
fn recurrence_set(
    event: &EventDefinition,
    rule: &Recurrence,
) -> Result<Option<RRuleSet>, RecurrenceError> {
    let base = resolve(&event.start);
    let dtstart = match known_zone(&event.start) {
        Some(tz) => format!(
            "DTSTART;TZID={}:{}",
            tz.name(),
            base.with_timezone(&tz).format("%Y%m%dT%H%M%S")
        ),
        None => format!("DTSTART:{}", base.format("%Y%m%dT%H%M%SZ")),
    };
    let until = match &rule.bound {
        Bound::Until(u) => Some(until_instant(u, &event.start)),
        _ => None,
    };
    if until.is_some_and(|u| u < base) {
        return Ok(None);
    }
    let text = format!("{}\nRRULE:{}", dtstart, rule_text(rule, until));
    text.parse::<RRuleSet>()
        .map(Some)
        .map_err(|e| RecurrenceError::Rejected(e.to_string()))
}

/// Re-express an `rrule` instant in the same terms as the event's DTSTART.
fn as_event_time(base: &EventTime, dt: &DateTime<rrule::Tz>) -> EventTime {
    match base {
        EventTime::Date(_) => EventTime::Date(dt.date_naive()),
        EventTime::Floating(_) => EventTime::Floating(dt.naive_local()),
        EventTime::Utc(_) => EventTime::Utc(dt.with_timezone(&Utc)),
        EventTime::Zoned { tzid, .. } => EventTime::Zoned {
            local: dt.naive_local(),
            tzid: tzid.clone(),
        },
    }
}

fn expand_set(
    event: &EventDefinition,
    set: Option<&RRuleSet>,
    window: &ExpansionWindow,
    diagnostics: &mut Diagnostics,
) -> Vec<Candidate> {
    let all_day = event.is_all_day();
    let offset = base_offset(event);
    let inception = span(&candidate_at(event.start.clone(), offset), all_day).0;

    // Keyed by normalized start: one candidate per instant.
    let mut by_start: BTreeMap<DateTime<Utc>, Candidate> = BTreeMap::new();

    // DTSTART is always the first instance, whatever the BY-parts select.
    by_start.insert(inception, candidate_at(event.start.clone(), offset));

    let mut kept = 0usize;
    for dt in set.into_iter().flatten() {
        let candidate = candidate_at(as_event_time(&event.start, &dt), offset);
        let (start, end) = span(&candidate, all_day);
        if start >= window.to() {
            break;
        }
        if end <= window.from() {
            continue;
        }
        if kept == MAX_STEPS {
            diagnostics.report(Diagnostic::TruncatedRecurrence {
                uid: event.uid.clone(),
                limit: MAX_STEPS,
            });
            break;
        }
        kept += 1;
        by_start.entry(start).or_insert(candidate);
    }

    for rdate in &event.rdates {
        let candidate = candidate_at(rdate.clone(), offset);
        let start = span(&candidate, all_day).0;
        if start >= inception && start < window.to() {
            by_start.entry(start).or_insert(candidate);
        }
    }

    let excluded: HashSet<DateTime<Utc>> = event
        .exdates
        .iter()
        .map(|ex| span(&candidate_at(ex.clone(), None), all_day).0)
        .collect();

    by_start
        .into_iter()
        .filter(|(start, _)| !excluded.contains(start))
        .filter(|(_, candidate)| {
            let (start, end) = span(candidate, all_day);
            window.overlaps(start, end)
        })
        .map(|(_, candidate)| candidate)
        .collect()
}
