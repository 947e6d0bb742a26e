// File: ./src/model/adapter.rs
// Maps an icalendar document onto event definitions
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::AgendaError;
use crate::model::event::{CalendarDocument, EventDefinition, EventTime};
use chrono::Duration;
use icalendar::{Calendar, CalendarComponent, Component, Event, Property};

const MULTI_VALUED: [&str; 2] = ["RDATE", "EXDATE"];

/// Parse an ISO-8601 duration such as `PT1H30M`, `P2D` or `-P1W`.
pub fn parse_duration(val: &str) -> Option<Duration> {
    let val = val.trim();
    let (negative, body) = match val.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, val.strip_prefix('+').unwrap_or(val)),
    };
    let body = body.strip_prefix('P')?;

    let mut seconds: i64 = 0;
    let mut num_buf = String::new();
    let mut in_time = false;
    for c in body.chars() {
        if c == 'T' {
            in_time = true;
        } else if c.is_ascii_digit() {
            num_buf.push(c);
        } else {
            let n = num_buf.parse::<i64>().ok()?;
            num_buf.clear();
            let unit = match (c, in_time) {
                ('W', false) => 7 * 24 * 3600,
                ('D', false) => 24 * 3600,
                ('H', true) => 3600,
                ('M', true) => 60,
                ('S', true) => 1,
                _ => return None,
            };
            seconds = seconds.checked_add(n.checked_mul(unit)?)?;
        }
    }
    if !num_buf.is_empty() {
        return None;
    }
    let d = Duration::try_seconds(seconds)?;
    Some(if negative { -d } else { d })
}

/// All date values of a property, honoring its TZID parameter.
fn time_values(prop: &Property) -> Vec<EventTime> {
    let params = prop.params();
    if params
        .get("VALUE")
        .is_some_and(|p| p.value().eq_ignore_ascii_case("PERIOD"))
    {
        return Vec::new();
    }
    let tzid = params.get("TZID").map(|p| p.value());
    prop.value()
        .split(',')
        .filter_map(|v| EventTime::parse(v, tzid))
        .collect()
}

/// Same as `time_values`, for a raw `NAME;PARAMS:VALUE` content line.
fn raw_time_values(line: &str) -> Option<(String, Vec<EventTime>)> {
    let (key_part, value) = line.split_once(':')?;
    let mut parts = key_part.split(';');
    let name = parts.next()?.trim().to_uppercase();
    let mut tzid = None;
    for param in parts {
        if let Some((k, v)) = param.split_once('=') {
            match k.trim().to_uppercase().as_str() {
                "TZID" => tzid = Some(v.trim().trim_matches('"')),
                "VALUE" if v.trim().eq_ignore_ascii_case("PERIOD") => {
                    return Some((name, Vec::new()));
                }
                _ => {}
            }
        }
    }
    let values = value
        .split(',')
        .filter_map(|v| EventTime::parse(v, tzid))
        .collect();
    Some((name, values))
}

/// Content lines of every top-level VEVENT, in document order.
///
/// The component model keeps only one property per name, so repeated
/// RDATE/EXDATE lines are recovered from here.
fn raw_vevent_blocks(raw_ics: &str) -> Vec<Vec<String>> {
    // Unfold lines (remove CRLF+Space)
    let unfolded = raw_ics
        .replace("\r\n ", "")
        .replace("\r\n\t", "")
        .replace("\n ", "")
        .replace("\n\t", "");

    let mut blocks = Vec::new();
    let mut current: Option<Vec<String>> = None;
    let mut depth = 0usize;
    for line in unfolded.lines() {
        let line = line.trim_end_matches('\r');
        let upper = line.to_uppercase();
        if current.is_none() {
            if upper == "BEGIN:VEVENT" {
                current = Some(Vec::new());
                depth = 0;
            }
            continue;
        }
        if upper.starts_with("BEGIN:") {
            depth += 1;
        } else if upper == "END:VEVENT" && depth == 0 {
            blocks.extend(current.take());
        } else if upper.starts_with("END:") {
            depth = depth.saturating_sub(1);
        } else if depth == 0
            && let Some(lines) = current.as_mut()
        {
            lines.push(line.to_string());
        }
    }
    blocks
}

fn single_value(event: &Event, key: &str) -> Option<String> {
    event
        .properties()
        .get(key)
        .map(|p| p.value().trim().to_string())
        .filter(|v| !v.is_empty())
}

fn first_time(event: &Event, key: &str) -> Option<EventTime> {
    event
        .properties()
        .get(key)
        .and_then(|p| time_values(p).into_iter().next())
}

fn push_all(target: &mut Vec<EventTime>, values: impl IntoIterator<Item = EventTime>) {
    for v in values {
        if !target.contains(&v) {
            target.push(v);
        }
    }
}

impl EventDefinition {
    /// Build a definition from one VEVENT.
    ///
    /// `raw_lines` are the event's own content lines when available.
    pub fn from_vevent(event: &Event, raw_lines: Option<&[String]>) -> Result<Self, String> {
        let uid = single_value(event, "UID").unwrap_or_default();

        let start = match event.properties().get("DTSTART") {
            Some(prop) => time_values(prop)
                .into_iter()
                .next()
                .ok_or_else(|| format!("unreadable DTSTART '{}'", prop.value()))?,
            None => return Err("missing DTSTART".to_string()),
        };

        let end = match first_time(event, "DTEND") {
            Some(end) => Some(end),
            None => match single_value(event, "DURATION")
                .and_then(|d| parse_duration(&d))
                .filter(|d| *d > Duration::zero())
            {
                Some(d) => Some(
                    start
                        .shifted(d)
                        .ok_or_else(|| "DURATION out of range".to_string())?,
                ),
                None => None,
            },
        };

        let mut rdates = Vec::new();
        let mut exdates = Vec::new();
        for key in MULTI_VALUED {
            let target = if key == "RDATE" {
                &mut rdates
            } else {
                &mut exdates
            };
            if let Some(multi) = event.multi_properties().get(key) {
                for prop in multi {
                    push_all(target, time_values(prop));
                }
            }
            if let Some(prop) = event.properties().get(key) {
                push_all(target, time_values(prop));
            }
        }
        // Manual Parse (Fallback for lost duplicates)
        for line in raw_lines.unwrap_or_default() {
            if let Some((name, values)) = raw_time_values(line) {
                match name.as_str() {
                    "RDATE" => push_all(&mut rdates, values),
                    "EXDATE" => push_all(&mut exdates, values),
                    _ => {}
                }
            }
        }

        Ok(EventDefinition {
            uid,
            summary: single_value(event, "SUMMARY").unwrap_or_else(|| "No Title".to_string()),
            location: single_value(event, "LOCATION"),
            start,
            end,
            rrule: single_value(event, "RRULE"),
            rdates,
            exdates,
            recurrence_id: first_time(event, "RECURRENCE-ID"),
        })
    }
}

impl CalendarDocument {
    /// Parse raw iCalendar text into a document.
    ///
    /// Events that cannot be read are skipped and reported; only text the
    /// parser rejects as a whole is an error.
    pub fn from_ics(raw_ics: &str, diagnostics: &mut Diagnostics) -> Result<Self, AgendaError> {
        let calendar: Calendar = raw_ics
            .parse()
            .map_err(|e| AgendaError::Parse(format!("{}", e)))?;
        let blocks = raw_vevent_blocks(raw_ics);

        let vevents = calendar.components.iter().filter_map(|c| match c {
            CalendarComponent::Event(e) => Some(e),
            _ => None,
        });

        let mut events = Vec::new();
        for (index, vevent) in vevents.enumerate() {
            match EventDefinition::from_vevent(vevent, blocks.get(index).map(Vec::as_slice)) {
                Ok(mut def) => {
                    if def.uid.is_empty() {
                        def.uid = format!("event-{}", index);
                    }
                    events.push(def);
                }
                Err(reason) => diagnostics.report(Diagnostic::SkippedEvent {
                    uid: single_value(vevent, "UID"),
                    reason,
                }),
            }
        }
        tracing::debug!("parsed {} events", events.len());
        Ok(CalendarDocument::new(events))
    }
}
