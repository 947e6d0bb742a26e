// File: ./src/agenda.rs
//! Document-level pipeline: expand every event, normalize, rank, classify.

use crate::density::Density;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::expand::expand;
use crate::model::{CalendarDocument, EventDefinition, EventTime, ExpansionWindow, Occurrence};
use crate::normalize::normalize;
use crate::rank::rank;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashMap;

/// What the renderer receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agenda {
    pub occurrences: Vec<Occurrence>,
    /// Relevant occurrences before the limit was applied.
    pub total: usize,
    /// Classified on the displayed count, not on `total`.
    pub density: Density,
    pub diagnostics: Vec<Diagnostic>,
}

fn note_floating(event: &EventDefinition, diagnostics: &mut Diagnostics) {
    let Some(time) = event.floating_times().next() else {
        return;
    };
    let detail = match time {
        EventTime::Zoned { tzid, .. } => format!("unknown TZID '{}'", tzid),
        _ => "floating time".to_string(),
    };
    diagnostics.report(Diagnostic::AmbiguousTimezone {
        uid: event.uid.clone(),
        detail,
    });
}

/// RECURRENCE-ID values of overridden instances, by UID.
fn overridden_instances(document: &CalendarDocument) -> HashMap<&str, Vec<EventTime>> {
    let mut map: HashMap<&str, Vec<EventTime>> = HashMap::new();
    for event in &document.events {
        if let Some(rid) = &event.recurrence_id {
            map.entry(event.uid.as_str()).or_default().push(rid.clone());
        }
    }
    map
}

/// Expand, normalize and rank every event of `document` inside `window`.
///
/// Per-event problems never fail the call; they are returned in
/// `Agenda::diagnostics`.
pub fn build_agenda(
    document: &CalendarDocument,
    window: &ExpansionWindow,
    now: DateTime<Utc>,
    limit: usize,
) -> Agenda {
    let mut diagnostics = Diagnostics::new();
    let overrides = overridden_instances(document);
    let mut occurrences = Vec::new();

    for event in &document.events {
        note_floating(event, &mut diagnostics);

        // A master loses the instances its overrides replace.
        let event = match overrides.get(event.uid.as_str()) {
            Some(ids) if event.recurrence_id.is_none() && event.is_recurring() => {
                let mut master = event.clone();
                master.exdates.extend(ids.iter().cloned());
                Cow::Owned(master)
            }
            _ => Cow::Borrowed(event),
        };

        let candidates = expand(&event, window, &mut diagnostics);
        occurrences.extend(candidates.iter().map(|c| normalize(&event, c)));
    }

    let ranked = rank(occurrences, now, limit);
    let density = Density::classify(ranked.occurrences.len());
    tracing::info!("found {} upcoming events", ranked.total);
    tracing::info!(
        "event count: {}, density class: {}",
        ranked.occurrences.len(),
        density
    );

    Agenda {
        occurrences: ranked.occurrences,
        total: ranked.total,
        density,
        diagnostics: diagnostics.into_vec(),
    }
}
