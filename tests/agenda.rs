use chrono::{DateTime, Duration, TimeZone, Utc};
use icsboard::{
    AgendaError, CalendarDocument, Density, Diagnostic, Diagnostics, ExpansionWindow, build_agenda,
};

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// Wrap VEVENT bodies into a calendar, CRLF-terminated.
fn ics(events: &[&[&str]]) -> String {
    let mut lines = vec!["BEGIN:VCALENDAR", "VERSION:2.0", "PRODID:-//icsboard//tests//EN"];
    for event in events {
        lines.push("BEGIN:VEVENT");
        lines.extend_from_slice(event);
        lines.push("END:VEVENT");
    }
    lines.push("END:VCALENDAR");
    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}

fn parse(raw: &str) -> (CalendarDocument, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let doc = CalendarDocument::from_ics(raw, &mut diagnostics).unwrap();
    (doc, diagnostics)
}

#[test]
fn test_daily_event_hides_elapsed_instances() {
    let raw = ics(&[&[
        "UID:standup",
        "SUMMARY:Standup",
        "DTSTART:20240609T090000Z",
        "RRULE:FREQ=DAILY",
    ]]);
    let (doc, _) = parse(&raw);
    let today = utc(2024, 6, 10, 0, 0);
    let window = ExpansionWindow::days_from(today, 30).unwrap();
    let now = utc(2024, 6, 10, 10, 30);

    let agenda = build_agenda(&doc, &window, now, 100);
    assert_eq!(agenda.occurrences[0].start(), utc(2024, 6, 11, 9, 0));
    assert_eq!(agenda.occurrences[0].end(), utc(2024, 6, 11, 10, 0));
    assert_eq!(agenda.total, 29);
}

#[test]
fn test_in_progress_instance_stays_visible() {
    let raw = ics(&[&[
        "UID:standup",
        "SUMMARY:Standup",
        "DTSTART:20240609T090000Z",
        "RRULE:FREQ=DAILY",
    ]]);
    let (doc, _) = parse(&raw);
    let window = ExpansionWindow::days_from(utc(2024, 6, 10, 0, 0), 30).unwrap();
    let now = utc(2024, 6, 10, 9, 30);

    let agenda = build_agenda(&doc, &window, now, 5);
    let first = &agenda.occurrences[0];
    assert_eq!(first.start(), utc(2024, 6, 10, 9, 0));
    assert!(first.is_in_progress(now));
}

#[test]
fn test_all_day_event_spans_its_date() {
    let raw = ics(&[&[
        "UID:fair",
        "SUMMARY:Summer fair",
        "LOCATION:Town square",
        "DTSTART;VALUE=DATE:20240601",
    ]]);
    let (doc, _) = parse(&raw);
    let window = ExpansionWindow::new(utc(2024, 6, 1, 0, 0), utc(2024, 7, 1, 0, 0)).unwrap();

    let agenda = build_agenda(&doc, &window, utc(2024, 6, 1, 8, 0), 5);
    assert_eq!(agenda.occurrences.len(), 1);
    let occ = &agenda.occurrences[0];
    assert!(occ.is_all_day());
    assert_eq!(occ.location(), Some("Town square"));
    assert_eq!(occ.start(), utc(2024, 6, 1, 0, 0));
    assert_eq!(
        occ.end().format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
        "2024-06-01T23:59:59.999"
    );
}

#[test]
fn test_truncated_list_is_classified_on_what_is_shown() {
    let raw = ics(&[&[
        "UID:eight",
        "SUMMARY:Eight",
        "DTSTART:20240601T090000Z",
        "RRULE:FREQ=DAILY;COUNT=8",
    ]]);
    let (doc, _) = parse(&raw);
    let window = ExpansionWindow::days_from(utc(2024, 6, 1, 0, 0), 30).unwrap();

    let agenda = build_agenda(&doc, &window, utc(2024, 6, 1, 0, 0), 5);
    assert_eq!(agenda.occurrences.len(), 5);
    assert_eq!(agenda.total, 8);
    assert_eq!(agenda.density, Density::Medium);

    let full = build_agenda(&doc, &window, utc(2024, 6, 1, 0, 0), 10);
    assert_eq!(full.density, Density::High);

    let none = build_agenda(&doc, &window, utc(2024, 6, 1, 0, 0), 0);
    assert!(none.occurrences.is_empty());
    assert_eq!(none.density, Density::Low);
}

#[test]
fn test_events_from_several_definitions_are_merged_in_order() {
    let raw = ics(&[
        &[
            "UID:weekly",
            "SUMMARY:Weekly",
            "DTSTART:20240603T150000Z",
            "DTEND:20240603T160000Z",
            "RRULE:FREQ=WEEKLY;COUNT=3",
        ],
        &["UID:once", "SUMMARY:Once", "DTSTART:20240604T080000Z", "DURATION:PT30M"],
        &["UID:allday", "SUMMARY:Holiday", "DTSTART;VALUE=DATE:20240610"],
    ]);
    let (doc, diagnostics) = parse(&raw);
    assert!(diagnostics.is_empty());
    let window = ExpansionWindow::days_from(utc(2024, 6, 1, 0, 0), 30).unwrap();

    let agenda = build_agenda(&doc, &window, utc(2024, 6, 1, 0, 0), 10);
    let names: Vec<&str> = agenda.occurrences.iter().map(|o| o.summary()).collect();
    assert_eq!(
        names,
        vec!["Weekly", "Once", "Holiday", "Weekly", "Weekly"]
    );
    assert_eq!(
        agenda.occurrences[1].end() - agenda.occurrences[1].start(),
        Duration::minutes(30)
    );
    assert_eq!(agenda.density, Density::Medium);

    for pair in agenda.occurrences.windows(2) {
        assert!(pair[0].start() <= pair[1].start());
    }
}

#[test]
fn test_multiple_exdate_lines_are_all_honored() {
    let raw = ics(&[&[
        "UID:ex",
        "SUMMARY:Gym",
        "DTSTART;TZID=Europe/Paris:20240603T180000",
        "RRULE:FREQ=DAILY;COUNT=5",
        "EXDATE;TZID=Europe/Paris:20240604T180000",
        "EXDATE;TZID=Europe/Paris:20240606T180000",
    ]]);
    let (doc, _) = parse(&raw);
    assert_eq!(doc.events[0].exdates.len(), 2);
    let window = ExpansionWindow::days_from(utc(2024, 6, 1, 0, 0), 30).unwrap();

    let agenda = build_agenda(&doc, &window, utc(2024, 6, 1, 0, 0), 10);
    let starts: Vec<DateTime<Utc>> = agenda.occurrences.iter().map(|o| o.start()).collect();
    assert_eq!(
        starts,
        vec![
            utc(2024, 6, 3, 16, 0),
            utc(2024, 6, 5, 16, 0),
            utc(2024, 6, 7, 16, 0),
        ]
    );
}

#[test]
fn test_overridden_instance_replaces_the_generated_one() {
    let raw = ics(&[
        &[
            "UID:sync",
            "SUMMARY:Sync",
            "DTSTART:20240601T090000Z",
            "RRULE:FREQ=DAILY;COUNT=3",
        ],
        &[
            "UID:sync",
            "SUMMARY:Sync (moved)",
            "RECURRENCE-ID:20240602T090000Z",
            "DTSTART:20240602T150000Z",
        ],
    ]);
    let (doc, _) = parse(&raw);
    let window = ExpansionWindow::days_from(utc(2024, 6, 1, 0, 0), 30).unwrap();

    let agenda = build_agenda(&doc, &window, utc(2024, 6, 1, 0, 0), 10);
    let got: Vec<(&str, DateTime<Utc>)> = agenda
        .occurrences
        .iter()
        .map(|o| (o.summary(), o.start()))
        .collect();
    assert_eq!(
        got,
        vec![
            ("Sync", utc(2024, 6, 1, 9, 0)),
            ("Sync (moved)", utc(2024, 6, 2, 15, 0)),
            ("Sync", utc(2024, 6, 3, 9, 0)),
        ]
    );
}

#[test]
fn test_floating_times_are_read_as_utc_and_noted() {
    let raw = ics(&[&["UID:float", "SUMMARY:Lunch", "DTSTART:20240605T120000"]]);
    let (doc, _) = parse(&raw);
    let window = ExpansionWindow::days_from(utc(2024, 6, 1, 0, 0), 30).unwrap();

    let agenda = build_agenda(&doc, &window, utc(2024, 6, 1, 0, 0), 5);
    assert_eq!(agenda.occurrences[0].start(), utc(2024, 6, 5, 12, 0));
    assert_eq!(agenda.occurrences[0].end(), utc(2024, 6, 5, 13, 0));
    assert!(matches!(
        agenda.diagnostics.as_slice(),
        [Diagnostic::AmbiguousTimezone { uid, .. }] if uid == "float"
    ));
}

#[test]
fn test_end_before_start_gets_default_duration() {
    let raw = ics(&[&[
        "UID:weird",
        "SUMMARY:Backwards",
        "DTSTART:20240605T120000Z",
        "DTEND:20240605T110000Z",
    ]]);
    let (doc, _) = parse(&raw);
    let window = ExpansionWindow::days_from(utc(2024, 6, 1, 0, 0), 30).unwrap();

    let agenda = build_agenda(&doc, &window, utc(2024, 6, 1, 0, 0), 5);
    let occ = &agenda.occurrences[0];
    assert_eq!(occ.end() - occ.start(), Duration::hours(1));
}

#[test]
fn test_one_bad_event_does_not_spoil_the_rest() {
    let raw = ics(&[
        &["UID:nostart", "SUMMARY:Broken"],
        &[
            "UID:badrule",
            "SUMMARY:Bad rule",
            "DTSTART:20240603T090000Z",
            "RRULE:FREQ=DAILY;COUNT=2;UNTIL=20240610T000000Z",
        ],
        &["UID:fine", "SUMMARY:Fine", "DTSTART:20240604T090000Z"],
    ]);
    let (doc, parse_diagnostics) = parse(&raw);
    assert_eq!(doc.len(), 2);
    assert!(matches!(
        parse_diagnostics.iter().next(),
        Some(Diagnostic::SkippedEvent { .. })
    ));

    let window = ExpansionWindow::days_from(utc(2024, 6, 1, 0, 0), 30).unwrap();
    let agenda = build_agenda(&doc, &window, utc(2024, 6, 1, 0, 0), 5);
    let names: Vec<&str> = agenda.occurrences.iter().map(|o| o.summary()).collect();
    assert_eq!(names, vec!["Bad rule", "Fine"]);
    assert!(matches!(
        agenda.diagnostics.as_slice(),
        [Diagnostic::MalformedRecurrence { uid, .. }] if uid == "badrule"
    ));
}

#[test]
fn test_expansion_is_deterministic() {
    let raw = ics(&[
        &["UID:a", "SUMMARY:A", "DTSTART:20240603T090000Z", "RRULE:FREQ=DAILY;COUNT=4"],
        &["UID:b", "SUMMARY:B", "DTSTART:20240603T090000Z", "RRULE:FREQ=DAILY;COUNT=4"],
    ]);
    let (doc, _) = parse(&raw);
    let window = ExpansionWindow::days_from(utc(2024, 6, 1, 0, 0), 30).unwrap();
    let now = utc(2024, 6, 1, 0, 0);

    let first = build_agenda(&doc, &window, now, 6);
    let second = build_agenda(&doc, &window, now, 6);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    // Ties keep document order.
    assert_eq!(first.occurrences[0].summary(), "A");
    assert_eq!(first.occurrences[1].summary(), "B");
}

#[test]
fn test_empty_or_inverted_window_is_a_call_error() {
    let t = utc(2024, 6, 1, 0, 0);
    assert_eq!(
        ExpansionWindow::new(t, t),
        Err(AgendaError::InvalidWindow { from: t, to: t })
    );
    assert!(ExpansionWindow::new(t, t - Duration::hours(1)).is_err());
    assert!(ExpansionWindow::days_from(t, 0).is_err());
    assert_eq!(
        ExpansionWindow::days_from(t, u32::MAX),
        Err(AgendaError::WindowOutOfRange { from: t, days: u32::MAX })
    );
}

#[test]
fn test_out_of_range_duration_skips_only_that_event() {
    let raw = ics(&[
        &["UID:big", "SUMMARY:Forever", "DTSTART:20240605T090000Z", "DURATION:P99999999D"],
        &["UID:ok", "SUMMARY:Fine", "DTSTART:20240606T090000Z", "DURATION:PT30M"],
    ]);
    let (doc, diagnostics) = parse(&raw);
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.events[0].uid, "ok");
    assert!(matches!(
        diagnostics.iter().collect::<Vec<_>>().as_slice(),
        [Diagnostic::SkippedEvent { uid: Some(uid), .. }] if uid == "big"
    ));

    let window = ExpansionWindow::days_from(utc(2024, 6, 1, 0, 0), 30).unwrap();
    let agenda = build_agenda(&doc, &window, utc(2024, 6, 1, 0, 0), 5);
    assert_eq!(agenda.occurrences.len(), 1);
    assert_eq!(agenda.occurrences[0].summary(), "Fine");
}
