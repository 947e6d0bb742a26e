// File: ./src/model/recurrence.rs
// Typed RRULE grammar. Unsupported input fails closed instead of mis-expanding.
use crate::model::event::EventTime;
use chrono::Weekday;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecurrenceError {
    #[error("missing FREQ")]
    MissingFrequency,
    #[error("unsupported frequency '{0}'")]
    UnknownFrequency(String),
    #[error("invalid value '{value}' for {part}")]
    InvalidValue { part: String, value: String },
    #[error("unsupported rule part '{0}'")]
    UnsupportedPart(String),
    #[error("COUNT and UNTIL are mutually exclusive")]
    CountAndUntil,
    #[error("rule rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Yearly,
    Monthly,
    Weekly,
    Daily,
    Hourly,
}

impl FromStr for Frequency {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "YEARLY" => Ok(Frequency::Yearly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "WEEKLY" => Ok(Frequency::Weekly),
            "DAILY" => Ok(Frequency::Daily),
            "HOURLY" => Ok(Frequency::Hourly),
            other => Err(RecurrenceError::UnknownFrequency(other.to_string())),
        }
    }
}

/// How a rule ends. COUNT and UNTIL never coexist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound {
    Open,
    Count(u32),
    Until(EventTime),
}

/// A BYDAY entry such as `MO`, `1MO` or `-1FR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByDay {
    pub nth: Option<i16>,
    pub weekday: Weekday,
}

impl FromStr for ByDay {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RecurrenceError::InvalidValue {
            part: "BYDAY".to_string(),
            value: s.to_string(),
        };
        if s.len() < 2 || !s.is_char_boundary(s.len() - 2) {
            return Err(invalid());
        }
        let (prefix, code) = s.split_at(s.len() - 2);
        let weekday = match code {
            "MO" => Weekday::Mon,
            "TU" => Weekday::Tue,
            "WE" => Weekday::Wed,
            "TH" => Weekday::Thu,
            "FR" => Weekday::Fri,
            "SA" => Weekday::Sat,
            "SU" => Weekday::Sun,
            _ => return Err(invalid()),
        };
        let nth = if prefix.is_empty() {
            None
        } else {
            let n = prefix.parse::<i16>().map_err(|_| invalid())?;
            if n == 0 || n.abs() > 53 {
                return Err(invalid());
            }
            Some(n)
        };
        Ok(ByDay { nth, weekday })
    }
}

/// A recurrence rule: frequency, step, bound and the BY-constraints we honor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recurrence {
    pub frequency: Frequency,
    pub interval: u16,
    pub bound: Bound,
    pub by_day: Vec<ByDay>,
    pub by_month_day: Vec<i8>,
    pub by_month: Vec<u8>,
    pub by_year_day: Vec<i16>,
    pub by_week_no: Vec<i8>,
    pub by_set_pos: Vec<i32>,
    pub by_hour: Vec<u8>,
    pub by_minute: Vec<u8>,
    pub week_start: Weekday,
}

impl Recurrence {
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: 1,
            bound: Bound::Open,
            by_day: Vec::new(),
            by_month_day: Vec::new(),
            by_month: Vec::new(),
            by_year_day: Vec::new(),
            by_week_no: Vec::new(),
            by_set_pos: Vec::new(),
            by_hour: Vec::new(),
            by_minute: Vec::new(),
            week_start: Weekday::Mon,
        }
    }
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, value: T) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Parse a comma list of integers, each within `range` and never zero when `nonzero`.
fn parse_list<T>(
    part: &str,
    value: &str,
    range: std::ops::RangeInclusive<i32>,
    nonzero: bool,
) -> Result<Vec<T>, RecurrenceError>
where
    T: TryFrom<i32> + PartialEq,
{
    let mut out = Vec::new();
    for raw in value.split(',') {
        let invalid = || RecurrenceError::InvalidValue {
            part: part.to_string(),
            value: raw.to_string(),
        };
        let n = raw.trim().parse::<i32>().map_err(|_| invalid())?;
        let magnitude_ok = if nonzero {
            n != 0 && range.contains(&n.abs())
        } else {
            range.contains(&n)
        };
        if !magnitude_ok {
            return Err(invalid());
        }
        push_unique(&mut out, T::try_from(n).map_err(|_| invalid())?);
    }
    Ok(out)
}

fn parse_weekday(value: &str) -> Result<Weekday, RecurrenceError> {
    let day = value.parse::<ByDay>()?;
    if day.nth.is_some() {
        return Err(RecurrenceError::InvalidValue {
            part: "WKST".to_string(),
            value: value.to_string(),
        });
    }
    Ok(day.weekday)
}

impl FromStr for Recurrence {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.trim();
        let body = body.strip_prefix("RRULE:").unwrap_or(body);

        let mut frequency = None;
        let mut interval = 1u16;
        let mut count = None;
        let mut until = None;
        let mut rule = Recurrence::new(Frequency::Daily);

        for pair in body.split(';').filter(|p| !p.trim().is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| RecurrenceError::InvalidValue {
                part: pair.to_string(),
                value: String::new(),
            })?;
            let key = key.trim().to_uppercase();
            let value = value.trim().to_uppercase();
            let invalid = || RecurrenceError::InvalidValue {
                part: key.clone(),
                value: value.clone(),
            };

            match key.as_str() {
                "FREQ" => frequency = Some(value.parse::<Frequency>()?),
                "INTERVAL" => {
                    interval = value.parse::<u16>().map_err(|_| invalid())?;
                    if interval == 0 {
                        return Err(invalid());
                    }
                }
                "COUNT" => {
                    let n = value.parse::<u32>().map_err(|_| invalid())?;
                    if n == 0 {
                        return Err(invalid());
                    }
                    count = Some(n);
                }
                "UNTIL" => {
                    let t = EventTime::parse(&value, None).ok_or_else(invalid)?;
                    until = Some(t);
                }
                "BYDAY" => {
                    for token in value.split(',') {
                        push_unique(&mut rule.by_day, token.trim().parse::<ByDay>()?);
                    }
                }
                "BYMONTHDAY" => rule.by_month_day = parse_list(&key, &value, 1..=31, true)?,
                "BYMONTH" => rule.by_month = parse_list(&key, &value, 1..=12, false)?,
                "BYYEARDAY" => rule.by_year_day = parse_list(&key, &value, 1..=366, true)?,
                "BYWEEKNO" => rule.by_week_no = parse_list(&key, &value, 1..=53, true)?,
                "BYSETPOS" => rule.by_set_pos = parse_list(&key, &value, 1..=366, true)?,
                "BYHOUR" => rule.by_hour = parse_list(&key, &value, 0..=23, false)?,
                "BYMINUTE" => rule.by_minute = parse_list(&key, &value, 0..=59, false)?,
                "WKST" => rule.week_start = parse_weekday(&value)?,
                _ => return Err(RecurrenceError::UnsupportedPart(key)),
            }
        }

        rule.frequency = frequency.ok_or(RecurrenceError::MissingFrequency)?;
        rule.interval = interval;
        rule.bound = match (count, until) {
            (Some(_), Some(_)) => return Err(RecurrenceError::CountAndUntil),
            (Some(n), None) => Bound::Count(n),
            (None, Some(t)) => Bound::Until(t),
            (None, None) => Bound::Open,
        };
        Ok(rule)
    }
}
