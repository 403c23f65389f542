use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The six clock actions a user can submit during a work day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClockEventType {
    Entry,
    Exit,
    LunchStart,
    LunchEnd,
    HtpStart,
    HtpEnd,
}

impl ClockEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClockEventType::Entry => "entry",
            ClockEventType::Exit => "exit",
            ClockEventType::LunchStart => "lunch-start",
            ClockEventType::LunchEnd => "lunch-end",
            ClockEventType::HtpStart => "htp-start",
            ClockEventType::HtpEnd => "htp-end",
        }
    }
}

impl FromStr for ClockEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entry" => Ok(ClockEventType::Entry),
            "exit" => Ok(ClockEventType::Exit),
            "lunch-start" => Ok(ClockEventType::LunchStart),
            "lunch-end" => Ok(ClockEventType::LunchEnd),
            "htp-start" => Ok(ClockEventType::HtpStart),
            "htp-end" => Ok(ClockEventType::HtpEnd),
            other => Err(format!("unknown clock event: {}", other)),
        }
    }
}

impl fmt::Display for ClockEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One calendar day's set of time events for one user, uniquely identified
/// by (user_email, date).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClockRecord {
    pub id: Uuid,
    pub user_email: String,
    pub date: NaiveDate,
    pub entry_time: Option<NaiveTime>,
    pub exit_time: Option<NaiveTime>,
    pub lunch_start: Option<NaiveTime>,
    pub lunch_end: Option<NaiveTime>,
    pub htp_start: Option<NaiveTime>,
    pub htp_end: Option<NaiveTime>,
    pub lunch_minutes: Option<i32>,
    pub worked_minutes: Option<i32>,
    /// Audit map: event type -> validated coordinates at submission time.
    pub event_locations: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Checks the monotonic-order invariant after a candidate event is applied:
/// entry < lunch-start < lunch-end < exit, and htp-start < htp-end, across
/// whichever of those times are present.
pub fn ordering_violation(
    entry: Option<NaiveTime>,
    lunch_start: Option<NaiveTime>,
    lunch_end: Option<NaiveTime>,
    exit: Option<NaiveTime>,
    htp_start: Option<NaiveTime>,
    htp_end: Option<NaiveTime>,
) -> Option<String> {
    let day_sequence = [
        ("entry", entry),
        ("lunch-start", lunch_start),
        ("lunch-end", lunch_end),
        ("exit", exit),
    ];
    let mut last: Option<(&str, NaiveTime)> = None;
    for (label, time) in day_sequence {
        let Some(t) = time else { continue };
        if let Some((prev_label, prev)) = last {
            if t <= prev {
                return Some(format!("{} must come after {}", label, prev_label));
            }
        }
        last = Some((label, t));
    }
    if let (Some(start), Some(end)) = (htp_start, htp_end) {
        if end <= start {
            return Some("htp-end must come after htp-start".to_string());
        }
    }
    None
}

/// Derived totals recomputed on every write. Worked time only exists once
/// both entry and exit are present; lunch is subtracted when complete.
pub fn derive_minutes(
    entry: Option<NaiveTime>,
    exit: Option<NaiveTime>,
    lunch_start: Option<NaiveTime>,
    lunch_end: Option<NaiveTime>,
) -> (Option<i32>, Option<i32>) {
    let lunch = match (lunch_start, lunch_end) {
        (Some(start), Some(end)) if end > start => {
            Some((end - start).num_minutes() as i32)
        }
        _ => None,
    };
    let worked = match (entry, exit) {
        (Some(entry), Some(exit)) if exit > entry => {
            let gross = (exit - entry).num_minutes() as i32;
            Some(gross - lunch.unwrap_or(0))
        }
        _ => None,
    };
    (lunch, worked)
}
