use crate::models::clock_record::{ClockEventType, ClockRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LocationPayload {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockEventPayload {
    #[serde(rename = "eventType")]
    pub event_type: ClockEventType,
    pub location: Option<LocationPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockEventResponse {
    pub success: bool,
    pub time: String,
    #[serde(rename = "distanceMeters", skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClockRecordsQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Narrow to one employee; still subject to the caller's scope.
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClockRecordView {
    pub id: uuid::Uuid,
    pub email: String,
    pub date: NaiveDate,
    pub entry: Option<String>,
    pub exit: Option<String>,
    #[serde(rename = "lunchStart")]
    pub lunch_start: Option<String>,
    #[serde(rename = "lunchEnd")]
    pub lunch_end: Option<String>,
    #[serde(rename = "htpStart")]
    pub htp_start: Option<String>,
    #[serde(rename = "htpEnd")]
    pub htp_end: Option<String>,
    #[serde(rename = "lunchMinutes")]
    pub lunch_minutes: Option<i32>,
    #[serde(rename = "workedMinutes")]
    pub worked_minutes: Option<i32>,
}

impl From<ClockRecord> for ClockRecordView {
    fn from(record: ClockRecord) -> Self {
        let hhmm = |t: Option<chrono::NaiveTime>| t.map(|t| t.format("%H:%M").to_string());
        Self {
            id: record.id,
            email: record.user_email,
            date: record.date,
            entry: hhmm(record.entry_time),
            exit: hhmm(record.exit_time),
            lunch_start: hhmm(record.lunch_start),
            lunch_end: hhmm(record.lunch_end),
            htp_start: hhmm(record.htp_start),
            htp_end: hhmm(record.htp_end),
            lunch_minutes: record.lunch_minutes,
            worked_minutes: record.worked_minutes,
        }
    }
}
