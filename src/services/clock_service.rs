use crate::config::get_config;
use crate::dto::clock_dto::LocationPayload;
use crate::error::{Error, Result};
use crate::models::clock_record::{
    derive_minutes, ordering_violation, ClockEventType, ClockRecord,
};
use crate::models::geofence::GeofenceConfig;
use crate::utils::{geo, time};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde_json::json;
use sqlx::PgPool;

/// Gates every clock event behind the geofence check, then upserts the
/// caller's day record. The event time is the server-observed wall clock in
/// the configured workplace zone; client-supplied times are never trusted.
#[derive(Clone)]
pub struct ClockService {
    pool: PgPool,
}

pub struct RegisteredEvent {
    pub record: ClockRecord,
    pub time: String,
    pub distance_meters: Option<f64>,
}

/// Location gate for one clock submission. Returns the computed distance
/// when geofencing applied, `None` when it was skipped as disabled.
///
/// A (0,0) or non-finite coordinate pair is rejected whenever a payload is
/// present, even with geofencing disabled: 0,0 is mid-ocean and only ever
/// appears as an "unavailable" sentinel.
pub fn validate_location(
    config: &GeofenceConfig,
    location: Option<&LocationPayload>,
) -> Result<Option<f64>> {
    if let Some(loc) = location {
        if !loc.latitude.is_finite()
            || !loc.longitude.is_finite()
            || loc.latitude == 0.0
            || loc.longitude == 0.0
        {
            return Err(Error::InvalidCoordinates);
        }
    }

    if !config.enabled {
        return Ok(None);
    }

    let Some(loc) = location else {
        return Err(Error::LocationRequired);
    };

    let distance_meters = geo::distance_meters(
        loc.latitude,
        loc.longitude,
        config.workplace_latitude,
        config.workplace_longitude,
    );
    if distance_meters > config.allowed_radius_meters {
        return Err(Error::OutOfRange {
            distance_meters,
            max_distance_meters: config.allowed_radius_meters,
        });
    }
    Ok(Some(distance_meters))
}

impl ClockService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Validates and persists one clock event. The geofence configuration is
    /// loaded by the caller so validator and monitor share one source.
    pub async fn register_event(
        &self,
        user_email: &str,
        event: ClockEventType,
        location: Option<&LocationPayload>,
        geofence: &GeofenceConfig,
        now: DateTime<Utc>,
    ) -> Result<RegisteredEvent> {
        let distance_meters = validate_location(geofence, location)?;

        let tz = get_config().workplace_timezone;
        let date = time::local_date(now, tz);
        let event_time = time::local_time(now, tz);

        let existing = self.record_for(user_email, date).await?;
        let times = apply_event(existing.as_ref(), event, event_time);
        if let Some(violation) = ordering_violation(
            times.entry,
            times.lunch_start,
            times.lunch_end,
            times.exit,
            times.htp_start,
            times.htp_end,
        ) {
            return Err(Error::BadRequest(violation));
        }
        let (lunch_minutes, worked_minutes) =
            derive_minutes(times.entry, times.exit, times.lunch_start, times.lunch_end);

        let mut audit = serde_json::Map::new();
        if let Some(loc) = location {
            audit.insert(
                event.as_str().to_string(),
                json!({
                    "latitude": loc.latitude,
                    "longitude": loc.longitude,
                    "accuracy": loc.accuracy,
                }),
            );
        }
        let event_location = serde_json::Value::Object(audit);

        // Single-statement upsert: each event lands atomically on the
        // (user_email, date) row; concurrent events follow last-write-wins
        // per column.
        let column = event_column(event);
        let sql = format!(
            r#"
            INSERT INTO clock_records
                (user_email, date, {column}, lunch_minutes, worked_minutes, event_locations)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_email, date) DO UPDATE SET
                {column} = EXCLUDED.{column},
                lunch_minutes = EXCLUDED.lunch_minutes,
                worked_minutes = EXCLUDED.worked_minutes,
                event_locations = clock_records.event_locations || EXCLUDED.event_locations,
                updated_at = NOW()
            RETURNING *
            "#,
        );
        let record = sqlx::query_as::<_, ClockRecord>(&sql)
            .bind(user_email)
            .bind(date)
            .bind(event_time)
            .bind(lunch_minutes)
            .bind(worked_minutes)
            .bind(event_location)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(
            user = user_email,
            event = %event,
            date = %date,
            distance = ?distance_meters,
            "clock event registered"
        );

        Ok(RegisteredEvent {
            record,
            time: time::format_hhmm(event_time),
            distance_meters,
        })
    }

    pub async fn record_for(
        &self,
        user_email: &str,
        date: NaiveDate,
    ) -> Result<Option<ClockRecord>> {
        let record = sqlx::query_as::<_, ClockRecord>(
            "SELECT * FROM clock_records WHERE user_email = $1 AND date = $2",
        )
        .bind(user_email)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// Range listing, restricted to the given owner emails unless the caller
    /// is unrestricted (`None`).
    pub async fn list_records(
        &self,
        emails: Option<&[String]>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ClockRecord>> {
        let records = match emails {
            None => {
                sqlx::query_as::<_, ClockRecord>(
                    r#"
                    SELECT * FROM clock_records
                    WHERE date BETWEEN $1 AND $2
                    ORDER BY date, user_email
                    "#,
                )
                .bind(from)
                .bind(to)
                .fetch_all(&self.pool)
                .await?
            }
            Some(emails) => {
                sqlx::query_as::<_, ClockRecord>(
                    r#"
                    SELECT * FROM clock_records
                    WHERE date BETWEEN $1 AND $2 AND user_email = ANY($3)
                    ORDER BY date, user_email
                    "#,
                )
                .bind(from)
                .bind(to)
                .bind(emails)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(records)
    }
}

struct DayTimes {
    entry: Option<NaiveTime>,
    exit: Option<NaiveTime>,
    lunch_start: Option<NaiveTime>,
    lunch_end: Option<NaiveTime>,
    htp_start: Option<NaiveTime>,
    htp_end: Option<NaiveTime>,
}

fn apply_event(
    existing: Option<&ClockRecord>,
    event: ClockEventType,
    event_time: NaiveTime,
) -> DayTimes {
    let mut times = DayTimes {
        entry: existing.and_then(|r| r.entry_time),
        exit: existing.and_then(|r| r.exit_time),
        lunch_start: existing.and_then(|r| r.lunch_start),
        lunch_end: existing.and_then(|r| r.lunch_end),
        htp_start: existing.and_then(|r| r.htp_start),
        htp_end: existing.and_then(|r| r.htp_end),
    };
    match event {
        ClockEventType::Entry => times.entry = Some(event_time),
        ClockEventType::Exit => times.exit = Some(event_time),
        ClockEventType::LunchStart => times.lunch_start = Some(event_time),
        ClockEventType::LunchEnd => times.lunch_end = Some(event_time),
        ClockEventType::HtpStart => times.htp_start = Some(event_time),
        ClockEventType::HtpEnd => times.htp_end = Some(event_time),
    }
    times
}

fn event_column(event: ClockEventType) -> &'static str {
    match event {
        ClockEventType::Entry => "entry_time",
        ClockEventType::Exit => "exit_time",
        ClockEventType::LunchStart => "lunch_start",
        ClockEventType::LunchEnd => "lunch_end",
        ClockEventType::HtpStart => "htp_start",
        ClockEventType::HtpEnd => "htp_end",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn geofence(enabled: bool, radius: f64) -> GeofenceConfig {
        GeofenceConfig {
            enabled,
            workplace_latitude: -15.7942,
            workplace_longitude: -47.8822,
            allowed_radius_meters: radius,
            updated_at: Utc::now(),
            updated_by: None,
        }
    }

    fn loc(lat: f64, lon: f64) -> LocationPayload {
        LocationPayload {
            latitude: lat,
            longitude: lon,
            accuracy: Some(8.0),
        }
    }

    #[test]
    fn disabled_geofence_accepts_missing_location() {
        let result = validate_location(&geofence(false, 100.0), None);
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn enabled_geofence_requires_location() {
        let result = validate_location(&geofence(true, 100.0), None);
        assert!(matches!(result, Err(Error::LocationRequired)));
    }

    #[test]
    fn zero_zero_is_rejected_even_when_disabled() {
        let location = loc(0.0, 0.0);
        let result = validate_location(&geofence(false, 100.0), Some(&location));
        assert!(matches!(result, Err(Error::InvalidCoordinates)));
        let result = validate_location(&geofence(true, 100.0), Some(&location));
        assert!(matches!(result, Err(Error::InvalidCoordinates)));
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let location = loc(f64::NAN, -47.8822);
        let result = validate_location(&geofence(true, 100.0), Some(&location));
        assert!(matches!(result, Err(Error::InvalidCoordinates)));
    }

    #[test]
    fn caller_out_of_range_gets_distance_and_threshold() {
        // ~150m south of the workplace against a 100m radius.
        let location = loc(-15.79555, -47.8822);
        let result = validate_location(&geofence(true, 100.0), Some(&location));
        match result {
            Err(Error::OutOfRange {
                distance_meters,
                max_distance_meters,
            }) => {
                assert!((distance_meters - 150.0).abs() < 10.0);
                assert_eq!(max_distance_meters, 100.0);
            }
            other => panic!("expected OutOfRange, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn caller_exactly_on_the_radius_is_inside() {
        let location = loc(-15.79555, -47.8822);
        let distance = geo::distance_meters(
            location.latitude,
            location.longitude,
            -15.7942,
            -47.8822,
        );
        let result = validate_location(&geofence(true, distance), Some(&location));
        assert!(matches!(result, Ok(Some(_))));
    }

    #[test]
    fn in_range_caller_passes_with_distance() {
        let location = loc(-15.79425, -47.88225);
        let result = validate_location(&geofence(true, 100.0), Some(&location));
        match result {
            Ok(Some(distance)) => assert!(distance < 100.0),
            other => panic!("expected pass, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn events_map_to_their_columns() {
        assert_eq!(event_column(ClockEventType::Entry), "entry_time");
        assert_eq!(event_column(ClockEventType::HtpEnd), "htp_end");
    }
}
