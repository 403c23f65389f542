use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Local calendar date at the workplace; the daily key for clock records
/// and for the monitor's once-per-day notification reset.
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Wall-clock time at the workplace. Stored at full precision so that
/// events seconds apart stay strictly ordered; displayed as HH:MM.
pub fn local_time(instant: DateTime<Utc>, tz: Tz) -> NaiveTime {
    instant.with_timezone(&tz).time()
}

pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn local_date_respects_workplace_zone() {
        // 01:30 UTC is still the previous day in São Paulo (UTC-3).
        let instant = Utc.with_ymd_and_hms(2026, 3, 10, 1, 30, 0).unwrap();
        let date = local_date(instant, chrono_tz::America::Sao_Paulo);
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
    }

    #[test]
    fn hhmm_formatting_truncates_seconds() {
        let instant = Utc.with_ymd_and_hms(2026, 3, 10, 12, 5, 42).unwrap();
        let time = local_time(instant, chrono_tz::America::Sao_Paulo);
        assert_eq!(format_hhmm(time), "09:05");
    }
}
