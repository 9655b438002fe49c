//! Contest week boundary calculation.
//!
//! A contest week starts Monday 00:00 wall clock in the configured time
//! zone (ISO week, Monday first). The boundary is computed server-side
//! and converted to UTC before it is bound into queries, so results do
//! not depend on the caller's local clock.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// Most recent Monday 00:00 in `tz`, as a UTC instant, relative to `now`.
///
/// On a DST transition where midnight does not exist or is ambiguous,
/// the earliest valid local time is used.
pub fn week_start(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let local_now = now.with_timezone(&tz);
    let days_from_monday = local_now.weekday().num_days_from_monday() as i64;
    let monday = local_now.date_naive() - Duration::days(days_from_monday);
    day_start(monday, tz)
}

/// First valid instant of `day` in `tz`, as a UTC instant.
fn day_start(day: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = day.and_hms_opt(0, 0, 0).expect("00:00:00 is valid");
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        // Midnight skipped by a DST jump: scan forward in half-hour
        // steps for the first wall-clock time that exists.
        LocalResult::None => (1..=48)
            .find_map(|step| {
                tz.from_local_datetime(&(midnight + Duration::minutes(30 * step)))
                    .earliest()
            })
            .map(|dt| dt.with_timezone(&Utc))
            // No zone skips an entire day; read midnight as UTC if one did.
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Berlin;

    #[test]
    fn wednesday_maps_to_most_recent_monday_midnight() {
        // Wednesday 2025-06-11 15:30 UTC; Berlin is UTC+2 (CEST).
        let now = Utc.with_ymd_and_hms(2025, 6, 11, 15, 30, 0).unwrap();
        let start = week_start(now, Berlin);

        // Monday 2025-06-09 00:00 CEST == 2025-06-08 22:00 UTC.
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 6, 8, 22, 0, 0).unwrap());
    }

    #[test]
    fn monday_early_morning_stays_in_current_week() {
        // Monday 2025-06-09 00:30 Berlin == 2025-06-08 22:30 UTC.
        let now = Utc.with_ymd_and_hms(2025, 6, 8, 22, 30, 0).unwrap();
        let start = week_start(now, Berlin);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 6, 8, 22, 0, 0).unwrap());
    }

    #[test]
    fn sunday_late_utc_is_already_monday_in_berlin() {
        // Sunday 2025-06-08 23:30 UTC is Monday 01:30 in Berlin, so the
        // week has already rolled over there.
        let now = Utc.with_ymd_and_hms(2025, 6, 8, 23, 30, 0).unwrap();
        let start = week_start(now, Berlin);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 6, 8, 22, 0, 0).unwrap());
    }

    #[test]
    fn winter_week_uses_standard_time_offset() {
        // Wednesday 2025-01-15; Berlin is UTC+1 (CET).
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let start = week_start(now, Berlin);

        // Monday 2025-01-13 00:00 CET == 2025-01-12 23:00 UTC.
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 1, 12, 23, 0, 0).unwrap());
    }

    #[test]
    fn skipped_midnight_advances_to_the_first_valid_instant() {
        use chrono_tz::America::Sao_Paulo;

        // São Paulo started DST on 2017-10-15: 00:00 jumped straight
        // to 01:00, so that day's midnight never existed.
        let start = day_start(NaiveDate::from_ymd_opt(2017, 10, 15).unwrap(), Sao_Paulo);

        // First valid instant is 01:00 -02:00 == 03:00 UTC.
        assert_eq!(start, Utc.with_ymd_and_hms(2017, 10, 15, 3, 0, 0).unwrap());
    }

    #[test]
    fn dst_transition_week_still_starts_monday_midnight() {
        // Berlin springs forward Sunday 2025-03-30. The following
        // Wednesday's week starts Monday 2025-03-31 00:00 CEST.
        let now = Utc.with_ymd_and_hms(2025, 4, 2, 12, 0, 0).unwrap();
        let start = week_start(now, Berlin);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 30, 22, 0, 0).unwrap());
    }
}
