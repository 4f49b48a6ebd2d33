use chrono::{DateTime, Duration, NaiveDate, Utc};

// The upstream loader stamps rows with the UTC calendar date, so "today"
// for every query is the UTC date of the request.
pub fn current_day(now_utc: DateTime<Utc>) -> NaiveDate {
    now_utc.date_naive()
}

/// Inclusive trailing window of [`HISTORY_WINDOW_DAYS`] days ending at `day`.
pub fn trailing_window(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    (day - Duration::days(HISTORY_WINDOW_DAYS - 1), day)
}

pub const HISTORY_WINDOW_DAYS: i64 = 7;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn current_day_is_the_utc_date() {
        let now = Utc.with_ymd_and_hms(2026, 8, 23, 23, 59, 59).unwrap();
        assert_eq!(
            current_day(now),
            NaiveDate::from_ymd_opt(2026, 8, 23).unwrap()
        );
    }

    #[test]
    fn trailing_window_spans_seven_days_inclusive() {
        let day = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        let (start, end) = trailing_window(day);
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 8, 17).unwrap());
        assert_eq!(end, day);
        assert_eq!((end - start).num_days() + 1, HISTORY_WINDOW_DAYS);
    }

    #[test]
    fn trailing_window_crosses_month_boundary() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let (start, _) = trailing_window(day);
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 2, 24).unwrap());
    }
}
