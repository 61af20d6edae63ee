//! Time-window selection for the two pipelines.
//!
//! Both windows are pure functions of the instant passed in, with no
//! persisted cursor: a missed run self-heals on the next run as long as
//! the window still covers the missed period.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};

/// Rolling window size for the enrichment pipeline, in days either side of now.
pub const ENRICHMENT_WINDOW_DAYS: i64 = 7;

/// Half-open `[start, end)` window in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }
}

/// The current UTC calendar week: Sunday 00:00 to the following Sunday 00:00.
pub fn current_week(now: DateTime<Utc>) -> TimeWindow {
    let days_from_sunday = i64::from(now.weekday().num_days_from_sunday());
    let sunday = now.date_naive() - Duration::days(days_from_sunday);
    let start = Utc.from_utc_datetime(&sunday.and_time(NaiveTime::MIN));
    TimeWindow {
        start,
        end: start + Duration::days(7),
    }
}

/// A rolling window of `days` either side of `now`.
pub fn around(now: DateTime<Utc>, days: i64) -> TimeWindow {
    TimeWindow {
        start: now - Duration::days(days),
        end: now + Duration::days(days),
    }
}
