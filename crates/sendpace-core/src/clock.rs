//! Wall-clock access and UTC day boundaries.
//!
//! The allocator never reads the system clock itself; the service asks
//! a [`Clock`] once per request and threads the instant through. Tests
//! pin time with [`FixedClock`].

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Timelike, Utc};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Current instant in UTC.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// System wall clock, truncated to whole seconds.
///
/// Schedule instants round-trip through RFC3339 text; whole-second
/// precision keeps the stored strings uniform and comparable.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        let now = Utc::now();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

/// Clock pinned to a fixed instant (for tests and replays).
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Day window for `instant`'s UTC calendar date.
///
/// Returns (00:00:00, 23:59:59) of that date. The upper bound is
/// inclusive: a send may land exactly on 23:59:59 but never on the
/// next midnight.
pub fn day_bounds(instant: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.from_utc_datetime(&instant.date_naive().and_time(NaiveTime::MIN));
    let end = start + Duration::days(1) - Duration::seconds(1);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn make_instant(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_day_bounds_midday() {
        let (start, end) = day_bounds(make_instant("2026-03-10T14:23:07Z"));
        assert_eq!(start, make_instant("2026-03-10T00:00:00Z"));
        assert_eq!(end, make_instant("2026-03-10T23:59:59Z"));
    }

    #[test]
    fn test_day_bounds_at_midnight() {
        let (start, end) = day_bounds(make_instant("2026-03-10T00:00:00Z"));
        assert_eq!(start, make_instant("2026-03-10T00:00:00Z"));
        assert_eq!(end, make_instant("2026-03-10T23:59:59Z"));
    }

    #[test]
    fn test_day_bounds_at_last_second() {
        let instant = make_instant("2026-12-31T23:59:59Z");
        let (start, end) = day_bounds(instant);
        assert_eq!(start.day(), 31);
        assert_eq!(end, instant);
    }

    #[test]
    fn test_fixed_clock_returns_pinned_instant() {
        let pinned = make_instant("2026-03-10T09:00:00Z");
        let clock = FixedClock(pinned);
        assert_eq!(clock.now_utc(), pinned);
        assert_eq!(clock.now_utc(), pinned);
    }

    #[test]
    fn test_system_clock_whole_seconds() {
        let clock = SystemClock;
        assert_eq!(clock.now_utc().nanosecond(), 0);
    }
}
