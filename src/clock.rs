use chrono::{DateTime, NaiveDate, Utc};
use std::cell::Cell;
use std::rc::Rc;

/// Source of wall-clock time for the session and stats engines
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date (UTC) used for streak computation
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Production clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock for tests and headless runs.
/// Clones share the same instant, so a test can keep a handle while the
/// coordinator owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(chrono::Duration::seconds(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_clones_share_time() {
        let start: DateTime<Utc> = "2024-01-03T10:00:00Z".parse().unwrap();
        let clock = ManualClock::new(start);
        let handle = clock.clone();

        handle.advance_secs(90);

        assert_eq!(clock.now(), start + chrono::Duration::seconds(90));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn test_today_uses_utc_date() {
        let clock = ManualClock::new("2024-01-03T23:59:59Z".parse().unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        clock.advance_secs(1);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
    }
}
