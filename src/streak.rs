use chrono::NaiveDate;
use itertools::Itertools;

use crate::stats::SessionRecord;

/// Daily practice streaks, in days
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Streaks {
    pub current: u32,
    pub longest: u32,
}

/// Compute the current streak from the session dates and fold it into the
/// running longest-streak watermark.
///
/// The current streak counts consecutive UTC calendar days with at least one
/// session, ending today or yesterday. `longest` is `max(previous_longest,
/// current)`; it is not recomputed over every historical run.
pub fn compute_streaks(
    history: &[SessionRecord],
    previous_longest: u32,
    today: NaiveDate,
) -> Streaks {
    let dates: Vec<NaiveDate> = history
        .iter()
        .map(|record| record.date.date_naive())
        .unique()
        .sorted_by(|a, b| b.cmp(a))
        .collect();

    current_streak(&dates, today).map_or(Streaks::default(), |current| Streaks {
        current,
        longest: previous_longest.max(current),
    })
}

/// `dates` must be distinct and sorted newest first. None when empty.
fn current_streak(dates: &[NaiveDate], today: NaiveDate) -> Option<u32> {
    let (first, rest) = dates.split_first()?;

    let (mut streak, mut previous, remaining) = if *first == today {
        (1, *first, rest)
    } else {
        (0, today, dates)
    };

    for date in remaining {
        if (previous - *date).num_days() == 1 {
            streak += 1;
            previous = *date;
        } else {
            break;
        }
    }

    Some(streak)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::PhaseMode;
    use chrono::{DateTime, Utc};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(date: &str) -> SessionRecord {
        SessionRecord {
            date: date.parse::<DateTime<Utc>>().unwrap(),
            duration: 18,
            wpm: 40,
            accuracy: 90,
            mode: PhaseMode::Spaced,
            error_keys: vec![],
        }
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(compute_streaks(&[], 7, day(2024, 1, 3)), Streaks::default());
    }

    #[test]
    fn test_three_day_streak_ending_today() {
        let history = vec![
            record("2024-01-03T09:00:00Z"),
            record("2024-01-02T09:00:00Z"),
            record("2024-01-01T09:00:00Z"),
        ];
        let streaks = compute_streaks(&history, 0, day(2024, 1, 3));
        assert_eq!(streaks, Streaks { current: 3, longest: 3 });
    }

    #[test]
    fn test_gap_far_in_the_past_is_no_streak() {
        let history = vec![record("2024-01-01T09:00:00Z"), record("2023-12-30T09:00:00Z")];
        let streaks = compute_streaks(&history, 0, day(2030, 6, 1));
        assert_eq!(streaks.current, 0);
        assert_eq!(streaks.longest, 0);
    }

    #[test]
    fn test_streak_ending_yesterday_counts() {
        let history = vec![record("2024-01-01T09:00:00Z"), record("2024-01-02T22:00:00Z")];
        let streaks = compute_streaks(&history, 0, day(2024, 1, 3));
        assert_eq!(streaks.current, 2);
    }

    #[test]
    fn test_multiple_sessions_same_day_count_once() {
        let history = vec![
            record("2024-01-02T08:00:00Z"),
            record("2024-01-02T12:00:00Z"),
            record("2024-01-03T08:00:00Z"),
            record("2024-01-03T20:00:00Z"),
        ];
        let streaks = compute_streaks(&history, 0, day(2024, 1, 3));
        assert_eq!(streaks.current, 2);
    }

    #[test]
    fn test_stops_at_first_gap() {
        let history = vec![
            record("2023-12-28T09:00:00Z"),
            record("2023-12-29T09:00:00Z"),
            record("2023-12-30T09:00:00Z"),
            record("2024-01-02T09:00:00Z"),
            record("2024-01-03T09:00:00Z"),
        ];
        let streaks = compute_streaks(&history, 0, day(2024, 1, 3));
        assert_eq!(streaks.current, 2);
        // watermark only sees the current run
        assert_eq!(streaks.longest, 2);
    }

    #[test]
    fn test_longest_is_a_watermark() {
        let history = vec![record("2024-01-03T09:00:00Z")];
        let streaks = compute_streaks(&history, 5, day(2024, 1, 3));
        assert_eq!(streaks, Streaks { current: 1, longest: 5 });
    }

    #[test]
    fn test_history_order_does_not_matter() {
        let history = vec![
            record("2024-01-01T09:00:00Z"),
            record("2024-01-03T09:00:00Z"),
            record("2024-01-02T09:00:00Z"),
        ];
        assert_eq!(compute_streaks(&history, 0, day(2024, 1, 3)).current, 3);
    }
}
