/// Completion analytics
///
/// Pure helpers over `daily_task_stats` rows: zero-filled chart series,
/// validated date ranges and day streaks.

use crate::models::daily_stats::DailyTaskStats;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

/// Longest range the per-day report accepts
pub const MAX_RANGE_DAYS: i64 = 366;

/// Error type for date range validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("start_date must not be after end_date")]
    StartAfterEnd,

    #[error("Date range cannot exceed 366 days")]
    TooLong,

    #[error("Date is outside the supported calendar range")]
    OutOfBounds,
}

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::StartAfterEnd);
        }
        if (end - start).num_days() + 1 > MAX_RANGE_DAYS {
            return Err(RangeError::TooLong);
        }
        Ok(Self { start, end })
    }

    /// The `days` days ending on `end`
    ///
    /// Fails with [`RangeError::OutOfBounds`] when the start would fall
    /// before the earliest representable date.
    pub fn last_days(end: NaiveDate, days: i64) -> Result<Self, RangeError> {
        let start = end
            .checked_sub_signed(Duration::days(days.max(1) - 1))
            .ok_or(RangeError::OutOfBounds)?;
        Ok(Self { start, end })
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }

    pub fn len(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0
    }
}

/// One day of the per-day report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub tasks_completed: i32,
    pub focus_sessions_completed: i32,
}

/// Zero-filled per-day counts across the range
pub fn daily_counts(range: &DateRange, stats: &[DailyTaskStats]) -> Vec<DailyCount> {
    let by_date: HashMap<NaiveDate, &DailyTaskStats> =
        stats.iter().map(|s| (s.stat_date, s)).collect();

    range
        .days()
        .map(|date| match by_date.get(&date) {
            Some(s) => DailyCount {
                date,
                tasks_completed: s.tasks_completed,
                focus_sessions_completed: s.focus_sessions_completed,
            },
            None => DailyCount {
                date,
                tasks_completed: 0,
                focus_sessions_completed: 0,
            },
        })
        .collect()
}

/// Chart series of completed tasks, oldest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySeries {
    pub labels: Vec<String>,
    pub data: Vec<i32>,
}

/// Builds the completed-task series
///
/// A week or less is labelled by weekday (`Mon`); longer ranges by `MM/DD`.
pub fn daily_series(range: &DateRange, stats: &[DailyTaskStats]) -> DailySeries {
    let format = if range.len() <= 7 { "%a" } else { "%m/%d" };

    let (labels, data) = daily_counts(range, stats)
        .into_iter()
        .map(|day| (day.date.format(format).to_string(), day.tasks_completed))
        .unzip();

    DailySeries { labels, data }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Streaks {
    pub current_streak: i64,
    pub longest_streak: i64,
}

/// Day streaks from the sorted dates with at least one completion
///
/// The current streak stays alive through `today` until the day ends, so a
/// run ending yesterday still counts.
pub fn streaks(active_dates: &[NaiveDate], today: NaiveDate) -> Streaks {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for &date in active_dates {
        run = match previous {
            Some(prev) if date == prev => run,
            Some(prev) if date - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(date);
    }

    let current = match previous {
        Some(last) if last == today || last == today - Duration::days(1) => run,
        _ => 0,
    };

    Streaks {
        current_streak: current,
        longest_streak: longest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn stat(day: &str, tasks: i32, focus: i32) -> DailyTaskStats {
        DailyTaskStats {
            user_id: Uuid::nil(),
            stat_date: date(day),
            tasks_completed: tasks,
            focus_sessions_completed: focus,
        }
    }

    #[test]
    fn test_range_rejects_inverted_dates() {
        assert_eq!(
            DateRange::new(date("2025-03-10"), date("2025-03-01")),
            Err(RangeError::StartAfterEnd)
        );
    }

    #[test]
    fn test_range_limit() {
        assert!(DateRange::new(date("2024-01-01"), date("2024-12-31")).is_ok());
        assert_eq!(
            DateRange::new(date("2024-01-01"), date("2025-01-01")),
            Err(RangeError::TooLong)
        );
    }

    #[test]
    fn test_last_days_includes_end() {
        let range = DateRange::last_days(date("2025-03-07"), 7).unwrap();
        assert_eq!(range.start, date("2025-03-01"));
        assert_eq!(range.len(), 7);
        assert_eq!(range.days().count(), 7);
    }

    #[test]
    fn test_last_days_at_calendar_floor() {
        assert_eq!(
            DateRange::last_days(NaiveDate::MIN, 30),
            Err(RangeError::OutOfBounds)
        );

        let range = DateRange::last_days(NaiveDate::MIN, 1).unwrap();
        assert_eq!(range.start, NaiveDate::MIN);
        assert_eq!(range.days().count(), 1);
    }

    #[test]
    fn test_week_series_is_zero_filled_with_weekday_labels() {
        // 2025-03-03 is a Monday
        let range = DateRange::last_days(date("2025-03-09"), 7).unwrap();
        let series = daily_series(&range, &[stat("2025-03-04", 3, 0), stat("2025-03-09", 1, 2)]);

        assert_eq!(
            series.labels,
            vec!["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
        );
        assert_eq!(series.data, vec![0, 3, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_long_series_uses_month_day_labels() {
        let range = DateRange::last_days(date("2025-03-10"), 14).unwrap();
        let series = daily_series(&range, &[]);

        assert_eq!(series.labels.len(), 14);
        assert_eq!(series.labels[0], "02/25");
        assert_eq!(series.labels[13], "03/10");
        assert!(series.data.iter().all(|&n| n == 0));
    }

    #[test]
    fn test_daily_counts_carry_focus_sessions() {
        let range = DateRange::new(date("2025-03-01"), date("2025-03-02")).unwrap();
        let counts = daily_counts(&range, &[stat("2025-03-02", 0, 4)]);

        assert_eq!(counts[0].focus_sessions_completed, 0);
        assert_eq!(counts[1].focus_sessions_completed, 4);
    }

    #[test]
    fn test_streaks_empty() {
        let s = streaks(&[], date("2025-03-10"));
        assert_eq!(s.current_streak, 0);
        assert_eq!(s.longest_streak, 0);
    }

    #[test]
    fn test_current_streak_survives_until_day_ends() {
        let dates = [date("2025-03-07"), date("2025-03-08"), date("2025-03-09")];

        assert_eq!(streaks(&dates, date("2025-03-09")).current_streak, 3);
        assert_eq!(streaks(&dates, date("2025-03-10")).current_streak, 3);
        assert_eq!(streaks(&dates, date("2025-03-11")).current_streak, 0);
    }

    #[test]
    fn test_longest_streak_is_tracked_across_gaps() {
        let dates = [
            date("2025-02-01"),
            date("2025-02-02"),
            date("2025-02-03"),
            date("2025-02-04"),
            date("2025-03-09"),
            date("2025-03-10"),
        ];

        let s = streaks(&dates, date("2025-03-10"));
        assert_eq!(s.longest_streak, 4);
        assert_eq!(s.current_streak, 2);
    }
}
