use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::period::days_in_month;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("{0} is not a valid weekday index (expected 0-6, Sunday first)")]
    InvalidWeekday(u32),
    #[error("{0} is not a valid due day (expected 1-31)")]
    InvalidDay(u32),
    #[error("{0} is not a valid month (expected 1-12)")]
    InvalidMonth(u32),
}

/// When a recurring template falls due. Each variant owns its occurrence
/// rule; the materializer and the aggregator share this math instead of
/// branching on frequency codes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Schedule {
    /// Every week on the given weekday.
    Weekly { weekday: Weekday },
    /// On `day` of every month, clamped to the last day of shorter months.
    Monthly { day: u32 },
    /// Once a year on (`month`, `day`), with the same day clamping.
    Yearly { month: u32, day: u32 },
    /// Every 14 days counted forward from an anchor date.
    EveryTwoWeeks { anchor: NaiveDate },
}

impl Schedule {
    /// Weekly schedule from a Sunday-first weekday index (0 = Sunday).
    pub fn weekly(weekday_index: u32) -> Result<Self, ScheduleError> {
        let weekday = match weekday_index {
            0 => Weekday::Sun,
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            6 => Weekday::Sat,
            other => return Err(ScheduleError::InvalidWeekday(other)),
        };
        Ok(Schedule::Weekly { weekday })
    }

    pub fn monthly(day: u32) -> Result<Self, ScheduleError> {
        if !(1..=31).contains(&day) {
            return Err(ScheduleError::InvalidDay(day));
        }
        Ok(Schedule::Monthly { day })
    }

    pub fn yearly(month: u32, day: u32) -> Result<Self, ScheduleError> {
        if !(1..=12).contains(&month) {
            return Err(ScheduleError::InvalidMonth(month));
        }
        if !(1..=31).contains(&day) {
            return Err(ScheduleError::InvalidDay(day));
        }
        Ok(Schedule::Yearly { month, day })
    }

    pub fn every_two_weeks(anchor: NaiveDate) -> Self {
        Schedule::EveryTwoWeeks { anchor }
    }

    /// All occurrence dates falling within `from..=to`, ascending. The
    /// biweekly series never extends before its anchor.
    pub fn occurrences_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        if to < from {
            return Vec::new();
        }
        match *self {
            Schedule::Weekly { weekday } => {
                let offset = days_until_weekday(from, weekday);
                let mut dates = Vec::new();
                let mut current = from + Duration::days(offset);
                while current <= to {
                    dates.push(current);
                    current += Duration::days(7);
                }
                dates
            }
            Schedule::Monthly { day } => months_spanning(from, to)
                .into_iter()
                .map(|(year, month)| clamped_day(year, month, day))
                .filter(|date| *date >= from && *date <= to)
                .collect(),
            Schedule::Yearly { month, day } => (from.year()..=to.year())
                .map(|year| clamped_day(year, month, day))
                .filter(|date| *date >= from && *date <= to)
                .collect(),
            Schedule::EveryTwoWeeks { anchor } => {
                let mut current = if from <= anchor {
                    anchor
                } else {
                    let gap = (from - anchor).num_days();
                    let steps = gap.div_euclid(14) + i64::from(gap.rem_euclid(14) != 0);
                    anchor + Duration::days(steps * 14)
                };
                let mut dates = Vec::new();
                while current <= to {
                    dates.push(current);
                    current += Duration::days(14);
                }
                dates
            }
        }
    }

    /// Occurrences inside one calendar month. Monthly and yearly rules yield
    /// at most one date here; weekly and biweekly rules may yield several.
    pub fn due_in_month(&self, year: i32, month: u32) -> Vec<NaiveDate> {
        let first = match NaiveDate::from_ymd_opt(year, month, 1) {
            Some(date) => date,
            None => return Vec::new(),
        };
        self.occurrences_between(first, super::period::last_of_month(year, month))
    }

    /// Most recent occurrence on or before `date`, if the series has started.
    pub fn latest_on_or_before(&self, date: NaiveDate) -> Option<NaiveDate> {
        let lookback = match *self {
            Schedule::Weekly { .. } => 7,
            Schedule::Monthly { .. } => 62,
            Schedule::Yearly { .. } => 366 + 31,
            Schedule::EveryTwoWeeks { .. } => 14,
        };
        self.occurrences_between(date - Duration::days(lookback), date)
            .into_iter()
            .next_back()
    }

    pub fn label(&self) -> String {
        match *self {
            Schedule::Weekly { weekday } => format!("Weekly on {}", weekday_name(weekday)),
            Schedule::Monthly { day } => format!("Monthly on day {day}"),
            Schedule::Yearly { month, day } => format!("Yearly on {month:02}-{day:02}"),
            Schedule::EveryTwoWeeks { anchor } => format!("Every two weeks from {anchor}"),
        }
    }
}

fn days_until_weekday(from: NaiveDate, weekday: Weekday) -> i64 {
    let from_idx = from.weekday().num_days_from_monday() as i64;
    let target_idx = weekday.num_days_from_monday() as i64;
    (target_idx - from_idx).rem_euclid(7)
}

/// Day-of-month clamped to the length of the target month, so a day-31 rule
/// lands on Feb 28/29, Apr 30, and so on.
fn clamped_day(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day.max(1)).unwrap()
}

fn months_spanning(from: NaiveDate, to: NaiveDate) -> Vec<(i32, u32)> {
    let mut months = Vec::new();
    let (mut year, mut month) = (from.year(), from.month());
    while (year, month) <= (to.year(), to.month()) {
        months.push((year, month));
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    months
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekly_index_is_sunday_first() {
        assert_eq!(
            Schedule::weekly(0),
            Ok(Schedule::Weekly {
                weekday: Weekday::Sun
            })
        );
        assert_eq!(
            Schedule::weekly(6),
            Ok(Schedule::Weekly {
                weekday: Weekday::Sat
            })
        );
        assert_eq!(Schedule::weekly(7), Err(ScheduleError::InvalidWeekday(7)));
    }

    #[test]
    fn monthly_day_31_clamps_to_end_of_february() {
        let schedule = Schedule::monthly(31).unwrap();
        assert_eq!(schedule.due_in_month(2023, 2), vec![date(2023, 2, 28)]);
        assert_eq!(schedule.due_in_month(2024, 2), vec![date(2024, 2, 29)]);
        assert_eq!(schedule.due_in_month(2024, 4), vec![date(2024, 4, 30)]);
    }

    #[test]
    fn weekly_lists_every_matching_weekday_in_month() {
        // Fridays in March 2024: 1, 8, 15, 22, 29.
        let schedule = Schedule::weekly(5).unwrap();
        assert_eq!(
            schedule.due_in_month(2024, 3),
            vec![
                date(2024, 3, 1),
                date(2024, 3, 8),
                date(2024, 3, 15),
                date(2024, 3, 22),
                date(2024, 3, 29),
            ]
        );
    }

    #[test]
    fn yearly_occurs_once_in_its_month_only() {
        let schedule = Schedule::yearly(6, 15).unwrap();
        assert_eq!(schedule.due_in_month(2024, 6), vec![date(2024, 6, 15)]);
        assert!(schedule.due_in_month(2024, 7).is_empty());
    }

    #[test]
    fn biweekly_steps_from_anchor_and_never_precedes_it() {
        let schedule = Schedule::every_two_weeks(date(2024, 1, 5));
        assert_eq!(
            schedule.occurrences_between(date(2024, 1, 1), date(2024, 2, 5)),
            vec![date(2024, 1, 5), date(2024, 1, 19), date(2024, 2, 2)]
        );
        // A window entirely before the anchor has no occurrences.
        assert!(schedule
            .occurrences_between(date(2023, 12, 1), date(2023, 12, 31))
            .is_empty());
        // A window that does not land on a cycle boundary starts at the
        // next cycle date.
        assert_eq!(
            schedule.occurrences_between(date(2024, 1, 6), date(2024, 1, 31)),
            vec![date(2024, 1, 19)]
        );
    }

    #[test]
    fn occurrence_bounds_are_inclusive() {
        let schedule = Schedule::monthly(15).unwrap();
        assert_eq!(
            schedule.occurrences_between(date(2024, 3, 15), date(2024, 4, 15)),
            vec![date(2024, 3, 15), date(2024, 4, 15)]
        );
        assert!(schedule
            .occurrences_between(date(2024, 3, 16), date(2024, 3, 16))
            .is_empty());
    }

    #[test]
    fn latest_on_or_before_finds_the_preceding_occurrence() {
        let schedule = Schedule::monthly(31).unwrap();
        assert_eq!(
            schedule.latest_on_or_before(date(2024, 3, 2)),
            Some(date(2024, 2, 29))
        );
        let yearly = Schedule::yearly(12, 25).unwrap();
        assert_eq!(
            yearly.latest_on_or_before(date(2024, 1, 10)),
            Some(date(2023, 12, 25))
        );
    }
}
