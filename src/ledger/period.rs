use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("week {week} does not exist in ISO year {year}")]
    InvalidWeek { year: i32, week: u32 },
    #[error("{0} is not a valid month number")]
    InvalidMonth(u32),
    #[error("range end {end} is before start {start}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// An inclusive window of instants covering one or more whole calendar days.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    /// Builds an explicit custom range spanning `from` 00:00 through `to` 23:59:59.999.
    /// A custom range overrides period arithmetic entirely.
    pub fn custom(from: NaiveDate, to: NaiveDate) -> Result<Self, PeriodError> {
        if to < from {
            return Err(PeriodError::InvertedRange {
                start: from,
                end: to,
            });
        }
        Ok(Self::days(from, to))
    }

    fn days(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            start: start_of_day(from),
            end: end_of_day(to),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.end.date()
    }

    pub fn contains_day(&self, date: NaiveDate) -> bool {
        date >= self.first_day() && date <= self.last_day()
    }
}

/// A budgeting period addressed the way the UI addresses it: by ISO week,
/// calendar month, or calendar year.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Period {
    Week { iso_year: i32, week: u32 },
    Month { year: i32, month: u32 },
    Year { year: i32 },
}

impl Period {
    /// ISO week constructor. Week 1 is the week containing January 4th and
    /// weeks start on Monday, so `week(2024, 1)` begins on 2024-01-01.
    pub fn week(iso_year: i32, week: u32) -> Result<Self, PeriodError> {
        if week == 0 || week > weeks_in_iso_year(iso_year) {
            return Err(PeriodError::InvalidWeek {
                year: iso_year,
                week,
            });
        }
        Ok(Period::Week { iso_year, week })
    }

    pub fn month(year: i32, month: u32) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::InvalidMonth(month));
        }
        Ok(Period::Month { year, month })
    }

    pub fn year(year: i32) -> Self {
        Period::Year { year }
    }

    /// The week period containing `date`, keyed by the ISO week-year of the
    /// date rather than its calendar year. The first and last days of a
    /// calendar year can belong to a week of the adjacent year.
    pub fn week_of(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Period::Week {
            iso_year: iso.year(),
            week: iso.week(),
        }
    }

    pub fn month_of(date: NaiveDate) -> Self {
        Period::Month {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year_of(date: NaiveDate) -> Self {
        Period::Year { year: date.year() }
    }

    /// Inclusive start and end instants of this period.
    pub fn date_range(&self) -> DateRange {
        match *self {
            Period::Week { iso_year, week } => {
                let monday = iso_week_start(iso_year, week);
                DateRange::days(monday, monday + Duration::days(6))
            }
            Period::Month { year, month } => {
                let first = first_of_month(year, month);
                DateRange::days(first, last_of_month(year, month))
            }
            Period::Year { year } => DateRange::days(
                first_of_month(year, 1),
                last_of_month(year, 12),
            ),
        }
    }

    /// The immediately preceding period of the same kind. Week navigation
    /// shifts by exactly one week and re-derives the ISO pairing from the
    /// shifted date, so year boundaries never drift.
    pub fn prev(&self) -> Period {
        match *self {
            Period::Week { iso_year, week } => {
                Period::week_of(iso_week_start(iso_year, week) - Duration::days(7))
            }
            Period::Month { year, month } => {
                if month == 1 {
                    Period::Month {
                        year: year - 1,
                        month: 12,
                    }
                } else {
                    Period::Month {
                        year,
                        month: month - 1,
                    }
                }
            }
            Period::Year { year } => Period::Year { year: year - 1 },
        }
    }

    pub fn next(&self) -> Period {
        match *self {
            Period::Week { iso_year, week } => {
                Period::week_of(iso_week_start(iso_year, week) + Duration::days(7))
            }
            Period::Month { year, month } => {
                if month == 12 {
                    Period::Month {
                        year: year + 1,
                        month: 1,
                    }
                } else {
                    Period::Month {
                        year,
                        month: month + 1,
                    }
                }
            }
            Period::Year { year } => Period::Year { year: year + 1 },
        }
    }

    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.date_range().contains_day(today)
    }
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).unwrap()
}

pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_milli_opt(23, 59, 59, 999).unwrap()
}

/// Number of ISO weeks in `iso_year` (52 or 53).
pub fn weeks_in_iso_year(iso_year: i32) -> u32 {
    if NaiveDate::from_isoywd_opt(iso_year, 53, Weekday::Mon).is_some() {
        53
    } else {
        52
    }
}

/// Monday of the given ISO week. Out-of-range weeks clamp to the final week
/// of the year so arithmetic stays total.
fn iso_week_start(iso_year: i32, week: u32) -> NaiveDate {
    NaiveDate::from_isoywd_opt(iso_year, week.max(1), Weekday::Mon)
        .or_else(|| NaiveDate::from_isoywd_opt(iso_year, weeks_in_iso_year(iso_year), Weekday::Mon))
        .unwrap()
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month.clamp(1, 12), 1).unwrap()
}

/// Last calendar day of the month, i.e. day 0 of the following month.
pub fn last_of_month(year: i32, month: u32) -> NaiveDate {
    let month = month.clamp(1, 12);
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1).unwrap() - Duration::days(1)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    last_of_month(year, month).day()
}
