//! Acquisition date derivation.
//!
//! Composite products label each layer with a two-digit period index at the
//! end of the column name (`LAI20` is the 20th 8-day period). The period is
//! turned into a day-of-year, paired with the reference year as a
//! [`JulianDay`], and unrolled month by month into a calendar date.

use chrono::NaiveDate;

use crate::error::{Result, VegplotError};

/// Length of one composite period in days
pub const DEFAULT_PERIOD_DAYS: u32 = 8;

/// Whether `year` is a Gregorian leap year.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`.
///
/// Months outside 1..=12 have no days; callers iterating months must stop at 12.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Number of days in `year`.
pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// A (year, day-of-year) pair.
///
/// The pair is always valid: the year has four digits and the day lies
/// within that year, so the composed code is always `YYYYDDD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JulianDay {
    year: i32,
    day_of_year: u32,
}

impl JulianDay {
    /// Create a Julian day, rejecting days outside `1..=days_in_year(year)`.
    pub fn new(year: i32, day_of_year: i64) -> Result<Self> {
        if !(1000..=9999).contains(&year) {
            return Err(VegplotError::InvalidYear { year });
        }

        let max = days_in_year(year);
        if day_of_year < 1 || day_of_year > i64::from(max) {
            return Err(VegplotError::DayOfYearOutOfRange {
                year,
                day: day_of_year,
                max,
            });
        }

        Ok(Self {
            year,
            day_of_year: day_of_year as u32,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn day_of_year(&self) -> u32 {
        self.day_of_year
    }

    /// Compose the `YYYYDDD` code, e.g. (2012, 7) -> 2012007.
    pub fn code(&self) -> u32 {
        self.year as u32 * 1000 + self.day_of_year
    }

    /// Split a `YYYYDDD` code back into its year and day-of-year.
    pub fn from_code(code: u32) -> Result<Self> {
        let year = (code / 1000) as i32;
        let day = i64::from(code % 1000);
        Self::new(year, day)
    }

    /// Unroll the day-of-year into a calendar date.
    ///
    /// A day equal to the cumulative length of the first `k` months lands on
    /// the last day of month `k`: a month is only skipped when the remainder
    /// strictly exceeds its length.
    pub fn to_calendar_date(&self) -> Result<NaiveDate> {
        let mut remaining = self.day_of_year;
        let mut month = 1;

        while month <= 12 && remaining > days_in_month(self.year, month) {
            remaining -= days_in_month(self.year, month);
            month += 1;
        }

        NaiveDate::from_ymd_opt(self.year, month, remaining).ok_or_else(|| {
            VegplotError::DateOutOfRange {
                message: format!(
                    "{}-{:02}-{:02} (from Julian code {})",
                    self.year,
                    month,
                    remaining,
                    self.code()
                ),
            }
        })
    }
}

/// Parse the two-digit period index at the end of a column name.
pub fn period_from_column(column: &str) -> Result<u32> {
    let chars: Vec<char> = column.chars().collect();
    let suffix: String = chars[chars.len().saturating_sub(2)..].iter().collect();

    let invalid = || VegplotError::InvalidPeriodSuffix {
        column: column.to_string(),
        suffix: suffix.clone(),
    };

    if suffix.chars().count() != 2 || !suffix.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    suffix.parse::<u32>().map_err(|_| invalid())
}

/// First day-of-year covered by a composite period (1-based).
pub fn day_of_year_for_period(period: u32, period_days: u32) -> i64 {
    i64::from(period) * i64::from(period_days) - i64::from(period_days) + 1
}

/// Derive the acquisition date encoded in a column name.
pub fn acquisition_date(column: &str, year: i32, period_days: u32) -> Result<NaiveDate> {
    let period = period_from_column(column)?;
    let day = day_of_year_for_period(period, period_days);
    let julian = JulianDay::new(year, day)?;
    JulianDay::from_code(julian.code())?.to_calendar_date()
}
