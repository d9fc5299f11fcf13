//! Date Windows
//!
//! Inclusive calendar-date windows used to restrict which list entries count
//! toward rate-based actions, plus the recurrence-period math that derives the
//! "current period" window for a given day.
//!
//! Weeks start on Monday (ISO 8601). Biweekly periods are aligned to pairs of
//! ISO weeks: odd-numbered weeks open a period, even-numbered weeks close it.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::records::{ListEntry, RecurrencePeriod};

/// Inclusive `[start, end]` range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Create a window, rejecting one that ends before it starts.
    pub fn new(start: NaiveDate, end: NaiveDate) -> CoreResult<Self> {
        if end < start {
            return Err(CoreError::validation(format!(
                "date window ends ({}) before it starts ({})",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse a window from two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> CoreResult<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// The recurrence period that contains `on`.
    pub fn for_period(period: RecurrencePeriod, on: NaiveDate) -> CoreResult<Self> {
        let (start, end) = match period {
            RecurrencePeriod::Daily => (on, on),
            RecurrencePeriod::Weekly => {
                let start = week_start(on);
                (start, start + Duration::days(6))
            }
            RecurrencePeriod::Biweekly => {
                let start = biweek_start(on);
                (start, start + Duration::days(13))
            }
            RecurrencePeriod::Monthly => {
                let start = ymd(on.year(), on.month(), 1)?;
                (start, month_end(on.year(), on.month())?)
            }
            RecurrencePeriod::Quarterly => {
                let first_month = (on.month0() / 3) * 3 + 1;
                let start = ymd(on.year(), first_month, 1)?;
                (start, month_end(on.year(), first_month + 2)?)
            }
            RecurrencePeriod::Yearly => (ymd(on.year(), 1, 1)?, ymd(on.year(), 12, 31)?),
        };
        Self::new(start, end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Entries without a timestamp never fall inside a window.
    pub fn contains_entry(&self, entry: &ListEntry) -> bool {
        entry.date().is_some_and(|d| self.contains(d))
    }

    /// Number of days covered, inclusive
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| CoreError::parse(format!("invalid date '{}': {}", s, e)))
}

fn week_start(on: NaiveDate) -> NaiveDate {
    on - Duration::days(i64::from(on.weekday().num_days_from_monday()))
}

/// Fortnights are counted from Monday 0001-01-01, so consecutive windows
/// tile without gaps or overlap across year boundaries.
fn biweek_start(on: NaiveDate) -> NaiveDate {
    let start = week_start(on);
    let weeks = i64::from(start.num_days_from_ce() - 1).div_euclid(7);
    start - Duration::days(7 * weeks.rem_euclid(2))
}

fn ymd(year: i32, month: u32, day: u32) -> CoreResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| CoreError::internal(format!("invalid date {}-{}-{}", year, month, day)))
}

fn month_end(year: i32, month: u32) -> CoreResult<NaiveDate> {
    let next_month_start = if month == 12 {
        ymd(year + 1, 1, 1)?
    } else {
        ymd(year, month + 1, 1)?
    };
    Ok(next_month_start - Duration::days(1))
}

impl fmt::Display for RecurrencePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecurrencePeriod::Daily => "daily",
            RecurrencePeriod::Weekly => "weekly",
            RecurrencePeriod::Biweekly => "biweekly",
            RecurrencePeriod::Monthly => "monthly",
            RecurrencePeriod::Quarterly => "quarterly",
            RecurrencePeriod::Yearly => "yearly",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for RecurrencePeriod {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(RecurrencePeriod::Daily),
            "weekly" => Ok(RecurrencePeriod::Weekly),
            "biweekly" => Ok(RecurrencePeriod::Biweekly),
            "monthly" => Ok(RecurrencePeriod::Monthly),
            "quarterly" => Ok(RecurrencePeriod::Quarterly),
            "yearly" | "annually" => Ok(RecurrencePeriod::Yearly),
            other => Err(CoreError::parse(format!(
                "unknown recurrence period: {}",
                other
            ))),
        }
    }
}
