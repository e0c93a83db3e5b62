//! Calendar month window used for expansion and aggregation.

use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::error::{DaybookError, DaybookResult};

/// A validated (year, month) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthWindow {
    year: i32,
    month: u32,
}

impl MonthWindow {
    pub fn new(year: i32, month: u32) -> DaybookResult<Self> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(DaybookError::InvalidMonth(month));
        }
        Ok(MonthWindow { year, month })
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        MonthWindow {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or(NaiveDate::MAX)
    }

    /// Every date of the month, first to last.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.last_day();
        self.first_day().iter_days().take_while(move |d| *d <= last)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            MonthWindow {
                year: self.year + 1,
                month: 1,
            }
        } else {
            MonthWindow {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            MonthWindow {
                year: self.year - 1,
                month: 12,
            }
        } else {
            MonthWindow {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}

impl fmt::Display for MonthWindow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.first_day().format("%B %Y"))
    }
}
