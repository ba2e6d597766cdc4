use crate::errors::TrackerError;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// A (year, month) pair. `month` is 0-based, January is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Scope {
    year: i32,
    month: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopePosition {
    Past,
    Current,
    Future,
}

impl Scope {
    pub fn new(year: i32, month: u32) -> Result<Self, TrackerError> {
        if month > 11 {
            return Err(TrackerError::InvalidMonth(month));
        }
        if NaiveDate::from_ymd_opt(year, 1, 1).is_none()
            || NaiveDate::from_ymd_opt(year, 12, 31).is_none()
        {
            return Err(TrackerError::InvalidYear(year));
        }
        Ok(Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month0(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn days_in_month(&self) -> usize {
        days_in_month(self.year, self.month)
    }

    pub fn previous(&self) -> Self {
        if self.month == 0 {
            Self {
                year: self.year - 1,
                month: 11,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn storage_key(&self) -> String {
        format!("habits-{}-{}", self.year, self.month)
    }

    pub fn position(&self, today: NaiveDate) -> ScopePosition {
        let current = Self::containing(today);
        match (self.year, self.month).cmp(&(current.year, current.month)) {
            std::cmp::Ordering::Less => ScopePosition::Past,
            std::cmp::Ordering::Equal => ScopePosition::Current,
            std::cmp::Ordering::Greater => ScopePosition::Future,
        }
    }

    /// Past months pin to their last day, future months yield `None`.
    pub fn elapsed_index(&self, today: NaiveDate) -> Option<usize> {
        match self.position(today) {
            ScopePosition::Current => Some(today.day0() as usize),
            ScopePosition::Past => Some(self.days_in_month().saturating_sub(1)),
            ScopePosition::Future => None,
        }
    }

    /// Same as [`Scope::elapsed_index`] but defaults future scopes to day 0.
    pub fn reference_index(&self, today: NaiveDate) -> usize {
        self.elapsed_index(today).unwrap_or(0)
    }

    pub fn is_future_day(&self, day: usize, today: NaiveDate) -> bool {
        match self.position(today) {
            ScopePosition::Past => false,
            ScopePosition::Current => day > today.day0() as usize,
            ScopePosition::Future => true,
        }
    }
}

pub fn days_in_month(year: i32, month: u32) -> usize {
    match month {
        1 if is_leap_year(year) => 29,
        1 => 28,
        3 | 5 | 8 | 10 => 30,
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}
