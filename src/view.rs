use thiserror::Error;
use time::{Date, Month, Weekday};

/// Which month is on screen and which day (if any) has been opened
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct ViewState {
    selected: Option<Date>,
    month: Month,
    year: i32,
}

impl ViewState {
    /// Start out showing the month containing `date`, with nothing selected
    pub(crate) fn new(date: Date) -> ViewState {
        ViewState {
            selected: None,
            month: date.month(),
            year: date.year(),
        }
    }

    pub(crate) fn selected(&self) -> Option<Date> {
        self.selected
    }

    pub(crate) fn month(&self) -> Month {
        self.month
    }

    pub(crate) fn year(&self) -> i32 {
        self.year
    }

    /// Returns whether `date` lies in the displayed month
    pub(crate) fn shows(&self, date: Date) -> bool {
        date.month() == self.month && date.year() == self.year
    }

    /// Show the previous month.  There is no wrapping into the previous year;
    /// at January this fails and nothing changes.
    pub(crate) fn previous_month(&mut self) -> Result<(), NavError> {
        if self.month == Month::January {
            return Err(NavError::FirstMonth);
        }
        self.month = self.month.previous();
        Ok(())
    }

    /// Show the next month.  There is no wrapping into the next year; at
    /// December this fails and nothing changes.
    pub(crate) fn next_month(&mut self) -> Result<(), NavError> {
        if self.month == Month::December {
            return Err(NavError::LastMonth);
        }
        self.month = self.month.next();
        Ok(())
    }

    pub(crate) fn select_month(&mut self, month: Month) {
        self.month = month;
    }

    /// Show `year`, which must be one of `available`
    pub(crate) fn select_year(&mut self, year: i32, available: &[i32]) -> Result<(), NavError> {
        if !available.contains(&year) {
            return Err(NavError::NoSuchYear(year));
        }
        self.year = year;
        Ok(())
    }

    /// Show the next (or previous) year in `available` (sorted ascending)
    /// relative to the displayed one, without wrapping
    pub(crate) fn step_year(&mut self, available: &[i32], forwards: bool) -> Result<(), NavError> {
        let target = if forwards {
            available.iter().copied().find(|&y| y > self.year)
        } else {
            available.iter().copied().rev().find(|&y| y < self.year)
        };
        match target {
            Some(y) => self.select_year(y, available),
            None if forwards => Err(NavError::LastYear),
            None => Err(NavError::FirstYear),
        }
    }

    /// Open `date`.  Only days of the displayed month can be selected, and
    /// weekend days only when they are `today`.
    pub(crate) fn select_day(&mut self, date: Date, today: Date) -> Result<(), NavError> {
        if !self.shows(date) {
            return Err(NavError::OutsideMonth(date));
        }
        if is_weekend(date) && date != today {
            return Err(NavError::Weekend(date));
        }
        self.selected = Some(date);
        Ok(())
    }

    pub(crate) fn back_to_calendar(&mut self) {
        self.selected = None;
    }

    /// Open `date` and show the month it falls in
    pub(crate) fn jump_to(&mut self, date: Date) {
        self.selected = Some(date);
        self.month = date.month();
        self.year = date.year();
    }

    /// Show the month containing `today`, leaving any selection alone
    pub(crate) fn jump_to_today(&mut self, today: Date) {
        self.month = today.month();
        self.year = today.year();
    }
}

pub(crate) fn is_weekend(date: Date) -> bool {
    matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub(crate) enum NavError {
    #[error("already showing January")]
    FirstMonth,
    #[error("already showing December")]
    LastMonth,
    #[error("no events in {0}")]
    NoSuchYear(i32),
    #[error("no earlier year with events")]
    FirstYear,
    #[error("no later year with events")]
    LastYear,
    #[error("{0} is not in the displayed month")]
    OutsideMonth(Date),
    #[error("{0} is a weekend day")]
    Weekend(Date),
}
