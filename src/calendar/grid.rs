use std::iter::successors;
use time::{Date, Duration, Month, Weekday, Weekday::*};

const DAYS_IN_WEEK: usize = 7;

pub(super) trait WeekdayExt {
    fn index0(&self) -> u16;
}

impl WeekdayExt for Weekday {
    fn index0(&self) -> u16 {
        self.number_days_from_monday().into()
    }
}

/// One row of a month grid, Monday first.  Days belonging to a neighboring
/// month are left empty.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
// Invariant: At least one element of the array is Some
pub(super) struct Week([Option<Date>; DAYS_IN_WEEK]);

impl Week {
    fn new(date: Date) -> Self {
        let mut this = Week([None; DAYS_IN_WEEK]);
        this.set(date);
        this
    }

    fn set(&mut self, date: Date) {
        let i = usize::from(date.weekday().index0());
        assert!(i < DAYS_IN_WEEK);
        self.0[i] = Some(date);
    }

    pub(super) fn enumerate(&self) -> EnumerateWeek<'_> {
        EnumerateWeek::new(self)
    }

    pub(super) fn get(&self, wd: Weekday) -> Option<Date> {
        self.0.get(usize::from(wd.index0())).copied().flatten()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct EnumerateWeek<'a> {
    week: &'a Week,
    next_weekday: Option<Weekday>,
}

impl<'a> EnumerateWeek<'a> {
    fn new(week: &'a Week) -> Self {
        EnumerateWeek {
            week,
            next_weekday: Some(Monday),
        }
    }
}

impl Iterator for EnumerateWeek<'_> {
    type Item = (Weekday, Date);

    fn next(&mut self) -> Option<(Weekday, Date)> {
        loop {
            let wd = self.next_weekday?;
            self.next_weekday = match wd.next() {
                Monday => None,
                wd2 => Some(wd2),
            };
            if let Some(date) = self.week.get(wd) {
                return Some((wd, date));
            }
        }
    }
}

/// The weeks of the given month, first to last.  Empty only if the month lies
/// outside the representable range of dates.
pub(super) fn month_weeks(year: i32, month: Month) -> Vec<Week> {
    let Ok(first) = Date::from_calendar_date(year, month, 1) else {
        return Vec::new();
    };
    let mut weeks: Vec<Week> = Vec::with_capacity(6);
    for date in successors(Some(first), |d| d.next_day()).take_while(|d| d.month() == month) {
        if date.weekday() == Monday || weeks.is_empty() {
            weeks.push(Week::new(date));
        } else if let Some(week) = weeks.last_mut() {
            week.set(date);
        }
    }
    weeks
}

pub(crate) fn days_in_month(year: i32, month: Month) -> u8 {
    match month {
        Month::February if Date::from_calendar_date(year, month, 29).is_ok() => 29,
        Month::February => 28,
        Month::April | Month::June | Month::September | Month::November => 30,
        _ => 31,
    }
}

/// Move `date` by `days`, provided the result stays within the same month
pub(crate) fn move_within_month(date: Date, days: i64) -> Option<Date> {
    date.checked_add(Duration::days(days))
        .filter(|d| d.month() == date.month() && d.year() == date.year())
}
