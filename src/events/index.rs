use super::CalendarEvent;
use std::collections::HashMap;
use std::iter::successors;
use time::{Date, Duration};

/// Derived events grouped by the day they fall on
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct CalendarIndex {
    // Each bucket keeps its events in insertion order
    days: HashMap<Date, Vec<CalendarEvent>>,
    len: usize,
}

impl CalendarIndex {
    pub(crate) fn build<I: IntoIterator<Item = CalendarEvent>>(events: I) -> CalendarIndex {
        let mut days: HashMap<Date, Vec<CalendarEvent>> = HashMap::new();
        let mut len = 0;
        for ev in events {
            days.entry(ev.date).or_default().push(ev);
            len += 1;
        }
        CalendarIndex { days, len }
    }

    /// Total number of events across all days
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// The events on `date`, in insertion order
    pub(crate) fn lookup(&self, date: Date) -> &[CalendarEvent] {
        self.days.get(&date).map_or(&[][..], Vec::as_slice)
    }

    /// All events from `start` through `end` inclusive, ordered by date and
    /// then by insertion order.  Empty if `start` is after `end`.
    pub(crate) fn events_between(&self, start: Date, end: Date) -> Vec<&CalendarEvent> {
        successors(Some(start), |d| d.next_day())
            .take_while(|&d| d <= end)
            .flat_map(|d| self.lookup(d))
            .collect()
    }

    /// Events from `today` through `days` days after it
    pub(crate) fn upcoming(&self, today: Date, days: u16) -> Vec<&CalendarEvent> {
        let end = today
            .checked_add(Duration::days(i64::from(days)))
            .unwrap_or(Date::MAX);
        self.events_between(today, end)
    }
}

/// Which companies' events are shown
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) enum SymbolFilter {
    #[default]
    All,
    Symbol(String),
}

impl SymbolFilter {
    pub(crate) fn matches(&self, event: &CalendarEvent) -> bool {
        match self {
            SymbolFilter::All => true,
            SymbolFilter::Symbol(s) => event.symbol == *s,
        }
    }

    /// The events passing this filter, unchanged and in their original order
    pub(crate) fn apply(&self, events: &[CalendarEvent]) -> Vec<CalendarEvent> {
        events.iter().filter(|ev| self.matches(ev)).cloned().collect()
    }

    pub(crate) fn label(&self) -> &str {
        match self {
            SymbolFilter::All => "All",
            SymbolFilter::Symbol(s) => s,
        }
    }

    /// Step through "All" followed by each of `symbols` (which must be
    /// sorted), wrapping around at either end
    pub(crate) fn cycle(&self, symbols: &[String], forwards: bool) -> SymbolFilter {
        let current = match self {
            SymbolFilter::All => None,
            SymbolFilter::Symbol(s) => Some(s.as_str()),
        };
        match cycle_choice(current, symbols, forwards) {
            Some(s) => SymbolFilter::Symbol(s),
            None => SymbolFilter::All,
        }
    }
}

/// Step through "nothing chosen" (`None`) followed by each of `choices`
/// (which must be sorted), wrapping around at either end.  A `current` value
/// not among `choices` counts as nothing chosen.
pub(crate) fn cycle_choice(
    current: Option<&str>,
    choices: &[String],
    forwards: bool,
) -> Option<String> {
    let pos = current.map_or(0, |c| {
        choices
            .binary_search_by(|s| s.as_str().cmp(c))
            .map_or(0, |i| i + 1)
    });
    let total = choices.len() + 1;
    let next = if forwards {
        (pos + 1) % total
    } else {
        (pos + total - 1) % total
    };
    next.checked_sub(1)
        .and_then(|i| choices.get(i))
        .cloned()
}
