use super::{column, normalize_date, CalendarEvent, CalendarIndex, DateField, EventType, SymbolFilter};
use crate::source::{CellValue, RawRecord};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::str::FromStr;
use time::Date;

/// A source row with its dates and amount normalized
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Record {
    pub(crate) symbol: String,
    pub(crate) company: String,
    pub(crate) event_type: EventType,
    pub(crate) announcement_date: Option<Date>,
    pub(crate) xd_date: Option<Date>,
    pub(crate) record_date: Option<Date>,
    pub(crate) payment_date: Option<Date>,
    pub(crate) amount: Option<Decimal>,
}

impl Record {
    pub(crate) fn from_raw(raw: &RawRecord) -> Record {
        let date = |field: DateField| normalize_date(raw.get(field.column()));
        let amount = match raw.get(column::DIVIDEND_PER_SHARE) {
            CellValue::Empty => raw.get(column::AMOUNT),
            cell => cell,
        };
        Record {
            symbol: raw.text(column::SYMBOL),
            company: raw.text(column::COMPANY),
            event_type: EventType::parse(&raw.text(column::EVENT_TYPE)),
            announcement_date: date(DateField::Announcement),
            xd_date: date(DateField::Xd),
            record_date: date(DateField::Record),
            payment_date: date(DateField::Payment),
            amount: parse_amount(amount),
        }
    }

    pub(crate) fn date(&self, field: DateField) -> Option<Date> {
        match field {
            DateField::Announcement => self.announcement_date,
            DateField::Xd => self.xd_date,
            DateField::Record => self.record_date,
            DateField::Payment => self.payment_date,
        }
    }

    /// The dated milestones of this record, in emission order.  Milestones
    /// whose date is absent are skipped.
    pub(crate) fn events(&self) -> impl Iterator<Item = CalendarEvent> + '_ {
        self.event_type
            .milestones()
            .iter()
            .filter_map(move |&(milestone, field)| {
                self.date(field).map(|date| CalendarEvent {
                    symbol: self.symbol.clone(),
                    company: self.company.clone(),
                    event_type: self.event_type.clone(),
                    milestone,
                    amount: self.amount,
                    date,
                })
            })
    }
}

fn parse_amount(cell: &CellValue) -> Option<Decimal> {
    match cell {
        CellValue::Empty => None,
        CellValue::Text(s) => Decimal::from_str(&s.trim().replace(',', "")).ok(),
        CellValue::Number(n) => Decimal::try_from(*n).ok(),
    }
}

/// Everything derived from one successful fetch of the source
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Dataset {
    records: Vec<Record>,
    events: Vec<CalendarEvent>,
}

impl Dataset {
    pub(crate) fn from_raw(raw: &[RawRecord]) -> Dataset {
        let records = raw.iter().map(Record::from_raw).collect::<Vec<_>>();
        let events = records.iter().flat_map(Record::events).collect::<Vec<_>>();
        tracing::debug!(
            records = records.len(),
            events = events.len(),
            "derived calendar events"
        );
        Dataset { records, events }
    }

    pub(crate) fn records(&self) -> &[Record] {
        &self.records
    }

    /// Every derived event, in source order
    pub(crate) fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    /// Build a day index over the events passing `filter`
    pub(crate) fn index(&self, filter: &SymbolFilter) -> CalendarIndex {
        CalendarIndex::build(filter.apply(&self.events))
    }

    /// Distinct symbols among the derived events, sorted
    pub(crate) fn symbols(&self) -> Vec<String> {
        self.events
            .iter()
            .map(|ev| ev.symbol.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// Distinct years of the derived events' dates, ascending
    pub(crate) fn years(&self) -> Vec<i32> {
        self.events
            .iter()
            .map(|ev| ev.date.year())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct event types among the records, sorted by name
    pub(crate) fn event_types(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.event_type.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }
}
