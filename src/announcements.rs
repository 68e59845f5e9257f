use crate::events::{cycle_choice, Record};
use crate::theme::{BASE_STYLE, HIGHLIGHT_STYLE, TABLE_HEADER_STYLE};
use ratatui::{prelude::*, widgets::*};
use time::Date;

/// Which kind of record the announcements table lists
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) enum TypeFilter {
    #[default]
    All,
    Type(String),
}

impl TypeFilter {
    pub(crate) fn matches(&self, record: &Record) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Type(t) => record.event_type.as_str() == t,
        }
    }

    pub(crate) fn label(&self) -> &str {
        match self {
            TypeFilter::All => "All",
            TypeFilter::Type(t) => t,
        }
    }

    /// Step through "All" followed by each of `types` (which must be sorted),
    /// wrapping around at either end
    pub(crate) fn cycle(&self, types: &[String], forwards: bool) -> TypeFilter {
        let current = match self {
            TypeFilter::All => None,
            TypeFilter::Type(t) => Some(t.as_str()),
        };
        match cycle_choice(current, types, forwards) {
            Some(t) => TypeFilter::Type(t),
            None => TypeFilter::All,
        }
    }
}

/// Every normalized record in sheet order, optionally narrowed to one event
/// type
#[derive(Clone, Copy, Debug)]
pub(crate) struct Announcements<'a> {
    records: &'a [Record],
    filter: &'a TypeFilter,
}

impl<'a> Announcements<'a> {
    pub(crate) fn new(records: &'a [Record], filter: &'a TypeFilter) -> Self {
        Announcements { records, filter }
    }
}

impl StatefulWidget for Announcements<'_> {
    type State = TableState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let header = Row::new([
            "Symbol",
            "Company",
            "Event Type",
            "Announced",
            "XD Date",
            "Record Date",
            "Payment",
            "Amount",
        ])
        .style(TABLE_HEADER_STYLE);
        let rows = self
            .records
            .iter()
            .filter(|r| self.filter.matches(r))
            .map(|r| {
                Row::new([
                    r.symbol.clone(),
                    r.company.clone(),
                    r.event_type.to_string(),
                    date_cell(r.announcement_date),
                    date_cell(r.xd_date),
                    date_cell(r.record_date),
                    date_cell(r.payment_date),
                    r.amount.map_or_else(String::new, |a| a.to_string()),
                ])
            })
            .collect::<Vec<_>>();
        let count = rows.len();
        let widths = [
            Constraint::Length(8),
            Constraint::Min(16),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(11),
            Constraint::Length(10),
            Constraint::Length(8),
        ];
        let block = Block::bordered()
            .title(format!(
                " Announcements: {} ({count}) ",
                self.filter.label()
            ))
            .style(BASE_STYLE);
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(HIGHLIGHT_STYLE);
        StatefulWidget::render(table, area, buf, state);
    }
}

fn date_cell(date: Option<Date>) -> String {
    date.map_or_else(String::new, |d| d.to_string())
}
