use crate::events::CalendarEvent;
use crate::theme::{BASE_STYLE, TABLE_HEADER_STYLE};
use ratatui::{prelude::*, widgets::*};
use time::{format_description::BorrowedFormatItem, macros::format_description, Date};

static HEADING_FMT: &[BorrowedFormatItem<'_>] =
    format_description!("[day] [month repr:long] [year]");

/// The events falling on one selected day, as a table
#[derive(Clone, Copy, Debug)]
pub(crate) struct DayDetails<'a> {
    date: Date,
    events: &'a [CalendarEvent],
}

impl<'a> DayDetails<'a> {
    pub(crate) fn new(date: Date, events: &'a [CalendarEvent]) -> Self {
        DayDetails { date, events }
    }
}

impl Widget for DayDetails<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let heading = self
            .date
            .format(HEADING_FMT)
            .unwrap_or_else(|_| self.date.to_string());
        let block = Block::bordered()
            .title(format!(" Events on {heading} "))
            .style(BASE_STYLE);
        if self.events.is_empty() {
            Paragraph::new("No events for the day")
                .block(block)
                .render(area, buf);
            return;
        }
        let header = Row::new(["Symbol", "Company", "Event Type", "Event", "Amount"])
            .style(TABLE_HEADER_STYLE);
        let rows = self.events.iter().map(|ev| {
            Row::new([
                ev.symbol.clone(),
                ev.company.clone(),
                ev.event_type.to_string(),
                ev.milestone.to_string(),
                ev.amount.map_or_else(String::new, |a| a.to_string()),
            ])
        });
        let widths = [
            Constraint::Length(8),
            Constraint::Min(16),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Length(8),
        ];
        Widget::render(Table::new(rows, widths).header(header).block(block), area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventType, Milestone};
    use rust_decimal::Decimal;
    use time::macros::date;

    fn lines(buf: &Buffer) -> Vec<String> {
        let area = buf.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn test_render_events() {
        let events = [CalendarEvent {
            symbol: "ABC".into(),
            company: "ABC PLC".into(),
            event_type: EventType::Dividend,
            milestone: Milestone::ExDividend,
            amount: Some(Decimal::new(250, 2)),
            date: date!(2024 - 02 - 01),
        }];
        let area = Rect::new(0, 0, 72, 5);
        let mut buf = Buffer::empty(area);
        DayDetails::new(date!(2024 - 02 - 01), &events).render(area, &mut buf);
        let lines = lines(&buf);
        assert!(lines[0].contains(" Events on 01 February 2024 "));
        assert!(lines[1].contains("Symbol"));
        assert!(lines[1].contains("Amount"));
        assert!(lines[2].contains("ABC PLC"));
        assert!(lines[2].contains("Dividend"));
        assert!(lines[2].contains("Ex-Dividend"));
        assert!(lines[2].contains("2.50"));
    }

    #[test]
    fn test_render_empty_day() {
        let area = Rect::new(0, 0, 50, 3);
        let mut buf = Buffer::empty(area);
        DayDetails::new(date!(2024 - 12 - 25), &[]).render(area, &mut buf);
        let lines = lines(&buf);
        assert!(lines[0].contains(" Events on 25 December 2024 "));
        assert!(lines[1].contains("No events for the day"));
    }
}
