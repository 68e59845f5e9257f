use crate::events::CalendarEvent;
use crate::theme::{BASE_STYLE, FOCUSED_BORDER_STYLE, HIGHLIGHT_STYLE};
use ratatui::{prelude::*, widgets::*};
use time::{format_description::BorrowedFormatItem, macros::format_description, Date};

static SHORT_DATE_FMT: &[BorrowedFormatItem<'_>] = format_description!("[day] [month repr:short]");

/// Events from today through the end of the lookahead window, soonest first
#[derive(Clone, Copy, Debug)]
pub(crate) struct Upcoming<'a> {
    events: &'a [&'a CalendarEvent],
    days: u16,
    focused: bool,
}

impl<'a> Upcoming<'a> {
    pub(crate) fn new(events: &'a [&'a CalendarEvent], days: u16) -> Self {
        Upcoming {
            events,
            days,
            focused: false,
        }
    }

    pub(crate) fn focused(mut self, yes: bool) -> Self {
        self.focused = yes;
        self
    }
}

impl StatefulWidget for Upcoming<'_> {
    type State = ListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let mut block = Block::bordered()
            .title(format!(" Upcoming ({} days) ", self.days))
            .style(BASE_STYLE);
        if self.focused {
            block = block.border_style(FOCUSED_BORDER_STYLE);
        }
        if self.events.is_empty() {
            Paragraph::new("No upcoming events")
                .block(block)
                .render(area, buf);
            return;
        }
        let items = self.events.iter().map(|ev| ListItem::new(entry(ev)));
        let mut list = List::new(items).block(block);
        if self.focused {
            list = list.highlight_style(HIGHLIGHT_STYLE);
        }
        StatefulWidget::render(list, area, buf, state);
    }
}

fn entry(ev: &CalendarEvent) -> String {
    format!("{} | {} | {}", ev.symbol, ev.milestone, short_date(ev.date))
}

fn short_date(date: Date) -> String {
    date.format(SHORT_DATE_FMT)
        .unwrap_or_else(|_| date.to_string())
}
