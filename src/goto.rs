use crate::theme::{
    goto::{READY_ENTER_STYLE, UNFILLED_CELL_STYLE},
    BASE_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Margin, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Clear, StatefulWidget, Widget},
};
use time::{Date, Month};

const OUTER_WIDTH: u16 = 18;
const OUTER_HEIGHT: u16 = 8;
const ENTER_POS: usize = 8;

/// Popup for typing in a date to open
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct GoTo;

impl StatefulWidget for GoTo {
    type State = GoToState;

    /*
     * ..................
     * .┌─ Go To Date ─┐.
     * .│              │.
     * .│  YYYY-MM-DD  │.
     * .│              │.
     * .│   [ENTER]    │.
     * .└──────────────┘.
     * ..................
     */

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let [outer_area] = Layout::horizontal([OUTER_WIDTH])
            .flex(Flex::Center)
            .areas(area);
        let [outer_area] = Layout::vertical([OUTER_HEIGHT])
            .flex(Flex::Center)
            .areas(outer_area);
        Clear.render(outer_area, buf);
        Block::new().style(BASE_STYLE).render(outer_area, buf);
        let block_area = outer_area.inner(Margin::new(1, 1));
        Block::bordered()
            .title(" Go To Date ")
            .title_alignment(Alignment::Center)
            .render(block_area, buf);
        let text_area = block_area.inner(Margin::new(1, 1));
        state.to_text().render(text_area, buf);
    }
}

/// Digits typed so far, `YYYYMMDD`, followed by the "enter" position
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct GoToState {
    digits: [Option<u8>; ENTER_POS],
    pos: usize,
}

impl GoToState {
    pub(crate) fn new() -> GoToState {
        GoToState::default()
    }

    fn to_text(self) -> Text<'static> {
        Text::from_iter([
            Line::styled("", BASE_STYLE),
            self.to_line(),
            Line::styled("", BASE_STYLE),
            // Style a span and convert it to a line rather than creating a
            // styled line directly so that only the "[ENTER]" text and not any
            // of its centering padding will be underlined:
            Line::from(Span::styled(
                "[ENTER]",
                if self.pos == ENTER_POS {
                    READY_ENTER_STYLE
                } else {
                    BASE_STYLE
                },
            )),
        ])
        .centered()
    }

    fn to_line(self) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, (dg, fallback)) in std::iter::zip(self.digits, "YYYYMMDD".chars()).enumerate() {
            if i == 4 || i == 6 {
                spans.push(Span::styled("-", BASE_STYLE));
            }
            spans.push(match dg {
                Some(d) => Span::styled(d.to_string(), BASE_STYLE),
                None => Span::styled(fallback.to_string(), UNFILLED_CELL_STYLE),
            });
        }
        Line::from_iter(spans)
    }

    fn number(&self, start: usize, end: usize) -> u16 {
        self.digits[start..end]
            .iter()
            .fold(0, |acc, d| acc * 10 + u16::from(d.unwrap_or_default()))
    }

    fn date(&self) -> Option<Date> {
        let year = i32::from(self.number(0, 4));
        let month = Month::try_from(u8::try_from(self.number(4, 6)).ok()?).ok()?;
        let day = u8::try_from(self.number(6, 8)).ok()?;
        Date::from_calendar_date(year, month, day).ok()
    }

    pub(crate) fn handle_input(&mut self, input: GoToInput) -> GoToOutput {
        match (input, self.pos) {
            (GoToInput::Digit(d), 0..ENTER_POS) if d < 10 => {
                self.digits[self.pos] = Some(d);
                self.pos += 1;
                GoToOutput::Ok
            }
            (GoToInput::Backspace, 1..) => {
                self.pos -= 1;
                self.digits[self.pos] = None;
                GoToOutput::Ok
            }
            (GoToInput::Enter, ENTER_POS) => match self.date() {
                Some(date) => GoToOutput::Jump(date),
                None => GoToOutput::Invalid,
            },
            _ => GoToOutput::Invalid,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum GoToInput {
    Digit(u8),
    Backspace,
    Enter,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum GoToOutput {
    Ok,
    Invalid,
    Jump(Date),
}
