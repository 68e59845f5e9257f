use super::grid::{month_weeks, WeekdayExt};
use crate::events::CalendarIndex;
use crate::theme::{
    calendar::{CURSOR_MODIFIER, EVENT_DAY_STYLE, SELECTED_MODIFIER, TODAY_STYLE, WEEKEND_STYLE},
    BASE_STYLE, MONTH_STYLE, WEEKDAY_STYLE,
};
use crate::view::{is_weekend, ViewState};
use ratatui::{prelude::*, widgets::*};
use time::{Date, Weekday};

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
    Weekday::Saturday,
    Weekday::Sunday,
];

/// Number of columns per day of week
const DAY_WIDTH: u16 = 9;

/// Width of the grid in columns
pub(crate) const MAIN_WIDTH: u16 = DAY_WIDTH * 7;

/// Number of lines taken up by the month title, weekday header, and rule
const HEADER_LINES: u16 = 3;

/// Number of lines taken up by each week of the grid
const WEEK_LINES: u16 = 2;

/// Lines needed to show a six-week month in full
pub(crate) const HEIGHT: u16 = HEADER_LINES + 6 * WEEK_LINES - 1;

const ACS_HLINE: char = '─';

/// A single month laid out as a Monday-first grid, each day labelled with
/// the number of events on it
#[derive(Clone, Copy, Debug)]
pub(crate) struct MonthGrid<'a> {
    index: &'a CalendarIndex,
    today: Date,
    cursor: Option<Date>,
}

impl<'a> MonthGrid<'a> {
    pub(crate) fn new(index: &'a CalendarIndex, today: Date) -> Self {
        MonthGrid {
            index,
            today,
            cursor: None,
        }
    }

    /// Highlight `date` as the day under the cursor
    pub(crate) fn cursor(mut self, date: Option<Date>) -> Self {
        self.cursor = date;
        self
    }

    fn day_style(&self, date: Date, count: usize, selected: Option<Date>) -> Style {
        let mut style = BASE_STYLE;
        if is_weekend(date) {
            style = style.patch(WEEKEND_STYLE);
        }
        if count > 0 {
            style = style.patch(EVENT_DAY_STYLE);
        }
        if date == self.today {
            style = style.patch(TODAY_STYLE);
        }
        if selected == Some(date) {
            style = style.add_modifier(SELECTED_MODIFIER);
        }
        if self.cursor == Some(date) {
            style = style.add_modifier(CURSOR_MODIFIER);
        }
        style
    }
}

impl StatefulWidget for MonthGrid<'_> {
    type State = ViewState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let left = area.width.saturating_sub(MAIN_WIDTH) / 2;
        let [_, area, _] = Layout::horizontal([
            Constraint::Length(left),
            Constraint::Length(MAIN_WIDTH.min(area.width)),
            Constraint::Min(0),
        ])
        .areas(area);
        let mut canvas = BufferCanvas::new(area, buf);
        canvas.draw_title(&format!("{} {}", state.month(), state.year()));
        canvas.draw_header();
        for (i, week) in std::iter::zip(0u16.., month_weeks(state.year(), state.month())) {
            for (wd, date) in week.enumerate() {
                let count = self.index.lookup(date).len();
                let label = day_label(date, count, date == self.today);
                let style = self.day_style(date, count, state.selected());
                canvas.draw_day(i, wd, Span::styled(label, style));
            }
        }
    }
}

fn day_label(date: Date, count: usize, is_today: bool) -> String {
    let (open, close) = if is_today { ('[', ']') } else { (' ', ' ') };
    // Wider counts would spill into the next day's cell
    let count = match count {
        0 => String::new(),
        1..=99 => format!("({count})"),
        _ => String::from("(99+)"),
    };
    format!("{open}{:2}{close}{count:<4}", date.day())
}

#[derive(Debug, Eq, PartialEq)]
struct BufferCanvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl<'a> BufferCanvas<'a> {
    fn new(area: Rect, buf: &'a mut Buffer) -> Self {
        Self { area, buf }
    }

    fn draw_title(&mut self, title: &str) {
        let width = u16::try_from(title.chars().count()).unwrap_or(u16::MAX);
        let x = self.area.width.min(MAIN_WIDTH).saturating_sub(width) / 2;
        self.mvprint(0, x, title, Some(MONTH_STYLE));
    }

    fn draw_header(&mut self) {
        for wd in WEEKDAYS {
            let style = if is_weekend_day(wd) {
                WEEKDAY_STYLE.patch(WEEKEND_STYLE)
            } else {
                WEEKDAY_STYLE
            };
            let name = wd.to_string();
            self.mvprint(1, DAY_WIDTH * wd.index0(), format!(" {}", &name[..3]), Some(style));
        }
        self.hline(2, 0, ACS_HLINE, MAIN_WIDTH);
    }

    fn draw_day(&mut self, week_no: u16, wd: Weekday, s: Span<'_>) {
        self.mvprint(
            week_no * WEEK_LINES + HEADER_LINES,
            DAY_WIDTH * wd.index0(),
            s.content,
            Some(s.style),
        );
    }

    fn mvprint<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Option<Style>) {
        if y < self.area.height && x < self.area.width {
            let text = Text::styled(s.as_ref(), style.unwrap_or_default());
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            // Using a Paragraph lets us truncate text that extends beyond the
            // grid's area, though we need to be sure that the Rect passed to
            // the Paragraph is entirely within the frame lest a panic result.
            Paragraph::new(text).render(
                Rect {
                    x: x + self.area.x,
                    y: y + self.area.y,
                    width: (self.area.width - x).min(width),
                    height: 1,
                },
                self.buf,
            );
        }
    }

    fn hline(&mut self, y: u16, x: u16, ch: char, length: u16) {
        self.mvprint(y, x, String::from(ch).repeat(length.into()), None);
    }
}

fn is_weekend_day(wd: Weekday) -> bool {
    matches!(wd, Weekday::Saturday | Weekday::Sunday)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{CalendarEvent, EventType, Milestone};
    use time::macros::date;

    fn event(symbol: &str, date: Date) -> CalendarEvent {
        CalendarEvent {
            symbol: symbol.into(),
            company: format!("{symbol} PLC"),
            event_type: EventType::BonusIssue,
            milestone: Milestone::Announcement,
            amount: None,
            date,
        }
    }

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
    fn test_day_label() {
        assert_eq!(day_label(date!(2024 - 02 - 01), 0, false), "  1     ");
        assert_eq!(day_label(date!(2024 - 02 - 14), 3, false), " 14 (3) ");
        assert_eq!(day_label(date!(2024 - 02 - 14), 12, true), "[14](12)");
        assert_eq!(day_label(date!(2024 - 02 - 14), 99, false), " 14 (99)");
        let busy = day_label(date!(2024 - 02 - 14), 1000, true);
        assert_eq!(busy, "[14](99+)");
        assert!(busy.chars().count() <= usize::from(DAY_WIDTH));
    }

    #[test]
    fn test_render_month() {
        let index = CalendarIndex::build(vec![
            event("ABC", date!(2024 - 02 - 01)),
            event("XYZ", date!(2024 - 02 - 01)),
            event("ABC", date!(2024 - 03 - 01)),
        ]);
        let mut view = ViewState::new(date!(2024 - 02 - 14));
        let area = Rect::new(0, 0, MAIN_WIDTH, HEIGHT);
        let mut buf = Buffer::empty(area);
        MonthGrid::new(&index, date!(2024 - 02 - 14)).render(area, &mut buf, &mut view);
        let lines = lines(&buf);
        assert_eq!(lines[0].trim(), "February 2024");
        assert_eq!(
            lines[1].trim_end(),
            " Mon      Tue      Wed      Thu      Fri      Sat      Sun"
        );
        assert_eq!(lines[2], "─".repeat(usize::from(MAIN_WIDTH)));
        assert_eq!(
            lines[3].trim_end(),
            "                             1 (2)    2        3        4"
        );
        assert!(lines[7].contains("[14]"));
        assert_eq!(
            lines[11].trim_end(),
            " 26       27       28       29"
        );
        assert_eq!(lines[13].trim(), "");
    }

    #[test]
    fn test_render_styles() {
        let index = CalendarIndex::build(vec![event("ABC", date!(2024 - 02 - 01))]);
        let mut view = ViewState::new(date!(2024 - 02 - 14));
        view.select_day(date!(2024 - 02 - 12), date!(2024 - 02 - 14))
            .unwrap();
        let area = Rect::new(0, 0, MAIN_WIDTH, HEIGHT);
        let mut buf = Buffer::empty(area);
        MonthGrid::new(&index, date!(2024 - 02 - 14))
            .cursor(Some(date!(2024 - 02 - 13)))
            .render(area, &mut buf, &mut view);
        // Thursday the 1st has an event
        assert_eq!(buf[(3 * DAY_WIDTH + 2, 3)].style().fg, EVENT_DAY_STYLE.fg);
        // Saturday the 3rd is a weekend day
        assert_eq!(buf[(5 * DAY_WIDTH + 2, 3)].style().fg, WEEKEND_STYLE.fg);
        // Monday the 12th is selected and Tuesday the 13th has the cursor
        assert!(buf[(2, 7)].style().add_modifier.contains(SELECTED_MODIFIER));
        assert!(buf[(DAY_WIDTH + 2, 7)]
            .style()
            .add_modifier
            .contains(CURSOR_MODIFIER));
        // Wednesday the 14th is today
        assert_eq!(buf[(2 * DAY_WIDTH + 2, 7)].style().fg, TODAY_STYLE.fg);
    }

    #[test]
    fn test_render_narrow_area_does_not_panic() {
        let index = CalendarIndex::default();
        let mut view = ViewState::new(date!(2024 - 09 - 14));
        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);
        MonthGrid::new(&index, date!(2024 - 09 - 14)).render(area, &mut buf, &mut view);
        assert!(lines(&buf)[0].contains("Sept"));
    }
}
