use crate::announcements::{Announcements, TypeFilter};
use crate::cache::TtlCache;
use crate::calendar::{days_in_month, move_within_month, MonthGrid, HEIGHT, MAIN_WIDTH};
use crate::details::DayDetails;
use crate::events::{CalendarIndex, Dataset, SymbolFilter};
use crate::goto::{GoTo, GoToInput, GoToOutput, GoToState};
use crate::help::Help;
use crate::source::{RecordSource, SourceError};
use crate::theme::{BASE_STYLE, ERROR_STYLE, STATUS_STYLE, TITLE_STYLE};
use crate::upcoming::Upcoming;
use crate::view::{NavError, ViewState};
use crossterm::event::{read, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{ListState, Paragraph, StatefulWidget, TableState, Widget},
    Terminal,
};
use std::io::{self, Write};
use std::time::{Duration, Instant};
use time::{Date, Month, OffsetDateTime, UtcOffset};

#[derive(Debug)]
pub(crate) struct App {
    source: Box<dyn RecordSource>,
    cache: TtlCache<Dataset>,
    filter: SymbolFilter,
    type_filter: TypeFilter,
    symbols: Vec<String>,
    years: Vec<i32>,
    types: Vec<String>,
    index: CalendarIndex,
    view: ViewState,
    cursor: Date,
    today: Date,
    offset: Option<UtcOffset>,
    upcoming_days: u16,
    upcoming: ListState,
    announcements: TableState,
    error: Option<String>,
    state: AppState,
}

impl App {
    pub(crate) fn new(
        source: Box<dyn RecordSource>,
        ttl: Duration,
        upcoming_days: u16,
        today: Date,
    ) -> App {
        App {
            source,
            cache: TtlCache::new(ttl),
            filter: SymbolFilter::All,
            type_filter: TypeFilter::All,
            symbols: Vec::new(),
            years: Vec::new(),
            types: Vec::new(),
            index: CalendarIndex::default(),
            view: ViewState::new(today),
            cursor: today,
            today,
            offset: None,
            upcoming_days,
            upcoming: ListState::default(),
            announcements: TableState::default(),
            error: None,
            state: AppState::Calendar,
        }
    }

    /// Open on the month containing `date` rather than today's
    pub(crate) fn start_date(mut self, date: Date) -> App {
        self.view = ViewState::new(date);
        self.cursor = date;
        self
    }

    /// Advance "today" when the local date changes while running.  The
    /// offset has to be determined before any other threads are started.
    pub(crate) fn local_offset(mut self, offset: UtcOffset) -> App {
        self.offset = Some(offset);
        self
    }

    pub(crate) fn run<B: Backend>(mut self, mut terminal: Terminal<B>) -> io::Result<()> {
        while !self.quitting() {
            if let Some(offset) = self.offset {
                self.set_today(OffsetDateTime::now_utc().to_offset(offset).date());
            }
            self.check_source(Instant::now());
            self.draw(&mut terminal)?;
            self.handle_input()?;
        }
        Ok(())
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|frame| frame.render_widget(self, frame.area()))?;
        Ok(())
    }

    /// Re-read the source if the current snapshot has outlived its TTL, or
    /// unconditionally if `force` is set.  Returns whether a new snapshot was
    /// loaded.  On failure the previous snapshot stays in place.
    pub(crate) fn refresh(&mut self, now: Instant, force: bool) -> Result<bool, SourceError> {
        if force {
            self.cache.expire();
        }
        let source = &self.source;
        let fetched = self
            .cache
            .refresh(now, || source.fetch().map(|raw| Dataset::from_raw(&raw)))?;
        if fetched {
            self.error = None;
            self.rebuild();
        }
        Ok(fetched)
    }

    fn check_source(&mut self, now: Instant) {
        if let Err(e) = self.refresh(now, false) {
            self.report(&e);
        }
    }

    fn force_refresh(&mut self) {
        tracing::info!(source = %self.source.describe(), "refresh requested");
        if let Err(e) = self.refresh(Instant::now(), true) {
            self.report(&e);
        }
    }

    fn report(&mut self, e: &SourceError) {
        let msg = error_chain(e);
        tracing::warn!(source = %self.source.describe(), error = %msg, "refresh failed; keeping previous snapshot");
        self.error = Some(msg);
    }

    fn set_today(&mut self, today: Date) {
        if today == self.today {
            return;
        }
        tracing::info!(%today, "local date changed");
        self.today = today;
        // The upcoming list now covers a different window
        self.upcoming.select(None);
        if self.state == AppState::Upcoming {
            self.state = AppState::Calendar;
        }
    }

    /// Recompute everything derived from the snapshot and the filters
    fn rebuild(&mut self) {
        let Some(data) = self.cache.get() else {
            return;
        };
        self.symbols = data.symbols();
        self.years = data.years();
        self.types = data.event_types();
        let stale_symbol = matches!(
            &self.filter,
            SymbolFilter::Symbol(s) if self.symbols.binary_search(s).is_err()
        );
        if stale_symbol {
            self.filter = SymbolFilter::All;
        }
        let stale_type = matches!(
            &self.type_filter,
            TypeFilter::Type(t) if self.types.binary_search(t).is_err()
        );
        if stale_type {
            self.type_filter = TypeFilter::All;
        }
        self.index = data.index(&self.filter);
        tracing::debug!(
            filter = self.filter.label(),
            events = self.index.len(),
            "rebuilt calendar index"
        );
    }

    fn handle_input(&mut self) -> io::Result<()> {
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        if let Some(KeyEvent {
            code, modifiers, ..
        }) = read()?.as_key_press_event()
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match &mut self.state {
            AppState::Calendar => match key {
                KeyCode::Char('h') | KeyCode::Left => self.move_cursor(-1),
                KeyCode::Char('l') | KeyCode::Right => self.move_cursor(1),
                KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-7),
                KeyCode::Char('j') | KeyCode::Down => self.move_cursor(7),
                KeyCode::Enter | KeyCode::Char(' ') => {
                    let r = self.view.select_day(self.cursor, self.today);
                    accepted(r)
                }
                KeyCode::Char('b') | KeyCode::Esc => {
                    if self.view.selected().is_some() {
                        self.view.back_to_calendar();
                        true
                    } else {
                        false
                    }
                }
                KeyCode::Char('p') | KeyCode::PageUp => {
                    let r = self.view.previous_month();
                    self.after_nav(r)
                }
                KeyCode::Char('n') | KeyCode::PageDown => {
                    let r = self.view.next_month();
                    self.after_nav(r)
                }
                KeyCode::F(n) => match Month::try_from(n) {
                    Ok(month) => {
                        self.view.select_month(month);
                        self.after_nav(Ok(()))
                    }
                    Err(_) => false,
                },
                KeyCode::Char('y') => {
                    let r = self.view.step_year(&self.years, true);
                    self.after_nav(r)
                }
                KeyCode::Char('Y') => {
                    let r = self.view.step_year(&self.years, false);
                    self.after_nav(r)
                }
                KeyCode::Char('f') => self.cycle_symbol(true),
                KeyCode::Char('F') => self.cycle_symbol(false),
                KeyCode::Char('t') | KeyCode::Home => {
                    self.view.jump_to_today(self.today);
                    self.cursor = self.today;
                    true
                }
                KeyCode::Char('g') => {
                    self.state = AppState::GoingTo(GoToState::new());
                    true
                }
                KeyCode::Tab => {
                    if self.index.upcoming(self.today, self.upcoming_days).is_empty() {
                        false
                    } else {
                        self.upcoming.select(Some(0));
                        self.state = AppState::Upcoming;
                        true
                    }
                }
                KeyCode::Char('a') => {
                    self.announcements.select(Some(0));
                    self.state = AppState::Announcements;
                    true
                }
                KeyCode::Char('r') => {
                    self.force_refresh();
                    true
                }
                KeyCode::Char('q') => {
                    self.state = AppState::Quitting;
                    true
                }
                KeyCode::Char('?') => {
                    self.state = AppState::Helping;
                    true
                }
                _ => false,
            },
            AppState::Upcoming => match key {
                KeyCode::Char('k') | KeyCode::Up => {
                    self.upcoming.select_previous();
                    true
                }
                KeyCode::Char('j') | KeyCode::Down => {
                    self.upcoming.select_next();
                    true
                }
                KeyCode::Enter | KeyCode::Char(' ') => {
                    let target = self.upcoming.selected().and_then(|i| {
                        self.index
                            .upcoming(self.today, self.upcoming_days)
                            .get(i)
                            .map(|ev| ev.date)
                    });
                    match target {
                        Some(date) => {
                            self.jump_to(date);
                            self.state = AppState::Calendar;
                            true
                        }
                        None => false,
                    }
                }
                KeyCode::Tab | KeyCode::Char('b') | KeyCode::Esc => {
                    self.state = AppState::Calendar;
                    true
                }
                KeyCode::Char('q') => {
                    self.state = AppState::Quitting;
                    true
                }
                _ => false,
            },
            AppState::Announcements => match key {
                KeyCode::Char('k') | KeyCode::Up => {
                    self.announcements.select_previous();
                    true
                }
                KeyCode::Char('j') | KeyCode::Down => {
                    self.announcements.select_next();
                    true
                }
                KeyCode::Char('e') => self.cycle_type(true),
                KeyCode::Char('E') => self.cycle_type(false),
                KeyCode::Char('r') => {
                    self.force_refresh();
                    true
                }
                KeyCode::Char('a' | 'b') | KeyCode::Esc => {
                    self.state = AppState::Calendar;
                    true
                }
                KeyCode::Char('q') => {
                    self.state = AppState::Quitting;
                    true
                }
                _ => false,
            },
            AppState::Helping => {
                self.state = AppState::Calendar;
                true
            }
            AppState::GoingTo(state) => {
                if matches!(key, KeyCode::Char('q' | 'g') | KeyCode::Esc) {
                    self.state = AppState::Calendar;
                    true
                } else {
                    let output = match key {
                        KeyCode::Char(c) => match c.to_digit(10).and_then(|d| u8::try_from(d).ok())
                        {
                            Some(d) => state.handle_input(GoToInput::Digit(d)),
                            None => GoToOutput::Invalid,
                        },
                        KeyCode::Backspace | KeyCode::Delete => {
                            state.handle_input(GoToInput::Backspace)
                        }
                        KeyCode::Enter => state.handle_input(GoToInput::Enter),
                        _ => GoToOutput::Invalid,
                    };
                    match output {
                        GoToOutput::Ok => true,
                        GoToOutput::Invalid => false,
                        GoToOutput::Jump(date) => {
                            self.state = AppState::Calendar;
                            self.jump_to(date);
                            true
                        }
                    }
                }
            }
            AppState::Quitting => false,
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }

    fn move_cursor(&mut self, days: i64) -> bool {
        match move_within_month(self.cursor, days) {
            Some(date) => {
                self.cursor = date;
                true
            }
            None => false,
        }
    }

    fn after_nav(&mut self, r: Result<(), NavError>) -> bool {
        let ok = accepted(r);
        if ok {
            self.sync_cursor();
        }
        ok
    }

    /// Keep the cursor on the same day number within the displayed month
    fn sync_cursor(&mut self) {
        let (year, month) = (self.view.year(), self.view.month());
        let day = self.cursor.day().min(days_in_month(year, month));
        if let Ok(date) = Date::from_calendar_date(year, month, day) {
            self.cursor = date;
        }
    }

    fn jump_to(&mut self, date: Date) {
        self.view.jump_to(date);
        self.cursor = date;
    }

    fn cycle_symbol(&mut self, forwards: bool) -> bool {
        if self.symbols.is_empty() {
            return false;
        }
        self.filter = self.filter.cycle(&self.symbols, forwards);
        self.rebuild();
        true
    }

    fn cycle_type(&mut self, forwards: bool) -> bool {
        if self.types.is_empty() {
            return false;
        }
        self.type_filter = self.type_filter.cycle(&self.types, forwards);
        self.announcements.select(Some(0));
        true
    }

    fn title(&self) -> String {
        format!(
            " {} │ Symbol: {} │ {} ",
            env!("CARGO_PKG_NAME"),
            self.filter.label(),
            self.view.year()
        )
    }

    fn status(&self, now: Instant) -> Line<'static> {
        if let Some(e) = &self.error {
            return Line::styled(format!(" Refresh failed: {e}"), ERROR_STYLE);
        }
        let total = self.cache.get().map_or(0, |data| data.events().len());
        let age = self.cache.age(now).unwrap_or_default().as_secs();
        Line::styled(
            format!(
                " {} │ {} of {} events │ updated {}s ago",
                self.source.describe(),
                self.index.len(),
                total,
                age
            ),
            STATUS_STYLE,
        )
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        let [title_area, body_area, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);
        Line::styled(self.title(), TITLE_STYLE).render(title_area, buf);
        self.status(Instant::now()).render(status_area, buf);
        if self.state == AppState::Announcements {
            let records = self.cache.get().map_or(&[][..], Dataset::records);
            Announcements::new(records, &self.type_filter).render(
                body_area,
                buf,
                &mut self.announcements,
            );
            return;
        }
        let [top_area, details_area] =
            Layout::vertical([Constraint::Length(HEIGHT), Constraint::Min(0)]).areas(body_area);
        let [grid_area, _, upcoming_area] = Layout::horizontal([
            Constraint::Length(MAIN_WIDTH),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(top_area);
        MonthGrid::new(&self.index, self.today)
            .cursor(Some(self.cursor))
            .render(grid_area, buf, &mut self.view);
        let upcoming = self.index.upcoming(self.today, self.upcoming_days);
        Upcoming::new(&upcoming, self.upcoming_days)
            .focused(self.state == AppState::Upcoming)
            .render(upcoming_area, buf, &mut self.upcoming);
        match self.view.selected() {
            Some(date) => DayDetails::new(date, self.index.lookup(date)).render(details_area, buf),
            None => Paragraph::new(" ENTER on a day lists its events; ? shows all commands")
                .style(STATUS_STYLE)
                .render(details_area, buf),
        }
        if self.state == AppState::Helping {
            Help(BASE_STYLE).render(area, buf);
        } else if let AppState::GoingTo(ref mut state) = self.state {
            GoTo.render(area, buf, state);
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AppState {
    Calendar,
    Upcoming,
    Announcements,
    Helping,
    GoingTo(GoToState),
    Quitting,
}

/// Log a rejected navigation step and report whether it went through
fn accepted(r: Result<(), NavError>) -> bool {
    match r {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(reason = %e, "navigation rejected");
            false
        }
    }
}

fn error_chain(e: &(dyn std::error::Error + 'static)) -> String {
    std::iter::successors(Some(e), |e| e.source())
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{column, EventType, Milestone};
    use crate::source::{CellValue, RawRecord};
    use std::cell::Cell;
    use std::rc::Rc;
    use time::macros::date;

    const TODAY: Date = date!(2024 - 02 - 12);

    #[derive(Debug)]
    struct FakeSource {
        records: Vec<RawRecord>,
        fail: Rc<Cell<bool>>,
        fetches: Rc<Cell<usize>>,
    }

    impl RecordSource for FakeSource {
        fn describe(&self) -> String {
            String::from("fake")
        }

        fn fetch(&self) -> Result<Vec<RawRecord>, SourceError> {
            self.fetches.set(self.fetches.get() + 1);
            if self.fail.get() {
                Err(SourceError::NoHeader)
            } else {
                Ok(self.records.clone())
            }
        }
    }

    fn raw(pairs: &[(&str, &str)]) -> RawRecord {
        pairs
            .iter()
            .map(|&(k, v)| (k, CellValue::from_text(v)))
            .collect::<RawRecord>()
    }

    fn sample() -> Vec<RawRecord> {
        vec![
            raw(&[
                (column::SYMBOL, "ABC"),
                (column::COMPANY, "ABC PLC"),
                (column::EVENT_TYPE, "Bonus Issue"),
                (column::ANNOUNCEMENT_DATE, "2024-01-10"),
                (column::XD_DATE, "2024-02-01"),
                (column::RECORD_DATE, "2024-02-02"),
            ]),
            raw(&[
                (column::SYMBOL, "XYZ"),
                (column::COMPANY, "XYZ Holdings"),
                (column::EVENT_TYPE, "Dividend"),
                (column::ANNOUNCEMENT_DATE, "2024-02-05"),
                (column::XD_DATE, "2024-02-14"),
                (column::RECORD_DATE, "2024-02-15"),
                (column::PAYMENT_DATE, "2024-02-29"),
                (column::DIVIDEND_PER_SHARE, "1.50"),
            ]),
            raw(&[
                (column::SYMBOL, "LMN"),
                (column::COMPANY, "LMN Group"),
                (column::EVENT_TYPE, "Dividend"),
                (column::ANNOUNCEMENT_DATE, "2025-03-03"),
            ]),
        ]
    }

    struct Harness {
        app: App,
        fail: Rc<Cell<bool>>,
        fetches: Rc<Cell<usize>>,
        start: Instant,
    }

    fn harness() -> Harness {
        let fail = Rc::new(Cell::new(false));
        let fetches = Rc::new(Cell::new(0));
        let source = FakeSource {
            records: sample(),
            fail: Rc::clone(&fail),
            fetches: Rc::clone(&fetches),
        };
        let mut app = App::new(Box::new(source), Duration::from_secs(300), 14, TODAY);
        let start = Instant::now();
        assert!(app.refresh(start, false).unwrap());
        Harness {
            app,
            fail,
            fetches,
            start,
        }
    }

    fn screen(app: &mut App, width: u16, height: u16) -> Vec<String> {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        app.render(area, &mut buf);
        (0..height)
            .map(|y| (0..width).map(|x| buf[(x, y)].symbol()).collect::<String>())
            .collect()
    }

    #[test]
    fn test_initial_load() {
        let h = harness();
        assert_eq!(h.fetches.get(), 1);
        assert_eq!(h.app.symbols, ["ABC", "LMN", "XYZ"]);
        assert_eq!(h.app.years, [2024, 2025]);
        assert_eq!(h.app.types, ["Bonus Issue", "Dividend"]);
        let events = h.app.index.lookup(date!(2024 - 02 - 01));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].symbol, "ABC");
        assert_eq!(events[0].event_type, EventType::BonusIssue);
        assert_eq!(events[0].milestone, Milestone::ExBonus);
        assert_eq!(h.app.view.month(), Month::February);
        assert_eq!(h.app.cursor, TODAY);
    }

    #[test]
    fn test_snapshot_reused_until_expired() {
        let mut h = harness();
        let later = h.start + Duration::from_secs(100);
        assert!(!h.app.refresh(later, false).unwrap());
        assert_eq!(h.fetches.get(), 1);
        let expired = h.start + Duration::from_secs(300);
        assert!(h.app.refresh(expired, false).unwrap());
        assert_eq!(h.fetches.get(), 2);
    }

    #[test]
    fn test_failed_refresh_keeps_snapshot() {
        let mut h = harness();
        h.fail.set(true);
        assert!(h.app.handle_key(KeyCode::Char('r')));
        assert_eq!(h.fetches.get(), 2);
        assert!(h.app.error.is_some());
        assert_eq!(h.app.index.lookup(date!(2024 - 02 - 14)).len(), 1);
        let lines = screen(&mut h.app, 100, 24);
        assert!(lines[23].contains("Refresh failed: spreadsheet has no header row"));
        h.fail.set(false);
        assert!(h.app.handle_key(KeyCode::Char('r')));
        assert_eq!(h.app.error, None);
    }

    #[test]
    fn test_no_refetch_on_every_key_while_source_down() {
        let mut h = harness();
        h.fail.set(true);
        let expired = h.start + Duration::from_secs(300);
        for ms in 0..5 {
            h.app.check_source(expired + Duration::from_millis(ms));
        }
        assert_eq!(h.fetches.get(), 2);
        assert!(h.app.error.is_some());
        h.app.check_source(expired + Duration::from_secs(299));
        assert_eq!(h.fetches.get(), 2);
        h.app.check_source(expired + Duration::from_secs(300));
        assert_eq!(h.fetches.get(), 3);
        // An explicit refresh still goes straight to the source
        h.fail.set(false);
        assert!(h.app.handle_key(KeyCode::Char('r')));
        assert_eq!(h.fetches.get(), 4);
        assert_eq!(h.app.error, None);
    }

    #[test]
    fn test_date_change_while_running() {
        let mut h = harness();
        assert!(h.app.handle_key(KeyCode::Tab));
        h.app.set_today(date!(2024 - 02 - 20));
        assert_eq!(h.app.state, AppState::Calendar);
        assert_eq!(h.app.upcoming.selected(), None);
        let lines = screen(&mut h.app, 100, 24);
        assert!(lines.iter().any(|l| l.contains("XYZ | Payment Date | 29 Feb")));
        assert!(!lines.iter().any(|l| l.contains("Ex-Dividend")));
        assert!(h.app.handle_key(KeyCode::Char('t')));
        assert_eq!(h.app.cursor, date!(2024 - 02 - 20));
    }

    #[test]
    fn test_month_navigation() {
        let mut h = harness();
        assert!(h.app.handle_key(KeyCode::Char('p')));
        assert_eq!(h.app.view.month(), Month::January);
        assert_eq!(h.app.cursor, date!(2024 - 01 - 12));
        assert!(!h.app.handle_key(KeyCode::Char('p')));
        assert_eq!(h.app.view.month(), Month::January);
        assert!(h.app.handle_key(KeyCode::F(12)));
        assert_eq!(h.app.view.month(), Month::December);
        assert!(!h.app.handle_key(KeyCode::PageDown));
        assert!(h.app.handle_key(KeyCode::Char('t')));
        assert_eq!(h.app.view.month(), Month::February);
        assert_eq!(h.app.cursor, TODAY);
    }

    #[test]
    fn test_cursor_clamped_to_shorter_month() {
        let mut h = harness();
        h.app.jump_to(date!(2024 - 01 - 31));
        assert!(h.app.handle_key(KeyCode::Char('n')));
        assert_eq!(h.app.cursor, date!(2024 - 02 - 29));
    }

    #[test]
    fn test_year_navigation() {
        let mut h = harness();
        assert!(!h.app.handle_key(KeyCode::Char('Y')));
        assert!(h.app.handle_key(KeyCode::Char('y')));
        assert_eq!(h.app.view.year(), 2025);
        assert_eq!(h.app.view.month(), Month::February);
        assert!(!h.app.handle_key(KeyCode::Char('y')));
    }

    #[test]
    fn test_select_day_and_back() {
        let mut h = harness();
        // Monday the 12th to Wednesday the 14th
        assert!(h.app.handle_key(KeyCode::Right));
        assert!(h.app.handle_key(KeyCode::Char('l')));
        assert!(h.app.handle_key(KeyCode::Enter));
        assert_eq!(h.app.view.selected(), Some(date!(2024 - 02 - 14)));
        let lines = screen(&mut h.app, 100, 24);
        assert!(lines.iter().any(|l| l.contains("Events on 14 February 2024")));
        assert!(lines.iter().any(|l| l.contains("XYZ Holdings")));
        assert!(h.app.handle_key(KeyCode::Esc));
        assert_eq!(h.app.view.selected(), None);
        assert!(!h.app.handle_key(KeyCode::Esc));
    }

    #[test]
    fn test_weekend_not_selectable() {
        let mut h = harness();
        // Saturday the 10th
        assert!(h.app.handle_key(KeyCode::Left));
        assert!(h.app.handle_key(KeyCode::Left));
        assert!(!h.app.handle_key(KeyCode::Char(' ')));
        assert_eq!(h.app.view.selected(), None);
        // Nothing before the 1st within the month
        assert!(h.app.handle_key(KeyCode::Up));
        assert!(!h.app.handle_key(KeyCode::Up));
        assert_eq!(h.app.cursor, date!(2024 - 02 - 03));
    }

    #[test]
    fn test_symbol_filter() {
        let mut h = harness();
        assert!(h.app.handle_key(KeyCode::Char('f')));
        assert_eq!(h.app.filter, SymbolFilter::Symbol("ABC".into()));
        assert_eq!(h.app.index.len(), 3);
        assert!(h.app.index.lookup(date!(2024 - 02 - 14)).is_empty());
        let lines = screen(&mut h.app, 100, 24);
        assert!(lines[0].contains("Symbol: ABC"));
        assert!(h.app.handle_key(KeyCode::Char('F')));
        assert_eq!(h.app.filter, SymbolFilter::All);
        assert_eq!(h.app.index.len(), 8);
    }

    #[test]
    fn test_upcoming_jump() {
        let mut h = harness();
        let lines = screen(&mut h.app, 100, 24);
        assert!(lines.iter().any(|l| l.contains("XYZ | Ex-Dividend | 14 Feb")));
        assert!(lines.iter().any(|l| l.contains("XYZ | Record Date | 15 Feb")));
        assert!(!lines.iter().any(|l| l.contains("Payment Date")));
        assert!(h.app.handle_key(KeyCode::Tab));
        assert_eq!(h.app.state, AppState::Upcoming);
        assert!(h.app.handle_key(KeyCode::Down));
        assert!(h.app.handle_key(KeyCode::Enter));
        assert_eq!(h.app.state, AppState::Calendar);
        assert_eq!(h.app.view.selected(), Some(date!(2024 - 02 - 15)));
        assert_eq!(h.app.cursor, date!(2024 - 02 - 15));
    }

    #[test]
    fn test_go_to_date() {
        let mut h = harness();
        assert!(h.app.handle_key(KeyCode::Char('g')));
        for c in "20250303".chars() {
            assert!(h.app.handle_key(KeyCode::Char(c)));
        }
        assert!(!h.app.handle_key(KeyCode::Char('x')));
        assert!(h.app.handle_key(KeyCode::Enter));
        assert_eq!(h.app.state, AppState::Calendar);
        assert_eq!(h.app.view.year(), 2025);
        assert_eq!(h.app.view.month(), Month::March);
        assert_eq!(h.app.view.selected(), Some(date!(2025 - 03 - 03)));
    }

    #[test]
    fn test_announcements() {
        let mut h = harness();
        assert!(h.app.handle_key(KeyCode::Char('a')));
        let lines = screen(&mut h.app, 110, 24);
        assert!(lines[1].contains("Announcements: All (3)"));
        assert!(h.app.handle_key(KeyCode::Char('e')));
        assert_eq!(h.app.type_filter, TypeFilter::Type("Bonus Issue".into()));
        let lines = screen(&mut h.app, 110, 24);
        assert!(lines[1].contains("Announcements: Bonus Issue (1)"));
        assert!(h.app.handle_key(KeyCode::Esc));
        assert_eq!(h.app.state, AppState::Calendar);
    }

    #[test]
    fn test_help() {
        let mut h = harness();
        assert!(h.app.handle_key(KeyCode::Char('?')));
        let lines = screen(&mut h.app, 100, 30);
        assert!(lines.iter().any(|l| l.contains(" Commands ")));
        assert!(h.app.handle_key(KeyCode::Char('z')));
        assert_eq!(h.app.state, AppState::Calendar);
    }

    #[test]
    fn test_quit() {
        let mut h = harness();
        assert!(!h.app.quitting());
        assert!(h.app.handle_key(KeyCode::Char('q')));
        assert!(h.app.quitting());
    }

    #[test]
    fn test_render_calendar() {
        let mut h = harness();
        let lines = screen(&mut h.app, 100, 24);
        assert!(lines[0].contains("csecal │ Symbol: All │ 2024"));
        assert!(lines[1].contains("February 2024"));
        assert!(lines[4].contains("1 (1)"));
        assert!(lines[23].contains("fake │ 8 of 8 events"));
    }
}
