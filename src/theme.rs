use ratatui::style::{Color, Modifier, Style};

pub(crate) const BASE_STYLE: Style = Style::new().fg(Color::White).bg(Color::Black);

pub(crate) const TITLE_STYLE: Style = BASE_STYLE.fg(Color::LightCyan).add_modifier(Modifier::BOLD);

pub(crate) const MONTH_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const WEEKDAY_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const STATUS_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

pub(crate) const ERROR_STYLE: Style = BASE_STYLE.fg(Color::LightRed).add_modifier(Modifier::BOLD);

pub(crate) const FOCUSED_BORDER_STYLE: Style = BASE_STYLE.fg(Color::LightCyan);

pub(crate) const TABLE_HEADER_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const HIGHLIGHT_STYLE: Style = BASE_STYLE.add_modifier(Modifier::REVERSED);

pub(crate) mod calendar {
    use super::*;

    pub(crate) const WEEKEND_STYLE: Style = Style::new().fg(Color::DarkGray);

    pub(crate) const EVENT_DAY_STYLE: Style = Style::new()
        .fg(Color::LightYellow)
        .add_modifier(Modifier::BOLD);

    pub(crate) const TODAY_STYLE: Style = Style::new()
        .fg(Color::LightRed)
        .add_modifier(Modifier::BOLD);

    pub(crate) const SELECTED_MODIFIER: Modifier = Modifier::UNDERLINED;

    pub(crate) const CURSOR_MODIFIER: Modifier = Modifier::REVERSED;
}

pub(crate) mod goto {
    use super::*;

    pub(crate) const UNFILLED_CELL_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

    pub(crate) const READY_ENTER_STYLE: Style = BASE_STYLE.add_modifier(Modifier::UNDERLINED);
}
