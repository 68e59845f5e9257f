use crate::source::CellValue;
use time::{format_description::BorrowedFormatItem, macros::format_description, Date};

/// Julian day number of 1899-12-30, day zero of spreadsheet serial dates
const SERIAL_EPOCH_JULIAN_DAY: i32 = 2_415_019;

/// Serial number of 9999-12-31
const MAX_SERIAL: f64 = 2_958_465.0;

type Format = &'static [BorrowedFormatItem<'static>];

/// Formats consisting only of digits and separators.  These are also tried
/// against the part of a value preceding a time of day.
static NUMERIC_FORMATS: &[Format] = &[
    format_description!("[year]-[month padding:none]-[day padding:none]"),
    format_description!("[year]/[month padding:none]/[day padding:none]"),
    // Month first, falling back to day first when that isn't a real date
    format_description!("[month padding:none]/[day padding:none]/[year]"),
    format_description!("[day padding:none]/[month padding:none]/[year]"),
];

static TEXTUAL_FORMATS: &[Format] = &[
    format_description!("[day padding:none] [month repr:short case_sensitive:false] [year]"),
    format_description!("[day padding:none]-[month repr:short case_sensitive:false]-[year]"),
    format_description!("[month repr:short case_sensitive:false] [day padding:none], [year]"),
    format_description!("[day padding:none] [month repr:long case_sensitive:false] [year]"),
    format_description!("[month repr:long case_sensitive:false] [day padding:none], [year]"),
];

/// Interpret a cell from one of the date columns as a calendar date.
///
/// Returns `None` for empty cells and for anything that cannot be read as a
/// real date; any time-of-day component is dropped.
pub(crate) fn normalize_date(value: &CellValue) -> Option<Date> {
    let date = match value {
        CellValue::Empty => None,
        CellValue::Text(s) => parse_text(s.trim()),
        CellValue::Number(n) => from_serial(*n),
    };
    if date.is_none() && !value.is_empty() {
        tracing::trace!(?value, "date value not recognized; treating as absent");
    }
    date
}

fn parse_text(s: &str) -> Option<Date> {
    if s.is_empty() {
        return None;
    }
    if let Some(d) = first_match(s, NUMERIC_FORMATS).or_else(|| first_match(s, TEXTUAL_FORMATS)) {
        return Some(d);
    }
    let (head, _time) = s.split_once(['T', ' '])?;
    first_match(head, NUMERIC_FORMATS)
}

fn first_match(s: &str, formats: &[Format]) -> Option<Date> {
    formats.iter().find_map(|fmt| Date::parse(s, fmt).ok())
}

fn from_serial(serial: f64) -> Option<Date> {
    if !serial.is_finite() || !(1.0..MAX_SERIAL + 1.0).contains(&serial) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let days = serial.floor() as i32;
    Date::from_julian_day(SERIAL_EPOCH_JULIAN_DAY + days).ok()
}
