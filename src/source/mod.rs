mod csv;
mod sheets;
pub(crate) use self::csv::{CsvFile, CsvUrl};
pub(crate) use self::sheets::SheetsApi;
use crate::events::column;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A single cell of the source table
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum CellValue {
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    /// Classify a textual cell; blank text is empty
    pub(crate) fn from_text(s: &str) -> CellValue {
        let s = s.trim();
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_owned())
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{n}"),
        }
    }
}

static EMPTY: CellValue = CellValue::Empty;

/// One row of the source table, keyed by column name
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct RawRecord(BTreeMap<String, CellValue>);

impl RawRecord {
    /// Returns the cell in the given column, or an empty cell if the row has
    /// no such column
    pub(crate) fn get(&self, column: &str) -> &CellValue {
        self.0.get(column).unwrap_or(&EMPTY)
    }

    /// Returns the cell's text with numbers rendered as text, or an empty
    /// string for empty cells
    pub(crate) fn text(&self, column: &str) -> String {
        self.get(column).to_string()
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        RawRecord(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Somewhere that the table of corporate announcements can be read from
pub(crate) trait RecordSource: fmt::Debug {
    /// Short human-readable description of where the records come from
    fn describe(&self) -> String;

    /// Fetch every record, in sheet order.  Either the whole table is
    /// returned or an error is.
    fn fetch(&self) -> Result<Vec<RawRecord>, SourceError>;
}

impl<T: RecordSource + ?Sized> RecordSource for Box<T> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn fetch(&self) -> Result<Vec<RawRecord>, SourceError> {
        (**self).fetch()
    }
}

#[derive(Debug, Error)]
pub(crate) enum SourceError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to fetch {url}")]
    Http { url: String, source: reqwest::Error },
    #[error("malformed CSV data")]
    Csv(#[from] ::csv::Error),
    #[error("spreadsheet has no header row")]
    NoHeader,
    #[error("spreadsheet is missing the {0:?} column")]
    MissingColumn(&'static str),
}

/// Pair each row with the header, padding short rows with empty cells.
/// Columns beyond the header are dropped.
pub(crate) fn records_from_rows<I>(
    header: &[String],
    rows: I,
) -> Result<Vec<RawRecord>, SourceError>
where
    I: IntoIterator<Item = Vec<CellValue>>,
{
    if header.iter().all(String::is_empty) {
        return Err(SourceError::NoHeader);
    }
    if let Some(missing) = column::REQUIRED
        .into_iter()
        .find(|&name| !header.iter().any(|h| h == name))
    {
        return Err(SourceError::MissingColumn(missing));
    }
    Ok(rows
        .into_iter()
        .filter(|row| row.iter().any(|c| !c.is_empty()))
        .map(|row| {
            let mut cells = row.into_iter();
            header
                .iter()
                .map(|h| (h.clone(), cells.next().unwrap_or(CellValue::Empty)))
                .collect::<RawRecord>()
        })
        .collect())
}
