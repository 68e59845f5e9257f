use super::{records_from_rows, CellValue, RawRecord, RecordSource, SourceError};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A CSV export of the sheet on the local filesystem
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CsvFile {
    path: PathBuf,
}

impl CsvFile {
    pub(crate) fn new(path: PathBuf) -> CsvFile {
        CsvFile { path }
    }
}

impl RecordSource for CsvFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<Vec<RawRecord>, SourceError> {
        let data = fs_err(&self.path, std::fs::read(&self.path))?;
        let records = parse_csv(&data)?;
        tracing::info!(path = %self.path.display(), records = records.len(), "read CSV file");
        Ok(records)
    }
}

fn fs_err<T>(path: &Path, r: std::io::Result<T>) -> Result<T, SourceError> {
    r.map_err(|source| SourceError::Read {
        path: path.to_owned(),
        source,
    })
}

/// A published CSV export of the sheet, fetched over HTTP(S)
#[derive(Debug)]
pub(crate) struct CsvUrl {
    url: String,
    client: reqwest::blocking::Client,
}

impl CsvUrl {
    pub(crate) fn new(url: String, timeout: Duration) -> Result<CsvUrl, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| SourceError::Http {
                url: url.clone(),
                source,
            })?;
        Ok(CsvUrl { url, client })
    }
}

impl RecordSource for CsvUrl {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<Vec<RawRecord>, SourceError> {
        tracing::debug!(url = %self.url, "fetching CSV export");
        let body = self
            .client
            .get(&self.url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::bytes)
            .map_err(|source| SourceError::Http {
                url: self.url.clone(),
                source,
            })?;
        let records = parse_csv(&body)?;
        tracing::info!(url = %self.url, records = records.len(), "fetched CSV export");
        Ok(records)
    }
}

/// Parse CSV text whose first row is the header
pub(crate) fn parse_csv(data: &[u8]) -> Result<Vec<RawRecord>, SourceError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_reader(data);
    let header = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_owned())
        .collect::<Vec<_>>();
    let rows = reader
        .records()
        .map(|r| r.map(|rec| rec.iter().map(CellValue::from_text).collect::<Vec<_>>()))
        .collect::<Result<Vec<_>, _>>()?;
    records_from_rows(&header, rows)
}
