use super::{records_from_rows, CellValue, RawRecord, RecordSource, SourceError};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

static API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// A sheet read through the Google Sheets values API, authenticated with an
/// API key
pub(crate) struct SheetsApi {
    api_base: &'static str,
    spreadsheet_id: String,
    range: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl SheetsApi {
    pub(crate) fn new(
        spreadsheet_id: String,
        range: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<SheetsApi, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| SourceError::Http {
                url: API_BASE.to_owned(),
                source,
            })?;
        Ok(SheetsApi {
            api_base: API_BASE,
            spreadsheet_id,
            range,
            api_key,
            client,
        })
    }

    #[cfg(test)]
    fn with_api_base(mut self, api_base: &'static str) -> SheetsApi {
        self.api_base = api_base;
        self
    }

    /// The request URL, without the API key
    fn base_url(&self) -> Url {
        let mut url = Url::parse(self.api_base).expect("API base URL should be valid");
        url.path_segments_mut()
            .expect("API base URL should be a hierarchical URL")
            .extend([self.spreadsheet_id.as_str(), "values", self.range.as_str()]);
        url.query_pairs_mut()
            .append_pair("valueRenderOption", "UNFORMATTED_VALUE")
            .append_pair("dateTimeRenderOption", "FORMATTED_STRING");
        url
    }
}

impl fmt::Debug for SheetsApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetsApi")
            .field("api_base", &self.api_base)
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("range", &self.range)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl RecordSource for SheetsApi {
    fn describe(&self) -> String {
        format!("sheet {} ({})", self.spreadsheet_id, self.range)
    }

    fn fetch(&self) -> Result<Vec<RawRecord>, SourceError> {
        let mut url = self.base_url();
        let shown = url.to_string();
        url.query_pairs_mut().append_pair("key", &self.api_key);
        tracing::debug!(url = %shown, "fetching sheet values");
        let values = self
            .client
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::json::<ValueRange>)
            // reqwest errors carry the full request URL, key included
            .map_err(|source| SourceError::Http {
                url: shown,
                source: source.without_url(),
            })?;
        let records = values.into_records()?;
        tracing::info!(
            spreadsheet = %self.spreadsheet_id,
            range = %self.range,
            records = records.len(),
            "fetched sheet values"
        );
        Ok(records)
    }
}

/// Response body of the `spreadsheets.values.get` endpoint
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
    // Omitted entirely when the range is empty
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl ValueRange {
    fn into_records(self) -> Result<Vec<RawRecord>, SourceError> {
        let mut rows = self.values.into_iter();
        let header = rows
            .next()
            .ok_or(SourceError::NoHeader)?
            .into_iter()
            .map(|v| cell_value(v).to_string())
            .collect::<Vec<_>>();
        records_from_rows(
            &header,
            rows.map(|row| row.into_iter().map(cell_value).collect::<Vec<_>>()),
        )
    }
}

fn cell_value(value: Value) -> CellValue {
    match value {
        Value::Null => CellValue::Empty,
        Value::String(s) => CellValue::from_text(&s),
        Value::Number(n) => n.as_f64().map_or(CellValue::Empty, CellValue::Number),
        Value::Bool(b) => CellValue::Text(if b { "TRUE" } else { "FALSE" }.to_owned()),
        other => CellValue::Text(other.to_string()),
    }
}
