use crate::source::{CsvFile, CsvUrl, RecordSource, SheetsApi, SourceError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable consulted for a Sheets API key when the config file
/// does not give one
pub(crate) const API_KEY_VAR: &str = "CSECAL_SHEETS_API_KEY";

const DEFAULT_TTL_SECS: u64 = 300;
const DEFAULT_UPCOMING_DAYS: u16 = 14;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL_SECS
}

fn default_upcoming_days() -> u16 {
    DEFAULT_UPCOMING_DAYS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_range() -> String {
    String::from("Sheet1")
}

/// Settings read from `~/.config/csecal/config.toml`
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub(crate) struct Config {
    /// How long a fetched snapshot is served before the source is read again
    #[serde(default = "default_ttl_secs")]
    pub(crate) ttl_secs: u64,

    /// Length of the upcoming-events window, counting today
    #[serde(default = "default_upcoming_days")]
    pub(crate) upcoming_days: u16,

    #[serde(default = "default_timeout_secs")]
    pub(crate) timeout_secs: u64,

    #[serde(default)]
    pub(crate) log_file: Option<PathBuf>,

    #[serde(default)]
    pub(crate) source: Option<SourceConfig>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            ttl_secs: DEFAULT_TTL_SECS,
            upcoming_days: DEFAULT_UPCOMING_DAYS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_file: None,
            source: None,
        }
    }
}

impl Config {
    pub(crate) fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("csecal").join("config.toml"))
    }

    /// Read the configuration from `path` if given, otherwise from the
    /// default location.  Only an explicitly-given file has to exist.
    pub(crate) fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        match path {
            Some(p) => Config::from_file(p),
            None => match Config::default_path() {
                Some(p) if p.exists() => Config::from_file(&p),
                _ => {
                    tracing::debug!("no config file found; using defaults");
                    Ok(Config::default())
                }
            },
        }
    }

    pub(crate) fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub(crate) fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Where log messages are written: the configured file, else
    /// `csecal/csecal.log` under the user's state (or cache) directory
    pub(crate) fn log_path(&self) -> Option<PathBuf> {
        self.log_file.clone().or_else(|| {
            dirs::state_dir()
                .or_else(dirs::cache_dir)
                .map(|d| d.join("csecal").join("csecal.log"))
        })
    }

    /// Construct the record source to read from
    pub(crate) fn record_source(&self) -> Result<Box<dyn RecordSource>, ConfigError> {
        let Some(source) = self.source.clone() else {
            return Err(ConfigError::NoSource);
        };
        source.build(self.timeout())
    }
}

/// The `[source]` table
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub(crate) enum SourceConfig {
    CsvFile {
        path: PathBuf,
    },
    CsvUrl {
        url: String,
    },
    Sheets {
        spreadsheet_id: String,
        #[serde(default = "default_range")]
        range: String,
        #[serde(default)]
        api_key: Option<String>,
    },
}

impl SourceConfig {
    pub(crate) fn build(self, timeout: Duration) -> Result<Box<dyn RecordSource>, ConfigError> {
        let source: Box<dyn RecordSource> = match self {
            SourceConfig::CsvFile { path } => Box::new(CsvFile::new(path)),
            SourceConfig::CsvUrl { url } => Box::new(CsvUrl::new(url, timeout)?),
            SourceConfig::Sheets {
                spreadsheet_id,
                range,
                api_key,
            } => {
                let api_key = api_key
                    .or_else(|| std::env::var(API_KEY_VAR).ok())
                    .ok_or(ConfigError::MissingApiKey)?;
                Box::new(SheetsApi::new(spreadsheet_id, range, api_key, timeout)?)
            }
        };
        Ok(source)
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("no record source configured; pass --csv or --url, or add a [source] table to the config file")]
    NoSource,
    #[error("Sheets source needs an api_key in the config file or $CSECAL_SHEETS_API_KEY")]
    MissingApiKey,
    #[error("failed to set up record source")]
    Source(#[from] SourceError),
}
