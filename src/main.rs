mod announcements;
mod app;
mod cache;
mod calendar;
mod config;
mod details;
mod events;
mod goto;
mod help;
mod source;
mod theme;
mod upcoming;
mod view;
use crate::app::App;
use crate::config::{Config, SourceConfig};
use anyhow::Context;
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use time::{
    format_description::BorrowedFormatItem, macros::format_description, Date, OffsetDateTime,
};
use tracing_subscriber::EnvFilter;

static YMD_FMT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Environment variable holding the log filter directives
const LOG_ENV_VAR: &str = "CSECAL_LOG";

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run {
        config: Option<PathBuf>,
        source: Option<SourceConfig>,
        date: Option<Date>,
    },
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut config = None;
        let mut source = None;
        let mut date = None;
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('c') | Arg::Long("config") => {
                    config = Some(PathBuf::from(parser.value()?));
                }
                Arg::Long("csv") => {
                    source = Some(SourceConfig::CsvFile {
                        path: PathBuf::from(parser.value()?),
                    });
                }
                Arg::Long("url") => {
                    source = Some(SourceConfig::CsvUrl {
                        url: parser.value()?.string()?,
                    });
                }
                Arg::Value(value) if date.is_none() => {
                    let value = value.string()?;
                    match Date::parse(&value, &YMD_FMT) {
                        Ok(d) => date = Some(d),
                        Err(e) => {
                            return Err(lexopt::Error::ParsingFailed {
                                value,
                                error: Box::new(e),
                            })
                        }
                    }
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run {
            config,
            source,
            date,
        })
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run {
                config,
                source,
                date,
            } => {
                // This has to happen before any other threads are started,
                // which building an HTTP client does.
                let now = OffsetDateTime::now_local().context("failed to determine local date")?;
                let today = now.date();
                let config = Config::load(config.as_deref())?;
                if let Some(path) = config.log_path() {
                    init_logging(&path)?;
                }
                tracing::info!(version = env!("CARGO_PKG_VERSION"), %today, "starting");
                let source = match source {
                    Some(s) => s.build(config.timeout())?,
                    None => config.record_source()?,
                };
                let description = source.describe();
                let mut app = App::new(source, config.ttl(), config.upcoming_days, today)
                    .local_offset(now.offset());
                if let Some(date) = date {
                    app = app.start_date(date);
                }
                app.refresh(Instant::now(), false)
                    .with_context(|| format!("failed to load announcements from {description}"))?;
                with_terminal(|mut terminal| {
                    terminal.hide_cursor().context("failed to hide cursor")?;
                    app.run(terminal)?;
                    Ok(())
                })
            }
            Command::Help => {
                println!("Usage: csecal [<options>] [YYYY-MM-DD]");
                println!();
                println!("Terminal calendar of dividends, rights issues & bonus issues for");
                println!("CSE-listed companies");
                println!();
                println!("Options:");
                println!("  -c, --config <FILE>   Read configuration from the given file");
                println!("      --csv <FILE>      Read announcements from a local CSV export");
                println!("      --url <URL>       Read announcements from a published CSV export");
                println!("  -h, --help            Display this help message and exit");
                println!("  -V, --version         Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

/// Send log messages to `path`, as the terminal belongs to the calendar
fn init_logging(path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = func(terminal);
    ratatui::restore();
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn parse(args: &[&str]) -> Result<Command, lexopt::Error> {
        Command::from_parser(Parser::from_args(args))
    }

    #[test]
    fn test_no_args() {
        assert_eq!(
            parse(&[]).unwrap(),
            Command::Run {
                config: None,
                source: None,
                date: None
            }
        );
    }

    #[test]
    fn test_all_args() {
        assert_eq!(
            parse(&["-c", "cfg.toml", "--csv", "events.csv", "2024-02-01"]).unwrap(),
            Command::Run {
                config: Some(PathBuf::from("cfg.toml")),
                source: Some(SourceConfig::CsvFile {
                    path: PathBuf::from("events.csv")
                }),
                date: Some(date!(2024 - 02 - 01)),
            }
        );
    }

    #[test]
    fn test_last_source_wins() {
        assert_eq!(
            parse(&["--csv", "events.csv", "--url", "https://example.com/e.csv"]).unwrap(),
            Command::Run {
                config: None,
                source: Some(SourceConfig::CsvUrl {
                    url: "https://example.com/e.csv".into()
                }),
                date: None,
            }
        );
    }

    #[test]
    fn test_help_and_version() {
        assert_eq!(parse(&["--csv", "x.csv", "-h"]).unwrap(), Command::Help);
        assert_eq!(parse(&["-V"]).unwrap(), Command::Version);
    }

    #[test]
    fn test_bad_date() {
        assert!(parse(&["2024-13-01"]).is_err());
        assert!(parse(&["2024-02-01", "2024-02-02"]).is_err());
    }
}
