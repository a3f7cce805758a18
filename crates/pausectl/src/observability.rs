//! Logging setup for pausectl: one fmt layer writing text or JSON to stderr
//! or a log file, plus the journal when `--systemd-log` is given.
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use tracing::{Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{Layer, Registry};

const SYSLOG_IDENTIFIER: &str = "pausectl";

#[cfg(debug_assertions)]
const DEFAULT_LOG_LEVEL: Level = Level::DEBUG;

#[cfg(not(debug_assertions))]
const DEFAULT_LOG_LEVEL: Level = Level::ERROR;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            unknown => bail!("unknown log format: {unknown}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct ObservabilityConfig {
    pub log_debug_flag: bool,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub log_format: Option<String>,
    pub systemd_log: bool,
}

impl From<&crate::Opts> for ObservabilityConfig {
    fn from(opts: &crate::Opts) -> Self {
        Self {
            log_debug_flag: opts.global.debug,
            log_level: opts.global.log_level.clone(),
            log_file: opts.global.log.clone(),
            log_format: opts.global.log_format.clone(),
            systemd_log: opts.global.systemd_log,
        }
    }
}

impl ObservabilityConfig {
    /// `--log-level` wins over `--debug`
    fn level(&self) -> Result<Level> {
        match (self.log_level.as_deref(), self.log_debug_flag) {
            (Some(level), _) => {
                Level::from_str(level).with_context(|| format!("invalid log level {level}"))
            }
            (None, true) => Ok(Level::DEBUG),
            (None, false) => Ok(DEFAULT_LOG_LEVEL),
        }
    }

    fn format(&self) -> Result<LogFormat> {
        self.log_format
            .as_deref()
            .map_or(Ok(LogFormat::Text), LogFormat::from_str)
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

fn fmt_layer<S>(
    format: LogFormat,
    log_file: Option<&Path>,
) -> Result<Box<dyn Layer<S> + Send + Sync + 'static>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let writer = match log_file {
        Some(path) => BoxMakeWriter::new(open_log_file(path)?),
        None => BoxMakeWriter::new(std::io::stderr),
    };
    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(log_file.is_none())
        .with_writer(writer);

    Ok(match format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer
            .json()
            .flatten_event(true)
            .with_span_list(false)
            .boxed(),
    })
}

/// The journal is optional: a node without journald keeps the fmt output.
fn journald_layer(enabled: bool) -> Option<tracing_journald::Layer> {
    if !enabled {
        return None;
    }
    match tracing_journald::layer() {
        Ok(layer) => Some(layer.with_syslog_identifier(SYSLOG_IDENTIFIER.to_owned())),
        Err(err) => {
            eprintln!("journald logging unavailable, continuing without it: {err}");
            None
        }
    }
}

fn subscriber(config: &ObservabilityConfig) -> Result<impl Subscriber + Send + Sync + 'static> {
    let level = config.level()?;
    let format = config.format()?;

    Ok(tracing_subscriber::registry()
        .with(fmt_layer::<Registry>(format, config.log_file.as_deref())?)
        .with(LevelFilter::from_level(level))
        .with(journald_layer(config.systemd_log)))
}

pub fn init<T>(config: T) -> Result<()>
where
    T: Into<ObservabilityConfig>,
{
    let config = config.into();
    let subscriber = subscriber(&config)?;
    tracing::subscriber::set_global_default(subscriber).context("failed to init logger")
}
