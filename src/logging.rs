// 📝 Logging - tracing subscriber setup for both binaries
//
// The dashboard owns the terminal, so there logs only go to a file (or
// nowhere). The server logs to stderr unless a file is configured.

use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::error::{ProcurementError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// stderr, or the configured file
    Terminal,

    /// The configured file, or nothing
    FileOnly,
}

fn parse_filter(directive: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directive)
        .map_err(|e| ProcurementError::Config(format!("invalid log filter {:?}: {}", directive, e)))
}

/// Install the global subscriber; returns false when logging stays off
pub fn init_logging(config: &LoggingConfig, target: LogTarget) -> Result<bool> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => parse_filter(&config.filter)?,
    };

    let (writer, ansi) = match (&config.file, target) {
        (Some(path), _) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        (None, LogTarget::Terminal) => (BoxMakeWriter::new(std::io::stderr), true),
        (None, LogTarget::FileOnly) => return Ok(false),
    };

    let layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(ansi)
        .with_writer(writer);
    let layer = if config.json {
        layer.json().boxed()
    } else {
        layer.compact().boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| ProcurementError::Config(format!("logger already initialised: {}", e)))?;

    Ok(true)
}
