//!
//! src/logging.rs
//!
//! Initializes the json logger used by the server, every handler logs
//! through tracing events with dotted names (server.start, scan.item.skipped)
//!

use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use tracing_error::ErrorLayer;
use tracing_appender::non_blocking;

use crate::config::LoggingConfig;
use crate::errors::RadarError;

/// Must be held for the life of the process or buffered lines are dropped
pub struct LoggingGuard(tracing_appender::non_blocking::WorkerGuard);

fn build_filter(cfg: &LoggingConfig, rust_log: Option<String>) -> EnvFilter {
    rust_log
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::new(cfg.filter_directives.clone()))
}

pub fn init_logging(cfg: &LoggingConfig) -> Result<LoggingGuard, RadarError> {
    let (writer, guard) = non_blocking(std::io::stdout());
    let filter = build_filter(cfg, std::env::var("RUST_LOG").ok());

    let time = tracing_subscriber::fmt::time::UtcTime::rfc_3339();
    let fmt_layer = fmt::layer()
        .with_writer(writer)
        .with_timer(time)
        .with_target(cfg.include_target)
        .with_file(cfg.include_file_line)
        .with_line_number(cfg.include_file_line)
        .json()
        .flatten_event(true)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| RadarError::Config(format!("logger already installed: {e}")))?;

    Ok( LoggingGuard(guard) )
}
