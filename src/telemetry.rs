//! Structured logging for the dashboard service.
//!
//! - `LOG_LEVEL`: EnvFilter directives; unset or unparsable falls back to `DEFAULT_DIRECTIVES`.
//! - `LOG_FORMAT`: `json`, `compact` or `pretty` (default).
//!
//! Service plumbing logs under the `dashboard_backend` target, domain events under
//! `challenge`. The tower-http TraceLayer adds the per-request spans.

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "info,challenge=debug,dashboard_backend=debug,tower_http=info,axum=info";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl LogFormat {
    /// Unknown values select `Pretty`, logging must come up regardless.
    fn from_env_value(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("json") => LogFormat::Json,
            Some("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

/// Filter directives in effect, `LOG_LEVEL` when it parses.
fn filter_directives(log_level: Option<&str>) -> (EnvFilter, String) {
    match log_level.map(str::trim).filter(|v| !v.is_empty()) {
        Some(directives) => match EnvFilter::try_new(directives) {
            Ok(filter) => (filter, directives.to_string()),
            Err(_) => (EnvFilter::new(DEFAULT_DIRECTIVES), DEFAULT_DIRECTIVES.to_string()),
        },
        None => (EnvFilter::new(DEFAULT_DIRECTIVES), DEFAULT_DIRECTIVES.to_string()),
    }
}

pub fn init_tracing() {
    let log_level = std::env::var("LOG_LEVEL").ok();
    let format = LogFormat::from_env_value(std::env::var("LOG_FORMAT").ok().as_deref());
    let (filter, directives) = filter_directives(log_level.as_deref());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // Each format is its own subscriber type.
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.init(),
    }

    info!(target: "dashboard_backend", ?format, %directives, "Logging initialized");
    if log_level.as_deref().map(str::trim).is_some_and(|v| !v.is_empty() && v != directives) {
        warn!(target: "dashboard_backend", "LOG_LEVEL did not parse; using default directives");
    }
}
