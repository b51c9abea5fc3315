//! Logging setup for the narrative services.
//!
//! `LOG_LEVEL` applies to the service crates; the HTTP stack underneath
//! (server, client, TLS, request tracing) is held at `warn` unless `RUST_LOG`
//! says otherwise.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// HTTP stack modules held at `warn`.
pub const NOISY_MODULES: &[&str] = &[
    "hyper",
    "hyper_util",
    "reqwest",
    "h2",
    "rustls",
    "tokio_util",
    "tower_http",
];

/// `<level>,hyper=warn,...` for a base level.
fn build_directives(log_level: &str) -> String {
    let mut directives = String::from(log_level);

    for module in NOISY_MODULES {
        directives.push_str(&format!(",{}=warn", module));
    }

    directives
}

/// `RUST_LOG`, when set, replaces the generated directives entirely.
fn build_filter(log_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    EnvFilter::new(build_directives(log_level))
}

/// Install the global subscriber for `LOG_LEVEL` / `LOG_FORMAT`.
///
/// `json` emits one object per event with the current span attached, so the
/// synthesis trace id travels with every stage log; anything else is the
/// human-readable format. A subscriber installed earlier (as in tests) is kept.
pub fn init_logging(log_level: &str, log_format: &str) {
    let filter = build_filter(log_level);

    let subscriber = tracing_subscriber::registry().with(filter);

    if log_format == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_current_span(true)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);
        let _ = subscriber.with(fmt_layer).try_init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_ansi(true)
            .with_target(true)
            .with_file(false)
            .with_line_number(false);
        let _ = subscriber.with(fmt_layer).try_init();
    }

    tracing::info!(
        log_level = %log_level,
        log_format = %log_format,
        noise_filtered = NOISY_MODULES.len(),
        "Logging initialized"
    );
}

/// Trace id attached to each synthesis request span.
pub fn generate_trace_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
