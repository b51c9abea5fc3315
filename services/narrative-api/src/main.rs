//! Narrative API - Main entry point.

use narrative_common::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (.env, then process environment)
    let config = Config::load()?;

    // Initialize logging
    init_logging(&config.observability.log_level, &config.observability.log_format);

    tracing::info!("Narrative API v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = config.validate().map_err(Error::from) {
        tracing::error!(field = e.field().unwrap_or("unknown"), "{}", e);
        return Err(e.into());
    }

    if config.demo_mode() {
        tracing::warn!("USE_DUMMY_DATA is set: serving canned results, the model provider is not called");
    }

    narrative_api::start_server(&config).await
}
