//! Logging setup for the runner.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. Logs go to stderr so results on stdout stay
/// machine readable.
pub fn init_telemetry(json_logs: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,fishery_runner=debug".into());

    let json_layer = json_logs.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!json_logs).then(|| {
        fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()?;

    info!(json_logs, "Telemetry initialized");
    Ok(())
}
