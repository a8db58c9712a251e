//! Telemetry module
//!
//! Logging and metrics

mod logging;
mod metrics;

pub use logging::{env_filter, init_logging, LogFormat};
pub use metrics::{
    init_metrics, record_cache, record_markets_dropped, record_markets_fetched, record_order,
    CacheEvent, OrderOutcome,
};

use crate::config::ClientConfig;

/// Initialize logging and, when a port is configured, the metrics exporter
pub fn init_telemetry(config: &ClientConfig) -> anyhow::Result<()> {
    let telemetry = config.telemetry();
    init_logging(
        config.tracing_level(),
        LogFormat::from_json_flag(telemetry.json_logs),
    )?;

    if let Some(port) = telemetry.metrics_port {
        init_metrics(port)?;
    }

    Ok(())
}
