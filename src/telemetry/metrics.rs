//! Prometheus metrics
//!
//! Counters are recorded through the `metrics` facade and are no-ops until
//! an exporter is installed.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};

/// Cache lookup result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEvent {
    Hit,
    Miss,
}

/// Order execution outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderOutcome {
    Simulated,
    Submitted,
    Rejected,
    Failed,
}

impl OrderOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderOutcome::Simulated => "simulated",
            OrderOutcome::Submitted => "submitted",
            OrderOutcome::Rejected => "rejected",
            OrderOutcome::Failed => "failed",
        }
    }
}

pub fn record_cache(event: CacheEvent) {
    let name = match event {
        CacheEvent::Hit => "polytrade_market_cache_hits_total",
        CacheEvent::Miss => "polytrade_market_cache_misses_total",
    };
    metrics::counter!(name).increment(1);
}

/// Markets decoded from a listing
pub fn record_markets_fetched(count: usize) {
    metrics::counter!("polytrade_markets_fetched_total").increment(count as u64);
}

/// Listing items skipped because they did not decode
pub fn record_markets_dropped(count: usize) {
    if count > 0 {
        metrics::counter!("polytrade_markets_dropped_total").increment(count as u64);
    }
}

pub fn record_order(outcome: OrderOutcome) {
    metrics::counter!("polytrade_orders_total", "outcome" => outcome.as_str()).increment(1);
}

/// Install the Prometheus exporter with an HTTP listener on `port`
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}
