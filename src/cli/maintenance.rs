//! Maintenance commands

use crate::client::{HealthReport, PolymarketClient};
use crate::config::ClientConfig;
use clap::Args;

#[derive(Args, Debug)]
pub struct CleanupArgs {
    /// Keep prices from the last N days
    #[arg(short, long, default_value_t = 30)]
    pub days: u32,
}

impl CleanupArgs {
    pub fn execute(&self, client: &PolymarketClient) -> anyhow::Result<()> {
        match client.cleanup_old_data(self.days) {
            Some(deleted) => println!(
                "Deleted {} price records older than {} days",
                deleted, self.days
            ),
            None => println!("Storage not enabled"),
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

impl ConfigArgs {
    /// Print the effective configuration; secrets are never shown
    pub fn execute(&self, config: &ClientConfig) -> anyhow::Result<()> {
        if self.json {
            let summary = serde_json::json!({
                "clob_url": config.clob_url(),
                "gamma_url": config.gamma_url(),
                "polygon_rpc": config.polygon_rpc(),
                "chain_id": config.chain_id(),
                "api_credentials": config.api_credentials().is_some(),
                "dry_run": config.dry_run(),
                "log_level": config.log_level(),
                "enable_cache": config.enable_cache(),
                "cache_ttl_secs": config.cache_ttl().as_secs(),
                "enable_storage": config.enable_storage(),
                "db_path": config.db_path(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(());
        }

        println!("Current configuration:");
        println!("  CLOB:      {}", config.clob_url());
        println!("  Gamma:     {}", config.gamma_url());
        println!("  RPC:       {} (chain {})", config.polygon_rpc(), config.chain_id());
        println!(
            "  API creds: {}",
            if config.api_credentials().is_some() { "configured" } else { "derived at startup" }
        );
        println!("  Mode:      {}", if config.dry_run() { "dry run" } else { "LIVE" });
        println!("  Log level: {}", config.log_level());
        println!(
            "  Cache:     {} (ttl {}s)",
            config.enable_cache(),
            config.cache_ttl().as_secs()
        );
        println!(
            "  Storage:   {} ({})",
            config.enable_storage(),
            config.db_path().display()
        );
        Ok(())
    }
}

pub async fn health(client: &PolymarketClient) -> anyhow::Result<()> {
    let report = client.health_check().await;
    print_health(&report);
    Ok(())
}

pub(crate) fn print_health(report: &HealthReport) {
    println!(
        "Health: {}",
        if report.healthy { "OK" } else { "UNHEALTHY" }
    );
    println!("  wallet:  {}", report.wallet_address);
    println!("  chain:   {}", report.chain_id);
    println!("  dry run: {}", report.dry_run);
    println!(
        "  rpc:     {}",
        match report.latest_block {
            Some(block) => format!("connected (block {})", block),
            None => "unreachable".to_string(),
        }
    );
    if let Some(size) = report.cache_size {
        println!("  cache:   {} entries", size);
    }
    if let Some(stats) = &report.storage_stats {
        println!(
            "  storage: {} markets, {} prices, {:.2} MB",
            stats.markets, stats.prices, stats.db_size_mb
        );
    }
    if let Some(error) = &report.error {
        println!("  error:   {}", error);
    }
}
