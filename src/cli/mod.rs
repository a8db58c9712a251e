//! CLI interface for poly-trade
//!
//! Provides subcommands for:
//! - `markets`, `search`, `market`: market discovery
//! - `book`, `price`: order book reads
//! - `order`, `cancel`, `orders`: order management (dry-run unless `--live`)
//! - `balance`, `size`: portfolio and position sizing
//! - `health`, `cleanup`, `config`: maintenance
//! - `demo`: walk through every read path and a simulated order

mod demo;
mod maintenance;
mod markets;
mod trading;

pub use demo::DemoArgs;
pub use maintenance::{health, CleanupArgs, ConfigArgs};
pub use markets::{BookArgs, MarketArgs, MarketsArgs, PriceArgs, SearchArgs};
pub use trading::{BalanceArgs, CancelArgs, OrderArgs, OrdersArgs, SizeArgs};

use crate::config::{ClientConfig, ClientSettings};
use clap::{Parser, Subcommand};
use std::path::Path;

#[derive(Parser, Debug)]
#[command(name = "poly-trade")]
#[command(about = "Polymarket client: market discovery, order validation and dry-run/live execution")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML configuration file; environment variables are used when absent
    #[arg(short, long)]
    pub config: Option<String>,

    /// Submit orders to the CLOB instead of simulating them
    #[arg(long)]
    pub live: bool,

    /// Emit JSON logs
    #[arg(long)]
    pub json_logs: bool,

    /// Serve Prometheus metrics on this port
    #[arg(long)]
    pub metrics_port: Option<u16>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List markets by volume
    Markets(MarketsArgs),
    /// Search active markets by text
    Search(SearchArgs),
    /// Show one market
    Market(MarketArgs),
    /// Show the order book of a token
    Book(BookArgs),
    /// Show the best price of a token
    Price(PriceArgs),
    /// Place a limit (with --price) or market order
    Order(OrderArgs),
    /// Cancel one order or all orders
    Cancel(CancelArgs),
    /// List open orders
    Orders(OrdersArgs),
    /// Show balances
    Balance(BalanceArgs),
    /// Suggest a position size
    Size(SizeArgs),
    /// Check connectivity
    Health,
    /// Delete old stored prices
    Cleanup(CleanupArgs),
    /// Show the effective configuration
    Config(ConfigArgs),
    /// Exercise every read path and a simulated order
    Demo(DemoArgs),
}

impl Cli {
    /// Load settings from the config file or the environment, apply flags,
    /// and validate
    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut settings = match &self.config {
            Some(path) => ClientSettings::load(Path::new(path))?,
            None => ClientSettings::from_env()?,
        };

        if self.live {
            settings.dry_run = false;
        }
        if self.json_logs {
            settings.telemetry.json_logs = true;
        }
        if self.metrics_port.is_some() {
            settings.telemetry.metrics_port = self.metrics_port;
        }

        Ok(settings.validate()?)
    }
}
