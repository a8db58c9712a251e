//! poly-trade: Polymarket client library
//!
//! This library provides:
//! - Market discovery through the Gamma API, with a TTL cache
//! - Order validation and dry-run/live execution against the CLOB
//! - Order book, price and balance reads
//! - Fixed-fraction position sizing and fee estimates
//! - Optional SQLite snapshots of markets and prices
//! - Structured logging and Prometheus metrics

pub mod cache;
pub mod chain;
pub mod cli;
pub mod client;
pub mod clob;
pub mod codec;
pub mod config;
pub mod error;
pub mod execution;
pub mod market;
pub mod orderbook;
pub mod risk;
pub mod storage;
pub mod telemetry;

pub use client::{BalanceInfo, HealthReport, PolymarketClient};
pub use config::{ClientConfig, ClientSettings, ExecutionMode};
pub use error::{PolymarketError, Result};
pub use execution::{Execution, ExecutionResponse, ExecutionStatus, OrderType, Side};
pub use market::{MarketQuery, MarketRecord};
