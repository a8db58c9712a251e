//! Execution types

use crate::clob::ClobOrderType;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Trade side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    /// Case-insensitive `BUY` / `SELL`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            _ => Err(format!("Unknown side: {:?}", s)),
        }
    }
}

/// Limit or market order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderKind {
    /// Price specified, rests on the book
    Limit,
    /// Immediate execution against the book
    Market,
}

/// Caller-facing order type
///
/// `LIMIT` and `MARKET` are accepted as aliases of the CLOB's own types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    #[default]
    Gtc,
    Fok,
    Limit,
    Market,
}

impl OrderType {
    /// Fixed mapping onto the CLOB's order types
    pub fn to_clob(self) -> ClobOrderType {
        match self {
            OrderType::Gtc | OrderType::Limit => ClobOrderType::Gtc,
            OrderType::Fok | OrderType::Market => ClobOrderType::Fok,
        }
    }
}

impl FromStr for OrderType {
    type Err = Infallible;

    /// Unrecognized names fall back to GTC
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "FOK" => OrderType::Fok,
            "LIMIT" => OrderType::Limit,
            "MARKET" => OrderType::Market,
            _ => OrderType::Gtc,
        })
    }
}

/// An order as requested by the caller, not yet validated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Outcome token identifier
    pub token_id: String,
    pub side: Side,
    /// Shares for limit orders; USDC (BUY) or shares (SELL) for market orders
    pub size: Decimal,
    /// Limit price, absent for market orders
    pub price: Option<Decimal>,
    pub kind: OrderKind,
    pub order_type: OrderType,
}

impl OrderRequest {
    /// GTC limit order
    pub fn limit(token_id: impl Into<String>, side: Side, size: Decimal, price: Decimal) -> Self {
        Self {
            token_id: token_id.into(),
            side,
            size,
            price: Some(price),
            kind: OrderKind::Limit,
            order_type: OrderType::Gtc,
        }
    }

    /// FOK market order for `amount`
    pub fn market(token_id: impl Into<String>, side: Side, amount: Decimal) -> Self {
        Self {
            token_id: token_id.into(),
            side,
            size: amount,
            price: None,
            kind: OrderKind::Market,
            order_type: OrderType::Fok,
        }
    }

    pub fn with_order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = order_type;
        self
    }
}

/// Terminal execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecutionStatus {
    Simulated,
    Submitted,
    Failed,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExecutionStatus::Simulated => "SIMULATED",
            ExecutionStatus::Submitted => "SUBMITTED",
            ExecutionStatus::Failed => "FAILED",
        })
    }
}

/// Normalized outcome of an order execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResponse {
    pub status: ExecutionStatus,
    pub order_id: Option<String>,
    pub token_id: String,
    pub side: Side,
    pub size: Decimal,
    pub price: Option<Decimal>,
    pub kind: OrderKind,
    pub order_type: ClobOrderType,
    pub timestamp: DateTime<Utc>,
    /// Order status reported by the CLOB (e.g. `live`, `matched`)
    pub clob_status: Option<String>,
    pub error_msg: Option<String>,
}

/// Lifecycle state of an order on the CLOB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Open,
    Filled,
    Cancelled,
    PartiallyFilled,
}

impl OrderStatus {
    /// Map a CLOB status string; unknown values are treated as open
    pub fn from_clob(status: &str) -> Self {
        match status.trim().to_ascii_uppercase().as_str() {
            "FILLED" | "MATCHED" => OrderStatus::Filled,
            "CANCELLED" | "CANCELED" => OrderStatus::Cancelled,
            "PARTIALLY_FILLED" => OrderStatus::PartiallyFilled,
            _ => OrderStatus::Open,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderStatus::Open => "OPEN",
            OrderStatus::Filled => "FILLED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::PartiallyFilled => "PARTIALLY_FILLED",
        })
    }
}

/// An order known to the CLOB
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderInfo {
    pub id: String,
    /// Condition id of the market
    pub market_id: String,
    pub token_id: String,
    pub side: Side,
    pub order_type: OrderType,
    pub status: OrderStatus,
    /// Original size
    pub size: Decimal,
    pub price: Decimal,
    pub filled_size: Decimal,
    pub remaining_size: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Fraction, e.g. 0.001 for 10 bps
    pub fee_rate: Decimal,
}
