//! CLOB wire types
//!
//! Every inbound payload is decoded into a typed record at the boundary.
//! Fields the client does not use are kept in an `extra` map so nothing is
//! lost, but internal code never reads untyped JSON.

use crate::codec::{de_lenient_decimal, de_opt_string_or_number};
use crate::execution::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Raw-unit scale of USDC and outcome shares (6 decimals)
pub const RAW_UNIT_SCALE: u32 = 6;

/// Order types understood by the CLOB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClobOrderType {
    /// Good till cancelled
    Gtc,
    /// Fill or kill
    Fok,
}

impl ClobOrderType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gtc => "GTC",
            Self::Fok => "FOK",
        }
    }
}

/// Parameters for a limit order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderArgs {
    pub token_id: String,
    pub price: Decimal,
    pub size: Decimal,
    pub side: Side,
    pub fee_rate_bps: u16,
    pub nonce: u64,
    /// Unix seconds, 0 for no expiry
    pub expiration: u64,
}

impl OrderArgs {
    pub fn new(token_id: impl Into<String>, price: Decimal, size: Decimal, side: Side) -> Self {
        Self {
            token_id: token_id.into(),
            price,
            size,
            side,
            fee_rate_bps: 0,
            nonce: 0,
            expiration: 0,
        }
    }
}

/// Parameters for a market order
#[derive(Debug, Clone, PartialEq)]
pub struct MarketOrderArgs {
    pub token_id: String,
    /// USDC to spend for BUY, shares to sell for SELL
    pub amount: Decimal,
    pub side: Side,
    /// Worst acceptable price; derived from the book when absent
    pub price: Option<Decimal>,
    pub fee_rate_bps: u16,
    pub nonce: u64,
}

impl MarketOrderArgs {
    pub fn new(token_id: impl Into<String>, amount: Decimal, side: Side) -> Self {
        Self {
            token_id: token_id.into(),
            amount,
            side,
            price: None,
            fee_rate_bps: 0,
            nonce: 0,
        }
    }
}

/// A signed order, serialized the way `POST /order` expects it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedOrder {
    pub salt: u64,
    pub maker: String,
    pub signer: String,
    pub taker: String,
    pub token_id: String,
    pub maker_amount: String,
    pub taker_amount: String,
    pub expiration: String,
    pub nonce: String,
    pub fee_rate_bps: String,
    pub side: Side,
    pub signature_type: u8,
    pub signature: String,
}

/// `POST /order` request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostOrderRequest<'a> {
    pub order: &'a SignedOrder,
    pub owner: &'a str,
    pub order_type: ClobOrderType,
}

/// `POST /order` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostOrderResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(rename = "orderID", default)]
    pub order_id: Option<String>,
    #[serde(rename = "errorMsg", default)]
    pub error_msg: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl PostOrderResponse {
    /// Error message, treating the empty string as absent
    pub fn error(&self) -> Option<&str> {
        self.error_msg.as_deref().filter(|m| !m.is_empty())
    }
}

/// Response to the cancel endpoints
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CancelResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub canceled: Vec<String>,
    #[serde(default)]
    pub not_canceled: HashMap<String, Value>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl CancelResponse {
    /// Explicit `success` flag, or "nothing failed to cancel" when absent
    pub fn succeeded(&self) -> bool {
        self.success.unwrap_or(self.not_canceled.is_empty())
    }
}

/// An open or historical order as reported by `GET /data/orders`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawOrder {
    #[serde(deserialize_with = "crate::codec::de_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub market: String,
    #[serde(default)]
    pub asset_id: String,
    #[serde(default)]
    pub side: String,
    #[serde(default, deserialize_with = "de_lenient_decimal")]
    pub original_size: Decimal,
    #[serde(default, deserialize_with = "de_lenient_decimal")]
    pub size_matched: Decimal,
    #[serde(default, deserialize_with = "de_lenient_decimal")]
    pub price: Decimal,
    #[serde(default)]
    pub order_type: Option<String>,
    /// Unix seconds (string or number)
    #[serde(default, deserialize_with = "de_opt_string_or_number")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string_or_number")]
    pub fee_rate_bps: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// One page of `GET /data/orders`
#[derive(Debug, Deserialize)]
pub(crate) struct OrdersPage {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Price level as the CLOB reports it (numeric strings)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawLevel {
    #[serde(default, deserialize_with = "de_lenient_decimal")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "de_lenient_decimal")]
    pub size: Decimal,
}

/// `GET /book` response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookResponse {
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub asset_id: Option<String>,
    #[serde(default)]
    pub bids: Vec<RawLevel>,
    #[serde(default)]
    pub asks: Vec<RawLevel>,
    #[serde(default, deserialize_with = "de_opt_string_or_number")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// `GET /price` and `GET /last-trade-price` responses
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct PriceResponse {
    #[serde(default, deserialize_with = "de_lenient_decimal")]
    pub price: Decimal,
}

/// `GET /neg-risk` response
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NegRiskResponse {
    #[serde(default)]
    pub neg_risk: bool,
}

/// Asset selector for balance queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetType {
    /// USDC collateral
    Collateral,
    /// Outcome token shares
    Conditional { token_id: String },
}

/// `GET /balance-allowance` response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BalanceAllowance {
    /// Raw 6-decimal units
    #[serde(default, deserialize_with = "de_lenient_decimal")]
    pub balance: Decimal,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl BalanceAllowance {
    /// Balance in whole units (USDC or shares)
    pub fn amount(&self) -> Decimal {
        self.balance / Decimal::from(10u64.pow(RAW_UNIT_SCALE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_post_order_response_keeps_unknown_fields() {
        let resp: PostOrderResponse = serde_json::from_value(json!({
            "success": true,
            "orderID": "0xabc",
            "errorMsg": "",
            "status": "live",
            "transactionsHashes": []
        }))
        .unwrap();

        assert!(resp.success);
        assert_eq!(resp.order_id.as_deref(), Some("0xabc"));
        assert_eq!(resp.error(), None);
        assert!(resp.extra.contains_key("transactionsHashes"));
    }

    #[test]
    fn test_cancel_response_success_flag() {
        let explicit: CancelResponse = serde_json::from_value(json!({"success": false})).unwrap();
        assert!(!explicit.succeeded());

        let ok: CancelResponse =
            serde_json::from_value(json!({"canceled": ["1"], "not_canceled": {}})).unwrap();
        assert!(ok.succeeded());

        let partial: CancelResponse = serde_json::from_value(json!({
            "canceled": [],
            "not_canceled": {"2": "order already matched"}
        }))
        .unwrap();
        assert!(!partial.succeeded());
    }

    #[test]
    fn test_raw_order_lenient_numbers() {
        let order: RawOrder = serde_json::from_value(json!({
            "id": "0x1",
            "status": "LIVE",
            "market": "0xmarket",
            "asset_id": "123",
            "side": "BUY",
            "original_size": "100",
            "size_matched": "40.5",
            "price": "0.52",
            "created_at": 1700000000,
            "associate_trades": []
        }))
        .unwrap();

        assert_eq!(order.original_size, dec!(100));
        assert_eq!(order.size_matched, dec!(40.5));
        assert_eq!(order.created_at.as_deref(), Some("1700000000"));
        assert!(order.extra.contains_key("associate_trades"));
    }

    #[test]
    fn test_book_response() {
        let book: BookResponse = serde_json::from_value(json!({
            "market": "0xm",
            "asset_id": "123",
            "bids": [{"price": "0.48", "size": "100"}],
            "asks": [{"price": "0.52", "size": "50"}],
            "timestamp": "1700000000000"
        }))
        .unwrap();

        assert_eq!(book.bids[0].price, dec!(0.48));
        assert_eq!(book.asks[0].size, dec!(50));
    }

    #[test]
    fn test_balance_scaling() {
        let balance: BalanceAllowance =
            serde_json::from_value(json!({"balance": "12500000", "allowances": {}})).unwrap();
        assert_eq!(balance.amount(), dec!(12.5));
    }

    #[test]
    fn test_signed_order_wire_format() {
        let order = SignedOrder {
            salt: 7,
            maker: "0xmaker".to_string(),
            signer: "0xmaker".to_string(),
            taker: "0x0".to_string(),
            token_id: "123".to_string(),
            maker_amount: "5500000".to_string(),
            taker_amount: "10000000".to_string(),
            expiration: "0".to_string(),
            nonce: "0".to_string(),
            fee_rate_bps: "0".to_string(),
            side: Side::Sell,
            signature_type: 0,
            signature: "0xsig".to_string(),
        };
        let body = PostOrderRequest {
            order: &order,
            owner: "api-key",
            order_type: ClobOrderType::Fok,
        };
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["orderType"], "FOK");
        assert_eq!(value["owner"], "api-key");
        assert_eq!(value["order"]["side"], "SELL");
        assert_eq!(value["order"]["tokenId"], "123");
        assert_eq!(value["order"]["makerAmount"], "5500000");
        assert_eq!(value["order"]["salt"], 7);
    }
}
