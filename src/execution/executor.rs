//! Mode-aware order executor

use super::dry_run::DryRunEngine;
use super::live::LiveEngine;
use super::types::{OrderInfo, OrderRequest, OrderStatus, OrderType, Side};
use super::{Execution, ExecutionEngine, ValidatedOrder};
use crate::clob::{ClobApi, RawOrder};
use crate::config::ExecutionMode;
use crate::error::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Routes orders to the dry-run or live engine
///
/// In dry-run mode the CLOB is never asked to sign, post or cancel anything.
pub struct OrderExecutor<'a, C: ClobApi + ?Sized> {
    clob: &'a C,
    mode: ExecutionMode,
}

impl<'a, C: ClobApi + ?Sized> OrderExecutor<'a, C> {
    pub fn new(clob: &'a C, mode: ExecutionMode) -> Self {
        Self { clob, mode }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    fn engine(&self) -> Box<dyn ExecutionEngine + 'a> {
        match self.mode {
            ExecutionMode::DryRun => Box::new(DryRunEngine::new()),
            ExecutionMode::Live => Box::new(LiveEngine::new(self.clob)),
        }
    }

    /// Execute an order that already passed validation
    pub async fn execute(&self, order: ValidatedOrder) -> Result<Execution> {
        self.engine().execute(order).await
    }

    /// Validate then execute
    pub async fn submit(&self, request: OrderRequest) -> Result<Execution> {
        let order = ValidatedOrder::try_from(request).inspect_err(|e| {
            tracing::warn!(error = %e, "Order rejected by validation");
        })?;
        self.execute(order).await
    }

    pub async fn cancel_order(&self, order_id: &str) -> Result<bool> {
        self.engine().cancel_order(order_id).await
    }

    /// Cancel every order, or only those of `market` (condition id)
    pub async fn cancel_all_orders(&self, market: Option<&str>) -> Result<bool> {
        self.engine().cancel_all_orders(market).await
    }

    /// Orders known to the CLOB, empty on failure
    ///
    /// Orders that cannot be converted are skipped with a warning.
    pub async fn get_orders(&self, market: Option<&str>) -> Vec<OrderInfo> {
        let raw = match self.clob.get_orders(market).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(market = ?market, error = %e, "Failed to get orders");
                return Vec::new();
            }
        };

        raw.into_iter()
            .filter_map(|order| {
                let id = order.id.clone();
                match order_info(order) {
                    Ok(info) => Some(info),
                    Err(reason) => {
                        tracing::warn!(order_id = %id, reason, "Failed to parse order");
                        None
                    }
                }
            })
            .collect()
    }
}

/// Convert a CLOB order record
pub fn order_info(raw: RawOrder) -> std::result::Result<OrderInfo, String> {
    if raw.asset_id.trim().is_empty() {
        return Err("missing asset_id".to_string());
    }

    let side = raw.side.parse::<Side>().unwrap_or(Side::Sell);
    let order_type = raw
        .order_type
        .as_deref()
        .and_then(|t| t.parse::<OrderType>().ok())
        .unwrap_or(OrderType::Limit);
    let status = OrderStatus::from_clob(&raw.status);

    let created_at = parse_timestamp(raw.created_at.as_deref());
    let updated_at = raw
        .extra
        .get("updated_at")
        .and_then(crate::codec::scalar_string)
        .map(|s| parse_timestamp(Some(&s)))
        .unwrap_or(created_at);

    let fee_rate = raw
        .fee_rate_bps
        .as_deref()
        .and_then(crate::codec::parse_decimal)
        .map(|bps| bps / Decimal::from(10_000))
        .unwrap_or(Decimal::ZERO);

    Ok(OrderInfo {
        id: raw.id,
        market_id: raw.market,
        token_id: raw.asset_id,
        side,
        order_type,
        status,
        size: raw.original_size,
        price: raw.price,
        filled_size: raw.size_matched,
        remaining_size: raw.original_size - raw.size_matched,
        created_at,
        updated_at,
        fee_rate,
    })
}

/// Unix seconds or RFC 3339; anything else is "now"
fn parse_timestamp(value: Option<&str>) -> DateTime<Utc> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Utc::now();
    };

    if let Ok(secs) = value.parse::<i64>() {
        if let Some(ts) = DateTime::from_timestamp(secs, 0) {
            return ts;
        }
    }

    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clob::{
        AssetType, BalanceAllowance, BookResponse, CancelResponse, ClobError, ClobOrderType,
        MarketOrderArgs, OrderArgs, PostOrderResponse, SignedOrder,
    };
    use crate::error::PolymarketError;
    use crate::execution::ExecutionStatus;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted CLOB that records what it was asked to do
    #[derive(Default)]
    struct ScriptedClob {
        fail: bool,
        reject: bool,
        calls: AtomicUsize,
        posted_types: Mutex<Vec<ClobOrderType>>,
        orders: Vec<serde_json::Value>,
    }

    impl ScriptedClob {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn rejecting() -> Self {
            Self {
                reject: true,
                ..Self::default()
            }
        }

        fn call(&self) -> std::result::Result<(), ClobError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ClobError::Http("connection refused".to_string()))
            } else {
                Ok(())
            }
        }

        fn signed(token_id: &str, side: Side) -> SignedOrder {
            SignedOrder {
                salt: 1,
                maker: "0xmaker".to_string(),
                signer: "0xmaker".to_string(),
                taker: "0x0000000000000000000000000000000000000000".to_string(),
                token_id: token_id.to_string(),
                maker_amount: "5500000".to_string(),
                taker_amount: "10000000".to_string(),
                expiration: "0".to_string(),
                nonce: "0".to_string(),
                fee_rate_bps: "0".to_string(),
                side,
                signature_type: 0,
                signature: "0xsig".to_string(),
            }
        }

        fn cancel_response(&self) -> CancelResponse {
            CancelResponse {
                success: Some(!self.reject),
                ..CancelResponse::default()
            }
        }
    }

    #[async_trait]
    impl ClobApi for ScriptedClob {
        async fn create_order(
            &self,
            args: &OrderArgs,
        ) -> std::result::Result<SignedOrder, ClobError> {
            self.call()?;
            Ok(Self::signed(&args.token_id, args.side))
        }

        async fn create_market_order(
            &self,
            args: &MarketOrderArgs,
        ) -> std::result::Result<SignedOrder, ClobError> {
            self.call()?;
            Ok(Self::signed(&args.token_id, args.side))
        }

        async fn post_order(
            &self,
            _order: &SignedOrder,
            order_type: ClobOrderType,
        ) -> std::result::Result<PostOrderResponse, ClobError> {
            self.call()?;
            self.posted_types.lock().unwrap().push(order_type);
            Ok(PostOrderResponse {
                success: !self.reject,
                order_id: (!self.reject).then(|| "0xorder".to_string()),
                error_msg: self.reject.then(|| "not enough balance".to_string()),
                status: (!self.reject).then(|| "live".to_string()),
                ..PostOrderResponse::default()
            })
        }

        async fn cancel(&self, _order_id: &str) -> std::result::Result<CancelResponse, ClobError> {
            self.call()?;
            Ok(self.cancel_response())
        }

        async fn cancel_all(&self) -> std::result::Result<CancelResponse, ClobError> {
            self.call()?;
            Ok(self.cancel_response())
        }

        async fn cancel_market_orders(
            &self,
            _market: &str,
        ) -> std::result::Result<CancelResponse, ClobError> {
            self.call()?;
            Ok(self.cancel_response())
        }

        async fn get_orders(
            &self,
            _market: Option<&str>,
        ) -> std::result::Result<Vec<RawOrder>, ClobError> {
            self.call()?;
            Ok(self
                .orders
                .iter()
                .filter_map(|v| serde_json::from_value(v.clone()).ok())
                .collect())
        }

        async fn get_order_book(
            &self,
            _token_id: &str,
        ) -> std::result::Result<BookResponse, ClobError> {
            Err(ClobError::Http("unused".to_string()))
        }

        async fn get_price(
            &self,
            _token_id: &str,
            _side: Side,
        ) -> std::result::Result<Decimal, ClobError> {
            Err(ClobError::Http("unused".to_string()))
        }

        async fn get_last_trade_price(
            &self,
            _token_id: &str,
        ) -> std::result::Result<Decimal, ClobError> {
            Err(ClobError::Http("unused".to_string()))
        }

        async fn get_balance_allowance(
            &self,
            _asset: AssetType,
        ) -> std::result::Result<BalanceAllowance, ClobError> {
            Err(ClobError::Http("unused".to_string()))
        }
    }

    fn limit() -> OrderRequest {
        OrderRequest::limit("tok1", Side::Buy, dec!(10), dec!(0.55))
    }

    #[tokio::test]
    async fn test_dry_run_never_touches_clob() {
        let clob = ScriptedClob::failing();
        let executor = OrderExecutor::new(&clob, ExecutionMode::DryRun);

        let execution = executor.submit(limit()).await.unwrap();
        assert_eq!(execution.status(), ExecutionStatus::Simulated);
        assert!(executor.cancel_order("0x1").await.unwrap());
        assert!(executor.cancel_all_orders(None).await.unwrap());
        assert_eq!(clob.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_validation_failure_stops_before_execution() {
        let clob = ScriptedClob::default();
        let executor = OrderExecutor::new(&clob, ExecutionMode::Live);

        let err = executor
            .submit(OrderRequest::limit("tok1", Side::Buy, dec!(-5), dec!(1.5)))
            .await
            .unwrap_err();
        assert!(matches!(err, PolymarketError::Validation(ref e) if e.len() == 2));
        assert_eq!(clob.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_live_limit_order_submitted() {
        let clob = ScriptedClob::default();
        let executor = OrderExecutor::new(&clob, ExecutionMode::Live);

        let execution = executor.submit(limit()).await.unwrap();
        assert!(matches!(execution, Execution::Submitted(_)));
        assert_eq!(execution.order_id(), Some("0xorder"));
        assert_eq!(execution.response().clob_status.as_deref(), Some("live"));
        assert_eq!(*clob.posted_types.lock().unwrap(), vec![ClobOrderType::Gtc]);
    }

    #[tokio::test]
    async fn test_live_order_type_mapping() {
        let clob = ScriptedClob::default();
        let executor = OrderExecutor::new(&clob, ExecutionMode::Live);

        executor
            .submit(limit().with_order_type(OrderType::Market))
            .await
            .unwrap();
        executor
            .submit(limit().with_order_type(OrderType::Limit))
            .await
            .unwrap();
        executor
            .submit(
                OrderRequest::market("tok1", Side::Buy, dec!(20)).with_order_type(OrderType::Gtc),
            )
            .await
            .unwrap();

        assert_eq!(
            *clob.posted_types.lock().unwrap(),
            vec![ClobOrderType::Fok, ClobOrderType::Gtc, ClobOrderType::Fok]
        );
    }

    #[tokio::test]
    async fn test_live_rejection_is_not_an_error() {
        let clob = ScriptedClob::rejecting();
        let executor = OrderExecutor::new(&clob, ExecutionMode::Live);

        let execution = executor.submit(limit()).await.unwrap();
        assert!(matches!(execution, Execution::Rejected(_)));
        assert_eq!(execution.status(), ExecutionStatus::Failed);
        assert_eq!(
            execution.response().error_msg.as_deref(),
            Some("not enough balance")
        );
    }

    #[tokio::test]
    async fn test_live_clob_error_is_order_error() {
        let clob = ScriptedClob::failing();
        let executor = OrderExecutor::new(&clob, ExecutionMode::Live);

        let err = executor.submit(limit()).await.unwrap_err();
        assert!(matches!(err, PolymarketError::Order(ref m) if m.contains("connection refused")));

        let err = executor.cancel_order("0x1").await.unwrap_err();
        assert!(matches!(err, PolymarketError::Order(_)));
    }

    #[tokio::test]
    async fn test_live_cancel_reports_flag() {
        let ok = ScriptedClob::default();
        assert!(OrderExecutor::new(&ok, ExecutionMode::Live)
            .cancel_all_orders(Some("0xmarket"))
            .await
            .unwrap());

        let rejected = ScriptedClob::rejecting();
        assert!(!OrderExecutor::new(&rejected, ExecutionMode::Live)
            .cancel_order("0x1")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_get_orders_converts_and_skips() {
        let clob = ScriptedClob {
            orders: vec![
                json!({
                    "id": "0x1",
                    "status": "LIVE",
                    "market": "0xm",
                    "asset_id": "123",
                    "side": "BUY",
                    "original_size": "100",
                    "size_matched": "40",
                    "price": "0.52",
                    "created_at": 1700000000,
                    "fee_rate_bps": "10"
                }),
                json!({"id": "0x2", "status": "MATCHED", "asset_id": ""}),
            ],
            ..ScriptedClob::default()
        };
        let executor = OrderExecutor::new(&clob, ExecutionMode::DryRun);

        let orders = executor.get_orders(None).await;
        assert_eq!(orders.len(), 1);
        let order = &orders[0];
        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(order.remaining_size, dec!(60));
        assert_eq!(order.fee_rate, dec!(0.001));
        assert_eq!(order.order_type, OrderType::Limit);
        assert_eq!(order.created_at.timestamp(), 1_700_000_000);
        assert_eq!(order.updated_at, order.created_at);
    }

    #[tokio::test]
    async fn test_get_orders_failure_is_empty() {
        let clob = ScriptedClob::failing();
        let executor = OrderExecutor::new(&clob, ExecutionMode::Live);
        assert!(executor.get_orders(Some("0xm")).await.is_empty());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(
            parse_timestamp(Some("2024-01-02T03:04:05Z")).timestamp(),
            1_704_164_645
        );
        assert_eq!(parse_timestamp(Some("1700000000")).timestamp(), 1_700_000_000);
        let before = Utc::now();
        assert!(parse_timestamp(Some("garbage")) >= before);
        assert!(parse_timestamp(None) >= before);
    }
}
