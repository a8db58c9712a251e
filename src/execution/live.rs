//! Live execution engine
//!
//! Signs orders through the CLOB boundary and posts them. Any CLOB error is
//! surfaced as [`PolymarketError::Order`]; a `success=false` answer is a
//! rejection, not an error.

use super::types::{ExecutionResponse, ExecutionStatus, OrderKind};
use super::{Execution, ExecutionEngine, ValidatedOrder};
use crate::clob::{
    CancelResponse, ClobApi, ClobError, ClobOrderType, MarketOrderArgs, OrderArgs,
    PostOrderResponse, SignedOrder,
};
use crate::error::{PolymarketError, Result};
use crate::telemetry::{record_order, OrderOutcome};
use async_trait::async_trait;
use chrono::Utc;

/// Engine that submits orders to the CLOB
pub struct LiveEngine<'a, C: ClobApi + ?Sized> {
    clob: &'a C,
}

impl<'a, C: ClobApi + ?Sized> LiveEngine<'a, C> {
    pub fn new(clob: &'a C) -> Self {
        Self { clob }
    }

    async fn sign(&self, order: &ValidatedOrder) -> std::result::Result<SignedOrder, ClobError> {
        match order.kind {
            OrderKind::Limit => {
                let price = order.price.ok_or_else(|| {
                    ClobError::InvalidOrder("limit order without a price".to_string())
                })?;
                let args = OrderArgs::new(order.token_id.clone(), price, order.size, order.side);
                self.clob.create_order(&args).await
            }
            OrderKind::Market => {
                let args = MarketOrderArgs::new(order.token_id.clone(), order.size, order.side);
                self.clob.create_market_order(&args).await
            }
        }
    }

    fn failed(order: &ValidatedOrder, stage: &str, err: ClobError) -> PolymarketError {
        let kind = match order.kind {
            OrderKind::Limit => "limit",
            OrderKind::Market => "market",
        };
        tracing::error!(
            token_id = %order.token_id,
            side = %order.side,
            stage,
            error = %err,
            "Failed to {} {} order",
            stage,
            kind
        );
        record_order(OrderOutcome::Failed);
        PolymarketError::Order(format!("Failed to {} {} order: {}", stage, kind, err))
    }

    fn cancel_outcome(scope: &str, response: CancelResponse) -> bool {
        let success = response.succeeded();
        if success {
            tracing::info!(scope, canceled = response.canceled.len(), "Cancelled orders");
        } else {
            tracing::warn!(
                scope,
                not_canceled = ?response.not_canceled,
                "Cancellation was not successful"
            );
        }
        success
    }
}

fn response_for(
    order: &ValidatedOrder,
    order_type: ClobOrderType,
    posted: PostOrderResponse,
) -> ExecutionResponse {
    let status = if posted.success {
        ExecutionStatus::Submitted
    } else {
        ExecutionStatus::Failed
    };
    let error_msg = posted.error().map(str::to_string);

    ExecutionResponse {
        status,
        order_id: posted.order_id.filter(|id| !id.is_empty()),
        token_id: order.token_id.clone(),
        side: order.side,
        size: order.size,
        price: order.price,
        kind: order.kind,
        order_type,
        timestamp: Utc::now(),
        clob_status: posted.status,
        error_msg,
    }
}

#[async_trait]
impl<'a, C: ClobApi + ?Sized> ExecutionEngine for LiveEngine<'a, C> {
    async fn execute(&self, order: ValidatedOrder) -> Result<Execution> {
        let order_type = match order.kind {
            OrderKind::Limit => order.order_type.to_clob(),
            OrderKind::Market => ClobOrderType::Fok,
        };

        let signed = self
            .sign(&order)
            .await
            .map_err(|e| Self::failed(&order, "create", e))?;
        let posted = self
            .clob
            .post_order(&signed, order_type)
            .await
            .map_err(|e| Self::failed(&order, "post", e))?;

        let response = response_for(&order, order_type, posted);
        if response.status == ExecutionStatus::Submitted {
            tracing::info!(
                order_id = ?response.order_id,
                token_id = %order.token_id,
                side = %order.side,
                size = %order.size,
                order_type = order_type.as_str(),
                "Order submitted"
            );
            record_order(OrderOutcome::Submitted);
            Ok(Execution::Submitted(response))
        } else {
            tracing::warn!(
                token_id = %order.token_id,
                error = ?response.error_msg,
                "Order rejected by CLOB"
            );
            record_order(OrderOutcome::Rejected);
            Ok(Execution::Rejected(response))
        }
    }

    async fn cancel_order(&self, order_id: &str) -> Result<bool> {
        let response = self.clob.cancel(order_id).await.map_err(|e| {
            tracing::error!(order_id, error = %e, "Failed to cancel order");
            PolymarketError::Order(format!("Failed to cancel order: {}", e))
        })?;
        Ok(Self::cancel_outcome(order_id, response))
    }

    async fn cancel_all_orders(&self, market: Option<&str>) -> Result<bool> {
        let result = match market {
            Some(market) => self.clob.cancel_market_orders(market).await,
            None => self.clob.cancel_all().await,
        };
        let response = result.map_err(|e| {
            tracing::error!(market = ?market, error = %e, "Failed to cancel all orders");
            PolymarketError::Order(format!("Failed to cancel all orders: {}", e))
        })?;
        Ok(Self::cancel_outcome(market.unwrap_or("all"), response))
    }
}
