//! Dry-run execution engine

use super::types::{ExecutionResponse, ExecutionStatus, OrderKind};
use super::{Execution, ExecutionEngine, ValidatedOrder};
use crate::error::Result;
use crate::telemetry::{record_order, OrderOutcome};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Synthetic id for a simulated order
pub fn dry_run_order_id(now: DateTime<Utc>) -> String {
    format!("dry_run_{}", now.timestamp())
}

/// Engine that simulates orders without contacting the CLOB
///
/// Never returns an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunEngine;

impl DryRunEngine {
    pub fn new() -> Self {
        Self
    }

    /// Build the simulated response for an order
    pub fn simulate(&self, order: &ValidatedOrder) -> ExecutionResponse {
        let now = Utc::now();
        let order_type = match order.kind {
            OrderKind::Limit => order.order_type.to_clob(),
            OrderKind::Market => crate::clob::ClobOrderType::Fok,
        };

        match order.kind {
            OrderKind::Limit => tracing::info!(
                token_id = %order.token_id,
                side = %order.side,
                size = %order.size,
                price = ?order.price,
                order_type = order_type.as_str(),
                "DRY RUN: Would place limit order"
            ),
            OrderKind::Market => tracing::info!(
                token_id = %order.token_id,
                side = %order.side,
                amount = %order.size,
                "DRY RUN: Would place market order"
            ),
        }

        ExecutionResponse {
            status: ExecutionStatus::Simulated,
            order_id: Some(dry_run_order_id(now)),
            token_id: order.token_id.clone(),
            side: order.side,
            size: order.size,
            price: order.price,
            kind: order.kind,
            order_type,
            timestamp: now,
            clob_status: None,
            error_msg: None,
        }
    }
}

#[async_trait]
impl ExecutionEngine for DryRunEngine {
    async fn execute(&self, order: ValidatedOrder) -> Result<Execution> {
        let response = self.simulate(&order);
        record_order(OrderOutcome::Simulated);
        Ok(Execution::Simulated(response))
    }

    async fn cancel_order(&self, order_id: &str) -> Result<bool> {
        tracing::info!(order_id, "DRY RUN: Would cancel order");
        Ok(true)
    }

    async fn cancel_all_orders(&self, market: Option<&str>) -> Result<bool> {
        match market {
            Some(market) => tracing::info!(market, "DRY RUN: Would cancel market orders"),
            None => tracing::info!("DRY RUN: Would cancel all orders"),
        }
        Ok(true)
    }
}
