//! Order execution module
//!
//! An order moves UNVALIDATED -> VALIDATED -> {SIMULATED | SUBMITTED | FAILED}.
//! Validation is enforced by [`ValidatedOrder`]; the dry-run and live engines
//! share the [`ExecutionEngine`] trait and [`OrderExecutor`] picks one from
//! the configured mode.

mod dry_run;
mod executor;
mod live;
mod types;
mod validator;

pub use dry_run::{dry_run_order_id, DryRunEngine};
pub use executor::OrderExecutor;
pub use live::LiveEngine;
pub use types::{
    ExecutionResponse, ExecutionStatus, OrderInfo, OrderKind, OrderRequest, OrderStatus,
    OrderType, Side,
};
pub use validator::{validate, validate_request, ValidatedOrder, ValidationResult};

use crate::error::Result;
use async_trait::async_trait;

/// Result of executing a validated order
///
/// Dry-run execution always yields `Simulated`. Live execution yields
/// `Submitted`, or `Rejected` when the CLOB answered with `success=false`;
/// transport and signing failures are errors instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    Simulated(ExecutionResponse),
    Submitted(ExecutionResponse),
    Rejected(ExecutionResponse),
}

impl Execution {
    pub fn response(&self) -> &ExecutionResponse {
        match self {
            Execution::Simulated(r) | Execution::Submitted(r) | Execution::Rejected(r) => r,
        }
    }

    pub fn into_response(self) -> ExecutionResponse {
        match self {
            Execution::Simulated(r) | Execution::Submitted(r) | Execution::Rejected(r) => r,
        }
    }

    pub fn status(&self) -> ExecutionStatus {
        self.response().status
    }

    pub fn order_id(&self) -> Option<&str> {
        self.response().order_id.as_deref()
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self, Execution::Simulated(_))
    }
}

/// Trait for execution engine implementations
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Execute a validated order
    async fn execute(&self, order: ValidatedOrder) -> Result<Execution>;
    /// Cancel one order, returning the success flag
    async fn cancel_order(&self, order_id: &str) -> Result<bool>;
    /// Cancel all orders, or only those of one market
    async fn cancel_all_orders(&self, market: Option<&str>) -> Result<bool>;
}
