//! Position sizing
//!
//! Sizes a position as a fixed fraction of the available balance, with a
//! floor at the CLOB's minimum order size.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;

/// Fee rate assumed for both maker and taker fills (0.1%)
pub const DEFAULT_FEE_RATE: Decimal = dec!(0.001);

const MIN_PRICE: Decimal = dec!(0.001);
const MAX_PRICE: Decimal = dec!(0.999);

/// Fixed-fraction position sizer
#[derive(Debug, Clone)]
pub struct PositionSizer {
    /// Default fraction of the balance put at risk (e.g., 0.10 = 10%)
    pub max_risk_pct: Decimal,
    /// Minimum order size in shares
    pub min_size: Decimal,
}

impl PositionSizer {
    pub fn new(max_risk_pct: Decimal) -> Self {
        Self {
            max_risk_pct,
            ..Self::default()
        }
    }

    /// Set minimum trade size
    pub fn with_min_size(mut self, min_size: Decimal) -> Self {
        self.min_size = min_size;
        self
    }

    /// Shares to buy at `price` risking `max_risk_pct` of the balance
    ///
    /// Zero when price or balance is not positive, otherwise never below
    /// `min_size`.
    pub fn calculate(
        &self,
        available_balance: Decimal,
        price: Decimal,
        max_risk_pct: Decimal,
    ) -> Decimal {
        if price <= Decimal::ZERO || available_balance <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let position_size = available_balance * max_risk_pct / price;
        position_size.max(self.min_size)
    }

    /// [`calculate`](Self::calculate) with the configured risk fraction
    pub fn calculate_default(&self, available_balance: Decimal, price: Decimal) -> Decimal {
        self.calculate(available_balance, price, self.max_risk_pct)
    }
}

impl Default for PositionSizer {
    fn default() -> Self {
        Self {
            max_risk_pct: dec!(0.10), // 10% of balance
            min_size: dec!(5),        // CLOB minimum order size
        }
    }
}

/// Shift a price by `adjustment`, clamped to [0.001, 0.999] and rounded to 4dp
pub fn adjust_price(price: Decimal, adjustment: Decimal) -> Decimal {
    (price + adjustment)
        .clamp(MIN_PRICE, MAX_PRICE)
        .round_dp_with_strategy(4, RoundingStrategy::MidpointNearestEven)
}

/// Fee breakdown for an order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeEstimate {
    pub notional: Decimal,
    pub maker_fee: Decimal,
    pub taker_fee: Decimal,
    /// Conservative estimate, the taker fee
    pub estimated_fee: Decimal,
}

/// Fees for `size` shares at `price`
pub fn estimate_fees(size: Decimal, price: Decimal) -> FeeEstimate {
    let notional = size * price;
    let taker_fee = notional * DEFAULT_FEE_RATE;

    FeeEstimate {
        notional,
        maker_fee: notional * DEFAULT_FEE_RATE,
        taker_fee,
        estimated_fee: taker_fee,
    }
}
