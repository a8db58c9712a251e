//! Order parameter validation
//!
//! Every rule is checked independently and all violations are reported
//! together, in rule order. A [`ValidatedOrder`] can only be obtained from a
//! request that passed every rule.

use super::types::{OrderKind, OrderRequest, Side};
use crate::error::PolymarketError;
use rust_decimal::Decimal;
use serde::Serialize;

pub const INVALID_TOKEN_ID: &str = "Invalid token_id";
pub const INVALID_SIDE: &str = "Side must be 'BUY' or 'SELL'";
pub const NON_POSITIVE_SIZE: &str = "Size must be positive";
pub const PRICE_OUT_OF_RANGE: &str = "Price must be between 0 and 1";
pub const MISSING_LIMIT_PRICE: &str = "Price is required for limit orders";

/// Outcome of a validation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    /// Reserved for soft checks; currently always empty
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings: Vec::new(),
        }
    }
}

/// Validate raw order parameters
///
/// `price` is checked against the open interval (0, 1) when given.
pub fn validate(
    token_id: &str,
    side: &str,
    size: Decimal,
    price: Option<Decimal>,
) -> ValidationResult {
    let mut errors = Vec::new();

    if token_id.trim().is_empty() {
        errors.push(INVALID_TOKEN_ID.to_string());
    }
    if side.parse::<Side>().is_err() {
        errors.push(INVALID_SIDE.to_string());
    }
    if size <= Decimal::ZERO {
        errors.push(NON_POSITIVE_SIZE.to_string());
    }
    if let Some(price) = price {
        if !price_in_range(price) {
            errors.push(PRICE_OUT_OF_RANGE.to_string());
        }
    }

    ValidationResult::from_errors(errors)
}

/// Validate a typed request
///
/// Market orders carry no price. A limit order without one fails the price
/// rule.
pub fn validate_request(request: &OrderRequest) -> ValidationResult {
    let mut errors = Vec::new();

    if request.token_id.trim().is_empty() {
        errors.push(INVALID_TOKEN_ID.to_string());
    }
    if request.size <= Decimal::ZERO {
        errors.push(NON_POSITIVE_SIZE.to_string());
    }
    if request.kind == OrderKind::Limit {
        match request.price {
            Some(price) if !price_in_range(price) => errors.push(PRICE_OUT_OF_RANGE.to_string()),
            Some(_) => {}
            None => errors.push(MISSING_LIMIT_PRICE.to_string()),
        }
    }

    ValidationResult::from_errors(errors)
}

fn price_in_range(price: Decimal) -> bool {
    price > Decimal::ZERO && price < Decimal::ONE
}

impl OrderRequest {
    pub fn validate(&self) -> ValidationResult {
        validate_request(self)
    }
}

/// An order request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOrder(OrderRequest);

impl ValidatedOrder {
    pub fn request(&self) -> &OrderRequest {
        &self.0
    }

    pub fn into_inner(self) -> OrderRequest {
        self.0
    }
}

impl TryFrom<OrderRequest> for ValidatedOrder {
    type Error = PolymarketError;

    fn try_from(request: OrderRequest) -> Result<Self, Self::Error> {
        let result = validate_request(&request);
        if result.valid {
            Ok(Self(request))
        } else {
            Err(PolymarketError::Validation(result.errors))
        }
    }
}

impl std::ops::Deref for ValidatedOrder {
    type Target = OrderRequest;

    fn deref(&self) -> &OrderRequest {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_valid_order() {
        let result = validate("tok1", "BUY", dec!(10.0), Some(dec!(0.55)));
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_negative_size_and_price_above_one() {
        let result = validate("tok1", "BUY", dec!(-5.0), Some(dec!(1.5)));
        assert!(!result.valid);
        assert_eq!(result.errors, vec![NON_POSITIVE_SIZE, PRICE_OUT_OF_RANGE]);
    }

    #[test]
    fn test_all_rules_aggregate_in_order() {
        let result = validate("  ", "hold", dec!(0), Some(dec!(0)));
        assert_eq!(
            result.errors,
            vec![
                INVALID_TOKEN_ID,
                INVALID_SIDE,
                NON_POSITIVE_SIZE,
                PRICE_OUT_OF_RANGE
            ]
        );
    }

    #[test]
    fn test_side_is_case_insensitive() {
        assert!(validate("tok", "sell", dec!(1), None).valid);
        assert!(validate("tok", "Buy", dec!(1), None).valid);
    }

    #[test]
    fn test_price_bounds_are_strict() {
        assert!(!validate("tok", "BUY", dec!(1), Some(dec!(0))).valid);
        assert!(!validate("tok", "BUY", dec!(1), Some(dec!(1))).valid);
        assert!(validate("tok", "BUY", dec!(1), Some(dec!(0.001))).valid);
        assert!(validate("tok", "BUY", dec!(1), Some(dec!(0.999))).valid);
    }

    #[test]
    fn test_price_is_optional() {
        assert!(validate("tok", "BUY", dec!(1), None).valid);
    }

    #[test]
    fn test_request_validation() {
        let ok = OrderRequest::limit("tok", Side::Buy, dec!(10), dec!(0.5));
        assert!(ok.validate().valid);

        let mut missing_price = ok.clone();
        missing_price.price = None;
        assert_eq!(missing_price.validate().errors, vec![MISSING_LIMIT_PRICE]);

        let market = OrderRequest::market("tok", Side::Sell, dec!(25));
        assert!(market.validate().valid);

        let empty_market = OrderRequest::market("", Side::Sell, dec!(0));
        assert_eq!(
            empty_market.validate().errors,
            vec![INVALID_TOKEN_ID, NON_POSITIVE_SIZE]
        );
    }

    #[test]
    fn test_validated_order_gate() {
        let order = ValidatedOrder::try_from(OrderRequest::limit(
            "tok",
            Side::Buy,
            dec!(10),
            dec!(0.55),
        ))
        .unwrap();
        assert_eq!(order.token_id, "tok");
        assert_eq!(order.into_inner().size, dec!(10));

        let err = ValidatedOrder::try_from(OrderRequest::limit(
            "tok",
            Side::Buy,
            dec!(-5),
            dec!(1.5),
        ))
        .unwrap_err();
        match err {
            PolymarketError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }
}
