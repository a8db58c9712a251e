//! Risk management module
//!
//! Position sizing, price nudging and fee estimates

mod sizing;

pub use sizing::{adjust_price, estimate_fees, FeeEstimate, PositionSizer, DEFAULT_FEE_RATE};
