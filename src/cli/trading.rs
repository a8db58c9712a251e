//! Order and portfolio commands

use crate::client::PolymarketClient;
use crate::execution::{Execution, OrderType, Side};
use crate::risk::{estimate_fees, PositionSizer};
use clap::Args;
use rust_decimal::Decimal;

#[derive(Args, Debug)]
pub struct OrderArgs {
    pub token_id: String,

    /// BUY or SELL
    pub side: String,

    /// Shares for limit orders; USDC (BUY) or shares (SELL) for market orders
    pub size: Decimal,

    /// Limit price; a market order is placed when absent
    #[arg(short, long)]
    pub price: Option<Decimal>,

    /// GTC, FOK, LIMIT or MARKET (limit orders only)
    #[arg(long, default_value = "GTC")]
    pub order_type: String,
}

impl OrderArgs {
    pub async fn execute(&self, client: &PolymarketClient) -> anyhow::Result<()> {
        let side: Side = self.side.parse().map_err(anyhow::Error::msg)?;

        let execution = match self.price {
            Some(price) => {
                let order_type: OrderType = self.order_type.parse().unwrap_or_default();
                let fees = estimate_fees(self.size, price);
                println!(
                    "Limit {} {} @ {} (notional {}, est. fee {})",
                    side, self.size, price, fees.notional, fees.estimated_fee
                );
                client
                    .create_limit_order(&self.token_id, side, self.size, price, order_type)
                    .await?
            }
            None => {
                println!("Market {} for {}", side, self.size);
                client
                    .create_market_order(&self.token_id, side, self.size)
                    .await?
            }
        };

        print_execution(&execution);
        Ok(())
    }
}

pub(crate) fn print_execution(execution: &Execution) {
    let response = execution.response();
    println!(
        "  {} order {} ({} {})",
        response.status,
        response.order_id.as_deref().unwrap_or("-"),
        response.order_type.as_str(),
        response.clob_status.as_deref().unwrap_or("")
    );
    if let Some(error) = &response.error_msg {
        println!("  error: {}", error);
    }
}

#[derive(Args, Debug)]
pub struct CancelArgs {
    /// Order to cancel
    #[arg(required_unless_present = "all")]
    pub order_id: Option<String>,

    /// Cancel every open order
    #[arg(long, conflicts_with = "order_id")]
    pub all: bool,

    /// With --all, only orders in this market (condition id)
    #[arg(long, requires = "all")]
    pub market: Option<String>,
}

impl CancelArgs {
    pub async fn execute(&self, client: &PolymarketClient) -> anyhow::Result<()> {
        let success = match &self.order_id {
            Some(order_id) if !self.all => client.cancel_order(order_id).await?,
            _ => client.cancel_all_orders(self.market.as_deref()).await?,
        };
        println!("Cancel {}", if success { "succeeded" } else { "failed" });
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct OrdersArgs {
    /// Only orders in this market (condition id)
    #[arg(long)]
    pub market: Option<String>,
}

impl OrdersArgs {
    pub async fn execute(&self, client: &PolymarketClient) -> anyhow::Result<()> {
        let orders = client.get_orders(self.market.as_deref()).await;
        println!("{} orders", orders.len());
        for order in &orders {
            println!(
                "  {} {} {} {}/{} @ {} [{}]",
                order.id,
                order.side,
                order.token_id,
                order.filled_size,
                order.size,
                order.price,
                order.status
            );
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct BalanceArgs {
    /// Also show the balance of this outcome token
    #[arg(long)]
    pub token: Option<String>,
}

impl BalanceArgs {
    pub async fn execute(&self, client: &PolymarketClient) -> anyhow::Result<()> {
        let balance = client.get_balance_info().await;
        println!("Wallet {}", client.wallet_address());
        println!("  USDC:      {}", balance.usdc_balance);
        println!("  available: {}", balance.available_balance);
        println!("  equity:    {}", balance.total_equity());

        if let Some(token) = &self.token {
            let shares = client.get_token_balance(token).await;
            println!("  token {}: {}", token, shares);
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct SizeArgs {
    /// Available balance in USDC
    pub balance: Decimal,

    /// Entry price
    pub price: Decimal,

    /// Fraction of the balance to risk
    #[arg(long, default_value = "0.1")]
    pub risk: Decimal,
}

impl SizeArgs {
    /// Pure calculation; does not connect
    pub fn execute(&self) -> anyhow::Result<()> {
        let size = PositionSizer::default().calculate(self.balance, self.price, self.risk);
        let fees = estimate_fees(size, self.price);
        println!(
            "Position size {} shares (notional {}, est. fee {})",
            size.round_dp(2),
            fees.notional.round_dp(2),
            fees.estimated_fee.round_dp(4)
        );
        Ok(())
    }
}
