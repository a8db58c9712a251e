//! Guided walk through the client
//!
//! Every step prints a summary; a failing step is reported and the walk
//! carries on.

use super::maintenance::print_health;
use super::markets::print_market_line;
use super::trading::print_execution;
use crate::client::PolymarketClient;
use crate::execution::{OrderType, Side};
use crate::market::MarketQuery;
use crate::risk::adjust_price;
use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Markets to list
    #[arg(short, long, default_value_t = 5)]
    pub limit: usize,

    /// Search term
    #[arg(long, default_value = "bitcoin")]
    pub search: String,
}

impl DemoArgs {
    pub async fn execute(&self, client: &mut PolymarketClient) -> anyhow::Result<()> {
        println!("== Health");
        print_health(&client.health_check().await);

        println!("\n== Top {} active markets", self.limit);
        let markets = match client.get_markets(&MarketQuery::new(true, self.limit), true).await {
            Ok(markets) => markets,
            Err(e) => {
                println!("  failed: {}", e);
                Vec::new()
            }
        };
        for market in &markets {
            print_market_line(market);
        }

        println!("\n== Search {:?}", self.search);
        match client.search_markets(&self.search, self.limit).await {
            Ok(found) => {
                println!("  {} matches", found.len());
                for market in &found {
                    print_market_line(market);
                }
            }
            Err(e) => println!("  failed: {}", e),
        }

        let token = markets
            .iter()
            .flat_map(|m| m.outcomes.iter())
            .map(|o| o.token_id.clone())
            .next();

        match token {
            Some(token_id) => self.token_walk(client, &token_id).await,
            None => println!("\n== No tradeable token found, skipping book and order steps"),
        }

        println!("\n== Balance");
        let balance = client.get_balance_info().await;
        println!("  USDC {} (available {})", balance.usdc_balance, balance.available_balance);

        println!("\n== Open orders");
        println!("  {}", client.get_orders(None).await.len());

        Ok(())
    }

    async fn token_walk(&self, client: &PolymarketClient, token_id: &str) {
        println!("\n== Order book {}", token_id);
        match client.get_orderbook(token_id).await {
            Ok(book) => println!(
                "  {} bids, {} asks, best {:?} / {:?}",
                book.bids.len(),
                book.asks.len(),
                book.best_bid(),
                book.best_ask()
            ),
            Err(e) => println!("  failed: {}", e),
        }

        let mid = client.get_mid_price(token_id).await;
        println!("  mid price {}", mid);

        let price = if mid > Decimal::ZERO {
            adjust_price(mid, dec!(-0.01))
        } else {
            dec!(0.5)
        };
        let size = client.calculate_position_size(dec!(100), price, dec!(0.1));

        println!("\n== Limit BUY {} @ {}", size.round_dp(2), price);
        match client
            .create_limit_order(token_id, Side::Buy, size.round_dp(2), price, OrderType::Gtc)
            .await
        {
            Ok(execution) => print_execution(&execution),
            Err(e) => println!("  failed: {}", e),
        }
    }
}
