//! Market data commands

use crate::client::PolymarketClient;
use crate::execution::Side;
use crate::market::{MarketQuery, MarketRecord};
use clap::Args;

#[derive(Args, Debug)]
pub struct MarketsArgs {
    /// Number of markets to list
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,

    /// Include closed markets
    #[arg(long)]
    pub all: bool,

    /// Gamma category filter
    #[arg(long)]
    pub category: Option<String>,

    /// Bypass the listing cache
    #[arg(long)]
    pub no_cache: bool,
}

impl MarketsArgs {
    pub async fn execute(&self, client: &mut PolymarketClient) -> anyhow::Result<()> {
        let mut query = MarketQuery::new(!self.all, self.limit);
        query.category = self.category.clone();

        let markets = client.get_markets(&query, !self.no_cache).await?;
        println!("{} markets", markets.len());
        for market in &markets {
            print_market_line(market);
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Text to look for in question or description
    pub query: String,

    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,
}

impl SearchArgs {
    pub async fn execute(&self, client: &mut PolymarketClient) -> anyhow::Result<()> {
        let markets = client.search_markets(&self.query, self.limit).await?;
        println!("{} markets matching {:?}", markets.len(), self.query);
        for market in &markets {
            print_market_line(market);
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct MarketArgs {
    /// Gamma market id
    pub id: String,
}

impl MarketArgs {
    pub async fn execute(&self, client: &PolymarketClient) -> anyhow::Result<()> {
        match client.get_market_by_id(&self.id).await {
            Some(market) => print_market_detail(&market),
            None => println!("Market {} not found", self.id),
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct BookArgs {
    pub token_id: String,

    /// Levels to show per side
    #[arg(short, long, default_value_t = 5)]
    pub depth: usize,
}

impl BookArgs {
    pub async fn execute(&self, client: &PolymarketClient) -> anyhow::Result<()> {
        let book = client.get_orderbook(&self.token_id).await?;

        println!("Order book for {} at {}", book.token_id, book.timestamp);
        println!("  {:>10} {:>12}   {:>10} {:>12}", "bid", "size", "ask", "size");
        for i in 0..self.depth {
            let bid = book.bids.get(i);
            let ask = book.asks.get(i);
            if bid.is_none() && ask.is_none() {
                break;
            }
            println!(
                "  {:>10} {:>12}   {:>10} {:>12}",
                bid.map(|l| l.price.to_string()).unwrap_or_default(),
                bid.map(|l| l.size.to_string()).unwrap_or_default(),
                ask.map(|l| l.price.to_string()).unwrap_or_default(),
                ask.map(|l| l.size.to_string()).unwrap_or_default(),
            );
        }
        match (book.mid_price(), book.spread()) {
            (Some(mid), Some(spread)) => println!("  mid {} spread {}", mid, spread),
            _ => println!("  one-sided book"),
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct PriceArgs {
    pub token_id: String,

    /// BUY or SELL
    #[arg(short, long, default_value = "BUY")]
    pub side: String,
}

impl PriceArgs {
    pub async fn execute(&self, client: &PolymarketClient) -> anyhow::Result<()> {
        let side: Side = self.side.parse().map_err(anyhow::Error::msg)?;
        let price = client.get_price(&self.token_id, side).await;
        let mid = client.get_mid_price(&self.token_id).await;
        println!("{} {} price {} (mid {})", self.token_id, side, price, mid);
        Ok(())
    }
}

pub(crate) fn print_market_line(market: &MarketRecord) {
    let prices: Vec<String> = market
        .outcomes
        .iter()
        .map(|o| format!("{} {}", o.outcome, o.price))
        .collect();
    println!(
        "  [{}] {} | {} | vol {} | {}",
        market.id,
        market.question,
        market.category,
        market.volume.round_dp(0),
        prices.join(" / ")
    );
}

fn print_market_detail(market: &MarketRecord) {
    println!("{}", market.question);
    println!("  id:          {}", market.id);
    println!("  status:      {}", market.status);
    println!("  category:    {}", market.category);
    println!("  ends:        {}", market.end_date);
    println!("  volume:      {}", market.volume);
    println!("  liquidity:   {}", market.liquidity);
    if let Some(condition_id) = &market.condition_id {
        println!("  condition:   {}", condition_id);
    }
    println!("  neg risk:    {}", market.neg_risk);
    for outcome in &market.outcomes {
        println!("  {:<12} {} ({})", outcome.outcome, outcome.price, outcome.token_id);
    }
}
