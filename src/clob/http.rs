//! REST implementation of [`ClobApi`]

use super::auth::{l1_headers, ApiCredentials, L2Auth};
use super::signing::{limit_order_amounts, market_order_amounts, sign_order, OrderTerms};
use super::types::{
    AssetType, BalanceAllowance, BookResponse, CancelResponse, ClobOrderType, MarketOrderArgs,
    NegRiskResponse, OrderArgs, OrdersPage, PostOrderRequest, PostOrderResponse, PriceResponse,
    RawLevel, RawOrder, SignedOrder,
};
use super::wallet::Wallet;
use super::{ClobApi, ClobError};
use crate::execution::Side;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// First page cursor for paginated endpoints
const INITIAL_CURSOR: &str = "MA==";
/// Cursor returned after the last page
const END_CURSOR: &str = "LTE=";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// CLOB REST client bound to one wallet
pub struct HttpClob {
    client: Client,
    base_url: String,
    chain_id: u64,
    wallet: Wallet,
    l2: Option<L2Auth>,
}

impl HttpClob {
    /// Create a client without API credentials
    pub fn new(base_url: &str, chain_id: u64, wallet: Wallet) -> Result<Self, ClobError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClobError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            chain_id,
            wallet,
            l2: None,
        })
    }

    /// Attach API credentials for L2-authenticated calls
    pub fn with_credentials(mut self, credentials: ApiCredentials) -> Self {
        self.l2 = Some(L2Auth::new(credentials, self.wallet.address()));
        self
    }

    pub fn address(&self) -> &str {
        self.wallet.address()
    }

    pub fn has_credentials(&self) -> bool {
        self.l2.is_some()
    }

    /// Create API credentials, falling back to deriving the existing ones
    pub async fn create_or_derive_api_creds(&self) -> Result<ApiCredentials, ClobError> {
        let headers = l1_headers(&self.wallet, self.chain_id, 0)?;
        let created: Result<ApiCredentials, ClobError> = self
            .send(
                self.client
                    .post(self.url("/auth/api-key"))
                    .headers(headers),
            )
            .await;

        match created {
            Ok(creds) => Ok(creds),
            Err(e) => {
                tracing::debug!(error = %e, "API key creation failed, deriving existing key");
                let headers = l1_headers(&self.wallet, self.chain_id, 0)?;
                self.send(
                    self.client
                        .get(self.url("/auth/derive-api-key"))
                        .headers(headers),
                )
                .await
            }
        }
    }

    /// Whether a token settles on the neg-risk exchange
    pub async fn get_neg_risk(&self, token_id: &str) -> Result<bool, ClobError> {
        let resp: NegRiskResponse = self
            .send(
                self.client
                    .get(self.url("/neg-risk"))
                    .query(&[("token_id", token_id)]),
            )
            .await?;
        Ok(resp.neg_risk)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn l2(&self) -> Result<&L2Auth, ClobError> {
        self.l2
            .as_ref()
            .ok_or_else(|| ClobError::Auth("API credentials are not set".to_string()))
    }

    fn l2_headers(&self, method: &Method, path: &str, body: &str) -> Result<HeaderMap, ClobError> {
        self.l2()?.headers(method.as_str(), path, body)
    }

    /// Send an L2-authenticated request; the signature covers the path only
    async fn send_l2<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<String>,
    ) -> Result<T, ClobError> {
        let body = body.unwrap_or_default();
        let headers = self.l2_headers(&method, path, &body)?;

        let mut request = self
            .client
            .request(method, self.url(path))
            .headers(headers)
            .query(query);
        if !body.is_empty() {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClobError> {
        let response = request.send().await?;
        decode(response).await
    }

    async fn signing_price(&self, args: &MarketOrderArgs) -> Result<Decimal, ClobError> {
        match args.price {
            Some(price) if price > Decimal::ZERO => Ok(price),
            _ => {
                let book = self.get_order_book(&args.token_id).await?;
                let levels = match args.side {
                    Side::Buy => &book.asks,
                    Side::Sell => &book.bids,
                };
                market_price(levels, args.side, args.amount)
            }
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClobError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ClobError::Api {
            status: status.as_u16(),
            message: body,
        });
    }

    serde_json::from_str(&body).map_err(|e| ClobError::Decode(format!("{}: {}", e, body)))
}

/// Worst price needed to fill `amount` against the book
///
/// BUY walks asks from the lowest price, accumulating notional until it
/// covers the USDC amount; SELL walks bids from the highest price,
/// accumulating shares.
pub(crate) fn market_price(
    levels: &[RawLevel],
    side: Side,
    amount: Decimal,
) -> Result<Decimal, ClobError> {
    let mut sorted: Vec<&RawLevel> = levels.iter().collect();
    match side {
        Side::Buy => sorted.sort_by(|a, b| a.price.cmp(&b.price)),
        Side::Sell => sorted.sort_by(|a, b| b.price.cmp(&a.price)),
    }

    let mut filled = Decimal::ZERO;
    for level in sorted {
        filled += match side {
            Side::Buy => level.size * level.price,
            Side::Sell => level.size,
        };
        if filled >= amount {
            return Ok(level.price);
        }
    }

    Err(ClobError::InvalidOrder(format!(
        "Not enough liquidity to fill {} {}",
        amount,
        side.as_str()
    )))
}

#[async_trait]
impl ClobApi for HttpClob {
    async fn create_order(&self, args: &OrderArgs) -> Result<SignedOrder, ClobError> {
        let (maker_amount, taker_amount) = limit_order_amounts(args.side, args.price, args.size)?;
        let neg_risk = self.get_neg_risk(&args.token_id).await?;

        sign_order(
            &self.wallet,
            self.chain_id,
            &OrderTerms {
                token_id: &args.token_id,
                side: args.side,
                maker_amount,
                taker_amount,
                fee_rate_bps: args.fee_rate_bps,
                nonce: args.nonce,
                expiration: args.expiration,
                neg_risk,
            },
        )
    }

    async fn create_market_order(
        &self,
        args: &MarketOrderArgs,
    ) -> Result<SignedOrder, ClobError> {
        let price = self.signing_price(args).await?;
        let (maker_amount, taker_amount) = market_order_amounts(args.side, args.amount, price)?;
        let neg_risk = self.get_neg_risk(&args.token_id).await?;

        tracing::debug!(token_id = %args.token_id, %price, "Market order priced from book");

        sign_order(
            &self.wallet,
            self.chain_id,
            &OrderTerms {
                token_id: &args.token_id,
                side: args.side,
                maker_amount,
                taker_amount,
                fee_rate_bps: args.fee_rate_bps,
                nonce: args.nonce,
                expiration: 0,
                neg_risk,
            },
        )
    }

    async fn post_order(
        &self,
        order: &SignedOrder,
        order_type: ClobOrderType,
    ) -> Result<PostOrderResponse, ClobError> {
        let payload = PostOrderRequest {
            order,
            owner: self.l2()?.api_key(),
            order_type,
        };
        let body = serde_json::to_string(&payload)
            .map_err(|e| ClobError::Decode(format!("Cannot encode order: {}", e)))?;

        self.send_l2(Method::POST, "/order", &[], Some(body)).await
    }

    async fn cancel(&self, order_id: &str) -> Result<CancelResponse, ClobError> {
        let body = serde_json::json!({ "orderID": order_id }).to_string();
        self.send_l2(Method::DELETE, "/order", &[], Some(body)).await
    }

    async fn cancel_all(&self) -> Result<CancelResponse, ClobError> {
        self.send_l2(Method::DELETE, "/cancel-all", &[], None).await
    }

    async fn cancel_market_orders(&self, market: &str) -> Result<CancelResponse, ClobError> {
        let body = serde_json::json!({ "market": market, "asset_id": "" }).to_string();
        self.send_l2(Method::DELETE, "/cancel-market-orders", &[], Some(body))
            .await
    }

    async fn get_orders(&self, market: Option<&str>) -> Result<Vec<RawOrder>, ClobError> {
        let mut orders = Vec::new();
        let mut cursor = INITIAL_CURSOR.to_string();

        loop {
            let mut query = vec![("next_cursor", cursor.clone())];
            if let Some(market) = market {
                query.push(("market", market.to_string()));
            }

            let page: OrdersPage = self
                .send_l2(Method::GET, "/data/orders", &query, None)
                .await?;

            for item in page.data {
                match serde_json::from_value::<RawOrder>(item) {
                    Ok(order) => orders.push(order),
                    Err(e) => tracing::warn!(error = %e, "Skipping unreadable order"),
                }
            }

            match page.next_cursor {
                Some(next) if !next.is_empty() && next != END_CURSOR && next != cursor => {
                    cursor = next
                }
                _ => break,
            }
        }

        Ok(orders)
    }

    async fn get_order_book(&self, token_id: &str) -> Result<BookResponse, ClobError> {
        self.send(
            self.client
                .get(self.url("/book"))
                .query(&[("token_id", token_id)]),
        )
        .await
    }

    async fn get_price(&self, token_id: &str, side: Side) -> Result<Decimal, ClobError> {
        let resp: PriceResponse = self
            .send(
                self.client
                    .get(self.url("/price"))
                    .query(&[("token_id", token_id), ("side", side.as_str())]),
            )
            .await?;
        Ok(resp.price)
    }

    async fn get_last_trade_price(&self, token_id: &str) -> Result<Decimal, ClobError> {
        let resp: PriceResponse = self
            .send(
                self.client
                    .get(self.url("/last-trade-price"))
                    .query(&[("token_id", token_id)]),
            )
            .await?;
        Ok(resp.price)
    }

    async fn get_balance_allowance(
        &self,
        asset: AssetType,
    ) -> Result<BalanceAllowance, ClobError> {
        let mut query = vec![("signature_type", "0".to_string())];
        match asset {
            AssetType::Collateral => query.push(("asset_type", "COLLATERAL".to_string())),
            AssetType::Conditional { token_id } => {
                query.push(("asset_type", "CONDITIONAL".to_string()));
                query.push(("token_id", token_id));
            }
        }

        self.send_l2(Method::GET, "/balance-allowance", &query, None)
            .await
    }
}
