//! EIP-712 order signing for the CTF Exchange
//!
//! Orders are hashed as the exchange's `Order` struct under the
//! "Polymarket CTF Exchange" domain (the neg-risk exchange for neg-risk
//! tokens) and signed by an EOA. Amounts are raw 6-decimal integers.

use super::types::SignedOrder;
use super::wallet::Wallet;
use super::ClobError;
use crate::execution::Side;
use rand::Rng;
use rust_decimal::Decimal;
use sha3::{Digest, Keccak256};

const DOMAIN_NAME: &str = "Polymarket CTF Exchange";
const DOMAIN_VERSION: &str = "1";

/// CTF Exchange contract
pub const STANDARD_EXCHANGE: &str = "0x4bFb41d5B3570DeFd03C39a9A4D8dE6Bd8B8982E";
/// Neg-risk CTF Exchange contract
pub const NEG_RISK_EXCHANGE: &str = "0xC5d563A36AE78145C45a50134d48A1215220f80a";

pub const CLOB_AUTH_DOMAIN_NAME: &str = "ClobAuthDomain";
pub const CLOB_AUTH_MESSAGE: &str = "This message attests that I control the given wallet";

const USDC_DECIMALS: u32 = 6;
const SIGNATURE_TYPE_EOA: u8 = 0;
const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Fields of the on-chain `Order` struct
#[derive(Debug, Clone)]
struct Eip712Order {
    salt: u64,
    maker: [u8; 20],
    signer: [u8; 20],
    taker: [u8; 20],
    token_id: String,
    maker_amount: u64,
    taker_amount: u64,
    expiration: u64,
    nonce: u64,
    fee_rate_bps: u16,
    side: u8,
    signature_type: u8,
}

/// Inputs for [`sign_order`]
#[derive(Debug, Clone)]
pub struct OrderTerms<'a> {
    pub token_id: &'a str,
    pub side: Side,
    pub maker_amount: u64,
    pub taker_amount: u64,
    pub fee_rate_bps: u16,
    pub nonce: u64,
    /// Unix seconds, 0 for no expiry
    pub expiration: u64,
    pub neg_risk: bool,
}

fn side_code(side: Side) -> u8 {
    match side {
        Side::Buy => 0,
        Side::Sell => 1,
    }
}

pub(crate) fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(data));
    out
}

fn domain_type_hash() -> [u8; 32] {
    keccak256(b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)")
}

fn order_type_hash() -> [u8; 32] {
    keccak256(
        b"Order(uint256 salt,address maker,address signer,address taker,\
          uint256 tokenId,uint256 makerAmount,uint256 takerAmount,\
          uint256 expiration,uint256 nonce,uint256 feeRateBps,\
          uint8 side,uint8 signatureType)",
    )
}

fn clob_auth_type_hash() -> [u8; 32] {
    keccak256(b"ClobAuth(address address,string timestamp,uint256 nonce,string message)")
}

/// Exchange contract that settles a token
pub fn exchange_address(neg_risk: bool) -> &'static str {
    if neg_risk {
        NEG_RISK_EXCHANGE
    } else {
        STANDARD_EXCHANGE
    }
}

pub(crate) fn order_domain_separator(chain_id: u64, neg_risk: bool) -> Result<[u8; 32], ClobError> {
    let contract = parse_address(exchange_address(neg_risk))?;

    let mut encoded = Vec::with_capacity(5 * 32);
    encoded.extend_from_slice(&domain_type_hash());
    encoded.extend_from_slice(&keccak256(DOMAIN_NAME.as_bytes()));
    encoded.extend_from_slice(&keccak256(DOMAIN_VERSION.as_bytes()));
    encoded.extend_from_slice(&encode_u64(chain_id));
    encoded.extend_from_slice(&encode_address(&contract));
    Ok(keccak256(&encoded))
}

pub(crate) fn clob_auth_domain_separator(chain_id: u64) -> [u8; 32] {
    let mut encoded = Vec::with_capacity(4 * 32);
    encoded.extend_from_slice(&keccak256(
        b"EIP712Domain(string name,string version,uint256 chainId)",
    ));
    encoded.extend_from_slice(&keccak256(CLOB_AUTH_DOMAIN_NAME.as_bytes()));
    encoded.extend_from_slice(&keccak256(DOMAIN_VERSION.as_bytes()));
    encoded.extend_from_slice(&encode_u64(chain_id));
    keccak256(&encoded)
}

pub(crate) fn clob_auth_struct_hash(
    address: &str,
    timestamp: &str,
    nonce: u64,
) -> Result<[u8; 32], ClobError> {
    let addr = parse_address(address)?;

    let mut encoded = Vec::with_capacity(5 * 32);
    encoded.extend_from_slice(&clob_auth_type_hash());
    encoded.extend_from_slice(&encode_address(&addr));
    encoded.extend_from_slice(&keccak256(timestamp.as_bytes()));
    encoded.extend_from_slice(&encode_u64(nonce));
    encoded.extend_from_slice(&keccak256(CLOB_AUTH_MESSAGE.as_bytes()));
    Ok(keccak256(&encoded))
}

fn order_struct_hash(order: &Eip712Order) -> [u8; 32] {
    let mut encoded = Vec::with_capacity(13 * 32);
    encoded.extend_from_slice(&order_type_hash());
    encoded.extend_from_slice(&encode_u64(order.salt));
    encoded.extend_from_slice(&encode_address(&order.maker));
    encoded.extend_from_slice(&encode_address(&order.signer));
    encoded.extend_from_slice(&encode_address(&order.taker));
    encoded.extend_from_slice(&token_id_to_u256(&order.token_id));
    encoded.extend_from_slice(&encode_u64(order.maker_amount));
    encoded.extend_from_slice(&encode_u64(order.taker_amount));
    encoded.extend_from_slice(&encode_u64(order.expiration));
    encoded.extend_from_slice(&encode_u64(order.nonce));
    encoded.extend_from_slice(&encode_u64(order.fee_rate_bps as u64));
    encoded.extend_from_slice(&encode_u64(order.side as u64));
    encoded.extend_from_slice(&encode_u64(order.signature_type as u64));
    keccak256(&encoded)
}

/// `keccak256(0x19 0x01 || domainSeparator || structHash)`
pub(crate) fn typed_data_hash(domain_separator: &[u8; 32], struct_hash: &[u8; 32]) -> [u8; 32] {
    let mut data = Vec::with_capacity(66);
    data.extend_from_slice(&[0x19, 0x01]);
    data.extend_from_slice(domain_separator);
    data.extend_from_slice(struct_hash);
    keccak256(&data)
}

/// Build and sign an order for the wallet's own address
pub fn sign_order(
    wallet: &Wallet,
    chain_id: u64,
    terms: &OrderTerms<'_>,
) -> Result<SignedOrder, ClobError> {
    sign_order_with_salt(wallet, chain_id, terms, generate_salt())
}

pub(crate) fn sign_order_with_salt(
    wallet: &Wallet,
    chain_id: u64,
    terms: &OrderTerms<'_>,
    salt: u64,
) -> Result<SignedOrder, ClobError> {
    let maker = parse_address(wallet.address())?;
    let order = Eip712Order {
        salt,
        maker,
        signer: maker,
        taker: [0u8; 20],
        token_id: terms.token_id.to_string(),
        maker_amount: terms.maker_amount,
        taker_amount: terms.taker_amount,
        expiration: terms.expiration,
        nonce: terms.nonce,
        fee_rate_bps: terms.fee_rate_bps,
        side: side_code(terms.side),
        signature_type: SIGNATURE_TYPE_EOA,
    };

    let domain = order_domain_separator(chain_id, terms.neg_risk)?;
    let digest = typed_data_hash(&domain, &order_struct_hash(&order));
    let signature = wallet.sign_hash(&digest)?;

    Ok(SignedOrder {
        salt: order.salt,
        maker: wallet.address().to_string(),
        signer: wallet.address().to_string(),
        taker: ZERO_ADDRESS.to_string(),
        token_id: order.token_id,
        maker_amount: order.maker_amount.to_string(),
        taker_amount: order.taker_amount.to_string(),
        expiration: order.expiration.to_string(),
        nonce: order.nonce.to_string(),
        fee_rate_bps: order.fee_rate_bps.to_string(),
        side: terms.side,
        signature_type: order.signature_type,
        signature,
    })
}

/// Raw amounts for a limit order
///
/// Price is rounded to the 0.01 tick and size floored to 2dp. BUY pays
/// USDC (maker) for shares (taker); SELL gives shares for USDC.
pub fn limit_order_amounts(
    side: Side,
    price: Decimal,
    size: Decimal,
) -> Result<(u64, u64), ClobError> {
    let price = tick_price(price)?;
    let shares = round_down(size, 2);
    if shares <= Decimal::ZERO {
        return Err(ClobError::InvalidOrder(format!(
            "Size rounds to zero: {}",
            size
        )));
    }

    let notional = shares.checked_mul(price).ok_or_else(|| out_of_range(size))?;
    match side {
        Side::Buy => Ok((to_raw(notional)?, to_raw(shares)?)),
        Side::Sell => Ok((to_raw(shares)?, to_raw(notional)?)),
    }
}

/// Raw amounts for a market order
///
/// For BUY `amount` is USDC to spend; for SELL it is shares to sell.
pub fn market_order_amounts(
    side: Side,
    amount: Decimal,
    price: Decimal,
) -> Result<(u64, u64), ClobError> {
    let price = tick_price(price)?;
    let maker = round_down(amount, 2);
    if maker <= Decimal::ZERO {
        return Err(ClobError::InvalidOrder(format!(
            "Amount rounds to zero: {}",
            amount
        )));
    }

    let taker = match side {
        Side::Buy => maker.checked_div(price),
        Side::Sell => maker.checked_mul(price),
    }
    .map(|t| round_down(t, 4))
    .ok_or_else(|| out_of_range(amount))?;
    Ok((to_raw(maker)?, to_raw(taker)?))
}

/// Round to the 0.01 tick; the result must stay strictly inside (0, 1)
fn tick_price(price: Decimal) -> Result<Decimal, ClobError> {
    let rounded = price.round_dp(2);
    if rounded <= Decimal::ZERO || rounded >= Decimal::ONE {
        return Err(ClobError::InvalidOrder(format!(
            "Price must be in (0, 1) at a 0.01 tick, got {}",
            price
        )));
    }
    Ok(rounded)
}

fn out_of_range(value: Decimal) -> ClobError {
    ClobError::InvalidOrder(format!("Amount out of range: {}", value))
}

fn round_down(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::ToZero)
}

fn to_raw(value: Decimal) -> Result<u64, ClobError> {
    let scaled = value
        .checked_mul(Decimal::from(10u64.pow(USDC_DECIMALS)))
        .ok_or_else(|| out_of_range(value))?
        .floor();
    u64::try_from(scaled).map_err(|_| out_of_range(value))
}

fn generate_salt() -> u64 {
    let now = chrono::Utc::now().timestamp().max(0) as u64;
    let random: f64 = rand::thread_rng().gen();
    ((now as f64) * random) as u64
}

/// Decode a `0x`-prefixed 20-byte address
pub fn parse_address(addr: &str) -> Result<[u8; 20], ClobError> {
    let hex_str = addr.strip_prefix("0x").unwrap_or(addr);
    let bytes = hex::decode(hex_str)
        .map_err(|e| ClobError::Signing(format!("Invalid address {}: {}", addr, e)))?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| {
            ClobError::Signing(format!("Address must be 20 bytes, got {}", b.len()))
        })
}

fn encode_address(addr: &[u8; 20]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[12..].copy_from_slice(addr);
    out
}

fn encode_u64(value: u64) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[24..].copy_from_slice(&value.to_be_bytes());
    out
}

/// Big-endian uint256 encoding of a decimal token id
///
/// Token ids exceed u128, so the base-10 string is converted by repeated
/// division by 256.
fn token_id_to_u256(token_id: &str) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut digits: Vec<u8> = token_id
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|b| b - b'0')
        .collect();

    let mut le_bytes = Vec::with_capacity(32);
    while digits.iter().any(|&d| d != 0) {
        let mut remainder = 0u16;
        let mut quotient = Vec::with_capacity(digits.len());
        for &digit in &digits {
            let current = remainder * 10 + digit as u16;
            let q = (current / 256) as u8;
            remainder = current % 256;
            if !quotient.is_empty() || q > 0 {
                quotient.push(q);
            }
        }
        le_bytes.push(remainder as u8);
        digits = quotient;
    }

    for (i, byte) in le_bytes.iter().take(32).enumerate() {
        result[31 - i] = *byte;
    }
    result
}
