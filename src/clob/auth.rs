//! CLOB request authentication
//!
//! L1: an EIP-712 `ClobAuth` signature from the wallet, used only to create
//! or derive API credentials.
//! L2: HMAC-SHA256 over `timestamp + method + path + body` keyed by the API
//! secret, used for every trading endpoint.

use super::signing::{clob_auth_domain_separator, clob_auth_struct_hash, typed_data_hash};
use super::wallet::Wallet;
use super::ClobError;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const POLY_ADDRESS: &str = "POLY_ADDRESS";
pub const POLY_SIGNATURE: &str = "POLY_SIGNATURE";
pub const POLY_TIMESTAMP: &str = "POLY_TIMESTAMP";
pub const POLY_NONCE: &str = "POLY_NONCE";
pub const POLY_API_KEY: &str = "POLY_API_KEY";
pub const POLY_PASSPHRASE: &str = "POLY_PASSPHRASE";

/// API key triple issued by the CLOB
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCredentials {
    pub api_key: String,
    pub secret: String,
    pub passphrase: String,
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &self.api_key)
            .field("secret", &"[REDACTED]")
            .field("passphrase", &"[REDACTED]")
            .finish()
    }
}

/// L1 headers for a given nonce, signed now
pub fn l1_headers(wallet: &Wallet, chain_id: u64, nonce: u64) -> Result<HeaderMap, ClobError> {
    let timestamp = Utc::now().timestamp().to_string();
    let signature = sign_clob_auth(wallet, chain_id, &timestamp, nonce)?;

    header_map(&[
        (POLY_ADDRESS, wallet.address()),
        (POLY_SIGNATURE, &signature),
        (POLY_TIMESTAMP, &timestamp),
        (POLY_NONCE, &nonce.to_string()),
    ])
}

/// EIP-712 `ClobAuth` signature
pub fn sign_clob_auth(
    wallet: &Wallet,
    chain_id: u64,
    timestamp: &str,
    nonce: u64,
) -> Result<String, ClobError> {
    let domain = clob_auth_domain_separator(chain_id);
    let struct_hash = clob_auth_struct_hash(wallet.address(), timestamp, nonce)?;
    wallet.sign_hash(&typed_data_hash(&domain, &struct_hash))
}

/// L2 signer bound to one set of API credentials
#[derive(Debug, Clone)]
pub struct L2Auth {
    credentials: ApiCredentials,
    address: String,
}

impl L2Auth {
    pub fn new(credentials: ApiCredentials, address: impl Into<String>) -> Self {
        Self {
            credentials,
            address: address.into(),
        }
    }

    /// API key, also used as the order `owner`
    pub fn api_key(&self) -> &str {
        &self.credentials.api_key
    }

    /// L2 headers for a request signed now
    pub fn headers(&self, method: &str, path: &str, body: &str) -> Result<HeaderMap, ClobError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.signature(&timestamp, method, path, body)?;

        header_map(&[
            (POLY_ADDRESS, &self.address),
            (POLY_SIGNATURE, &signature),
            (POLY_TIMESTAMP, &timestamp),
            (POLY_API_KEY, &self.credentials.api_key),
            (POLY_PASSPHRASE, &self.credentials.passphrase),
        ])
    }

    /// URL-safe base64 HMAC-SHA256 of `timestamp + method + path + body`
    pub fn signature(
        &self,
        timestamp: &str,
        method: &str,
        path: &str,
        body: &str,
    ) -> Result<String, ClobError> {
        let secret = URL_SAFE
            .decode(&self.credentials.secret)
            .or_else(|_| STANDARD.decode(&self.credentials.secret))
            .map_err(|e| ClobError::Auth(format!("API secret is not base64: {}", e)))?;

        let mut mac = HmacSha256::new_from_slice(&secret)
            .map_err(|e| ClobError::Auth(format!("Invalid HMAC key: {}", e)))?;
        mac.update(timestamp.as_bytes());
        mac.update(method.as_bytes());
        mac.update(path.as_bytes());
        mac.update(body.as_bytes());

        Ok(URL_SAFE.encode(mac.finalize().into_bytes()))
    }
}

fn header_map(pairs: &[(&'static str, &str)]) -> Result<HeaderMap, ClobError> {
    let mut headers = HeaderMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        let value = HeaderValue::from_str(value)
            .map_err(|e| ClobError::Auth(format!("Invalid {} header: {}", name, e)))?;
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ClobError::Auth(format!("Invalid header name {}: {}", name, e)))?;
        headers.insert(name, value);
    }
    Ok(headers)
}
