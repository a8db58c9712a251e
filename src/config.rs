//! Configuration for poly-trade
//!
//! Settings are read from the environment (after loading `.env`) or from a
//! TOML file into an unvalidated [`ClientSettings`]. [`ClientSettings::validate`]
//! is the only way to obtain a [`ClientConfig`], which is immutable and is
//! passed explicitly to every component.

use crate::clob::ApiCredentials;
use crate::error::{PolymarketError, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CLOB_URL: &str = "https://clob.polymarket.com";
pub const DEFAULT_GAMMA_URL: &str = "https://gamma-api.polymarket.com";
pub const DEFAULT_POLYGON_RPC: &str = "https://polygon-rpc.com";
pub const DEFAULT_DB_PATH: &str = "data/polymarket.db";

/// Polygon mainnet
pub const POLYGON_CHAIN_ID: u64 = 137;
/// Polygon Amoy testnet
pub const AMOY_CHAIN_ID: u64 = 80002;

const SUPPORTED_CHAIN_IDS: [u64; 2] = [POLYGON_CHAIN_ID, AMOY_CHAIN_ID];
const LOG_LEVELS: [&str; 5] = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];

/// `0x` plus 64 hex characters
const PRIVATE_KEY_LEN: usize = 66;

/// Execution mode: simulate orders or send them to the CLOB
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    DryRun,
    Live,
}

impl ExecutionMode {
    pub fn is_dry_run(self) -> bool {
        self == Self::DryRun
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Emit JSON log lines instead of the human-readable format
    #[serde(default)]
    pub json_logs: bool,
    /// Serve Prometheus metrics on this port when set
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

/// Raw, unvalidated settings
#[derive(Clone, Deserialize)]
pub struct ClientSettings {
    /// Wallet private key (hex, `0x` prefix optional)
    #[serde(default)]
    pub private_key: Option<String>,

    #[serde(default = "default_clob_url")]
    pub clob_url: String,

    #[serde(default = "default_gamma_url")]
    pub gamma_url: String,

    #[serde(default = "default_polygon_rpc")]
    pub polygon_rpc: String,

    /// 137 (Polygon) or 80002 (Amoy)
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// CLOB API credentials; derived from the wallet when any is missing
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
    #[serde(default)]
    pub api_passphrase: Option<String>,

    #[serde(default = "default_true")]
    pub dry_run: bool,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_true")]
    pub enable_cache: bool,

    /// Default cache TTL (seconds)
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    #[serde(default)]
    pub enable_storage: bool,

    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

fn default_clob_url() -> String {
    DEFAULT_CLOB_URL.to_string()
}
fn default_gamma_url() -> String {
    DEFAULT_GAMMA_URL.to_string()
}
fn default_polygon_rpc() -> String {
    DEFAULT_POLYGON_RPC.to_string()
}
fn default_chain_id() -> u64 {
    POLYGON_CHAIN_ID
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "INFO".to_string()
}
fn default_cache_ttl() -> u64 {
    300
}
fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            private_key: None,
            clob_url: default_clob_url(),
            gamma_url: default_gamma_url(),
            polygon_rpc: default_polygon_rpc(),
            chain_id: POLYGON_CHAIN_ID,
            api_key: None,
            api_secret: None,
            api_passphrase: None,
            dry_run: true,
            log_level: default_log_level(),
            enable_cache: true,
            cache_ttl_secs: default_cache_ttl(),
            enable_storage: false,
            db_path: default_db_path(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl std::fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSettings")
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("clob_url", &self.clob_url)
            .field("gamma_url", &self.gamma_url)
            .field("polygon_rpc", &self.polygon_rpc)
            .field("chain_id", &self.chain_id)
            .field("api_key", &self.api_key)
            .field("dry_run", &self.dry_run)
            .field("log_level", &self.log_level)
            .field("enable_cache", &self.enable_cache)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("enable_storage", &self.enable_storage)
            .field("db_path", &self.db_path)
            .field("telemetry", &self.telemetry)
            .finish_non_exhaustive()
    }
}

impl ClientSettings {
    /// Load settings from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PolymarketError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PolymarketError::Config(e.to_string()))
    }

    /// Read settings from the process environment, loading `.env` first
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let chain_id = match get("CHAIN_ID") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| PolymarketError::Config(format!("CHAIN_ID is not a number: {raw}")))?,
            None => defaults.chain_id,
        };
        let cache_ttl_secs = match get("CACHE_TTL") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| PolymarketError::Config(format!("CACHE_TTL is not a number: {raw}")))?,
            None => defaults.cache_ttl_secs,
        };
        let metrics_port = match get("METRICS_PORT") {
            Some(raw) => Some(raw.trim().parse().map_err(|_| {
                PolymarketError::Config(format!("METRICS_PORT is not a port: {raw}"))
            })?),
            None => None,
        };

        Ok(Self {
            private_key: get("PK"),
            clob_url: get("CLOB_URL").unwrap_or(defaults.clob_url),
            gamma_url: get("GAMMA_URL").unwrap_or(defaults.gamma_url),
            polygon_rpc: get("POLYGON_RPC").unwrap_or(defaults.polygon_rpc),
            chain_id,
            api_key: get("CLOB_API_KEY"),
            api_secret: get("CLOB_SECRET"),
            api_passphrase: get("CLOB_PASS_PHRASE"),
            dry_run: get("DRY_RUN").map_or(defaults.dry_run, |v| parse_flag(&v)),
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level),
            enable_cache: get("ENABLE_CACHE").map_or(defaults.enable_cache, |v| parse_flag(&v)),
            cache_ttl_secs,
            enable_storage: get("ENABLE_STORAGE")
                .map_or(defaults.enable_storage, |v| parse_flag(&v)),
            db_path: get("DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path),
            telemetry: TelemetryConfig {
                json_logs: get("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
                metrics_port,
            },
        })
    }

    /// Check every setting and freeze the result
    pub fn validate(self) -> Result<ClientConfig> {
        let raw_key = self
            .private_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                PolymarketError::Config("PK (wallet private key) is required".to_string())
            })?;

        let private_key = if raw_key.starts_with("0x") {
            raw_key.to_string()
        } else {
            format!("0x{raw_key}")
        };
        if private_key.len() != PRIVATE_KEY_LEN {
            return Err(PolymarketError::Config(format!(
                "Private key must be {} characters including 0x, got {}",
                PRIVATE_KEY_LEN,
                private_key.len()
            )));
        }
        if !private_key[2..].chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(PolymarketError::Config(
                "Private key contains non-hexadecimal characters".to_string(),
            ));
        }

        if !SUPPORTED_CHAIN_IDS.contains(&self.chain_id) {
            return Err(PolymarketError::Config(format!(
                "Unsupported chain id {} (expected {} or {})",
                self.chain_id, POLYGON_CHAIN_ID, AMOY_CHAIN_ID
            )));
        }

        let log_level = self.log_level.trim().to_uppercase();
        if !LOG_LEVELS.contains(&log_level.as_str()) {
            return Err(PolymarketError::Config(format!(
                "Invalid log level {:?}, expected one of {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        let clob_url = normalize_url("CLOB_URL", &self.clob_url)?;
        let gamma_url = normalize_url("GAMMA_URL", &self.gamma_url)?;
        let polygon_rpc = normalize_url("POLYGON_RPC", &self.polygon_rpc)?;

        let api_credentials = match (self.api_key, self.api_secret, self.api_passphrase) {
            (Some(api_key), Some(secret), Some(passphrase)) => Some(ApiCredentials {
                api_key,
                secret,
                passphrase,
            }),
            _ => None,
        };

        Ok(ClientConfig {
            private_key: SecretString::from(private_key),
            clob_url,
            gamma_url,
            polygon_rpc,
            chain_id: self.chain_id,
            api_credentials,
            mode: if self.dry_run {
                ExecutionMode::DryRun
            } else {
                ExecutionMode::Live
            },
            log_level,
            enable_cache: self.enable_cache,
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            enable_storage: self.enable_storage,
            db_path: self.db_path,
            telemetry: self.telemetry,
        })
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

fn normalize_url(name: &str, raw: &str) -> Result<String> {
    let url = raw.trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(PolymarketError::Config(format!(
            "{name} must be an http(s) URL, got {raw:?}"
        )));
    }
    Ok(url.to_string())
}

/// Validated, immutable client configuration
pub struct ClientConfig {
    private_key: SecretString,
    clob_url: String,
    gamma_url: String,
    polygon_rpc: String,
    chain_id: u64,
    api_credentials: Option<ApiCredentials>,
    mode: ExecutionMode,
    log_level: String,
    enable_cache: bool,
    cache_ttl: Duration,
    enable_storage: bool,
    db_path: PathBuf,
    telemetry: TelemetryConfig,
}

impl ClientConfig {
    /// Settings from the environment, validated
    pub fn from_env() -> Result<Self> {
        ClientSettings::from_env()?.validate()
    }

    /// Settings from a TOML file, validated
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        ClientSettings::load(path)?.validate()
    }

    /// `0x`-prefixed private key
    pub(crate) fn private_key(&self) -> &str {
        self.private_key.expose_secret()
    }

    pub fn clob_url(&self) -> &str {
        &self.clob_url
    }

    pub fn gamma_url(&self) -> &str {
        &self.gamma_url
    }

    pub fn polygon_rpc(&self) -> &str {
        &self.polygon_rpc
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Configured API credentials, if all three parts were given
    pub fn api_credentials(&self) -> Option<&ApiCredentials> {
        self.api_credentials.as_ref()
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn dry_run(&self) -> bool {
        self.mode.is_dry_run()
    }

    /// Normalized level name (DEBUG, INFO, WARNING, ERROR or CRITICAL)
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Level name understood by `tracing_subscriber::EnvFilter`
    pub fn tracing_level(&self) -> &'static str {
        match self.log_level.as_str() {
            "DEBUG" => "debug",
            "WARNING" => "warn",
            "ERROR" | "CRITICAL" => "error",
            _ => "info",
        }
    }

    pub fn enable_cache(&self) -> bool {
        self.enable_cache
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    pub fn enable_storage(&self) -> bool {
        self.enable_storage
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn telemetry(&self) -> &TelemetryConfig {
        &self.telemetry
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("private_key", &"[REDACTED]")
            .field("clob_url", &self.clob_url)
            .field("gamma_url", &self.gamma_url)
            .field("polygon_rpc", &self.polygon_rpc)
            .field("chain_id", &self.chain_id)
            .field("api_credentials", &self.api_credentials)
            .field("mode", &self.mode)
            .field("log_level", &self.log_level)
            .field("enable_cache", &self.enable_cache)
            .field("cache_ttl", &self.cache_ttl)
            .field("enable_storage", &self.enable_storage)
            .field("db_path", &self.db_path)
            .finish()
    }
}
