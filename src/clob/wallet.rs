//! Wallet key handling
//!
//! The private key lives in a `SecretString` and is never printed; the
//! public address is derived once with secp256k1 + keccak256 and rendered
//! with the EIP-55 checksum.

use super::ClobError;
use k256::ecdsa::SigningKey;
use secrecy::{ExposeSecret, SecretString};
use sha3::{Digest, Keccak256};

const PRIVATE_KEY_HEX_LEN: usize = 64;

/// Signing wallet for CLOB authentication and orders
pub struct Wallet {
    private_key: SecretString,
    address: String,
}

impl Wallet {
    /// Build a wallet from a hex private key (`0x` prefix optional)
    pub fn from_private_key(private_key: &str) -> Result<Self, ClobError> {
        let key_hex = private_key.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        if key_hex.len() != PRIVATE_KEY_HEX_LEN {
            return Err(ClobError::Wallet(format!(
                "Expected {} hex characters, got {}",
                PRIVATE_KEY_HEX_LEN,
                key_hex.len()
            )));
        }

        let signing_key = signing_key(key_hex)?;
        let address = derive_address(&signing_key);

        Ok(Self {
            private_key: SecretString::from(key_hex.to_string()),
            address,
        })
    }

    /// EIP-55 checksummed address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Sign a 32-byte prehash, returning `0x{r}{s}{v}` with `v` in {27, 28}
    pub fn sign_hash(&self, hash: &[u8; 32]) -> Result<String, ClobError> {
        let key = signing_key(self.private_key.expose_secret())?;

        let (signature, recovery_id) = key
            .sign_prehash_recoverable(hash)
            .map_err(|e| ClobError::Signing(format!("ECDSA sign failed: {}", e)))?;

        let mut sig_bytes = Vec::with_capacity(65);
        sig_bytes.extend_from_slice(&signature.r().to_bytes());
        sig_bytes.extend_from_slice(&signature.s().to_bytes());
        sig_bytes.push(recovery_id.to_byte() + 27);

        Ok(format!("0x{}", hex::encode(sig_bytes)))
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

fn signing_key(key_hex: &str) -> Result<SigningKey, ClobError> {
    let key_bytes = hex::decode(key_hex)
        .map_err(|e| ClobError::Wallet(format!("Invalid hex encoding: {}", e)))?;

    SigningKey::from_slice(&key_bytes)
        .map_err(|e| ClobError::Wallet(format!("Invalid secp256k1 key: {}", e)))
}

fn derive_address(key: &SigningKey) -> String {
    // Uncompressed point: 0x04 || x || y
    let point = key.verifying_key().to_encoded_point(false);
    let hash = Keccak256::digest(&point.as_bytes()[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..32]);
    eip55_checksum(&address)
}

/// EIP-55 mixed-case checksum encoding
pub fn eip55_checksum(address: &[u8; 20]) -> String {
    let lower = hex::encode(address);
    let hash = Keccak256::digest(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}
