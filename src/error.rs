//! Error taxonomy for the client

use thiserror::Error;

/// Errors surfaced by the client and its components
#[derive(Debug, Error)]
pub enum PolymarketError {
    /// Invalid credentials or settings, raised before any client is usable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connectivity failure to the chain RPC endpoint or CLOB
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success response (or unreadable body) from a REST endpoint
    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    /// Order parameters failed validation; execution was never attempted
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Live order execution or cancellation failed
    #[error("Order error: {0}")]
    Order(String),
}

impl PolymarketError {
    /// Build an API error carrying an HTTP status code
    pub fn api_status(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Build an API error with no status (transport or decode failure)
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            status: None,
        }
    }

    /// HTTP status code, when this is an API error that carries one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, PolymarketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_carries_status() {
        let err = PolymarketError::api_status(503, "Gamma API returned 503");
        assert_eq!(err.status_code(), Some(503));
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_validation_error_lists_every_message() {
        let err = PolymarketError::Validation(vec![
            "Size must be positive".to_string(),
            "Price must be between 0 and 1".to_string(),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("Size must be positive"));
        assert!(msg.contains("Price must be between 0 and 1"));
        assert_eq!(err.status_code(), None);
    }
}
