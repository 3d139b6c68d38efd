use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Failures raised by a brokerage backend call.
///
/// The broker client retries every variant the same way; the distinction
/// only matters for logging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrokerError {
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("attempt timed out after {millis} ms")]
    Timeout { millis: u64 },

    #[error("transport failure: {0}")]
    Transport(String),
}

/// Credential encryption errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("encryption key must be {expected} bytes, got {actual}")]
    KeyLength { expected: usize, actual: usize },

    #[error("credential envelope is invalid: {0}")]
    Envelope(String),

    #[error("failed to encrypt credential")]
    Encrypt,

    #[error("failed to decrypt credential")]
    Decrypt,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_messages() {
        let err = ConfigError::MissingField {
            field: "TELEGRAM_TOKEN",
        };
        assert_eq!(err.to_string(), "missing required field: TELEGRAM_TOKEN");

        let err = ConfigError::InvalidValue {
            field: "ENCRYPTION_KEY",
            reason: "must be 32 bytes".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for ENCRYPTION_KEY: must be 32 bytes"
        );
    }

    #[test]
    fn broker_error_is_transparent_in_crate_error() {
        let err: Error = BrokerError::Transport("reset by peer".to_string()).into();
        assert_eq!(err.to_string(), "transport failure: reset by peer");
        assert!(matches!(err, Error::Broker(BrokerError::Transport(_))));
    }

    #[test]
    fn timeout_reports_millis() {
        let err = BrokerError::Timeout { millis: 1500 };
        assert_eq!(err.to_string(), "attempt timed out after 1500 ms");
    }

    #[test]
    fn crypto_key_length_message() {
        let err = CryptoError::KeyLength {
            expected: 32,
            actual: 7,
        };
        assert_eq!(err.to_string(), "encryption key must be 32 bytes, got 7");
    }
}
