//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("byte count underflow: {minuend} - {subtrahend}")]
    ByteCountUnderflow { minuend: u64, subtrahend: u64 },

    #[error("winston underflow: {minuend} - {subtrahend}")]
    WinstonUnderflow { minuend: String, subtrahend: String },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid fee multiple: {0}")]
    InvalidFeeMultiple(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid entity id: {0}")]
    InvalidEntityId(String),

    #[error("invalid tag: {0}")]
    InvalidTag(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
