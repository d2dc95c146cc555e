//! # Error Types
//!
//! Decoding and model errors shared by every crate that parses identifiers,
//! scripts, transactions or chain files.

use thiserror::Error;

/// Errors raised while parsing or decoding shared types.
#[derive(Debug, Error)]
pub enum TypeError {
    /// Hex string could not be decoded.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Address string is not valid base58check or has the wrong version.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Fixed-size value had the wrong length.
    #[error("Invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Binary payload ended early or carried an invalid field.
    #[error("Invalid format: {0}")]
    Format(String),

    /// Key material failed validation.
    #[error("Crypto error: {0}")]
    Crypto(#[from] shared_crypto::CryptoError),

    /// Derived node port does not fit in 16 bits.
    #[error("Port out of range for base {base}, node index {index}")]
    PortOutOfRange { base: u16, index: u16 },

    /// Chain file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Chain file JSON was malformed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
