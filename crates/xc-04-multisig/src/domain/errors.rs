//! # Domain Errors
//!
//! A rejected signature never disturbs signatures already collected in the
//! same context.

use thiserror::Error;
use xc_03_tx_builder::EngineError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    #[error("Signature from {public_key} does not verify")]
    SignatureInvalid { public_key: String },

    #[error("Public key {public_key} is not a member of contract {script_hash}")]
    KeyNotInContract {
        public_key: String,
        script_hash: String,
    },

    /// The contract's script hash is not one the transaction requires.
    #[error("Script hash {0} is not required by this transaction")]
    UnknownScriptHash(String),

    #[error("Invalid signing context: {0}")]
    InvalidContext(String),

    #[error("Relay failed: {0}")]
    Relay(#[from] EngineError),

    #[error("Signer {0} unavailable")]
    SignerUnavailable(String),
}
