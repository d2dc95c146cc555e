//! # Domain Errors
//!
//! Failures while resolving transfer arguments or building a transaction.
//! None of them leave anything broadcast.

use crate::ports::outbound::EngineError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Malformed asset, amount or account argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Insufficient {asset}: need {needed}, have {available}")]
    InsufficientFunds {
        asset: String,
        needed: String,
        available: String,
    },

    /// Simulation of the transfer script faulted.
    #[error("Execution fault for script {script}")]
    ExecutionFault { script: String },

    /// Verification would require a witness other than the sender's.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}
