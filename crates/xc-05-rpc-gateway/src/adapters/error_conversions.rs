//! Error conversions from the subsystem error types.

use crate::domain::error::ApiError;
use xc_01_kv_store::StoreError;
use xc_02_checkpoint::CheckpointError;
use xc_03_tx_builder::BuildError;
use xc_04_multisig::SigningError;

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        ApiError::internal(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::server_error(e.to_string())
    }
}

impl From<CheckpointError> for ApiError {
    fn from(e: CheckpointError) -> Self {
        match e {
            CheckpointError::CheckpointExists(_) => ApiError::action_not_allowed(e.to_string()),
            CheckpointError::InvalidCheckpoint(_) => ApiError::invalid_params(e.to_string()),
            other => ApiError::server_error(other.to_string()),
        }
    }
}

impl From<BuildError> for ApiError {
    fn from(e: BuildError) -> Self {
        match e {
            BuildError::InvalidArgument(msg) => ApiError::invalid_params(msg),
            BuildError::InsufficientFunds { .. } => ApiError::transaction_rejected(e.to_string()),
            BuildError::ExecutionFault { ref script } => {
                let script = script.clone();
                ApiError::execution_error(e.to_string(), Some(script))
            }
            BuildError::InvalidOperation(msg) => ApiError::action_not_allowed(msg),
            BuildError::Engine(inner) => ApiError::server_error(inner.to_string()),
        }
    }
}

impl From<SigningError> for ApiError {
    fn from(e: SigningError) -> Self {
        match e {
            SigningError::SignatureInvalid { .. }
            | SigningError::KeyNotInContract { .. }
            | SigningError::UnknownScriptHash(_)
            | SigningError::InvalidContext(_) => ApiError::invalid_params(e.to_string()),
            SigningError::Relay(_) => ApiError::transaction_rejected(e.to_string()),
            SigningError::SignerUnavailable(_) => ApiError::resource_unavailable(e.to_string()),
        }
    }
}
