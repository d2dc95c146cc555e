//! # Outbound Ports (Signers)
//!
//! A signer is any party holding wallet keys. The coordinator only talks to
//! signers through messages, so an in-process wallet and a remote validator
//! look the same from here.

use crate::domain::errors::SigningError;
use async_trait::async_trait;
use shared_crypto::{PublicKey, Signature};
use shared_types::{Contract, ScriptHash};

/// Ask a signer to sign `hash_data` for the account `script_hash`.
#[derive(Clone, Debug)]
pub struct SignRequest {
    pub script_hash: ScriptHash,
    pub hash_data: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct SignatureShare {
    pub contract: Contract,
    pub public_key: PublicKey,
    pub signature: Signature,
}

/// What a signer knows about one of its accounts.
#[derive(Clone, Debug)]
pub struct AccountInfo {
    pub label: Option<String>,
    pub contract: Contract,
    pub has_key: bool,
}

#[async_trait]
pub trait SignerEndpoint: Send + Sync {
    fn name(&self) -> &str;

    /// `None` when the signer does not hold the account.
    async fn describe(&self, script_hash: ScriptHash) -> Result<Option<AccountInfo>, SigningError>;

    /// Zero or more shares; an empty reply means "no matching key".
    async fn sign(&self, request: SignRequest) -> Result<Vec<SignatureShare>, SigningError>;
}
