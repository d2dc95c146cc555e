//! # Express Methods
//!
//! | Method | Params | Result |
//! |--------|--------|--------|
//! | `express-create-checkpoint` | `[filename]` | archive path |
//! | `express-show-coins` | `[address]` | `{"NEO": "<amount>", "GAS": "<amount>"}` |
//! | `express-submit-signatures` | `[context, [signature...]]` | `{"txid"}` or pending context |
//! | `express-transfer` | `[asset, quantity, sender, receiver, witness-script-hex]` | `{"txid"}` or pending context |
//!
//! A pending context is returned as `contract-context`, `script-hashes`
//! (addresses still needing signatures) and `hash-data` (hex bytes to sign).

use crate::adapters::store_handle::StoreHandle;
use crate::domain::error::{ApiError, ApiResult};
use serde::Deserialize;
use serde_json::{json, Value};
use shared_crypto::{PublicKey, Signature};
use shared_types::{Contract, ContractParameterType, ScriptHash};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};
use xc_01_kv_store::StoreKind;
use xc_02_checkpoint::CheckpointManager;
use xc_03_tx_builder::{resolve_asset, LedgerEngine, TransactionBuilder, TransferRequest, GAS, NEO};
use xc_04_multisig::{MultiSigCoordinator, SignatureSubmission, SigningContext, SigningOutcome};

/// Network facts the gateway needs about the node it serves.
#[derive(Debug, Clone)]
pub struct NodeIdentity {
    pub magic: u32,
    pub validator_count: usize,
    /// Default account of this node's wallet; recorded in checkpoints.
    pub default_account: ScriptHash,
}

/// One entry of the `express-submit-signatures` signature array.
#[derive(Debug, Deserialize)]
pub struct SignatureItem {
    pub signature: String,
    #[serde(rename = "public-key")]
    pub public_key: String,
    pub contract: ContractItem,
}

#[derive(Debug, Deserialize)]
pub struct ContractItem {
    pub script: String,
    pub parameters: Vec<ContractParameterType>,
}

impl SignatureItem {
    fn into_submission(self) -> ApiResult<SignatureSubmission> {
        let signature = Signature::from_slice(&hex::decode(&self.signature)?)
            .map_err(|e| ApiError::invalid_params(format!("signature: {}", e)))?;
        let public_key = PublicKey::from_slice(&hex::decode(&self.public_key)?)
            .map_err(|e| ApiError::invalid_params(format!("public-key: {}", e)))?;
        let contract = Contract::new(hex::decode(&self.contract.script)?, self.contract.parameters);
        Ok(SignatureSubmission {
            contract,
            public_key,
            signature,
        })
    }
}

fn parse_account(text: &str) -> ApiResult<ScriptHash> {
    ScriptHash::parse(text).map_err(|e| ApiError::invalid_params(format!("{:?}: {}", text, e)))
}

/// Result shape shared by transfer and submit-signatures.
pub fn outcome_response(outcome: SigningOutcome) -> Value {
    match outcome {
        SigningOutcome::Relayed { txid } => json!({ "txid": txid.to_string() }),
        SigningOutcome::Pending(ctx) => json!({
            "contract-context": ctx.to_json(),
            "script-hashes": ctx
                .missing_script_hashes()
                .iter()
                .map(ScriptHash::to_address)
                .collect::<Vec<_>>(),
            "hash-data": hex::encode(ctx.hash_data()),
        }),
    }
}

pub struct ExpressRpc {
    identity: NodeIdentity,
    store: StoreHandle,
    checkpoints: CheckpointManager,
    engine: Arc<dyn LedgerEngine>,
    builder: TransactionBuilder,
    coordinator: Arc<MultiSigCoordinator>,
}

impl ExpressRpc {
    pub fn new(
        identity: NodeIdentity,
        store: StoreHandle,
        checkpoints: CheckpointManager,
        engine: Arc<dyn LedgerEngine>,
        builder: TransactionBuilder,
        coordinator: Arc<MultiSigCoordinator>,
    ) -> Self {
        Self {
            identity,
            store,
            checkpoints,
            engine,
            builder,
            coordinator,
        }
    }

    pub fn identity(&self) -> &NodeIdentity {
        &self.identity
    }

    #[instrument(skip(self))]
    pub async fn create_checkpoint(&self, filename: String) -> ApiResult<Value> {
        if self.identity.validator_count > 1 {
            return Err(ApiError::action_not_allowed(
                "checkpoint create is only supported on single node networks",
            ));
        }
        match self.store.kind() {
            Some(StoreKind::Live) => {}
            Some(_) => {
                return Err(ApiError::action_not_allowed(
                    "checkpoint create requires a live store",
                ))
            }
            None => return Err(ApiError::resource_unavailable("node store is closed")),
        }

        let store = self.store.clone();
        let manager = self.checkpoints.clone();
        let destination = PathBuf::from(&filename);
        let magic = self.identity.magic;
        let account = self.identity.default_account;
        tokio::task::spawn_blocking(move || {
            match store.with_store(|live| manager.create(live, &destination, magic, &account)) {
                Some(created) => created.map_err(ApiError::from),
                None => Err(ApiError::resource_unavailable("node store is closed")),
            }
        })
        .await
        .map_err(|e| ApiError::internal(e.to_string()))??;

        info!(filename = %filename, "[xc-05] Checkpoint created over RPC");
        Ok(Value::String(filename))
    }

    #[instrument(skip(self))]
    pub fn show_coins(&self, address: String) -> ApiResult<Value> {
        let account = parse_account(&address)?;
        let snapshot = self.engine.snapshot();
        let neo = self.builder.balance_of(snapshot.as_ref(), &NEO.hash(), &account)?;
        let gas = self.builder.balance_of(snapshot.as_ref(), &GAS.hash(), &account)?;
        Ok(json!({
            "NEO": neo.to_string(),
            "GAS": gas.to_string(),
        }))
    }

    #[instrument(skip(self, context, signatures))]
    pub fn submit_signatures(
        &self,
        context: Value,
        signatures: Vec<SignatureItem>,
    ) -> ApiResult<Value> {
        let context = SigningContext::from_json(&context)?;
        let submissions = signatures
            .into_iter()
            .map(SignatureItem::into_submission)
            .collect::<ApiResult<Vec<_>>>()?;
        let outcome = self.coordinator.submit(context, submissions)?;
        Ok(outcome_response(outcome))
    }

    #[instrument(skip(self, witness_script))]
    pub async fn transfer(
        &self,
        asset: String,
        quantity: String,
        sender: String,
        receiver: String,
        witness_script: Option<String>,
    ) -> ApiResult<Value> {
        let asset = resolve_asset(&asset)?;
        let sender = parse_account(&sender)?;
        let receiver = parse_account(&receiver)?;
        let witness_script = match witness_script {
            Some(hex_script) => Some(hex::decode(hex_script)?),
            None => None,
        };

        let tx = {
            let snapshot = self.engine.snapshot();
            let quantity =
                self.builder
                    .resolve_quantity(snapshot.as_ref(), &asset, &quantity, &sender)?;
            self.builder.build(
                snapshot.as_ref(),
                &TransferRequest {
                    asset,
                    quantity,
                    sender,
                    receiver,
                    witness_script,
                },
            )?
        };

        let outcome = self.coordinator.sign_transfer(tx).await?;
        Ok(outcome_response(outcome))
    }
}
