//! # Multi-Signature Coordinator
//!
//! Collects witnesses for built transfers and relays them once every
//! required script hash is satisfied.
//!
//! ## Signing routes
//!
//! | Sender account | Route |
//! |----------------|-------|
//! | labeled with the genesis label | fan-out to every validator signer |
//! | held by the local signer with a key | local signature only |
//! | anything else | no signatures; context returned to the caller |

use crate::domain::config::CoordinatorConfig;
use crate::domain::context::{ContextState, SigningContext};
use crate::domain::errors::SigningError;
use crate::domain::registry::{ContextRegistry, SharedContext};
use crate::ports::outbound::{SignRequest, SignatureShare, SignerEndpoint};
use shared_crypto::{PublicKey, Signature};
use shared_types::{Contract, Hash256, Transaction};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use xc_03_tx_builder::LedgerEngine;

/// Result of a signing round.
#[derive(Clone, Debug)]
pub enum SigningOutcome {
    Relayed { txid: Hash256 },
    /// Still short of signatures; route this context to more signers.
    Pending(SigningContext),
}

/// One externally produced signature.
#[derive(Clone, Debug)]
pub struct SignatureSubmission {
    pub contract: Contract,
    pub public_key: PublicKey,
    pub signature: Signature,
}

pub struct MultiSigCoordinator {
    config: CoordinatorConfig,
    engine: Arc<dyn LedgerEngine>,
    local: Arc<dyn SignerEndpoint>,
    validators: Vec<Arc<dyn SignerEndpoint>>,
    registry: ContextRegistry,
}

impl MultiSigCoordinator {
    /// `validators` is every validator signer reachable for genesis
    /// fan-out; it may include `local`.
    pub fn new(
        config: CoordinatorConfig,
        engine: Arc<dyn LedgerEngine>,
        local: Arc<dyn SignerEndpoint>,
        validators: Vec<Arc<dyn SignerEndpoint>>,
    ) -> Self {
        let registry = ContextRegistry::new(config.context_ttl);
        Self {
            config,
            engine,
            local,
            validators,
            registry,
        }
    }

    pub fn registry(&self) -> &ContextRegistry {
        &self.registry
    }

    /// Register an unsigned context without asking any signer.
    pub fn open(&self, tx: Transaction) -> SigningContext {
        self.registry.remove_expired();
        let (shared, _) = self.registry.get_or_insert(SigningContext::new(tx));
        let ctx = shared.lock().clone();
        ctx
    }

    /// Sign a freshly built transaction with whatever keys this node can
    /// reach, relaying it if that is enough.
    pub async fn sign_transfer(&self, tx: Transaction) -> Result<SigningOutcome, SigningError> {
        self.registry.remove_expired();
        let ctx = SigningContext::new(tx);
        let mut shares = Vec::new();

        for script_hash in ctx.script_hashes() {
            let request = SignRequest {
                script_hash: *script_hash,
                hash_data: ctx.hash_data().to_vec(),
            };
            let targets = match self.local.describe(*script_hash).await? {
                Some(info) if info.label.as_deref() == Some(self.config.genesis_label.as_str()) => {
                    info!(
                        script_hash = %script_hash,
                        signers = self.validators.len(),
                        "[xc-04] Fanning out genesis signing request"
                    );
                    if self.validators.is_empty() {
                        vec![self.local.clone()]
                    } else {
                        self.validators.clone()
                    }
                }
                Some(info) if info.has_key => vec![self.local.clone()],
                _ => {
                    debug!(script_hash = %script_hash, "[xc-04] No local key for account");
                    Vec::new()
                }
            };
            shares.extend(self.collect(targets, request).await);
        }

        let (shared, _) = self.registry.get_or_insert(ctx);
        {
            let mut ctx = shared.lock();
            for share in shares {
                if ctx.is_completed() {
                    break;
                }
                if let Err(e) = ctx.add_signature(&share.contract, share.public_key, share.signature) {
                    warn!(error = %e, "[xc-04] Discarding signer share");
                }
            }
        }
        self.finish(&shared)
    }

    /// Merge a caller-held context and new signatures into the registered
    /// context for the same transaction.
    pub fn submit(
        &self,
        context: SigningContext,
        submissions: Vec<SignatureSubmission>,
    ) -> Result<SigningOutcome, SigningError> {
        self.registry.remove_expired();
        let (shared, existed) = self.registry.get_or_insert(context.clone());
        {
            let mut ctx = shared.lock();
            if existed {
                ctx.merge(&context)?;
            }
            for submission in submissions {
                if ctx.is_completed() {
                    break;
                }
                ctx.add_signature(
                    &submission.contract,
                    submission.public_key,
                    submission.signature,
                )?;
            }
        }
        self.finish(&shared)
    }

    async fn collect(
        &self,
        targets: Vec<Arc<dyn SignerEndpoint>>,
        request: SignRequest,
    ) -> Vec<SignatureShare> {
        let mut tasks = JoinSet::new();
        for signer in targets {
            let request = request.clone();
            let timeout = self.config.signer_timeout;
            tasks.spawn(async move {
                let name = signer.name().to_string();
                (name, tokio::time::timeout(timeout, signer.sign(request)).await)
            });
        }

        let mut shares = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(Ok(mut reply)))) => shares.append(&mut reply),
                Ok((name, Ok(Err(e)))) => warn!(signer = %name, error = %e, "[xc-04] Signer failed"),
                Ok((name, Err(_))) => warn!(signer = %name, "[xc-04] Signer timed out"),
                Err(e) => warn!(error = %e, "[xc-04] Signer task aborted"),
            }
        }
        shares
    }

    /// Relay a completed context exactly once; report pending ones as-is.
    fn finish(&self, shared: &SharedContext) -> Result<SigningOutcome, SigningError> {
        let mut ctx = shared.lock();
        let state = ctx.state().clone();
        match state {
            ContextState::Relayed => Ok(SigningOutcome::Relayed { txid: ctx.hash() }),
            ContextState::Completed => {
                let tx = ctx.signed_transaction()?;
                let txid = tx.hash();
                match self.engine.relay(&tx) {
                    Ok(()) => {
                        ctx.mark_relayed()?;
                        info!(txid = %txid, "[xc-04] Transaction relayed");
                        Ok(SigningOutcome::Relayed { txid })
                    }
                    Err(e) => {
                        warn!(txid = %txid, error = %e, "[xc-04] Relay rejected");
                        ctx.fail(e.to_string());
                        drop(ctx);
                        self.registry.remove(&txid);
                        Err(SigningError::Relay(e))
                    }
                }
            }
            ContextState::Error(reason) => Err(SigningError::InvalidContext(reason)),
            ContextState::Unsigned | ContextState::PartiallySigned => {
                Ok(SigningOutcome::Pending(ctx.clone()))
            }
        }
    }
}
