//! # Wallet Signer Actor
//!
//! Owns one validator wallet on its own task. Requests arrive over an mpsc
//! channel and are answered on a oneshot, so private keys never leave the
//! task that holds them.
//!
//! ```text
//! coordinator ──SignerCommand──► [mpsc] ──► WalletSigner task (Wallet)
//!      ▲                                           │
//!      └──────────── oneshot reply ◄───────────────┘
//! ```

use crate::domain::errors::SigningError;
use crate::ports::outbound::{AccountInfo, SignRequest, SignatureShare, SignerEndpoint};
use async_trait::async_trait;
use shared_types::{ScriptHash, Wallet};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

enum SignerCommand {
    Describe {
        script_hash: ScriptHash,
        reply: oneshot::Sender<Option<AccountInfo>>,
    },
    Sign {
        request: SignRequest,
        reply: oneshot::Sender<Vec<SignatureShare>>,
    },
}

/// Handle to a running wallet signer task.
#[derive(Clone)]
pub struct WalletSigner {
    name: String,
    commands: mpsc::Sender<SignerCommand>,
}

impl WalletSigner {
    /// Spawn the signer task on the current runtime.
    pub fn spawn(wallet: Wallet, capacity: usize) -> Self {
        let name = wallet.name.clone();
        let (commands, rx) = mpsc::channel(capacity.max(1));
        tokio::spawn(run(wallet, rx));
        info!(signer = %name, "[xc-04] Wallet signer started");
        Self { name, commands }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SignerCommand,
    ) -> Result<T, SigningError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| SigningError::SignerUnavailable(self.name.clone()))?;
        rx.await
            .map_err(|_| SigningError::SignerUnavailable(self.name.clone()))
    }
}

async fn run(wallet: Wallet, mut rx: mpsc::Receiver<SignerCommand>) {
    while let Some(command) = rx.recv().await {
        match command {
            SignerCommand::Describe { script_hash, reply } => {
                let info = wallet.account(&script_hash).map(|account| AccountInfo {
                    label: account.label.clone(),
                    contract: account.contract.to_contract(),
                    has_key: account.private_key.is_some(),
                });
                let _ = reply.send(info);
            }
            SignerCommand::Sign { request, reply } => {
                let shares = sign_with(&wallet, &request);
                debug!(
                    signer = %wallet.name,
                    script_hash = %request.script_hash,
                    shares = shares.len(),
                    "[xc-04] Sign request handled"
                );
                let _ = reply.send(shares);
            }
        }
    }
    debug!(signer = %wallet.name, "[xc-04] Wallet signer stopped");
}

fn sign_with(wallet: &Wallet, request: &SignRequest) -> Vec<SignatureShare> {
    let Some(account) = wallet.account(&request.script_hash) else {
        return Vec::new();
    };
    match wallet.sign(&request.script_hash, &request.hash_data) {
        Some((public_key, signature)) => vec![SignatureShare {
            contract: account.contract.to_contract(),
            public_key,
            signature,
        }],
        None => Vec::new(),
    }
}

#[async_trait]
impl SignerEndpoint for WalletSigner {
    fn name(&self) -> &str {
        &self.name
    }

    async fn describe(&self, script_hash: ScriptHash) -> Result<Option<AccountInfo>, SigningError> {
        self.request(|reply| SignerCommand::Describe { script_hash, reply })
            .await
    }

    async fn sign(&self, request: SignRequest) -> Result<Vec<SignatureShare>, SigningError> {
        self.request(|reply| SignerCommand::Sign { request, reply })
            .await
    }
}
