//! # Node Lifecycle
//!
//! ## Run sequence
//!
//! 1. Open (and clear) the live store at `<data-root>/<default account>`
//! 2. Spawn one `WalletSigner` per validator wallet
//! 3. Serve the RPC gateway on the node's RPC port
//! 4. Wait for the shutdown signal, stop the gateway
//! 5. Revoke the gateway's store handle, waiting for in-flight handlers
//! 6. Close the store, also when the gateway failed

use crate::config::NodeConfig;
use anyhow::{anyhow, bail, Context, Result};
use shared_types::{ChainDescriptor, ConsensusNodeDescriptor, ScriptHash, WalletAccount};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use xc_01_kv_store::{RocksDbConfig, RocksDbStore, Store};
use xc_02_checkpoint::CheckpointManager;
use xc_03_tx_builder::{LedgerEngine, TransactionBuilder};
use xc_04_multisig::{MultiSigCoordinator, SignerEndpoint, WalletSigner};
use xc_05_rpc_gateway::{ExpressRpc, GatewayConfig, GatewayService, NodeIdentity, StoreHandle};

const SIGNER_QUEUE_CAPACITY: usize = 32;

/// Data directory of the node whose default account is `account`.
pub fn node_data_dir(config: &NodeConfig, account: &ScriptHash) -> PathBuf {
    config.data_root.join(account.to_string())
}

fn checkpoint_account(chain: &ChainDescriptor) -> Result<ScriptHash> {
    chain
        .default_signer()
        .ok_or_else(|| anyhow!("chain has no validator with a default account"))
}

fn require_single_node(chain: &ChainDescriptor, action: &str) -> Result<()> {
    if chain.consensus_nodes.len() != 1 {
        bail!(
            "{} is only supported on single node networks ({} validators)",
            action,
            chain.consensus_nodes.len()
        );
    }
    Ok(())
}

/// Validate `archive` against `chain` and move it into node 0's data
/// directory. An existing directory is only replaced with `force`.
pub fn restore_checkpoint(
    config: &NodeConfig,
    chain: &ChainDescriptor,
    archive: &Path,
    force: bool,
) -> Result<PathBuf> {
    require_single_node(chain, "checkpoint restore")?;
    let account = checkpoint_account(chain)?;
    let manager = CheckpointManager::new(config.checkpoint.clone());

    let validated = manager
        .validate(archive, chain.magic, &account)
        .with_context(|| format!("cannot restore {}", archive.display()))?;
    let target = node_data_dir(config, &account);
    manager
        .restore(&validated, &target, force)
        .with_context(|| format!("cannot restore into {}", target.display()))?;
    Ok(target)
}

pub struct NodeRuntime {
    config: NodeConfig,
    chain: ChainDescriptor,
    index: usize,
    rpc_port: u16,
    engine: Arc<dyn LedgerEngine>,
}

impl NodeRuntime {
    pub fn new(
        config: NodeConfig,
        chain: ChainDescriptor,
        index: usize,
        engine: Arc<dyn LedgerEngine>,
    ) -> Result<Self> {
        config.validate().context("invalid node configuration")?;
        let rpc_port = chain
            .consensus_nodes
            .get(index)
            .map(|node| node.rpc_port)
            .ok_or_else(|| {
                anyhow!(
                    "node index {} out of range for a {} node network",
                    index,
                    chain.consensus_nodes.len()
                )
            })?;
        Ok(Self {
            config,
            chain,
            index,
            rpc_port,
            engine,
        })
    }

    /// Serve on `port` instead of the descriptor's RPC port.
    pub fn with_rpc_port(mut self, port: u16) -> Self {
        self.rpc_port = port;
        self
    }

    fn node(&self) -> &ConsensusNodeDescriptor {
        &self.chain.consensus_nodes[self.index]
    }

    fn default_account(&self) -> Result<ScriptHash> {
        self.node()
            .wallet
            .default_account()
            .map(WalletAccount::script_hash)
            .ok_or_else(|| anyhow!("wallet {} has no default account", self.node().wallet.name))
    }

    pub fn node_dir(&self) -> Result<PathBuf> {
        Ok(node_data_dir(&self.config, &self.default_account()?))
    }

    /// Run the live node until `shutdown` flips to `true` or its sender
    /// is dropped.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<()> {
        let dir = self.node_dir()?;
        let store = Arc::new(
            RocksDbStore::open(RocksDbConfig::at(&dir))
                .with_context(|| format!("cannot open store at {}", dir.display()))?,
        );
        info!(
            node = %self.node().wallet.name,
            path = %dir.display(),
            seconds_per_block = self.config.seconds_per_block,
            "Node starting"
        );

        let handle = StoreHandle::new(store.clone() as Arc<dyn Store>);
        let served = self.serve(handle.clone(), shutdown).await;

        release_store(handle).await?;
        match Arc::try_unwrap(store) {
            Ok(store) => store.close(),
            Err(_) => bail!("store at {} still referenced after shutdown", dir.display()),
        }
        if let Err(e) = &served {
            warn!(error = %e, "Node stopped with error");
        } else {
            info!(node = %self.node().wallet.name, "Node stopped");
        }
        served
    }

    /// Serve a checkpoint archive read-only. Writes land in an in-memory
    /// overlay and the extraction is deleted on return.
    pub async fn run_from_checkpoint(
        &self,
        archive: &Path,
        shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        require_single_node(&self.chain, "running a checkpoint")?;
        let account = checkpoint_account(&self.chain)?;
        let magic = self.chain.magic;
        let manager = CheckpointManager::new(self.config.checkpoint.clone());
        let path = archive.to_path_buf();

        let extracted =
            tokio::task::spawn_blocking(move || manager.open_read_only(&path, magic, &account))
                .await
                .context("checkpoint extraction task failed")?
                .with_context(|| format!("cannot open checkpoint {}", archive.display()))?;
        info!(checkpoint = %archive.display(), "Node starting from checkpoint");

        let handle = StoreHandle::new(Arc::new(extracted));
        let served = self.serve(handle.clone(), shutdown).await;
        release_store(handle).await?;
        served
    }

    fn coordinator(&self) -> Arc<MultiSigCoordinator> {
        let local: Arc<dyn SignerEndpoint> = Arc::new(WalletSigner::spawn(
            self.node().wallet.clone(),
            SIGNER_QUEUE_CAPACITY,
        ));
        let validators = self
            .chain
            .consensus_nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                if index == self.index {
                    Arc::clone(&local)
                } else {
                    Arc::new(WalletSigner::spawn(node.wallet.clone(), SIGNER_QUEUE_CAPACITY))
                        as Arc<dyn SignerEndpoint>
                }
            })
            .collect();
        Arc::new(MultiSigCoordinator::new(
            self.config.coordinator.clone(),
            Arc::clone(&self.engine),
            local,
            validators,
        ))
    }

    async fn serve(&self, store: StoreHandle, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let identity = NodeIdentity {
            magic: self.chain.magic,
            validator_count: self.chain.consensus_nodes.len(),
            default_account: checkpoint_account(&self.chain)?,
        };
        let rpc = ExpressRpc::new(
            identity,
            store,
            CheckpointManager::new(self.config.checkpoint.clone()),
            Arc::clone(&self.engine),
            TransactionBuilder::new(self.config.fees.clone()),
            self.coordinator(),
        );
        let gateway = GatewayService::new(
            GatewayConfig {
                port: self.rpc_port,
                ..self.config.gateway.clone()
            },
            Arc::new(rpc),
        )?;
        let listener = gateway.bind().await?;

        let signal = async move {
            loop {
                let stop = *shutdown.borrow();
                if stop || shutdown.changed().await.is_err() {
                    break;
                }
            }
        };
        gateway.serve(listener, signal).await?;
        Ok(())
    }
}

/// Take the store back from the gateway once in-flight handlers finish.
async fn release_store(handle: StoreHandle) -> Result<()> {
    tokio::task::spawn_blocking(move || drop(handle.revoke()))
        .await
        .context("store release task failed")
}
