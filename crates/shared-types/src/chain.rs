//! # Chain Descriptor
//!
//! The identity of one disposable network: its magic, its validators (in
//! port-derivation order) and any auxiliary wallets. Persisted as pretty
//! JSON next to the node data directories.

use crate::errors::TypeError;
use crate::hashes::ScriptHash;
use crate::wallet::{Wallet, WalletAccount, GENESIS_ACCOUNT_LABEL};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const DEFAULT_PORT_BASE: u16 = 49000;
pub const TCP_PORT_SUFFIX: u16 = 333;
pub const WEB_SOCKET_PORT_SUFFIX: u16 = 334;
pub const RPC_PORT_SUFFIX: u16 = 332;
pub const DEFAULT_RPC_PORT: u16 = DEFAULT_PORT_BASE + RPC_PORT_SUFFIX;

/// `base + index * 1000 + suffix`, or `None` past `u16::MAX`.
pub fn port_number(base: u16, index: u16, suffix: u16) -> Option<u16> {
    index
        .checked_mul(1000)
        .and_then(|offset| base.checked_add(offset))
        .and_then(|port| port.checked_add(suffix))
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsensusNodeDescriptor {
    pub wallet: Wallet,
    pub tcp_port: u16,
    pub ws_port: u16,
    pub rpc_port: u16,
}

impl ConsensusNodeDescriptor {
    pub fn new(wallet: Wallet, base: u16, index: u16) -> Result<Self, TypeError> {
        let port = |suffix| {
            port_number(base, index, suffix).ok_or(TypeError::PortOutOfRange { base, index })
        };
        Ok(Self {
            wallet,
            tcp_port: port(TCP_PORT_SUFFIX)?,
            ws_port: port(WEB_SOCKET_PORT_SUFFIX)?,
            rpc_port: port(RPC_PORT_SUFFIX)?,
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChainDescriptor {
    pub magic: u32,
    pub consensus_nodes: Vec<ConsensusNodeDescriptor>,
    #[serde(default)]
    pub wallets: Vec<Wallet>,
}

impl ChainDescriptor {
    pub fn load(path: &Path) -> Result<Self, TypeError> {
        let text = std::fs::read_to_string(path)?;
        let chain: Self = serde_json::from_str(&text)?;
        debug!(path = %path.display(), magic = chain.magic, "Loaded chain descriptor");
        Ok(chain)
    }

    pub fn save(&self, path: &Path) -> Result<(), TypeError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        debug!(path = %path.display(), magic = self.magic, "Saved chain descriptor");
        Ok(())
    }

    /// Script hash of the shared threshold account.
    pub fn genesis_script_hash(&self) -> Option<ScriptHash> {
        self.consensus_nodes
            .first()?
            .wallet
            .account_by_label(GENESIS_ACCOUNT_LABEL)
            .map(WalletAccount::script_hash)
    }

    /// Default account of the first validator; identifies checkpoints.
    pub fn default_signer(&self) -> Option<ScriptHash> {
        self.consensus_nodes
            .first()?
            .wallet
            .default_account()
            .map(WalletAccount::script_hash)
    }

    fn all_wallets(&self) -> impl Iterator<Item = &Wallet> {
        self.consensus_nodes
            .iter()
            .map(|n| &n.wallet)
            .chain(self.wallets.iter())
    }

    /// First account in any wallet of this chain with the given script hash.
    pub fn find_account(&self, script_hash: &ScriptHash) -> Option<&WalletAccount> {
        self.all_wallets().find_map(|w| w.account(script_hash))
    }

    /// Resolve a wallet name, a genesis label, or an address/script hash.
    pub fn resolve_account(&self, name: &str) -> Option<ScriptHash> {
        if name.eq_ignore_ascii_case("genesis") {
            return self.genesis_script_hash();
        }
        if let Some(wallet) = self.all_wallets().find(|w| w.name.eq_ignore_ascii_case(name)) {
            return wallet.default_account().map(WalletAccount::script_hash);
        }
        ScriptHash::parse(name).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::Contract;
    use shared_crypto::KeyPair;

    fn two_node_chain() -> ChainDescriptor {
        let keys: Vec<KeyPair> = (0..2).map(|_| KeyPair::generate()).collect();
        let public: Vec<_> = keys.iter().map(KeyPair::public_key).collect();
        let multi = Contract::multi_sig(2, &public).unwrap();
        let nodes = keys
            .into_iter()
            .enumerate()
            .map(|(i, key)| {
                let mut wallet = Wallet::new(format!("node{}", i + 1));
                wallet.add_account(WalletAccount::single(key.clone(), true));
                wallet.add_account(WalletAccount::for_contract(
                    &multi,
                    Some(key),
                    Some(GENESIS_ACCOUNT_LABEL),
                ));
                ConsensusNodeDescriptor::new(wallet, DEFAULT_PORT_BASE, i as u16).unwrap()
            })
            .collect();
        ChainDescriptor {
            magic: 5566,
            consensus_nodes: nodes,
            wallets: vec![],
        }
    }

    #[test]
    fn test_port_derivation() {
        assert_eq!(port_number(DEFAULT_PORT_BASE, 0, RPC_PORT_SUFFIX), Some(DEFAULT_RPC_PORT));
        assert_eq!(port_number(DEFAULT_PORT_BASE, 3, TCP_PORT_SUFFIX), Some(52333));
        let node = ConsensusNodeDescriptor::new(Wallet::new("n"), DEFAULT_PORT_BASE, 1).unwrap();
        assert_eq!((node.tcp_port, node.ws_port, node.rpc_port), (50333, 50334, 50332));
    }

    #[test]
    fn test_port_overflow_is_an_error() {
        assert_eq!(port_number(60000, 6, TCP_PORT_SUFFIX), None);
        assert_eq!(port_number(u16::MAX, 0, RPC_PORT_SUFFIX), None);
        assert_eq!(port_number(0, 66, 0), None);
        assert!(matches!(
            ConsensusNodeDescriptor::new(Wallet::new("n7"), 60000, 6),
            Err(TypeError::PortOutOfRange { base: 60000, index: 6 })
        ));
        // The web socket port is the highest of the three.
        assert!(ConsensusNodeDescriptor::new(Wallet::new("n"), 65535 - 334, 0).is_ok());
        assert!(ConsensusNodeDescriptor::new(Wallet::new("n"), 65535 - 333, 0).is_err());
    }

    #[test]
    fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("default.xc.json");
        let chain = two_node_chain();
        chain.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"consensus-nodes\""));
        assert!(text.contains("\"rpc-port\""));

        let loaded = ChainDescriptor::load(&path).unwrap();
        assert_eq!(loaded.magic, 5566);
        assert_eq!(loaded.genesis_script_hash(), chain.genesis_script_hash());
        assert_eq!(loaded.default_signer(), chain.default_signer());
    }

    #[test]
    fn test_genesis_shared_across_nodes() {
        let chain = two_node_chain();
        let genesis = chain.genesis_script_hash().unwrap();
        for node in &chain.consensus_nodes {
            assert!(node.wallet.account(&genesis).is_some());
        }
        assert_eq!(chain.resolve_account("genesis"), Some(genesis));
        assert_eq!(chain.resolve_account("node1"), chain.default_signer());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ChainDescriptor::load(&dir.path().join("absent.json")),
            Err(TypeError::Io(_))
        ));
    }
}
