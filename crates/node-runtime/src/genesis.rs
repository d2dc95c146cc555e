//! # Network Creation
//!
//! Builds the descriptor of a fresh disposable network:
//!
//! - one wallet per validator, named `node1..nodeN`, holding a freshly
//!   generated default single-signature account
//! - an `M`-of-`N` threshold contract over every default key, where
//!   `M = N * 2 / 3 + 1`, added to each wallet under the `MultiSigContract`
//!   label with that wallet's own key
//! - a random network magic and per-node ports derived from the port base

use shared_crypto::KeyPair;
use shared_types::{
    port_number, ChainDescriptor, ConsensusNodeDescriptor, Contract, TypeError, Wallet,
    WalletAccount, GENESIS_ACCOUNT_LABEL, WEB_SOCKET_PORT_SUFFIX,
};
use thiserror::Error;
use tracing::info;

pub const VALID_NODE_COUNTS: [usize; 3] = [1, 4, 7];

#[derive(Debug, Error)]
pub enum GenesisError {
    #[error("invalid node count {0}; networks have 1, 4 or 7 validators")]
    InvalidNodeCount(usize),

    #[error("port base {port_base} leaves no room for {count} nodes")]
    InvalidPortBase { port_base: u16, count: usize },

    #[error(transparent)]
    Types(#[from] TypeError),
}

/// Signatures needed from `count` validators.
pub fn threshold(count: usize) -> usize {
    count * 2 / 3 + 1
}

pub fn create_network(count: usize, port_base: u16) -> Result<ChainDescriptor, GenesisError> {
    if !VALID_NODE_COUNTS.contains(&count) {
        return Err(GenesisError::InvalidNodeCount(count));
    }
    let last = count as u16 - 1;
    if port_base == 0 || port_number(port_base, last, WEB_SOCKET_PORT_SUFFIX).is_none() {
        return Err(GenesisError::InvalidPortBase { port_base, count });
    }

    let keys: Vec<KeyPair> = (0..count).map(|_| KeyPair::generate()).collect();
    let public_keys: Vec<_> = keys.iter().map(KeyPair::public_key).collect();
    let genesis = Contract::multi_sig(threshold(count), &public_keys)?;

    let consensus_nodes = keys
        .into_iter()
        .enumerate()
        .map(|(index, key)| {
            let mut wallet = Wallet::new(format!("node{}", index + 1));
            wallet.add_account(WalletAccount::single(key.clone(), true));
            wallet.add_account(WalletAccount::for_contract(
                &genesis,
                Some(key),
                Some(GENESIS_ACCOUNT_LABEL),
            ));
            ConsensusNodeDescriptor::new(wallet, port_base, index as u16)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let chain = ChainDescriptor {
        magic: rand::random(),
        consensus_nodes,
        wallets: Vec::new(),
    };
    info!(
        nodes = count,
        threshold = threshold(count),
        magic = chain.magic,
        genesis = %genesis.script_hash().to_address(),
        "Created network"
    );
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{ScriptHash, DEFAULT_PORT_BASE};

    #[test]
    fn test_threshold() {
        assert_eq!(threshold(1), 1);
        assert_eq!(threshold(4), 3);
        assert_eq!(threshold(7), 5);
    }

    #[test]
    fn test_rejects_other_sizes() {
        for count in [0, 2, 3, 5, 8] {
            assert!(matches!(
                create_network(count, DEFAULT_PORT_BASE),
                Err(GenesisError::InvalidNodeCount(c)) if c == count
            ));
        }
    }

    #[test]
    fn test_rejects_port_base_without_room() {
        assert!(matches!(
            create_network(7, 60000),
            Err(GenesisError::InvalidPortBase { port_base: 60000, count: 7 })
        ));
        assert!(matches!(
            create_network(1, 0),
            Err(GenesisError::InvalidPortBase { .. })
        ));
        let chain = create_network(1, 60000).unwrap();
        assert_eq!(chain.consensus_nodes[0].ws_port, 60334);
    }

    #[test]
    fn test_four_node_network() {
        let chain = create_network(4, DEFAULT_PORT_BASE).unwrap();
        assert_eq!(chain.consensus_nodes.len(), 4);

        let genesis: ScriptHash = chain.genesis_script_hash().unwrap();
        for (index, node) in chain.consensus_nodes.iter().enumerate() {
            assert_eq!(node.wallet.name, format!("node{}", index + 1));
            assert_eq!(node.rpc_port, 49332 + index as u16 * 1000);

            let shared = node.wallet.account(&genesis).unwrap();
            assert!(shared.has_label(GENESIS_ACCOUNT_LABEL));
            let own_key = node.wallet.default_account().unwrap().public_key();
            assert_eq!(shared.public_key(), own_key);
        }

        let contract = chain.consensus_nodes[0]
            .wallet
            .account(&genesis)
            .unwrap()
            .contract
            .to_contract();
        let shape = shared_types::WitnessShape::detect(&contract.script);
        assert_eq!(shape.required_signatures(), 3);
    }

    #[test]
    fn test_single_node_network() {
        let chain = create_network(1, 20000).unwrap();
        assert_eq!(chain.consensus_nodes[0].rpc_port, 20332);
        assert_ne!(chain.genesis_script_hash(), chain.default_signer());
    }
}
