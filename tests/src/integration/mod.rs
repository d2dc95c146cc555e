//! Integration scenarios and their shared fixtures.

#[cfg(test)]
mod checkpoint_flow;
#[cfg(test)]
mod gateway_http;
#[cfg(test)]
mod multisig_transfer;

#[cfg(test)]
pub(crate) mod fixtures {
    use node_runtime::create_network;
    use shared_crypto::KeyPair;
    use shared_types::{ChainDescriptor, Contract, ScriptHash, DEFAULT_PORT_BASE};
    use std::sync::Arc;
    use xc_03_tx_builder::test_utils::MockLedger;
    use xc_04_multisig::{SignerEndpoint, WalletSigner};

    pub struct Network {
        pub chain: ChainDescriptor,
        pub ledger: MockLedger,
        /// Shared threshold contract.
        pub genesis: Contract,
        /// Default key of each validator, in node order.
        pub keys: Vec<KeyPair>,
    }

    impl Network {
        pub fn create(count: usize) -> Self {
            let chain = create_network(count, DEFAULT_PORT_BASE).unwrap();
            let genesis_hash = chain.genesis_script_hash().unwrap();
            let genesis = chain.consensus_nodes[0]
                .wallet
                .account(&genesis_hash)
                .unwrap()
                .contract
                .to_contract();
            let keys = chain
                .consensus_nodes
                .iter()
                .map(|node| {
                    node.wallet
                        .default_account()
                        .and_then(|account| account.private_key.clone())
                        .unwrap()
                })
                .collect();
            Self {
                chain,
                ledger: MockLedger::new(),
                genesis,
                keys,
            }
        }

        pub fn default_account(&self, index: usize) -> ScriptHash {
            self.chain.consensus_nodes[index]
                .wallet
                .default_account()
                .unwrap()
                .script_hash()
        }

        /// Signer for node `index`; must be called inside a Tokio runtime.
        pub fn signer(&self, index: usize) -> Arc<dyn SignerEndpoint> {
            Arc::new(WalletSigner::spawn(
                self.chain.consensus_nodes[index].wallet.clone(),
                8,
            ))
        }
    }
}
