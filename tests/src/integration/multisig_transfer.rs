//! # Threshold Transfer Flow
//!
//! ```text
//! resolve "all" ──► build (simulate, fees) ──► open context
//!                                                  │
//!        2 signatures ──► PartiallySigned ◄────────┘
//!        3rd signature ──► Completed ──► relay ──► txid
//! ```

use super::fixtures::Network;
use shared_crypto::KeyPair;
use shared_types::{Contract, Transaction};
use std::sync::Arc;
use xc_03_tx_builder::{LedgerEngine, TransactionBuilder, TransferRequest, GAS, NEO};
use xc_04_multisig::{
    ContextState, CoordinatorConfig, MultiSigCoordinator, SignatureSubmission, SigningContext,
    SigningOutcome,
};

const GAS_UNIT: i128 = 100_000_000;

fn submission(contract: &Contract, key: &KeyPair, ctx: &SigningContext) -> SignatureSubmission {
    SignatureSubmission {
        contract: contract.clone(),
        public_key: key.public_key(),
        signature: key.sign(ctx.hash_data()),
    }
}

fn build_genesis_transfer(net: &Network, quantity: &str) -> Transaction {
    let sender = net.genesis.script_hash();
    let builder = TransactionBuilder::default();
    let snapshot = net.ledger.snapshot();
    let quantity = builder
        .resolve_quantity(snapshot.as_ref(), &GAS.hash(), quantity, &sender)
        .unwrap();
    builder
        .build(
            snapshot.as_ref(),
            &TransferRequest {
                asset: GAS.hash(),
                quantity,
                sender,
                receiver: net.default_account(1),
                witness_script: Some(net.genesis.script.clone()),
            },
        )
        .unwrap()
}

// =============================================================================
// CLIENT-SUBMITTED SIGNATURES
// =============================================================================

#[tokio::test]
async fn test_three_of_four_all_gas_transfer() {
    let net = Network::create(4);
    let genesis = net.genesis.script_hash();
    net.ledger.set_balance(GAS.hash(), genesis, 1_000 * GAS_UNIT);

    let tx = build_genesis_transfer(&net, "all");
    assert!(tx.system_fee > 0);
    assert!(tx.network_fee > 0);

    let local = net.signer(0);
    let coordinator = MultiSigCoordinator::new(
        CoordinatorConfig::for_testing(),
        Arc::new(net.ledger.clone()),
        local.clone(),
        vec![local],
    );

    let ctx = coordinator.open(tx.clone());
    assert_eq!(ctx.state(), &ContextState::Unsigned);
    assert_eq!(ctx.missing_script_hashes(), vec![genesis]);

    let first_two = net.keys[..2]
        .iter()
        .map(|key| submission(&net.genesis, key, &ctx))
        .collect();
    let SigningOutcome::Pending(partial) = coordinator.submit(ctx.clone(), first_two).unwrap()
    else {
        panic!("two of three signatures must not complete the context");
    };
    assert_eq!(partial.state(), &ContextState::PartiallySigned);
    assert_eq!(partial.missing_script_hashes(), vec![genesis]);
    assert!(net.ledger.relayed().is_empty());

    let third = vec![submission(&net.genesis, &net.keys[2], &ctx)];
    let SigningOutcome::Relayed { txid } = coordinator.submit(partial.clone(), third.clone()).unwrap()
    else {
        panic!("third signature must complete the context");
    };
    assert_eq!(txid, tx.hash());

    let relayed = net.ledger.relayed();
    assert_eq!(relayed.len(), 1);
    let witness = &relayed[0].witnesses[0];
    assert_eq!(witness.verification_script, net.genesis.script);
    assert_eq!(witness.invocation_script.len(), 3 * 65);

    // Retrying after relay reports the same id without relaying again.
    let SigningOutcome::Relayed { txid: again } = coordinator.submit(partial, third).unwrap() else {
        panic!("relayed context must stay relayed");
    };
    assert_eq!(again, txid);
    assert_eq!(net.ledger.relayed().len(), 1);
}

#[tokio::test]
async fn test_invalid_signature_keeps_collected_ones() {
    let net = Network::create(4);
    let genesis = net.genesis.script_hash();
    net.ledger.set_balance(GAS.hash(), genesis, 1_000 * GAS_UNIT);
    let tx = build_genesis_transfer(&net, "10");

    let local = net.signer(0);
    let coordinator = MultiSigCoordinator::new(
        CoordinatorConfig::for_testing(),
        Arc::new(net.ledger.clone()),
        local.clone(),
        vec![local],
    );
    let ctx = coordinator.open(tx);

    let SigningOutcome::Pending(partial) = coordinator
        .submit(ctx.clone(), vec![submission(&net.genesis, &net.keys[0], &ctx)])
        .unwrap()
    else {
        panic!("one signature must not complete the context");
    };

    let forged = SignatureSubmission {
        contract: net.genesis.clone(),
        public_key: net.keys[1].public_key(),
        signature: net.keys[1].sign(b"some other payload"),
    };
    assert!(coordinator.submit(partial.clone(), vec![forged]).is_err());

    let shared = coordinator.registry().get(&ctx.hash()).unwrap();
    let stored = shared.lock();
    assert_eq!(stored.state(), &ContextState::PartiallySigned);
    assert_eq!(stored.items()[&genesis].signatures().len(), 1);
}

// =============================================================================
// VALIDATOR FAN-OUT
// =============================================================================

#[tokio::test]
async fn test_genesis_fan_out_completes_threshold() {
    let net = Network::create(7);
    let genesis = net.genesis.script_hash();
    let receiver = net.default_account(1);
    net.ledger.set_balance(GAS.hash(), genesis, 1_000 * GAS_UNIT);
    let tx = build_genesis_transfer(&net, "250");

    let validators = (0..7).map(|i| net.signer(i)).collect::<Vec<_>>();
    let coordinator = MultiSigCoordinator::new(
        CoordinatorConfig::for_testing(),
        Arc::new(net.ledger.clone()),
        validators[0].clone(),
        validators,
    );

    let SigningOutcome::Relayed { txid } = coordinator.sign_transfer(tx.clone()).await.unwrap()
    else {
        panic!("every validator holds a member key");
    };
    assert_eq!(txid, tx.hash());

    let witness = &net.ledger.relayed()[0].witnesses[0];
    assert_eq!(witness.invocation_script.len(), 5 * 65);
    assert_eq!(net.ledger.balance(&GAS.hash(), &receiver), 250 * GAS_UNIT);
    assert_eq!(
        net.ledger.balance(&GAS.hash(), &genesis),
        750 * GAS_UNIT - (tx.system_fee + tx.network_fee) as i128
    );
}

#[tokio::test]
async fn test_single_key_sender_signs_locally() {
    let net = Network::create(4);
    let sender = net.default_account(0);
    let receiver = net.default_account(2);
    net.ledger.set_balance(NEO.hash(), sender, 100);
    net.ledger.set_balance(GAS.hash(), sender, 10 * GAS_UNIT);

    let account_script = net.chain.consensus_nodes[0]
        .wallet
        .default_account()
        .unwrap()
        .contract
        .script
        .clone();
    let builder = TransactionBuilder::default();
    let snapshot = net.ledger.snapshot();
    let quantity = builder
        .resolve_quantity(snapshot.as_ref(), &NEO.hash(), "40", &sender)
        .unwrap();
    let tx = builder
        .build(
            snapshot.as_ref(),
            &TransferRequest {
                asset: NEO.hash(),
                quantity,
                sender,
                receiver,
                witness_script: Some(account_script),
            },
        )
        .unwrap();

    let local = net.signer(0);
    let others = (1..4).map(|i| net.signer(i)).collect();
    let coordinator = MultiSigCoordinator::new(
        CoordinatorConfig::for_testing(),
        Arc::new(net.ledger.clone()),
        local,
        others,
    );
    let outcome = coordinator.sign_transfer(tx).await.unwrap();
    assert!(matches!(outcome, SigningOutcome::Relayed { .. }));
    assert_eq!(net.ledger.balance(&NEO.hash(), &receiver), 40);
    assert_eq!(net.ledger.balance(&NEO.hash(), &sender), 60);
}
