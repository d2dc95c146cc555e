//! # Signing Context
//!
//! Per-transaction signature collection.
//!
//! ```text
//! Unsigned ──► PartiallySigned ──► Completed ──► Relayed
//!     │               │                │
//!     └───────────────┴────────────────┴──────► Error
//! ```
//!
//! Signatures are only ever added, so a satisfied script hash stays
//! satisfied and a completed context never returns to `PartiallySigned`.

use super::errors::SigningError;
use shared_crypto::{PublicKey, Signature};
use shared_types::{Contract, Hash256, ScriptBuilder, ScriptHash, Transaction, Witness, WitnessShape};
use std::collections::BTreeMap;
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContextState {
    Unsigned,
    PartiallySigned,
    Completed,
    Relayed,
    Error(String),
}

/// What `add_signature` did with a valid signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    /// Same key already signed for this script hash.
    Duplicate,
    /// The script hash already had enough signatures.
    AlreadySatisfied,
}

/// Signatures collected for one verification contract.
#[derive(Clone, Debug)]
pub struct ContextItem {
    contract: Contract,
    signatures: BTreeMap<PublicKey, Signature>,
}

impl ContextItem {
    fn new(contract: Contract) -> Self {
        Self {
            contract,
            signatures: BTreeMap::new(),
        }
    }

    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    pub fn signatures(&self) -> &BTreeMap<PublicKey, Signature> {
        &self.signatures
    }

    pub fn required(&self) -> usize {
        self.contract.shape().required_signatures()
    }

    pub fn is_satisfied(&self) -> bool {
        let required = self.required();
        required > 0 && self.signatures.len() >= required
    }

    /// Signatures in the order their keys appear in the verification
    /// script, truncated to the threshold.
    pub fn ordered_signatures(&self) -> Vec<Signature> {
        let required = self.required();
        self.contract
            .shape()
            .keys()
            .iter()
            .filter_map(|key| self.signatures.get(key).copied())
            .take(required)
            .collect()
    }

    fn invocation_script(&self) -> Vec<u8> {
        let mut sb = ScriptBuilder::new();
        for signature in self.ordered_signatures() {
            sb.emit_push_bytes(signature.as_bytes());
        }
        sb.into_bytes()
    }
}

#[derive(Clone, Debug)]
pub struct SigningContext {
    tx: Transaction,
    hash_data: Vec<u8>,
    script_hashes: Vec<ScriptHash>,
    items: BTreeMap<ScriptHash, ContextItem>,
    state: ContextState,
}

impl SigningContext {
    pub fn new(tx: Transaction) -> Self {
        let hash_data = tx.hash_data();
        let script_hashes = tx.script_hashes_for_verifying();
        Self {
            tx,
            hash_data,
            script_hashes,
            items: BTreeMap::new(),
            state: ContextState::Unsigned,
        }
    }

    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    pub fn hash(&self) -> Hash256 {
        self.tx.hash()
    }

    /// Bytes every signer signs.
    pub fn hash_data(&self) -> &[u8] {
        &self.hash_data
    }

    pub fn script_hashes(&self) -> &[ScriptHash] {
        &self.script_hashes
    }

    pub fn items(&self) -> &BTreeMap<ScriptHash, ContextItem> {
        &self.items
    }

    pub fn state(&self) -> &ContextState {
        &self.state
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, ContextState::Completed | ContextState::Relayed)
    }

    pub fn is_satisfied(&self, script_hash: &ScriptHash) -> bool {
        self.items
            .get(script_hash)
            .map(ContextItem::is_satisfied)
            .unwrap_or(false)
    }

    /// Required script hashes still short of their threshold.
    pub fn missing_script_hashes(&self) -> Vec<ScriptHash> {
        self.script_hashes
            .iter()
            .filter(|hash| !self.is_satisfied(hash))
            .copied()
            .collect()
    }

    pub fn add_signature(
        &mut self,
        contract: &Contract,
        public_key: PublicKey,
        signature: Signature,
    ) -> Result<SubmitOutcome, SigningError> {
        match &self.state {
            ContextState::Error(reason) => {
                return Err(SigningError::InvalidContext(reason.clone()));
            }
            ContextState::Relayed => return Ok(SubmitOutcome::AlreadySatisfied),
            _ => {}
        }

        let script_hash = contract.script_hash();
        if !self.script_hashes.contains(&script_hash) {
            return Err(SigningError::UnknownScriptHash(script_hash.to_address()));
        }
        let shape = contract.shape();
        if shape == WitnessShape::Unknown {
            return Err(SigningError::InvalidContext(format!(
                "unsupported verification script for {}",
                script_hash
            )));
        }
        if !shape.keys().contains(&public_key) {
            return Err(SigningError::KeyNotInContract {
                public_key: hex::encode(public_key.as_bytes()),
                script_hash: script_hash.to_address(),
            });
        }
        public_key
            .verify(&self.hash_data, &signature)
            .map_err(|_| SigningError::SignatureInvalid {
                public_key: hex::encode(public_key.as_bytes()),
            })?;

        let item = self
            .items
            .entry(script_hash)
            .or_insert_with(|| ContextItem::new(contract.clone()));
        if item.is_satisfied() {
            debug!(script_hash = %script_hash, "[xc-04] Signature for satisfied contract ignored");
            return Ok(SubmitOutcome::AlreadySatisfied);
        }
        if item.signatures.contains_key(&public_key) {
            debug!(script_hash = %script_hash, "[xc-04] Duplicate signature ignored");
            return Ok(SubmitOutcome::Duplicate);
        }
        item.signatures.insert(public_key, signature);
        let collected = item.signatures.len();
        let required = item.required();

        self.refresh_state();
        info!(
            tx = %self.tx.hash(),
            script_hash = %script_hash,
            collected,
            required,
            "[xc-04] Signature accepted"
        );
        Ok(SubmitOutcome::Accepted)
    }

    /// Fold another copy of the same transaction's context into this one.
    pub fn merge(&mut self, other: &SigningContext) -> Result<(), SigningError> {
        if other.hash() != self.hash() {
            return Err(SigningError::InvalidContext(format!(
                "cannot merge context for {} into {}",
                other.hash(),
                self.hash()
            )));
        }
        for item in other.items.values() {
            for (key, signature) in &item.signatures {
                self.add_signature(&item.contract, *key, *signature)?;
            }
        }
        Ok(())
    }

    fn refresh_state(&mut self) {
        let previous = self.state.clone();
        self.state = if self.missing_script_hashes().is_empty() {
            ContextState::Completed
        } else if self.items.values().any(|item| !item.signatures.is_empty()) {
            ContextState::PartiallySigned
        } else {
            ContextState::Unsigned
        };
        if self.state == ContextState::Completed && previous != ContextState::Completed {
            info!(tx = %self.tx.hash(), "[xc-04] Signing context completed");
        }
    }

    /// Witnesses in verifying-hash order. Only available once completed.
    pub fn witnesses(&self) -> Result<Vec<Witness>, SigningError> {
        if !self.is_completed() {
            return Err(SigningError::InvalidContext(format!(
                "{} script hashes still need signatures",
                self.missing_script_hashes().len()
            )));
        }
        self.script_hashes
            .iter()
            .map(|hash| {
                let item = self.items.get(hash).ok_or_else(|| {
                    SigningError::InvalidContext(format!("no signatures for {}", hash))
                })?;
                Ok(Witness {
                    invocation_script: item.invocation_script(),
                    verification_script: item.contract.script.clone(),
                })
            })
            .collect()
    }

    /// The transaction with its witnesses attached.
    pub fn signed_transaction(&self) -> Result<Transaction, SigningError> {
        let mut tx = self.tx.clone();
        tx.witnesses = self.witnesses()?;
        Ok(tx)
    }

    pub fn mark_relayed(&mut self) -> Result<(), SigningError> {
        match self.state {
            ContextState::Completed => {
                self.state = ContextState::Relayed;
                Ok(())
            }
            ContextState::Relayed => Ok(()),
            _ => Err(SigningError::InvalidContext(
                "only a completed context can be relayed".into(),
            )),
        }
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        self.state = ContextState::Error(reason.into());
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use shared_crypto::KeyPair;
    use shared_types::Cosigner;

    pub(crate) fn validator_keys(n: usize) -> Vec<KeyPair> {
        (0..n)
            .map(|i| KeyPair::from_bytes([i as u8 + 1; 32]).unwrap())
            .collect()
    }

    pub(crate) fn transfer_from(sender: ScriptHash) -> Transaction {
        Transaction {
            version: 0,
            nonce: 42,
            sender,
            system_fee: 100_000_000,
            network_fee: 1_234_567,
            valid_until_block: 2_102_400,
            attributes: vec![],
            cosigners: vec![Cosigner::called_by_entry(sender)],
            script: vec![0x51],
            witnesses: vec![],
        }
    }

    fn three_of_four() -> (Vec<KeyPair>, Contract, SigningContext) {
        let keys = validator_keys(4);
        let publics: Vec<_> = keys.iter().map(KeyPair::public_key).collect();
        let contract = Contract::multi_sig(3, &publics).unwrap();
        let ctx = SigningContext::new(transfer_from(contract.script_hash()));
        (keys, contract, ctx)
    }

    fn sign(ctx: &mut SigningContext, contract: &Contract, key: &KeyPair) -> Result<SubmitOutcome, SigningError> {
        let signature = key.sign(ctx.hash_data());
        ctx.add_signature(contract, key.public_key(), signature)
    }

    #[test]
    fn test_threshold_reached_on_third_signature() {
        let (keys, contract, mut ctx) = three_of_four();
        assert_eq!(ctx.state(), &ContextState::Unsigned);

        sign(&mut ctx, &contract, &keys[0]).unwrap();
        sign(&mut ctx, &contract, &keys[1]).unwrap();
        assert_eq!(ctx.state(), &ContextState::PartiallySigned);
        assert_eq!(ctx.missing_script_hashes(), vec![contract.script_hash()]);

        sign(&mut ctx, &contract, &keys[2]).unwrap();
        assert_eq!(ctx.state(), &ContextState::Completed);
        assert!(ctx.missing_script_hashes().is_empty());
    }

    #[test]
    fn test_duplicate_submission_is_noop() {
        let (keys, contract, mut ctx) = three_of_four();
        assert_eq!(sign(&mut ctx, &contract, &keys[0]).unwrap(), SubmitOutcome::Accepted);
        assert_eq!(sign(&mut ctx, &contract, &keys[0]).unwrap(), SubmitOutcome::Duplicate);
        assert_eq!(ctx.items()[&contract.script_hash()].signatures().len(), 1);

        sign(&mut ctx, &contract, &keys[1]).unwrap();
        sign(&mut ctx, &contract, &keys[2]).unwrap();
        assert_eq!(
            sign(&mut ctx, &contract, &keys[3]).unwrap(),
            SubmitOutcome::AlreadySatisfied
        );
        assert_eq!(ctx.state(), &ContextState::Completed);
    }

    #[test]
    fn test_bad_signature_does_not_poison_context() {
        let (keys, contract, mut ctx) = three_of_four();
        sign(&mut ctx, &contract, &keys[0]).unwrap();

        let forged = keys[1].sign(b"something else");
        let err = ctx
            .add_signature(&contract, keys[1].public_key(), forged)
            .unwrap_err();
        assert!(matches!(err, SigningError::SignatureInvalid { .. }));
        assert_eq!(ctx.items()[&contract.script_hash()].signatures().len(), 1);
        assert_eq!(ctx.state(), &ContextState::PartiallySigned);
    }

    #[test]
    fn test_outsider_key_rejected() {
        let (_, contract, mut ctx) = three_of_four();
        let outsider = KeyPair::from_bytes([99; 32]).unwrap();
        assert!(matches!(
            sign(&mut ctx, &contract, &outsider),
            Err(SigningError::KeyNotInContract { .. })
        ));
    }

    #[test]
    fn test_unrelated_contract_rejected() {
        let (keys, _, mut ctx) = three_of_four();
        let single = Contract::signature(&keys[0].public_key());
        assert!(matches!(
            sign(&mut ctx, &single, &keys[0]),
            Err(SigningError::UnknownScriptHash(_))
        ));
    }

    #[test]
    fn test_witness_orders_signatures_by_script_position() {
        let (keys, contract, mut ctx) = three_of_four();
        for key in [&keys[3], &keys[1], &keys[0]] {
            sign(&mut ctx, &contract, key).unwrap();
        }
        let witnesses = ctx.witnesses().unwrap();
        assert_eq!(witnesses.len(), 1);
        assert_eq!(witnesses[0].verification_script, contract.script);

        let script_order = contract.shape().keys();
        let expected: Vec<u8> = script_order
            .iter()
            .filter_map(|pk| keys.iter().position(|k| k.public_key() == *pk))
            .filter(|idx| [0usize, 1, 3].contains(idx))
            .flat_map(|idx| {
                let mut push = vec![0x40];
                push.extend_from_slice(keys[idx].sign(ctx.hash_data()).as_bytes());
                push
            })
            .collect();
        assert_eq!(witnesses[0].invocation_script, expected);
        assert_eq!(witnesses[0].script_hash(), contract.script_hash());
    }

    #[test]
    fn test_witnesses_unavailable_until_complete() {
        let (keys, contract, mut ctx) = three_of_four();
        sign(&mut ctx, &contract, &keys[0]).unwrap();
        assert!(ctx.witnesses().is_err());
        assert!(ctx.mark_relayed().is_err());
    }

    #[test]
    fn test_relayed_and_error_states() {
        let (keys, contract, mut ctx) = three_of_four();
        for key in &keys[..3] {
            sign(&mut ctx, &contract, key).unwrap();
        }
        ctx.mark_relayed().unwrap();
        assert!(ctx.is_completed());
        assert_eq!(
            sign(&mut ctx, &contract, &keys[3]).unwrap(),
            SubmitOutcome::AlreadySatisfied
        );

        let (keys, contract, mut failed) = three_of_four();
        failed.fail("relay rejected");
        assert!(matches!(
            sign(&mut failed, &contract, &keys[0]),
            Err(SigningError::InvalidContext(_))
        ));
    }

    #[test]
    fn test_merge_combines_partial_copies() {
        let (keys, contract, mut a) = three_of_four();
        let mut b = a.clone();
        sign(&mut a, &contract, &keys[0]).unwrap();
        sign(&mut b, &contract, &keys[1]).unwrap();
        sign(&mut b, &contract, &keys[2]).unwrap();

        a.merge(&b).unwrap();
        assert_eq!(a.state(), &ContextState::Completed);

        let other = SigningContext::new(transfer_from(ScriptHash([5; 20])));
        assert!(a.merge(&other).is_err());
    }

    #[test]
    fn test_single_signature_account() {
        let key = KeyPair::from_bytes([8; 32]).unwrap();
        let contract = Contract::signature(&key.public_key());
        let mut ctx = SigningContext::new(transfer_from(contract.script_hash()));
        sign(&mut ctx, &contract, &key).unwrap();
        assert!(ctx.is_completed());
        let tx = ctx.signed_transaction().unwrap();
        assert_eq!(tx.witnesses[0].invocation_script.len(), 65);
    }
}
