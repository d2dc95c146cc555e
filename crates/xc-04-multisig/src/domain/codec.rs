//! # Signing-Context JSON
//!
//! ```json
//! {
//!   "type": "Transaction",
//!   "hex": "<unsigned transaction>",
//!   "items": {
//!     "0x<script hash>": {
//!       "script": "<verification script hex>",
//!       "parameters": [{ "type": "Signature", "value": "<hex>" | null }],
//!       "signatures": { "<public key hex>": "<signature hex>" }
//!     }
//!   }
//! }
//! ```
//!
//! Every signature is re-verified on decode, so a context handed back by a
//! client cannot smuggle in signatures the coordinator would reject.

use super::context::{ContextItem, SigningContext};
use super::errors::SigningError;
use serde::{Deserialize, Serialize};
use shared_crypto::{PublicKey, Signature};
use shared_types::{Contract, ContractParameterType, ScriptHash, Transaction};
use std::collections::BTreeMap;

pub const CONTEXT_TYPE: &str = "Transaction";

#[derive(Debug, Serialize, Deserialize)]
struct ContextJson {
    #[serde(rename = "type")]
    kind: String,
    hex: String,
    #[serde(default)]
    items: BTreeMap<String, ItemJson>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ItemJson {
    script: String,
    parameters: Vec<ParameterJson>,
    #[serde(default)]
    signatures: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ParameterJson {
    #[serde(rename = "type")]
    kind: ContractParameterType,
    #[serde(default)]
    value: Option<String>,
}

fn invalid(what: &str, err: impl std::fmt::Display) -> SigningError {
    SigningError::InvalidContext(format!("{}: {}", what, err))
}

fn item_json(item: &ContextItem) -> ItemJson {
    let mut ordered = if item.is_satisfied() {
        item.ordered_signatures().into_iter()
    } else {
        Vec::new().into_iter()
    };
    let parameters = item
        .contract()
        .parameter_list
        .iter()
        .map(|kind| ParameterJson {
            kind: *kind,
            value: match kind {
                ContractParameterType::Signature => {
                    ordered.next().map(|s| hex::encode(s.as_bytes()))
                }
                _ => None,
            },
        })
        .collect();
    ItemJson {
        script: hex::encode(&item.contract().script),
        parameters,
        signatures: item
            .signatures()
            .iter()
            .map(|(key, sig)| (hex::encode(key.as_bytes()), hex::encode(sig.as_bytes())))
            .collect(),
    }
}

impl SigningContext {
    pub fn to_json(&self) -> serde_json::Value {
        let doc = ContextJson {
            kind: CONTEXT_TYPE.to_string(),
            hex: hex::encode(self.hash_data()),
            items: self
                .items()
                .iter()
                .map(|(hash, item)| (hash.to_string(), item_json(item)))
                .collect(),
        };
        serde_json::to_value(doc).unwrap_or(serde_json::Value::Null)
    }

    pub fn from_json(value: &serde_json::Value) -> Result<Self, SigningError> {
        let doc: ContextJson = serde_json::from_value(value.clone())
            .map_err(|e| invalid("malformed context", e))?;
        if doc.kind != CONTEXT_TYPE {
            return Err(SigningError::InvalidContext(format!(
                "only {} contexts can be relayed, got {}",
                CONTEXT_TYPE, doc.kind
            )));
        }
        let bytes = hex::decode(&doc.hex).map_err(|e| invalid("transaction hex", e))?;
        let tx = Transaction::from_unsigned_bytes(&bytes).map_err(|e| invalid("transaction", e))?;
        let mut ctx = SigningContext::new(tx);

        for (hash, item) in &doc.items {
            let expected = ScriptHash::parse(hash).map_err(|e| invalid("item key", e))?;
            let script = hex::decode(&item.script).map_err(|e| invalid("item script", e))?;
            let contract = Contract::new(
                script,
                item.parameters.iter().map(|p| p.kind).collect(),
            );
            if contract.script_hash() != expected {
                return Err(SigningError::InvalidContext(format!(
                    "script does not hash to {}",
                    expected
                )));
            }
            for (key, sig) in &item.signatures {
                let key = hex::decode(key)
                    .map_err(|e| invalid("public key", e))
                    .and_then(|b| PublicKey::from_slice(&b).map_err(|e| invalid("public key", e)))?;
                let sig = hex::decode(sig)
                    .map_err(|e| invalid("signature", e))
                    .and_then(|b| Signature::from_slice(&b).map_err(|e| invalid("signature", e)))?;
                ctx.add_signature(&contract, key, sig)?;
            }
        }
        Ok(ctx)
    }
}
