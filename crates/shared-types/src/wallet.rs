//! # Wallet Model
//!
//! A wallet is a named set of accounts, exactly one of which is the default.
//! Private keys only live inside accounts; signing goes through the wallet.

use crate::hashes::ScriptHash;
use crate::script::{Contract, ContractParameterType};
use serde::{Deserialize, Serialize};
use shared_crypto::{KeyPair, PublicKey, Signature};

/// Label of the threshold account shared by every validator wallet.
pub const GENESIS_ACCOUNT_LABEL: &str = "MultiSigContract";

pub(crate) mod hex_bytes {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(de::Error::custom)
    }
}

mod key_hex {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use shared_crypto::KeyPair;

    pub fn serialize<S: Serializer>(key: &Option<KeyPair>, serializer: S) -> Result<S::Ok, S::Error> {
        match key {
            Some(k) => serializer.serialize_some(&hex::encode(k.to_bytes())),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<KeyPair>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| {
            let bytes = hex::decode(s).map_err(de::Error::custom)?;
            KeyPair::from_slice(&bytes).map_err(de::Error::custom)
        })
        .transpose()
    }
}

/// Serialized verification contract of an account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountContract {
    #[serde(with = "hex_bytes")]
    pub script: Vec<u8>,
    pub parameters: Vec<ContractParameterType>,
}

impl From<&Contract> for AccountContract {
    fn from(contract: &Contract) -> Self {
        Self {
            script: contract.script.clone(),
            parameters: contract.parameter_list.clone(),
        }
    }
}

impl AccountContract {
    pub fn to_contract(&self) -> Contract {
        Contract::new(self.script.clone(), self.parameters.clone())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WalletAccount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(with = "key_hex", default)]
    pub private_key: Option<KeyPair>,
    pub contract: AccountContract,
}

impl WalletAccount {
    /// Single-signature account over `key`.
    pub fn single(key: KeyPair, is_default: bool) -> Self {
        let contract = Contract::signature(&key.public_key());
        Self {
            label: None,
            is_default,
            private_key: Some(key),
            contract: AccountContract::from(&contract),
        }
    }

    /// Account for an arbitrary contract, optionally holding one member key.
    pub fn for_contract(contract: &Contract, key: Option<KeyPair>, label: Option<&str>) -> Self {
        Self {
            label: label.map(str::to_string),
            is_default: false,
            private_key: key,
            contract: AccountContract::from(contract),
        }
    }

    pub fn script_hash(&self) -> ScriptHash {
        ScriptHash::from_script(&self.contract.script)
    }

    pub fn address(&self) -> String {
        self.script_hash().to_address()
    }

    pub fn public_key(&self) -> Option<PublicKey> {
        self.private_key.as_ref().map(KeyPair::public_key)
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.label.as_deref() == Some(label)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Wallet {
    pub name: String,
    pub accounts: Vec<WalletAccount>,
}

impl Wallet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accounts: Vec::new(),
        }
    }

    /// Adds an account; a new default account clears the previous default.
    pub fn add_account(&mut self, account: WalletAccount) {
        if account.is_default {
            for existing in &mut self.accounts {
                existing.is_default = false;
            }
        }
        self.accounts.push(account);
    }

    pub fn default_account(&self) -> Option<&WalletAccount> {
        self.accounts.iter().find(|a| a.is_default)
    }

    pub fn account(&self, script_hash: &ScriptHash) -> Option<&WalletAccount> {
        self.accounts.iter().find(|a| &a.script_hash() == script_hash)
    }

    pub fn account_by_label(&self, label: &str) -> Option<&WalletAccount> {
        self.accounts.iter().find(|a| a.has_label(label))
    }

    /// Sign `message` with the key this wallet holds for `script_hash`.
    pub fn sign(&self, script_hash: &ScriptHash, message: &[u8]) -> Option<(PublicKey, Signature)> {
        let key = self.account(script_hash)?.private_key.as_ref()?;
        Some((key.public_key(), key.sign(message)))
    }
}
