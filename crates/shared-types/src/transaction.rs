//! # Transactions
//!
//! Binary layout (all integers little-endian):
//!
//! ```text
//! version:u8 nonce:u32 sender:[20] system_fee:i64 network_fee:i64
//! valid_until_block:u32 attributes:var cosigners:var script:var_bytes
//! witnesses:var            (omitted from the unsigned form)
//! ```
//!
//! The unsigned form is the hash data that signers sign.

use crate::errors::TypeError;
use crate::hashes::{Hash256, ScriptHash};
use crate::io::{var_bytes_size, var_int_size, BinaryReader, BinaryWriter};
use serde::{Deserialize, Serialize};

const MAX_ATTRIBUTES: u64 = 16;
const MAX_SCRIPT_SIZE: usize = 0xFFFF;
const MAX_WITNESS_SCRIPT_SIZE: usize = 1024 * 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum WitnessScope {
    Global = 0x00,
    CalledByEntry = 0x01,
}

impl TryFrom<u8> for WitnessScope {
    type Error = TypeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(WitnessScope::Global),
            0x01 => Ok(WitnessScope::CalledByEntry),
            other => Err(TypeError::Format(format!("unsupported witness scope {:#04x}", other))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cosigner {
    pub account: ScriptHash,
    pub scopes: WitnessScope,
}

impl Cosigner {
    pub const SIZE: usize = 21;

    pub fn called_by_entry(account: ScriptHash) -> Self {
        Self {
            account,
            scopes: WitnessScope::CalledByEntry,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionAttribute {
    pub usage: u8,
    pub data: Vec<u8>,
}

impl TransactionAttribute {
    pub fn size(&self) -> usize {
        1 + var_bytes_size(self.data.len())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Witness {
    pub invocation_script: Vec<u8>,
    pub verification_script: Vec<u8>,
}

impl Witness {
    pub fn size(&self) -> usize {
        var_bytes_size(self.invocation_script.len()) + var_bytes_size(self.verification_script.len())
    }

    pub fn script_hash(&self) -> ScriptHash {
        ScriptHash::from_script(&self.verification_script)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub version: u8,
    pub nonce: u32,
    pub sender: ScriptHash,
    pub system_fee: i64,
    pub network_fee: i64,
    pub valid_until_block: u32,
    pub attributes: Vec<TransactionAttribute>,
    pub cosigners: Vec<Cosigner>,
    pub script: Vec<u8>,
    pub witnesses: Vec<Witness>,
}

impl Transaction {
    /// Fixed-width prefix: version, nonce, sender, fees, valid-until.
    pub const HEADER_SIZE: usize = 1 + 4 + 20 + 8 + 8 + 4;

    pub fn attributes_size(&self) -> usize {
        var_int_size(self.attributes.len())
            + self.attributes.iter().map(|a| a.size()).sum::<usize>()
    }

    pub fn cosigners_size(&self) -> usize {
        var_int_size(self.cosigners.len()) + self.cosigners.len() * Cosigner::SIZE
    }

    /// Sorted, de-duplicated accounts whose witnesses the ledger checks.
    pub fn script_hashes_for_verifying(&self) -> Vec<ScriptHash> {
        let mut hashes: Vec<ScriptHash> = std::iter::once(self.sender)
            .chain(self.cosigners.iter().map(|c| c.account))
            .collect();
        hashes.sort();
        hashes.dedup();
        hashes
    }

    fn write_unsigned(&self, w: &mut BinaryWriter) {
        w.write_u8(self.version)
            .write_u32(self.nonce)
            .write_bytes(self.sender.as_bytes())
            .write_i64(self.system_fee)
            .write_i64(self.network_fee)
            .write_u32(self.valid_until_block);
        w.write_var_int(self.attributes.len() as u64);
        for attr in &self.attributes {
            w.write_u8(attr.usage).write_var_bytes(&attr.data);
        }
        w.write_var_int(self.cosigners.len() as u64);
        for cosigner in &self.cosigners {
            w.write_bytes(cosigner.account.as_bytes())
                .write_u8(cosigner.scopes as u8);
        }
        w.write_var_bytes(&self.script);
    }

    /// Bytes covered by witness signatures.
    pub fn hash_data(&self) -> Vec<u8> {
        let mut w = BinaryWriter::with_capacity(Self::HEADER_SIZE + self.script.len() + 16);
        self.write_unsigned(&mut w);
        w.into_bytes()
    }

    pub fn hash(&self) -> Hash256 {
        Hash256::digest(&self.hash_data())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = BinaryWriter::with_capacity(self.size());
        self.write_unsigned(&mut w);
        w.write_var_int(self.witnesses.len() as u64);
        for witness in &self.witnesses {
            w.write_var_bytes(&witness.invocation_script)
                .write_var_bytes(&witness.verification_script);
        }
        w.into_bytes()
    }

    pub fn size(&self) -> usize {
        Self::HEADER_SIZE
            + self.attributes_size()
            + self.cosigners_size()
            + var_bytes_size(self.script.len())
            + var_int_size(self.witnesses.len())
            + self.witnesses.iter().map(|w| w.size()).sum::<usize>()
    }

    fn read_unsigned(r: &mut BinaryReader<'_>) -> Result<Self, TypeError> {
        let version = r.read_u8()?;
        if version != 0 {
            return Err(TypeError::Format(format!("unsupported transaction version {}", version)));
        }
        let nonce = r.read_u32()?;
        let sender = ScriptHash::from_slice(r.read_bytes(20)?)?;
        let system_fee = r.read_i64()?;
        let network_fee = r.read_i64()?;
        if system_fee < 0 || network_fee < 0 {
            return Err(TypeError::Format("negative fee".into()));
        }
        let valid_until_block = r.read_u32()?;

        let count = r.read_var_int(MAX_ATTRIBUTES)?;
        let mut attributes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let usage = r.read_u8()?;
            let data = r.read_var_bytes(252)?.to_vec();
            attributes.push(TransactionAttribute { usage, data });
        }

        let count = r.read_var_int(MAX_ATTRIBUTES)?;
        let mut cosigners = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let account = ScriptHash::from_slice(r.read_bytes(20)?)?;
            let scopes = WitnessScope::try_from(r.read_u8()?)?;
            cosigners.push(Cosigner { account, scopes });
        }

        let script = r.read_var_bytes(MAX_SCRIPT_SIZE)?.to_vec();
        if script.is_empty() {
            return Err(TypeError::Format("empty transaction script".into()));
        }

        Ok(Self {
            version,
            nonce,
            sender,
            system_fee,
            network_fee,
            valid_until_block,
            attributes,
            cosigners,
            script,
            witnesses: Vec::new(),
        })
    }

    /// Decode the unsigned form (no witness section).
    pub fn from_unsigned_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        let mut r = BinaryReader::new(bytes);
        let tx = Self::read_unsigned(&mut r)?;
        if !r.is_exhausted() {
            return Err(TypeError::Format(format!("{} trailing bytes", r.remaining())));
        }
        Ok(tx)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        let mut r = BinaryReader::new(bytes);
        let mut tx = Self::read_unsigned(&mut r)?;
        let count = r.read_var_int(MAX_ATTRIBUTES)?;
        for _ in 0..count {
            let invocation_script = r.read_var_bytes(MAX_WITNESS_SCRIPT_SIZE)?.to_vec();
            let verification_script = r.read_var_bytes(MAX_WITNESS_SCRIPT_SIZE)?.to_vec();
            tx.witnesses.push(Witness {
                invocation_script,
                verification_script,
            });
        }
        if !r.is_exhausted() {
            return Err(TypeError::Format(format!("{} trailing bytes", r.remaining())));
        }
        Ok(tx)
    }
}
