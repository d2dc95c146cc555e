//! # Identifiers
//!
//! `ScriptHash` identifies an account or contract by the digest of its
//! verification script. `Hash256` identifies transactions.
//!
//! Both are stored little-endian and displayed big-endian with a `0x`
//! prefix. Script hashes additionally have a base58check address form.

use crate::errors::TypeError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use shared_crypto::{hash160, hash256};
use std::fmt;
use std::str::FromStr;

/// Version byte prefixed to script hashes in the address encoding.
pub const ADDRESS_VERSION: u8 = 0x17;

fn decode_reversed<const N: usize>(s: &str) -> Result<[u8; N], TypeError> {
    let trimmed = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(trimmed).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
    if bytes.len() != N {
        return Err(TypeError::InvalidLength {
            expected: N,
            actual: bytes.len(),
        });
    }
    let mut out = [0u8; N];
    for (i, b) in bytes.iter().rev().enumerate() {
        out[i] = *b;
    }
    Ok(out)
}

fn write_reversed(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    write!(f, "0x")?;
    for b in bytes.iter().rev() {
        write!(f, "{:02x}", b)?;
    }
    Ok(())
}

// =============================================================================
// SCRIPT HASH
// =============================================================================

/// 160-bit script hash (account / contract identity).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ScriptHash(pub [u8; 20]);

impl ScriptHash {
    pub const ZERO: ScriptHash = ScriptHash([0u8; 20]);

    /// Script hash of a verification script.
    pub fn from_script(script: &[u8]) -> Self {
        Self(hash160(script))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        let arr: [u8; 20] = bytes.try_into().map_err(|_| TypeError::InvalidLength {
            expected: 20,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Base58check address with the network address version.
    pub fn to_address(&self) -> String {
        let mut payload = Vec::with_capacity(21);
        payload.push(ADDRESS_VERSION);
        payload.extend_from_slice(&self.0);
        bs58::encode(payload).with_check().into_string()
    }

    /// Decode a base58check address.
    pub fn from_address(address: &str) -> Result<Self, TypeError> {
        let payload = bs58::decode(address)
            .with_check(None)
            .into_vec()
            .map_err(|e| TypeError::InvalidAddress(format!("{}: {}", address, e)))?;
        if payload.len() != 21 || payload[0] != ADDRESS_VERSION {
            return Err(TypeError::InvalidAddress(address.to_string()));
        }
        Self::from_slice(&payload[1..])
    }

    /// Parse either an address or a `0x`-prefixed hex script hash.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s.starts_with("0x") || s.len() == 40 {
            decode_reversed::<20>(s).map(Self)
        } else {
            Self::from_address(s)
        }
    }
}

impl fmt::Display for ScriptHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_reversed(f, &self.0)
    }
}

impl fmt::Debug for ScriptHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptHash({})", self)
    }
}

impl FromStr for ScriptHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ScriptHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ScriptHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}

// =============================================================================
// HASH256
// =============================================================================

/// 256-bit hash (transaction id).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// Double SHA-256 of `data`.
    pub fn digest(data: &[u8]) -> Self {
        Self(hash256(data))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn parse(s: &str) -> Result<Self, TypeError> {
        decode_reversed::<32>(s).map(Self)
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_reversed(f, &self.0)
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self)
    }
}

impl FromStr for Hash256 {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}
