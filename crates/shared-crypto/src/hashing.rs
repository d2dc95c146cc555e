//! # Hashing
//!
//! SHA-256 based digests.
//!
//! - `sha256`: single round, used inside ECDSA signing
//! - `hash256`: double SHA-256, used for transaction ids
//! - `hash160`: first 20 bytes of `hash256`, used for script hashes

use sha2::{Digest, Sha256};

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Double SHA-256 of `data`.
pub fn hash256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// 160-bit digest of `data` (truncated double SHA-256).
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let digest = hash256(data);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[..20]);
    out
}
