//! # Shared Crypto
//!
//! Cryptographic primitives used by wallets, the transaction builder and the
//! multi-signature coordinator.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256, double SHA-256 | Transaction ids, script hashes |
//! | `ecdsa` | secp256k1 | Account keys, witness signatures |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic nonces, low-S normalization
//! - Secret key bytes are zeroized when a key pair is dropped

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;

// Re-exports
pub use ecdsa::{KeyPair, PublicKey, Signature, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
pub use errors::CryptoError;
pub use hashing::{hash160, hash256, sha256};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
