//! Signer adapters.

pub mod wallet_signer;
