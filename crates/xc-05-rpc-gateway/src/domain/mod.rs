//! Domain layer for the RPC gateway.

pub mod config;
pub mod error;
