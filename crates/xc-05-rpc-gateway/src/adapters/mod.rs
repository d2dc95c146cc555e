//! Adapters for the RPC gateway.

pub mod error_conversions;
pub mod store_handle;
