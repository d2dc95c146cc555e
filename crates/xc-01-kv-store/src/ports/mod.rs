//! Ports for the key-value store.

pub mod inbound;
