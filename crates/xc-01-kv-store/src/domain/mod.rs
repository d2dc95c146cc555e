//! Domain layer for the key-value store.

pub mod config;
pub mod errors;
pub mod family;
pub mod write_buffer;
