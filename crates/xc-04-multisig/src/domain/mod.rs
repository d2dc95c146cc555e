//! Domain layer for threshold signing.

pub mod codec;
pub mod config;
pub mod context;
pub mod errors;
pub mod registry;
