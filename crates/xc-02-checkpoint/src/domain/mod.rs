//! Domain layer for checkpoints.

pub mod archive;
pub mod config;
pub mod errors;
pub mod manifest;
