//! Ports for threshold signing.

pub mod outbound;
