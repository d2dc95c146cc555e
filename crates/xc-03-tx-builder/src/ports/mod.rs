//! Ports for the transaction builder.

pub mod outbound;
