//! RPC method handlers.

pub mod express;

pub use express::{outcome_response, ExpressRpc, NodeIdentity, SignatureItem};
