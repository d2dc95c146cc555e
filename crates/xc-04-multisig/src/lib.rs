//! # Multi-Signature Coordinator Subsystem (xc-04)
//!
//! Collects threshold signatures for built transfers, assembles witnesses
//! and relays completed transactions.
//!
//! ## Architecture
//!
//! | Layer | Contents |
//! |-------|----------|
//! | `domain` | `SigningContext` state machine, JSON codec, `ContextRegistry`, `CoordinatorConfig`, `SigningError` |
//! | `ports::outbound` | `SignerEndpoint` (message-passing signer) |
//! | `adapters` | `WalletSigner` actor owning one wallet |
//! | `service` | `MultiSigCoordinator` |
//!
//! ## Flow
//!
//! ```text
//! built tx ──► sign_transfer ──► fan-out SignRequest ──► shares merged
//!                                                          │
//!                    Pending(context) ◄── incomplete ──────┤
//!                    Relayed { txid } ◄── completed ───────┘
//! client signatures ──► submit ──► merge ──► (same two outcomes)
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::wallet_signer::WalletSigner;
pub use domain::config::CoordinatorConfig;
pub use domain::context::{ContextItem, ContextState, SigningContext, SubmitOutcome};
pub use domain::errors::SigningError;
pub use domain::registry::{ContextRegistry, SharedContext};
pub use ports::outbound::{AccountInfo, SignRequest, SignatureShare, SignerEndpoint};
pub use service::{MultiSigCoordinator, SignatureSubmission, SigningOutcome};
