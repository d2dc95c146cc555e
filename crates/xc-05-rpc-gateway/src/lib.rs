//! # RPC Gateway Subsystem (xc-05)
//!
//! JSON-RPC 2.0 over HTTP for the express node extensions.
//!
//! ```text
//! POST / ──► parse ──► (batch ≤ max_batch_size) ──► route_method
//!                                                      │
//!   express-create-checkpoint ──► xc-02 CheckpointManager
//!   express-show-coins        ──► xc-03 balance_of (NEO, GAS)
//!   express-transfer          ──► xc-03 build ──► xc-04 sign_transfer
//!   express-submit-signatures ──► xc-04 submit
//! ```
//!
//! ## Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | `domain` | `GatewayConfig`, `ApiError` and JSON-RPC codes |
//! | `adapters` | subsystem error → `ApiError` mapping, revocable `StoreHandle` |
//! | `rpc` | `ExpressRpc` handlers |
//! | `router` | method dispatch and positional params |
//! | `service` | axum server with graceful shutdown |

pub mod adapters;
pub mod domain;
pub mod router;
pub mod rpc;
pub mod service;

pub use adapters::store_handle::StoreHandle;
pub use domain::config::{ConfigError, GatewayConfig};
pub use domain::error::{codes, ApiError, ApiResult, GatewayError};
pub use router::{route_method, METHODS};
pub use rpc::{outcome_response, ExpressRpc, NodeIdentity, SignatureItem};
pub use service::{process_request, GatewayService};
