//! # Express-Chain Node Runtime
//!
//! Ties the subsystems into a runnable node.
//!
//! ## Modules
//!
//! - `config` - `NodeConfig` with `XC_*` environment overrides
//! - `logging` - `tracing-subscriber` installation
//! - `genesis` - `create_network` for 1, 4 or 7 validators
//! - `runtime` - `NodeRuntime::run`, `run_from_checkpoint`, `restore_checkpoint`
//!
//! ## Wiring
//!
//! ```text
//!                      ┌──────────────────────────┐
//!   JSON-RPC ────────► │ xc-05 RPC gateway        │
//!                      └──┬──────────┬─────────┬──┘
//!                         │          │         │
//!            ┌────────────▼──┐ ┌─────▼─────┐ ┌─▼─────────────────┐
//!            │ xc-02         │ │ xc-03     │ │ xc-04 coordinator │
//!            │ checkpoints   │ │ builder   │ │  └ WalletSigner×N │
//!            └──────┬────────┘ └─────┬─────┘ └─────────┬─────────┘
//!                   │                │                 │ relay
//!            ┌──────▼────────┐       └──── ledger engine ◄┘
//!            │ xc-01 store   │
//!            └───────────────┘
//! ```

pub mod config;
pub mod genesis;
pub mod logging;
pub mod runtime;

pub use config::{ConfigError, NodeConfig};
pub use genesis::{create_network, threshold, GenesisError, VALID_NODE_COUNTS};
pub use logging::init_logging;
pub use runtime::{node_data_dir, restore_checkpoint, NodeRuntime};
