//! # Transaction Builder Subsystem (xc-03)
//!
//! Turns "send X of asset A from S to R" into an unsigned transaction with
//! system and network fees the ledger engine will accept.
//!
//! ## Architecture
//!
//! | Layer | Contents |
//! |-------|----------|
//! | `domain` | `Amount`, native assets, `FeeSchedule`, `BuildError` |
//! | `ports::outbound` | `LedgerSnapshot`, `LedgerEngine` (simulation + relay) |
//! | `service` | `TransactionBuilder` |
//!
//! ## Build Steps
//!
//! 1. Query the sender's balance of the asset (and of GAS when different)
//! 2. Emit `transfer(sender, receiver, amount)` followed by `THROWIFNOT`
//! 3. Simulate with the provisional transaction as container; a fault aborts
//! 4. `system_fee` = consumed gas rounded up to a whole GAS
//! 5. `network_fee` = witness verification cost + size x fee-per-byte
//! 6. Reject when the GAS balance cannot cover both fees

pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use domain::amount::Amount;
pub use domain::assets::{resolve_asset, NativeAsset, GAS, NEO};
pub use domain::errors::BuildError;
pub use domain::fees::FeeSchedule;
pub use ports::outbound::{
    EngineError, LedgerEngine, LedgerSnapshot, SimulationResult, StackItem, VmState,
};
pub use service::{TransactionBuilder, TransferRequest};
