//! # Express-Chain Test Suite
//!
//! Cross-subsystem scenarios that no single crate can exercise alone.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── multisig_transfer.rs   # xc-03 build → xc-04 threshold signing → relay
//!     ├── checkpoint_flow.rs     # xc-01 store → xc-02 archive → restore / read-only
//!     └── gateway_http.rs        # node-runtime → xc-05 over a real socket
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p xc-tests
//! cargo test -p xc-tests integration::multisig_transfer::
//! ```

pub mod integration;
