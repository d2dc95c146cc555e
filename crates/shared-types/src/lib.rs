//! # Shared Types Crate
//!
//! Domain entities shared by the storage, checkpoint, transaction-building,
//! signing and gateway subsystems.
//!
//! ## Clusters
//!
//! - **Identity**: `ScriptHash`, `Hash256`, addresses
//! - **Encoding**: var-int binary writer/reader
//! - **Scripts**: opcodes, `ScriptBuilder`, witness-shape detection, `Contract`
//! - **Ledger**: `Transaction`, `Cosigner`, `Witness`
//! - **Network**: `Wallet`, `WalletAccount`, `ChainDescriptor`,
//!   `ConsensusNodeDescriptor`

pub mod chain;
pub mod errors;
pub mod hashes;
pub mod io;
pub mod script;
pub mod transaction;
pub mod wallet;

pub use chain::{
    port_number, ChainDescriptor, ConsensusNodeDescriptor, DEFAULT_PORT_BASE, DEFAULT_RPC_PORT,
    RPC_PORT_SUFFIX,
    TCP_PORT_SUFFIX, WEB_SOCKET_PORT_SUFFIX,
};
pub use errors::TypeError;
pub use hashes::{Hash256, ScriptHash, ADDRESS_VERSION};
pub use io::{var_bytes_size, var_int_size, BinaryReader, BinaryWriter};
pub use script::{
    interop, push_int_opcode, Contract, ContractArg, ContractParameterType, OpCode, ScriptBuilder,
    WitnessShape,
};
pub use transaction::{Cosigner, Transaction, TransactionAttribute, Witness, WitnessScope};
pub use wallet::{AccountContract, Wallet, WalletAccount, GENESIS_ACCOUNT_LABEL};
