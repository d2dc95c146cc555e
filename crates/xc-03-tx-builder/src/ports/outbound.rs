//! # Outbound Ports (Ledger Engine)
//!
//! The consensus/VM engine is an external collaborator. The builder only
//! reads chain state through a `LedgerSnapshot` handle passed in by the
//! caller, and hands finished transactions to `LedgerEngine::relay`.

use shared_types::{ScriptHash, Transaction};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Ledger engine error: {0}")]
pub struct EngineError(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VmState {
    Halt,
    Fault,
}

/// Result-stack item returned by a simulation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StackItem {
    Integer(i128),
    Boolean(bool),
    ByteString(Vec<u8>),
    Array(Vec<StackItem>),
    Null,
}

impl StackItem {
    /// Integer view; byte strings are little-endian two's complement.
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            StackItem::Integer(v) => Some(*v),
            StackItem::Boolean(b) => Some(*b as i128),
            StackItem::ByteString(bytes) if bytes.len() <= 16 => {
                if bytes.is_empty() {
                    return Some(0);
                }
                let fill = if bytes[bytes.len() - 1] & 0x80 != 0 { 0xFF } else { 0x00 };
                let mut buf = [fill; 16];
                buf[..bytes.len()].copy_from_slice(bytes);
                Some(i128::from_le_bytes(buf))
            }
            _ => None,
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            StackItem::Boolean(b) => *b,
            StackItem::Null => false,
            other => other.as_integer().map(|v| v != 0).unwrap_or(true),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationResult {
    pub state: VmState,
    /// Bottom to top.
    pub stack: Vec<StackItem>,
    pub gas_consumed: i64,
}

impl SimulationResult {
    pub fn faulted(&self) -> bool {
        self.state == VmState::Fault
    }
}

/// Point-in-time view of chain state.
pub trait LedgerSnapshot: Send + Sync {
    fn height(&self) -> u32;

    fn fee_per_byte(&self) -> i64;

    /// Verification script of a deployed contract account, if any.
    fn contract_script(&self, _hash: &ScriptHash) -> Option<Vec<u8>> {
        None
    }

    /// Execute `script` in test mode, with `container` as the script
    /// container when given and `extra_gas` on top of the free allowance.
    fn simulate(
        &self,
        script: &[u8],
        container: Option<&Transaction>,
        extra_gas: i64,
    ) -> Result<SimulationResult, EngineError>;
}

pub trait LedgerEngine: Send + Sync {
    fn snapshot(&self) -> Arc<dyn LedgerSnapshot>;

    /// Hand a fully witnessed transaction to the local node for broadcast.
    fn relay(&self, tx: &Transaction) -> Result<(), EngineError>;
}
