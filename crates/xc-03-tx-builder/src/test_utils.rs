//! Scripted ledger double for tests.
//!
//! `MockLedger` understands exactly the scripts this crate emits: pushes,
//! `PACK`, `ADD`, `THROWIFNOT` and `Contract.Call` into token contracts
//! exposing `balanceOf`, `decimals` and `transfer`. Relaying burns the
//! sender's fees, then applies the script's transfers unless it faults.

use crate::domain::assets::{GAS, NEO};
use crate::ports::outbound::{
    EngineError, LedgerEngine, LedgerSnapshot, SimulationResult, StackItem, VmState,
};
use parking_lot::Mutex;
use shared_types::{interop, OpCode, ScriptHash, Transaction};
use std::collections::HashMap;
use std::sync::Arc;

/// Gas charged for any script run without a container.
pub const QUERY_GAS: i64 = 1_000_000;
/// Gas charged for a transfer script by default.
pub const TRANSFER_GAS: i64 = 9_007_990;

#[derive(Clone, Debug)]
struct LedgerState {
    height: u32,
    fee_per_byte: i64,
    transfer_gas: i64,
    fault_transfers: bool,
    decimals: HashMap<ScriptHash, u8>,
    balances: HashMap<(ScriptHash, ScriptHash), i128>,
    contracts: HashMap<ScriptHash, Vec<u8>>,
}

impl LedgerState {
    fn balance(&self, asset: &ScriptHash, account: &ScriptHash) -> i128 {
        self.balances.get(&(*asset, *account)).copied().unwrap_or(0)
    }
}

#[derive(Clone)]
pub struct MockLedger {
    state: Arc<Mutex<LedgerState>>,
    relayed: Arc<Mutex<Vec<Transaction>>>,
    relay_error: Arc<Mutex<Option<String>>>,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    pub fn new() -> Self {
        let mut decimals = HashMap::new();
        decimals.insert(NEO.hash(), NEO.decimals);
        decimals.insert(GAS.hash(), GAS.decimals);
        Self {
            state: Arc::new(Mutex::new(LedgerState {
                height: 0,
                fee_per_byte: 1_000,
                transfer_gas: TRANSFER_GAS,
                fault_transfers: false,
                decimals,
                balances: HashMap::new(),
                contracts: HashMap::new(),
            })),
            relayed: Arc::new(Mutex::new(Vec::new())),
            relay_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn set_height(&self, height: u32) {
        self.state.lock().height = height;
    }

    pub fn set_fee_per_byte(&self, fee_per_byte: i64) {
        self.state.lock().fee_per_byte = fee_per_byte;
    }

    pub fn set_transfer_gas(&self, gas: i64) {
        self.state.lock().transfer_gas = gas;
    }

    /// Make every `transfer` call return false.
    pub fn fault_transfers(&self, fault: bool) {
        self.state.lock().fault_transfers = fault;
    }

    pub fn set_balance(&self, asset: ScriptHash, account: ScriptHash, value: i128) {
        self.state.lock().balances.insert((asset, account), value);
    }

    pub fn balance(&self, asset: &ScriptHash, account: &ScriptHash) -> i128 {
        self.state.lock().balance(asset, account)
    }

    pub fn set_contract_script(&self, account: ScriptHash, script: Vec<u8>) {
        self.state.lock().contracts.insert(account, script);
    }

    /// Fail subsequent relays with `message`.
    pub fn fail_relay(&self, message: &str) {
        *self.relay_error.lock() = Some(message.to_string());
    }

    pub fn relayed(&self) -> Vec<Transaction> {
        self.relayed.lock().clone()
    }
}

impl LedgerEngine for MockLedger {
    fn snapshot(&self) -> Arc<dyn LedgerSnapshot> {
        Arc::new(MockSnapshot {
            state: self.state.lock().clone(),
        })
    }

    fn relay(&self, tx: &Transaction) -> Result<(), EngineError> {
        if let Some(message) = self.relay_error.lock().clone() {
            return Err(EngineError(message));
        }
        if tx.witnesses.is_empty() {
            return Err(EngineError("transaction has no witnesses".into()));
        }
        let mut state = self.state.lock();
        let fees = tx.system_fee as i128 + tx.network_fee as i128;
        let gas = state.balance(&GAS.hash(), &tx.sender);
        if gas < fees {
            return Err(EngineError("insufficient GAS for fees".into()));
        }
        state.balances.insert((GAS.hash(), tx.sender), gas - fees);

        // Fees are burned first; a faulting script keeps only that.
        let mut staged = state.clone();
        if Interpreter::new(&mut staged, true).run(&tx.script).is_ok() {
            *state = staged;
        }
        self.relayed.lock().push(tx.clone());
        Ok(())
    }
}

/// Frozen copy of the ledger state at snapshot time.
pub struct MockSnapshot {
    state: LedgerState,
}

impl LedgerSnapshot for MockSnapshot {
    fn height(&self) -> u32 {
        self.state.height
    }

    fn fee_per_byte(&self) -> i64 {
        self.state.fee_per_byte
    }

    fn contract_script(&self, hash: &ScriptHash) -> Option<Vec<u8>> {
        self.state.contracts.get(hash).cloned()
    }

    fn simulate(
        &self,
        script: &[u8],
        container: Option<&Transaction>,
        _extra_gas: i64,
    ) -> Result<SimulationResult, EngineError> {
        let gas_consumed = match container {
            Some(_) => self.state.transfer_gas,
            None => QUERY_GAS,
        };
        let mut scratch = self.state.clone();
        let outcome = Interpreter::new(&mut scratch, false).run(script);
        Ok(match outcome {
            Ok(stack) => SimulationResult {
                state: VmState::Halt,
                stack,
                gas_consumed,
            },
            Err(_) => SimulationResult {
                state: VmState::Fault,
                stack: Vec::new(),
                gas_consumed,
            },
        })
    }
}

// =============================================================================
// INTERPRETER
// =============================================================================

struct Interpreter<'a> {
    state: &'a mut LedgerState,
    apply: bool,
    stack: Vec<StackItem>,
}

impl<'a> Interpreter<'a> {
    fn new(state: &'a mut LedgerState, apply: bool) -> Self {
        Self {
            state,
            apply,
            stack: Vec::new(),
        }
    }

    fn pop(&mut self) -> Result<StackItem, String> {
        self.stack.pop().ok_or_else(|| "stack underflow".to_string())
    }

    fn pop_int(&mut self) -> Result<i128, String> {
        self.pop()?
            .as_integer()
            .ok_or_else(|| "expected integer".to_string())
    }

    fn pop_bytes(&mut self) -> Result<Vec<u8>, String> {
        match self.pop()? {
            StackItem::ByteString(bytes) => Ok(bytes),
            other => Err(format!("expected byte string, got {:?}", other)),
        }
    }

    fn run(mut self, script: &[u8]) -> Result<Vec<StackItem>, String> {
        let mut i = 0;
        let take = |i: &mut usize, n: usize| -> Result<Vec<u8>, String> {
            let bytes = script
                .get(*i..*i + n)
                .ok_or_else(|| "truncated script".to_string())?
                .to_vec();
            *i += n;
            Ok(bytes)
        };
        while i < script.len() {
            let op = script[i];
            i += 1;
            match op {
                0x00 => self.stack.push(StackItem::Integer(0)),
                0x01..=0x4B => {
                    let bytes = take(&mut i, op as usize)?;
                    self.stack.push(StackItem::ByteString(bytes));
                }
                0x4C => {
                    let n = take(&mut i, 1)?[0] as usize;
                    let bytes = take(&mut i, n)?;
                    self.stack.push(StackItem::ByteString(bytes));
                }
                0x4D => {
                    let raw = take(&mut i, 2)?;
                    let n = u16::from_le_bytes([raw[0], raw[1]]) as usize;
                    let bytes = take(&mut i, n)?;
                    self.stack.push(StackItem::ByteString(bytes));
                }
                0x4F => self.stack.push(StackItem::Integer(-1)),
                0x50 => self.stack.push(StackItem::Null),
                0x51..=0x60 => self.stack.push(StackItem::Integer((op - 0x50) as i128)),
                x if x == OpCode::NOP.0 => {}
                x if x == OpCode::ADD.0 => {
                    let b = self.pop_int()?;
                    let a = self.pop_int()?;
                    self.stack.push(StackItem::Integer(a + b));
                }
                x if x == OpCode::PACK.0 => {
                    let n = self.pop_int()?;
                    let mut items = Vec::new();
                    for _ in 0..n {
                        items.push(self.pop()?);
                    }
                    self.stack.push(StackItem::Array(items));
                }
                x if x == OpCode::THROWIFNOT.0 => {
                    if !self.pop()?.as_bool() {
                        return Err("THROWIFNOT".into());
                    }
                }
                x if x == OpCode::SYSCALL.0 => {
                    let raw = take(&mut i, 4)?;
                    let id = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
                    if id != interop::id(interop::CONTRACT_CALL) {
                        return Err(format!("unsupported syscall {:08x}", id));
                    }
                    let hash = ScriptHash::from_slice(&self.pop_bytes()?)
                        .map_err(|e| e.to_string())?;
                    let method = String::from_utf8(self.pop_bytes()?)
                        .map_err(|e| e.to_string())?;
                    let args = match self.pop()? {
                        StackItem::Array(args) => args,
                        other => return Err(format!("expected argument array, got {:?}", other)),
                    };
                    let result = self.call(&hash, &method, &args)?;
                    self.stack.push(result);
                }
                other => return Err(format!("unsupported opcode {:02x}", other)),
            }
        }
        Ok(self.stack)
    }

    fn call(&mut self, asset: &ScriptHash, method: &str, args: &[StackItem]) -> Result<StackItem, String> {
        let decimals = *self
            .state
            .decimals
            .get(asset)
            .ok_or_else(|| format!("no contract at {}", asset))?;
        let account = |item: Option<&StackItem>| -> Result<ScriptHash, String> {
            match item {
                Some(StackItem::ByteString(bytes)) => {
                    ScriptHash::from_slice(bytes).map_err(|e| e.to_string())
                }
                other => Err(format!("expected account, got {:?}", other)),
            }
        };
        match method {
            "decimals" => Ok(StackItem::Integer(decimals as i128)),
            "balanceOf" => {
                let holder = account(args.first())?;
                Ok(StackItem::Integer(self.state.balance(asset, &holder)))
            }
            "transfer" => {
                let from = account(args.first())?;
                let to = account(args.get(1))?;
                let amount = args
                    .get(2)
                    .and_then(StackItem::as_integer)
                    .ok_or_else(|| "expected amount".to_string())?;
                let available = self.state.balance(asset, &from);
                if self.state.fault_transfers || amount < 0 || available < amount {
                    return Ok(StackItem::Boolean(false));
                }
                if self.apply {
                    self.state.balances.insert((*asset, from), available - amount);
                    let credited = self.state.balance(asset, &to) + amount;
                    self.state.balances.insert((*asset, to), credited);
                }
                Ok(StackItem::Boolean(true))
            }
            other => Err(format!("unknown method {}", other)),
        }
    }
}
