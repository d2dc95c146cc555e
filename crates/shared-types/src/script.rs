//! # Verification and Invocation Scripts
//!
//! Opcode constants, a `ScriptBuilder` that emits the ledger VM's push and
//! call sequences, and recognition of the two standard witness shapes:
//!
//! ```text
//! signature:  PUSHBYTES33 <key> SYSCALL <CheckSig>
//! multi-sig:  PUSH<m> (PUSHBYTES33 <key>)* PUSH<n> SYSCALL <CheckMultiSig>
//! ```

use crate::errors::TypeError;
use crate::hashes::ScriptHash;
use serde::{Deserialize, Serialize};
use shared_crypto::{PublicKey, PUBLIC_KEY_LENGTH};

// =============================================================================
// OPCODES
// =============================================================================

/// A single VM instruction byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OpCode(pub u8);

impl OpCode {
    pub const PUSH0: OpCode = OpCode(0x00);
    pub const PUSHBYTES1: OpCode = OpCode(0x01);
    pub const PUSHBYTES20: OpCode = OpCode(0x14);
    pub const PUSHBYTES33: OpCode = OpCode(0x21);
    pub const PUSHBYTES64: OpCode = OpCode(0x40);
    pub const PUSHBYTES75: OpCode = OpCode(0x4B);
    pub const PUSHDATA1: OpCode = OpCode(0x4C);
    pub const PUSHDATA2: OpCode = OpCode(0x4D);
    pub const PUSHDATA4: OpCode = OpCode(0x4E);
    pub const PUSHM1: OpCode = OpCode(0x4F);
    pub const PUSHNULL: OpCode = OpCode(0x50);
    pub const PUSH1: OpCode = OpCode(0x51);
    pub const PUSH16: OpCode = OpCode(0x60);
    pub const NOP: OpCode = OpCode(0x61);
    pub const SYSCALL: OpCode = OpCode(0x68);
    pub const ADD: OpCode = OpCode(0x93);
    pub const PACK: OpCode = OpCode(0xC1);
    pub const THROWIFNOT: OpCode = OpCode(0xF1);
}

/// First opcode emitted by `ScriptBuilder::emit_push_int(value)`.
pub fn push_int_opcode(value: i128) -> OpCode {
    match value {
        -1 => OpCode::PUSHM1,
        0 => OpCode::PUSH0,
        1..=16 => OpCode(OpCode::PUSH1.0 + (value as u8) - 1),
        _ => OpCode(minimal_le_bytes(value).len() as u8),
    }
}

/// Minimal little-endian two's-complement encoding.
fn minimal_le_bytes(value: i128) -> Vec<u8> {
    let mut bytes = value.to_le_bytes().to_vec();
    while bytes.len() > 1 {
        let last = bytes[bytes.len() - 1];
        let prev = bytes[bytes.len() - 2];
        let redundant = (last == 0x00 && prev & 0x80 == 0) || (last == 0xFF && prev & 0x80 != 0);
        if !redundant {
            break;
        }
        bytes.pop();
    }
    bytes
}

/// Interop service names and their 4-byte syscall ids.
pub mod interop {
    use shared_crypto::sha256;

    pub const CONTRACT_CALL: &str = "System.Contract.Call";
    pub const CHECK_SIG: &str = "Neo.Crypto.CheckSig";
    pub const CHECK_MULTISIG: &str = "Neo.Crypto.CheckMultiSig";
    pub const NATIVE_CALL: &str = "Neo.Native.Call";

    /// Syscall id: first four bytes of SHA-256(name), little-endian.
    pub fn id(name: &str) -> u32 {
        let digest = sha256(name.as_bytes());
        u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
    }
}

// =============================================================================
// SCRIPT BUILDER
// =============================================================================

/// Argument to a contract call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractArg {
    Integer(i128),
    Hash160(ScriptHash),
    Bytes(Vec<u8>),
    String(String),
    Boolean(bool),
}

#[derive(Debug, Default, Clone)]
pub struct ScriptBuilder {
    script: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, op: OpCode) -> &mut Self {
        self.script.push(op.0);
        self
    }

    pub fn emit_push_int(&mut self, value: i128) -> &mut Self {
        match value {
            -1..=16 => self.emit(push_int_opcode(value)),
            _ => {
                let bytes = minimal_le_bytes(value);
                self.emit_push_bytes(&bytes)
            }
        }
    }

    pub fn emit_push_bytes(&mut self, data: &[u8]) -> &mut Self {
        let len = data.len();
        if len <= OpCode::PUSHBYTES75.0 as usize {
            self.script.push(len as u8);
        } else if len <= u8::MAX as usize {
            self.emit(OpCode::PUSHDATA1);
            self.script.push(len as u8);
        } else if len <= u16::MAX as usize {
            self.emit(OpCode::PUSHDATA2);
            self.script.extend_from_slice(&(len as u16).to_le_bytes());
        } else {
            self.emit(OpCode::PUSHDATA4);
            self.script.extend_from_slice(&(len as u32).to_le_bytes());
        }
        self.script.extend_from_slice(data);
        self
    }

    pub fn emit_push_str(&mut self, s: &str) -> &mut Self {
        self.emit_push_bytes(s.as_bytes())
    }

    pub fn emit_push_arg(&mut self, arg: &ContractArg) -> &mut Self {
        match arg {
            ContractArg::Integer(v) => self.emit_push_int(*v),
            ContractArg::Hash160(h) => self.emit_push_bytes(h.as_bytes()),
            ContractArg::Bytes(b) => self.emit_push_bytes(b),
            ContractArg::String(s) => self.emit_push_str(s),
            ContractArg::Boolean(b) => self.emit(if *b { OpCode::PUSH1 } else { OpCode::PUSH0 }),
        }
    }

    pub fn emit_syscall(&mut self, name: &str) -> &mut Self {
        self.emit(OpCode::SYSCALL);
        self.script.extend_from_slice(&interop::id(name).to_le_bytes());
        self
    }

    /// Call `method` on the contract at `hash` with `args`.
    pub fn emit_app_call(&mut self, hash: &ScriptHash, method: &str, args: &[ContractArg]) -> &mut Self {
        for arg in args.iter().rev() {
            self.emit_push_arg(arg);
        }
        self.emit_push_int(args.len() as i128)
            .emit(OpCode::PACK)
            .emit_push_str(method)
            .emit_push_bytes(hash.as_bytes())
            .emit_syscall(interop::CONTRACT_CALL)
    }

    pub fn len(&self) -> usize {
        self.script.len()
    }

    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.script.clone()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.script
    }
}

// =============================================================================
// CONTRACTS
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractParameterType {
    Signature,
    Boolean,
    Integer,
    Hash160,
    Hash256,
    ByteArray,
    PublicKey,
    String,
    Array,
    Any,
}

/// Verification script plus the parameter list its invocation must supply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contract {
    pub script: Vec<u8>,
    pub parameter_list: Vec<ContractParameterType>,
}

impl Contract {
    pub fn new(script: Vec<u8>, parameter_list: Vec<ContractParameterType>) -> Self {
        Self {
            script,
            parameter_list,
        }
    }

    pub fn signature(key: &PublicKey) -> Self {
        let mut sb = ScriptBuilder::new();
        sb.emit_push_bytes(key.as_bytes())
            .emit_syscall(interop::CHECK_SIG);
        Self::new(sb.into_bytes(), vec![ContractParameterType::Signature])
    }

    /// M-of-N contract; member keys are sorted before emission.
    pub fn multi_sig(m: usize, keys: &[PublicKey]) -> Result<Self, TypeError> {
        if m == 0 || m > keys.len() || keys.len() > 1024 {
            return Err(TypeError::Format(format!(
                "invalid multi-signature threshold {} of {}",
                m,
                keys.len()
            )));
        }
        let mut sorted = keys.to_vec();
        sorted.sort();
        let mut sb = ScriptBuilder::new();
        sb.emit_push_int(m as i128);
        for key in &sorted {
            sb.emit_push_bytes(key.as_bytes());
        }
        sb.emit_push_int(sorted.len() as i128)
            .emit_syscall(interop::CHECK_MULTISIG);
        Ok(Self::new(
            sb.into_bytes(),
            vec![ContractParameterType::Signature; m],
        ))
    }

    pub fn script_hash(&self) -> ScriptHash {
        ScriptHash::from_script(&self.script)
    }

    pub fn shape(&self) -> WitnessShape {
        WitnessShape::detect(&self.script)
    }
}

// =============================================================================
// WITNESS SHAPES
// =============================================================================

/// Recognised verification-script layouts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WitnessShape {
    Signature(PublicKey),
    MultiSig {
        m: usize,
        n: usize,
        keys: Vec<PublicKey>,
    },
    Unknown,
}

impl WitnessShape {
    pub fn detect(script: &[u8]) -> Self {
        if let Some(key) = parse_signature(script) {
            return WitnessShape::Signature(key);
        }
        match parse_multi_sig(script) {
            Some((m, n, keys)) => WitnessShape::MultiSig { m, n, keys },
            None => WitnessShape::Unknown,
        }
    }

    /// Number of signatures the script requires.
    pub fn required_signatures(&self) -> usize {
        match self {
            WitnessShape::Signature(_) => 1,
            WitnessShape::MultiSig { m, .. } => *m,
            WitnessShape::Unknown => 0,
        }
    }

    /// Member keys in script order.
    pub fn keys(&self) -> Vec<PublicKey> {
        match self {
            WitnessShape::Signature(k) => vec![*k],
            WitnessShape::MultiSig { keys, .. } => keys.clone(),
            WitnessShape::Unknown => Vec::new(),
        }
    }
}

fn syscall_tail(script: &[u8], at: usize, name: &str) -> bool {
    script.len() == at + 5
        && script[at] == OpCode::SYSCALL.0
        && script[at + 1..at + 5] == interop::id(name).to_le_bytes()
}

fn parse_signature(script: &[u8]) -> Option<PublicKey> {
    if script.len() != 39 || script[0] != OpCode::PUSHBYTES33.0 {
        return None;
    }
    if !syscall_tail(script, 34, interop::CHECK_SIG) {
        return None;
    }
    PublicKey::from_slice(&script[1..34]).ok()
}

/// Read a small pushed integer at `*i`, advancing past it.
fn read_push_int(script: &[u8], i: &mut usize) -> Option<usize> {
    let op = *script.get(*i)?;
    match op {
        0x51..=0x60 => {
            *i += 1;
            Some((op - OpCode::PUSH1.0 + 1) as usize)
        }
        0x01 => {
            let v = *script.get(*i + 1)? as usize;
            *i += 2;
            Some(v)
        }
        0x02 => {
            let v = u16::from_le_bytes([*script.get(*i + 1)?, *script.get(*i + 2)?]) as usize;
            *i += 3;
            Some(v)
        }
        _ => None,
    }
}

fn parse_multi_sig(script: &[u8]) -> Option<(usize, usize, Vec<PublicKey>)> {
    if script.len() < 41 {
        return None;
    }
    let mut i = 0;
    let m = read_push_int(script, &mut i)?;
    let mut keys = Vec::new();
    while script.get(i) == Some(&OpCode::PUSHBYTES33.0) {
        let raw = script.get(i + 1..i + 1 + PUBLIC_KEY_LENGTH)?;
        keys.push(PublicKey::from_slice(raw).ok()?);
        i += 1 + PUBLIC_KEY_LENGTH;
    }
    let n = read_push_int(script, &mut i)?;
    if n != keys.len() || m < 1 || m > n {
        return None;
    }
    if !syscall_tail(script, i, interop::CHECK_MULTISIG) {
        return None;
    }
    Some((m, n, keys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::KeyPair;

    fn keys(n: usize) -> Vec<PublicKey> {
        (0..n).map(|_| KeyPair::generate().public_key()).collect()
    }

    #[test]
    fn test_push_int_encoding() {
        let mut sb = ScriptBuilder::new();
        sb.emit_push_int(-1).emit_push_int(0).emit_push_int(16).emit_push_int(17);
        assert_eq!(sb.to_bytes(), vec![0x4F, 0x00, 0x60, 0x01, 0x11]);

        let mut sb = ScriptBuilder::new();
        sb.emit_push_int(128);
        assert_eq!(sb.to_bytes(), vec![0x02, 0x80, 0x00]);

        let mut sb = ScriptBuilder::new();
        sb.emit_push_int(-129);
        assert_eq!(sb.to_bytes(), vec![0x02, 0x7F, 0xFF]);
    }

    #[test]
    fn test_push_int_opcode_matches_emission() {
        for v in [-1i128, 0, 5, 16, 17, 300, 100_000_000] {
            let mut sb = ScriptBuilder::new();
            sb.emit_push_int(v);
            assert_eq!(sb.to_bytes()[0], push_int_opcode(v).0, "value {}", v);
        }
    }

    #[test]
    fn test_push_bytes_prefixes() {
        let mut sb = ScriptBuilder::new();
        sb.emit_push_bytes(&[0u8; 75]);
        assert_eq!(sb.to_bytes()[0], 75);

        let mut sb = ScriptBuilder::new();
        sb.emit_push_bytes(&[0u8; 76]);
        assert_eq!(&sb.to_bytes()[..2], &[0x4C, 76]);

        let mut sb = ScriptBuilder::new();
        sb.emit_push_bytes(&[0u8; 300]);
        assert_eq!(&sb.to_bytes()[..3], &[0x4D, 0x2C, 0x01]);
    }

    #[test]
    fn test_app_call_layout() {
        let hash = ScriptHash([9u8; 20]);
        let mut sb = ScriptBuilder::new();
        sb.emit_app_call(&hash, "decimals", &[]);
        let script = sb.into_bytes();
        assert_eq!(script[0], OpCode::PUSH0.0);
        assert_eq!(script[1], OpCode::PACK.0);
        assert_eq!(script[2], 8);
        assert_eq!(&script[3..11], b"decimals");
        assert_eq!(script[11], 20);
        assert_eq!(&script[12..32], &[9u8; 20]);
        assert_eq!(script[32], OpCode::SYSCALL.0);
        assert_eq!(script.len(), 37);
    }

    #[test]
    fn test_signature_contract_shape() {
        let key = KeyPair::generate().public_key();
        let contract = Contract::signature(&key);
        assert_eq!(contract.script.len(), 39);
        assert_eq!(contract.script[0], 0x21);
        assert_eq!(contract.script[34], OpCode::SYSCALL.0);
        assert_eq!(contract.shape(), WitnessShape::Signature(key));
        assert_eq!(contract.shape().required_signatures(), 1);
    }

    #[test]
    fn test_multi_sig_contract_shape() {
        let members = keys(4);
        let contract = Contract::multi_sig(3, &members).unwrap();
        let mut sorted = members.clone();
        sorted.sort();
        assert_eq!(
            contract.shape(),
            WitnessShape::MultiSig {
                m: 3,
                n: 4,
                keys: sorted
            }
        );
        assert_eq!(contract.parameter_list.len(), 3);
    }

    #[test]
    fn test_multi_sig_key_order_independent() {
        let members = keys(4);
        let mut reversed = members.clone();
        reversed.reverse();
        assert_eq!(
            Contract::multi_sig(3, &members).unwrap().script_hash(),
            Contract::multi_sig(3, &reversed).unwrap().script_hash()
        );
    }

    #[test]
    fn test_multi_sig_rejects_bad_threshold() {
        let members = keys(2);
        assert!(Contract::multi_sig(0, &members).is_err());
        assert!(Contract::multi_sig(3, &members).is_err());
    }

    #[test]
    fn test_unknown_shape() {
        assert_eq!(WitnessShape::detect(&[0x61, 0x61]), WitnessShape::Unknown);
        let mut script = Contract::signature(&keys(1)[0]).script;
        script.push(0x61);
        assert_eq!(WitnessShape::detect(&script), WitnessShape::Unknown);
    }

    #[test]
    fn test_interop_ids_differ() {
        assert_ne!(interop::id(interop::CHECK_SIG), interop::id(interop::CHECK_MULTISIG));
    }
}
