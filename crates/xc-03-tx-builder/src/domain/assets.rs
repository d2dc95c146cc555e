//! # Native Assets
//!
//! The two well-known tokens and how symbolic names resolve to contract
//! script hashes. A native contract's hash is the script hash of the
//! script that invokes it: `PUSH <service name>; SYSCALL Neo.Native.Call`.

use super::errors::BuildError;
use shared_types::{interop, ScriptBuilder, ScriptHash};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NativeAsset {
    pub symbol: &'static str,
    pub service: &'static str,
    pub decimals: u8,
}

pub const NEO: NativeAsset = NativeAsset {
    symbol: "NEO",
    service: "Neo.Native.Tokens.NEO",
    decimals: 0,
};

/// Fee-paying asset.
pub const GAS: NativeAsset = NativeAsset {
    symbol: "GAS",
    service: "Neo.Native.Tokens.GAS",
    decimals: 8,
};

impl NativeAsset {
    pub fn script(&self) -> Vec<u8> {
        let mut sb = ScriptBuilder::new();
        sb.emit_push_str(self.service)
            .emit_syscall(interop::NATIVE_CALL);
        sb.into_bytes()
    }

    pub fn hash(&self) -> ScriptHash {
        ScriptHash::from_script(&self.script())
    }
}

/// `neo` / `gas` (any case), otherwise a literal script hash.
pub fn resolve_asset(token: &str) -> Result<ScriptHash, BuildError> {
    let token = token.trim();
    if token.eq_ignore_ascii_case(NEO.symbol) {
        return Ok(NEO.hash());
    }
    if token.eq_ignore_ascii_case(GAS.symbol) {
        return Ok(GAS.hash());
    }
    ScriptHash::parse(token)
        .map_err(|e| BuildError::InvalidArgument(format!("unknown asset {:?}: {}", token, e)))
}
