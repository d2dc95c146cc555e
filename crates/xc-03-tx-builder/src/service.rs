//! # Transaction Builder Service
//!
//! Builds unsigned transfer transactions whose declared fees the ledger
//! engine will accept. All chain reads go through the `LedgerSnapshot`
//! handle the caller passes in.

use crate::domain::amount::Amount;
use crate::domain::assets::{GAS, NEO};
use crate::domain::errors::BuildError;
use crate::domain::fees::FeeSchedule;
use crate::ports::outbound::{EngineError, LedgerSnapshot, StackItem};
use shared_types::{
    var_bytes_size, var_int_size, ContractArg, Cosigner, OpCode, ScriptBuilder, ScriptHash,
    Transaction,
};
use tracing::{debug, info};

/// Arguments of a single-asset transfer.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub asset: ScriptHash,
    pub quantity: Amount,
    pub sender: ScriptHash,
    pub receiver: ScriptHash,
    /// Sender's verification script; empty means "look it up".
    pub witness_script: Option<Vec<u8>>,
}

fn asset_label(asset: &ScriptHash) -> String {
    if *asset == GAS.hash() {
        GAS.symbol.to_string()
    } else if *asset == NEO.hash() {
        NEO.symbol.to_string()
    } else {
        asset.to_string()
    }
}

fn pop_integer(stack: &mut Vec<StackItem>) -> Result<i128, EngineError> {
    stack
        .pop()
        .and_then(|item| item.as_integer())
        .ok_or_else(|| EngineError("expected integer on result stack".into()))
}

#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    schedule: FeeSchedule,
}

impl TransactionBuilder {
    pub fn new(schedule: FeeSchedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &FeeSchedule {
        &self.schedule
    }

    /// `decimals` of the asset contract.
    pub fn asset_decimals(
        &self,
        snapshot: &dyn LedgerSnapshot,
        asset: &ScriptHash,
    ) -> Result<u8, BuildError> {
        let mut sb = ScriptBuilder::new();
        sb.emit_app_call(asset, "decimals", &[]);
        let mut result = snapshot.simulate(&sb.into_bytes(), None, self.schedule.balance_query_gas)?;
        if result.faulted() {
            return Err(BuildError::InvalidArgument(format!(
                "{} is not a token contract",
                asset
            )));
        }
        let decimals = pop_integer(&mut result.stack)?;
        u8::try_from(decimals)
            .map_err(|_| BuildError::InvalidArgument(format!("bad decimals {}", decimals)))
    }

    /// Balance of `account`; a faulted query reads as zero.
    pub fn balance_of(
        &self,
        snapshot: &dyn LedgerSnapshot,
        asset: &ScriptHash,
        account: &ScriptHash,
    ) -> Result<Amount, BuildError> {
        let mut sb = ScriptBuilder::new();
        sb.emit_push_int(0)
            .emit_app_call(asset, "balanceOf", &[ContractArg::Hash160(*account)])
            .emit(OpCode::ADD)
            .emit_app_call(asset, "decimals", &[]);

        let mut result = snapshot.simulate(&sb.into_bytes(), None, self.schedule.balance_query_gas)?;
        if result.faulted() {
            return Ok(Amount::zero());
        }
        let decimals = pop_integer(&mut result.stack)?;
        let value = pop_integer(&mut result.stack)?;
        let decimals = u8::try_from(decimals)
            .map_err(|_| EngineError(format!("bad decimals {}", decimals)))?;
        Ok(Amount::new(value, decimals))
    }

    /// `"all"` (any case) is the sender's full balance; anything else is a
    /// decimal in the asset's precision.
    pub fn resolve_quantity(
        &self,
        snapshot: &dyn LedgerSnapshot,
        asset: &ScriptHash,
        quantity: &str,
        account: &ScriptHash,
    ) -> Result<Amount, BuildError> {
        if quantity.trim().eq_ignore_ascii_case("all") {
            return self.balance_of(snapshot, asset, account);
        }
        let decimals = self.asset_decimals(snapshot, asset)?;
        Amount::parse(quantity, decimals)
    }

    pub fn build(
        &self,
        snapshot: &dyn LedgerSnapshot,
        request: &TransferRequest,
    ) -> Result<Transaction, BuildError> {
        let sender = request.sender;
        let balance = self.balance_of(snapshot, &request.asset, &sender)?;
        if balance.value < request.quantity.value {
            return Err(BuildError::InsufficientFunds {
                asset: asset_label(&request.asset),
                needed: request.quantity.to_string(),
                available: balance.to_string(),
            });
        }

        let mut sb = ScriptBuilder::new();
        sb.emit_app_call(
            &request.asset,
            "transfer",
            &[
                ContractArg::Hash160(sender),
                ContractArg::Hash160(request.receiver),
                ContractArg::Integer(request.quantity.value),
            ],
        )
        .emit(OpCode::THROWIFNOT);
        let script = sb.into_bytes();

        let gas_balance = if request.asset == GAS.hash() {
            balance
        } else {
            self.balance_of(snapshot, &GAS.hash(), &sender)?
        };

        let mut tx = Transaction {
            version: 0,
            nonce: rand::random::<u32>(),
            sender,
            system_fee: 0,
            network_fee: 0,
            valid_until_block: snapshot
                .height()
                .saturating_add(self.schedule.max_valid_until_block_increment),
            attributes: Vec::new(),
            cosigners: vec![Cosigner::called_by_entry(sender)],
            script,
            witnesses: Vec::new(),
        };

        let simulation = snapshot.simulate(&tx.script, Some(&tx), 0)?;
        if simulation.faulted() {
            return Err(BuildError::ExecutionFault {
                script: hex::encode(&tx.script),
            });
        }
        tx.system_fee = self.schedule.system_fee(simulation.gas_consumed);

        let hashes = tx.script_hashes_for_verifying();
        if hashes != [sender] {
            return Err(BuildError::InvalidOperation(format!(
                "transaction requires {} verifying accounts, expected only the sender",
                hashes.len()
            )));
        }

        let mut size = Transaction::HEADER_SIZE
            + tx.attributes_size()
            + tx.cosigners_size()
            + var_bytes_size(tx.script.len())
            + var_int_size(hashes.len());

        let witness_script = request
            .witness_script
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| snapshot.contract_script(&sender));
        if let Some(witness_script) = witness_script {
            let (extra_size, verification_fee) = self.schedule.witness_cost(&witness_script);
            size += extra_size;
            tx.network_fee += verification_fee;
        }
        tx.network_fee += size as i64 * snapshot.fee_per_byte();

        let total_fee = tx.system_fee as i128 + tx.network_fee as i128;
        if gas_balance.value < total_fee {
            return Err(BuildError::InsufficientFunds {
                asset: GAS.symbol.to_string(),
                needed: Amount::new(total_fee, GAS.decimals).to_string(),
                available: gas_balance.to_string(),
            });
        }

        debug!(size, gas_consumed = simulation.gas_consumed, "[xc-03] Fee inputs");
        info!(
            sender = %sender.to_address(),
            asset = %asset_label(&request.asset),
            quantity = %request.quantity,
            system_fee = tx.system_fee,
            network_fee = tx.network_fee,
            "[xc-03] Built transfer transaction"
        );
        Ok(tx)
    }
}
