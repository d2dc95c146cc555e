//! # Fee Arithmetic
//!
//! Must agree exactly with the ledger engine's own validation, so every
//! value here is integer arithmetic in the fee asset's smallest unit.
//!
//! ## Network fee contribution of the sender's witness
//!
//! | Shape | Size | Verification cost |
//! |-------|------|-------------------|
//! | signature | `66 + var_size(script)` | `PUSHBYTES64 + PUSHBYTES33 + CheckSig` |
//! | M-of-N | `var_int(65M) + 65M + var_size(script)` | `M*PUSHBYTES64 + push(M) + N*PUSHBYTES33 + push(N) + M*CheckSig` |
//! | other | 0 | 0 |

use shared_types::{push_int_opcode, var_bytes_size, var_int_size, OpCode, WitnessShape};

/// Opcode prices and engine constants used for fee calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeSchedule {
    /// PUSH0, PUSHM1, PUSH1..PUSH16, PUSHNULL
    pub push_int_price: i64,
    /// PUSHBYTES1..PUSHBYTES75
    pub push_bytes_price: i64,
    pub push_data1_price: i64,
    pub push_data2_price: i64,
    pub push_data4_price: i64,
    /// Neo.Crypto.CheckSig interop price
    pub check_sig_price: i64,
    /// Execution cost that is not charged as system fee
    pub gas_free: i64,
    /// System fee is rounded up to a multiple of this (1 GAS)
    pub gas_factor: i64,
    pub max_valid_until_block_increment: u32,
    /// Extra budget granted to balance queries
    pub balance_query_gas: i64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            push_int_price: 30,
            push_bytes_price: 120,
            push_data1_price: 180,
            push_data2_price: 13_000,
            push_data4_price: 110_000,
            check_sig_price: 1_000_000,
            gas_free: 0,
            gas_factor: 100_000_000,
            max_valid_until_block_increment: 2_102_400,
            balance_query_gas: 20_000_000,
        }
    }
}

impl FeeSchedule {
    pub fn opcode_price(&self, op: OpCode) -> i64 {
        match op.0 {
            0x00 | 0x4F..=0x60 => self.push_int_price,
            0x01..=0x4B => self.push_bytes_price,
            0x4C => self.push_data1_price,
            0x4D => self.push_data2_price,
            0x4E => self.push_data4_price,
            _ => 0,
        }
    }

    /// `max(consumed - free, 0)` rounded up to a multiple of `gas_factor`.
    pub fn system_fee(&self, gas_consumed: i64) -> i64 {
        let fee = (gas_consumed - self.gas_free).max(0);
        if fee == 0 {
            return 0;
        }
        let remainder = fee % self.gas_factor;
        if remainder > 0 {
            fee + self.gas_factor - remainder
        } else if remainder < 0 {
            fee - remainder
        } else {
            fee
        }
    }

    /// Extra bytes and verification cost of the sender's witness.
    pub fn witness_cost(&self, witness_script: &[u8]) -> (usize, i64) {
        let push64 = self.opcode_price(OpCode::PUSHBYTES64);
        let push33 = self.opcode_price(OpCode::PUSHBYTES33);
        match WitnessShape::detect(witness_script) {
            WitnessShape::Signature(_) => (
                66 + var_bytes_size(witness_script.len()),
                push64 + push33 + self.check_sig_price,
            ),
            WitnessShape::MultiSig { m, n, .. } => {
                let invocation = 65 * m;
                let size = var_int_size(invocation) + invocation + var_bytes_size(witness_script.len());
                let fee = push64 * m as i64
                    + self.opcode_price(push_int_opcode(m as i128))
                    + push33 * n as i64
                    + self.opcode_price(push_int_opcode(n as i128))
                    + self.check_sig_price * m as i64;
                (size, fee)
            }
            WitnessShape::Unknown => (0, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use shared_crypto::{KeyPair, PublicKey};
    use shared_types::Contract;

    fn keys(n: usize) -> Vec<PublicKey> {
        (0..n).map(|i| KeyPair::from_bytes([i as u8 + 1; 32]).unwrap().public_key()).collect()
    }

    #[test]
    fn test_system_fee_rounds_up_to_whole_gas() {
        let schedule = FeeSchedule::default();
        assert_eq!(schedule.system_fee(0), 0);
        assert_eq!(schedule.system_fee(-5), 0);
        assert_eq!(schedule.system_fee(1), 100_000_000);
        assert_eq!(schedule.system_fee(100_000_000), 100_000_000);
        assert_eq!(schedule.system_fee(100_000_001), 200_000_000);
    }

    #[test]
    fn test_system_fee_subtracts_free_allowance() {
        let schedule = FeeSchedule {
            gas_free: 10,
            ..Default::default()
        };
        assert_eq!(schedule.system_fee(10), 0);
        assert_eq!(schedule.system_fee(11), 100_000_000);
    }

    #[test]
    fn test_signature_witness_cost() {
        let schedule = FeeSchedule::default();
        let script = Contract::signature(&keys(1)[0]).script;
        let (size, fee) = schedule.witness_cost(&script);
        assert_eq!(size, 66 + 40);
        assert_eq!(fee, 120 + 120 + 1_000_000);
    }

    #[test]
    fn test_multi_sig_witness_cost() {
        let schedule = FeeSchedule::default();
        let script = Contract::multi_sig(3, &keys(4)).unwrap().script;
        let (size, fee) = schedule.witness_cost(&script);
        assert_eq!(size, 1 + 195 + var_bytes_size(script.len()));
        assert_eq!(fee, 3 * 120 + 30 + 4 * 120 + 30 + 3 * 1_000_000);
    }

    #[test]
    fn test_unknown_shape_is_free() {
        let schedule = FeeSchedule::default();
        assert_eq!(schedule.witness_cost(&[0x61; 12]), (0, 0));
        assert_eq!(schedule.witness_cost(&[]), (0, 0));
    }

    proptest! {
        #[test]
        fn prop_network_fee_monotonic_in_threshold(n in 1usize..=7, fee_per_byte in 0i64..5_000) {
            let schedule = FeeSchedule::default();
            let members = keys(n);
            let mut previous = i64::MIN;
            for m in 1..=n {
                let script = Contract::multi_sig(m, &members).unwrap().script;
                let (size, fee) = schedule.witness_cost(&script);
                let total = fee + size as i64 * fee_per_byte;
                prop_assert!(total >= previous);
                previous = total;
            }
        }

        #[test]
        fn prop_system_fee_is_whole_gas_and_covers_cost(consumed in 0i64..10_000_000_000) {
            let schedule = FeeSchedule::default();
            let fee = schedule.system_fee(consumed);
            prop_assert_eq!(fee % schedule.gas_factor, 0);
            prop_assert!(fee >= consumed);
            prop_assert!(fee - consumed < schedule.gas_factor);
        }
    }
}
