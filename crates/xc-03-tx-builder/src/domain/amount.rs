//! Fixed-point token amounts: raw integer plus the asset's decimal count.

use super::errors::BuildError;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Amount {
    pub value: i128,
    pub decimals: u8,
}

fn pow10(decimals: u8) -> Option<i128> {
    10i128.checked_pow(decimals as u32)
}

impl Amount {
    pub fn new(value: i128, decimals: u8) -> Self {
        Self { value, decimals }
    }

    pub fn zero() -> Self {
        Self::new(0, 0)
    }

    /// Parse a non-negative decimal string with at most `decimals` places.
    pub fn parse(text: &str, decimals: u8) -> Result<Self, BuildError> {
        let invalid = || BuildError::InvalidArgument(format!("invalid quantity {:?}", text));
        let text = text.trim();
        let (int_part, frac_part) = match text.split_once('.') {
            Some((i, f)) => (i, f.trim_end_matches('0')),
            None => (text, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() && !text.contains('0') {
            return Err(invalid());
        }
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) || frac_part.len() > decimals as usize {
            return Err(invalid());
        }

        let scale = pow10(decimals).ok_or_else(invalid)?;
        let int_value: i128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid())?
        };
        let frac_value: i128 = if frac_part.is_empty() {
            0
        } else {
            let raw: i128 = frac_part.parse().map_err(|_| invalid())?;
            raw * pow10(decimals - frac_part.len() as u8).ok_or_else(invalid)?
        };
        let value = int_value
            .checked_mul(scale)
            .and_then(|v| v.checked_add(frac_value))
            .ok_or_else(invalid)?;
        Ok(Self { value, decimals })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = match pow10(self.decimals) {
            Some(s) if self.decimals > 0 => s,
            _ => return write!(f, "{}", self.value),
        };
        let sign = if self.value < 0 { "-" } else { "" };
        let abs = self.value.unsigned_abs();
        let scale = scale as u128;
        let (whole, frac) = (abs / scale, abs % scale);
        if frac == 0 {
            return write!(f, "{}{}", sign, whole);
        }
        let frac = format!("{:0>width$}", frac, width = self.decimals as usize);
        write!(f, "{}{}.{}", sign, whole, frac.trim_end_matches('0'))
    }
}
