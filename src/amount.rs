//! Fixed-point token amounts

use std::cmp::Ordering;
use std::fmt;

use alloy_primitives::U256;
use serde::{Serialize, Serializer};

use crate::error::{Result, ScannerError};

/// Largest exponent whose power of ten fits in a `U256`
pub const MAX_DECIMALS: u8 = 77;

/// A token amount in base units together with the token's decimal exponent.
///
/// Formatting divides by `10^decimals` exactly, so large balances keep every digit.
#[derive(Debug, Clone, Copy)]
pub struct TokenAmount {
    raw: U256,
    decimals: u8,
}

impl TokenAmount {
    pub fn new(raw: U256, decimals: u8) -> Result<Self> {
        if decimals > MAX_DECIMALS {
            return Err(ScannerError::InvalidInput(format!(
                "token decimals {} exceed the maximum of {}",
                decimals, MAX_DECIMALS
            )));
        }
        Ok(Self { raw, decimals })
    }

    pub fn raw(&self) -> U256 {
        self.raw
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Whole units and the remaining fraction in base units
    pub fn split(&self) -> (U256, U256) {
        let divisor = U256::from(10u8).pow(U256::from(self.decimals));
        self.raw.div_rem(divisor)
    }
}

impl Ord for TokenAmount {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.decimals == other.decimals {
            return self.raw.cmp(&other.raw);
        }
        // Bring both sides to the larger exponent before comparing.
        let shift = |amount: &Self, target: u8| {
            let factor = U256::from(10u8).pow(U256::from(target - amount.decimals));
            amount.raw.checked_mul(factor)
        };
        let target = self.decimals.max(other.decimals);
        match (shift(self, target), shift(other, target)) {
            (Some(a), Some(b)) => a.cmp(&b),
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (None, None) => self.split().0.cmp(&other.split().0),
        }
    }
}

impl PartialEq for TokenAmount {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TokenAmount {}

impl PartialOrd for TokenAmount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (whole, fraction) = self.split();
        if self.decimals == 0 || fraction.is_zero() {
            return write!(f, "{}", whole);
        }
        let fraction = format!("{:0>width$}", fraction.to_string(), width = self.decimals as usize);
        write!(f, "{}.{}", whole, fraction.trim_end_matches('0'))
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
