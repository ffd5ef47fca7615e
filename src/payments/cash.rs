use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;

/// peso denominations accepted at the cashier, largest first
pub const DENOMINATIONS: [Decimal; 11] = [
    dec!(1000),
    dec!(500),
    dec!(200),
    dec!(100),
    dec!(50),
    dec!(20),
    dec!(10),
    dec!(5),
    dec!(1),
    dec!(0.50),
    dec!(0.25),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenominationCount {
    pub denomination: Money,
    pub count: u32,
}

/// bills and coins counted for a cash payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashCount {
    pub rows: Vec<DenominationCount>,
}

impl Default for CashCount {
    fn default() -> Self {
        Self {
            rows: DENOMINATIONS
                .iter()
                .map(|d| DenominationCount {
                    denomination: Money::from_decimal(*d),
                    count: 0,
                })
                .collect(),
        }
    }
}

impl CashCount {
    pub fn new() -> Self {
        Self::default()
    }

    /// set the count for a denomination, adding a row for unknown ones
    pub fn with(mut self, denomination: Money, count: u32) -> Self {
        match self.rows.iter_mut().find(|r| r.denomination == denomination) {
            Some(row) => row.count = count,
            None => self.rows.push(DenominationCount { denomination, count }),
        }
        self
    }

    pub fn total(&self) -> Money {
        self.rows
            .iter()
            .map(|r| r.denomination * Decimal::from(r.count))
            .sum()
    }
}
