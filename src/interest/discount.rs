use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::days_between_inclusive;
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};

/// result of discounting a post-dated check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdcDiscount {
    pub face_amount: Money,
    /// issue to due date, both days counted
    pub elapsed_days: u32,
    pub daily_rate: Rate,
    pub interest: Money,
    pub net_proceeds: Money,
}

/// discounts post-dated checks at a simple daily rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountCalculator {
    daily_rate: Rate,
}

impl DiscountCalculator {
    pub fn new(daily_rate: Rate) -> Result<Self> {
        if daily_rate.is_negative() {
            return Err(LoanError::InvalidRate { rate: daily_rate });
        }
        Ok(Self { daily_rate })
    }

    pub fn daily_rate(&self) -> Rate {
        self.daily_rate
    }

    /// interest = face * daily rate * (due - issue + 1);
    /// net proceeds = face - interest
    pub fn compute(&self, face_amount: Money, issue_date: NaiveDate, due_date: NaiveDate) -> Result<PdcDiscount> {
        if !face_amount.is_positive() {
            return Err(LoanError::InvalidPaymentAmount { amount: face_amount });
        }
        let elapsed_days = days_between_inclusive(issue_date, due_date)?;
        let interest = face_amount.simple_interest(self.daily_rate, Decimal::from(elapsed_days));
        let net_proceeds = face_amount - interest;

        debug!(
            face = %face_amount,
            days = elapsed_days,
            rate = %self.daily_rate,
            interest = %interest,
            "pdc discounted"
        );

        Ok(PdcDiscount {
            face_amount,
            elapsed_days,
            daily_rate: self.daily_rate,
            interest,
            net_proceeds,
        })
    }
}
