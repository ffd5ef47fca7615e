use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::interest::{DiscountCalculator, PdcDiscount};
use crate::types::{CheckReference, LoanId, PaymentId};

/// what a post-dated check belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PdcOwner {
    /// check used to disburse a loan
    Disbursement(LoanId),
    /// check collected as payment
    Collection(PaymentId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PdcStatus {
    Pending,
    Cleared,
}

/// one post-dated check line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdcLine {
    pub id: Uuid,
    pub owner: PdcOwner,
    pub check: CheckReference,
    pub issue_date: NaiveDate,
    /// date the check clears
    pub due_date: NaiveDate,
    pub discount: PdcDiscount,
    pub status: PdcStatus,
}

impl PdcLine {
    pub fn new(
        owner: PdcOwner,
        check: CheckReference,
        face_amount: Money,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        calculator: &DiscountCalculator,
    ) -> Result<Self> {
        let discount = calculator.compute(face_amount, issue_date, due_date)?;
        Ok(Self {
            id: Uuid::new_v4(),
            owner,
            check,
            issue_date,
            due_date,
            discount,
            status: PdcStatus::Pending,
        })
    }

    pub fn face_amount(&self) -> Money {
        self.discount.face_amount
    }

    pub fn interest(&self) -> Money {
        self.discount.interest
    }

    pub fn net_proceeds(&self) -> Money {
        self.discount.net_proceeds
    }

    /// recompute the discount, e.g. after the bank rate changed.
    /// Cleared checks are immutable.
    pub fn recompute(&mut self, calculator: &DiscountCalculator) -> Result<()> {
        self.ensure_pending()?;
        self.discount = calculator.compute(self.discount.face_amount, self.issue_date, self.due_date)?;
        Ok(())
    }

    /// change the clearing date and recompute
    pub fn reschedule(&mut self, due_date: NaiveDate, calculator: &DiscountCalculator) -> Result<()> {
        self.ensure_pending()?;
        self.discount = calculator.compute(self.discount.face_amount, self.issue_date, due_date)?;
        self.due_date = due_date;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.ensure_pending()?;
        self.status = PdcStatus::Cleared;
        Ok(())
    }

    fn ensure_pending(&self) -> Result<()> {
        match self.status {
            PdcStatus::Pending => Ok(()),
            PdcStatus::Cleared => Err(LoanError::CheckAlreadyCleared {
                check_number: self.check.check_number.clone(),
            }),
        }
    }
}

/// footer totals over a set of check lines, derived on read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PdcTotals {
    pub check_amount: Money,
    pub interest: Money,
    pub net_proceeds: Money,
}

impl PdcTotals {
    pub fn of(lines: &[PdcLine]) -> Self {
        lines.iter().fold(PdcTotals::default(), |mut acc, line| {
            acc.check_amount += line.face_amount();
            acc.interest += line.interest();
            acc.net_proceeds += line.net_proceeds();
            acc
        })
    }
}
