use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::{AllocationBreakdown, InstallmentId, LoanId};

/// one scheduled obligation of a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub id: InstallmentId,
    pub loan_id: LoanId,
    /// 1-based position in the schedule
    pub sequence: u32,
    /// start of the billing period: the previous due date, or the
    /// disbursement date for the first installment
    pub period_start: NaiveDate,
    pub due_date: NaiveDate,
    pub principal_due: Money,
    pub interest_due: Money,
    /// assessed by the penalty engine, never supplied by callers
    pub penalty_accrued: Money,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub penalty_paid: Money,
    /// date penalty has been assessed up to, if ever
    pub penalty_assessed_through: Option<NaiveDate>,
}

impl Installment {
    pub fn new(
        loan_id: LoanId,
        sequence: u32,
        period_start: NaiveDate,
        due_date: NaiveDate,
        principal_due: Money,
        interest_due: Money,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            loan_id,
            sequence,
            period_start,
            due_date,
            principal_due,
            interest_due,
            penalty_accrued: Money::ZERO,
            principal_paid: Money::ZERO,
            interest_paid: Money::ZERO,
            penalty_paid: Money::ZERO,
            penalty_assessed_through: None,
        }
    }

    pub fn principal_balance(&self) -> Money {
        self.principal_due.saturating_sub(self.principal_paid)
    }

    pub fn interest_balance(&self) -> Money {
        self.interest_due.saturating_sub(self.interest_paid)
    }

    pub fn penalty_balance(&self) -> Money {
        self.penalty_accrued.saturating_sub(self.penalty_paid)
    }

    /// scheduled amortization (principal + interest)
    pub fn amortization(&self) -> Money {
        self.principal_due + self.interest_due
    }

    pub fn total_paid(&self) -> Money {
        self.principal_paid + self.interest_paid + self.penalty_paid
    }

    /// (principal due + interest due + penalty accrued) - sums paid
    pub fn balance(&self) -> Money {
        self.principal_balance() + self.interest_balance() + self.penalty_balance()
    }

    pub fn is_paid(&self) -> bool {
        self.balance().is_zero()
    }

    /// record amounts applied by the allocator
    pub(crate) fn apply(&mut self, applied: &AllocationBreakdown) {
        self.penalty_paid += applied.to_penalty;
        self.interest_paid += applied.to_interest;
        self.principal_paid += applied.to_principal;
    }
}
