pub mod generator;

use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::installment::Installment;
use crate::types::{AmortizationMethod, LoanId};

pub use generator::{flat_total_interest, ScheduleGenerator};

/// ordered installment schedule of one loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub loan_id: LoanId,
    pub method: AmortizationMethod,
    pub installments: Vec<Installment>,
    pub total_principal: Money,
    pub total_interest: Money,
}

impl Schedule {
    pub(crate) fn from_installments(
        loan_id: LoanId,
        method: AmortizationMethod,
        installments: Vec<Installment>,
    ) -> Self {
        let total_principal = installments.iter().map(|i| i.principal_due).sum();
        let total_interest = installments.iter().map(|i| i.interest_due).sum();
        Self {
            loan_id,
            method,
            installments,
            total_principal,
            total_interest,
        }
    }

    /// installment by 1-based sequence number
    pub fn get(&self, sequence: u32) -> Option<&Installment> {
        sequence
            .checked_sub(1)
            .and_then(|idx| self.installments.get(idx as usize))
    }

    pub fn len(&self) -> usize {
        self.installments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installments.is_empty()
    }

    pub fn total_amortization(&self) -> Money {
        self.total_principal + self.total_interest
    }

    pub fn into_installments(self) -> Vec<Installment> {
        self.installments
    }
}
