pub mod allocator;
pub mod cash;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::types::{AllocationBreakdown, CheckReference, InstallmentId, LoanId, PaymentId};

pub use allocator::{AllocationResult, InstallmentAllocation, PaymentAllocator};
pub use cash::{CashCount, DenominationCount};

/// how a payment was tendered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash { count: Option<CashCount> },
    Check(CheckReference),
}

/// receipt numbers issued for a payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReceiptReference {
    pub pr_number: Option<String>,
    pub or_number: Option<String>,
}

/// payment request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub loan_id: LoanId,
    pub amount: Money,
    /// start allocation at this installment instead of the oldest unpaid one
    pub target_installment: Option<InstallmentId>,
    pub method: PaymentMethod,
    pub receipt: ReceiptReference,
    pub remarks: String,
}

impl PaymentRequest {
    pub fn cash(loan_id: LoanId, amount: Money) -> Self {
        Self {
            loan_id,
            amount,
            target_installment: None,
            method: PaymentMethod::Cash { count: None },
            receipt: ReceiptReference::default(),
            remarks: String::new(),
        }
    }

    pub fn check(loan_id: LoanId, amount: Money, check: CheckReference) -> Self {
        Self {
            method: PaymentMethod::Check(check),
            ..Self::cash(loan_id, amount)
        }
    }

    pub fn targeting(mut self, installment_id: InstallmentId) -> Self {
        self.target_installment = Some(installment_id);
        self
    }

    pub fn with_cash_count(mut self, count: CashCount) -> Self {
        self.method = PaymentMethod::Cash { count: Some(count) };
        self
    }

    pub fn with_receipt(mut self, pr_number: Option<String>, or_number: Option<String>) -> Self {
        self.receipt = ReceiptReference { pr_number, or_number };
        self
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = remarks.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_positive() {
            return Err(LoanError::InvalidPaymentAmount { amount: self.amount });
        }
        if let PaymentMethod::Cash { count: Some(count) } = &self.method {
            let counted = count.total();
            if counted != self.amount {
                return Err(LoanError::CashCountMismatch {
                    counted,
                    amount: self.amount,
                });
            }
        }
        Ok(())
    }
}

/// stored payment with its allocation, kept for audit and never recomputed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub loan_id: LoanId,
    pub target_installment: Option<InstallmentId>,
    pub amount: Money,
    pub method: PaymentMethod,
    pub receipt: ReceiptReference,
    pub remarks: String,
    pub received_at: DateTime<Utc>,
    pub allocation: AllocationBreakdown,
    pub lines: Vec<InstallmentAllocation>,
    pub leftover_credit: Money,
}

impl Payment {
    pub fn record(request: PaymentRequest, result: &AllocationResult, received_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            loan_id: request.loan_id,
            target_installment: request.target_installment,
            amount: request.amount,
            method: request.method,
            receipt: request.receipt,
            remarks: request.remarks,
            received_at,
            allocation: result.breakdown,
            lines: result.lines.clone(),
            leftover_credit: result.leftover_credit,
        }
    }

    pub fn is_check(&self) -> bool {
        matches!(self.method, PaymentMethod::Check(_))
    }
}
