use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::types::LoanStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoanError {
    #[error("invalid term: {count} must be greater than zero")]
    InvalidTerm {
        count: i64,
    },

    #[error("invalid interest rate: {rate}")]
    InvalidRate {
        rate: Rate,
    },

    #[error("invalid date range: {end} is before {start}")]
    InvalidDateRange {
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("loan {loan_id} does not accept payments: status is {status:?}")]
    LoanClosed {
        loan_id: Uuid,
        status: LoanStatus,
    },

    #[error("overpayment not allowed: payment {amount} exceeds outstanding {outstanding}")]
    OverpaymentNotAllowed {
        amount: Money,
        outstanding: Money,
    },

    #[error("loan {loan_id} already renewed")]
    AlreadyRenewed {
        loan_id: Uuid,
    },

    #[error("invalid principal: {amount}")]
    InvalidPrincipal {
        amount: Money,
    },

    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: Uuid,
    },

    #[error("installment not found: {id}")]
    InstallmentNotFound {
        id: Uuid,
    },

    #[error("check line not found: {id}")]
    PdcLineNotFound {
        id: Uuid,
    },

    #[error("invalid status transition: {from:?} -> {to:?}")]
    InvalidStatusTransition {
        from: LoanStatus,
        to: LoanStatus,
    },

    #[error("check {check_number} already cleared")]
    CheckAlreadyCleared {
        check_number: String,
    },

    #[error("cash count mismatch: counted {counted}, payment {amount}")]
    CashCountMismatch {
        counted: Money,
        amount: Money,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("calculation error: {message}")]
    CalculationError {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, LoanError>;
