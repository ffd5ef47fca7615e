use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for an installment
pub type InstallmentId = Uuid;

/// unique identifier for a payment
pub type PaymentId = Uuid;

/// stored loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// performing or in arrears, accepts payments
    Active,
    /// balance rolled into a successor loan
    Renewed,
    /// fully settled
    Closed,
}

impl LoanStatus {
    /// only active -> renewed and active -> closed are allowed
    pub fn can_transition_to(self, next: LoanStatus) -> bool {
        matches!(
            (self, next),
            (LoanStatus::Active, LoanStatus::Renewed) | (LoanStatus::Active, LoanStatus::Closed)
        )
    }
}

/// status of a single installment, derived on every read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstallmentStatus {
    Upcoming,
    Current,
    Overdue,
    Paid,
}

/// loan-level standing, derived from its installments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStanding {
    Active,
    Overdue,
    Closed,
    Renewed,
}

/// unit of the loan term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermUnit {
    Months,
    Days,
}

/// loan term: count of periods and their unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub count: u32,
    pub unit: TermUnit,
}

impl Term {
    pub fn months(count: u32) -> Self {
        Self { count, unit: TermUnit::Months }
    }

    pub fn days(count: u32) -> Self {
        Self { count, unit: TermUnit::Days }
    }
}

/// amortization method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmortizationMethod {
    /// total interest computed once on the original principal, split evenly
    Flat,
    /// equal principal, interest on the outstanding principal each period
    DecliningBalance,
}

/// how the quoted rate is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateBasis {
    /// per year, prorated by months/12 or days/365
    Annual,
    /// add-on rate charged per period
    PerPeriod,
}

/// what happens to money left after every candidate installment is settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OverpaymentMode {
    /// keep the remainder as unapplied credit on the payment
    #[default]
    RecordCredit,
    /// reject the whole payment
    Reject,
}

/// check details for check payments and post-dated checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReference {
    pub bank: String,
    pub check_number: String,
    pub check_date: NaiveDate,
}

/// split of one payment (or one installment's share of it) across components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AllocationBreakdown {
    pub to_penalty: Money,
    pub to_interest: Money,
    pub to_principal: Money,
}

impl AllocationBreakdown {
    pub fn total_applied(&self) -> Money {
        self.to_penalty + self.to_interest + self.to_principal
    }

    pub fn absorb(&mut self, other: &AllocationBreakdown) {
        self.to_penalty += other.to_penalty;
        self.to_interest += other.to_interest;
        self.to_principal += other.to_principal;
    }
}
