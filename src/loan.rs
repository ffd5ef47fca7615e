use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::{add_days, add_months_clamped};
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::schedule::{Schedule, ScheduleGenerator};
use crate::types::{AmortizationMethod, CheckReference, LoanId, LoanStatus, RateBasis, Term, TermUnit};

/// longest span a schedule may cover, in months from disbursement
pub const MAX_TERM_MONTHS: u32 = 1_200;

/// terms a loan is granted on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub rate: Rate,
    pub rate_basis: RateBasis,
    pub term: Term,
    pub disbursement_date: NaiveDate,
    pub method: AmortizationMethod,
    /// externally computed total interest; overrides the rate for flat loans
    pub total_interest: Option<Money>,
}

impl LoanTerms {
    /// flat-rate monthly terms with an annual rate
    pub fn flat_monthly(principal: Money, annual_rate: Rate, months: u32, disbursement_date: NaiveDate) -> Self {
        Self {
            principal,
            rate: annual_rate,
            rate_basis: RateBasis::Annual,
            term: Term::months(months),
            disbursement_date,
            method: AmortizationMethod::Flat,
            total_interest: None,
        }
    }

    /// use an externally computed interest total
    pub fn with_total_interest(mut self, total_interest: Money) -> Self {
        self.total_interest = Some(total_interest);
        self
    }

    pub fn with_method(mut self, method: AmortizationMethod) -> Self {
        self.method = method;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.term.count == 0 {
            return Err(LoanError::InvalidTerm { count: self.term.count as i64 });
        }
        self.check_term_span()?;
        if self.rate.is_negative() {
            return Err(LoanError::InvalidRate { rate: self.rate });
        }
        if !self.principal.is_positive() {
            return Err(LoanError::InvalidPrincipal { amount: self.principal });
        }
        if let Some(total) = self.total_interest {
            if total.is_negative() {
                return Err(LoanError::InvalidConfiguration {
                    message: format!("total interest cannot be negative: {}", total),
                });
            }
        }
        Ok(())
    }

    /// the final due date must exist and fall within `MAX_TERM_MONTHS`
    fn check_term_span(&self) -> Result<()> {
        let invalid = || LoanError::InvalidTerm { count: self.term.count as i64 };
        let last_due = match self.term.unit {
            TermUnit::Months => add_months_clamped(self.disbursement_date, self.term.count),
            TermUnit::Days => add_days(self.disbursement_date, self.term.count),
        }
        .map_err(|_| invalid())?;
        let limit = add_months_clamped(self.disbursement_date, MAX_TERM_MONTHS).map_err(|_| invalid())?;
        if last_due > limit {
            return Err(invalid());
        }
        Ok(())
    }
}

/// loan record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub borrower: String,
    pub terms: LoanTerms,
    /// interest across the whole schedule, fixed at generation
    pub total_interest: Money,
    /// originating bank/check of the disbursement
    pub disbursement_check: Option<CheckReference>,
    pub status: LoanStatus,
    pub renewed_from_loan_id: Option<LoanId>,
    pub renewed_into_loan_id: Option<LoanId>,
}

impl Loan {
    pub fn new(borrower: impl Into<String>, terms: LoanTerms, total_interest: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            borrower: borrower.into(),
            terms,
            total_interest,
            disbursement_check: None,
            status: LoanStatus::Active,
            renewed_from_loan_id: None,
            renewed_into_loan_id: None,
        }
    }

    /// create a loan and its schedule together; the loan's interest total is
    /// whatever the schedule generated
    pub fn originate(
        borrower: impl Into<String>,
        terms: LoanTerms,
        generator: &ScheduleGenerator,
    ) -> Result<(Self, Schedule)> {
        let mut loan = Loan::new(borrower, terms, Money::ZERO);
        let schedule = generator.generate(loan.id, &loan.terms)?;
        loan.total_interest = schedule.total_interest;
        Ok((loan, schedule))
    }

    pub fn with_disbursement_check(mut self, check: CheckReference) -> Self {
        self.disbursement_check = Some(check);
        self
    }

    pub fn principal(&self) -> Money {
        self.terms.principal
    }

    /// move to a new status, rejecting reversals
    pub fn transition(&mut self, next: LoanStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(LoanError::InvalidStatusTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// payments are only accepted against active loans
    pub fn ensure_payable(&self) -> Result<()> {
        match self.status {
            LoanStatus::Active => Ok(()),
            status => Err(LoanError::LoanClosed { loan_id: self.id, status }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms() -> LoanTerms {
        LoanTerms::flat_monthly(
            Money::from_major(50_000),
            Rate::from_percentage(12),
            6,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        )
    }

    #[test]
    fn test_terms_validation() {
        assert!(terms().validate().is_ok());

        let mut zero_term = terms();
        zero_term.term.count = 0;
        assert_eq!(zero_term.validate(), Err(LoanError::InvalidTerm { count: 0 }));

        let mut negative_rate = terms();
        negative_rate.rate = Rate::from_decimal(rust_decimal_macros::dec!(-0.01));
        assert!(matches!(negative_rate.validate(), Err(LoanError::InvalidRate { .. })));

        let mut no_principal = terms();
        no_principal.principal = Money::ZERO;
        assert!(matches!(no_principal.validate(), Err(LoanError::InvalidPrincipal { .. })));
    }

    #[test]
    fn test_term_span_is_bounded() {
        let mut t = terms();
        t.term = Term::months(MAX_TERM_MONTHS);
        assert!(t.validate().is_ok());

        t.term = Term::months(MAX_TERM_MONTHS + 1);
        assert_eq!(t.validate(), Err(LoanError::InvalidTerm { count: MAX_TERM_MONTHS as i64 + 1 }));

        // overflows the calendar outright
        t.term = Term::months(2_000_000_000);
        assert!(matches!(t.validate(), Err(LoanError::InvalidTerm { .. })));

        t.term = Term::days(50_000);
        assert!(matches!(t.validate(), Err(LoanError::InvalidTerm { .. })));
        t.term = Term::days(u32::MAX);
        assert!(matches!(t.validate(), Err(LoanError::InvalidTerm { .. })));
    }

    #[test]
    fn test_days_term() {
        let mut t = terms();
        t.term = Term::days(45);
        assert_eq!(t.term.unit, TermUnit::Days);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_originate_builds_schedule() {
        let (loan, schedule) = Loan::originate("ana lim", terms(), &ScheduleGenerator::new()).unwrap();
        assert_eq!(schedule.loan_id, loan.id);
        assert_eq!(schedule.len(), 6);
        // 50,000 * 12% * 6/12
        assert_eq!(loan.total_interest, Money::from_major(3_000));
        assert_eq!(loan.status, LoanStatus::Active);
    }

    #[test]
    fn test_loan_transitions_are_one_way() {
        let mut loan = Loan::new("juan dela cruz", terms(), Money::from_major(3_000));
        assert!(loan.ensure_payable().is_ok());

        loan.transition(LoanStatus::Renewed).unwrap();
        assert!(matches!(loan.ensure_payable(), Err(LoanError::LoanClosed { .. })));
        assert!(matches!(
            loan.transition(LoanStatus::Active),
            Err(LoanError::InvalidStatusTransition { .. })
        ));
    }
}
