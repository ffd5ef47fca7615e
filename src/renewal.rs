use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::installment::Installment;
use crate::interest::PenaltyEngine;
use crate::loan::{Loan, LoanTerms};
use crate::schedule::ScheduleGenerator;
use crate::types::{AmortizationMethod, LoanId, LoanStatus, RateBasis, Term};

/// terms of the successor loan; its principal is derived, not supplied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewalTerms {
    pub rate: Rate,
    pub rate_basis: RateBasis,
    pub term: Term,
    pub disbursement_date: NaiveDate,
    pub method: AmortizationMethod,
    pub total_interest: Option<Money>,
}

impl RenewalTerms {
    pub fn flat_monthly(annual_rate: Rate, months: u32, disbursement_date: NaiveDate) -> Self {
        Self {
            rate: annual_rate,
            rate_basis: RateBasis::Annual,
            term: Term::months(months),
            disbursement_date,
            method: AmortizationMethod::Flat,
            total_interest: None,
        }
    }

    pub fn into_loan_terms(self, principal: Money) -> LoanTerms {
        LoanTerms {
            principal,
            rate: self.rate,
            rate_basis: self.rate_basis,
            term: self.term,
            disbursement_date: self.disbursement_date,
            method: self.method,
            total_interest: self.total_interest,
        }
    }
}

/// what rolling a loan over would carry into its successor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalQuote {
    pub loan_id: LoanId,
    pub as_of: NaiveDate,
    pub outstanding_principal: Money,
    pub outstanding_interest: Money,
    pub outstanding_penalty: Money,
}

impl RenewalQuote {
    /// unpaid principal + interest + penalty across the whole schedule
    pub fn renewal_amount(&self) -> Money {
        self.outstanding_principal + self.outstanding_interest + self.outstanding_penalty
    }
}

/// outcome of a renewal, to be committed as one unit
#[derive(Debug, Clone, PartialEq)]
pub struct RenewalResult {
    pub closed_loan_id: LoanId,
    /// predecessor marked renewed, pointing at its successor
    pub renewed_loan: Loan,
    /// predecessor's installments, frozen with penalty brought up to date
    pub frozen_installments: Vec<Installment>,
    pub new_loan: Loan,
    pub new_installments: Vec<Installment>,
    pub quote: RenewalQuote,
    pub new_disbursement: Money,
}

/// rolls an active loan's outstanding balance into a new loan
#[derive(Debug, Clone, Default)]
pub struct RenewalCalculator {
    penalty: PenaltyEngine,
    generator: ScheduleGenerator,
}

impl RenewalCalculator {
    pub fn new(penalty: PenaltyEngine) -> Self {
        Self {
            penalty,
            generator: ScheduleGenerator::new(),
        }
    }

    /// preview the renewal amount without changing anything
    pub fn quote(&self, loan: &Loan, installments: &[Installment], as_of: NaiveDate) -> Result<RenewalQuote> {
        ensure_renewable(loan)?;
        let mut working = installments.to_vec();
        self.penalty.accrue_all(&mut working, as_of)?;
        Ok(quote_of(loan.id, &working, as_of))
    }

    /// renew `loan`: new principal = outstanding balance + `new_disbursement`
    pub fn renew(
        &self,
        loan: &Loan,
        installments: &[Installment],
        new_disbursement: Money,
        new_terms: RenewalTerms,
        as_of: NaiveDate,
    ) -> Result<RenewalResult> {
        if let Err(err) = ensure_renewable(loan) {
            warn!(loan_id = %loan.id, error = %err, "renewal refused");
            return Err(err);
        }
        if new_disbursement.is_negative() {
            return Err(LoanError::InvalidPrincipal { amount: new_disbursement });
        }

        let mut frozen = installments.to_vec();
        self.penalty.accrue_all(&mut frozen, as_of)?;
        let quote = quote_of(loan.id, &frozen, as_of);
        let new_principal = quote.renewal_amount() + new_disbursement;

        let (mut new_loan, schedule) = Loan::originate(
            loan.borrower.clone(),
            new_terms.into_loan_terms(new_principal),
            &self.generator,
        )?;
        new_loan.renewed_from_loan_id = Some(loan.id);

        let mut renewed_loan = loan.clone();
        renewed_loan.transition(LoanStatus::Renewed)?;
        renewed_loan.renewed_into_loan_id = Some(new_loan.id);

        info!(
            loan_id = %loan.id,
            successor_id = %new_loan.id,
            rolled_over = %quote.renewal_amount(),
            new_disbursement = %new_disbursement,
            new_principal = %new_principal,
            "loan renewed"
        );

        Ok(RenewalResult {
            closed_loan_id: loan.id,
            renewed_loan,
            frozen_installments: frozen,
            new_loan,
            new_installments: schedule.into_installments(),
            quote,
            new_disbursement,
        })
    }
}

fn ensure_renewable(loan: &Loan) -> Result<()> {
    match loan.status {
        LoanStatus::Active => Ok(()),
        LoanStatus::Renewed => Err(LoanError::AlreadyRenewed { loan_id: loan.id }),
        LoanStatus::Closed => Err(LoanError::LoanClosed {
            loan_id: loan.id,
            status: loan.status,
        }),
    }
}

fn quote_of(loan_id: LoanId, installments: &[Installment], as_of: NaiveDate) -> RenewalQuote {
    RenewalQuote {
        loan_id,
        as_of,
        outstanding_principal: installments.iter().map(|i| i.principal_balance()).sum(),
        outstanding_interest: installments.iter().map(|i| i.interest_balance()).sum(),
        outstanding_penalty: installments.iter().map(|i| i.penalty_balance()).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::PaymentAllocator;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn loan() -> (Loan, Vec<Installment>) {
        let terms = LoanTerms::flat_monthly(Money::from_major(60_000), Rate::from_percentage(12), 6, date(2024, 1, 5))
            .with_total_interest(Money::from_major(3_600));
        let (loan, schedule) = Loan::originate("rosa garcia", terms, &ScheduleGenerator::new()).unwrap();
        (loan, schedule.into_installments())
    }

    #[test]
    fn test_new_principal_is_outstanding_plus_disbursement() {
        let (loan, installments) = loan();
        // two of six installments (10,600 each) paid
        let paid = PaymentAllocator::default()
            .allocate(&loan, &installments, Money::from_major(21_200), None, date(2024, 3, 5))
            .unwrap();

        let result = RenewalCalculator::default()
            .renew(
                &loan,
                &paid.updated_installments,
                Money::from_major(20_000),
                RenewalTerms::flat_monthly(Rate::from_percentage(12), 12, date(2024, 3, 10)),
                date(2024, 3, 10),
            )
            .unwrap();

        assert_eq!(result.quote.outstanding_principal, Money::from_major(40_000));
        assert_eq!(result.quote.outstanding_interest, Money::from_major(2_400));
        assert_eq!(result.quote.renewal_amount(), Money::from_major(42_400));
        assert_eq!(result.new_loan.principal(), Money::from_major(62_400));
        assert_eq!(result.new_installments.len(), 12);

        assert_eq!(result.closed_loan_id, loan.id);
        assert_eq!(result.renewed_loan.status, LoanStatus::Renewed);
        assert_eq!(result.renewed_loan.renewed_into_loan_id, Some(result.new_loan.id));
        assert_eq!(result.new_loan.renewed_from_loan_id, Some(loan.id));
    }

    #[test]
    fn test_renewed_loan_is_unpayable() {
        let (loan, installments) = loan();
        let result = RenewalCalculator::default()
            .renew(
                &loan,
                &installments,
                Money::ZERO,
                RenewalTerms::flat_monthly(Rate::from_percentage(12), 6, date(2024, 2, 1)),
                date(2024, 2, 1),
            )
            .unwrap();

        assert_eq!(result.new_loan.principal(), Money::from_major(63_600));

        let err = PaymentAllocator::default()
            .allocate(&result.renewed_loan, &result.frozen_installments, Money::from_major(100), None, date(2024, 2, 2))
            .unwrap_err();
        assert!(matches!(err, LoanError::LoanClosed { .. }));
    }

    #[test]
    fn test_second_renewal_rejected() {
        let (loan, installments) = loan();
        let calc = RenewalCalculator::default();
        let terms = RenewalTerms::flat_monthly(Rate::from_percentage(12), 6, date(2024, 2, 1));

        let first = calc.renew(&loan, &installments, Money::ZERO, terms.clone(), date(2024, 2, 1)).unwrap();
        let err = calc
            .renew(&first.renewed_loan, &first.frozen_installments, Money::ZERO, terms, date(2024, 2, 1))
            .unwrap_err();
        assert_eq!(err, LoanError::AlreadyRenewed { loan_id: loan.id });
    }

    #[test]
    fn test_quote_includes_penalty() {
        use crate::interest::PenaltyPolicy;
        use rust_decimal_macros::dec;

        let (loan, installments) = loan();
        let calc = RenewalCalculator::new(PenaltyEngine::new(PenaltyPolicy::DailyRate {
            daily_rate: Rate::from_decimal(dec!(0.001)),
            grace_days: 0,
        }));

        // #1 (10,600) due 2024-02-05, five days late
        let quote = calc.quote(&loan, &installments, date(2024, 2, 10)).unwrap();
        assert_eq!(quote.outstanding_penalty, Money::from_major(53));
        assert_eq!(quote.renewal_amount(), Money::from_major(63_653));

        // quoting mutates nothing
        assert_eq!(installments[0].penalty_accrued, Money::ZERO);
    }

    #[test]
    fn test_fully_paid_with_no_disbursement_rejected() {
        let (loan, installments) = loan();
        let paid = PaymentAllocator::default()
            .allocate(&loan, &installments, Money::from_major(63_600), None, date(2024, 1, 20))
            .unwrap();

        let err = RenewalCalculator::default()
            .renew(
                &loan,
                &paid.updated_installments,
                Money::ZERO,
                RenewalTerms::flat_monthly(Rate::from_percentage(12), 6, date(2024, 2, 1)),
                date(2024, 2, 1),
            )
            .unwrap_err();
        assert!(matches!(err, LoanError::InvalidPrincipal { .. }));
    }
}
