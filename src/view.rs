//! serializable read models. Every total here is re-derived from the
//! installment, payment and check records on each build.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::installment::Installment;
use crate::loan::Loan;
use crate::payments::Payment;
use crate::pdc::{PdcLine, PdcTotals};
use crate::status::{days_past_due, derive_status, loan_standing, next_due};
use crate::types::{
    AmortizationMethod, InstallmentId, InstallmentStatus, LoanId, LoanStanding, LoanStatus, Term,
};

/// serializable view of a loan as of a date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanView {
    pub id: LoanId,
    pub borrower: String,
    pub as_of: NaiveDate,
    pub standing: LoanStanding,
    pub status: LoanStatus,
    pub terms: TermsView,
    pub renewed_from_loan_id: Option<LoanId>,
    pub renewed_into_loan_id: Option<LoanId>,
    pub installments: Vec<InstallmentView>,
    pub totals: LoanTotals,
    pub days_past_due: u32,
    pub next_due: Option<NextDueView>,
    pub payment_count: usize,
    pub checks: Vec<PdcLine>,
    pub check_totals: PdcTotals,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermsView {
    pub principal: Money,
    pub rate: Rate,
    pub term: Term,
    pub method: AmortizationMethod,
    pub disbursement_date: NaiveDate,
    pub total_interest: Money,
}

/// one schedule row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentView {
    pub id: InstallmentId,
    pub sequence: u32,
    pub due_date: NaiveDate,
    pub principal_due: Money,
    pub interest_due: Money,
    pub penalty_accrued: Money,
    pub amortization: Money,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub penalty_paid: Money,
    pub balance: Money,
    pub status: InstallmentStatus,
}

/// schedule footer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTotals {
    pub principal_due: Money,
    pub interest_due: Money,
    pub penalty_accrued: Money,
    pub amortization: Money,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub penalty_paid: Money,
    pub total_paid: Money,
    pub outstanding: Money,
    /// unapplied amounts carried on payments
    pub leftover_credit: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextDueView {
    pub sequence: u32,
    pub due_date: NaiveDate,
    pub amount: Money,
}

impl InstallmentView {
    pub fn from_installment(installment: &Installment, as_of: NaiveDate) -> Self {
        InstallmentView {
            id: installment.id,
            sequence: installment.sequence,
            due_date: installment.due_date,
            principal_due: installment.principal_due,
            interest_due: installment.interest_due,
            penalty_accrued: installment.penalty_accrued,
            amortization: installment.amortization(),
            principal_paid: installment.principal_paid,
            interest_paid: installment.interest_paid,
            penalty_paid: installment.penalty_paid,
            balance: installment.balance(),
            status: derive_status(installment, as_of),
        }
    }
}

impl LoanTotals {
    pub fn of(installments: &[Installment], payments: &[Payment]) -> Self {
        let mut totals = installments.iter().fold(LoanTotals::default(), |mut acc, i| {
            acc.principal_due += i.principal_due;
            acc.interest_due += i.interest_due;
            acc.penalty_accrued += i.penalty_accrued;
            acc.amortization += i.amortization();
            acc.principal_paid += i.principal_paid;
            acc.interest_paid += i.interest_paid;
            acc.penalty_paid += i.penalty_paid;
            acc.total_paid += i.total_paid();
            acc.outstanding += i.balance();
            acc
        });
        totals.leftover_credit = payments.iter().map(|p| p.leftover_credit).sum();
        totals
    }
}

impl LoanView {
    pub fn build(
        loan: &Loan,
        installments: &[Installment],
        payments: &[Payment],
        checks: Vec<PdcLine>,
        as_of: NaiveDate,
    ) -> Self {
        let check_totals = PdcTotals::of(&checks);
        LoanView {
            id: loan.id,
            borrower: loan.borrower.clone(),
            as_of,
            standing: loan_standing(loan, installments, as_of),
            status: loan.status,
            terms: TermsView {
                principal: loan.principal(),
                rate: loan.terms.rate,
                term: loan.terms.term,
                method: loan.terms.method,
                disbursement_date: loan.terms.disbursement_date,
                total_interest: loan.total_interest,
            },
            renewed_from_loan_id: loan.renewed_from_loan_id,
            renewed_into_loan_id: loan.renewed_into_loan_id,
            installments: installments
                .iter()
                .map(|i| InstallmentView::from_installment(i, as_of))
                .collect(),
            totals: LoanTotals::of(installments, payments),
            days_past_due: days_past_due(installments, as_of),
            next_due: next_due(installments, as_of).map(|i| NextDueView {
                sequence: i.sequence,
                due_date: i.due_date,
                amount: i.balance(),
            }),
            payment_count: payments.len(),
            checks,
            check_totals,
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::LoanTerms;
    use crate::payments::PaymentAllocator;
    use crate::schedule::ScheduleGenerator;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_footer_totals_follow_installments() {
        let terms = LoanTerms::flat_monthly(Money::from_major(30_000), Rate::from_percentage(12), 3, date(2024, 1, 10));
        let (loan, schedule) = Loan::originate("carmen tan", terms, &ScheduleGenerator::new()).unwrap();
        let installments = schedule.into_installments();

        // #1 is 10,300
        let result = PaymentAllocator::default()
            .allocate(&loan, &installments, Money::from_major(12_000), None, date(2024, 2, 20))
            .unwrap();

        let view = LoanView::build(&loan, &result.updated_installments, &[], Vec::new(), date(2024, 2, 20));

        assert_eq!(view.totals.principal_due, Money::from_major(30_000));
        assert_eq!(view.totals.interest_due, Money::from_major(900));
        assert_eq!(view.totals.total_paid, Money::from_major(12_000));
        assert_eq!(view.totals.outstanding, Money::from_major(18_900));
        assert_eq!(view.installments[0].status, InstallmentStatus::Paid);
        assert_eq!(view.installments[1].status, InstallmentStatus::Current);
        assert_eq!(view.standing, LoanStanding::Active);
        assert_eq!(view.days_past_due, 0);

        let next = view.next_due.as_ref().unwrap();
        assert_eq!(next.sequence, 2);
        assert_eq!(next.amount, Money::from_major(8_600));

        let json: serde_json::Value = serde_json::from_str(&view.to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["installments"].as_array().map(|rows| rows.len()), Some(3));
        assert_eq!(json["standing"], "Active");
    }
}
