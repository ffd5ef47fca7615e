use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, info};

use crate::calendar::{add_days, add_months_clamped};
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::installment::Installment;
use crate::loan::LoanTerms;
use crate::types::{AmortizationMethod, LoanId, RateBasis, Term, TermUnit};

use super::Schedule;

/// turns loan terms into an ordered installment schedule
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleGenerator;

impl ScheduleGenerator {
    pub fn new() -> Self {
        Self
    }

    /// generate the full schedule for `loan_id`.
    ///
    /// Principal (and interest, for flat loans) is split evenly across the
    /// periods; the final installment absorbs the remainder so the totals
    /// match to the centavo.
    pub fn generate(&self, loan_id: LoanId, terms: &LoanTerms) -> Result<Schedule> {
        terms.validate()?;

        let installments = match terms.method {
            AmortizationMethod::Flat => self.flat(loan_id, terms)?,
            AmortizationMethod::DecliningBalance => self.declining_balance(loan_id, terms)?,
        };
        let schedule = Schedule::from_installments(loan_id, terms.method, installments);

        info!(
            loan_id = %loan_id,
            method = ?terms.method,
            periods = schedule.len(),
            total_principal = %schedule.total_principal,
            total_interest = %schedule.total_interest,
            "schedule generated"
        );

        Ok(schedule)
    }

    fn flat(&self, loan_id: LoanId, terms: &LoanTerms) -> Result<Vec<Installment>> {
        let periods = terms.term.count;
        let total_interest = match terms.total_interest {
            Some(total) => total,
            None => flat_total_interest(terms.principal, terms.rate, terms.rate_basis, terms.term),
        };

        let (principal_base, principal_last) = terms.principal.split_even(periods);
        let (interest_base, interest_last) = total_interest.split_even(periods);

        let mut installments = Vec::new();
        let mut period_start = terms.disbursement_date;

        for sequence in 1..=periods {
            let due_date = due_date(terms.disbursement_date, terms.term.unit, sequence)?;
            let is_last = sequence == periods;

            installments.push(Installment::new(
                loan_id,
                sequence,
                period_start,
                due_date,
                if is_last { principal_last } else { principal_base },
                if is_last { interest_last } else { interest_base },
            ));
            period_start = due_date;
        }

        Ok(installments)
    }

    fn declining_balance(&self, loan_id: LoanId, terms: &LoanTerms) -> Result<Vec<Installment>> {
        let periods = terms.term.count;
        let periodic_rate = periodic_rate(terms.rate, terms.rate_basis, terms.term.unit);
        let (principal_base, principal_last) = terms.principal.split_even(periods);

        let mut installments = Vec::new();
        let mut outstanding = terms.principal;
        let mut period_start = terms.disbursement_date;

        for sequence in 1..=periods {
            let due_date = due_date(terms.disbursement_date, terms.term.unit, sequence)?;
            let principal_due = if sequence == periods { principal_last } else { principal_base };
            let interest_due = Money::from_decimal(outstanding.as_decimal() * periodic_rate);

            debug!(sequence, outstanding = %outstanding, interest = %interest_due, "declining balance period");

            installments.push(Installment::new(
                loan_id,
                sequence,
                period_start,
                due_date,
                principal_due,
                interest_due,
            ));
            outstanding -= principal_due;
            period_start = due_date;
        }

        Ok(installments)
    }
}

/// interest charged once over the whole term on the original principal
pub fn flat_total_interest(principal: Money, rate: Rate, basis: RateBasis, term: Term) -> Money {
    let count = Decimal::from(term.count);
    let interest = match (basis, term.unit) {
        (RateBasis::PerPeriod, _) => principal.as_decimal() * rate.as_decimal() * count,
        (RateBasis::Annual, TermUnit::Months) => principal.as_decimal() * rate.as_decimal() * count / dec!(12),
        (RateBasis::Annual, TermUnit::Days) => principal.as_decimal() * rate.as_decimal() * count / dec!(365),
    };
    Money::from_decimal(interest)
}

fn periodic_rate(rate: Rate, basis: RateBasis, unit: TermUnit) -> Decimal {
    match (basis, unit) {
        (RateBasis::PerPeriod, _) => rate.as_decimal(),
        (RateBasis::Annual, TermUnit::Months) => rate.monthly_rate().as_decimal(),
        (RateBasis::Annual, TermUnit::Days) => rate.daily_rate().as_decimal(),
    }
}

fn due_date(disbursement: NaiveDate, unit: TermUnit, sequence: u32) -> Result<NaiveDate> {
    match unit {
        TermUnit::Months => add_months_clamped(disbursement, sequence),
        TermUnit::Days => add_days(disbursement, sequence),
    }
}
