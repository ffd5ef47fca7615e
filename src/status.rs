//! status derivation. Nothing here is stored: statuses are recomputed from
//! balances and the as-of date on every read.

use chrono::NaiveDate;

use crate::calendar::days_past;
use crate::installment::Installment;
use crate::loan::Loan;
use crate::types::{InstallmentStatus, LoanStanding, LoanStatus};

/// status of one installment as of a date
pub fn derive_status(installment: &Installment, as_of: NaiveDate) -> InstallmentStatus {
    if installment.is_paid() {
        InstallmentStatus::Paid
    } else if as_of > installment.due_date {
        InstallmentStatus::Overdue
    } else if as_of > installment.period_start {
        // inside the billing period (period_start, due_date]
        InstallmentStatus::Current
    } else {
        InstallmentStatus::Upcoming
    }
}

/// loan standing from its installments alone: closed when every
/// installment is paid, overdue when any is, active otherwise
pub fn derive_loan_status(installments: &[Installment], as_of: NaiveDate) -> LoanStanding {
    let mut all_paid = true;
    for installment in installments {
        match derive_status(installment, as_of) {
            InstallmentStatus::Overdue => return LoanStanding::Overdue,
            InstallmentStatus::Paid => {}
            _ => all_paid = false,
        }
    }
    if all_paid {
        LoanStanding::Closed
    } else {
        LoanStanding::Active
    }
}

/// standing of a stored loan; renewal and closure on the record win over
/// what the installments say
pub fn loan_standing(loan: &Loan, installments: &[Installment], as_of: NaiveDate) -> LoanStanding {
    match loan.status {
        LoanStatus::Renewed => LoanStanding::Renewed,
        LoanStatus::Closed => LoanStanding::Closed,
        LoanStatus::Active => derive_loan_status(installments, as_of),
    }
}

/// days the oldest unpaid installment is past due
pub fn days_past_due(installments: &[Installment], as_of: NaiveDate) -> u32 {
    installments
        .iter()
        .filter(|i| !i.is_paid())
        .map(|i| days_past(i.due_date, as_of))
        .max()
        .unwrap_or(0)
}

/// earliest unpaid installment not yet past due
pub fn next_due(installments: &[Installment], as_of: NaiveDate) -> Option<&Installment> {
    installments
        .iter()
        .filter(|i| !i.is_paid() && i.due_date >= as_of)
        .min_by_key(|i| (i.due_date, i.sequence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::{Money, Rate};
    use crate::loan::LoanTerms;
    use crate::schedule::ScheduleGenerator;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// three monthly installments due 02-10, 03-10, 04-10
    fn schedule() -> (Loan, Vec<Installment>) {
        let terms = LoanTerms::flat_monthly(Money::from_major(30_000), Rate::from_percentage(12), 3, date(2024, 1, 10));
        let loan = Loan::new("pedro reyes", terms.clone(), Money::from_major(900));
        let installments = ScheduleGenerator::new().generate(loan.id, &terms).unwrap().into_installments();
        (loan, installments)
    }

    #[test]
    fn test_installment_statuses() {
        let (_, installments) = schedule();
        let as_of = date(2024, 2, 20);

        assert_eq!(derive_status(&installments[0], as_of), InstallmentStatus::Overdue);
        assert_eq!(derive_status(&installments[1], as_of), InstallmentStatus::Current);
        assert_eq!(derive_status(&installments[2], as_of), InstallmentStatus::Upcoming);
    }

    #[test]
    fn test_due_date_itself_is_current() {
        let (_, installments) = schedule();
        assert_eq!(derive_status(&installments[0], date(2024, 2, 10)), InstallmentStatus::Current);
        assert_eq!(derive_status(&installments[0], date(2024, 2, 11)), InstallmentStatus::Overdue);
        // on the grant date nothing is in its billing period yet
        assert_eq!(derive_status(&installments[0], date(2024, 1, 10)), InstallmentStatus::Upcoming);
    }

    #[test]
    fn test_paid_wins_over_dates() {
        let (_, mut installments) = schedule();
        installments[0].principal_paid = installments[0].principal_due;
        installments[0].interest_paid = installments[0].interest_due;
        assert_eq!(derive_status(&installments[0], date(2025, 1, 1)), InstallmentStatus::Paid);
    }

    #[test]
    fn test_derivation_is_pure() {
        let (_, installments) = schedule();
        let as_of = date(2024, 3, 1);
        let first = derive_status(&installments[1], as_of);
        let second = derive_status(&installments[1], as_of);
        assert_eq!(first, second);
        assert_eq!(derive_loan_status(&installments, as_of), derive_loan_status(&installments, as_of));
    }

    #[test]
    fn test_loan_level_aggregation() {
        let (loan, mut installments) = schedule();

        assert_eq!(derive_loan_status(&installments, date(2024, 2, 1)), LoanStanding::Active);
        assert_eq!(derive_loan_status(&installments, date(2024, 2, 11)), LoanStanding::Overdue);

        for inst in installments.iter_mut() {
            inst.principal_paid = inst.principal_due;
            inst.interest_paid = inst.interest_due;
        }
        assert_eq!(derive_loan_status(&installments, date(2024, 9, 1)), LoanStanding::Closed);
        assert_eq!(loan_standing(&loan, &installments, date(2024, 9, 1)), LoanStanding::Closed);
    }

    #[test]
    fn test_renewed_loan_standing() {
        let (mut loan, installments) = schedule();
        loan.transition(LoanStatus::Renewed).unwrap();
        assert_eq!(loan_standing(&loan, &installments, date(2024, 6, 1)), LoanStanding::Renewed);
    }

    #[test]
    fn test_days_past_due_and_next_due() {
        let (_, installments) = schedule();
        let as_of = date(2024, 3, 15);

        assert_eq!(days_past_due(&installments, as_of), 34);
        assert_eq!(next_due(&installments, as_of).map(|i| i.sequence), Some(3));
        assert_eq!(days_past_due(&installments, date(2024, 2, 1)), 0);
    }
}
