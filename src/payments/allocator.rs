use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::installment::Installment;
use crate::interest::PenaltyEngine;
use crate::loan::Loan;
use crate::types::{AllocationBreakdown, InstallmentId, OverpaymentMode};

/// one installment's share of a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentAllocation {
    pub installment_id: InstallmentId,
    pub sequence: u32,
    pub applied: AllocationBreakdown,
}

/// outcome of allocating one payment. Nothing is committed until the
/// caller persists `updated_installments` together with the payment.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationResult {
    /// full installment set after penalty accrual and allocation, by sequence
    pub updated_installments: Vec<Installment>,
    pub lines: Vec<InstallmentAllocation>,
    pub breakdown: AllocationBreakdown,
    pub leftover_credit: Money,
    /// penalty booked while bringing the schedule up to the payment date
    pub penalty_accrued: Money,
}

impl AllocationResult {
    pub fn total_applied(&self) -> Money {
        self.breakdown.total_applied()
    }
}

#[derive(Debug, Clone, Copy)]
enum Component {
    Penalty,
    Interest,
    Principal,
}

/// component order within every installment
const WATERFALL: [Component; 3] = [Component::Penalty, Component::Interest, Component::Principal];

/// distributes payments across a loan's installments, oldest first,
/// penalty then interest then principal within each installment
#[derive(Debug, Clone, Default)]
pub struct PaymentAllocator {
    mode: OverpaymentMode,
    penalty: PenaltyEngine,
}

impl PaymentAllocator {
    pub fn new(mode: OverpaymentMode, penalty: PenaltyEngine) -> Self {
        Self { mode, penalty }
    }

    pub fn mode(&self) -> OverpaymentMode {
        self.mode
    }

    /// allocate `amount` against the loan's schedule as of `as_of`.
    ///
    /// Works on a copy of `installments`; on error the caller's state is
    /// untouched.
    pub fn allocate(
        &self,
        loan: &Loan,
        installments: &[Installment],
        amount: Money,
        target: Option<InstallmentId>,
        as_of: NaiveDate,
    ) -> Result<AllocationResult> {
        loan.ensure_payable()?;
        if !amount.is_positive() {
            return Err(LoanError::InvalidPaymentAmount { amount });
        }

        let mut working: Vec<Installment> = installments.to_vec();
        working.sort_by_key(|i| (i.due_date, i.sequence));

        let penalty_accrued = self.penalty.accrue_all(&mut working, as_of)?;

        let start = match target {
            Some(id) => working
                .iter()
                .position(|i| i.id == id)
                .ok_or(LoanError::InstallmentNotFound { id })?,
            None => 0,
        };

        let mut remaining = amount;
        let mut breakdown = AllocationBreakdown::default();
        let mut lines = Vec::new();

        for installment in working[start..].iter_mut() {
            if remaining.is_zero() {
                break;
            }
            if installment.is_paid() {
                continue;
            }

            let mut applied = AllocationBreakdown::default();
            for component in WATERFALL {
                remaining = apply_to_component(component, remaining, installment, &mut applied);
            }
            installment.apply(&applied);
            breakdown.absorb(&applied);

            debug!(
                installment = installment.sequence,
                penalty = %applied.to_penalty,
                interest = %applied.to_interest,
                principal = %applied.to_principal,
                "installment allocation"
            );

            lines.push(InstallmentAllocation {
                installment_id: installment.id,
                sequence: installment.sequence,
                applied,
            });
        }

        if remaining.is_positive() && self.mode == OverpaymentMode::Reject {
            warn!(loan_id = %loan.id, amount = %amount, excess = %remaining, "overpayment rejected");
            return Err(LoanError::OverpaymentNotAllowed {
                amount,
                outstanding: breakdown.total_applied(),
            });
        }

        working.sort_by_key(|i| i.sequence);

        Ok(AllocationResult {
            updated_installments: working,
            lines,
            breakdown,
            leftover_credit: remaining,
            penalty_accrued,
        })
    }
}

/// pay one component of an installment, returning what is left of `available`
fn apply_to_component(
    component: Component,
    available: Money,
    installment: &Installment,
    applied: &mut AllocationBreakdown,
) -> Money {
    let (balance, applied_field) = match component {
        Component::Penalty => (installment.penalty_balance(), &mut applied.to_penalty),
        Component::Interest => (installment.interest_balance(), &mut applied.to_interest),
        Component::Principal => (installment.principal_balance(), &mut applied.to_principal),
    };

    let payment = available.min(balance);
    *applied_field = payment;

    available - payment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::interest::PenaltyPolicy;
    use crate::loan::LoanTerms;
    use crate::schedule::ScheduleGenerator;
    use crate::types::LoanStatus;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// 120,000 over 12 months with 12,000 interest, granted 2024-01-15
    fn loan_with_schedule() -> (Loan, Vec<Installment>) {
        let terms = LoanTerms::flat_monthly(Money::from_major(120_000), Rate::from_percentage(10), 12, date(2024, 1, 15))
            .with_total_interest(Money::from_major(12_000));
        let loan = Loan::new("maria santos", terms.clone(), Money::from_major(12_000));
        let schedule = ScheduleGenerator::new().generate(loan.id, &terms).unwrap();
        (loan, schedule.into_installments())
    }

    #[test]
    fn test_oldest_installment_first() {
        let (loan, installments) = loan_with_schedule();
        let allocator = PaymentAllocator::default();

        // settles #1 (11,000) and puts 2,000 on #2
        let result = allocator
            .allocate(&loan, &installments, Money::from_major(13_000), None, date(2024, 2, 10))
            .unwrap();

        let first = &result.updated_installments[0];
        let second = &result.updated_installments[1];
        assert_eq!(first.balance(), Money::ZERO);
        assert_eq!(second.interest_paid, Money::from_major(1_000));
        assert_eq!(second.principal_paid, Money::from_major(1_000));
        assert_eq!(second.balance(), Money::from_major(9_000));

        assert_eq!(result.lines.len(), 2);
        assert_eq!(result.breakdown.to_interest, Money::from_major(2_000));
        assert_eq!(result.breakdown.to_principal, Money::from_major(11_000));
        assert_eq!(result.leftover_credit, Money::ZERO);

        // caller's copy untouched
        assert_eq!(installments[0].total_paid(), Money::ZERO);
    }

    #[test]
    fn test_penalty_before_interest_before_principal() {
        let (loan, mut installments) = loan_with_schedule();
        installments[1].penalty_accrued = Money::from_major(300);

        let allocator = PaymentAllocator::default();
        let result = allocator
            .allocate(&loan, &installments, Money::from_major(13_000), None, date(2024, 3, 1))
            .unwrap();

        // 11,000 clears #1; 2,000 left for #2: 300 penalty, 1,000 interest, 700 principal
        let first = &result.lines[0];
        assert_eq!(first.sequence, 1);
        assert_eq!(first.applied.to_interest, Money::from_major(1_000));
        assert_eq!(first.applied.to_principal, Money::from_major(10_000));

        let second = &result.lines[1];
        assert_eq!(second.sequence, 2);
        assert_eq!(second.applied.to_penalty, Money::from_major(300));
        assert_eq!(second.applied.to_interest, Money::from_major(1_000));
        assert_eq!(second.applied.to_principal, Money::from_major(700));

        let updated = &result.updated_installments[1];
        assert_eq!(updated.penalty_balance(), Money::ZERO);
        assert_eq!(updated.interest_balance(), Money::ZERO);
        assert_eq!(updated.principal_paid, Money::from_major(700));
        assert_eq!(updated.balance(), Money::from_major(9_300));
    }

    #[test]
    fn test_overpayment_recorded_as_credit() {
        let (mut loan, _) = loan_with_schedule();
        loan.terms.term.count = 1;
        let single = vec![Installment::new(
            loan.id,
            1,
            date(2024, 1, 15),
            date(2024, 2, 15),
            Money::from_major(4_500),
            Money::from_major(500),
        )];

        let result = PaymentAllocator::default()
            .allocate(&loan, &single, Money::from_major(7_000), None, date(2024, 2, 1))
            .unwrap();

        assert_eq!(result.updated_installments[0].balance(), Money::ZERO);
        assert_eq!(result.leftover_credit, Money::from_major(2_000));
        assert_eq!(result.total_applied() + result.leftover_credit, Money::from_major(7_000));
    }

    #[test]
    fn test_overpayment_rejected_in_strict_mode() {
        let (loan, installments) = loan_with_schedule();
        let allocator = PaymentAllocator::new(OverpaymentMode::Reject, PenaltyEngine::default());

        let err = allocator
            .allocate(&loan, &installments, Money::from_major(140_000), None, date(2024, 2, 1))
            .unwrap_err();
        assert_eq!(
            err,
            LoanError::OverpaymentNotAllowed {
                amount: Money::from_major(140_000),
                outstanding: Money::from_major(132_000),
            }
        );

        // exact payoff is fine
        let result = allocator
            .allocate(&loan, &installments, Money::from_major(132_000), None, date(2024, 2, 1))
            .unwrap();
        assert!(result.updated_installments.iter().all(|i| i.is_paid()));
    }

    #[test]
    fn test_explicit_target_installment() {
        let (loan, installments) = loan_with_schedule();
        let target = installments[2].id;

        let result = PaymentAllocator::default()
            .allocate(&loan, &installments, Money::from_major(12_000), Some(target), date(2024, 2, 1))
            .unwrap();

        // older installments skipped, #3 settled, 1,000 carried to #4 interest
        assert_eq!(result.updated_installments[0].total_paid(), Money::ZERO);
        assert!(result.updated_installments[2].is_paid());
        assert_eq!(result.updated_installments[3].interest_paid, Money::from_major(1_000));
        assert_eq!(result.lines[0].installment_id, target);
    }

    #[test]
    fn test_unknown_target_rejected() {
        let (loan, installments) = loan_with_schedule();
        let missing = uuid::Uuid::new_v4();
        assert_eq!(
            PaymentAllocator::default()
                .allocate(&loan, &installments, Money::from_major(100), Some(missing), date(2024, 2, 1))
                .unwrap_err(),
            LoanError::InstallmentNotFound { id: missing }
        );
    }

    #[test]
    fn test_closed_loan_rejected() {
        let (mut loan, installments) = loan_with_schedule();
        loan.transition(LoanStatus::Renewed).unwrap();

        let err = PaymentAllocator::default()
            .allocate(&loan, &installments, Money::from_major(100), None, date(2024, 2, 1))
            .unwrap_err();
        assert!(matches!(err, LoanError::LoanClosed { status: LoanStatus::Renewed, .. }));
    }

    #[test]
    fn test_penalty_accrued_before_allocation() {
        let (loan, installments) = loan_with_schedule();
        let allocator = PaymentAllocator::new(
            OverpaymentMode::RecordCredit,
            PenaltyEngine::new(PenaltyPolicy::DailyRate {
                daily_rate: Rate::from_decimal(dec!(0.001)),
                grace_days: 0,
            }),
        );

        // #1 due 2024-02-15, paid 10 days late: 11,000 * 0.001 * 10 = 110
        let result = allocator
            .allocate(&loan, &installments, Money::from_major(11_110), None, date(2024, 2, 25))
            .unwrap();

        assert_eq!(result.penalty_accrued, Money::from_major(110));
        assert_eq!(result.breakdown.to_penalty, Money::from_major(110));
        assert!(result.updated_installments[0].is_paid());
        assert_eq!(result.lines.len(), 1);
    }

    #[test]
    fn test_applied_plus_credit_equals_amount() {
        let (loan, installments) = loan_with_schedule();
        let allocator = PaymentAllocator::default();

        for cents in [1_i64, 99, 1_100_000, 1_234_567, 13_200_000, 20_000_000] {
            let amount = Money::from_minor(cents);
            let result = allocator
                .allocate(&loan, &installments, amount, None, date(2024, 2, 1))
                .unwrap();
            assert_eq!(result.total_applied() + result.leftover_credit, amount);
        }
    }
}
