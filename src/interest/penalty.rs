use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::add_days;
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::installment::Installment;

/// penalty policy for overdue installments.
///
/// No formula is assumed by default; lenders opt into one explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PenaltyPolicy {
    /// overdue installments never accrue penalty
    #[default]
    None,
    /// `daily_rate` on unpaid principal + interest for each day past the grace period
    DailyRate {
        daily_rate: Rate,
        grace_days: u32,
    },
    /// fixed `amount` for each started block of `period_days` past the grace period
    FlatPerPeriod {
        amount: Money,
        grace_days: u32,
        period_days: u32,
    },
}

impl PenaltyPolicy {
    pub fn grace_days(&self) -> u32 {
        match self {
            PenaltyPolicy::None => 0,
            PenaltyPolicy::DailyRate { grace_days, .. } => *grace_days,
            PenaltyPolicy::FlatPerPeriod { grace_days, .. } => *grace_days,
        }
    }
}

/// penalty assessed on one installment for one window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyAssessment {
    pub amount: Money,
    /// unpaid principal + interest the penalty was charged on
    pub base: Money,
    pub days_charged: u32,
    pub assessed_through: NaiveDate,
}

/// engine for assessing penalty on overdue installments
#[derive(Debug, Clone, Default)]
pub struct PenaltyEngine {
    pub policy: PenaltyPolicy,
}

impl PenaltyEngine {
    pub fn new(policy: PenaltyPolicy) -> Self {
        Self { policy }
    }

    /// penalty owed by `installment` between its last assessment and
    /// `as_of`. Does not mutate; see [`PenaltyEngine::accrue`].
    pub fn assess(&self, installment: &Installment, as_of: NaiveDate) -> Result<PenaltyAssessment> {
        let grace_end = add_days(installment.due_date, self.policy.grace_days())?;
        let window_start = installment
            .penalty_assessed_through
            .map_or(grace_end, |through| through.max(grace_end));
        let base = installment.principal_balance() + installment.interest_balance();

        let mut assessment = PenaltyAssessment {
            amount: Money::ZERO,
            base,
            days_charged: 0,
            assessed_through: as_of.max(window_start),
        };

        if as_of <= window_start || base.is_zero() {
            return Ok(assessment);
        }

        let days_charged = (as_of - window_start).num_days() as u32;
        assessment.days_charged = days_charged;
        assessment.amount = match &self.policy {
            PenaltyPolicy::None => Money::ZERO,
            PenaltyPolicy::DailyRate { daily_rate, .. } => {
                base.simple_interest(*daily_rate, Decimal::from(days_charged))
            }
            PenaltyPolicy::FlatPerPeriod { amount, period_days, .. } => {
                let period = (*period_days).max(1);
                let charged_before = blocks_started((window_start - grace_end).num_days() as u32, period);
                let charged_now = blocks_started((as_of - grace_end).num_days() as u32, period);
                *amount * Decimal::from(charged_now - charged_before)
            }
        };

        Ok(assessment)
    }

    /// assess and book penalty onto the installment. Accrued penalty only
    /// ever grows; payments reduce the penalty balance, not the accrual.
    pub fn accrue(&self, installment: &mut Installment, as_of: NaiveDate) -> Result<Money> {
        if matches!(self.policy, PenaltyPolicy::None) || as_of <= installment.due_date {
            return Ok(Money::ZERO);
        }

        let assessment = self.assess(installment, as_of)?;
        installment.penalty_accrued += assessment.amount;
        installment.penalty_assessed_through = Some(assessment.assessed_through);

        if assessment.amount.is_positive() {
            debug!(
                installment = installment.sequence,
                base = %assessment.base,
                days = assessment.days_charged,
                penalty = %assessment.amount,
                "penalty accrued"
            );
        }

        Ok(assessment.amount)
    }

    /// accrue penalty across a whole schedule, returning the total booked
    pub fn accrue_all(&self, installments: &mut [Installment], as_of: NaiveDate) -> Result<Money> {
        let mut total = Money::ZERO;
        for installment in installments.iter_mut() {
            total += self.accrue(installment, as_of)?;
        }
        Ok(total)
    }
}

fn blocks_started(days: u32, period_days: u32) -> u32 {
    days.div_ceil(period_days)
}
