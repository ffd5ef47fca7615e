use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::interest::{DiscountCalculator, PenaltyPolicy};
use crate::loan::LoanTerms;
use crate::types::{AmortizationMethod, OverpaymentMode, RateBasis, Term};

/// engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub schedule: ScheduleConfig,
    pub allocation: AllocationConfig,
    pub penalty: PenaltyPolicy,
    pub discount: DiscountConfig,
}

/// defaults applied when a loan request leaves them open
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub default_method: AmortizationMethod,
    pub default_rate_basis: RateBasis,
}

impl ScheduleConfig {
    /// loan terms using the configured method and rate basis
    pub fn terms(&self, principal: Money, rate: Rate, term: Term, disbursement_date: NaiveDate) -> LoanTerms {
        LoanTerms {
            principal,
            rate,
            rate_basis: self.default_rate_basis,
            term,
            disbursement_date,
            method: self.default_method,
            total_interest: None,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            default_method: AmortizationMethod::Flat,
            default_rate_basis: RateBasis::Annual,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AllocationConfig {
    pub overpayment_mode: OverpaymentMode,
}

/// daily discount rates for post-dated checks, per bank with a fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DiscountConfig {
    pub default_daily_rate: Rate,
    pub bank_rates: BTreeMap<String, Rate>,
}

impl DiscountConfig {
    pub fn rate_for(&self, bank: Option<&str>) -> Rate {
        bank.and_then(|b| self.bank_rates.get(b).copied())
            .unwrap_or(self.default_daily_rate)
    }

    pub fn calculator_for(&self, bank: Option<&str>) -> Result<DiscountCalculator> {
        DiscountCalculator::new(self.rate_for(bank))
    }
}

impl EngineConfig {
    /// default policy: flat schedules, leftover credit recorded, no penalty
    pub fn standard() -> Self {
        Self::default()
    }

    /// same as standard but payments exceeding the outstanding balance are rejected
    pub fn strict() -> Self {
        Self {
            allocation: AllocationConfig {
                overpayment_mode: OverpaymentMode::Reject,
            },
            ..Self::default()
        }
    }

    pub fn with_penalty(mut self, policy: PenaltyPolicy) -> Self {
        self.penalty = policy;
        self
    }

    pub fn with_discount_rate(mut self, daily_rate: Rate) -> Self {
        self.discount.default_daily_rate = daily_rate;
        self
    }

    pub fn with_bank_rate(mut self, bank: impl Into<String>, daily_rate: Rate) -> Self {
        self.discount.bank_rates.insert(bank.into(), daily_rate);
        self
    }

    /// parse and validate a json configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json).map_err(|e| LoanError::InvalidConfiguration {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.discount.default_daily_rate.is_negative() {
            return Err(LoanError::InvalidRate {
                rate: self.discount.default_daily_rate,
            });
        }
        if let Some((bank, rate)) = self.discount.bank_rates.iter().find(|(_, r)| r.is_negative()) {
            return Err(LoanError::InvalidConfiguration {
                message: format!("negative discount rate {} for bank {}", rate, bank),
            });
        }
        match &self.penalty {
            PenaltyPolicy::None => {}
            PenaltyPolicy::DailyRate { daily_rate, .. } => {
                if daily_rate.is_negative() {
                    return Err(LoanError::InvalidRate { rate: *daily_rate });
                }
            }
            PenaltyPolicy::FlatPerPeriod { amount, period_days, .. } => {
                if amount.is_negative() || *period_days == 0 {
                    return Err(LoanError::InvalidConfiguration {
                        message: format!("flat penalty needs a non-negative amount and a period, got {} every {} days", amount, period_days),
                    });
                }
            }
        }
        Ok(())
    }
}
