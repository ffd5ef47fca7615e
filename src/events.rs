use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{InstallmentId, LoanId, LoanStatus, PaymentId};

/// all events the engine can emit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // lifecycle events
    LoanOriginated {
        loan_id: LoanId,
        principal: Money,
        total_interest: Money,
        installments: u32,
        renewed_from: Option<LoanId>,
        timestamp: DateTime<Utc>,
    },
    LoanRenewed {
        loan_id: LoanId,
        successor_id: LoanId,
        rolled_over: Money,
        new_disbursement: Money,
        timestamp: DateTime<Utc>,
    },
    StatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    // payment events
    PaymentAllocated {
        loan_id: LoanId,
        payment_id: PaymentId,
        amount: Money,
        applied_to_penalty: Money,
        applied_to_interest: Money,
        applied_to_principal: Money,
        timestamp: DateTime<Utc>,
    },
    LeftoverCreditRecorded {
        loan_id: LoanId,
        payment_id: PaymentId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
    InstallmentSettled {
        loan_id: LoanId,
        installment_id: InstallmentId,
        sequence: u32,
        due_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    PenaltyAccrued {
        loan_id: LoanId,
        amount: Money,
        as_of: NaiveDate,
    },

    // post-dated checks
    CheckDiscounted {
        check_number: String,
        face_amount: Money,
        interest: Money,
        net_proceeds: Money,
        due_date: NaiveDate,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}
