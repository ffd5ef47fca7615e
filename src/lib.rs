pub mod book;
pub mod calendar;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod installment;
pub mod interest;
pub mod loan;
pub mod payments;
pub mod pdc;
pub mod renewal;
pub mod schedule;
pub mod status;
pub mod store;
pub mod types;
pub mod view;

// re-export key types
pub use book::LoanBook;
pub use config::EngineConfig;
pub use decimal::{Money, Rate};
pub use errors::{LoanError, Result};
pub use events::{Event, EventStore};
pub use installment::Installment;
pub use interest::{DiscountCalculator, PdcDiscount, PenaltyEngine, PenaltyPolicy};
pub use loan::{Loan, LoanTerms};
pub use payments::{
    AllocationResult, CashCount, Payment, PaymentAllocator, PaymentMethod, PaymentRequest,
};
pub use pdc::{PdcLine, PdcOwner, PdcStatus, PdcTotals};
pub use renewal::{RenewalCalculator, RenewalQuote, RenewalResult, RenewalTerms};
pub use schedule::{Schedule, ScheduleGenerator};
pub use status::{derive_loan_status, derive_status};
pub use store::{InMemoryLoanStore, LoanCommit, LoanStore};
pub use types::{
    AllocationBreakdown, AmortizationMethod, CheckReference, InstallmentId, InstallmentStatus,
    LoanId, LoanStanding, LoanStatus, OverpaymentMode, PaymentId, RateBasis, Term, TermUnit,
};
pub use view::LoanView;

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
