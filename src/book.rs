use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::Result;
use crate::events::{Event, EventStore};
use crate::installment::Installment;
use crate::interest::{PdcDiscount, PenaltyEngine};
use crate::loan::{Loan, LoanTerms};
use crate::payments::{Payment, PaymentAllocator, PaymentMethod, PaymentRequest};
use crate::pdc::{PdcLine, PdcOwner};
use crate::renewal::{RenewalCalculator, RenewalQuote, RenewalResult, RenewalTerms};
use crate::schedule::ScheduleGenerator;
use crate::status::loan_standing;
use crate::store::{InMemoryLoanStore, LoanCommit, LoanStore};
use crate::types::{CheckReference, LoanId, LoanStanding, LoanStatus};
use crate::view::LoanView;

/// loan portfolio: reads state from a store, runs the engine, commits the
/// result as one unit and records an audit trail.
///
/// Every operation takes `&mut self`, so allocations and renewals against
/// a book never interleave.
pub struct LoanBook<S: LoanStore = InMemoryLoanStore> {
    config: EngineConfig,
    store: S,
    pub events: EventStore,
    generator: ScheduleGenerator,
    penalty: PenaltyEngine,
    allocator: PaymentAllocator,
    renewal: RenewalCalculator,
}

impl LoanBook<InMemoryLoanStore> {
    /// book backed by an in-memory store
    pub fn in_memory(config: EngineConfig) -> Result<Self> {
        Self::new(config, InMemoryLoanStore::new())
    }
}

impl<S: LoanStore> LoanBook<S> {
    pub fn new(config: EngineConfig, store: S) -> Result<Self> {
        config.validate()?;
        let penalty = PenaltyEngine::new(config.penalty.clone());
        Ok(Self {
            allocator: PaymentAllocator::new(config.allocation.overpayment_mode, penalty.clone()),
            renewal: RenewalCalculator::new(penalty.clone()),
            penalty,
            generator: ScheduleGenerator::new(),
            config,
            store,
            events: EventStore::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// create a loan with its schedule
    pub fn originate_loan(
        &mut self,
        borrower: impl Into<String>,
        terms: LoanTerms,
        time_provider: &SafeTimeProvider,
    ) -> Result<Loan> {
        let (loan, schedule) = Loan::originate(borrower, terms, &self.generator)?;
        let installment_count = schedule.len() as u32;

        self.store.commit(
            LoanCommit::new()
                .loan(loan.clone())
                .installments(loan.id, schedule.into_installments()),
        )?;

        self.events.emit(Event::LoanOriginated {
            loan_id: loan.id,
            principal: loan.principal(),
            total_interest: loan.total_interest,
            installments: installment_count,
            renewed_from: None,
            timestamp: time_provider.now(),
        });

        Ok(loan)
    }

    /// record the check a loan was disbursed with, discounted at the
    /// drawee bank's rate
    pub fn attach_disbursement_check(
        &mut self,
        loan_id: LoanId,
        check: CheckReference,
        face_amount: Money,
        due_date: NaiveDate,
    ) -> Result<PdcLine> {
        let mut loan = self.store.loan(loan_id)?;
        let calculator = self.config.discount.calculator_for(Some(check.bank.as_str()))?;
        let line = PdcLine::new(
            PdcOwner::Disbursement(loan_id),
            check.clone(),
            face_amount,
            loan.terms.disbursement_date,
            due_date,
            &calculator,
        )?;
        loan.disbursement_check = Some(check);

        self.store.commit(LoanCommit::new().loan(loan).pdc_line(line.clone()))?;
        self.emit_discount(&line);

        Ok(line)
    }

    /// discount a post-dated check without recording it
    pub fn compute_discount(
        &self,
        face_amount: Money,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        bank: Option<&str>,
    ) -> Result<PdcDiscount> {
        self.config.discount.calculator_for(bank)?.compute(face_amount, issue_date, due_date)
    }

    /// mark a check line cleared; it can no longer be changed afterwards
    pub fn clear_check(&mut self, line_id: Uuid) -> Result<PdcLine> {
        let mut line = self.store.pdc_line(line_id)?;
        line.clear()?;
        self.store.commit(LoanCommit::new().pdc_line(line.clone()))?;
        Ok(line)
    }

    /// allocate a payment against its loan and persist the outcome
    pub fn allocate_payment(&mut self, request: PaymentRequest, time_provider: &SafeTimeProvider) -> Result<Payment> {
        let now = time_provider.now();
        let as_of = now.date_naive();

        if let Err(err) = request.validate() {
            warn!(loan_id = %request.loan_id, error = %err, "payment rejected");
            return Err(err);
        }

        let mut loan = self.store.loan(request.loan_id)?;
        let installments = self.store.installments(loan.id)?;

        let result = self
            .allocator
            .allocate(&loan, &installments, request.amount, request.target_installment, as_of)
            .inspect_err(|err| warn!(loan_id = %loan.id, error = %err, "allocation failed"))?;

        let payment = Payment::record(request, &result, now);
        let mut commit = LoanCommit::new();

        // checks dated after today are held as collection pdc lines
        if let PaymentMethod::Check(check) = &payment.method {
            if check.check_date > as_of {
                let calculator = self.config.discount.calculator_for(Some(check.bank.as_str()))?;
                let line = PdcLine::new(
                    PdcOwner::Collection(payment.id),
                    check.clone(),
                    payment.amount,
                    as_of,
                    check.check_date,
                    &calculator,
                )?;
                self.emit_discount(&line);
                commit = commit.pdc_line(line);
            }
        }

        let settled = newly_settled(&installments, &result.updated_installments);
        let all_paid = result.updated_installments.iter().all(|i| i.is_paid());
        if all_paid {
            loan.transition(LoanStatus::Closed)?;
        }

        self.store.commit(
            commit
                .loan(loan.clone())
                .installments(loan.id, result.updated_installments.clone())
                .payment(payment.clone()),
        )?;

        info!(
            loan_id = %loan.id,
            payment_id = %payment.id,
            amount = %payment.amount,
            applied = %result.total_applied(),
            leftover = %result.leftover_credit,
            "payment allocated"
        );

        if result.penalty_accrued.is_positive() {
            self.events.emit(Event::PenaltyAccrued {
                loan_id: loan.id,
                amount: result.penalty_accrued,
                as_of,
            });
        }
        self.events.emit(Event::PaymentAllocated {
            loan_id: loan.id,
            payment_id: payment.id,
            amount: payment.amount,
            applied_to_penalty: result.breakdown.to_penalty,
            applied_to_interest: result.breakdown.to_interest,
            applied_to_principal: result.breakdown.to_principal,
            timestamp: now,
        });
        for installment in settled {
            self.events.emit(Event::InstallmentSettled {
                loan_id: loan.id,
                installment_id: installment.id,
                sequence: installment.sequence,
                due_date: installment.due_date,
                timestamp: now,
            });
        }
        if result.leftover_credit.is_positive() {
            self.events.emit(Event::LeftoverCreditRecorded {
                loan_id: loan.id,
                payment_id: payment.id,
                amount: result.leftover_credit,
                timestamp: now,
            });
        }
        if all_paid {
            self.events.emit(Event::StatusChanged {
                loan_id: loan.id,
                old_status: LoanStatus::Active,
                new_status: LoanStatus::Closed,
                reason: "all installments paid".to_string(),
                timestamp: now,
            });
        }

        Ok(payment)
    }

    /// what renewing the loan today would roll over
    pub fn renewal_quote(&self, loan_id: LoanId, time_provider: &SafeTimeProvider) -> Result<RenewalQuote> {
        let loan = self.store.loan(loan_id)?;
        let installments = self.store.installments(loan_id)?;
        self.renewal.quote(&loan, &installments, time_provider.now().date_naive())
    }

    /// close the loan by rolling its outstanding balance plus
    /// `new_disbursement` into a new loan
    pub fn renew_loan(
        &mut self,
        loan_id: LoanId,
        new_disbursement: Money,
        new_terms: RenewalTerms,
        time_provider: &SafeTimeProvider,
    ) -> Result<RenewalResult> {
        let now = time_provider.now();
        let loan = self.store.loan(loan_id)?;
        let installments = self.store.installments(loan_id)?;

        let result = self
            .renewal
            .renew(&loan, &installments, new_disbursement, new_terms, now.date_naive())?;

        self.store.commit(
            LoanCommit::new()
                .loan(result.renewed_loan.clone())
                .installments(loan_id, result.frozen_installments.clone())
                .loan(result.new_loan.clone())
                .installments(result.new_loan.id, result.new_installments.clone()),
        )?;

        self.events.emit(Event::StatusChanged {
            loan_id,
            old_status: loan.status,
            new_status: LoanStatus::Renewed,
            reason: format!("renewed into {}", result.new_loan.id),
            timestamp: now,
        });
        self.events.emit(Event::LoanRenewed {
            loan_id,
            successor_id: result.new_loan.id,
            rolled_over: result.quote.renewal_amount(),
            new_disbursement,
            timestamp: now,
        });
        self.events.emit(Event::LoanOriginated {
            loan_id: result.new_loan.id,
            principal: result.new_loan.principal(),
            total_interest: result.new_loan.total_interest,
            installments: result.new_installments.len() as u32,
            renewed_from: Some(loan_id),
            timestamp: now,
        });

        Ok(result)
    }

    pub fn loan(&self, loan_id: LoanId) -> Result<Loan> {
        self.store.loan(loan_id)
    }

    pub fn installments(&self, loan_id: LoanId) -> Result<Vec<Installment>> {
        self.store.installments(loan_id)
    }

    /// standing of the loan as of the provider's current date
    pub fn loan_status(&self, loan_id: LoanId, time_provider: &SafeTimeProvider) -> Result<LoanStanding> {
        let loan = self.store.loan(loan_id)?;
        let installments = self.store.installments(loan_id)?;
        Ok(loan_standing(&loan, &installments, time_provider.now().date_naive()))
    }

    /// view as of the provider's current date. Penalty on an active loan is
    /// accrued to that date on a working copy; nothing is written back.
    pub fn view(&self, loan_id: LoanId, time_provider: &SafeTimeProvider) -> Result<LoanView> {
        let as_of = time_provider.now().date_naive();
        let loan = self.store.loan(loan_id)?;
        let mut installments = self.store.installments(loan_id)?;
        if loan.status == LoanStatus::Active {
            self.penalty.accrue_all(&mut installments, as_of)?;
        }
        let payments = self.store.payments(loan_id)?;
        let checks = self.store.pdc_lines(loan_id)?;
        Ok(LoanView::build(&loan, &installments, &payments, checks, as_of))
    }

    /// get events
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    fn emit_discount(&mut self, line: &PdcLine) {
        self.events.emit(Event::CheckDiscounted {
            check_number: line.check.check_number.clone(),
            face_amount: line.face_amount(),
            interest: line.interest(),
            net_proceeds: line.net_proceeds(),
            due_date: line.due_date,
        });
    }
}

/// installments that were open before and are fully paid after
fn newly_settled<'a>(before: &[Installment], after: &'a [Installment]) -> Vec<&'a Installment> {
    after
        .iter()
        .filter(|i| i.is_paid())
        .filter(|i| before.iter().any(|b| b.id == i.id && !b.is_paid()))
        .collect()
}
