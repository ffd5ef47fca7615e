use std::collections::HashMap;

use uuid::Uuid;

use crate::errors::{LoanError, Result};
use crate::installment::Installment;
use crate::loan::Loan;
use crate::payments::Payment;
use crate::pdc::{PdcLine, PdcOwner};
use crate::types::LoanId;

/// writes produced by one engine operation, applied all-or-nothing
#[derive(Debug, Clone, Default)]
pub struct LoanCommit {
    /// loan records to insert or replace
    pub loans: Vec<Loan>,
    /// full installment sets, replacing whatever the loan had
    pub installments: Vec<(LoanId, Vec<Installment>)>,
    pub payments: Vec<Payment>,
    /// check lines to insert or replace, by line id
    pub pdc_lines: Vec<PdcLine>,
}

impl LoanCommit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loan(mut self, loan: Loan) -> Self {
        self.loans.push(loan);
        self
    }

    pub fn installments(mut self, loan_id: LoanId, installments: Vec<Installment>) -> Self {
        self.installments.push((loan_id, installments));
        self
    }

    pub fn payment(mut self, payment: Payment) -> Self {
        self.payments.push(payment);
        self
    }

    pub fn pdc_line(mut self, line: PdcLine) -> Self {
        self.pdc_lines.push(line);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty() && self.installments.is_empty() && self.payments.is_empty() && self.pdc_lines.is_empty()
    }
}

/// storage collaborator the loan book reads current state from and
/// commits results to
pub trait LoanStore {
    fn loan(&self, id: LoanId) -> Result<Loan>;

    /// installments of a loan, ordered by sequence
    fn installments(&self, loan_id: LoanId) -> Result<Vec<Installment>>;

    /// payments of a loan, in the order they were recorded
    fn payments(&self, loan_id: LoanId) -> Result<Vec<Payment>>;

    /// disbursement checks of the loan and collection checks of its payments
    fn pdc_lines(&self, loan_id: LoanId) -> Result<Vec<PdcLine>>;

    fn pdc_line(&self, id: Uuid) -> Result<PdcLine>;

    /// apply every write in `commit` or none of them
    fn commit(&mut self, commit: LoanCommit) -> Result<()>;
}

/// in-process store backed by hash maps
#[derive(Debug, Default)]
pub struct InMemoryLoanStore {
    loans: HashMap<LoanId, Loan>,
    installments: HashMap<LoanId, Vec<Installment>>,
    payments: HashMap<LoanId, Vec<Payment>>,
    pdc_lines: Vec<PdcLine>,
}

impl InMemoryLoanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loan_count(&self) -> usize {
        self.loans.len()
    }

    fn knows_loan(&self, id: LoanId, commit: &LoanCommit) -> bool {
        self.loans.contains_key(&id) || commit.loans.iter().any(|l| l.id == id)
    }

    /// reject the whole commit before touching anything
    fn check(&self, commit: &LoanCommit) -> Result<()> {
        for (loan_id, installments) in &commit.installments {
            if !self.knows_loan(*loan_id, commit) {
                return Err(LoanError::LoanNotFound { id: *loan_id });
            }
            if let Some(stray) = installments.iter().find(|i| i.loan_id != *loan_id) {
                return Err(LoanError::CalculationError {
                    message: format!("installment {} belongs to loan {}, not {}", stray.id, stray.loan_id, loan_id),
                });
            }
        }
        if let Some(payment) = commit.payments.iter().find(|p| !self.knows_loan(p.loan_id, commit)) {
            return Err(LoanError::LoanNotFound { id: payment.loan_id });
        }
        for line in &commit.pdc_lines {
            if let PdcOwner::Disbursement(loan_id) = line.owner {
                if !self.knows_loan(loan_id, commit) {
                    return Err(LoanError::LoanNotFound { id: loan_id });
                }
            }
        }
        Ok(())
    }
}

impl LoanStore for InMemoryLoanStore {
    fn loan(&self, id: LoanId) -> Result<Loan> {
        self.loans.get(&id).cloned().ok_or(LoanError::LoanNotFound { id })
    }

    fn installments(&self, loan_id: LoanId) -> Result<Vec<Installment>> {
        if !self.loans.contains_key(&loan_id) {
            return Err(LoanError::LoanNotFound { id: loan_id });
        }
        let mut installments = self.installments.get(&loan_id).cloned().unwrap_or_default();
        installments.sort_by_key(|i| i.sequence);
        Ok(installments)
    }

    fn payments(&self, loan_id: LoanId) -> Result<Vec<Payment>> {
        if !self.loans.contains_key(&loan_id) {
            return Err(LoanError::LoanNotFound { id: loan_id });
        }
        Ok(self.payments.get(&loan_id).cloned().unwrap_or_default())
    }

    fn pdc_lines(&self, loan_id: LoanId) -> Result<Vec<PdcLine>> {
        let payments = self.payments(loan_id)?;
        Ok(self
            .pdc_lines
            .iter()
            .filter(|line| match line.owner {
                PdcOwner::Disbursement(id) => id == loan_id,
                PdcOwner::Collection(payment_id) => payments.iter().any(|p| p.id == payment_id),
            })
            .cloned()
            .collect())
    }

    fn pdc_line(&self, id: Uuid) -> Result<PdcLine> {
        self.pdc_lines
            .iter()
            .find(|line| line.id == id)
            .cloned()
            .ok_or(LoanError::PdcLineNotFound { id })
    }

    fn commit(&mut self, commit: LoanCommit) -> Result<()> {
        if commit.is_empty() {
            return Ok(());
        }
        self.check(&commit)?;

        for loan in commit.loans {
            self.loans.insert(loan.id, loan);
        }
        for (loan_id, installments) in commit.installments {
            self.installments.insert(loan_id, installments);
        }
        for payment in commit.payments {
            self.payments.entry(payment.loan_id).or_default().push(payment);
        }
        for line in commit.pdc_lines {
            match self.pdc_lines.iter_mut().find(|l| l.id == line.id) {
                Some(existing) => *existing = line,
                None => self.pdc_lines.push(line),
            }
        }
        Ok(())
    }
}
