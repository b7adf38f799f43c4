use crate::core::error::EngineError;
use crate::core::money::Money;
use crate::core::party::CounterpartyId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Direction of an obligation from the tenant's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationKind {
    /// Money the tenant owes a supplier.
    Payable,
    /// Money a client owes the tenant.
    Receivable,
}

/// Lifecycle state of an obligation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationStatus {
    Pending,
    PartiallySettled,
    Settled,
    Cancelled,
    Renegotiated,
}

impl ObligationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PartiallySettled => "partially_settled",
            Self::Settled => "settled",
            Self::Cancelled => "cancelled",
            Self::Renegotiated => "renegotiated",
        }
    }

    /// `settled` and `cancelled` accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled | Self::Cancelled)
    }
}

impl fmt::Display for ObligationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Funding priority of a payable. `High` sorts first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PriorityClass {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    Pending,
    PartiallyPaid,
    Paid,
    Cancelled,
}

/// One scheduled portion of an obligation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    /// 1-based position within the plan.
    pub number: u32,
    pub value: Money,
    pub due_date: NaiveDate,
    /// Amount already reconciled against this installment.
    #[serde(default)]
    pub paid: Money,
    pub status: InstallmentStatus,
}

impl Installment {
    pub fn new(number: u32, value: Money, due_date: NaiveDate) -> Self {
        Self {
            number,
            value,
            due_date,
            paid: Money::ZERO,
            status: InstallmentStatus::Pending,
        }
    }

    pub fn outstanding(&self) -> Money {
        match self.status {
            InstallmentStatus::Cancelled => Money::ZERO,
            _ => self.value - self.paid,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(
            self.status,
            InstallmentStatus::Pending | InstallmentStatus::PartiallyPaid
        )
    }
}

/// A payable or receivable monetary commitment.
///
/// Obligations are values: every lifecycle event (payment, update,
/// renegotiation, cancellation) produces a new `Obligation` instead of
/// mutating the existing one. The installment set always sums exactly to
/// the principal.
///
/// # Examples
///
/// ```
/// use monetary_engine::core::money::Money;
/// use monetary_engine::core::obligation::{Obligation, ObligationKind, ObligationStatus};
/// use monetary_engine::core::party::CounterpartyId;
/// use chrono::NaiveDate;
///
/// let ob = Obligation::new(
///     ObligationKind::Payable,
///     CounterpartyId::new("SUP-1"),
///     "840.00".parse().unwrap(),
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
/// );
///
/// assert_eq!(ob.status(), ObligationStatus::Pending);
/// assert_eq!(ob.outstanding(), Money::from_minor(84_000));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ObligationRecord")]
pub struct Obligation {
    id: Uuid,
    kind: ObligationKind,
    counterparty: CounterpartyId,
    principal: Money,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    status: ObligationStatus,
    priority_class: PriorityClass,
    installments: Vec<Installment>,
    reference: Option<String>,
}

/// Persisted shape of an [`Obligation`], as handed over by the storage
/// layer. Converting it back checks the installment sum invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObligationRecord {
    pub id: Uuid,
    pub kind: ObligationKind,
    pub counterparty: CounterpartyId,
    pub principal: Money,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: ObligationStatus,
    #[serde(default)]
    pub priority_class: PriorityClass,
    pub installments: Vec<Installment>,
    #[serde(default)]
    pub reference: Option<String>,
}

impl TryFrom<ObligationRecord> for Obligation {
    type Error = EngineError;

    fn try_from(record: ObligationRecord) -> Result<Self, Self::Error> {
        Obligation::restore(record)
    }
}

/// Typed partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObligationUpdate {
    pub due_date: Option<NaiveDate>,
    pub priority_class: Option<PriorityClass>,
    pub reference: Option<String>,
}

impl Obligation {
    /// Create a pending obligation with a single installment for the full
    /// principal, due on `due_date`.
    ///
    /// # Panics
    ///
    /// Panics if `principal` is not positive.
    pub fn new(
        kind: ObligationKind,
        counterparty: CounterpartyId,
        principal: Money,
        issue_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        assert!(
            principal.is_positive(),
            "Obligation principal must be positive, got {}",
            principal
        );
        Self {
            id: Uuid::new_v4(),
            kind,
            counterparty,
            principal,
            issue_date,
            due_date,
            status: ObligationStatus::Pending,
            priority_class: PriorityClass::default(),
            installments: vec![Installment::new(1, principal, due_date)],
            reference: None,
        }
    }

    /// Rebuild an obligation loaded from storage.
    ///
    /// Fails with an invariant violation when the installments do not sum
    /// to the principal; the data is never corrected silently.
    pub fn restore(record: ObligationRecord) -> Result<Self, EngineError> {
        let obligation = Self {
            id: record.id,
            kind: record.kind,
            counterparty: record.counterparty,
            principal: record.principal,
            issue_date: record.issue_date,
            due_date: record.due_date,
            status: record.status,
            priority_class: record.priority_class,
            installments: record.installments,
            reference: record.reference,
        };
        obligation.verify()?;
        Ok(obligation)
    }

    /// Replace the default single installment with a computed plan.
    pub fn with_schedule(mut self, installments: Vec<Installment>) -> Result<Self, EngineError> {
        self.installments = installments;
        if let Some(last) = self.installments.last() {
            self.due_date = last.due_date;
        }
        self.verify()?;
        Ok(self)
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_priority(mut self, priority_class: PriorityClass) -> Self {
        self.priority_class = priority_class;
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Check that the principal is positive, that every installment has
    /// `0 <= paid <= value`, and that the installment set sums exactly to
    /// the principal.
    pub fn verify(&self) -> Result<(), EngineError> {
        if !self.principal.is_positive() || self.installments.is_empty() {
            return Err(EngineError::InconsistentObligation {
                reason: format!(
                    "principal {} with {} installments",
                    self.principal,
                    self.installments.len()
                ),
            });
        }
        if let Some(bad) = self
            .installments
            .iter()
            .find(|i| i.paid.is_negative() || i.paid > i.value)
        {
            return Err(EngineError::InconsistentObligation {
                reason: format!(
                    "installment {} has {} paid against a value of {}",
                    bad.number, bad.paid, bad.value
                ),
            });
        }
        let actual: Money = self.installments.iter().map(|i| i.value).sum();
        if actual != self.principal {
            return Err(EngineError::InstallmentSumMismatch {
                expected: self.principal.amount(),
                actual: actual.amount(),
            });
        }
        Ok(())
    }

    /// Apply a typed partial update, returning the updated obligation.
    ///
    /// A new due date on a single-installment obligation moves that
    /// installment as well.
    pub fn apply_update(&self, update: &ObligationUpdate) -> Result<Self, EngineError> {
        if self.status.is_terminal() {
            return Err(EngineError::InvalidTransition {
                action: "update",
                status: self.status,
            });
        }
        let mut next = self.clone();
        if let Some(due_date) = update.due_date {
            next.due_date = due_date;
            if let [only] = next.installments.as_mut_slice() {
                only.due_date = due_date;
            }
        }
        if let Some(priority_class) = update.priority_class {
            next.priority_class = priority_class;
        }
        if let Some(reference) = &update.reference {
            next.reference = Some(reference.clone());
        }
        Ok(next)
    }

    /// Cancel the obligation. Paid installments keep their payments; open
    /// ones are cancelled.
    pub fn cancel(&self) -> Result<Self, EngineError> {
        if self.status.is_terminal() {
            return Err(EngineError::AlreadySettled {
                status: self.status,
            });
        }
        let mut next = self.clone();
        for installment in next.installments.iter_mut().filter(|i| i.is_open()) {
            installment.status = InstallmentStatus::Cancelled;
        }
        next.status = ObligationStatus::Cancelled;
        log::debug!("obligation {} cancelled", next.id);
        Ok(next)
    }

    /// Swap the whole installment set at once. Callers guarantee the new
    /// set sums to `principal`.
    pub(crate) fn replace_installments(
        &self,
        principal: Money,
        installments: Vec<Installment>,
        status: ObligationStatus,
    ) -> Self {
        let mut next = self.clone();
        next.principal = principal;
        if let Some(last) = installments.last() {
            next.due_date = last.due_date;
        }
        next.installments = installments;
        next.status = status;
        next
    }

    pub(crate) fn with_progress(
        &self,
        installments: Vec<Installment>,
        status: ObligationStatus,
    ) -> Self {
        let mut next = self.clone();
        next.installments = installments;
        next.status = status;
        next
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> ObligationKind {
        self.kind
    }

    pub fn counterparty(&self) -> &CounterpartyId {
        &self.counterparty
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn issue_date(&self) -> NaiveDate {
        self.issue_date
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn status(&self) -> ObligationStatus {
        self.status
    }

    pub fn priority_class(&self) -> PriorityClass {
        self.priority_class
    }

    pub fn installments(&self) -> &[Installment] {
        &self.installments
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// Amount still owed across all open installments.
    pub fn outstanding(&self) -> Money {
        self.installments.iter().map(|i| i.outstanding()).sum()
    }

    /// Amount reconciled so far.
    pub fn paid(&self) -> Money {
        self.installments.iter().map(|i| i.paid).sum()
    }

    /// Due date of the earliest open installment, or the obligation's own
    /// due date when nothing is open.
    pub fn next_due_date(&self) -> NaiveDate {
        self.installments
            .iter()
            .filter(|i| i.is_open())
            .map(|i| i.due_date)
            .min()
            .unwrap_or(self.due_date)
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.status.is_terminal() && self.outstanding().is_positive() && self.next_due_date() < today
    }
}

/// An ordered collection of obligations, typically one tenant's payables
/// for a funding cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Portfolio {
    obligations: Vec<Obligation>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self {
            obligations: Vec::new(),
        }
    }

    pub fn add(&mut self, obligation: Obligation) {
        self.obligations.push(obligation);
    }

    pub fn obligations(&self) -> &[Obligation] {
        &self.obligations
    }

    pub fn len(&self) -> usize {
        self.obligations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obligations.is_empty()
    }

    /// Total still owed across the portfolio.
    pub fn total_outstanding(&self) -> Money {
        self.obligations.iter().map(|o| o.outstanding()).sum()
    }

    pub fn overdue(&self, today: NaiveDate) -> Vec<&Obligation> {
        self.obligations
            .iter()
            .filter(|o| o.is_overdue(today))
            .collect()
    }

    /// All unique counterparties referenced in this portfolio.
    pub fn counterparties(&self) -> Vec<CounterpartyId> {
        let mut parties: Vec<CounterpartyId> = self
            .obligations
            .iter()
            .map(|o| o.counterparty().clone())
            .collect();
        parties.sort();
        parties.dedup();
        parties
    }
}

impl FromIterator<Obligation> for Portfolio {
    fn from_iter<T: IntoIterator<Item = Obligation>>(iter: T) -> Self {
        Self {
            obligations: iter.into_iter().collect(),
        }
    }
}
