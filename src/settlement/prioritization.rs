use crate::core::error::EngineError;
use crate::core::money::Money;
use crate::core::obligation::Obligation;
use serde::{Deserialize, Serialize};

/// Outcome of one funding cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationResult {
    /// Obligations to pay in full this cycle, in funding order.
    pub funded: Vec<Obligation>,
    /// Candidates that did not fit, in the order they were considered.
    pub deferred: Vec<Obligation>,
    /// Settled, cancelled or fully paid obligations that were not candidates.
    pub skipped: Vec<Obligation>,
    pub available_cash: Money,
    /// Sum of the funded outstanding balances.
    pub committed: Money,
    pub remaining: Money,
}

impl AllocationResult {
    /// Share of the available cash committed, for display.
    pub fn utilization(&self) -> f64 {
        if self.available_cash.is_zero() {
            return 0.0;
        }
        let ratio = self.committed.amount() / self.available_cash.amount();
        ratio.to_string().parse::<f64>().unwrap_or(0.0)
    }

    pub fn deferred_total(&self) -> Money {
        self.deferred.iter().map(|o| o.outstanding()).sum()
    }
}

/// Chooses which obligations a limited cash balance funds.
pub struct PaymentPrioritizationEngine;

impl PaymentPrioritizationEngine {
    /// Allocate `available_cash` across `obligations`.
    ///
    /// # Algorithm
    ///
    /// 1. Candidates are stably sorted by priority class, then next due
    ///    date, then outstanding balance (all ascending).
    /// 2. Each candidate is funded in full if it fits in what is left,
    ///    otherwise deferred; the scan continues so a smaller later
    ///    obligation can still be funded.
    ///
    /// Obligations are never partially funded. This is a greedy
    /// all-or-nothing pass, not an optimal packing.
    pub fn allocate(
        available_cash: Money,
        obligations: &[Obligation],
    ) -> Result<AllocationResult, EngineError> {
        if available_cash.is_negative() {
            return Err(EngineError::invalid_amount(
                available_cash,
                "available cash cannot be negative",
            ));
        }

        let (mut candidates, skipped): (Vec<&Obligation>, Vec<&Obligation>) = obligations
            .iter()
            .partition(|o| !o.status().is_terminal() && o.outstanding().is_positive());

        candidates.sort_by(|a, b| {
            (a.priority_class(), a.next_due_date(), a.outstanding()).cmp(&(
                b.priority_class(),
                b.next_due_date(),
                b.outstanding(),
            ))
        });

        let mut funded = Vec::new();
        let mut deferred = Vec::new();
        let mut committed = Money::ZERO;
        for obligation in candidates {
            let value = obligation.outstanding();
            if committed + value <= available_cash {
                committed += value;
                log::trace!("funding {} ({})", obligation.id(), value);
                funded.push(obligation.clone());
            } else {
                log::trace!("deferring {} ({})", obligation.id(), value);
                deferred.push(obligation.clone());
            }
        }

        log::debug!(
            "allocated {} of {}: {} funded, {} deferred",
            committed,
            available_cash,
            funded.len(),
            deferred.len()
        );

        Ok(AllocationResult {
            funded,
            deferred,
            skipped: skipped.into_iter().cloned().collect(),
            available_cash,
            committed,
            remaining: available_cash - committed,
        })
    }
}

impl std::fmt::Display for AllocationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Cash Allocation ===")?;
        writeln!(f, "Available:   {}", self.available_cash)?;
        writeln!(f, "Committed:   {}", self.committed)?;
        writeln!(f, "Remaining:   {}", self.remaining)?;
        writeln!(f, "Utilization: {:.1}%", self.utilization() * 100.0)?;

        writeln!(f, "\nFunded ({}):", self.funded.len())?;
        for ob in &self.funded {
            writeln!(
                f,
                "  {:<12} {:>12}  due {}  [{:?}]",
                ob.counterparty(),
                ob.outstanding(),
                ob.next_due_date(),
                ob.priority_class()
            )?;
        }
        writeln!(f, "\nDeferred ({}):", self.deferred.len())?;
        for ob in &self.deferred {
            writeln!(
                f,
                "  {:<12} {:>12}  due {}  [{:?}]",
                ob.counterparty(),
                ob.outstanding(),
                ob.next_due_date(),
                ob.priority_class()
            )?;
        }
        Ok(())
    }
}
