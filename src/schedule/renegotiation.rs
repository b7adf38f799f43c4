use crate::accrual::calculator::{AccrualCalculator, AccrualRates, AccrualResult};
use crate::core::error::EngineError;
use crate::core::money::Money;
use crate::core::obligation::{Installment, Obligation, ObligationStatus};
use crate::schedule::installments::InstallmentScheduler;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Terms agreed with the counterparty for a new plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenegotiationTerms {
    /// Fraction of the accrued interest and penalty that is forgiven, in `[0, 1]`.
    pub discount_pct: Decimal,
    /// Number of installments in the new plan.
    pub installments: u32,
    /// Due date of the first new installment.
    pub base_date: NaiveDate,
    pub interval_days: u32,
}

/// A replacement installment plan for an obligation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationPlan {
    /// Principal the plan was computed on.
    pub original_principal: Money,
    /// Interest plus penalty before the negotiated discount.
    pub accrued: Money,
    pub discount_amount: Money,
    pub final_accrued: Money,
    /// `original_principal + final_accrued`; the plan's installments sum to it.
    pub new_principal: Money,
    pub installments: Vec<Installment>,
}

/// Builds and applies renegotiated installment plans.
pub struct RenegotiationEngine;

impl RenegotiationEngine {
    /// Compute a new plan from a principal and its accrual.
    ///
    /// `accrued = interest + penalty`, of which `discount_pct` is forgiven;
    /// the remainder is added to the principal and split by
    /// [`InstallmentScheduler`].
    pub fn renegotiate(
        principal: Money,
        status: ObligationStatus,
        accrual: &AccrualResult,
        terms: &RenegotiationTerms,
    ) -> Result<NegotiationPlan, EngineError> {
        if status.is_terminal() {
            return Err(EngineError::AlreadySettled { status });
        }
        if terms.discount_pct < Decimal::ZERO || terms.discount_pct > Decimal::ONE {
            return Err(EngineError::InvalidRate {
                name: "discount_pct".to_string(),
                rate: terms.discount_pct,
            });
        }

        let accrued = accrual.accrued();
        let discount_amount = accrued.mul_rounded(terms.discount_pct);
        let final_accrued = accrued - discount_amount;
        let new_principal = principal + final_accrued;

        let installments = InstallmentScheduler::schedule(
            new_principal,
            terms.installments,
            terms.base_date,
            terms.interval_days,
        )?;

        log::debug!(
            "renegotiated {} + {} accrued ({} forgiven) into {} installments",
            principal,
            accrued,
            discount_amount,
            terms.installments
        );

        Ok(NegotiationPlan {
            original_principal: principal,
            accrued,
            discount_amount,
            final_accrued,
            new_principal,
            installments,
        })
    }

    /// Install `plan` on `obligation`, replacing its whole installment set.
    ///
    /// The returned obligation is `renegotiated`, carries the plan's
    /// principal, and no longer holds any of the previous installments.
    pub fn apply(obligation: &Obligation, plan: &NegotiationPlan) -> Result<Obligation, EngineError> {
        if obligation.status().is_terminal() {
            return Err(EngineError::AlreadySettled {
                status: obligation.status(),
            });
        }
        let planned = InstallmentScheduler::total(&plan.installments);
        if planned != plan.new_principal {
            return Err(EngineError::InstallmentSumMismatch {
                expected: plan.new_principal.amount(),
                actual: planned.amount(),
            });
        }
        Ok(obligation.replace_installments(
            plan.new_principal,
            plan.installments.clone(),
            ObligationStatus::Renegotiated,
        ))
    }

    /// Accrue on the obligation's outstanding balance as of
    /// `reference_date`, build the plan, and swap it in.
    pub fn renegotiate_obligation(
        obligation: &Obligation,
        reference_date: NaiveDate,
        rates: &AccrualRates,
        terms: &RenegotiationTerms,
    ) -> Result<(Obligation, NegotiationPlan), EngineError> {
        if obligation.status().is_terminal() {
            return Err(EngineError::AlreadySettled {
                status: obligation.status(),
            });
        }
        let principal = obligation.outstanding();
        let accrual =
            AccrualCalculator::accrue(principal, obligation.next_due_date(), reference_date, rates)?;
        let plan = Self::renegotiate(principal, obligation.status(), &accrual, terms)?;
        let renegotiated = Self::apply(obligation, &plan)?;
        Ok((renegotiated, plan))
    }
}
