use crate::accrual::calculator::{AccrualCalculator, AccrualRates, AccrualResult};
use crate::core::error::EngineError;
use crate::core::money::Money;
use crate::core::obligation::{InstallmentStatus, Obligation, ObligationStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A payment received or made against one obligation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub amount: Money,
    pub date: NaiveDate,
    #[serde(default)]
    pub reference: Option<String>,
}

impl Payment {
    pub fn new(amount: Money, date: NaiveDate) -> Self {
        Self {
            amount,
            date,
            reference: None,
        }
    }
}

/// Portion of a payment applied to one installment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedAmount {
    pub installment_number: u32,
    pub amount: Money,
    pub installment_status: InstallmentStatus,
}

/// What a payment did to an obligation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub obligation_id: Uuid,
    pub payment: Payment,
    pub applied: Vec<AppliedAmount>,
    pub remaining: Money,
    pub status: ObligationStatus,
}

/// Reconciles payments against installment plans.
pub struct SettlementEngine;

impl SettlementEngine {
    /// Apply `payment` to the open installments of `obligation`, lowest
    /// installment number first. The installment list keeps its order.
    ///
    /// Returns the updated obligation and a receipt. The obligation becomes
    /// `settled` once nothing is outstanding, otherwise `partially_settled`.
    pub fn apply_payment(
        obligation: &Obligation,
        payment: &Payment,
    ) -> Result<(Obligation, PaymentReceipt), EngineError> {
        if obligation.status().is_terminal() {
            return Err(EngineError::InvalidTransition {
                action: "pay",
                status: obligation.status(),
            });
        }
        if !payment.amount.is_positive() {
            return Err(EngineError::invalid_amount(
                payment.amount,
                "payment must be positive",
            ));
        }
        let outstanding = obligation.outstanding();
        if payment.amount > outstanding {
            return Err(EngineError::PaymentExceedsOutstanding {
                payment: payment.amount.amount(),
                outstanding: outstanding.amount(),
            });
        }

        // Visit by installment number; the stored order is kept as loaded.
        let mut installments = obligation.installments().to_vec();
        let mut order: Vec<usize> = (0..installments.len()).collect();
        order.sort_by_key(|&idx| installments[idx].number);

        let mut left = payment.amount;
        let mut applied = Vec::new();
        for idx in order {
            if left.is_zero() {
                break;
            }
            let installment = &mut installments[idx];
            if !installment.is_open() {
                continue;
            }
            let amount = left.min(installment.outstanding());
            installment.paid += amount;
            installment.status = if installment.outstanding().is_zero() {
                InstallmentStatus::Paid
            } else {
                InstallmentStatus::PartiallyPaid
            };
            left -= amount;
            applied.push(AppliedAmount {
                installment_number: installment.number,
                amount,
                installment_status: installment.status,
            });
        }

        let remaining = outstanding - payment.amount;
        let status = if remaining.is_zero() {
            ObligationStatus::Settled
        } else {
            ObligationStatus::PartiallySettled
        };
        let updated = obligation.with_progress(installments, status);

        log::debug!(
            "payment {} on {}: {} remaining, now {}",
            payment.amount,
            obligation.id(),
            remaining,
            status
        );

        let receipt = PaymentReceipt {
            obligation_id: obligation.id(),
            payment: payment.clone(),
            applied,
            remaining,
            status,
        };
        Ok((updated, receipt))
    }

    /// What it takes to settle `obligation` on `payment_date`: accrual on
    /// the outstanding balance relative to the earliest open installment.
    pub fn amount_due(
        obligation: &Obligation,
        payment_date: NaiveDate,
        rates: &AccrualRates,
    ) -> Result<AccrualResult, EngineError> {
        if obligation.status().is_terminal() {
            return Err(EngineError::AlreadySettled {
                status: obligation.status(),
            });
        }
        AccrualCalculator::accrue(
            obligation.outstanding(),
            obligation.next_due_date(),
            payment_date,
            rates,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::core::obligation::{Installment, ObligationKind, ObligationRecord};
    use crate::core::party::CounterpartyId;
    use crate::schedule::installments::InstallmentScheduler;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn three_part_receivable() -> Obligation {
        let plan = InstallmentScheduler::schedule(money("300.00"), 3, date(2024, 2, 1), 30).unwrap();
        Obligation::new(
            ObligationKind::Receivable,
            CounterpartyId::new("CLI-1"),
            money("300.00"),
            date(2024, 1, 1),
            date(2024, 2, 1),
        )
        .with_schedule(plan)
        .unwrap()
    }

    #[test]
    fn test_partial_payment_spans_installments() {
        let ob = three_part_receivable();
        let payment = Payment::new(money("150.00"), date(2024, 2, 1));
        let (updated, receipt) = SettlementEngine::apply_payment(&ob, &payment).unwrap();

        assert_eq!(updated.status(), ObligationStatus::PartiallySettled);
        assert_eq!(updated.outstanding(), money("150.00"));
        assert_eq!(updated.paid(), money("150.00"));
        assert_eq!(updated.installments()[0].status, InstallmentStatus::Paid);
        assert_eq!(updated.installments()[1].status, InstallmentStatus::PartiallyPaid);
        assert_eq!(updated.installments()[1].paid, money("50.00"));
        assert_eq!(updated.installments()[2].status, InstallmentStatus::Pending);
        assert_eq!(updated.next_due_date(), date(2024, 3, 2));
        assert!(updated.verify().is_ok());

        assert_eq!(receipt.applied.len(), 2);
        assert_eq!(receipt.applied[0].amount, money("100.00"));
        assert_eq!(receipt.applied[1].amount, money("50.00"));
        assert_eq!(receipt.remaining, money("150.00"));
    }

    #[test]
    fn test_final_payment_settles() {
        let ob = three_part_receivable();
        let (ob, _) =
            SettlementEngine::apply_payment(&ob, &Payment::new(money("120.00"), date(2024, 2, 1)))
                .unwrap();
        let (ob, receipt) =
            SettlementEngine::apply_payment(&ob, &Payment::new(money("180.00"), date(2024, 3, 2)))
                .unwrap();
        assert_eq!(ob.status(), ObligationStatus::Settled);
        assert_eq!(receipt.status, ObligationStatus::Settled);
        assert_eq!(ob.outstanding(), Money::ZERO);
        assert!(ob
            .installments()
            .iter()
            .all(|i| i.status == InstallmentStatus::Paid));

        let err =
            SettlementEngine::apply_payment(&ob, &Payment::new(money("1.00"), date(2024, 4, 1)))
                .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DomainState);
    }

    #[test]
    fn test_overpayment_rejected() {
        let ob = three_part_receivable();
        let err =
            SettlementEngine::apply_payment(&ob, &Payment::new(money("300.01"), date(2024, 2, 1)))
                .unwrap_err();
        assert!(matches!(err, EngineError::PaymentExceedsOutstanding { .. }));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_non_positive_payment_rejected() {
        let ob = three_part_receivable();
        assert!(
            SettlementEngine::apply_payment(&ob, &Payment::new(Money::ZERO, date(2024, 2, 1)))
                .is_err()
        );
    }

    #[test]
    fn test_payment_follows_numbers_and_keeps_stored_order() {
        let record = ObligationRecord {
            id: Uuid::new_v4(),
            kind: ObligationKind::Payable,
            counterparty: CounterpartyId::new("SUP-7"),
            principal: money("200.00"),
            issue_date: date(2024, 1, 1),
            due_date: date(2024, 3, 1),
            status: ObligationStatus::Pending,
            priority_class: Default::default(),
            installments: vec![
                Installment::new(2, money("100.00"), date(2024, 3, 1)),
                Installment::new(1, money("100.00"), date(2024, 2, 1)),
            ],
            reference: None,
        };
        let ob = Obligation::restore(record).unwrap();
        let (updated, receipt) =
            SettlementEngine::apply_payment(&ob, &Payment::new(money("60.00"), date(2024, 2, 1)))
                .unwrap();

        assert_eq!(receipt.applied.len(), 1);
        assert_eq!(receipt.applied[0].installment_number, 1);
        let numbers: Vec<u32> = updated.installments().iter().map(|i| i.number).collect();
        assert_eq!(numbers, vec![2, 1]);
        assert_eq!(updated.installments()[1].paid, money("60.00"));
        assert_eq!(updated.installments()[0].paid, Money::ZERO);
    }

    #[test]
    fn test_amount_due_uses_next_open_installment() {
        let ob = three_part_receivable();
        let (ob, _) =
            SettlementEngine::apply_payment(&ob, &Payment::new(money("100.00"), date(2024, 2, 1)))
                .unwrap();
        // Next open installment is due 2024-03-02; ten days late.
        let rates = AccrualRates::new(dec!(0.001), dec!(0.02));
        let due = SettlementEngine::amount_due(&ob, date(2024, 3, 12), &rates).unwrap();
        assert_eq!(due.principal, money("200.00"));
        assert_eq!(due.days, 10);
        assert_eq!(due.interest, money("2.00"));
        assert_eq!(due.penalty, money("4.00"));
        assert_eq!(due.total, money("206.00"));
    }
}
