use chrono::{Days, NaiveDate};
use monetary_engine::accrual::calculator::{AccrualCalculator, AccrualRates};
use monetary_engine::core::error::EngineError;
use monetary_engine::core::inventory::{CostBasis, LineItem};
use monetary_engine::core::money::Money;
use monetary_engine::core::obligation::{Obligation, ObligationKind, PriorityClass};
use monetary_engine::core::party::CounterpartyId;
use monetary_engine::costing::proration::ProrationEngine;
use monetary_engine::costing::weighted_average::WeightedAverageCostEngine;
use monetary_engine::schedule::installments::InstallmentScheduler;
use monetary_engine::settlement::prioritization::PaymentPrioritizationEngine;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Money between `min_minor` and `max_minor` cents.
fn arb_money(min_minor: i64, max_minor: i64) -> impl Strategy<Value = Money> {
    (min_minor..=max_minor).prop_map(Money::from_minor)
}

/// A rate with four fractional digits, e.g. 0.0033.
fn arb_rate(min_bp: i64, max_bp: i64) -> impl Strategy<Value = Decimal> {
    (min_bp..=max_bp).prop_map(|bp| Decimal::new(bp, 4))
}

/// Amounts biased toward a few cents, where rounding residue matters most.
fn arb_small_or_any_money(max_minor: i64) -> impl Strategy<Value = Money> {
    prop_oneof![arb_money(0, 100), arb_money(0, max_minor)]
}

fn arb_line_item() -> impl Strategy<Value = LineItem> {
    prop_oneof![
        // many identical cheap lines push half-up rounding past the cost
        Just(LineItem::new("item", Decimal::ONE, Money::from_minor(100))),
        ((1i64..1_000), arb_money(1, 1_000_000)).prop_map(|(qty, price)| {
            LineItem::new("item", Decimal::from(qty), price)
        }),
    ]
}

fn arb_priority() -> impl Strategy<Value = PriorityClass> {
    prop::sample::select(vec![PriorityClass::High, PriorityClass::Medium, PriorityClass::Low])
}

/// Payables sharing a small pool of due dates and amounts, so ties in
/// the ordering key are common.
fn arb_payables() -> impl Strategy<Value = Vec<Obligation>> {
    prop::collection::vec(
        (arb_priority(), 0u64..5, prop::sample::select(vec![1_000i64, 2_500, 10_000, 50_000])),
        1..40,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (priority, offset, minor))| {
                let due = base_date() + Days::new(offset);
                Obligation::new(
                    ObligationKind::Payable,
                    CounterpartyId::new(format!("SUP-{}", i)),
                    Money::from_minor(minor),
                    base_date(),
                    due,
                )
                .with_priority(priority)
            })
            .collect()
    })
}

proptest! {
    // ===================================================================
    // INVARIANT 1: Installments sum exactly to the scheduled total.
    //
    // Rounding residue is absorbed by the last installment; no cent is
    // created or lost, and no installment is zero. Totals too small for
    // the count are rejected instead.
    // ===================================================================
    #[test]
    fn installments_sum_to_total(
        total in prop_oneof![arb_money(1, 5_000), arb_money(1, 10_000_000_000)],
        count in 1u32..=100,
        interval in 1u32..=60,
    ) {
        match InstallmentScheduler::schedule(total, count, base_date(), interval) {
            Ok(plan) => {
                prop_assert_eq!(plan.len(), count as usize);
                prop_assert_eq!(InstallmentScheduler::total(&plan), total);
                for (i, installment) in plan.iter().enumerate() {
                    prop_assert_eq!(installment.number, i as u32 + 1);
                    prop_assert!(installment.value.is_positive());
                }
            }
            Err(err) => {
                prop_assert!(matches!(err, EngineError::InvalidSchedule { .. }), "unexpected error: {:?}", err);
                // Rounding moves each installment by at most half a cent.
                let minor = total.minor_units().unwrap_or(i64::MAX);
                prop_assert!(2 * minor <= i64::from(count) * i64::from(count - 1));
            }
        }
    }

    // ===================================================================
    // INVARIANT 2: Prorated shares sum exactly to each ancillary cost and
    // none of them is negative.
    // ===================================================================
    #[test]
    fn proration_shares_sum_to_costs(
        items in prop::collection::vec(arb_line_item(), 1..20),
        freight in arb_small_or_any_money(10_000_000),
        insurance in arb_small_or_any_money(1_000_000),
        tax in arb_small_or_any_money(5_000_000),
    ) {
        let allocations = ProrationEngine::prorate(&items, freight, insurance, tax).unwrap();
        prop_assert_eq!(allocations.len(), items.len());

        for a in &allocations {
            prop_assert!(!a.freight_share.is_negative());
            prop_assert!(!a.insurance_share.is_negative());
            prop_assert!(!a.tax_share.is_negative());
            prop_assert!(a.landed_total >= a.line_value);
        }

        let freight_sum: Money = allocations.iter().map(|a| a.freight_share).sum();
        let insurance_sum: Money = allocations.iter().map(|a| a.insurance_share).sum();
        let tax_sum: Money = allocations.iter().map(|a| a.tax_share).sum();
        prop_assert_eq!(freight_sum, freight);
        prop_assert_eq!(insurance_sum, insurance);
        prop_assert_eq!(tax_sum, tax);

        let landed: Money = allocations.iter().map(|a| a.landed_total).sum();
        let values: Money = items.iter().map(|i| i.line_value()).sum();
        prop_assert_eq!(landed, values + freight + insurance + tax);
    }

    // ===================================================================
    // INVARIANT 3: Nothing accrues on the due date.
    // ===================================================================
    #[test]
    fn nothing_accrues_on_due_date(
        principal in arb_money(0, 10_000_000_000),
        interest in arb_rate(0, 1_000),
        penalty in arb_rate(0, 2_000),
        discount in arb_rate(0, 100),
        offset in 0u64..3_650,
    ) {
        let due = base_date() + Days::new(offset);
        let rates = AccrualRates::new(interest, penalty).with_discount(discount);
        let result = AccrualCalculator::accrue(principal, due, due, &rates).unwrap();
        prop_assert_eq!(result.interest, Money::ZERO);
        prop_assert_eq!(result.penalty, Money::ZERO);
        prop_assert_eq!(result.discount, Money::ZERO);
        prop_assert_eq!(result.total, principal);
    }

    // ===================================================================
    // INVARIANT 4: Interest strictly grows with each extra day late and
    // the penalty never shrinks.
    //
    // With principal >= 100.00 and rate >= 0.0001 one more day adds at
    // least a cent before rounding.
    // ===================================================================
    #[test]
    fn interest_increases_with_days_late(
        principal in arb_money(10_000, 1_000_000_000),
        interest in arb_rate(1, 100),
        penalty in arb_rate(0, 1_000),
        days in 1u64..365,
    ) {
        let due = base_date();
        let rates = AccrualRates::new(interest, penalty);
        let earlier = AccrualCalculator::accrue(principal, due, due + Days::new(days), &rates).unwrap();
        let later = AccrualCalculator::accrue(principal, due, due + Days::new(days + 1), &rates).unwrap();
        prop_assert!(later.interest > earlier.interest);
        prop_assert!(later.penalty >= earlier.penalty);
        prop_assert!(later.total > earlier.total);
    }

    // ===================================================================
    // INVARIANT 5: A new weighted average lies between the old average
    // and the incoming unit cost.
    // ===================================================================
    #[test]
    fn weighted_average_stays_within_bounds(
        on_hand in 0i64..100_000,
        avg_ten_thousandths in 0i64..10_000_000,
        incoming_qty in 1i64..100_000,
        incoming_cost in arb_money(0, 100_000),
    ) {
        let current = CostBasis::new(Decimal::from(on_hand), Decimal::new(avg_ten_thousandths, 4));
        let next = WeightedAverageCostEngine::receive(
            &current,
            Decimal::from(incoming_qty),
            incoming_cost,
        )
        .unwrap();

        let low = current.weighted_average_unit_cost.min(incoming_cost.amount());
        let high = current.weighted_average_unit_cost.max(incoming_cost.amount());
        prop_assert!(next.weighted_average_unit_cost >= low);
        prop_assert!(next.weighted_average_unit_cost <= high);
        prop_assert_eq!(next.quantity_on_hand, Decimal::from(on_hand + incoming_qty));
    }

    // ===================================================================
    // INVARIANT 6: Allocation is deterministic and never overspends.
    // ===================================================================
    #[test]
    fn allocation_is_deterministic(
        payables in arb_payables(),
        cash in arb_money(0, 200_000),
    ) {
        let first = PaymentPrioritizationEngine::allocate(cash, &payables).unwrap();
        let second = PaymentPrioritizationEngine::allocate(cash, &payables).unwrap();

        let ids = |obs: &[Obligation]| obs.iter().map(|o| o.id()).collect::<Vec<_>>();
        prop_assert_eq!(ids(&first.funded), ids(&second.funded));
        prop_assert_eq!(ids(&first.deferred), ids(&second.deferred));

        prop_assert!(first.committed <= cash);
        prop_assert_eq!(first.committed + first.remaining, cash);
        prop_assert_eq!(first.funded.len() + first.deferred.len(), payables.len());

        let committed: Money = first.funded.iter().map(|o| o.outstanding()).sum();
        prop_assert_eq!(committed, first.committed);
    }
}
