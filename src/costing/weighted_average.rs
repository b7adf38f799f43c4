use crate::core::error::EngineError;
use crate::core::inventory::CostBasis;
use crate::core::money::{round_half_up, Money, UNIT_COST_SCALE};
use rust_decimal::Decimal;

/// Folds inventory receipts into a weighted-average unit cost.
pub struct WeightedAverageCostEngine;

impl WeightedAverageCostEngine {
    /// Receive `incoming_qty` units at `incoming_unit_cost`.
    ///
    /// ```text
    /// new_qty = qty + incoming_qty
    /// new_avg = (qty * avg + incoming_qty * incoming_unit_cost) / new_qty
    /// ```
    ///
    /// The average is kept at [`UNIT_COST_SCALE`] digits.
    ///
    /// # Examples
    ///
    /// ```
    /// use monetary_engine::core::inventory::CostBasis;
    /// use monetary_engine::costing::weighted_average::WeightedAverageCostEngine;
    /// use rust_decimal_macros::dec;
    ///
    /// let current = CostBasis::new(dec!(50), dec!(25.00));
    /// let next = WeightedAverageCostEngine::receive(&current, dec!(30), "30.00".parse().unwrap()).unwrap();
    ///
    /// assert_eq!(next.quantity_on_hand, dec!(80));
    /// assert_eq!(next.weighted_average_unit_cost, dec!(26.875));
    /// ```
    pub fn receive(
        current: &CostBasis,
        incoming_qty: Decimal,
        incoming_unit_cost: Money,
    ) -> Result<CostBasis, EngineError> {
        if incoming_qty <= Decimal::ZERO {
            return Err(EngineError::InvalidQuantity(incoming_qty));
        }
        if current.quantity_on_hand < Decimal::ZERO {
            return Err(EngineError::InvalidQuantity(current.quantity_on_hand));
        }
        if incoming_unit_cost.is_negative() {
            return Err(EngineError::invalid_amount(
                incoming_unit_cost,
                "unit cost cannot be negative",
            ));
        }

        let new_qty = current.quantity_on_hand + incoming_qty;
        let existing_value = current.quantity_on_hand * current.weighted_average_unit_cost;
        let incoming_value = incoming_qty * incoming_unit_cost.amount();
        let new_avg = round_half_up((existing_value + incoming_value) / new_qty, UNIT_COST_SCALE);

        log::debug!(
            "receipt of {} @ {}: average {} -> {}",
            incoming_qty,
            incoming_unit_cost,
            current.weighted_average_unit_cost,
            new_avg
        );

        Ok(CostBasis {
            quantity_on_hand: new_qty,
            weighted_average_unit_cost: new_avg,
        })
    }

    /// Fold a sequence of `(quantity, unit_cost)` receipts in order.
    pub fn receive_all<I>(current: &CostBasis, receipts: I) -> Result<CostBasis, EngineError>
    where
        I: IntoIterator<Item = (Decimal, Money)>,
    {
        receipts
            .into_iter()
            .try_fold(*current, |basis, (qty, cost)| Self::receive(&basis, qty, cost))
    }
}
