use crate::core::money::{round_half_up, Money, UNIT_COST_SCALE};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line of a purchase or sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Money,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Money) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
        }
    }

    /// `quantity * unit_price`, rounded half-up to cents.
    pub fn line_value(&self) -> Money {
        self.unit_price.mul_rounded(self.quantity)
    }
}

/// Quantity on hand and its weighted-average unit cost.
///
/// The unit cost is held at [`UNIT_COST_SCALE`] fractional digits;
/// [`CostBasis::presentation_cost`] rounds it to cents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBasis {
    pub quantity_on_hand: Decimal,
    pub weighted_average_unit_cost: Decimal,
}

impl CostBasis {
    pub fn new(quantity_on_hand: Decimal, weighted_average_unit_cost: Decimal) -> Self {
        Self {
            quantity_on_hand,
            weighted_average_unit_cost: round_half_up(weighted_average_unit_cost, UNIT_COST_SCALE),
        }
    }

    /// No stock and no cost history.
    pub fn empty() -> Self {
        Self::new(Decimal::ZERO, Decimal::ZERO)
    }

    /// Unit cost rounded to cents.
    pub fn presentation_cost(&self) -> Money {
        Money::round_from(self.weighted_average_unit_cost)
    }

    /// Value of the stock on hand, rounded to cents.
    pub fn inventory_value(&self) -> Money {
        Money::round_from(self.quantity_on_hand * self.weighted_average_unit_cost)
    }
}
