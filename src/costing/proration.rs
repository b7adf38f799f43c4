use crate::core::error::EngineError;
use crate::core::inventory::LineItem;
use crate::core::money::{round_half_up, Money, UNIT_COST_SCALE};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Share of the ancillary costs carried by one line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProrationAllocation {
    pub description: String,
    pub quantity: Decimal,
    pub line_value: Money,
    pub freight_share: Money,
    pub insurance_share: Money,
    pub tax_share: Money,
    /// Line value plus all shares.
    pub landed_total: Money,
    /// `landed_total / quantity`, at [`UNIT_COST_SCALE`] digits.
    pub landed_unit_cost: Decimal,
}

/// Distributes freight, insurance and tax across line items by value.
pub struct ProrationEngine;

impl ProrationEngine {
    /// Prorate the ancillary costs of a purchase over its line items.
    ///
    /// Each share is `cost * line_value / total_value`, rounded half-up and
    /// capped at what is left of the cost; the last line item absorbs the
    /// rounding residue so every component sums exactly to the cost it came
    /// from and no share is negative.
    ///
    /// # Errors
    ///
    /// - `EmptyLineItems` when there are no items or their total value is zero.
    /// - `InvalidQuantity` for a non-positive quantity.
    /// - `InvalidAmount` for a negative unit price or ancillary cost.
    pub fn prorate(
        line_items: &[LineItem],
        freight: Money,
        insurance: Money,
        tax: Money,
    ) -> Result<Vec<ProrationAllocation>, EngineError> {
        if line_items.is_empty() {
            return Err(EngineError::EmptyLineItems);
        }
        for item in line_items {
            if item.quantity <= Decimal::ZERO {
                return Err(EngineError::InvalidQuantity(item.quantity));
            }
            if item.unit_price.is_negative() {
                return Err(EngineError::invalid_amount(
                    item.unit_price,
                    format!("unit price of '{}' cannot be negative", item.description),
                ));
            }
        }
        for (name, cost) in [("freight", freight), ("insurance", insurance), ("tax", tax)] {
            if cost.is_negative() {
                return Err(EngineError::invalid_amount(
                    cost,
                    format!("{} cannot be negative", name),
                ));
            }
        }

        let values: Vec<Money> = line_items.iter().map(|i| i.line_value()).collect();
        let total_value: Money = values.iter().sum();
        if total_value.is_zero() {
            return Err(EngineError::EmptyLineItems);
        }

        let freight_shares = split_proportionally(freight, &values, total_value);
        let insurance_shares = split_proportionally(insurance, &values, total_value);
        let tax_shares = split_proportionally(tax, &values, total_value);

        let allocations = line_items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let landed_total = values[i] + freight_shares[i] + insurance_shares[i] + tax_shares[i];
                ProrationAllocation {
                    description: item.description.clone(),
                    quantity: item.quantity,
                    line_value: values[i],
                    freight_share: freight_shares[i],
                    insurance_share: insurance_shares[i],
                    tax_share: tax_shares[i],
                    landed_total,
                    landed_unit_cost: round_half_up(
                        landed_total.amount() / item.quantity,
                        UNIT_COST_SCALE,
                    ),
                }
            })
            .collect();

        log::debug!(
            "prorated freight {} insurance {} tax {} over {} items worth {}",
            freight,
            insurance,
            tax,
            line_items.len(),
            total_value
        );
        Ok(allocations)
    }
}

/// Split `amount` by `weights`, last part absorbing the residue.
///
/// Rounded parts never take more than what is still unassigned, so when
/// half-up rounding overshoots the residue shrinks to zero instead of
/// going negative.
fn split_proportionally(amount: Money, weights: &[Money], total: Money) -> Vec<Money> {
    let mut parts = Vec::with_capacity(weights.len());
    let mut assigned = Money::ZERO;
    for (i, weight) in weights.iter().enumerate() {
        let unassigned = amount - assigned;
        let part = if i + 1 == weights.len() {
            unassigned
        } else {
            Money::round_from(amount.amount() * weight.amount() / total.amount()).min(unassigned)
        };
        assigned += part;
        parts.push(part);
    }
    parts
}
