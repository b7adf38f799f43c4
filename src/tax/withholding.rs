use crate::core::error::EngineError;
use crate::core::money::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statutory withholdings on a gross amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithholdingResult {
    pub gross: Money,
    /// Amount withheld per named tax (e.g. `irrf`, `iss`, `inss`).
    pub withheld: BTreeMap<String, Money>,
    pub total_withheld: Money,
    /// `gross - total_withheld`.
    pub net: Money,
}

/// Computes withholdings and the resulting net payable.
pub struct TaxWithholdingCalculator;

impl TaxWithholdingCalculator {
    /// Withhold each named rate from `gross`.
    ///
    /// Every withholding is rounded half-up to cents on its own; the total
    /// is the sum of the rounded parts.
    ///
    /// # Errors
    ///
    /// `InvalidRate` for a negative rate, `RateSumExceedsOne` when the rates
    /// add up to more than 1, `InvalidAmount` for a negative gross or when
    /// the individually rounded withholdings add up to more than the gross.
    ///
    /// # Examples
    ///
    /// ```
    /// use monetary_engine::tax::withholding::TaxWithholdingCalculator;
    /// use rust_decimal_macros::dec;
    /// use std::collections::BTreeMap;
    ///
    /// let rates = BTreeMap::from([
    ///     ("irrf".to_string(), dec!(0.015)),
    ///     ("iss".to_string(), dec!(0.05)),
    ///     ("inss".to_string(), dec!(0.11)),
    /// ]);
    /// let result = TaxWithholdingCalculator::withhold("5000.00".parse().unwrap(), &rates).unwrap();
    /// assert_eq!(result.total_withheld.to_string(), "875.00");
    /// assert_eq!(result.net.to_string(), "4125.00");
    /// ```
    pub fn withhold(
        gross: Money,
        rates: &BTreeMap<String, Decimal>,
    ) -> Result<WithholdingResult, EngineError> {
        validate_rates(rates)?;
        if gross.is_negative() {
            return Err(EngineError::invalid_amount(gross, "gross cannot be negative"));
        }

        let withheld: BTreeMap<String, Money> = rates
            .iter()
            .map(|(name, rate)| (name.clone(), gross.mul_rounded(*rate)))
            .collect();
        let total_withheld: Money = withheld.values().sum();
        if total_withheld > gross {
            return Err(EngineError::invalid_amount(
                gross,
                format!("rounded withholdings of {} exceed the gross amount", total_withheld),
            ));
        }
        let net = gross - total_withheld;

        log::debug!(
            "withheld {} of {} across {} taxes",
            total_withheld,
            gross,
            withheld.len()
        );

        Ok(WithholdingResult {
            gross,
            withheld,
            total_withheld,
            net,
        })
    }
}

/// Rates must be non-negative and sum to at most 1.
pub fn validate_rates(rates: &BTreeMap<String, Decimal>) -> Result<(), EngineError> {
    for (name, rate) in rates {
        if *rate < Decimal::ZERO {
            return Err(EngineError::InvalidRate {
                name: name.clone(),
                rate: *rate,
            });
        }
    }
    let total: Decimal = rates.values().sum();
    if total > Decimal::ONE {
        return Err(EngineError::RateSumExceedsOne { total });
    }
    Ok(())
}
