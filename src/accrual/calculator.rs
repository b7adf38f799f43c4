use crate::core::error::EngineError;
use crate::core::money::Money;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rate parameters for accrual, supplied by the caller's configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AccrualRates {
    /// Interest per day late, as a fraction of the principal.
    pub daily_interest_rate: Decimal,
    /// Flat penalty applied once when payment is late.
    pub fixed_penalty_rate: Decimal,
    /// Discount per day early. No early-payment discount when absent.
    #[serde(default)]
    pub daily_discount_rate: Option<Decimal>,
}

impl AccrualRates {
    pub fn new(daily_interest_rate: Decimal, fixed_penalty_rate: Decimal) -> Self {
        Self {
            daily_interest_rate,
            fixed_penalty_rate,
            daily_discount_rate: None,
        }
    }

    pub fn with_discount(mut self, daily_discount_rate: Decimal) -> Self {
        self.daily_discount_rate = Some(daily_discount_rate);
        self
    }

    /// All rates must be non-negative.
    pub fn validate(&self) -> Result<(), EngineError> {
        let named = [
            ("daily_interest_rate", Some(self.daily_interest_rate)),
            ("fixed_penalty_rate", Some(self.fixed_penalty_rate)),
            ("daily_discount_rate", self.daily_discount_rate),
        ];
        for (name, rate) in named {
            if let Some(rate) = rate {
                if rate < Decimal::ZERO {
                    return Err(EngineError::InvalidRate {
                        name: name.to_string(),
                        rate,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Position of the reference date relative to the due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccrualKind {
    OnTime,
    Late,
    Early,
}

/// Interest, penalty and discount accrued on a principal at a reference date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccrualResult {
    pub principal: Money,
    pub kind: AccrualKind,
    /// Days late or early; zero on the due date.
    pub days: i64,
    /// Daily interest rate when late, daily discount rate when early.
    pub rate_applied: Decimal,
    pub interest: Money,
    pub penalty: Money,
    pub discount: Money,
    pub total: Money,
}

impl AccrualResult {
    fn on_time(principal: Money, kind: AccrualKind, days: i64) -> Self {
        Self {
            principal,
            kind,
            days,
            rate_applied: Decimal::ZERO,
            interest: Money::ZERO,
            penalty: Money::ZERO,
            discount: Money::ZERO,
            total: principal,
        }
    }

    /// Interest plus penalty.
    pub fn accrued(&self) -> Money {
        self.interest + self.penalty
    }
}

/// Computes time-based accruals on a principal.
pub struct AccrualCalculator;

impl AccrualCalculator {
    /// Accrue interest, penalty or discount on `principal` at `reference_date`.
    ///
    /// - Late: `interest = principal * daily_interest_rate * days` and a flat
    ///   `penalty = principal * fixed_penalty_rate`.
    /// - Early, with a discount rate: `discount = principal * rate * days`,
    ///   capped at the principal.
    /// - On the due date: nothing accrues.
    ///
    /// Each component is rounded half-up to cents on its own before the
    /// total is formed, so cent-level results match previously computed
    /// figures.
    ///
    /// # Examples
    ///
    /// ```
    /// use monetary_engine::accrual::calculator::{AccrualCalculator, AccrualRates};
    /// use chrono::NaiveDate;
    /// use rust_decimal_macros::dec;
    ///
    /// let due = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    /// let today = NaiveDate::from_ymd_opt(2024, 3, 16).unwrap();
    /// let rates = AccrualRates::new(dec!(0.001), dec!(0));
    ///
    /// let result = AccrualCalculator::accrue("1500.00".parse().unwrap(), due, today, &rates).unwrap();
    /// assert_eq!(result.interest.to_string(), "22.50");
    /// assert_eq!(result.total.to_string(), "1522.50");
    /// ```
    pub fn accrue(
        principal: Money,
        due_date: NaiveDate,
        reference_date: NaiveDate,
        rates: &AccrualRates,
    ) -> Result<AccrualResult, EngineError> {
        rates.validate()?;
        if principal.is_negative() {
            return Err(EngineError::invalid_amount(
                principal,
                "principal cannot be negative",
            ));
        }

        let days = (reference_date - due_date).num_days();
        let result = if days > 0 {
            let interest = principal.mul_rounded(rates.daily_interest_rate * Decimal::from(days));
            let penalty = principal.mul_rounded(rates.fixed_penalty_rate);
            AccrualResult {
                principal,
                kind: AccrualKind::Late,
                days,
                rate_applied: rates.daily_interest_rate,
                interest,
                penalty,
                discount: Money::ZERO,
                total: principal + interest + penalty,
            }
        } else if days < 0 {
            let days_early = -days;
            match rates.daily_discount_rate {
                Some(rate) => {
                    let discount = principal
                        .mul_rounded(rate * Decimal::from(days_early))
                        .min(principal);
                    AccrualResult {
                        principal,
                        kind: AccrualKind::Early,
                        days: days_early,
                        rate_applied: rate,
                        interest: Money::ZERO,
                        penalty: Money::ZERO,
                        discount,
                        total: principal - discount,
                    }
                }
                None => AccrualResult::on_time(principal, AccrualKind::Early, days_early),
            }
        } else {
            AccrualResult::on_time(principal, AccrualKind::OnTime, 0)
        };

        log::trace!(
            "accrual on {}: {:?} {} days, total {}",
            principal,
            result.kind,
            result.days,
            result.total
        );
        Ok(result)
    }
}
