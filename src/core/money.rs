use crate::core::error::EngineError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Fractional digits carried by every [`Money`] value.
pub const MONEY_SCALE: u32 = 2;

/// Fractional digits kept internally for unit costs (weighted average,
/// landed cost). Rounded to [`MONEY_SCALE`] only for presentation.
pub const UNIT_COST_SCALE: u32 = 4;

/// Round half-up (midpoint away from zero) to `dp` fractional digits.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// An exact monetary amount with exactly two fractional digits.
///
/// `Money` is never built from a binary float. Values come from integer
/// minor units, from a decimal string, or from a computed [`Decimal`]
/// through an explicit half-up rounding step.
///
/// # Examples
///
/// ```
/// use monetary_engine::core::money::Money;
///
/// let price: Money = "840.00".parse().unwrap();
/// assert_eq!(price, Money::from_minor(84_000));
/// assert_eq!(price.to_string(), "840.00");
///
/// // Sub-cent precision is rejected instead of silently rounded.
/// assert!("10.005".parse::<Money>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Build from integer minor units (cents).
    pub fn from_minor(minor: i64) -> Self {
        Money(Decimal::new(minor, MONEY_SCALE))
    }

    /// Build from an exact decimal. Fails if the value carries sub-cent
    /// precision.
    pub fn from_decimal(value: Decimal) -> Result<Self, EngineError> {
        if value.normalize().scale() > MONEY_SCALE {
            return Err(EngineError::invalid_amount(
                value,
                "more than 2 fractional digits",
            ));
        }
        Ok(Self::rescaled(value))
    }

    /// Build from a computed decimal, rounding half-up to cents.
    pub fn round_from(value: Decimal) -> Self {
        Self::rescaled(round_half_up(value, MONEY_SCALE))
    }

    /// Parse a plain decimal string such as `"1500.00"` or `"-3.5"`.
    pub fn parse(input: &str) -> Result<Self, EngineError> {
        let trimmed = input.trim();
        let digits = trimmed.strip_prefix(['-', '+']).unwrap_or(trimmed);
        let well_formed = !digits.is_empty()
            && digits.chars().filter(|c| *c == '.').count() <= 1
            && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
            && digits.chars().any(|c| c.is_ascii_digit());
        if !well_formed {
            return Err(EngineError::invalid_amount(input, "not a decimal number"));
        }
        let value = Decimal::from_str_exact(trimmed)
            .map_err(|e| EngineError::invalid_amount(input, e.to_string()))?;
        Self::from_decimal(value)
    }

    fn rescaled(mut value: Decimal) -> Self {
        value.rescale(MONEY_SCALE);
        Money(value)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Amount in minor units, if it fits in an `i64`.
    pub fn minor_units(&self) -> Option<i64> {
        i64::try_from(self.0.mantissa()).ok()
    }

    /// Multiply by a rate or quantity and round the product half-up to cents.
    pub fn mul_rounded(&self, factor: Decimal) -> Money {
        Money::round_from(self.0 * factor)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn abs(&self) -> Money {
        Money(self.0.abs())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut value = self.0;
        value.rescale(MONEY_SCALE);
        f.pad(&value.to_string())
    }
}

impl FromStr for Money {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl TryFrom<String> for Money {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Money::parse(&value)
    }
}

impl From<Money> for String {
    fn from(money: Money) -> Self {
        money.to_string()
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money::rescaled(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money::rescaled(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money::ZERO - self
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}
