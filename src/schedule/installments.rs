use crate::core::error::EngineError;
use crate::core::money::Money;
use crate::core::obligation::Installment;
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

/// Splits a total into installments with exact remainder absorption.
pub struct InstallmentScheduler;

impl InstallmentScheduler {
    /// Split `total` into `count` installments.
    ///
    /// Installments `1..count-1` carry `round_half_up(total / count)`; the
    /// last one absorbs the rounding residue so the plan sums exactly to
    /// `total`. Installment `i` (0-based) is due on
    /// `first_due_date + i * interval_days`.
    ///
    /// # Errors
    ///
    /// `InvalidSchedule` when `count == 0`, when `total` is not positive,
    /// when any installment would come out at zero or below (too many
    /// installments for too small a total), or when a due date
    /// falls outside the calendar range.
    ///
    /// # Examples
    ///
    /// ```
    /// use monetary_engine::schedule::installments::InstallmentScheduler;
    /// use monetary_engine::core::money::Money;
    /// use chrono::NaiveDate;
    ///
    /// let first = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    /// let plan = InstallmentScheduler::schedule("100.00".parse().unwrap(), 3, first, 30).unwrap();
    ///
    /// let values: Vec<String> = plan.iter().map(|i| i.value.to_string()).collect();
    /// assert_eq!(values, ["33.33", "33.33", "33.34"]);
    /// assert_eq!(plan[2].due_date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    /// ```
    pub fn schedule(
        total: Money,
        count: u32,
        first_due_date: NaiveDate,
        interval_days: u32,
    ) -> Result<Vec<Installment>, EngineError> {
        if count == 0 {
            return Err(EngineError::invalid_schedule(
                "installment count must be at least 1",
            ));
        }
        if !total.is_positive() {
            return Err(EngineError::invalid_schedule(format!(
                "total must be positive, got {}",
                total
            )));
        }

        let base = Money::round_from(total.amount() / Decimal::from(count));
        let last = total - base.mul_rounded(Decimal::from(count - 1));
        if !base.is_positive() || !last.is_positive() {
            return Err(EngineError::invalid_schedule(format!(
                "{} cannot be split into {} installments",
                total, count
            )));
        }

        let mut installments = Vec::with_capacity(count as usize);
        for i in 0..count {
            let offset = u64::from(i) * u64::from(interval_days);
            let due_date = first_due_date
                .checked_add_days(Days::new(offset))
                .ok_or_else(|| {
                    EngineError::invalid_schedule(format!(
                        "due date of installment {} is out of range",
                        i + 1
                    ))
                })?;
            let value = if i + 1 == count { last } else { base };
            installments.push(Installment::new(i + 1, value, due_date));
        }

        log::debug!(
            "scheduled {} installments of {} (last {}) totalling {}",
            count,
            base,
            last,
            total
        );
        Ok(installments)
    }

    /// Sum of installment values.
    pub fn total(installments: &[Installment]) -> Money {
        installments.iter().map(|i| i.value).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn test_even_split() {
        let plan = InstallmentScheduler::schedule(money("840.00"), 4, date(2024, 1, 10), 30).unwrap();
        assert_eq!(plan.len(), 4);
        for installment in &plan {
            assert_eq!(installment.value, money("210.00"));
        }
        assert_eq!(InstallmentScheduler::total(&plan), money("840.00"));
    }

    #[test]
    fn test_remainder_goes_to_last() {
        let plan = InstallmentScheduler::schedule(money("1000.00"), 3, date(2024, 1, 10), 30).unwrap();
        assert_eq!(plan[0].value, money("333.33"));
        assert_eq!(plan[1].value, money("333.33"));
        assert_eq!(plan[2].value, money("333.34"));
    }

    #[test]
    fn test_half_up_base_makes_last_smaller() {
        // 100.00 / 6 = 16.666.. -> 16.67, last = 100 - 83.35
        let plan = InstallmentScheduler::schedule(money("100.00"), 6, date(2024, 1, 10), 30).unwrap();
        assert_eq!(plan[0].value, money("16.67"));
        assert_eq!(plan[5].value, money("16.65"));
        assert_eq!(InstallmentScheduler::total(&plan), money("100.00"));
    }

    #[test]
    fn test_single_installment() {
        let plan = InstallmentScheduler::schedule(money("99.99"), 1, date(2024, 5, 1), 30).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].value, money("99.99"));
        assert_eq!(plan[0].number, 1);
        assert_eq!(plan[0].due_date, date(2024, 5, 1));
    }

    #[test]
    fn test_due_dates_and_numbers() {
        let plan = InstallmentScheduler::schedule(money("300.00"), 3, date(2024, 1, 31), 30).unwrap();
        let dates: Vec<NaiveDate> = plan.iter().map(|i| i.due_date).collect();
        assert_eq!(dates, vec![date(2024, 1, 31), date(2024, 3, 1), date(2024, 3, 31)]);
        let numbers: Vec<u32> = plan.iter().map(|i| i.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_zero_count_rejected() {
        let err = InstallmentScheduler::schedule(money("100.00"), 0, date(2024, 1, 1), 30).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSchedule { .. }));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_non_positive_total_rejected() {
        assert!(InstallmentScheduler::schedule(Money::ZERO, 2, date(2024, 1, 1), 30).is_err());
        assert!(InstallmentScheduler::schedule(money("-10.00"), 2, date(2024, 1, 1), 30).is_err());
    }

    #[test]
    fn test_total_too_small_for_count() {
        // base rounds to 0.02, nine of them exceed the total
        let err = InstallmentScheduler::schedule(money("0.15"), 10, date(2024, 1, 1), 30).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSchedule { .. }));
    }

    #[test]
    fn test_zero_base_installment_rejected() {
        // 0.04 / 10 rounds to 0.00; nine empty installments are not a plan
        let err = InstallmentScheduler::schedule(money("0.04"), 10, date(2024, 1, 1), 30).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSchedule { .. }));

        // one cent per installment is still fine
        let plan = InstallmentScheduler::schedule(money("0.10"), 10, date(2024, 1, 1), 30).unwrap();
        assert!(plan.iter().all(|i| i.value == money("0.01")));
    }
}
