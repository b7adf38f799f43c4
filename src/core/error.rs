use crate::core::obligation::ObligationStatus;
use rust_decimal::Decimal;
use thiserror::Error;

/// Broad classification of engine failures.
///
/// Callers map these onto user-facing responses; the engine itself never
/// retries or recovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input. Retrying with the same input cannot succeed.
    Validation,
    /// Loaded state fails a structural invariant. Fatal for that obligation.
    InvariantViolation,
    /// Operation not permitted in the obligation's lifecycle state.
    DomainState,
}

/// Errors produced by the calculation engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid schedule: {reason}")]
    InvalidSchedule { reason: String },

    #[error("invalid amount '{value}': {reason}")]
    InvalidAmount { value: String, reason: String },

    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(Decimal),

    #[error("line items are empty or have zero total value")]
    EmptyLineItems,

    #[error("rate '{name}' is invalid: {rate}")]
    InvalidRate { name: String, rate: Decimal },

    #[error("withholding rates sum to {total}, which exceeds 1")]
    RateSumExceedsOne { total: Decimal },

    #[error("payment of {payment} exceeds outstanding balance {outstanding}")]
    PaymentExceedsOutstanding { payment: Decimal, outstanding: Decimal },

    #[error("installments sum to {actual} but principal is {expected}")]
    InstallmentSumMismatch { expected: Decimal, actual: Decimal },

    #[error("inconsistent obligation: {reason}")]
    InconsistentObligation { reason: String },

    #[error("obligation is already {status}")]
    AlreadySettled { status: ObligationStatus },

    #[error("cannot {action} an obligation that is {status}")]
    InvalidTransition {
        action: &'static str,
        status: ObligationStatus,
    },
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::InvalidSchedule { .. }
            | EngineError::InvalidAmount { .. }
            | EngineError::InvalidQuantity(_)
            | EngineError::EmptyLineItems
            | EngineError::InvalidRate { .. }
            | EngineError::RateSumExceedsOne { .. }
            | EngineError::PaymentExceedsOutstanding { .. } => ErrorKind::Validation,
            EngineError::InstallmentSumMismatch { .. }
            | EngineError::InconsistentObligation { .. } => ErrorKind::InvariantViolation,
            EngineError::AlreadySettled { .. } | EngineError::InvalidTransition { .. } => {
                ErrorKind::DomainState
            }
        }
    }

    pub(crate) fn invalid_schedule(reason: impl Into<String>) -> Self {
        EngineError::InvalidSchedule {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_amount(value: impl ToString, reason: impl Into<String>) -> Self {
        EngineError::InvalidAmount {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_kinds() {
        assert_eq!(EngineError::EmptyLineItems.kind(), ErrorKind::Validation);
        assert_eq!(
            EngineError::InvalidQuantity(dec!(0)).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            EngineError::InstallmentSumMismatch {
                expected: dec!(100),
                actual: dec!(99.99),
            }
            .kind(),
            ErrorKind::InvariantViolation
        );
        assert_eq!(
            EngineError::AlreadySettled {
                status: ObligationStatus::Settled,
            }
            .kind(),
            ErrorKind::DomainState
        );
    }

    #[test]
    fn test_error_messages() {
        let err = EngineError::AlreadySettled {
            status: ObligationStatus::Cancelled,
        };
        assert_eq!(err.to_string(), "obligation is already cancelled");

        let err = EngineError::invalid_schedule("installment count must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid schedule: installment count must be at least 1"
        );
    }
}
