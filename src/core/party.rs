use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the counterparty behind an obligation: the supplier of a
/// payable or the client of a receivable.
///
/// # Examples
///
/// ```
/// use monetary_engine::core::party::CounterpartyId;
///
/// let supplier = CounterpartyId::new("SUP-0042");
/// assert_eq!(supplier.as_str(), "SUP-0042");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CounterpartyId(String);

impl CounterpartyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CounterpartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for CounterpartyId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counterparty_equality() {
        assert_eq!(CounterpartyId::new("SUP-1"), CounterpartyId::from("SUP-1"));
        assert_ne!(CounterpartyId::new("SUP-1"), CounterpartyId::new("CLI-1"));
    }

    #[test]
    fn test_counterparty_display() {
        assert_eq!(format!("{}", CounterpartyId::new("CLI-77")), "CLI-77");
    }
}
