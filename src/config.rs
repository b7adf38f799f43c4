//! Rate and scheduling defaults supplied to the engine by its caller.
//!
//! The engine never reads configuration on its own; the surrounding
//! service (or the CLI) loads an [`EngineConfig`] and passes the values in.
//!
//! ```json
//! {
//!   "accrual": {
//!     "daily_interest_rate": "0.00033",
//!     "fixed_penalty_rate": "0.02",
//!     "daily_discount_rate": "0.0005"
//!   },
//!   "withholding": { "irrf": "0.015", "iss": "0.05" },
//!   "default_interval_days": 30,
//!   "default_installments": 1
//! }
//! ```

use crate::accrual::calculator::AccrualRates;
use crate::core::error::EngineError;
use crate::tax::withholding::validate_rates;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors arising from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(#[from] EngineError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub accrual: AccrualRates,
    /// Named withholding rates, e.g. `irrf`, `iss`, `inss`.
    pub withholding: BTreeMap<String, Decimal>,
    pub default_interval_days: u32,
    pub default_installments: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            accrual: AccrualRates::default(),
            withholding: BTreeMap::new(),
            default_interval_days: 30,
            default_installments: 1,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loading engine config from {}", path.display());
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.accrual.validate()?;
        validate_rates(&self.withholding)?;
        if self.default_installments == 0 {
            return Err(EngineError::InvalidSchedule {
                reason: "default_installments must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
