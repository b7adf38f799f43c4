//! # monetary-engine
//!
//! Deterministic monetary calculations for accounts payable and receivable,
//! inventory costing and tax withholding.
//!
//! Every amount is a scale-2 [`Money`](core::money::Money) backed by an
//! exact decimal; rounding is half-up and any residue is absorbed by the
//! last element of a split, so parts always sum to their whole.
//!
//! ## Architecture
//!
//! - **core**: money, errors, counterparties, obligations, inventory types
//! - **schedule**: installment plans and renegotiation
//! - **accrual**: interest, penalty and early-payment discount
//! - **costing**: weighted-average cost and landed-cost proration
//! - **settlement**: partial payments and cash prioritization
//! - **tax**: withholding on gross amounts
//! - **config**: caller-supplied rate defaults
//! - **simulation**: random portfolios for stress testing

pub mod accrual;
pub mod config;
pub mod core;
pub mod costing;
pub mod schedule;
pub mod settlement;
pub mod tax;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::accrual::calculator::{AccrualCalculator, AccrualRates, AccrualResult};
    pub use crate::config::EngineConfig;
    pub use crate::core::error::{EngineError, ErrorKind};
    pub use crate::core::inventory::{CostBasis, LineItem};
    pub use crate::core::money::Money;
    pub use crate::core::obligation::{
        Obligation, ObligationKind, ObligationStatus, Portfolio, PriorityClass,
    };
    pub use crate::core::party::CounterpartyId;
    pub use crate::costing::proration::ProrationEngine;
    pub use crate::costing::weighted_average::WeightedAverageCostEngine;
    pub use crate::schedule::installments::InstallmentScheduler;
    pub use crate::schedule::renegotiation::{RenegotiationEngine, RenegotiationTerms};
    pub use crate::settlement::payment::{Payment, SettlementEngine};
    pub use crate::settlement::prioritization::{AllocationResult, PaymentPrioritizationEngine};
    pub use crate::tax::withholding::TaxWithholdingCalculator;
}
