pub mod payment;
pub mod prioritization;
