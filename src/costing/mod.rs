pub mod proration;
pub mod weighted_average;
