pub mod installments;
pub mod renegotiation;
