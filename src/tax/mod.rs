pub mod withholding;
