pub mod error;
pub mod inventory;
pub mod money;
pub mod obligation;
pub mod party;
