pub mod balance;
pub mod error;
pub mod expense;
pub mod money;
pub mod participant;
