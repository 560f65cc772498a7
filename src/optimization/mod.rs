pub mod categorizer;
pub mod scheduler;
pub mod settlement;
pub mod subset;
