//! # expense-splitter
//!
//! Financial computation engine for shared expenses.
//!
//! Given a group of participants and a ledger of expenses (each with one
//! or more payers and an equal split between a set of participants), the
//! engine works out who owes whom and a few related views of the ledger.
//! Every operation is a pure function over borrowed input that returns
//! freshly built values.
//!
//! ## Architecture
//!
//! - **core** — Participants, expenses, the ledger snapshot, balances, money tolerance
//! - **optimization** — Settlement minimization, subset selection, categorization, scheduling
//! - **simulation** — Random ledger generation for benchmarks and demos
//! - **config** — Engine configuration
//!
//! ## Example
//!
//! ```
//! use expense_splitter::prelude::*;
//! use rust_decimal_macros::dec;
//!
//! let people = vec![
//!     Participant::new("a", "Ana"),
//!     Participant::new("b", "Ben"),
//!     Participant::new("c", "Cleo"),
//! ];
//! let dinner = Expense::new("Dinner", dec!(90))
//!     .paid_by("a", dec!(90))
//!     .split_between(["a", "b", "c"]);
//!
//! let balances = compute_balances(&people, &[dinner]).unwrap();
//! let settlements = minimize_transactions(&balances, &people);
//!
//! assert_eq!(settlements.len(), 2);
//! assert_eq!(settlements[0].to, "Ana");
//! assert_eq!(settlements[0].amount, dec!(30));
//! ```

pub mod config;
pub mod core;
pub mod optimization;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::core::balance::{compute_balances, BalanceCalculator, Balances};
    pub use crate::core::error::{EngineError, Result};
    pub use crate::core::expense::{Contribution, Expense, Ledger};
    pub use crate::core::participant::{Participant, ParticipantId};
    pub use crate::optimization::categorizer::{categorize_expenses, Categorizer, ExpenseCategory};
    pub use crate::optimization::scheduler::{schedule_payments, PaymentScheduler, ScheduledPayment};
    pub use crate::optimization::settlement::{
        minimize_transactions, Settlement, SettlementMinimizer, SettlementPlan,
    };
    pub use crate::optimization::subset::{optimize_expense_groups, SubsetOptimizer, SubsetSelection};
}
