//! Weekend trip walkthrough.
//!
//! Four friends share a hotel, meals and tickets, then work out who pays
//! whom and when.

use chrono::NaiveDate;
use expense_splitter::prelude::*;
use rust_decimal_macros::dec;

fn main() {
    println!("━━━ Weekend Trip ━━━\n");

    let mut ledger = Ledger::new();
    ledger.add_participant(Participant::new("1", "Anannya"));
    ledger.add_participant(Participant::new("2", "Trayee"));
    ledger.add_participant(Participant::new("3", "Lakshit"));
    ledger.add_participant(Participant::new("4", "Mira"));

    ledger.add_expense(
        Expense::new("Hotel booking", dec!(480))
            .paid_by("1", dec!(300))
            .paid_by("2", dec!(180))
            .split_between(["1", "2", "3", "4"]),
    );
    ledger.add_expense(
        Expense::new("Dinner at the harbour", dec!(120))
            .paid_by("3", dec!(120))
            .split_between(["1", "2", "3"]),
    );
    ledger.add_expense(
        Expense::new("Train tickets", dec!(64))
            .paid_by("4", dec!(64))
            .split_between(["3", "4"]),
    );
    ledger.add_expense(
        Expense::new("Coffee and pastries", dec!(18))
            .paid_by("2", dec!(18))
            .split_between(["1", "2"]),
    );

    if let Err(e) = ledger.validate() {
        eprintln!("Ledger rejected: {}", e);
        return;
    }

    let balances = match compute_balances(ledger.participants(), ledger.expenses()) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Cannot compute balances: {}", e);
            return;
        }
    };
    println!("{}", balances);

    let plan = SettlementPlan::from_balances(&balances, ledger.participants());
    println!("{}", plan);

    let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default();
    println!("━━━ Payment Schedule (7 days) ━━━\n");
    for payment in schedule_payments(plan.settlements(), start, 7) {
        println!("  {}", payment);
    }
    println!();

    println!("━━━ Categories ━━━\n");
    for category in categorize_expenses(ledger.expenses(), 2) {
        println!("{}", category);
    }

    match SubsetOptimizer::select(ledger.expenses(), dec!(200), &EngineConfig::default()) {
        Ok(selection) => println!("{}", selection),
        Err(e) => eprintln!("Subset selection failed: {}", e),
    }
}
