//! Random ledger generation for benchmarks, demos and the `generate` command.
//!
//! Generated expenses always pass [`Expense::validate`]: contributions
//! add up to the amount exactly and every split set is non-empty.

use crate::core::expense::{Expense, Ledger};
use crate::core::participant::Participant;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

const DESCRIPTIONS: &[&str] = &[
    "Dinner at the harbour",
    "Grocery run",
    "Train tickets",
    "Hotel booking",
    "Coffee and pastries",
    "Museum tickets",
    "Taxi to airport",
    "Grocery restock",
    "Dinner delivery",
    "Concert tickets",
];

/// Shape of a generated ledger.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub participant_count: usize,
    pub expense_count: usize,
    /// Smallest expense, in cents.
    pub min_cents: u64,
    /// Largest expense, in cents.
    pub max_cents: u64,
    /// Most payers a single expense may have.
    pub max_payers: usize,
    /// Fixed seed for reproducible ledgers; `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            participant_count: 5,
            expense_count: 20,
            min_cents: 100,
            max_cents: 50_000,
            max_payers: 3,
            seed: None,
        }
    }
}

/// Generate a random, valid ledger.
pub fn generate_random_ledger(config: &LedgerConfig) -> Ledger {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let participants: Vec<Participant> = (0..config.participant_count.max(1))
        .map(|i| Participant::new(format!("P-{:03}", i), format!("Member {}", i + 1)))
        .collect();

    let mut ledger = Ledger::new();
    for p in &participants {
        ledger.add_participant(p.clone());
    }

    let min_cents = config.min_cents.max(1);
    let max_cents = config.max_cents.max(min_cents);

    for i in 0..config.expense_count {
        let cents = rng.gen_range(min_cents..=max_cents);
        let amount = Decimal::new(cents as i64, 2);
        let description = DESCRIPTIONS[rng.gen_range(0..DESCRIPTIONS.len())];

        let mut expense = Expense::with_id(format!("EXP-{:04}", i), description, amount);

        // Split the amount in whole cents between a few distinct payers.
        let payer_count = rng
            .gen_range(1..=config.max_payers.max(1))
            .min(participants.len())
            .min(cents as usize);
        let payers: Vec<&Participant> = participants
            .choose_multiple(&mut rng, payer_count)
            .collect();
        let mut remaining = cents;
        for (n, payer) in payers.iter().enumerate() {
            let share = if n + 1 == payers.len() {
                remaining
            } else {
                let left_for_others = (payers.len() - n - 1) as u64;
                rng.gen_range(1..=remaining - left_for_others)
            };
            remaining -= share;
            expense.add_contribution(payer.id.clone(), Decimal::new(share as i64, 2));
        }

        let split_count = rng.gen_range(1..=participants.len());
        let split: Vec<_> = participants
            .choose_multiple(&mut rng, split_count)
            .map(|p| p.id.clone())
            .collect();

        ledger.add_expense(expense.split_between(split));
    }

    ledger
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::balance::compute_balances;

    #[test]
    fn test_generated_ledger_is_valid() {
        let config = LedgerConfig {
            participant_count: 6,
            expense_count: 40,
            ..Default::default()
        };
        let ledger = generate_random_ledger(&config);

        assert_eq!(ledger.participants().len(), 6);
        assert_eq!(ledger.expenses().len(), 40);
        assert!(ledger.validate().is_ok());
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let config = LedgerConfig {
            seed: Some(7),
            ..Default::default()
        };
        let a = generate_random_ledger(&config);
        let b = generate_random_ledger(&config);
        let amounts_a: Vec<_> = a.expenses().iter().map(|e| e.amount()).collect();
        let amounts_b: Vec<_> = b.expenses().iter().map(|e| e.amount()).collect();
        assert_eq!(amounts_a, amounts_b);
    }

    #[test]
    fn test_generated_balances_sum_to_zero() {
        let ledger = generate_random_ledger(&LedgerConfig::default());
        let balances = compute_balances(ledger.participants(), ledger.expenses()).unwrap();
        assert!(balances.is_balanced());
    }
}
