use crate::config::EngineConfig;
use crate::core::error::{EngineError, Result};
use crate::core::expense::Expense;
use crate::core::money::to_cents;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of picking the expense subset that best fills a target amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsetSelection {
    pub selected: Vec<Expense>,
    pub total: Decimal,
    pub target: Decimal,
}

impl SubsetSelection {
    /// How far the selection falls short of the target.
    pub fn difference(&self) -> Decimal {
        self.target - self.total
    }

    pub fn is_exact(&self) -> bool {
        self.difference() == Decimal::ZERO
    }
}

impl fmt::Display for SubsetSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Optimized Expense Group ===")?;
        if self.selected.is_empty() {
            return writeln!(f, "No combination of expenses fits within {}", self.target);
        }
        for e in &self.selected {
            writeln!(f, "  {:<32} {:>12}", e.description(), e.amount().to_string())?;
        }
        writeln!(f, "Total:          {}", self.total)?;
        writeln!(f, "Target:         {}", self.target)?;
        writeln!(f, "Difference:     {}", self.difference())
    }
}

/// Exact 0/1 knapsack over expense amounts.
pub struct SubsetOptimizer;

impl SubsetOptimizer {
    /// Select the subset of `expenses` with the largest total that does
    /// not exceed `target`, using the default configuration.
    pub fn optimize(expenses: &[Expense], target: Decimal) -> Result<Vec<Expense>> {
        Self::optimize_with(expenses, target, &EngineConfig::default())
    }

    /// Like [`SubsetOptimizer::optimize`], bounded by `config.max_subset_cells`.
    ///
    /// # Algorithm
    ///
    /// Amounts and target are converted to integer cents. Value equals
    /// weight, so `best[w]` is the largest total reachable with capacity
    /// `w`. Rows are folded into one array (iterating capacity downwards),
    /// while a per-item bit table records whether the item was taken at
    /// each capacity; backtracking from the full target recovers the
    /// subset. On equal totals the current item is taken.
    ///
    /// Time and memory are `O(n * target_cents)`.
    ///
    /// # Errors
    ///
    /// [`EngineError::SubsetTableTooLarge`] when `n * (target_cents + 1)`
    /// exceeds the configured ceiling.
    pub fn optimize_with(
        expenses: &[Expense],
        target: Decimal,
        config: &EngineConfig,
    ) -> Result<Vec<Expense>> {
        if target <= Decimal::ZERO {
            return Ok(Vec::new());
        }
        let too_large = |cells: u128| EngineError::SubsetTableTooLarge {
            cells,
            limit: config.max_subset_cells,
        };
        let capacity = to_cents(target).ok_or_else(|| too_large(u128::MAX))?;

        // Amounts that round to zero cents add nothing to the total.
        let eligible: Vec<(&Expense, u64)> = expenses
            .iter()
            .filter(|e| e.amount() <= target)
            .filter_map(|e| to_cents(e.amount()).map(|cents| (e, cents)))
            .filter(|(_, cents)| *cents > 0 && *cents <= capacity)
            .collect();

        if eligible.is_empty() {
            return Ok(Vec::new());
        }

        let width = capacity as u128 + 1;
        let cells = eligible.len() as u128 * width;
        if cells > config.max_subset_cells as u128 {
            return Err(too_large(cells));
        }
        let width = width as usize;

        log::debug!(
            "subset table: {} eligible expenses x {} cents ({} cells)",
            eligible.len(),
            capacity,
            cells
        );

        let mut best = vec![0u64; width];
        let mut taken = vec![false; eligible.len() * width];

        for (i, (_, weight)) in eligible.iter().enumerate() {
            let weight = *weight as usize;
            let row = &mut taken[i * width..(i + 1) * width];
            for w in (weight..width).rev() {
                let include = weight as u64 + best[w - weight];
                if include >= best[w] {
                    best[w] = include;
                    row[w] = true;
                }
            }
        }

        let mut selected = Vec::new();
        let mut w = width - 1;
        for i in (0..eligible.len()).rev() {
            if taken[i * width + w] {
                selected.push(eligible[i].0.clone());
                w -= eligible[i].1 as usize;
            }
        }
        selected.reverse();
        Ok(selected)
    }

    /// Run the optimizer and package the result with its totals.
    pub fn select(
        expenses: &[Expense],
        target: Decimal,
        config: &EngineConfig,
    ) -> Result<SubsetSelection> {
        let selected = Self::optimize_with(expenses, target, config)?;
        let total = selected.iter().map(|e| e.amount()).sum();
        Ok(SubsetSelection {
            selected,
            total,
            target,
        })
    }
}

/// Free-function form of [`SubsetOptimizer::optimize`].
pub fn optimize_expense_groups(expenses: &[Expense], target: Decimal) -> Result<Vec<Expense>> {
    SubsetOptimizer::optimize(expenses, target)
}
