use crate::config::EngineConfig;
use crate::core::expense::Expense;
use crate::core::money::round_money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Label used when no description word qualifies.
pub const FALLBACK_LABEL: &str = "Miscellaneous";

/// A derived grouping of expenses. Never stored back onto the expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseCategory {
    pub name: String,
    pub expenses: Vec<Expense>,
    pub total_amount: Decimal,
}

impl ExpenseCategory {
    fn new(name: String, expenses: Vec<Expense>) -> Self {
        let total_amount = expenses.iter().map(|e| e.amount()).sum();
        Self {
            name,
            expenses,
            total_amount,
        }
    }

    /// Percentage of `total` spent in this category, to two decimals.
    ///
    /// Zero when `total` is not positive.
    pub fn share_of(&self, total: Decimal) -> Decimal {
        if total <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        round_money(self.total_amount * Decimal::ONE_HUNDRED / total)
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} ({} expenses, total {})",
            self.name,
            self.expenses.len(),
            self.total_amount
        )?;
        for e in &self.expenses {
            writeln!(f, "  {:<32} {:>12}", e.description(), e.amount().to_string())?;
        }
        Ok(())
    }
}

/// Groups expenses by amount with one-dimensional k-means.
///
/// Centroids start evenly spaced between the smallest and largest amount,
/// so identical input always yields identical categories.
pub struct Categorizer;

impl Categorizer {
    pub fn categorize(expenses: &[Expense], k: usize) -> Vec<ExpenseCategory> {
        Self::categorize_with(expenses, k, &EngineConfig::default())
    }

    pub fn categorize_with(
        expenses: &[Expense],
        k: usize,
        config: &EngineConfig,
    ) -> Vec<ExpenseCategory> {
        if expenses.is_empty() || k == 0 {
            return Vec::new();
        }
        if expenses.len() <= k {
            return expenses
                .iter()
                .map(|e| ExpenseCategory::new(e.description().to_string(), vec![e.clone()]))
                .collect();
        }

        let amounts: Vec<Decimal> = expenses.iter().map(|e| e.amount()).collect();
        let mut centroids = initial_centroids(&amounts, k);

        let mut iterations = 0;
        while iterations < config.max_kmeans_iterations {
            let assignment = assign(&amounts, &centroids);

            let mut sums = vec![Decimal::ZERO; k];
            let mut counts = vec![0usize; k];
            for (amount, &cluster) in amounts.iter().zip(&assignment) {
                sums[cluster] += *amount;
                counts[cluster] += 1;
            }

            let mut converged = true;
            for i in 0..k {
                if counts[i] == 0 {
                    continue;
                }
                let updated = sums[i] / Decimal::from(counts[i]);
                if (updated - centroids[i]).abs() >= config.convergence_threshold {
                    converged = false;
                }
                centroids[i] = updated;
            }

            iterations += 1;
            if converged {
                break;
            }
        }
        log::debug!("k-means over {} expenses settled after {} rounds", amounts.len(), iterations);

        let mut clusters: Vec<Vec<Expense>> = vec![Vec::new(); k];
        for (expense, cluster) in expenses.iter().zip(assign(&amounts, &centroids)) {
            clusters[cluster].push(expense.clone());
        }

        clusters
            .into_iter()
            .filter(|members| !members.is_empty())
            .map(|members| {
                let name = label_for(&members, config.min_label_word_len);
                ExpenseCategory::new(name, members)
            })
            .collect()
    }
}

/// Free-function form of [`Categorizer::categorize`].
pub fn categorize_expenses(expenses: &[Expense], k: usize) -> Vec<ExpenseCategory> {
    Categorizer::categorize(expenses, k)
}

/// `k` centroids linearly spaced from min to max amount.
fn initial_centroids(amounts: &[Decimal], k: usize) -> Vec<Decimal> {
    let min = amounts.iter().copied().min().unwrap_or(Decimal::ZERO);
    let max = amounts.iter().copied().max().unwrap_or(Decimal::ZERO);
    if k == 1 {
        return vec![min];
    }
    let steps = Decimal::from(k - 1);
    (0..k)
        .map(|i| min + (max - min) * Decimal::from(i) / steps)
        .collect()
}

/// Index of the nearest centroid for every amount; the lower index wins ties.
fn assign(amounts: &[Decimal], centroids: &[Decimal]) -> Vec<usize> {
    amounts
        .iter()
        .map(|amount| {
            let mut closest = 0;
            let mut min_distance: Option<Decimal> = None;
            for (i, centroid) in centroids.iter().enumerate() {
                let distance = (*amount - *centroid).abs();
                if min_distance.map_or(true, |d| distance < d) {
                    min_distance = Some(distance);
                    closest = i;
                }
            }
            closest
        })
        .collect()
}

/// Most frequent qualifying description word, capitalized.
///
/// Counting is case-insensitive. On equal counts the word seen first wins.
fn label_for(members: &[Expense], min_word_len: usize) -> String {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for expense in members {
        let lowered = expense.description().to_lowercase();
        for word in lowered.split_whitespace() {
            if word.chars().count() < min_word_len {
                continue;
            }
            match index.get(word) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(word.to_string(), counts.len());
                    counts.push((word.to_string(), 1));
                }
            }
        }
    }

    let mut best: Option<&(String, usize)> = None;
    for entry in &counts {
        if best.map_or(true, |b| entry.1 > b.1) {
            best = Some(entry);
        }
    }

    best.map(|(word, _)| capitalize(word))
        .unwrap_or_else(|| FALLBACK_LABEL.to_string())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn expense(id: &str, description: &str, amount: Decimal) -> Expense {
        Expense::with_id(id, description, amount)
            .paid_by("a", amount)
            .split_between(["a", "b"])
    }

    fn sample() -> Vec<Expense> {
        vec![
            expense("1", "Coffee beans", dec!(8)),
            expense("2", "Morning coffee", dec!(5)),
            expense("3", "Team lunch", dec!(190)),
            expense("4", "Lunch buffet", dec!(210)),
            expense("5", "Hotel booking", dec!(400)),
            expense("6", "Hotel minibar", dec!(380)),
        ]
    }

    #[test]
    fn test_three_clusters_by_amount() {
        let categories = categorize_expenses(&sample(), 3);
        assert_eq!(categories.len(), 3);

        assert_eq!(categories[0].name, "Coffee");
        assert_eq!(categories[0].total_amount, dec!(13));
        assert_eq!(categories[1].name, "Lunch");
        assert_eq!(categories[1].total_amount, dec!(400));
        assert_eq!(categories[2].name, "Hotel");
        assert_eq!(categories[2].total_amount, dec!(780));
    }

    #[test]
    fn test_share_of_total_spending() {
        let items = sample();
        let spent: Decimal = items.iter().map(|e| e.amount()).sum();
        let categories = categorize_expenses(&items, 3);

        assert_eq!(categories[0].share_of(spent), dec!(1.09));
        assert_eq!(categories[1].share_of(spent), dec!(33.53));
        assert_eq!(categories[2].share_of(spent), dec!(65.38));
        assert_eq!(categories[0].share_of(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_deterministic() {
        let items = sample();
        let first = categorize_expenses(&items, 3);
        let second = categorize_expenses(&items, 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_few_expenses_become_singletons() {
        let items = vec![expense("1", "Taxi", dec!(12)), expense("2", "Pizza night", dec!(30))];
        let categories = categorize_expenses(&items, 3);
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Taxi");
        assert_eq!(categories[1].name, "Pizza night");
        assert_eq!(categories[1].total_amount, dec!(30));
    }

    #[test]
    fn test_empty_input() {
        assert!(categorize_expenses(&[], 3).is_empty());
        assert!(categorize_expenses(&sample(), 0).is_empty());
    }

    #[test]
    fn test_fallback_label_for_short_words() {
        let items = vec![
            expense("1", "gas", dec!(10)),
            expense("2", "tip", dec!(11)),
            expense("3", "bus", dec!(12)),
        ];
        let categories = categorize_expenses(&items, 2);
        assert!(categories.iter().all(|c| c.name == FALLBACK_LABEL));
    }

    #[test]
    fn test_label_tie_goes_to_first_word() {
        let members = vec![
            expense("1", "Pizza party", dec!(10)),
            expense("2", "party pizza", dec!(10)),
        ];
        assert_eq!(label_for(&members, 4), "Pizza");
    }

    #[test]
    fn test_identical_amounts_collapse() {
        let items = vec![
            expense("1", "Snacks", dec!(10)),
            expense("2", "Snacks", dec!(10)),
            expense("3", "Snacks", dec!(10)),
            expense("4", "Snacks", dec!(10)),
        ];
        let categories = categorize_expenses(&items, 2);
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].expenses.len(), 4);
        assert_eq!(categories[0].total_amount, dec!(40));
    }

    #[test]
    fn test_single_cluster() {
        let categories = categorize_expenses(&sample(), 1);
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].expenses.len(), 6);
    }

    #[test]
    fn test_initial_centroids_evenly_spaced() {
        let centroids = initial_centroids(&[dec!(10), dec!(50), dec!(30)], 3);
        assert_eq!(centroids, vec![dec!(10), dec!(30), dec!(50)]);
    }
}
