use crate::core::error::{EngineError, Result};
use crate::core::expense::Expense;
use crate::core::money::TOLERANCE;
use crate::core::participant::{Participant, ParticipantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Net position of every participant in a group.
///
/// A positive balance means the participant is owed money.
/// A negative balance means the participant owes money.
///
/// Entries iterate in the order participants were supplied to
/// [`BalanceCalculator::compute`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balances {
    #[serde(with = "ordered_serde")]
    entries: Vec<(ParticipantId, Decimal)>,
}

mod ordered_serde {
    use super::*;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;

    pub fn serialize<S: serde::Serializer>(
        entries: &[(ParticipantId, Decimal)],
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (id, amount) in entries {
            map.serialize_entry(id, amount)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Vec<(ParticipantId, Decimal)>, D::Error> {
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = Vec<(ParticipantId, Decimal)>;
            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of participant id to balance")
            }
            fn visit_map<M: MapAccess<'de>>(
                self,
                mut access: M,
            ) -> std::result::Result<Self::Value, M::Error> {
                let mut entries = Vec::new();
                while let Some((id, amount)) = access.next_entry::<ParticipantId, Decimal>()? {
                    entries.push((id, amount));
                }
                Ok(entries)
            }
        }
        deserializer.deserialize_map(V)
    }
}

impl Balances {
    /// Build balances directly from `(id, amount)` pairs.
    pub fn from_entries(entries: impl IntoIterator<Item = (ParticipantId, Decimal)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Balance of a participant, or `None` if they are not part of the group.
    pub fn get(&self, id: &ParticipantId) -> Option<Decimal> {
        self.entries
            .iter()
            .find(|(pid, _)| pid == id)
            .map(|(_, amount)| *amount)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, Decimal)> {
        self.entries.iter().map(|(id, amount)| (id, *amount))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Signed sum of all balances. Zero up to division rounding.
    pub fn total(&self) -> Decimal {
        self.entries.iter().map(|(_, amount)| *amount).sum()
    }

    /// True when the balances sum to zero within tolerance.
    pub fn is_balanced(&self) -> bool {
        self.total().abs() <= TOLERANCE
    }

    /// Number of participants who owe more than the tolerance.
    pub fn debtor_count(&self) -> usize {
        self.entries.iter().filter(|(_, a)| *a < -TOLERANCE).count()
    }

    /// Number of participants who are owed more than the tolerance.
    pub fn creditor_count(&self) -> usize {
        self.entries.iter().filter(|(_, a)| *a > TOLERANCE).count()
    }
}

impl fmt::Display for Balances {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Balances ===")?;
        for (id, amount) in &self.entries {
            let status = if *amount > TOLERANCE {
                "is owed"
            } else if *amount < -TOLERANCE {
                "owes"
            } else {
                "settled"
            };
            writeln!(
                f,
                "  {:<16} {:>12}  {}",
                id.as_str(),
                amount.round_dp(2).to_string(),
                status
            )?;
        }
        writeln!(f, "Balanced:        {}", self.is_balanced())
    }
}

/// Derives each participant's net balance from the expense ledger.
pub struct BalanceCalculator;

impl BalanceCalculator {
    /// Compute net balances.
    ///
    /// # Algorithm
    ///
    /// 1. Every known participant starts at zero.
    /// 2. Each contribution is credited to its payer.
    /// 3. `amount / |split_with|` is debited from every split participant.
    ///
    /// No rounding happens here; the sum of all balances is zero up to
    /// the precision of the equal-share division.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownParticipant`] if an expense references an id
    /// that is not in `participants`. Unknown ids are never added as new
    /// balance entries.
    pub fn compute(participants: &[Participant], expenses: &[Expense]) -> Result<Balances> {
        let mut entries: Vec<(ParticipantId, Decimal)> = Vec::with_capacity(participants.len());
        let mut index: HashMap<&ParticipantId, usize> = HashMap::with_capacity(participants.len());
        for p in participants {
            if !index.contains_key(&p.id) {
                index.insert(&p.id, entries.len());
                entries.push((p.id.clone(), Decimal::ZERO));
            }
        }

        let slot = |expense: &Expense, id: &ParticipantId| -> Result<usize> {
            index
                .get(id)
                .copied()
                .ok_or_else(|| EngineError::UnknownParticipant {
                    expense_id: expense.id().to_string(),
                    participant_id: id.clone(),
                })
        };

        for expense in expenses {
            if (expense.contributed() - expense.amount()).abs() > TOLERANCE {
                log::warn!(
                    "expense {} contributions total {} but amount is {}",
                    expense.id(),
                    expense.contributed(),
                    expense.amount()
                );
            }

            for contribution in expense.contributions() {
                let i = slot(expense, &contribution.participant_id)?;
                entries[i].1 += contribution.amount;
            }

            match expense.share_amount() {
                Some(share) => {
                    for id in expense.split_with() {
                        let i = slot(expense, id)?;
                        entries[i].1 -= share;
                    }
                }
                None => log::warn!("expense {} has an empty split set", expense.id()),
            }
        }

        let balances = Balances { entries };
        log::debug!(
            "computed balances for {} participants over {} expenses (total {})",
            balances.len(),
            expenses.len(),
            balances.total()
        );
        Ok(balances)
    }
}

/// Free-function form of [`BalanceCalculator::compute`].
pub fn compute_balances(participants: &[Participant], expenses: &[Expense]) -> Result<Balances> {
    BalanceCalculator::compute(participants, expenses)
}
