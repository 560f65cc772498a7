use crate::core::error::{EngineError, Result};
use crate::core::money::TOLERANCE;
use crate::core::participant::{display_name, Participant, ParticipantId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// One payer's share of funding a single expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub participant_id: ParticipantId,
    pub amount: Decimal,
}

impl Contribution {
    pub fn new(participant_id: impl Into<ParticipantId>, amount: Decimal) -> Self {
        Self {
            participant_id: participant_id.into(),
            amount,
        }
    }
}

/// A shared expense: who paid how much, and who splits the cost.
///
/// The cost is split equally between everyone in `split_with`. Payers do
/// not have to be part of the split.
///
/// # Examples
///
/// ```
/// use expense_splitter::core::expense::Expense;
/// use rust_decimal_macros::dec;
///
/// let dinner = Expense::new("Dinner", dec!(90))
///     .paid_by("a", dec!(90))
///     .split_between(["a", "b", "c"]);
///
/// assert_eq!(dinner.share_amount(), Some(dec!(30)));
/// assert!(dinner.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    id: String,
    description: String,
    amount: Decimal,
    #[serde(default)]
    contributions: Vec<Contribution>,
    #[serde(default)]
    split_with: Vec<ParticipantId>,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
}

impl Expense {
    /// Create an expense with a fresh id and no payers or split yet.
    pub fn new(description: impl Into<String>, amount: Decimal) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), description, amount)
    }

    /// Create an expense with a specific id (useful for tests and fixtures).
    pub fn with_id(id: impl Into<String>, description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            amount,
            contributions: Vec::new(),
            split_with: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Builder form of [`Expense::add_contribution`].
    pub fn paid_by(mut self, participant: impl Into<ParticipantId>, amount: Decimal) -> Self {
        self.add_contribution(participant, amount);
        self
    }

    /// Add everyone in `participants` to the split, ignoring repeats.
    pub fn split_between<I, P>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ParticipantId>,
    {
        for p in participants {
            let id = p.into();
            if !self.split_with.contains(&id) {
                self.split_with.push(id);
            }
        }
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Record a payment towards this expense.
    ///
    /// A second payment by the same participant is merged into the first.
    pub fn add_contribution(&mut self, participant: impl Into<ParticipantId>, amount: Decimal) {
        let participant = participant.into();
        match self
            .contributions
            .iter_mut()
            .find(|c| c.participant_id == participant)
        {
            Some(existing) => existing.amount += amount,
            None => self.contributions.push(Contribution::new(participant, amount)),
        }
    }

    // --- Accessors ---

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    pub fn split_with(&self) -> &[ParticipantId] {
        &self.split_with
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Sum of all payer contributions.
    pub fn contributed(&self) -> Decimal {
        self.contributions.iter().map(|c| c.amount).sum()
    }

    /// Each split participant's equal share, or `None` for an empty split.
    pub fn share_amount(&self) -> Option<Decimal> {
        if self.split_with.is_empty() {
            None
        } else {
            Some(self.amount / Decimal::from(self.split_with.len()))
        }
    }

    /// Upstream validation: the checks an entry form applies before an
    /// expense reaches the ledger. The engine itself never calls this.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| EngineError::InvalidExpense {
            expense_id: self.id.clone(),
            reason: reason.to_string(),
        };

        if self.description.trim().is_empty() {
            return Err(invalid("description is empty"));
        }
        if self.amount <= Decimal::ZERO {
            return Err(invalid("amount must be positive"));
        }
        if self.contributions.is_empty() {
            return Err(invalid("at least one payer is required"));
        }
        if self.contributions.iter().any(|c| c.amount < Decimal::ZERO) {
            return Err(invalid("contributions cannot be negative"));
        }
        if self.split_with.is_empty() {
            return Err(invalid("split set is empty"));
        }
        let unique: HashSet<&ParticipantId> = self.split_with.iter().collect();
        if unique.len() != self.split_with.len() {
            return Err(invalid("split set lists a participant twice"));
        }
        if (self.contributed() - self.amount).abs() > TOLERANCE {
            return Err(EngineError::InvalidExpense {
                expense_id: self.id.clone(),
                reason: format!(
                    "contributions total {} but amount is {}",
                    self.contributed(),
                    self.amount
                ),
            });
        }
        Ok(())
    }

    /// Every participant id this expense mentions, payers first.
    pub fn referenced_participants(&self) -> impl Iterator<Item = &ParticipantId> {
        self.contributions
            .iter()
            .map(|c| &c.participant_id)
            .chain(self.split_with.iter())
    }
}

/// A snapshot of a group: its participants and their expenses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    participants: Vec<Participant>,
    #[serde(default)]
    expenses: Vec<Expense>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(participants: Vec<Participant>, expenses: Vec<Expense>) -> Self {
        Self {
            participants,
            expenses,
        }
    }

    pub fn add_participant(&mut self, participant: Participant) {
        self.participants.push(participant);
    }

    pub fn add_expense(&mut self, expense: Expense) {
        self.expenses.push(expense);
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    /// Display name for `id`, or the id itself when nobody has it.
    pub fn participant_name(&self, id: &ParticipantId) -> String {
        display_name(id, &self.participants)
    }

    /// Total amount spent across all expenses.
    pub fn total_spent(&self) -> Decimal {
        self.expenses.iter().map(|e| e.amount()).sum()
    }

    /// Validate every expense and every participant reference.
    pub fn validate(&self) -> Result<()> {
        let known: HashSet<&ParticipantId> = self.participants.iter().map(|p| &p.id).collect();
        for expense in &self.expenses {
            expense.validate()?;
            if let Some(unknown) = expense.referenced_participants().find(|id| !known.contains(id)) {
                return Err(EngineError::UnknownParticipant {
                    expense_id: expense.id().to_string(),
                    participant_id: unknown.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn dinner() -> Expense {
        Expense::with_id("e1", "Dinner", dec!(90))
            .paid_by("a", dec!(90))
            .split_between(["a", "b", "c"])
    }

    #[test]
    fn test_expense_creation() {
        let e = dinner();
        assert_eq!(e.id(), "e1");
        assert_eq!(e.amount(), dec!(90));
        assert_eq!(e.contributions().len(), 1);
        assert_eq!(e.split_with().len(), 3);
        assert_eq!(e.share_amount(), Some(dec!(30)));
    }

    #[test]
    fn test_duplicate_payer_is_merged() {
        let e = Expense::with_id("e1", "Groceries", dec!(50))
            .paid_by("a", dec!(20))
            .paid_by("a", dec!(30))
            .split_between(["a", "b"]);
        assert_eq!(e.contributions().len(), 1);
        assert_eq!(e.contributions()[0].amount, dec!(50));
        assert!(e.validate().is_ok());
    }

    #[test]
    fn test_split_ignores_repeats() {
        let e = Expense::with_id("e1", "Taxi", dec!(10)).split_between(["a", "b", "a"]);
        assert_eq!(e.split_with().len(), 2);
    }

    #[test]
    fn test_validate_contribution_mismatch() {
        let e = Expense::with_id("e1", "Hotel", dec!(100))
            .paid_by("a", dec!(60))
            .split_between(["a", "b"]);
        assert!(matches!(e.validate(), Err(EngineError::InvalidExpense { .. })));
    }

    #[test]
    fn test_validate_within_tolerance() {
        let e = Expense::with_id("e1", "Hotel", dec!(100))
            .paid_by("a", dec!(33.33))
            .paid_by("b", dec!(66.66))
            .split_between(["a", "b"]);
        assert!(e.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_split_and_payers() {
        let no_split = Expense::with_id("e1", "Fuel", dec!(40)).paid_by("a", dec!(40));
        assert!(no_split.validate().is_err());
        let no_payer = Expense::with_id("e2", "Fuel", dec!(40)).split_between(["a"]);
        assert!(no_payer.validate().is_err());
    }

    #[test]
    fn test_ledger_participant_name() {
        let mut ledger = Ledger::new();
        ledger.add_participant(Participant::new("a", "Ana"));
        assert_eq!(ledger.participant_name(&"a".into()), "Ana");
        assert_eq!(ledger.participant_name(&"zed".into()), "zed");
    }

    #[test]
    fn test_ledger_validate_unknown_participant() {
        let mut ledger = Ledger::new();
        ledger.add_participant(Participant::new("a", "Ana"));
        ledger.add_participant(Participant::new("b", "Ben"));
        ledger.add_expense(dinner());

        let err = ledger.validate().unwrap_err();
        assert_eq!(
            err,
            EngineError::UnknownParticipant {
                expense_id: "e1".to_string(),
                participant_id: ParticipantId::new("c"),
            }
        );
    }

    #[test]
    fn test_ledger_total_spent() {
        let mut ledger = Ledger::new();
        ledger.add_expense(dinner());
        ledger.add_expense(
            Expense::with_id("e2", "Cab", dec!(15.50))
                .paid_by("b", dec!(15.50))
                .split_between(["a", "b"]),
        );
        assert_eq!(ledger.total_spent(), dec!(105.50));
    }

    #[test]
    fn test_expense_deserializes_without_created_at() {
        let json = r#"{
            "id": "e9",
            "description": "Movie tickets",
            "amount": "24.00",
            "contributions": [{ "participant_id": "a", "amount": "24.00" }],
            "split_with": ["a", "b"]
        }"#;
        let e: Expense = serde_json::from_str(json).unwrap();
        assert_eq!(e.amount(), dec!(24));
        assert_eq!(e.share_amount(), Some(dec!(12)));
    }
}
