use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a member of an expense-sharing group.
///
/// Identity is by id only; display names may repeat.
///
/// # Examples
///
/// ```
/// use expense_splitter::core::participant::ParticipantId;
///
/// let alice = ParticipantId::new("p-1");
/// let bob = ParticipantId::new("p-2");
/// assert_ne!(alice, bob);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A person taking part in shared expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
}

impl Participant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ParticipantId::new(id),
            name: name.into(),
        }
    }
}

/// Display name for `id`, echoing the id itself when nobody matches.
pub fn display_name(id: &ParticipantId, participants: &[Participant]) -> String {
    participants
        .iter()
        .find(|p| &p.id == id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_equality_is_by_id() {
        let a = Participant::new("1", "Sam");
        let b = Participant::new("2", "Sam");
        assert_ne!(a.id, b.id);
        assert_eq!(a.name, b.name);
    }

    #[test]
    fn test_display_name_lookup() {
        let people = vec![Participant::new("1", "Anannya"), Participant::new("2", "Trayee")];
        assert_eq!(display_name(&ParticipantId::new("2"), &people), "Trayee");
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let people = vec![Participant::new("1", "Anannya")];
        assert_eq!(display_name(&ParticipantId::new("ghost"), &people), "ghost");
    }
}
