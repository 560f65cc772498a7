use crate::core::participant::ParticipantId;
use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by the expense engine.
///
/// "Nothing to do" outcomes (no debts, no eligible expenses, an empty
/// schedule) are empty results, never errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// An expense names a participant that is not part of the group.
    #[error("expense {expense_id} references unknown participant {participant_id}")]
    UnknownParticipant {
        expense_id: String,
        participant_id: ParticipantId,
    },

    /// An expense failed upstream validation.
    #[error("invalid expense {expense_id}: {reason}")]
    InvalidExpense { expense_id: String, reason: String },

    /// The subset optimizer's table would exceed the configured ceiling.
    #[error("subset table of {cells} cells exceeds the limit of {limit}")]
    SubsetTableTooLarge { cells: u128, limit: u64 },

    /// Invalid engine configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}
