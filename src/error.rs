//! Error types for the optimistic log.

use crate::types::TransactionKind;
use std::fmt;
use thiserror::Error;

/// Main error type for log transitions.
#[derive(Debug, Error)]
pub enum OptimistError {
    /// A COMMIT or REVERT named an id with no open entry in the history.
    #[error("failed to {}: transaction #{id} does not exist", .kind.verb())]
    TransactionNotFound { kind: TransactionKind, id: String },

    #[error("inconsistent composite state: {0}")]
    InconsistentState(String),
}

impl OptimistError {
    pub(crate) fn not_found(kind: TransactionKind, id: &impl fmt::Debug) -> Self {
        OptimistError::TransactionNotFound {
            kind,
            id: format!("{:?}", id),
        }
    }
}

/// Advisory raised when the history grows past `max_history`.
///
/// Usually means some BEGIN never received its COMMIT or REVERT. It is only
/// logged; the transition that triggered it still succeeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PossibleLeakWarning {
    pub history_len: usize,
    pub max_history: usize,
}

impl fmt::Display for PossibleLeakWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "possible memory leak: {} log entries exceed max_history of {}. \
             Verify every optimistic action ends in a commit or revert",
            self.history_len, self.max_history
        )
    }
}

/// Result type for log transitions.
pub type Result<T> = std::result::Result<T, OptimistError>;
