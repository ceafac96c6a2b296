//! Error types for collaborator stores and the execution gate.
//!
//! Business-rule violations are never errors: they come back as checklist
//! statuses. Errors here are reserved for broken collaborators (a store that
//! cannot answer) and for misuse of the authorization path.

use thiserror::Error;

/// Errors raised by collaborator stores (rule sets, positions, cash, ledger).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store is temporarily unreachable
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// SQLite error from the spend ledger
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to (de)serialize a stored record
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal store error
    #[error("internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Check if the error is worth retrying
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Errors raised when authorizing execution of a planned purchase.
#[derive(Debug, Error)]
pub enum GateError {
    /// The checklist has a blocking failure and no override reason was given
    #[error("execution blocked: {}", failures.join("; "))]
    Blocked {
        /// Titles of the blocking failed checks
        failures: Vec<String>,
    },

    /// An override was attempted with a blank reason
    #[error("override reason must not be empty")]
    EmptyOverrideReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_recoverable() {
        assert!(StoreError::Unavailable("maintenance".into()).is_recoverable());
        assert!(!StoreError::Internal("corrupt row".into()).is_recoverable());
    }

    #[test]
    fn test_gate_error_display() {
        let err = GateError::Blocked {
            failures: vec!["현금 가용성".into()],
        };
        assert!(err.to_string().contains("현금 가용성"));

        let err = GateError::EmptyOverrideReason;
        assert!(err.to_string().contains("empty"));
    }
}
