//! Error types for schema diffing and plan building.

/// Errors raised while diffing snapshots or building a plan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// A snapshot or table argument is malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A diff step referenced a table that is not where it was expected.
    #[error("Table not found: {0}")]
    MissingTable(String),
}

impl PlanError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Result type for planning operations.
pub type Result<T> = std::result::Result<T, PlanError>;
