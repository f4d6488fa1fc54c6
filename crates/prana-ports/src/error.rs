//! Error type shared by every port trait in this crate.

use thiserror::Error;

/// Error returned by a storage adapter or runner implementation.
///
/// Storage here is a blind sink for snapshots (no cross-process strong
/// consistency is assumed), so this taxonomy is deliberately narrow next to
/// a distributed-systems port layer: no lease/conflict variants, since there
/// is never more than one writer per `WorkflowExecution`.
#[derive(Debug, Error)]
pub enum PortsError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl PortsError {
    #[must_use]
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound { entity: entity.into(), id: id.into() }
    }

    /// Whether a caller may retry this operation unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

impl From<serde_json::Error> for PortsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
