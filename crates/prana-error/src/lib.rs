//! Shared error type for the Prana workflow engine.
//!
//! Every error that crosses a crate boundary carries a taxonomy code (see
//! [`ErrorKind`]), a human message, and an optional detail map for
//! structured context, matching the error handling design shared by every
//! component of the engine.

pub mod kind;

pub use kind::ErrorKind;

use serde_json::{Map, Value};
use thiserror::Error;

/// The engine's single error type. Components build one via the
/// [`EngineError::new`] constructor or the `*_error` helpers below rather
/// than matching on `kind` to format messages themselves.
#[derive(Debug, Error, Clone)]
#[error("{kind}: {message}")]
pub struct EngineError {
    kind: ErrorKind,
    message: String,
    detail: Map<String, Value>,
}

impl EngineError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: Map::new(),
        }
    }

    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.detail.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn detail(&self) -> &Map<String, Value> {
        &self.detail
    }

    /// Whether this error, if raised while executing a node, is eligible
    /// to be converted into a `:retry` suspension.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Render this error as the `error_data` map attached to a failed
    /// `NodeExecution`.
    #[must_use]
    pub fn to_error_data(&self) -> Value {
        let mut map = self.detail.clone();
        map.insert("code".to_string(), Value::String(self.kind.as_str().to_string()));
        map.insert("message".to_string(), Value::String(self.message.clone()));
        Value::Object(map)
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::new(ErrorKind::AdapterError, err.to_string())
    }
}

/// Result alias used throughout the engine's crates.
pub type EngineResult<T> = Result<T, EngineError>;
