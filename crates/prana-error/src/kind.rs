//! Taxonomy codes carried by every [`crate::EngineError`].

use serde::{Deserialize, Serialize};

/// The stable, machine-readable error code. Matches the kinds named by the
/// error handling design: validation, action runtime, filter/template,
/// webhook, and storage errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorKind {
    // Validation
    ParamsError,
    InvalidOutputPort,
    InvalidActionReturnFormat,
    ActionNotFound,
    RegistryError,
    DuplicateNodeKey,
    NoTrigger,
    MultipleTriggers,
    DanglingConnection,
    UnknownPort,
    DuplicateIntegration,
    SchedulingStalled,

    // Action runtime
    ActionError,
    ActionExecutionFailed,
    ActionExit,
    ActionThrow,
    ActionResumeFailed,

    // Filter / template
    FilterArgumentError,
    FilterDomainError,

    // Webhook
    InvalidResumeId,
    InvalidWebhookState,
    InvalidStateTransition,

    // Storage
    NotFound,
    Duplicate,
    AdapterError,
}

impl ErrorKind {
    /// Whether an action-runtime failure of this kind is eligible to be
    /// converted into a `:retry` suspension by the node executor.
    ///
    /// Only failures that originate from the action itself are retryable;
    /// configuration and validation errors never are.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::ActionError
                | ErrorKind::ActionExecutionFailed
                | ErrorKind::ActionExit
                | ErrorKind::ActionThrow
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ParamsError => "params_error",
            ErrorKind::InvalidOutputPort => "invalid_output_port",
            ErrorKind::InvalidActionReturnFormat => "invalid_action_return_format",
            ErrorKind::ActionNotFound => "action_not_found",
            ErrorKind::RegistryError => "registry_error",
            ErrorKind::DuplicateNodeKey => "duplicate_node_key",
            ErrorKind::NoTrigger => "no_trigger",
            ErrorKind::MultipleTriggers => "multiple_triggers",
            ErrorKind::DanglingConnection => "dangling_connection",
            ErrorKind::UnknownPort => "unknown_port",
            ErrorKind::DuplicateIntegration => "duplicate_integration",
            ErrorKind::SchedulingStalled => "scheduling_stalled",
            ErrorKind::ActionError => "action_error",
            ErrorKind::ActionExecutionFailed => "action_execution_failed",
            ErrorKind::ActionExit => "action_exit",
            ErrorKind::ActionThrow => "action_throw",
            ErrorKind::ActionResumeFailed => "action_resume_failed",
            ErrorKind::FilterArgumentError => "filter_argument_error",
            ErrorKind::FilterDomainError => "filter_domain_error",
            ErrorKind::InvalidResumeId => "invalid_resume_id",
            ErrorKind::InvalidWebhookState => "invalid_webhook_state",
            ErrorKind::InvalidStateTransition => "invalid_state_transition",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Duplicate => "duplicate",
            ErrorKind::AdapterError => "adapter_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_action_runtime_kinds_are_retryable() {
        assert!(ErrorKind::ActionError.is_retryable());
        assert!(ErrorKind::ActionExecutionFailed.is_retryable());
        assert!(ErrorKind::ActionExit.is_retryable());
        assert!(ErrorKind::ActionThrow.is_retryable());
        assert!(!ErrorKind::ParamsError.is_retryable());
        assert!(!ErrorKind::ActionResumeFailed.is_retryable());
        assert!(!ErrorKind::InvalidOutputPort.is_retryable());
    }

    #[test]
    fn as_str_matches_taxonomy_codes() {
        assert_eq!(ErrorKind::ParamsError.as_str(), "params_error");
        assert_eq!(ErrorKind::FilterDomainError.as_str(), "filter_domain_error");
        assert_eq!(ErrorKind::NotFound.as_str(), "not_found");
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&ErrorKind::ActionExecutionFailed).unwrap();
        assert_eq!(json, "\"action_execution_failed\"");
    }
}
