//! State machine transition validation for executions and node attempts.

use prana_error::{EngineError, ErrorKind};

use crate::status::{ExecutionStatus, NodeStatus};

fn invalid_transition(from: impl std::fmt::Display, to: impl std::fmt::Display) -> EngineError {
    EngineError::new(ErrorKind::InvalidStateTransition, format!("invalid transition from {from} to {to}"))
        .with_detail("from", from.to_string())
        .with_detail("to", to.to_string())
}

/// Returns `true` if the execution-level transition from `from` to `to` is valid.
#[must_use]
pub fn can_transition_execution(from: ExecutionStatus, to: ExecutionStatus) -> bool {
    matches!(
        (from, to),
        (ExecutionStatus::Pending, ExecutionStatus::Running)
            | (ExecutionStatus::Running, ExecutionStatus::Suspended)
            | (ExecutionStatus::Running, ExecutionStatus::Completed)
            | (ExecutionStatus::Running, ExecutionStatus::Failed)
            | (ExecutionStatus::Suspended, ExecutionStatus::Running)
    )
}

pub fn validate_execution_transition(from: ExecutionStatus, to: ExecutionStatus) -> Result<(), EngineError> {
    if can_transition_execution(from, to) {
        Ok(())
    } else {
        Err(invalid_transition(from, to))
    }
}

/// Returns `true` if the node-level transition from `from` to `to` is valid.
#[must_use]
pub fn can_transition_node(from: NodeStatus, to: NodeStatus) -> bool {
    matches!(
        (from, to),
        (NodeStatus::Pending, NodeStatus::Running)
            | (NodeStatus::Running, NodeStatus::Completed)
            | (NodeStatus::Running, NodeStatus::Failed)
            | (NodeStatus::Running, NodeStatus::Suspended)
            | (NodeStatus::Suspended, NodeStatus::Running)
    )
}

pub fn validate_node_transition(from: NodeStatus, to: NodeStatus) -> Result<(), EngineError> {
    if can_transition_node(from, to) {
        Ok(())
    } else {
        Err(invalid_transition(from, to))
    }
}
