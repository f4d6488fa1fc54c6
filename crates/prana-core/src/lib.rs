//! Shared identifier and primitive types used by every Prana crate.
//!
//! This crate has no knowledge of workflows, nodes, or execution — it only
//! defines the newtypes that keep those concepts from being confused with
//! each other or with plain strings.

pub mod id;

pub use id::{ActionType, ExecutionId, NodeId, PortName, WorkflowId};

/// Current UTC time. Centralized so tests can see where "now" is read.
#[must_use]
pub fn now() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc::now()
}
