#![forbid(unsafe_code)]

//! Port traits implemented by a concrete persistence and runtime backend.
//!
//! `prana-engine` only ever sees `WorkflowExecution` and `ExecutionGraph`
//! values in memory; everything about durability and scheduling timers,
//! webhooks, and sub-workflows lives behind the traits defined here.
//!
//! - [`WorkflowRepo`] — persistence for workflow definitions and catalog metadata.
//! - [`ExecutionRepo`] — persistence for executions and their node-execution history.
//! - [`SuspensionRouter`] — what the runner does with each kind of suspension.

pub mod error;
pub mod execution;
pub mod runner;
pub mod workflow;

pub use error::PortsError;
pub use execution::ExecutionRepo;
pub use runner::{classify_suspension, SuspensionKind, SuspensionRouter};
pub use workflow::{WorkflowFilter, WorkflowRecord, WorkflowRepo};
