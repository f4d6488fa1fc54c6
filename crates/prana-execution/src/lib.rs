//! Mutable execution state: `WorkflowExecution`, `NodeExecution`, and the
//! status/transition rules that govern them.

pub mod node_execution;
pub mod runtime;
pub mod state;
pub mod status;
pub mod transition;

pub use node_execution::NodeExecution;
pub use runtime::{NodeRuntimeEntry, RuntimeCache};
pub use state::{ContextData, ExecutionData, WorkflowExecution};
pub use status::{ExecutionMode, ExecutionStatus, NodeStatus};
pub use transition::{can_transition_execution, can_transition_node, validate_execution_transition, validate_node_transition};
