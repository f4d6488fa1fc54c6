//! Execution repository port: persistence for `WorkflowExecution` snapshots
//! and the `NodeExecution` history that backs them.

use async_trait::async_trait;
use prana_core::{ExecutionId, WorkflowId};
use prana_execution::{NodeExecution, WorkflowExecution};

use crate::error::PortsError;

/// Persistence interface for workflow executions. A snapshot write replaces
/// the prior one wholesale; there is no compare-and-swap, since only the
/// single in-process `GraphExecutor` driving an execution ever writes it.
#[async_trait]
pub trait ExecutionRepo: Send + Sync {
    async fn create_execution(&self, execution: &WorkflowExecution) -> Result<(), PortsError>;
    async fn get_execution(&self, id: &ExecutionId) -> Result<Option<WorkflowExecution>, PortsError>;
    async fn update_execution(&self, execution: &WorkflowExecution) -> Result<(), PortsError>;
    async fn list_executions(&self, workflow_id: &WorkflowId) -> Result<Vec<WorkflowExecution>, PortsError>;

    /// Append one node attempt to the durable history (independent of the
    /// full-execution snapshot, so a long run doesn't rewrite its own past).
    async fn create_node_execution(&self, execution_id: &ExecutionId, node_execution: &NodeExecution) -> Result<(), PortsError>;
    async fn update_node_execution(&self, execution_id: &ExecutionId, node_execution: &NodeExecution) -> Result<(), PortsError>;
    async fn get_node_executions(&self, execution_id: &ExecutionId) -> Result<Vec<NodeExecution>, PortsError>;

    /// Mark an execution suspended with the resume token the runner will
    /// present back through `resume_workflow`.
    async fn suspend_execution(&self, id: &ExecutionId, resume_token: &str) -> Result<(), PortsError>;
    async fn resume_execution(&self, id: &ExecutionId) -> Result<(), PortsError>;
    async fn get_suspended_executions(&self) -> Result<Vec<WorkflowExecution>, PortsError>;

    async fn health_check(&self) -> Result<(), PortsError>;
}
