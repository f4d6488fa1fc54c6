//! Single-threaded cooperative scheduler that drives one `WorkflowExecution`
//! across a compiled [`ExecutionGraph`] to completion, suspension, or failure.

use prana_action::IntegrationRegistry;
use prana_core::NodeId;
use prana_error::{EngineError, ErrorKind};
use prana_execution::{ExecutionMode, ExecutionStatus, WorkflowExecution};
use prana_workflow::ExecutionGraph;
use serde_json::Value;

use crate::node_executor::{NodeExecutor, NodeOutcome, SchedulingContext};

/// Terminal result of running the scheduling loop to quiescence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerOutcome {
    Completed,
    Suspended,
    Failed,
}

pub struct GraphExecutor<'a> {
    executor: NodeExecutor<'a>,
}

impl<'a> GraphExecutor<'a> {
    #[must_use]
    pub fn new(registry: &'a IntegrationRegistry) -> Self {
        Self { executor: NodeExecutor::new(registry) }
    }

    /// Create a fresh execution, activate the trigger node, and run every
    /// node's `prepare` hook once before scheduling begins.
    pub fn initialize_execution(&self, graph: &ExecutionGraph, context: Value, execution_mode: ExecutionMode) -> Result<WorkflowExecution, EngineError> {
        let mut exec = WorkflowExecution::initialize(graph, context, execution_mode);
        self.executor.prepare_all(graph, &mut exec)?;
        Ok(exec)
    }

    /// Drive `exec` to completion or the first suspension/failure.
    pub fn execute_workflow(&self, exec: &mut WorkflowExecution, graph: &ExecutionGraph) -> Result<SchedulerOutcome, EngineError> {
        exec.transition_status(ExecutionStatus::Running)?;
        self.run_loop(exec, graph)
    }

    /// Resume a suspended execution: dispatch to the right executor entry
    /// point for the suspended node, then re-enter the scheduling loop.
    pub fn resume_workflow(&self, exec: &mut WorkflowExecution, graph: &ExecutionGraph, resume_data: Value) -> Result<SchedulerOutcome, EngineError> {
        let node_key = exec
            .suspended_node_id
            .clone()
            .ok_or_else(|| EngineError::new(ErrorKind::SchedulingStalled, "resume_workflow called on an execution with no suspended node"))?;
        let node = graph
            .node(&node_key)
            .cloned()
            .ok_or_else(|| EngineError::new(ErrorKind::SchedulingStalled, format!("suspended node '{node_key}' is not in the compiled graph")))?;
        let suspended = exec
            .latest_execution(&node_key)
            .filter(|ne| ne.status == prana_execution::NodeStatus::Suspended)
            .cloned()
            .ok_or_else(|| EngineError::new(ErrorKind::InvalidStateTransition, "suspended_node_id does not name a suspended NodeExecution"))?;

        exec.clear_suspension();
        exec.transition_status(ExecutionStatus::Running)?;

        let outcome = if suspended.is_retry_suspension() {
            self.executor.retry_node(&node, exec, graph, &suspended)?
        } else {
            self.executor.resume_node(&node, exec, graph, &suspended, resume_data)?
        };

        if let Some(result) = self.apply_outcome(exec, graph, &node_key, outcome)? {
            return Ok(result);
        }
        self.run_loop(exec, graph)
    }

    fn run_loop(&self, exec: &mut WorkflowExecution, graph: &ExecutionGraph) -> Result<SchedulerOutcome, EngineError> {
        loop {
            if exec.is_complete() {
                exec.transition_status(ExecutionStatus::Completed)?;
                tracing::debug!(execution_id = %exec.id, "workflow execution completed");
                return Ok(SchedulerOutcome::Completed);
            }

            let Some(node_key) = self.select_ready_node(exec, graph) else {
                return Err(EngineError::new(ErrorKind::SchedulingStalled, "active nodes remain but none has satisfied dependencies"));
            };
            let node = graph.node(&node_key).expect("active node key always resolves in its own graph").clone();

            let run_index = exec.next_run_index(&node_key);
            let routed_input = exec.extract_multi_port_input(&node_key, graph);
            tracing::trace!(execution_id = %exec.id, node_key = %node_key, run_index, "scheduling node");

            let outcome = self.executor.execute_node(&node, exec, graph, SchedulingContext { run_index, routed_input })?;
            if let Some(result) = self.apply_outcome(exec, graph, &node_key, outcome)? {
                return Ok(result);
            }
        }
    }

    /// Record one node's outcome against `exec`. Returns `Some` when the
    /// outcome halts the loop (suspend/failure), `None` to keep scheduling.
    fn apply_outcome(&self, exec: &mut WorkflowExecution, graph: &ExecutionGraph, node_key: &NodeId, outcome: NodeOutcome) -> Result<Option<SchedulerOutcome>, EngineError> {
        match outcome {
            NodeOutcome::Completed(node_execution) => {
                exec.complete_node(graph, node_execution);
                Ok(None)
            }
            NodeOutcome::Suspended(node_execution) => {
                let suspension_type = node_execution.suspension_type.clone().unwrap_or_default();
                let suspension_data = node_execution.suspension_data.clone().unwrap_or(Value::Null);
                exec.node_executions.entry(node_key.clone()).or_default().push(node_execution);
                exec.record_suspension(node_key.clone(), suspension_type, suspension_data)?;
                Ok(Some(SchedulerOutcome::Suspended))
            }
            NodeOutcome::Failed(node_execution) => {
                exec.node_executions.entry(node_key.clone()).or_default().push(node_execution);
                exec.transition_status(ExecutionStatus::Failed)?;
                Ok(Some(SchedulerOutcome::Failed))
            }
        }
    }

    /// Among `active_nodes` whose inbound dependencies are satisfied, pick
    /// the one activated at the highest `execution_index` so loop bodies
    /// run to completion before sibling branches advance. Ties break on
    /// `node_key` for determinism.
    fn select_ready_node(&self, exec: &WorkflowExecution, graph: &ExecutionGraph) -> Option<NodeId> {
        exec.execution_data
            .active_nodes
            .iter()
            .filter(|(node_key, _)| exec.dependencies_satisfied(node_key, graph))
            .max_by(|(a_key, a_index), (b_key, b_index)| a_index.cmp(b_index).then_with(|| a_key.as_str().cmp(b_key.as_str())))
            .map(|(node_key, _)| node_key.clone())
    }
}
