//! Executes or resumes a single node: renders its params, invokes the
//! action, and interprets the result tuple.

use prana_action::{partition_state_updates, ActionContext, ActionResult, IntegrationRegistry};
use prana_core::PortName;
use prana_error::{EngineError, ErrorKind};
use prana_execution::{NodeExecution, WorkflowExecution};
use prana_expression::{render_params, ExpressionContext};
use prana_workflow::{ExecutionGraph, Node};
use serde_json::{Map, Value};

/// What one `execute_node`/`retry_node`/`resume_node` call produced.
pub enum NodeOutcome {
    Completed(NodeExecution),
    Suspended(NodeExecution),
    Failed(NodeExecution),
}

/// Extra, execution-wide information the scheduler already knows and the
/// executor needs to assemble `$execution`.
pub struct SchedulingContext {
    pub run_index: u32,
    pub routed_input: Map<String, Value>,
}

pub struct NodeExecutor<'a> {
    registry: &'a IntegrationRegistry,
}

impl<'a> NodeExecutor<'a> {
    #[must_use]
    pub fn new(registry: &'a IntegrationRegistry) -> Self {
        Self { registry }
    }

    /// Pre-scheduling hook: call `Action::prepare` for every node once, and
    /// cache the result in the node's own context bag under a reserved key
    /// so later renders can read `$execution.preparation`.
    pub fn prepare_all(&self, graph: &ExecutionGraph, exec: &mut WorkflowExecution) -> Result<(), EngineError> {
        for node in graph.node_map.values() {
            let Ok(action) = self.registry.get_action_by_type(&node.action_type) else { continue };
            let preparation = action.prepare(&Value::Object(node.params.clone()))?;
            if !preparation.is_null() {
                let mut updates = Map::new();
                updates.insert(PREPARATION_KEY.to_string(), preparation);
                exec.update_node_context(&node.key, &updates);
            }
        }
        Ok(())
    }

    pub fn execute_node(&self, node: &Node, exec: &mut WorkflowExecution, graph: &ExecutionGraph, scheduling: SchedulingContext) -> Result<NodeOutcome, EngineError> {
        let execution_index = exec.next_execution_index();
        let run_index = scheduling.run_index;

        let ctx = self.build_context(node, exec, graph, &scheduling.routed_input, execution_index, run_index);
        let rendered_params = render_params(&Value::Object(node.params.clone()), &ctx)
            .map_err(|e| EngineError::new(ErrorKind::ParamsError, format!("expression_evaluation_failed: {e}")))?;

        let mut node_execution = NodeExecution::start(node.key.clone(), as_object(&rendered_params), execution_index, run_index);
        tracing::debug!(execution_id = %exec.id, node_key = %node.key, run_index, "node execution started");

        let action = match self.registry.get_action_by_type(&node.action_type) {
            Ok(action) => action,
            Err(err) => {
                node_execution.fail(err.to_error_data(), None)?;
                tracing::error!(execution_id = %exec.id, node_key = %node.key, run_index, "node failed: action type not registered");
                return Ok(NodeOutcome::Failed(node_execution));
            }
        };

        if let Err(err) = action.validate_params(&rendered_params) {
            let params_err = EngineError::new(ErrorKind::ParamsError, format!("params_preparation_failed: {}", err.message()));
            node_execution.fail(params_err.to_error_data(), None)?;
            tracing::error!(execution_id = %exec.id, node_key = %node.key, run_index, "node failed: params validation rejected rendered params");
            return Ok(NodeOutcome::Failed(node_execution));
        }

        let action_context = ActionContext { node_key: node.key.to_string(), execution_id: exec.id.to_string(), values: context_to_value(&ctx) };

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| action.execute(&rendered_params, &action_context)))
            .unwrap_or_else(|_| ActionResult::err(EngineError::new(ErrorKind::ActionExecutionFailed, "action panicked during execute")));

        self.interpret_result(node, node_execution, exec, result)
    }

    /// Re-run a previously failed node: rebuild routed input from current
    /// execution state and increment the attempt counter.
    pub fn retry_node(&self, node: &Node, exec: &mut WorkflowExecution, graph: &ExecutionGraph, failed: &NodeExecution) -> Result<NodeOutcome, EngineError> {
        if let Some(error_data) = &failed.error_data {
            if !was_retryable(error_data) {
                let execution_index = exec.next_execution_index();
                let mut node_execution = NodeExecution::start(node.key.clone(), failed.params.clone(), execution_index, failed.run_index + 1);
                node_execution.fail(error_data.clone(), None)?;
                return Ok(NodeOutcome::Failed(node_execution));
            }
        }
        let routed_input = exec.extract_multi_port_input(&node.key, graph);
        self.execute_node(node, exec, graph, SchedulingContext { run_index: failed.run_index + 1, routed_input })
    }

    /// Resume a suspended node: restore params, call `Action::resume`.
    pub fn resume_node(&self, node: &Node, exec: &mut WorkflowExecution, graph: &ExecutionGraph, suspended: &NodeExecution, resume_data: Value) -> Result<NodeOutcome, EngineError> {
        let execution_index = exec.next_execution_index();
        let ctx = self.build_context(node, exec, graph, &Map::new(), execution_index, suspended.run_index);
        let mut node_execution = NodeExecution::start(node.key.clone(), suspended.params.clone(), execution_index, suspended.run_index);
        tracing::debug!(execution_id = %exec.id, node_key = %node.key, run_index = suspended.run_index, "resuming suspended node");

        let action = match self.registry.get_action_by_type(&node.action_type) {
            Ok(action) => action,
            Err(err) => {
                node_execution.fail(err.to_error_data(), None)?;
                tracing::error!(execution_id = %exec.id, node_key = %node.key, "node failed: action type not registered");
                return Ok(NodeOutcome::Failed(node_execution));
            }
        };

        let params = Value::Object(suspended.params.clone());
        let action_context = ActionContext { node_key: node.key.to_string(), execution_id: exec.id.to_string(), values: context_to_value(&ctx) };

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| action.resume(&params, &action_context, &resume_data)))
            .unwrap_or_else(|_| ActionResult::err(EngineError::new(ErrorKind::ActionExecutionFailed, "action panicked during resume")));

        self.interpret_result(node, node_execution, exec, result)
    }

    fn interpret_result(&self, node: &Node, mut node_execution: NodeExecution, exec: &mut WorkflowExecution, result: ActionResult) -> Result<NodeOutcome, EngineError> {
        let descriptor = self.registry.get_action_by_type(&node.action_type).ok().map(|a| a.descriptor().clone());

        match result {
            ActionResult::Ok { data, port, state_updates } => {
                let success_port = port.unwrap_or_else(|| descriptor.as_ref().map_or_else(PortName::main, prana_action::ActionDescriptor::default_success_port));
                if let Some(descriptor) = &descriptor {
                    if !descriptor.allows_output_port(&success_port) {
                        let err = EngineError::new(ErrorKind::InvalidOutputPort, format!("action does not declare output port '{success_port}'"));
                        node_execution.fail(err.to_error_data(), None)?;
                        return Ok(NodeOutcome::Failed(node_execution));
                    }
                }
                if let Some(updates) = state_updates {
                    let (node_context, workflow_state) = partition_state_updates(updates);
                    if !node_context.is_empty() {
                        exec.update_node_context(&node.key, &node_context);
                    }
                    if !workflow_state.is_empty() {
                        exec.update_execution_context(&workflow_state);
                    }
                }
                node_execution.complete(data, success_port)?;
                tracing::info!(execution_id = %exec.id, node_key = %node.key, run_index = node_execution.run_index, output_port = %node_execution.output_port.as_ref().unwrap(), "node completed");
                Ok(NodeOutcome::Completed(node_execution))
            }
            ActionResult::Err { error, port } => {
                let retryable = error.is_retryable();
                if node.settings.retry_on_failed && node.settings.max_retries > 0 && node_execution.run_index < node.settings.max_retries && retryable {
                    let resume_at = prana_core::now() + chrono::Duration::milliseconds(i64::try_from(node.settings.retry_delay_ms).unwrap_or(i64::MAX));
                    let attempt_number = node_execution.run_index + 1;
                    let suspension_data = serde_json::json!({
                        "resume_at": resume_at.to_rfc3339(),
                        "attempt_number": attempt_number,
                        "max_attempts": node.settings.max_retries,
                        "original_error": error.to_error_data(),
                    });
                    node_execution.suspend("retry", suspension_data)?;
                    tracing::warn!(execution_id = %exec.id, node_key = %node.key, attempt_number, max_attempts = node.settings.max_retries, "node suspended for retry");
                    return Ok(NodeOutcome::Suspended(node_execution));
                }
                let error_port = port.or_else(|| descriptor.as_ref().map(prana_action::ActionDescriptor::default_error_port));
                node_execution.fail(error.to_error_data(), error_port)?;
                tracing::error!(execution_id = %exec.id, node_key = %node.key, run_index = node_execution.run_index, "node failed");
                Ok(NodeOutcome::Failed(node_execution))
            }
            ActionResult::Suspend { suspension_type, suspension_data } => {
                node_execution.suspend(suspension_type, suspension_data)?;
                tracing::warn!(execution_id = %exec.id, node_key = %node.key, suspension_type = %node_execution.suspension_type.as_ref().unwrap(), "node suspended");
                Ok(NodeOutcome::Suspended(node_execution))
            }
        }
    }

    fn build_context(&self, node: &Node, exec: &WorkflowExecution, graph: &ExecutionGraph, routed_input: &Map<String, Value>, execution_index: u64, run_index: u32) -> ExpressionContext {
        let nodes_value = nodes_namespace(exec);
        let loop_metadata = loop_metadata(node);
        let preparation = exec
            .execution_data
            .context_data
            .node
            .get(&node.key)
            .and_then(|ctx| ctx.get(PREPARATION_KEY))
            .cloned()
            .unwrap_or(Value::Null);

        let execution_namespace = serde_json::json!({
            "id": exec.id.to_string(),
            "mode": exec.execution_mode,
            "current_node_key": node.key.to_string(),
            "run_index": run_index,
            "execution_index": execution_index,
            "loopback": run_index > 0,
            "loop": loop_metadata,
            "preparation": preparation,
            "state": Value::Object(exec.execution_data.context_data.workflow.clone()),
        });

        ExpressionContext::builder()
            .input(Value::Object(routed_input.clone()))
            .nodes(nodes_value)
            .env(exec.execution_data.runtime.env.clone())
            .vars(Value::Object(graph.variables.clone()))
            .workflow(serde_json::json!({"id": graph.workflow_id.to_string(), "version": graph.version}))
            .execution(execution_namespace)
            .now(prana_core::now())
            .build()
    }
}

const PREPARATION_KEY: &str = "__preparation";

fn nodes_namespace(exec: &WorkflowExecution) -> Value {
    let mut map = Map::new();
    for (key, entry) in &exec.execution_data.runtime.nodes {
        map.insert(key.to_string(), serde_json::json!({"output": entry.output, "context": entry.context}));
    }
    Value::Object(map)
}

fn loop_metadata(node: &Node) -> Value {
    let mut map = Map::new();
    for key in ["loop_level", "loop_role", "loop_ids"] {
        if let Some(value) = node.metadata.get(key) {
            map.insert(key.to_string(), value.clone());
        }
    }
    if map.is_empty() {
        Value::Null
    } else {
        Value::Object(map)
    }
}

fn context_to_value(ctx: &ExpressionContext) -> Value {
    let mut map = Map::new();
    for name in ["input", "nodes", "env", "vars", "workflow", "execution", "now"] {
        if let Some(value) = ctx.namespace(name) {
            map.insert(name.to_string(), value);
        }
    }
    Value::Object(map)
}

fn as_object(value: &Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

fn was_retryable(error_data: &Value) -> bool {
    error_data
        .get("code")
        .and_then(Value::as_str)
        .is_some_and(|code| matches!(code, "action_error" | "action_execution_failed" | "action_exit" | "action_throw"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use prana_action::{Action, ActionDescriptor, ActionKind};
    use prana_core::NodeId;
    use prana_execution::ExecutionMode;
    use prana_workflow::{compile, Connection, Node, NodeSettings, PermissiveCatalog, Workflow};
    use std::sync::Arc;

    #[derive(Debug)]
    struct EchoAgeAction(ActionDescriptor);

    impl Action for EchoAgeAction {
        fn descriptor(&self) -> &ActionDescriptor {
            &self.0
        }

        fn execute(&self, params: &Value, _context: &ActionContext) -> ActionResult {
            ActionResult::ok(params.clone())
        }
    }

    #[derive(Debug)]
    struct FlakyAction(ActionDescriptor);

    impl Action for FlakyAction {
        fn descriptor(&self) -> &ActionDescriptor {
            &self.0
        }

        fn execute(&self, _params: &Value, _context: &ActionContext) -> ActionResult {
            ActionResult::err(EngineError::new(ErrorKind::ActionError, "not yet"))
        }
    }

    fn registry_with(action_type: &str, action: Arc<dyn Action>) -> IntegrationRegistry {
        let registry = IntegrationRegistry::scoped();
        registry.register("test", vec![action], false).unwrap();
        let _ = action_type;
        registry
    }

    fn graph_with_node(settings: NodeSettings) -> (ExecutionGraph, Node) {
        let node = Node::new("set_data", "core.echo").with_settings(settings);
        let wf = Workflow::new("wf", "Demo").with_nodes(vec![Node::new("trigger", "core.trigger"), node.clone()]).with_connections(vec![Connection::new("trigger", "set_data")]);
        let graph = compile(&wf, &PermissiveCatalog).unwrap();
        let compiled_node = graph.node(&NodeId::new("set_data")).unwrap().clone();
        (graph, compiled_node)
    }

    #[test]
    fn execute_node_renders_params_and_completes() {
        let registry = registry_with("core.echo", Arc::new(EchoAgeAction(ActionDescriptor::new("core.echo", "Echo", ActionKind::Action))));
        let (graph, mut node) = graph_with_node(NodeSettings::default());
        node.params.insert("age".to_string(), Value::from("{{ $input.age }}"));

        let mut exec = WorkflowExecution::initialize(&graph, Value::Null, ExecutionMode::Sync);
        exec.transition_status(prana_execution::ExecutionStatus::Running).unwrap();

        let mut routed = Map::new();
        routed.insert("age".to_string(), Value::from(25));
        let executor = NodeExecutor::new(&registry);
        let outcome = executor.execute_node(&node, &mut exec, &graph, SchedulingContext { run_index: 0, routed_input: routed }).unwrap();

        match outcome {
            NodeOutcome::Completed(ne) => assert_eq!(ne.output_data["age"], Value::from(25)),
            _ => panic!("expected completion"),
        }
    }

    #[test]
    fn retryable_failure_becomes_a_retry_suspension() {
        let registry = registry_with("core.flaky", Arc::new(FlakyAction(ActionDescriptor::new("core.flaky", "Flaky", ActionKind::Action))));
        let settings = NodeSettings { retry_on_failed: true, max_retries: 3, retry_delay_ms: 10 };
        let (graph, node) = graph_with_node(settings);
        let node = Node { action_type: "core.flaky".into(), ..node };

        let mut exec = WorkflowExecution::initialize(&graph, Value::Null, ExecutionMode::Sync);
        let executor = NodeExecutor::new(&registry);
        let outcome = executor.execute_node(&node, &mut exec, &graph, SchedulingContext { run_index: 0, routed_input: Map::new() }).unwrap();

        match outcome {
            NodeOutcome::Suspended(ne) => assert_eq!(ne.suspension_type.as_deref(), Some("retry")),
            _ => panic!("expected retry suspension"),
        }
    }

    #[test]
    fn exhausted_retries_become_a_terminal_failure() {
        let registry = registry_with("core.flaky", Arc::new(FlakyAction(ActionDescriptor::new("core.flaky", "Flaky", ActionKind::Action))));
        let settings = NodeSettings { retry_on_failed: true, max_retries: 1, retry_delay_ms: 10 };
        let (graph, node) = graph_with_node(settings);
        let node = Node { action_type: "core.flaky".into(), ..node };

        let mut exec = WorkflowExecution::initialize(&graph, Value::Null, ExecutionMode::Sync);
        let executor = NodeExecutor::new(&registry);
        let outcome = executor.execute_node(&node, &mut exec, &graph, SchedulingContext { run_index: 1, routed_input: Map::new() }).unwrap();

        match outcome {
            NodeOutcome::Failed(ne) => assert_eq!(ne.error_data.unwrap()["code"], "action_error"),
            _ => panic!("expected terminal failure"),
        }
    }

    #[test]
    fn unknown_action_type_fails_the_node() {
        let registry = IntegrationRegistry::scoped();
        let (graph, node) = graph_with_node(NodeSettings::default());
        let mut exec = WorkflowExecution::initialize(&graph, Value::Null, ExecutionMode::Sync);
        let executor = NodeExecutor::new(&registry);
        let outcome = executor.execute_node(&node, &mut exec, &graph, SchedulingContext { run_index: 0, routed_input: Map::new() }).unwrap();
        match outcome {
            NodeOutcome::Failed(ne) => assert_eq!(ne.error_data.unwrap()["code"], "action_not_found"),
            _ => panic!("expected failure"),
        }
    }
}
