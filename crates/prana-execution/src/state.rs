//! `WorkflowExecution`: the mutable data model for a single run.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use prana_core::{ExecutionId, NodeId, PortName, WorkflowId};
use prana_error::EngineError;
use prana_workflow::ExecutionGraph;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::node_execution::NodeExecution;
use crate::runtime::RuntimeCache;
use crate::status::{ExecutionMode, ExecutionStatus};
use crate::transition::validate_execution_transition;

/// Shared context bags visible to expression evaluation as `$execution.state`
/// (`workflow`) and used to seed `$vars`-adjacent per-node progress (`node`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextData {
    #[serde(default)]
    pub workflow: Map<String, Value>,
    #[serde(default)]
    pub node: HashMap<NodeId, Map<String, Value>>,
}

/// Everything about a run that isn't the raw node-execution history:
/// shared context, which nodes are currently eligible to run, and the
/// derived runtime cache.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionData {
    #[serde(default)]
    pub context_data: ContextData,
    /// `node_key -> execution_index at which it became active`.
    #[serde(default)]
    pub active_nodes: HashMap<NodeId, u64>,
    #[serde(rename = "__runtime", default)]
    pub runtime: RuntimeCache,
}

/// One run of a workflow: every `NodeExecution`, the shared and per-node
/// context, and — while paused — the suspension snapshot needed to resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowExecution {
    pub id: ExecutionId,
    pub workflow_id: WorkflowId,
    pub execution_mode: ExecutionMode,
    pub status: ExecutionStatus,
    #[serde(default)]
    pub node_executions: HashMap<NodeId, Vec<NodeExecution>>,
    /// Next `execution_index` to hand out; strictly monotonic across the run.
    pub current_execution_index: u64,
    #[serde(default)]
    pub suspended_node_id: Option<NodeId>,
    #[serde(default)]
    pub suspension_type: Option<String>,
    #[serde(default)]
    pub suspension_data: Option<Value>,
    #[serde(default)]
    pub suspended_at: Option<DateTime<Utc>>,
    pub execution_data: ExecutionData,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl WorkflowExecution {
    /// Create a `pending` execution, seed `__runtime.env`, and mark the
    /// trigger node active at index 0.
    #[must_use]
    pub fn initialize(graph: &ExecutionGraph, env: Value, execution_mode: ExecutionMode) -> Self {
        let mut active_nodes = HashMap::new();
        active_nodes.insert(graph.trigger_node_key.clone(), 0);

        Self {
            id: ExecutionId::new(),
            workflow_id: graph.workflow_id.clone(),
            execution_mode,
            status: ExecutionStatus::Pending,
            node_executions: HashMap::new(),
            current_execution_index: 0,
            suspended_node_id: None,
            suspension_type: None,
            suspension_data: None,
            suspended_at: None,
            execution_data: ExecutionData {
                context_data: ContextData::default(),
                active_nodes,
                runtime: RuntimeCache::new(env),
            },
            created_at: prana_core::now(),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn transition_status(&mut self, to: ExecutionStatus) -> Result<(), EngineError> {
        validate_execution_transition(self.status, to)?;
        self.status = to;
        if to == ExecutionStatus::Running && self.started_at.is_none() {
            self.started_at = Some(prana_core::now());
        }
        if to.is_terminal() {
            self.completed_at = Some(prana_core::now());
        }
        Ok(())
    }

    #[must_use]
    pub fn next_execution_index(&mut self) -> u64 {
        let index = self.current_execution_index;
        self.current_execution_index += 1;
        index
    }

    #[must_use]
    pub fn next_run_index(&self, node_key: &NodeId) -> u32 {
        self.node_executions.get(node_key).map_or(0, |runs| runs.len() as u32)
    }

    /// The latest `NodeExecution` recorded for `node_key`, if any.
    #[must_use]
    pub fn latest_execution(&self, node_key: &NodeId) -> Option<&NodeExecution> {
        self.node_executions.get(node_key).and_then(|runs| runs.last())
    }

    /// Append `node_execution`, refresh the runtime cache, and recompute
    /// `active_nodes` by routing its output (if any) through `graph`.
    ///
    /// Mirrors the spec'd `complete_node` helper; it is named to match
    /// what it does regardless of whether the attempt succeeded.
    pub fn complete_node(&mut self, graph: &ExecutionGraph, node_execution: NodeExecution) {
        let node_key = node_execution.node_key.clone();
        let succeeded = node_execution.status == crate::status::NodeStatus::Completed;
        let output_port = node_execution.output_port.clone();
        let output_data = node_execution.output_data.clone();

        self.node_executions.entry(node_key.clone()).or_default().push(node_execution);

        if succeeded {
            let context = self
                .execution_data
                .context_data
                .node
                .get(&node_key)
                .cloned()
                .map(Value::Object)
                .unwrap_or(Value::Null);
            self.execution_data.runtime.set_node(node_key.clone(), output_data, context);
        }

        self.execution_data.active_nodes.remove(&node_key);

        if let (true, Some(port)) = (succeeded, output_port) {
            for connection in graph.outgoing(&node_key, &port) {
                let activation_index = self.execution_data.active_nodes.get(&connection.to).copied().unwrap_or(self.current_execution_index);
                self.execution_data.active_nodes.insert(connection.to.clone(), activation_index);
            }
        }
    }

    /// Deep-merge `updates` into this node's per-node context bag.
    pub fn update_node_context(&mut self, node_key: &NodeId, updates: &Map<String, Value>) {
        let entry = self.execution_data.context_data.node.entry(node_key.clone()).or_default();
        merge_object(entry, updates);
    }

    /// Deep-merge `updates` into the shared workflow context (`$execution.state`).
    pub fn update_execution_context(&mut self, updates: &Map<String, Value>) {
        merge_object(&mut self.execution_data.context_data.workflow, updates);
    }

    /// Compute the routed input for `node_key`: for each inbound port,
    /// resolve the most recently completed source and take its output,
    /// preferring the highest `execution_index` when several sources feed
    /// the same port.
    #[must_use]
    pub fn extract_multi_port_input(&self, node_key: &NodeId, graph: &ExecutionGraph) -> Map<String, Value> {
        let mut best: HashMap<PortName, (u64, Value)> = HashMap::new();

        for connection in graph.incoming(node_key) {
            let Some(latest) = self.latest_execution(&connection.from) else { continue };
            if latest.status != crate::status::NodeStatus::Completed {
                continue;
            }
            if latest.output_port.as_ref() != Some(&connection.from_port) {
                continue;
            }
            let candidate = (latest.execution_index, latest.output_data.clone());
            best.entry(connection.to_port.clone())
                .and_modify(|current| {
                    if candidate.0 > current.0 {
                        *current = candidate.clone();
                    }
                })
                .or_insert(candidate);
        }

        best.into_iter().map(|(port, (_, value))| (port.into_string(), value)).collect()
    }

    /// Returns `true` if, for every inbound port of `node_key` that has at
    /// least one connected source, some source has produced a completed
    /// output routed to that port.
    #[must_use]
    pub fn dependencies_satisfied(&self, node_key: &NodeId, graph: &ExecutionGraph) -> bool {
        let mut ports_needed: std::collections::HashSet<&PortName> = std::collections::HashSet::new();
        for connection in graph.incoming(node_key) {
            ports_needed.insert(&connection.to_port);
        }
        if ports_needed.is_empty() {
            return true;
        }
        let satisfied = self.extract_multi_port_input(node_key, graph);
        ports_needed.into_iter().all(|port| satisfied.contains_key(port.as_str()))
    }

    /// Recompute `__runtime` from `node_executions` and `env`. Idempotent;
    /// used to recover after a process restart where only the persisted
    /// fields survive.
    pub fn rebuild_runtime(&mut self, env: Value) {
        let mut cache = RuntimeCache::new(env);
        for (node_key, runs) in &self.node_executions {
            if let Some(latest) = runs.iter().filter(|r| r.status == crate::status::NodeStatus::Completed).next_back() {
                let context = self
                    .execution_data
                    .context_data
                    .node
                    .get(node_key)
                    .cloned()
                    .map(Value::Object)
                    .unwrap_or(Value::Null);
                cache.set_node(node_key.clone(), latest.output_data.clone(), context);
            }
        }
        self.execution_data.runtime = cache;
    }

    /// Record a non-terminal suspension and transition to `suspended`.
    pub fn record_suspension(&mut self, node_key: NodeId, suspension_type: impl Into<String>, suspension_data: Value) -> Result<(), EngineError> {
        self.transition_status(ExecutionStatus::Suspended)?;
        self.suspended_node_id = Some(node_key);
        self.suspension_type = Some(suspension_type.into());
        self.suspension_data = Some(suspension_data);
        self.suspended_at = Some(prana_core::now());
        Ok(())
    }

    /// Clear the suspension snapshot; called once the scheduler resumes.
    pub fn clear_suspension(&mut self) {
        self.suspended_node_id = None;
        self.suspension_type = None;
        self.suspension_data = None;
        self.suspended_at = None;
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.execution_data.active_nodes.is_empty()
    }

    /// Whether the suspension invariant currently holds: `status ==
    /// suspended` iff `suspended_node_id` is set and names a node whose
    /// latest execution is itself suspended.
    #[must_use]
    pub fn suspension_invariant_holds(&self) -> bool {
        match (self.status, &self.suspended_node_id) {
            (ExecutionStatus::Suspended, Some(key)) => {
                self.latest_execution(key).is_some_and(|ne| ne.status == crate::status::NodeStatus::Suspended)
            }
            (ExecutionStatus::Suspended, None) | (_, Some(_)) => false,
            _ => true,
        }
    }
}

fn merge_object(target: &mut Map<String, Value>, updates: &Map<String, Value>) {
    for (key, value) in updates {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => merge_object(existing, incoming),
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}
