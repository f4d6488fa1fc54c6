//! `NodeExecution`: one attempt of one node within a workflow run.

use chrono::{DateTime, Utc};
use prana_core::{NodeId, PortName};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::status::NodeStatus;
use crate::transition::validate_node_transition;

/// One recorded attempt of a single node. A node that loops or retries
/// accumulates several `NodeExecution`s under the same `node_key`,
/// distinguished by `run_index`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeExecution {
    pub node_key: NodeId,
    pub status: NodeStatus,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub output_data: Value,
    #[serde(default)]
    pub output_port: Option<PortName>,
    #[serde(default)]
    pub error_data: Option<Value>,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_ms: Option<i64>,
    /// Position in the total order of every `NodeExecution` in this run.
    pub execution_index: u64,
    /// Position within this node's own sequence of attempts.
    pub run_index: u32,
    #[serde(default)]
    pub suspension_type: Option<String>,
    #[serde(default)]
    pub suspension_data: Option<Value>,
}

impl NodeExecution {
    #[must_use]
    pub fn start(node_key: NodeId, params: Map<String, Value>, execution_index: u64, run_index: u32) -> Self {
        Self {
            node_key,
            status: NodeStatus::Running,
            params,
            output_data: Value::Null,
            output_port: None,
            error_data: None,
            started_at: prana_core::now(),
            completed_at: None,
            duration_ms: None,
            execution_index,
            run_index,
            suspension_type: None,
            suspension_data: None,
        }
    }

    fn finish(&mut self, status: NodeStatus) -> Result<(), prana_error::EngineError> {
        validate_node_transition(self.status, status)?;
        self.status = status;
        let now = prana_core::now();
        self.completed_at = Some(now);
        self.duration_ms = Some((now - self.started_at).num_milliseconds());
        Ok(())
    }

    pub fn complete(&mut self, output_data: Value, output_port: PortName) -> Result<(), prana_error::EngineError> {
        self.output_data = output_data;
        self.output_port = Some(output_port);
        self.finish(NodeStatus::Completed)
    }

    pub fn fail(&mut self, error_data: Value, output_port: Option<PortName>) -> Result<(), prana_error::EngineError> {
        self.error_data = Some(error_data);
        self.output_port = output_port;
        self.finish(NodeStatus::Failed)
    }

    pub fn suspend(&mut self, suspension_type: impl Into<String>, suspension_data: Value) -> Result<(), prana_error::EngineError> {
        self.suspension_type = Some(suspension_type.into());
        self.suspension_data = Some(suspension_data);
        validate_node_transition(self.status, NodeStatus::Suspended)?;
        self.status = NodeStatus::Suspended;
        Ok(())
    }

    #[must_use]
    pub fn is_retry_suspension(&self) -> bool {
        self.status == NodeStatus::Suspended && self.suspension_type.as_deref() == Some("retry")
    }
}
