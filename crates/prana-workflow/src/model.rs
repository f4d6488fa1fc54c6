//! The immutable workflow definition: `Workflow`, `Node`, `Connection`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use prana_core::{ActionType, NodeId, PortName, WorkflowId};

/// Retry policy attached to a node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct NodeSettings {
    #[serde(default)]
    pub retry_on_failed: bool,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_max_retries() -> u32 {
    1
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self { retry_on_failed: false, max_retries: default_max_retries(), retry_delay_ms: default_retry_delay_ms() }
    }
}

impl NodeSettings {
    /// Clamp `max_retries` into `[1, 10]` and `retry_delay_ms` into
    /// `[0, 60000]`, matching the declared settings bounds.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.max_retries = self.max_retries.clamp(1, 10);
        self.retry_delay_ms = self.retry_delay_ms.min(60_000);
        self
    }
}

/// `loop_role` heuristic assigned by the compiler's loop detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopRole {
    StartLoop,
    InLoop,
    EndLoop,
}

/// A vertex in the workflow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub key: NodeId,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub settings: NodeSettings,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Node {
    #[must_use]
    pub fn new(key: impl Into<NodeId>, action_type: impl Into<ActionType>) -> Self {
        Self {
            key: key.into(),
            name: None,
            action_type: action_type.into(),
            params: Map::new(),
            settings: NodeSettings::default(),
            metadata: Map::new(),
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: NodeSettings) -> Self {
        self.settings = settings.normalized();
        self
    }

    pub fn set_loop_metadata(&mut self, level: u32, role: LoopRole, loop_ids: Vec<String>) {
        self.metadata.insert("loop_level".to_string(), Value::from(level));
        self.metadata.insert(
            "loop_role".to_string(),
            Value::String(match role {
                LoopRole::StartLoop => "start_loop".to_string(),
                LoopRole::InLoop => "in_loop".to_string(),
                LoopRole::EndLoop => "end_loop".to_string(),
            }),
        );
        self.metadata.insert("loop_ids".to_string(), Value::Array(loop_ids.into_iter().map(Value::String).collect()));
    }
}

/// A directed edge `(from, from_port) -> (to, to_port)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Connection {
    pub from: NodeId,
    #[serde(default = "PortName::main")]
    pub from_port: PortName,
    pub to: NodeId,
    #[serde(default = "PortName::main")]
    pub to_port: PortName,
}

impl Connection {
    #[must_use]
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self { from: from.into(), from_port: PortName::main(), to: to.into(), to_port: PortName::main() }
    }

    #[must_use]
    pub fn from_port(mut self, port: impl Into<PortName>) -> Self {
        self.from_port = port.into();
        self
    }

    #[must_use]
    pub fn to_port(mut self, port: impl Into<PortName>) -> Self {
        self.to_port = port.into();
        self
    }
}

/// The immutable workflow definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub name: String,
    pub description: Option<String>,
    pub version: u32,
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub variables: Map<String, Value>,
}

impl Workflow {
    #[must_use]
    pub fn new(id: impl Into<WorkflowId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            version: 1,
            nodes: Vec::new(),
            connections: Vec::new(),
            variables: Map::new(),
        }
    }

    #[must_use]
    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = nodes;
        self
    }

    #[must_use]
    pub fn with_connections(mut self, connections: Vec<Connection>) -> Self {
        self.connections = connections;
        self
    }

    #[must_use]
    pub fn node(&self, key: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_settings_default_matches_declared_bounds() {
        let settings = NodeSettings::default();
        assert!(!settings.retry_on_failed);
        assert_eq!(settings.max_retries, 1);
        assert_eq!(settings.retry_delay_ms, 1000);
    }

    #[test]
    fn node_settings_normalize_clamps_out_of_range_values() {
        let settings = NodeSettings { retry_on_failed: true, max_retries: 50, retry_delay_ms: 999_999 }.normalized();
        assert_eq!(settings.max_retries, 10);
        assert_eq!(settings.retry_delay_ms, 60_000);
    }

    #[test]
    fn connection_defaults_to_main_ports() {
        let conn = Connection::new("a", "b");
        assert_eq!(conn.from_port, PortName::main());
        assert_eq!(conn.to_port, PortName::main());
    }

    #[test]
    fn workflow_node_lookup() {
        let wf = Workflow::new("wf1", "Demo").with_nodes(vec![Node::new("trigger", "core.trigger")]);
        assert!(wf.node(&NodeId::new("trigger")).is_some());
        assert!(wf.node(&NodeId::new("missing")).is_none());
    }

    #[test]
    fn serde_roundtrip_for_workflow() {
        let wf = Workflow::new("wf1", "Demo")
            .with_nodes(vec![Node::new("trigger", "core.trigger")])
            .with_connections(vec![Connection::new("trigger", "next")]);
        let json = serde_json::to_string(&wf).unwrap();
        let back: Workflow = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, wf.id);
        assert_eq!(back.nodes.len(), 1);
        assert_eq!(back.connections.len(), 1);
    }
}
