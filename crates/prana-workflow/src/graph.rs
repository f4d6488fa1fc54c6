//! `ExecutionGraph`: the compiler's validated, analyzed output.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use prana_core::{NodeId, PortName, WorkflowId};
use serde_json::{Map, Value};

use crate::model::{Connection, Node};

/// A compiled, validated workflow ready for scheduling.
///
/// `node_map` is an [`IndexMap`] rather than a `HashMap` so that node
/// iteration (loop annotation, catalog diffing, debug output) follows the
/// order nodes were declared in, not hash order — the compiler's output is
/// deterministic given identical input, matching the execution it drives.
#[derive(Debug, Clone)]
pub struct ExecutionGraph {
    pub workflow_id: WorkflowId,
    pub version: u32,
    pub trigger_node_key: NodeId,
    pub node_map: IndexMap<NodeId, Node>,
    pub connection_map: HashMap<(NodeId, PortName), Vec<Connection>>,
    pub reverse_connection_map: HashMap<NodeId, Vec<Connection>>,
    pub dependency_graph: HashMap<NodeId, HashSet<NodeId>>,
    pub variables: Map<String, Value>,
}

impl ExecutionGraph {
    #[must_use]
    pub fn node(&self, key: &NodeId) -> Option<&Node> {
        self.node_map.get(key)
    }

    /// Connections leaving `node_key` on `port`.
    #[must_use]
    pub fn outgoing(&self, node_key: &NodeId, port: &PortName) -> &[Connection] {
        self.connection_map.get(&(node_key.clone(), port.clone())).map_or(&[], Vec::as_slice)
    }

    /// Connections arriving at `node_key`, across all inbound ports.
    #[must_use]
    pub fn incoming(&self, node_key: &NodeId) -> &[Connection] {
        self.reverse_connection_map.get(node_key).map_or(&[], Vec::as_slice)
    }

    /// Direct predecessor keys of `node_key`.
    #[must_use]
    pub fn dependencies(&self, node_key: &NodeId) -> &HashSet<NodeId> {
        static EMPTY: std::sync::OnceLock<HashSet<NodeId>> = std::sync::OnceLock::new();
        self.dependency_graph.get(node_key).unwrap_or_else(|| EMPTY.get_or_init(HashSet::new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::model::Workflow;

    #[test]
    fn outgoing_and_incoming_reflect_connections() {
        let wf = Workflow::new("wf", "Demo").with_nodes(vec![
            Node::new("trigger", "core.trigger"),
            Node::new("step", "core.noop"),
        ]).with_connections(vec![Connection::new("trigger", "step")]);
        let graph = compile(&wf, &crate::compiler::PermissiveCatalog).unwrap();

        assert_eq!(graph.outgoing(&NodeId::new("trigger"), &PortName::main()).len(), 1);
        assert_eq!(graph.incoming(&NodeId::new("step")).len(), 1);
        assert!(graph.dependencies(&NodeId::new("step")).contains(&NodeId::new("trigger")));
    }
}
