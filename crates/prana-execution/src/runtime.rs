//! `__runtime`: a non-persisted cache derived from `node_executions` and the
//! run's environment, kept around purely so expression evaluation doesn't
//! have to re-scan history on every render. Losing it is harmless — it is
//! always rebuildable (see [`crate::state::WorkflowExecution::rebuild_runtime`]).

use std::collections::HashMap;

use prana_core::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What `$nodes.<key>` resolves to: the latest output and per-node context
/// of a node at the point the cache was last refreshed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NodeRuntimeEntry {
    pub output: Value,
    pub context: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeCache {
    pub nodes: HashMap<NodeId, NodeRuntimeEntry>,
    #[serde(default)]
    pub env: Value,
}

impl RuntimeCache {
    #[must_use]
    pub fn new(env: Value) -> Self {
        Self { nodes: HashMap::new(), env }
    }

    pub fn set_node(&mut self, node_key: NodeId, output: Value, context: Value) {
        self.nodes.insert(node_key, NodeRuntimeEntry { output, context });
    }
}
