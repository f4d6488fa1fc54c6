//! Identifier newtypes used across the engine.
//!
//! All identifiers are thin wrappers around a `Uuid` or a `String`, so a
//! `NodeId` can never be accidentally passed where a `WorkflowId` is
//! expected.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single `WorkflowExecution`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionId(Uuid);

/// Unique identifier for a `Workflow` definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowId(String);

/// Key of a `Node` within its owning workflow. Unique only within that
/// workflow, not globally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(String);

/// Namespaced action type string looked up in the integration registry,
/// e.g. `"http.request"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionType(String);

/// Name of an input or output port on a node, e.g. `"main"`, `"error"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortName(String);

impl ExecutionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ExecutionId {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            #[must_use]
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(WorkflowId);
string_id!(NodeId);
string_id!(ActionType);
string_id!(PortName);

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ExecutionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl PortName {
    /// The conventional default port name used when a node or connection
    /// does not specify one.
    #[must_use]
    pub fn main() -> Self {
        Self("main".to_string())
    }

    /// The conventional fallback error port name.
    #[must_use]
    pub fn error() -> Self {
        Self("error".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_id_generation_is_random() {
        let a = ExecutionId::new();
        let b = ExecutionId::new();
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn workflow_id_roundtrips_as_string() {
        let id = WorkflowId::new("order-pipeline");
        assert_eq!(id.as_str(), "order-pipeline");
        assert_eq!(id.to_string(), "order-pipeline");
    }

    #[test]
    fn node_id_ordering_is_lexicographic() {
        let mut ids = vec![NodeId::new("b"), NodeId::new("a"), NodeId::new("c")];
        ids.sort();
        assert_eq!(ids, vec![NodeId::new("a"), NodeId::new("b"), NodeId::new("c")]);
    }

    #[test]
    fn id_conversions_from_str_and_string() {
        let workflow_id: WorkflowId = "wf".into();
        assert_eq!(workflow_id.as_str(), "wf");
        let node_id: NodeId = String::from("node").into();
        assert_eq!(node_id.as_str(), "node");
    }

    #[test]
    fn execution_id_uuid_conversion_is_lossless() {
        let uuid = Uuid::new_v4();
        let id = ExecutionId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
    }

    #[test]
    fn port_name_defaults() {
        assert_eq!(PortName::main().as_str(), "main");
        assert_eq!(PortName::error().as_str(), "error");
    }

    #[test]
    fn serde_roundtrip() {
        let id = WorkflowId::new("wf-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"wf-1\"");
        let back: WorkflowId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
