//! The action return tuple: the seven forms an `execute`/`resume` call can
//! produce, and the reserved `node_context` state-update key.

use prana_core::PortName;
use prana_error::EngineError;
use serde_json::{Map, Value};

/// Reserved key inside `state_updates` that is merged into the node's own
/// context bag rather than the shared workflow state.
pub const NODE_CONTEXT_KEY: &str = "node_context";

/// What an `Action::execute`/`Action::resume` call returns.
#[derive(Debug, Clone)]
pub enum ActionResult {
    /// Success, with an optional explicit output port and optional state
    /// updates (merged into workflow/node context).
    Ok {
        data: Value,
        port: Option<PortName>,
        state_updates: Option<Map<String, Value>>,
    },
    /// Failure, with an optional explicit error port.
    Err { error: EngineError, port: Option<PortName> },
    /// The node pauses; `suspension_type` identifies how the outer runner
    /// should re-arm it (`"interval"`, `"webhook"`, `"retry"`, ...).
    Suspend {
        suspension_type: String,
        suspension_data: Value,
    },
}

impl ActionResult {
    #[must_use]
    pub fn ok(data: Value) -> Self {
        ActionResult::Ok { data, port: None, state_updates: None }
    }

    #[must_use]
    pub fn ok_port(data: Value, port: PortName) -> Self {
        ActionResult::Ok { data, port: Some(port), state_updates: None }
    }

    #[must_use]
    pub fn ok_with_state(data: Value, state_updates: Map<String, Value>) -> Self {
        ActionResult::Ok { data, port: None, state_updates: Some(state_updates) }
    }

    #[must_use]
    pub fn ok_with_port_and_state(data: Value, port: PortName, state_updates: Map<String, Value>) -> Self {
        ActionResult::Ok { data, port: Some(port), state_updates: Some(state_updates) }
    }

    #[must_use]
    pub fn err(error: EngineError) -> Self {
        ActionResult::Err { error, port: None }
    }

    #[must_use]
    pub fn err_port(error: EngineError, port: PortName) -> Self {
        ActionResult::Err { error, port: Some(port) }
    }

    #[must_use]
    pub fn suspend(suspension_type: impl Into<String>, suspension_data: Value) -> Self {
        ActionResult::Suspend { suspension_type: suspension_type.into(), suspension_data }
    }

    #[must_use]
    pub fn is_suspend(&self) -> bool {
        matches!(self, ActionResult::Suspend { .. })
    }

    #[must_use]
    pub fn is_err(&self) -> bool {
        matches!(self, ActionResult::Err { .. })
    }
}

/// Split `state_updates` into `(node_context, workflow_state)`. The
/// reserved `node_context` key goes to the node's own context bag;
/// everything else merges into shared workflow state.
#[must_use]
pub fn partition_state_updates(state_updates: Map<String, Value>) -> (Map<String, Value>, Map<String, Value>) {
    let mut node_context = Map::new();
    let mut workflow_state = Map::new();
    for (key, value) in state_updates {
        if key == NODE_CONTEXT_KEY {
            if let Value::Object(map) = value {
                node_context = map;
            }
        } else {
            workflow_state.insert(key, value);
        }
    }
    (node_context, workflow_state)
}
