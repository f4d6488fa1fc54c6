//! Action descriptors: the metadata the registry and the node executor
//! reason about without touching the action implementation itself.

use serde::{Deserialize, Serialize};

use prana_core::{ActionType, PortName};

/// The broad category an action belongs to. Purely informational —
/// dispatch is always by [`ActionType`], never by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Trigger,
    Action,
    Logic,
    Wait,
}

/// Sentinel output/input port list meaning "any port name is accepted",
/// used by actions with data-dependent port names (e.g. a switch node).
pub const DYNAMIC_PORTS: &str = "*";

/// Static metadata describing one action type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub name: ActionType,
    pub display_name: String,
    pub kind: ActionKind,
    pub input_ports: Vec<PortName>,
    pub output_ports: Vec<PortName>,
    pub params_schema: Option<serde_json::Value>,
}

impl ActionDescriptor {
    #[must_use]
    pub fn new(name: impl Into<ActionType>, display_name: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            kind,
            input_ports: vec![PortName::main()],
            output_ports: vec![PortName::main()],
            params_schema: None,
        }
    }

    #[must_use]
    pub fn with_output_ports(mut self, ports: impl IntoIterator<Item = PortName>) -> Self {
        self.output_ports = ports.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_input_ports(mut self, ports: impl IntoIterator<Item = PortName>) -> Self {
        self.input_ports = ports.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_params_schema(mut self, schema: serde_json::Value) -> Self {
        self.params_schema = Some(schema);
        self
    }

    /// Whether this action declares dynamic (data-driven) output ports.
    #[must_use]
    pub fn has_dynamic_output_ports(&self) -> bool {
        self.output_ports.iter().any(|p| p.as_str() == DYNAMIC_PORTS)
    }

    /// Whether `port` is a legal output port for this action.
    #[must_use]
    pub fn allows_output_port(&self, port: &PortName) -> bool {
        self.has_dynamic_output_ports() || self.output_ports.contains(port)
    }

    /// Success port default: `"main"` if declared, else the first declared
    /// port.
    #[must_use]
    pub fn default_success_port(&self) -> PortName {
        let main = PortName::main();
        if self.output_ports.contains(&main) {
            return main;
        }
        self.output_ports.first().cloned().unwrap_or(main)
    }

    /// Error port default: `"error"` if declared, else `"failure"`, else
    /// `"error"` regardless.
    #[must_use]
    pub fn default_error_port(&self) -> PortName {
        for candidate in ["error", "failure"] {
            let candidate = PortName::new(candidate);
            if self.output_ports.contains(&candidate) {
                return candidate;
            }
        }
        PortName::error()
    }
}
