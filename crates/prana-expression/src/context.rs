//! Evaluation context: the seven namespaces bare-path expressions and
//! templates resolve against (`$input`, `$nodes`, `$env`, `$vars`,
//! `$workflow`, `$execution`, `$now`).

use std::sync::Arc;

use serde_json::Value;

/// The data a path or template expression is rendered against. Built fresh
/// by the node executor before every render; never mutated mid-render.
#[derive(Debug, Clone)]
pub struct ExpressionContext {
    input: Arc<Value>,
    nodes: Arc<Value>,
    env: Arc<Value>,
    vars: Arc<Value>,
    workflow: Arc<Value>,
    execution: Arc<Value>,
    now: chrono::DateTime<chrono::Utc>,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

impl ExpressionContext {
    #[must_use]
    pub fn builder() -> ExpressionContextBuilder {
        ExpressionContextBuilder::default()
    }

    /// Resolve a top-level namespace by name (without the leading `$`).
    #[must_use]
    pub fn namespace(&self, name: &str) -> Option<Value> {
        match name {
            "input" => Some((*self.input).clone()),
            "nodes" => Some((*self.nodes).clone()),
            "env" => Some((*self.env).clone()),
            "vars" => Some((*self.vars).clone()),
            "workflow" => Some((*self.workflow).clone()),
            "execution" => Some((*self.execution).clone()),
            "now" => Some(Value::String(self.now.to_rfc3339())),
            _ => None,
        }
    }
}

/// Fluent builder mirroring the shape of the context the executor assembles
/// before every node render.
#[derive(Debug, Default)]
pub struct ExpressionContextBuilder {
    input: Option<Value>,
    nodes: Option<Value>,
    env: Option<Value>,
    vars: Option<Value>,
    workflow: Option<Value>,
    execution: Option<Value>,
    now: Option<chrono::DateTime<chrono::Utc>>,
}

impl ExpressionContextBuilder {
    #[must_use]
    pub fn input(mut self, value: Value) -> Self {
        self.input = Some(value);
        self
    }

    #[must_use]
    pub fn nodes(mut self, value: Value) -> Self {
        self.nodes = Some(value);
        self
    }

    #[must_use]
    pub fn env(mut self, value: Value) -> Self {
        self.env = Some(value);
        self
    }

    #[must_use]
    pub fn vars(mut self, value: Value) -> Self {
        self.vars = Some(value);
        self
    }

    #[must_use]
    pub fn workflow(mut self, value: Value) -> Self {
        self.workflow = Some(value);
        self
    }

    #[must_use]
    pub fn execution(mut self, value: Value) -> Self {
        self.execution = Some(value);
        self
    }

    #[must_use]
    pub fn now(mut self, at: chrono::DateTime<chrono::Utc>) -> Self {
        self.now = Some(at);
        self
    }

    #[must_use]
    pub fn build(self) -> ExpressionContext {
        ExpressionContext {
            input: Arc::new(self.input.unwrap_or_else(empty_object)),
            nodes: Arc::new(self.nodes.unwrap_or_else(empty_object)),
            env: Arc::new(self.env.unwrap_or_else(empty_object)),
            vars: Arc::new(self.vars.unwrap_or_else(empty_object)),
            workflow: Arc::new(self.workflow.unwrap_or_else(empty_object)),
            execution: Arc::new(self.execution.unwrap_or_else(empty_object)),
            now: self.now.unwrap_or_else(chrono::Utc::now),
        }
    }
}
