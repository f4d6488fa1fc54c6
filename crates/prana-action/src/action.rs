//! The `Action` trait: the interface every integration action implements.

use std::fmt::Debug;

use prana_error::{EngineError, ErrorKind};
use serde_json::Value;

use crate::descriptor::ActionDescriptor;
use crate::result::ActionResult;

/// Per-call context passed to `execute`/`resume`. A thin read-only view
/// over the expression context the executor already built — actions never
/// mutate workflow state directly, they return `state_updates` instead.
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub node_key: String,
    pub execution_id: String,
    pub values: Value,
}

/// The executable behind a node type. Implementors are registered under a
/// namespaced [`prana_core::ActionType`] in the integration registry.
pub trait Action: Send + Sync + Debug {
    /// Static metadata: declared ports, params schema, display name.
    fn descriptor(&self) -> &ActionDescriptor;

    /// Run the action. The only required method.
    fn execute(&self, params: &Value, context: &ActionContext) -> ActionResult;

    /// Resume a previously suspended node. Actions that never suspend can
    /// rely on the default, which reports `not_supported`.
    fn resume(&self, _params: &Value, _context: &ActionContext, _resume_data: &Value) -> ActionResult {
        ActionResult::err(EngineError::new(ErrorKind::ActionResumeFailed, "action does not support resume"))
    }

    /// Structural validation of `params` before scheduling. Default: no
    /// validation beyond what `params_schema` (if any) implies.
    fn validate_params(&self, _params: &Value) -> Result<(), EngineError> {
        Ok(())
    }

    /// Pre-scheduling hook for minting webhook URLs, resume ids, etc.
    /// Default: no preparation data.
    fn prepare(&self, _node_params: &Value) -> Result<Value, EngineError> {
        Ok(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ActionKind;
    use serde_json::json;

    #[derive(Debug)]
    struct EchoAction {
        descriptor: ActionDescriptor,
    }

    impl Action for EchoAction {
        fn descriptor(&self) -> &ActionDescriptor {
            &self.descriptor
        }

        fn execute(&self, params: &Value, _context: &ActionContext) -> ActionResult {
            ActionResult::ok(params.clone())
        }
    }

    fn ctx() -> ActionContext {
        ActionContext { node_key: "n1".into(), execution_id: "e1".into(), values: Value::Null }
    }

    #[test]
    fn default_resume_is_not_supported() {
        let action = EchoAction { descriptor: ActionDescriptor::new("echo", "Echo", ActionKind::Action) };
        let result = action.resume(&Value::Null, &ctx(), &Value::Null);
        assert!(result.is_err());
    }

    #[test]
    fn default_validate_and_prepare_are_no_ops() {
        let action = EchoAction { descriptor: ActionDescriptor::new("echo", "Echo", ActionKind::Action) };
        assert!(action.validate_params(&json!({})).is_ok());
        assert_eq!(action.prepare(&json!({})).unwrap(), Value::Null);
    }

    #[test]
    fn execute_is_dispatched_through_the_trait_object() {
        let action: Box<dyn Action> = Box::new(EchoAction { descriptor: ActionDescriptor::new("echo", "Echo", ActionKind::Action) });
        let result = action.execute(&json!({"x": 1}), &ctx());
        assert!(matches!(result, ActionResult::Ok { data, .. } if data == json!({"x": 1})));
    }
}
