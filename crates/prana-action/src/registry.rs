//! Process-wide integration registry.
//!
//! Unlike a per-instance registry, this one is a single shared
//! [`OnceLock`], matching the "Integration Registry is process-wide
//! mutable state behind a serialized interface" design: mutations
//! (register/unregister) are exclusive; lookups are concurrent-safe.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use prana_core::ActionType;
use prana_error::{EngineError, ErrorKind};

use crate::action::Action;

struct Entry {
    integration: String,
    action: Arc<dyn Action>,
}

/// A process-wide single-instance registry. Tests should prefer
/// [`IntegrationRegistry::scoped`] for an isolated instance rather than
/// fighting over [`IntegrationRegistry::global`].
pub struct IntegrationRegistry {
    entries: RwLock<HashMap<ActionType, Entry>>,
}

static GLOBAL: OnceLock<IntegrationRegistry> = OnceLock::new();

impl IntegrationRegistry {
    /// The process-wide registry instance, lazily initialized on first
    /// use.
    pub fn global() -> &'static IntegrationRegistry {
        GLOBAL.get_or_init(IntegrationRegistry::scoped)
    }

    /// A freestanding registry instance, independent of the process-wide
    /// one. Useful for tests and for embedding the engine as a library
    /// with multiple isolated registries.
    #[must_use]
    pub fn scoped() -> Self {
        Self { entries: RwLock::new(HashMap::new()) }
    }

    /// Register every action of an integration. Fails with
    /// `duplicate_integration` if any action name is already registered
    /// and `replace` is false.
    pub fn register(&self, integration: &str, actions: Vec<Arc<dyn Action>>, replace: bool) -> Result<(), EngineError> {
        let mut entries = self.entries.write();
        if !replace {
            for action in &actions {
                let name = &action.descriptor().name;
                if entries.contains_key(name) {
                    return Err(EngineError::new(ErrorKind::DuplicateIntegration, format!("action type '{name}' is already registered"))
                        .with_detail("integration", integration));
                }
            }
        }
        for action in actions {
            let name = action.descriptor().name.clone();
            entries.insert(name, Entry { integration: integration.to_string(), action });
        }
        Ok(())
    }

    /// Look up an action by its type string.
    pub fn get_action_by_type(&self, action_type: &ActionType) -> Result<Arc<dyn Action>, EngineError> {
        self.entries
            .read()
            .get(action_type)
            .map(|entry| Arc::clone(&entry.action))
            .ok_or_else(|| EngineError::new(ErrorKind::ActionNotFound, format!("no action registered for type '{action_type}'")))
    }

    /// Distinct integration names currently registered.
    #[must_use]
    pub fn list_integrations(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().values().map(|e| e.integration.clone()).collect();
        names.sort();
        names.dedup();
        names
    }

    /// Action type strings belonging to one integration.
    #[must_use]
    pub fn list_actions(&self, integration: &str) -> Vec<ActionType> {
        self.entries
            .read()
            .iter()
            .filter(|(_, entry)| entry.integration == integration)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn unregister(&self, action_type: &ActionType) -> Result<(), EngineError> {
        self.entries
            .write()
            .remove(action_type)
            .map(|_| ())
            .ok_or_else(|| EngineError::new(ErrorKind::ActionNotFound, format!("no action registered for type '{action_type}'")))
    }

    /// Reports whether the registry is reachable and non-empty-by-design;
    /// in this in-process registry it always succeeds, but the method
    /// exists so callers that swap in a remote registry keep one contract.
    #[must_use]
    pub fn health_check(&self) -> bool {
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ActionDescriptor, ActionKind};
    use crate::result::ActionResult;
    use crate::action::ActionContext;
    use serde_json::Value;

    #[derive(Debug)]
    struct DummyAction {
        descriptor: ActionDescriptor,
    }

    impl Action for DummyAction {
        fn descriptor(&self) -> &ActionDescriptor {
            &self.descriptor
        }

        fn execute(&self, _params: &Value, _context: &ActionContext) -> ActionResult {
            ActionResult::ok(Value::Null)
        }
    }

    fn dummy(name: &str) -> Arc<dyn Action> {
        Arc::new(DummyAction { descriptor: ActionDescriptor::new(name, name, ActionKind::Action) })
    }

    #[test]
    fn empty_registry_reports_not_found() {
        let registry = IntegrationRegistry::scoped();
        assert!(registry.is_empty());
        let err = registry.get_action_by_type(&"missing".into()).unwrap_err();
        assert_eq!(err.kind().as_str(), "action_not_found");
    }

    #[test]
    fn register_and_get() {
        let registry = IntegrationRegistry::scoped();
        registry.register("http", vec![dummy("http.request")], false).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get_action_by_type(&"http.request".into()).is_ok());
    }

    #[test]
    fn duplicate_registration_is_rejected_without_replace() {
        let registry = IntegrationRegistry::scoped();
        registry.register("http", vec![dummy("http.request")], false).unwrap();
        let err = registry.register("http", vec![dummy("http.request")], false).unwrap_err();
        assert_eq!(err.kind().as_str(), "duplicate_integration");
    }

    #[test]
    fn replace_flag_allows_overwrite() {
        let registry = IntegrationRegistry::scoped();
        registry.register("http", vec![dummy("http.request")], false).unwrap();
        assert!(registry.register("http", vec![dummy("http.request")], true).is_ok());
    }

    #[test]
    fn list_integrations_and_actions() {
        let registry = IntegrationRegistry::scoped();
        registry.register("http", vec![dummy("http.request"), dummy("http.upload")], false).unwrap();
        registry.register("logic", vec![dummy("logic.if_condition")], false).unwrap();

        assert_eq!(registry.list_integrations(), vec!["http".to_string(), "logic".to_string()]);
        let mut http_actions: Vec<String> = registry.list_actions("http").iter().map(ToString::to_string).collect();
        http_actions.sort();
        assert_eq!(http_actions, vec!["http.request".to_string(), "http.upload".to_string()]);
    }

    #[test]
    fn unregister_removes_the_action() {
        let registry = IntegrationRegistry::scoped();
        registry.register("http", vec![dummy("http.request")], false).unwrap();
        registry.unregister(&"http.request".into()).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn unregister_missing_action_errors() {
        let registry = IntegrationRegistry::scoped();
        let err = registry.unregister(&"missing".into()).unwrap_err();
        assert_eq!(err.kind().as_str(), "action_not_found");
    }

    #[test]
    fn health_check_reports_ok() {
        assert!(IntegrationRegistry::scoped().health_check());
    }

    #[test]
    fn global_registry_is_reachable() {
        assert!(IntegrationRegistry::global().health_check());
    }
}
