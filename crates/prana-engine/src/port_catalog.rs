//! Bridges the integration registry (in `prana-action`) to the compiler's
//! [`PortCatalog`] trait (in `prana-workflow`), so the compiler can validate
//! declared ports without depending on the action crate directly.

use prana_action::IntegrationRegistry;
use prana_core::{ActionType, PortName};
use prana_workflow::PortCatalog;

pub struct RegistryPortCatalog<'a> {
    registry: &'a IntegrationRegistry,
}

impl<'a> RegistryPortCatalog<'a> {
    #[must_use]
    pub fn new(registry: &'a IntegrationRegistry) -> Self {
        Self { registry }
    }
}

impl PortCatalog for RegistryPortCatalog<'_> {
    fn output_ports(&self, action_type: &ActionType) -> Option<Vec<PortName>> {
        self.registry.get_action_by_type(action_type).ok().map(|action| action.descriptor().output_ports.clone())
    }

    fn input_ports(&self, action_type: &ActionType) -> Option<Vec<PortName>> {
        self.registry.get_action_by_type(action_type).ok().map(|action| action.descriptor().input_ports.clone())
    }
}
