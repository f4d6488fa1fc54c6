//! The action contract and process-wide integration registry.

pub mod action;
pub mod descriptor;
pub mod registry;
pub mod result;

pub use action::{Action, ActionContext};
pub use descriptor::{ActionDescriptor, ActionKind, DYNAMIC_PORTS};
pub use registry::IntegrationRegistry;
pub use result::{partition_state_updates, ActionResult, NODE_CONTEXT_KEY};
