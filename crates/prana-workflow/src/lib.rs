//! Workflow definition model and compiler.
//!
//! A [`model::Workflow`] is the raw, user-authored definition: nodes and
//! connections with no guarantee of a well-formed graph. [`compiler::compile`]
//! validates it and produces a [`graph::ExecutionGraph`] annotated with loop
//! analysis, ready for scheduling.

pub mod compiler;
pub mod graph;
pub mod model;

pub use compiler::{compile, PermissiveCatalog, PortCatalog};
pub use graph::ExecutionGraph;
pub use model::{Connection, LoopRole, Node, NodeSettings, Workflow};
