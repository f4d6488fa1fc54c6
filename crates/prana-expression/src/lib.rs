//! Expression and template rendering for Prana workflows.
//!
//! Two syntaxes share one path resolver: a bare path (`$input.foo`) and a
//! template containing `{{ expr | filter | ... }}` regions. Both are pure
//! functions over an [`ExpressionContext`] — no I/O, no side effects.

pub mod context;
pub mod eval;
pub mod filters;
pub mod path;
pub mod template;

pub use context::{ExpressionContext, ExpressionContextBuilder};
pub use eval::{evaluate, PipelineOutcome};
pub use path::Path;
pub use template::{render_params, Template};
