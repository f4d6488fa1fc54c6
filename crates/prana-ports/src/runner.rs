//! Runner contract: what the outer process must do with a suspended
//! execution before it can call `resume_workflow` again. The scheduler
//! itself (in `prana-engine`) never talks to timers, webhooks, or a job
//! queue directly — it only produces a `suspension_type` and hands the rest
//! to whatever implements this trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use prana_core::{ExecutionId, WorkflowId};
use serde_json::Value;

use crate::error::PortsError;

/// Which family of suspension a `suspension_type` string names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspensionKind {
    /// `:interval` / `:schedule` — resume at a fixed wall-clock time.
    Timer,
    /// `:webhook` — resume on an inbound HTTP hit.
    Webhook,
    /// `:retry` — resume at `suspension_data.resume_at` to re-attempt a node.
    Retry,
    /// `:sub_workflow_*` — a child workflow was enqueued.
    SubWorkflow,
}

/// Classify a `suspension_type` string, or `None` if it isn't one this
/// runner contract knows how to route.
#[must_use]
pub fn classify_suspension(suspension_type: &str) -> Option<SuspensionKind> {
    match suspension_type {
        "interval" | "schedule" => Some(SuspensionKind::Timer),
        "webhook" => Some(SuspensionKind::Webhook),
        "retry" => Some(SuspensionKind::Retry),
        kind if kind.starts_with("sub_workflow") => Some(SuspensionKind::SubWorkflow),
        _ => None,
    }
}

/// What the runner does in response to each suspension kind. Implementors
/// own the timer wheel, the webhook router, and the job queue; this crate
/// only pins down the shape of the handoff.
#[async_trait]
pub trait SuspensionRouter: Send + Sync {
    async fn schedule_timer(&self, execution_id: &ExecutionId, resume_at: DateTime<Utc>) -> Result<(), PortsError>;
    async fn register_webhook(&self, execution_id: &ExecutionId, resume_id: &str) -> Result<(), PortsError>;
    async fn schedule_retry(&self, execution_id: &ExecutionId, resume_at: DateTime<Utc>) -> Result<(), PortsError>;
    /// Enqueue the child workflow and return the payload the parent's
    /// `resume_workflow` call should be invoked with.
    async fn enqueue_sub_workflow(&self, parent_execution_id: &ExecutionId, workflow_id: &WorkflowId, execution_mode: &str) -> Result<Value, PortsError>;
}
