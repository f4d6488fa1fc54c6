//! Workflow repository port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use prana_workflow::Workflow;
use serde::{Deserialize, Serialize};

use crate::error::PortsError;

/// A stored workflow definition plus the catalog metadata that isn't part
/// of the domain model itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub workflow: Workflow,
    pub status: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filter accepted by [`WorkflowRepo::list_workflows`]. Every field is an
/// optional, ANDed constraint; an empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct WorkflowFilter {
    pub status: Option<String>,
    /// Tag membership: a record matches if it carries every tag listed here.
    pub tags: Vec<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    /// Case-insensitive substring match against `workflow.name`.
    pub name_contains: Option<String>,
}

impl WorkflowFilter {
    #[must_use]
    pub fn matches(&self, record: &WorkflowRecord) -> bool {
        if let Some(status) = &self.status {
            if &record.status != status {
                return false;
            }
        }
        if !self.tags.iter().all(|tag| record.tags.contains(tag)) {
            return false;
        }
        if let Some(after) = self.created_after {
            if record.created_at <= after {
                return false;
            }
        }
        if let Some(before) = self.created_before {
            if record.created_at >= before {
                return false;
            }
        }
        if let Some(needle) = &self.name_contains {
            if !record.workflow.name.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

/// Persistence interface for workflow definitions. Implementations must be
/// `Send + Sync` so the trait object can be shared across an async runtime.
#[async_trait]
pub trait WorkflowRepo: Send + Sync {
    async fn create_workflow(&self, record: WorkflowRecord) -> Result<(), PortsError>;
    async fn get_workflow(&self, id: &prana_core::WorkflowId) -> Result<Option<WorkflowRecord>, PortsError>;
    async fn update_workflow(&self, record: WorkflowRecord) -> Result<(), PortsError>;
    async fn delete_workflow(&self, id: &prana_core::WorkflowId) -> Result<bool, PortsError>;
    async fn list_workflows(&self, filter: &WorkflowFilter) -> Result<Vec<WorkflowRecord>, PortsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, status: &str, tags: &[&str], created_at: DateTime<Utc>) -> WorkflowRecord {
        WorkflowRecord {
            workflow: Workflow::new("wf", name),
            status: status.to_string(),
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let record = record("Order Pipeline", "active", &[], DateTime::UNIX_EPOCH);
        assert!(WorkflowFilter::default().matches(&record));
    }

    #[test]
    fn status_filter_requires_exact_match() {
        let record = record("x", "active", &[], DateTime::UNIX_EPOCH);
        assert!(WorkflowFilter { status: Some("active".into()), ..Default::default() }.matches(&record));
        assert!(!WorkflowFilter { status: Some("archived".into()), ..Default::default() }.matches(&record));
    }

    #[test]
    fn tag_filter_requires_all_listed_tags_present() {
        let record = record("x", "active", &["billing", "prod"], DateTime::UNIX_EPOCH);
        assert!(WorkflowFilter { tags: vec!["billing".into()], ..Default::default() }.matches(&record));
        assert!(!WorkflowFilter { tags: vec!["billing".into(), "staging".into()], ..Default::default() }.matches(&record));
    }

    #[test]
    fn name_contains_is_case_insensitive() {
        let record = record("Order Pipeline", "active", &[], DateTime::UNIX_EPOCH);
        assert!(WorkflowFilter { name_contains: Some("pipeline".into()), ..Default::default() }.matches(&record));
        assert!(!WorkflowFilter { name_contains: Some("invoice".into()), ..Default::default() }.matches(&record));
    }

    #[test]
    fn created_range_is_exclusive_at_the_boundaries() {
        let created_at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let record = record("x", "active", &[], created_at);
        assert!(WorkflowFilter { created_after: Some(created_at - chrono::Duration::seconds(1)), ..Default::default() }.matches(&record));
        assert!(!WorkflowFilter { created_after: Some(created_at), ..Default::default() }.matches(&record));
        assert!(!WorkflowFilter { created_before: Some(created_at), ..Default::default() }.matches(&record));
    }
}
