//! Resume-id minting, webhook URL construction, and the small state machine
//! that tracks a webhook from registration through consumption.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use prana_core::ExecutionId;
use prana_error::{EngineError, ErrorKind};
use rand::RngExt;

/// An opaque resume identifier, parsed back into its parts by
/// [`extract_resume_id_parts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeIdParts {
    pub execution_id: ExecutionId,
    pub token: String,
}

/// Mint `"{execution_id}_{8-byte-url-safe-random}"`. The token is never
/// reused for a different execution, so a leaked resume id can only ever
/// target the run it was issued for.
#[must_use]
pub fn generate_resume_id(execution_id: &ExecutionId) -> String {
    let mut bytes = [0u8; 8];
    rand::rng().fill(&mut bytes);
    let token = URL_SAFE_NO_PAD.encode(bytes);
    format!("{execution_id}_{token}")
}

/// Split a resume id back into its execution id and token. The execution id
/// is a UUID and never contains `_`, so the first underscore is always the
/// separator even though the token's own alphabet may contain one.
pub fn extract_resume_id_parts(id: &str) -> Result<ResumeIdParts, EngineError> {
    let (execution_id, token) = id
        .split_once('_')
        .ok_or_else(|| EngineError::new(ErrorKind::InvalidResumeId, format!("resume id '{id}' has no execution_id/token separator")))?;
    let uuid = execution_id.parse::<uuid::Uuid>().map_err(|e| EngineError::new(ErrorKind::InvalidResumeId, format!("resume id '{id}' has an invalid execution_id: {e}")))?;
    if token.is_empty() {
        return Err(EngineError::new(ErrorKind::InvalidResumeId, format!("resume id '{id}' has an empty token")));
    }
    Ok(ResumeIdParts { execution_id: ExecutionId::from_uuid(uuid), token: token.to_string() })
}

/// Which of the two webhook routes a URL is being built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookUrlKind {
    Trigger,
    Resume,
}

impl WebhookUrlKind {
    fn segment(self) -> &'static str {
        match self {
            WebhookUrlKind::Trigger => "trigger",
            WebhookUrlKind::Resume => "resume",
        }
    }
}

/// Build `"{base}/webhook/workflow/{trigger|resume}/{id}"`, tolerating a
/// trailing slash on `base`.
#[must_use]
pub fn build_webhook_url(base: &str, kind: WebhookUrlKind, id: &str) -> String {
    format!("{}/webhook/workflow/{}/{id}", base.trim_end_matches('/'), kind.segment())
}

/// Lifecycle of a registered webhook, from `:webhook` suspension through the
/// HTTP hit that resumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookState {
    Pending,
    Active,
    Consumed,
    Expired,
}

impl WebhookState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            WebhookState::Pending => "pending",
            WebhookState::Active => "active",
            WebhookState::Consumed => "consumed",
            WebhookState::Expired => "expired",
        }
    }
}

/// Validate and apply a webhook state transition. Self-loops (`from == to`)
/// are always accepted so a retried registration or a duplicate HTTP hit is
/// a no-op rather than an error.
pub fn transition_webhook_state(from: WebhookState, to: WebhookState) -> Result<WebhookState, EngineError> {
    use WebhookState::{Active, Consumed, Expired, Pending};
    if from == to {
        return Ok(to);
    }
    match (from, to) {
        (Pending, Active | Expired) | (Active, Consumed | Expired) => Ok(to),
        _ => Err(EngineError::new(
            ErrorKind::InvalidWebhookState,
            format!("cannot transition webhook state from '{}' to '{}'", from.as_str(), to.as_str()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_resume_id_round_trips_through_extract() {
        let execution_id = ExecutionId::new();
        let resume_id = generate_resume_id(&execution_id);
        let parts = extract_resume_id_parts(&resume_id).unwrap();
        assert_eq!(parts.execution_id, execution_id);
        assert!(!parts.token.is_empty());
    }

    #[test]
    fn generate_resume_id_is_unique_per_call() {
        let execution_id = ExecutionId::new();
        assert_ne!(generate_resume_id(&execution_id), generate_resume_id(&execution_id));
    }

    #[test]
    fn extract_resume_id_parts_rejects_missing_separator() {
        let err = extract_resume_id_parts("not-a-resume-id").unwrap_err();
        assert_eq!(err.kind().as_str(), "invalid_resume_id");
    }

    #[test]
    fn extract_resume_id_parts_rejects_an_invalid_uuid() {
        let err = extract_resume_id_parts("not-a-uuid_abc123").unwrap_err();
        assert_eq!(err.kind().as_str(), "invalid_resume_id");
    }

    #[test]
    fn extract_resume_id_parts_rejects_an_empty_token() {
        let execution_id = ExecutionId::new();
        let err = extract_resume_id_parts(&format!("{execution_id}_")).unwrap_err();
        assert_eq!(err.kind().as_str(), "invalid_resume_id");
    }

    #[test]
    fn build_webhook_url_matches_the_documented_shape() {
        let trigger = build_webhook_url("https://runner.example.com", WebhookUrlKind::Trigger, "wf-1");
        assert_eq!(trigger, "https://runner.example.com/webhook/workflow/trigger/wf-1");

        let resume = build_webhook_url("https://runner.example.com/", WebhookUrlKind::Resume, "exec-1_token");
        assert_eq!(resume, "https://runner.example.com/webhook/workflow/resume/exec-1_token");
    }

    #[test]
    fn webhook_state_follows_the_documented_transitions() {
        assert_eq!(transition_webhook_state(WebhookState::Pending, WebhookState::Active).unwrap(), WebhookState::Active);
        assert_eq!(transition_webhook_state(WebhookState::Pending, WebhookState::Expired).unwrap(), WebhookState::Expired);
        assert_eq!(transition_webhook_state(WebhookState::Active, WebhookState::Consumed).unwrap(), WebhookState::Consumed);
        assert_eq!(transition_webhook_state(WebhookState::Active, WebhookState::Expired).unwrap(), WebhookState::Expired);
    }

    #[test]
    fn webhook_state_self_loops_are_idempotent() {
        assert_eq!(transition_webhook_state(WebhookState::Active, WebhookState::Active).unwrap(), WebhookState::Active);
        assert_eq!(transition_webhook_state(WebhookState::Consumed, WebhookState::Consumed).unwrap(), WebhookState::Consumed);
    }

    #[test]
    fn webhook_state_rejects_illegal_transitions() {
        let err = transition_webhook_state(WebhookState::Consumed, WebhookState::Active).unwrap_err();
        assert_eq!(err.kind().as_str(), "invalid_webhook_state");
        let err = transition_webhook_state(WebhookState::Expired, WebhookState::Pending).unwrap_err();
        assert_eq!(err.kind().as_str(), "invalid_webhook_state");
    }
}
