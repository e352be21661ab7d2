//! Unified failure taxonomy for CareGate.
//!
//! Every way the remote inference path can fail maps to exactly one variant
//! here, and every variant maps to a stable machine-readable reason code that
//! is surfaced in `TriageResponse.reason` when the deterministic fallback
//! answers instead. Raw upstream bodies and statuses stay in the structured
//! fields for diagnostics; they are never leaked into the user-facing answer.

use std::fmt;

/// Why the deterministic fallback engine answered instead of a remote model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriageFailure {
    /// Remote inference is switched off in configuration.
    Disabled,
    /// Remote inference is enabled but no credential is configured.
    MissingCredential,
    /// Discovery returned no usable candidates, or every candidate was a miss.
    ModelNotFound,
    /// Every attempted candidate reported rate limiting.
    QuotaExceeded,
    /// A candidate returned a fatal, non-retryable HTTP status.
    Http { status: u16, body: String },
    /// Any other error caught at the orchestrator boundary.
    Internal(String),
    /// The inbound request body could not be parsed.
    BadRequest,
}

impl TriageFailure {
    /// Stable reason code surfaced in the response when `demo=true`.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Disabled => "ai_disabled",
            Self::MissingCredential => "no_credential",
            Self::ModelNotFound => "model_not_found",
            Self::QuotaExceeded => "quota_exceeded",
            Self::Http { .. } => "http_error",
            Self::Internal(_) => "inference_error",
            Self::BadRequest => "request_error",
        }
    }
}

impl fmt::Display for TriageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "Remote inference is disabled"),
            Self::MissingCredential => write!(f, "No API credential configured"),
            Self::ModelNotFound => write!(f, "No usable model candidate found"),
            Self::QuotaExceeded => write!(f, "All model candidates were rate limited"),
            Self::Http { status, .. } => write!(f, "Upstream returned HTTP {}", status),
            Self::Internal(msg) => write!(f, "Inference error: {}", msg),
            Self::BadRequest => write!(f, "Request body could not be parsed"),
        }
    }
}

impl std::error::Error for TriageFailure {}
