//! Request orchestration: remote inference path with deterministic fallback.
//!
//! A linear state machine per request: enabled? -> credential? -> discover ->
//! prioritize -> attempt loop -> remote answer, with every other outcome
//! routed to the fallback composer. This is the single point where remaining
//! failures are converted into a `demo=true` response; nothing escapes to the
//! caller.

use crate::config::AiConfig;
use crate::discovery::{ModelDiscovery, DEFAULT_V1BETA_URL, DEFAULT_V1_URL};
use crate::error::TriageFailure;
use crate::fallback::{self, Message, Role};
use crate::inference::{build_prompt, AttemptOutcome, InferenceClient};
use crate::prioritizer::prioritize;
use serde::Serialize;

/// Synthetic assistant note added to the recap history when the remote path
/// fails mid-conversation.
const UNAVAILABLE_NOTE: &str = "AI unavailable; using safe guidance";

/// The annotated answer returned to the caller.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TriageResponse {
    pub answer: String,
    pub demo: bool,
    pub reason: Option<String>,
    pub model: Option<String>,
    #[serde(rename = "apiSurface")]
    pub api_surface: Option<String>,
    pub lang: String,
}

/// Per-request triage orchestrator.
///
/// Holds only configuration; no state survives a request, and each request
/// re-discovers the available models for freshness.
#[derive(Clone)]
pub struct TriageEngine {
    config: AiConfig,
    v1beta_url: String,
    v1_url: String,
}

impl TriageEngine {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            v1beta_url: DEFAULT_V1BETA_URL.to_string(),
            v1_url: DEFAULT_V1_URL.to_string(),
        }
    }

    /// Point discovery and inference at different base URLs (for tests).
    pub fn with_upstream_urls(mut self, v1beta: &str, v1: &str) -> Self {
        self.v1beta_url = v1beta.to_string();
        self.v1_url = v1.to_string();
        self
    }

    /// Answer a triage question, always producing a response.
    pub async fn handle(&self, question: &str, history: &[Message], lang: &str) -> TriageResponse {
        if !self.config.enabled {
            return self.fallback(question, history, lang, TriageFailure::Disabled);
        }

        let api_key = match self.config.api_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => return self.fallback(question, history, lang, TriageFailure::MissingCredential),
        };

        match self.remote_answer(question, history, lang, api_key).await {
            AttemptOutcome::Success { text, model_id, surface } => TriageResponse {
                answer: text,
                demo: false,
                reason: None,
                model: Some(model_id),
                api_surface: Some(surface.as_str().to_string()),
                lang: lang.to_string(),
            },
            AttemptOutcome::RateLimited => {
                self.mid_conversation_fallback(question, history, lang, TriageFailure::QuotaExceeded)
            }
            AttemptOutcome::NotFound => {
                self.mid_conversation_fallback(question, history, lang, TriageFailure::ModelNotFound)
            }
            AttemptOutcome::FatalHttp { status, body } => self.mid_conversation_fallback(
                question,
                history,
                lang,
                TriageFailure::Http { status, body },
            ),
            AttemptOutcome::Network(message) => self.mid_conversation_fallback(
                question,
                history,
                lang,
                TriageFailure::Internal(message),
            ),
        }
    }

    async fn remote_answer(
        &self,
        question: &str,
        history: &[Message],
        lang: &str,
        api_key: &str,
    ) -> AttemptOutcome {
        let discovery = ModelDiscovery::new(api_key)
            .with_v1beta_url(&self.v1beta_url)
            .with_v1_url(&self.v1_url);
        let availability = discovery.discover().await;

        let candidates = prioritize(&availability, &self.config.preferred_model);
        if candidates.is_empty() {
            return AttemptOutcome::NotFound;
        }

        let client = InferenceClient::new(api_key)
            .with_v1beta_url(&self.v1beta_url)
            .with_v1_url(&self.v1_url);
        client.run(&candidates, &build_prompt(question, history, lang)).await
    }

    /// Fallback after an attempted remote path: when history exists, the
    /// recap gets a synthetic note so it reflects what actually happened.
    fn mid_conversation_fallback(
        &self,
        question: &str,
        history: &[Message],
        lang: &str,
        failure: TriageFailure,
    ) -> TriageResponse {
        if history.is_empty() {
            return self.fallback(question, history, lang, failure);
        }
        let mut annotated = history.to_vec();
        annotated.push(Message {
            role: Role::Assistant,
            text: UNAVAILABLE_NOTE.to_string(),
        });
        self.fallback(question, &annotated, lang, failure)
    }

    /// Compose a deterministic answer annotated with a reason code.
    pub fn fallback(
        &self,
        question: &str,
        history: &[Message],
        lang: &str,
        failure: TriageFailure,
    ) -> TriageResponse {
        tracing::info!(reason = failure.reason_code(), "serving deterministic fallback");
        TriageResponse {
            answer: fallback::respond(question, history),
            demo: true,
            reason: Some(failure.reason_code().to_string()),
            model: None,
            api_surface: None,
            lang: lang.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::DISCLAIMER;
    use mockito::Matcher;
    use pretty_assertions::assert_eq;

    fn disabled_engine() -> TriageEngine {
        TriageEngine::new(AiConfig::default())
    }

    fn enabled_config() -> AiConfig {
        AiConfig {
            enabled: true,
            api_key: Some("test-key".to_string()),
            ..AiConfig::default()
        }
    }

    fn user(text: &str) -> Message {
        Message {
            role: Role::User,
            text: text.to_string(),
        }
    }

    fn key_matcher() -> Matcher {
        Matcher::UrlEncoded("key".into(), "test-key".into())
    }

    fn flash_listing() -> String {
        serde_json::json!({
            "models": [{
                "name": "models/gemini-1.5-flash",
                "supportedGenerationMethods": ["generateContent"],
            }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn disabled_ai_reports_ai_disabled() {
        let response = disabled_engine().handle("I have a fever", &[], "en").await;

        assert!(response.demo);
        assert_eq!(response.reason.as_deref(), Some("ai_disabled"));
        assert_eq!(response.model, None);
        assert_eq!(response.api_surface, None);
        assert!(response.answer.ends_with(DISCLAIMER));
    }

    #[tokio::test]
    async fn enabled_without_credential_reports_no_credential() {
        let engine = TriageEngine::new(AiConfig {
            enabled: true,
            api_key: None,
            ..AiConfig::default()
        });

        let response = engine.handle("I have a fever", &[], "en").await;

        assert!(response.demo);
        assert_eq!(response.reason.as_deref(), Some("no_credential"));
    }

    #[tokio::test]
    async fn empty_credential_behaves_like_missing() {
        let engine = TriageEngine::new(AiConfig {
            enabled: true,
            api_key: Some(String::new()),
            ..AiConfig::default()
        });

        let response = engine.handle("I have a fever", &[], "en").await;

        assert_eq!(response.reason.as_deref(), Some("no_credential"));
    }

    #[tokio::test]
    async fn fallback_is_deterministic() {
        let engine = disabled_engine();
        let history = vec![user("I had a cold yesterday")];

        let first = engine.handle("I have a mild cough", &history, "en").await;
        let second = engine.handle("I have a mild cough", &history, "en").await;

        assert_eq!(first.answer, second.answer);
    }

    #[tokio::test]
    async fn remote_success_is_annotated_with_model_and_surface() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1beta/models")
            .match_query(key_matcher())
            .with_status(200)
            .with_body(flash_listing())
            .create_async()
            .await;
        server
            .mock("GET", "/v1/models")
            .match_query(key_matcher())
            .with_status(500)
            .create_async()
            .await;
        server
            .mock("POST", "/v1beta/models/gemini-1.5-flash:generateContent")
            .match_query(key_matcher())
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "candidates": [{ "content": { "parts": [{ "text": "Rest well." }] } }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let engine = TriageEngine::new(enabled_config()).with_upstream_urls(
            &format!("{}/v1beta", server.url()),
            &format!("{}/v1", server.url()),
        );

        let response = engine.handle("I have a fever", &[], "en").await;

        assert!(!response.demo);
        assert_eq!(response.reason, None);
        assert_eq!(response.answer, "Rest well.");
        assert_eq!(response.model.as_deref(), Some("gemini-1.5-flash"));
        assert_eq!(response.api_surface.as_deref(), Some("v1beta"));
    }

    #[tokio::test]
    async fn exhausted_rate_limits_report_quota_exceeded() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1beta/models")
            .match_query(key_matcher())
            .with_status(200)
            .with_body(flash_listing())
            .create_async()
            .await;
        server
            .mock("GET", "/v1/models")
            .match_query(key_matcher())
            .with_status(500)
            .create_async()
            .await;
        server
            .mock("POST", "/v1beta/models/gemini-1.5-flash:generateContent")
            .match_query(key_matcher())
            .with_status(429)
            .create_async()
            .await;

        let engine = TriageEngine::new(enabled_config()).with_upstream_urls(
            &format!("{}/v1beta", server.url()),
            &format!("{}/v1", server.url()),
        );

        let response = engine.handle("I have a fever", &[], "en").await;

        assert!(response.demo);
        assert_eq!(response.reason.as_deref(), Some("quota_exceeded"));
        assert!(response.answer.ends_with(DISCLAIMER));
    }

    #[tokio::test]
    async fn fatal_upstream_status_reports_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1beta/models")
            .match_query(key_matcher())
            .with_status(200)
            .with_body(flash_listing())
            .create_async()
            .await;
        server
            .mock("GET", "/v1/models")
            .match_query(key_matcher())
            .with_status(500)
            .create_async()
            .await;
        server
            .mock("POST", "/v1beta/models/gemini-1.5-flash:generateContent")
            .match_query(key_matcher())
            .with_status(403)
            .with_body("forbidden: key not authorized")
            .create_async()
            .await;

        let engine = TriageEngine::new(enabled_config()).with_upstream_urls(
            &format!("{}/v1beta", server.url()),
            &format!("{}/v1", server.url()),
        );

        let response = engine.handle("I have a fever", &[], "en").await;

        assert!(response.demo);
        assert_eq!(response.reason.as_deref(), Some("http_error"));
        // Upstream bodies stay in diagnostics, never in the answer.
        assert!(!response.answer.contains("forbidden"));
        assert!(response.answer.ends_with(DISCLAIMER));
    }

    #[tokio::test]
    async fn empty_discovery_reports_model_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1beta/models")
            .match_query(key_matcher())
            .with_status(503)
            .create_async()
            .await;
        server
            .mock("GET", "/v1/models")
            .match_query(key_matcher())
            .with_status(503)
            .create_async()
            .await;

        let engine = TriageEngine::new(enabled_config()).with_upstream_urls(
            &format!("{}/v1beta", server.url()),
            &format!("{}/v1", server.url()),
        );

        let response = engine.handle("I have a fever", &[], "en").await;

        assert!(response.demo);
        assert_eq!(response.reason.as_deref(), Some("model_not_found"));
    }

    #[tokio::test]
    async fn mid_conversation_failure_adds_unavailable_note_to_recap() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1beta/models")
            .match_query(key_matcher())
            .with_status(503)
            .create_async()
            .await;
        server
            .mock("GET", "/v1/models")
            .match_query(key_matcher())
            .with_status(503)
            .create_async()
            .await;

        let engine = TriageEngine::new(enabled_config()).with_upstream_urls(
            &format!("{}/v1beta", server.url()),
            &format!("{}/v1", server.url()),
        );

        let history = vec![user("I had a cold yesterday")];
        let response = engine.handle("I have a mild cough", &history, "en").await;

        assert!(response.answer.contains("AI unavailable; using safe guidance"));
        assert!(response.answer.contains("I had a cold yesterday"));
    }

    #[tokio::test]
    async fn fresh_question_failure_keeps_recap_empty() {
        let engine = TriageEngine::new(enabled_config())
            .with_upstream_urls("http://127.0.0.1:1/v1beta", "http://127.0.0.1:1/v1");

        let response = engine.handle("I have a fever", &[], "en").await;

        assert!(response.demo);
        // Refused discovery means an empty availability map, not a fatal abort.
        assert_eq!(response.reason.as_deref(), Some("model_not_found"));
        assert!(!response.answer.contains("I remember you mentioned"));
    }
}
