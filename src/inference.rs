//! Inference attempt loop and prompt construction.
//!
//! Candidates are tried strictly one at a time; a later candidate is only
//! attempted after the previous one has definitively failed. Each attempt is
//! classified into an explicit step (`Success` / `Continue` / `Abort`) so the
//! retry/fallback boundary is auditable without mocking network internals.
//! "Retry" here always means "try the next distinct candidate" — the same
//! candidate is never called twice.

use crate::discovery::{ApiSurface, DEFAULT_V1BETA_URL, DEFAULT_V1_URL};
use crate::fallback::Message;
use crate::http::create_client;
use crate::prioritizer::Candidate;
use reqwest::Client;
use serde_json::Value;

/// How many trailing history messages the prompt transcript covers.
pub const HISTORY_WINDOW: usize = 12;

/// Upstream body prefix kept for diagnostics on fatal HTTP errors.
const BODY_PREFIX_LEN: usize = 500;

/// Terminal result of the attempt loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// A candidate produced non-empty text.
    Success {
        text: String,
        model_id: String,
        surface: ApiSurface,
    },
    /// Exhausted all candidates and at least one reported rate limiting.
    RateLimited,
    /// No candidates, or exhausted them without success or rate limiting.
    NotFound,
    /// A candidate returned a status that more retries will not fix.
    FatalHttp { status: u16, body: String },
    /// A transport failure other than a not-found style miss.
    Network(String),
}

/// Classification of a single attempt.
enum AttemptStep {
    Success(String),
    Continue { rate_limited: bool },
    Abort(AttemptOutcome),
}

/// Calls candidate generation endpoints in priority order.
#[derive(Clone)]
pub struct InferenceClient {
    client: Client,
    v1beta_url: String,
    v1_url: String,
    api_key: String,
}

impl InferenceClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: create_client(),
            v1beta_url: DEFAULT_V1BETA_URL.to_string(),
            v1_url: DEFAULT_V1_URL.to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn with_v1beta_url(mut self, url: &str) -> Self {
        self.v1beta_url = url.to_string();
        self
    }

    pub fn with_v1_url(mut self, url: &str) -> Self {
        self.v1_url = url.to_string();
        self
    }

    fn base_url(&self, surface: ApiSurface) -> &str {
        match surface {
            ApiSurface::V1Beta => &self.v1beta_url,
            ApiSurface::V1 => &self.v1_url,
        }
    }

    /// Try candidates in order until one succeeds or a fatal condition aborts
    /// the loop.
    pub async fn run(&self, candidates: &[Candidate], prompt: &str) -> AttemptOutcome {
        let mut rate_limited = false;

        for candidate in candidates {
            match self.attempt(candidate, prompt).await {
                AttemptStep::Success(text) => {
                    tracing::info!(
                        model = %candidate.model_id,
                        surface = candidate.surface.as_str(),
                        "inference succeeded"
                    );
                    return AttemptOutcome::Success {
                        text,
                        model_id: candidate.model_id.clone(),
                        surface: candidate.surface,
                    };
                }
                AttemptStep::Continue { rate_limited: seen } => {
                    rate_limited |= seen;
                }
                AttemptStep::Abort(outcome) => return outcome,
            }
        }

        if rate_limited {
            AttemptOutcome::RateLimited
        } else {
            AttemptOutcome::NotFound
        }
    }

    async fn attempt(&self, candidate: &Candidate, prompt: &str) -> AttemptStep {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url(candidate.surface),
            candidate.model_id
        );
        let body = serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
        });

        let response = match self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let message = e.to_string();
                // A not-found style transport failure is a per-candidate miss.
                if message.to_lowercase().contains("not found") {
                    tracing::debug!(model = %candidate.model_id, "candidate not found, trying next");
                    return AttemptStep::Continue { rate_limited: false };
                }
                return AttemptStep::Abort(AttemptOutcome::Network(message));
            }
        };

        let status = response.status().as_u16();
        match status {
            200..=299 => {
                let data: Value = response.json().await.unwrap_or(Value::Null);
                let text = extract_text(&data);
                if text.trim().is_empty() {
                    // An empty success is a soft miss, not an error.
                    tracing::debug!(model = %candidate.model_id, "empty response, trying next");
                    AttemptStep::Continue { rate_limited: false }
                } else {
                    AttemptStep::Success(text)
                }
            }
            429 => {
                tracing::warn!(model = %candidate.model_id, "candidate rate limited, trying next");
                AttemptStep::Continue { rate_limited: true }
            }
            404 | 405 => {
                tracing::debug!(model = %candidate.model_id, status, "candidate unavailable, trying next");
                AttemptStep::Continue { rate_limited: false }
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                let body: String = body.chars().take(BODY_PREFIX_LEN).collect();
                tracing::error!(model = %candidate.model_id, status, "fatal upstream status, aborting loop");
                AttemptStep::Abort(AttemptOutcome::FatalHttp { status, body })
            }
        }
    }
}

/// Extract answer text from a generation response.
///
/// Primary path: the text parts of the first candidate payload, concatenated.
/// Fallback paths: alternate top-level text fields some responses carry.
pub fn extract_text(data: &Value) -> String {
    if let Some(parts) = data["candidates"][0]["content"]["parts"].as_array() {
        let text: String = parts
            .iter()
            .filter_map(|part| part["text"].as_str())
            .collect();
        if !text.is_empty() {
            return text;
        }
    }

    if let Some(output) = data["candidates"][0]["output"].as_str() {
        return output.to_string();
    }
    data["text"].as_str().unwrap_or_default().to_string()
}

/// Compose the prompt: system instructions, language hint, history
/// transcript, the current question, and output-format instructions.
pub fn build_prompt(question: &str, history: &[Message], lang: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You are a cautious hospital triage assistant. Give short, practical guidance \
for health questions, never a diagnosis, and tell the patient to contact emergency \
services when symptoms sound life-threatening.\n",
    );
    prompt.push_str(&format!("Answer in the language with code \"{}\".\n", lang));

    if !history.is_empty() {
        prompt.push_str("Conversation so far:\n");
        let start = history.len().saturating_sub(HISTORY_WINDOW);
        for message in &history[start..] {
            prompt.push_str(&format!("{}: {}\n", message.role, message.text));
        }
    }

    prompt.push_str(&format!("Patient question: {}\n", question));
    prompt.push_str(
        "Reply in plain text with at most five short bullet points and end with a \
one-line reminder to consult a doctor.",
    );
    prompt
}
