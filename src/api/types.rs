//! Request and response types for the triage API.

use crate::fallback::Message;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct TriageRequest {
    pub question: String,
    #[serde(default)]
    pub history: Vec<Message>,
    #[serde(default = "default_lang")]
    pub lang: String,
}

pub fn default_lang() -> String {
    "en".to_string()
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub app: &'static str,
    pub version: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_and_lang_default_when_absent() {
        let request: TriageRequest =
            serde_json::from_str(r#"{ "question": "I have a fever" }"#).unwrap();

        assert_eq!(request.question, "I have a fever");
        assert!(request.history.is_empty());
        assert_eq!(request.lang, "en");
    }

    #[test]
    fn missing_question_is_a_parse_error() {
        let result = serde_json::from_str::<TriageRequest>(r#"{ "lang": "en" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn history_roles_parse_from_lowercase() {
        let request: TriageRequest = serde_json::from_str(
            r#"{
                "question": "still coughing",
                "history": [
                    { "role": "user", "text": "I had a cold yesterday" },
                    { "role": "assistant", "text": "Rest and hydrate" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(request.history.len(), 2);
        assert_eq!(request.history[0].text, "I had a cold yesterday");
    }
}
