//! Deterministic fallback triage composer.
//!
//! The universal safety net: builds the final answer text from the classifier
//! result and the recent conversation history. Never calls any external
//! service, never panics, and is total over all string inputs. Every answer
//! ends with the fixed disclaimer sentence.

use crate::classifier::{classify, Classification};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed disclaimer; always the final sentence of every composed answer.
pub const DISCLAIMER: &str =
    "This is general guidance, not a medical diagnosis; please consult a qualified doctor.";

/// How many trailing history messages the recap line covers.
pub const RECAP_WINDOW: usize = 4;

const SCOPE_LIMIT: &str = "I can help with health-related questions only.";

const RESOURCE_POINTERS: &str = "You can check bed availability, the blood bank, \
and the doctor directory right here in the app.";

const EMERGENCY_POINTER: &str = "If this is an emergency, call your local emergency \
number or go to the nearest emergency department now.";

/// Who said a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One turn of caller-supplied conversation memory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

/// Classify the question and compose the deterministic answer.
pub fn respond(question: &str, history: &[Message]) -> String {
    compose(&classify(question), history)
}

/// Build the final answer text for a classifier result.
///
/// History feeds only the informational recap line; it never overrides a
/// freshly detected emergency.
pub fn compose(classification: &Classification, history: &[Message]) -> String {
    let mut lines: Vec<String> = Vec::new();

    match classification {
        Classification::OutOfScope => {
            lines.push(SCOPE_LIMIT.to_string());
            lines.push("Could you describe your symptoms in a bit more detail?".to_string());
            lines.push(EMERGENCY_POINTER.to_string());
            lines.push(RESOURCE_POINTERS.to_string());
        }
        Classification::Emergency(rule) => {
            lines.push("EMERGENCY WARNING".to_string());
            lines.push(rule.advice.to_string());
            lines.push("Do not wait: seek medical help immediately.".to_string());
            lines.push(RESOURCE_POINTERS.to_string());
        }
        Classification::CommonSymptom(rule) => {
            lines.push(format!("Initial guidance for {}:", rule.keyword));
            for bullet in rule.advice {
                lines.push(format!("- {}", bullet));
            }
            lines.push("If symptoms worsen or persist, consult a doctor.".to_string());
            lines.push(RESOURCE_POINTERS.to_string());
        }
        Classification::Generic => {
            lines.push("Here is some general guidance while you monitor how you feel:".to_string());
            lines.push("- Rest and avoid exertion.".to_string());
            lines.push("- Drink fluids regularly.".to_string());
            lines.push(
                "- Watch for warning signs such as chest pain, difficulty breathing, \
or severe bleeding."
                    .to_string(),
            );
            lines.push(RESOURCE_POINTERS.to_string());
        }
    }

    if let Some(recap) = recap_line(history) {
        lines.push(recap);
    }
    lines.push(DISCLAIMER.to_string());

    lines.join("\n")
}

/// One-line recap of up to the last [`RECAP_WINDOW`] history messages.
fn recap_line(history: &[Message]) -> Option<String> {
    if history.is_empty() {
        return None;
    }
    let start = history.len().saturating_sub(RECAP_WINDOW);
    let mentioned: Vec<&str> = history[start..]
        .iter()
        .map(|message| message.text.as_str())
        .collect();
    Some(format!("I remember you mentioned: {}", mentioned.join("; ")))
}
