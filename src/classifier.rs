//! Scope and safety classifier for triage questions.
//!
//! Intentionally simple substring matching over fixed, ordered rule tables.
//! Determinism and auditability matter more than recall here: the tables are
//! plain data, evaluated top to bottom, and the first match always wins.

/// An emergency keyword and the advice line emitted when it matches.
#[derive(Debug, PartialEq, Eq)]
pub struct RedFlagRule {
    pub keyword: &'static str,
    pub advice: &'static str,
}

/// A common-symptom keyword and its self-care bullet list.
#[derive(Debug, PartialEq, Eq)]
pub struct CommonSymptomRule {
    pub keyword: &'static str,
    pub advice: &'static [&'static str],
}

/// Substrings that mark a question as health-related: symptom nouns,
/// body-system words, and in-app resource names.
pub static HEALTH_HINTS: &[&str] = &[
    "pain", "fever", "cough", "cold", "flu", "headache", "diarrhea", "diarrhoea",
    "vomit", "nausea", "dizzy", "bleed", "breath", "unconscious", "stroke",
    "seizure", "burn", "poison", "fracture", "injury", "wound", "rash", "swelling",
    "infection", "allerg", "diabet", "pressure", "heart", "chest", "stomach",
    "throat", "skin", "sick", "unwell", "illness", "symptom", "medicine",
    "medication", "doctor", "hospital", "ambulance", "pregnan", "health",
    "bed", "blood", "appointment",
];

/// Emergency red flags, checked in declaration order; first match wins.
pub static RED_FLAGS: &[RedFlagRule] = &[
    RedFlagRule {
        keyword: "chest pain",
        advice: "Chest pain can signal a heart attack.",
    },
    RedFlagRule {
        keyword: "difficulty breathing",
        advice: "Trouble breathing needs urgent medical attention.",
    },
    RedFlagRule {
        keyword: "shortness of breath",
        advice: "Trouble breathing needs urgent medical attention.",
    },
    RedFlagRule {
        keyword: "severe bleeding",
        advice: "Apply firm pressure to the wound and get help immediately.",
    },
    RedFlagRule {
        keyword: "unconscious",
        advice: "Loss of consciousness is a medical emergency.",
    },
    RedFlagRule {
        keyword: "stroke",
        advice: "Sudden weakness, face drooping, or slurred speech can mean a stroke.",
    },
    RedFlagRule {
        keyword: "seizure",
        advice: "A seizure, especially a first one, needs immediate evaluation.",
    },
    RedFlagRule {
        keyword: "severe burn",
        advice: "Cool the burn with running water and seek emergency care.",
    },
    RedFlagRule {
        keyword: "poison",
        advice: "Suspected poisoning needs immediate professional help.",
    },
];

/// Common symptoms, checked only when no red flag matched.
pub static COMMON_SYMPTOMS: &[CommonSymptomRule] = &[
    CommonSymptomRule {
        keyword: "fever",
        advice: &[
            "Rest and drink plenty of fluids.",
            "Take paracetamol as directed on the label to reduce the temperature.",
            "Check your temperature every few hours.",
        ],
    },
    CommonSymptomRule {
        keyword: "cough",
        advice: &[
            "Sip warm water or honey and lemon to soothe the throat.",
            "Avoid smoke and other irritants.",
            "Use steam inhalation if the cough feels dry.",
        ],
    },
    CommonSymptomRule {
        keyword: "cold",
        advice: &[
            "Rest and keep warm.",
            "Drink warm fluids through the day.",
            "Use saline drops for a blocked nose.",
        ],
    },
    CommonSymptomRule {
        keyword: "headache",
        advice: &[
            "Rest in a quiet, dimly lit room.",
            "Drink water; dehydration is a common trigger.",
            "A simple pain reliever taken as directed can help.",
        ],
    },
    CommonSymptomRule {
        keyword: "diarrhea",
        advice: &[
            "Drink oral rehydration solution after each loose stool.",
            "Eat small, bland meals.",
            "Avoid dairy and very sugary drinks for now.",
        ],
    },
    CommonSymptomRule {
        keyword: "vomit",
        advice: &[
            "Take small sips of clear fluid every few minutes.",
            "Avoid solid food until the vomiting settles.",
            "Rest with your head elevated.",
        ],
    },
];

/// Result of classifying a question.
#[derive(Debug, PartialEq, Eq)]
pub enum Classification {
    /// Not a health-related question at all.
    OutOfScope,
    /// Matched an emergency red flag.
    Emergency(&'static RedFlagRule),
    /// Matched a common-symptom rule.
    CommonSymptom(&'static CommonSymptomRule),
    /// Health-related but matched no specific rule.
    Generic,
}

/// Classify a question by substring matching against the rule tables.
///
/// Red flags take precedence over common symptoms regardless of position in
/// the query; ties within a table are broken by declaration order, not by
/// any severity scoring.
pub fn classify(query: &str) -> Classification {
    let query = query.to_lowercase();

    if !HEALTH_HINTS.iter().any(|hint| query.contains(hint)) {
        return Classification::OutOfScope;
    }

    if let Some(rule) = RED_FLAGS.iter().find(|rule| query.contains(rule.keyword)) {
        return Classification::Emergency(rule);
    }

    if let Some(rule) = COMMON_SYMPTOMS
        .iter()
        .find(|rule| query.contains(rule.keyword))
    {
        return Classification::CommonSymptom(rule);
    }

    Classification::Generic
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_health_questions() {
        assert_eq!(classify("what's the weather today"), Classification::OutOfScope);
        assert_eq!(classify("book me a taxi"), Classification::OutOfScope);
    }

    #[test]
    fn empty_query_is_out_of_scope() {
        assert_eq!(classify(""), Classification::OutOfScope);
    }

    #[test]
    fn red_flag_wins_over_common_symptom() {
        let result = classify("I have chest pain and fever");
        match result {
            Classification::Emergency(rule) => assert_eq!(rule.keyword, "chest pain"),
            other => panic!("expected emergency, got {:?}", other),
        }
    }

    #[test]
    fn red_flag_ties_break_by_declaration_order() {
        // Both keywords present; "chest pain" is declared before "stroke".
        let result = classify("could this stroke risk explain my chest pain?");
        match result {
            Classification::Emergency(rule) => assert_eq!(rule.keyword, "chest pain"),
            other => panic!("expected emergency, got {:?}", other),
        }
    }

    #[test]
    fn matches_common_symptom_when_no_red_flag() {
        let result = classify("I have a mild cough");
        match result {
            Classification::CommonSymptom(rule) => assert_eq!(rule.keyword, "cough"),
            other => panic!("expected common symptom, got {:?}", other),
        }
    }

    #[test]
    fn health_related_without_rule_match_is_generic() {
        assert_eq!(classify("my health has felt off lately"), Classification::Generic);
    }

    #[test]
    fn matching_is_case_insensitive() {
        match classify("SEVERE BLEEDING from a cut") {
            Classification::Emergency(rule) => assert_eq!(rule.keyword, "severe bleeding"),
            other => panic!("expected emergency, got {:?}", other),
        }
    }

    #[test]
    fn every_red_flag_keyword_triggers_its_own_rule() {
        for rule in RED_FLAGS {
            match classify(rule.keyword) {
                Classification::Emergency(matched) => {
                    assert_eq!(matched.keyword, rule.keyword)
                }
                other => panic!("{:?} did not trigger emergency: {:?}", rule.keyword, other),
            }
        }
    }

    #[test]
    fn every_common_symptom_keyword_triggers_a_rule() {
        for rule in COMMON_SYMPTOMS {
            match classify(rule.keyword) {
                Classification::CommonSymptom(matched) => {
                    assert_eq!(matched.keyword, rule.keyword)
                }
                Classification::Emergency(_) => {
                    // Acceptable only if a red flag shares the substring; none do today.
                    panic!("{:?} unexpectedly matched a red flag", rule.keyword)
                }
                other => panic!("{:?} did not match: {:?}", rule.keyword, other),
            }
        }
    }
}
