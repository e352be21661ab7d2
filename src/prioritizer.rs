//! Candidate prioritization.
//!
//! Turns the discovery availability map into an ordered attempt list: an
//! explicit preference list first, then generic substring tiers ("flash",
//! then "pro"), then everything available. Iteration over the availability
//! map is lexicographic by model id, so the tiers are deterministic.

use crate::discovery::{ApiSurface, Availability};
use std::collections::BTreeSet;

/// Default model to try first when the caller configures no override.
pub const DEFAULT_PREFERRED_MODEL: &str = "gemini-1.5-flash";

/// Fixed preference order tried before any substring tier.
const PREFERENCE_LIST: &[&str] = &[
    "gemini-1.5-flash",
    "gemini-1.5-flash-8b",
    "gemini-1.5-pro",
    "gemini-pro",
];

/// One (model id, API surface) pair eligible for an inference attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub model_id: String,
    pub surface: ApiSurface,
}

/// Build the ordered candidate list for the inference loop.
///
/// An empty availability map yields an empty list; the inference loop treats
/// that as a terminal not-found condition.
pub fn prioritize(availability: &Availability, preferred: &str) -> Vec<Candidate> {
    // Preference list, deduplicated, preferred id first.
    let mut preference: Vec<&str> = Vec::with_capacity(PREFERENCE_LIST.len() + 1);
    for id in std::iter::once(preferred).chain(PREFERENCE_LIST.iter().copied()) {
        if !preference.contains(&id) {
            preference.push(id);
        }
    }

    let mut candidates: Vec<Candidate> = preference
        .iter()
        .filter_map(|id| {
            availability
                .get_key_value(*id)
                .map(|(id, surfaces)| candidate(id, surfaces))
        })
        .collect();

    // Substring tiers: anything "flash", then anything "pro".
    if candidates.is_empty() {
        for needle in ["flash", "pro"] {
            for (id, surfaces) in availability {
                if id.contains(needle) && !candidates.iter().any(|c| &c.model_id == id) {
                    candidates.push(candidate(id, surfaces));
                }
            }
        }
    }

    // Last resort: every available model.
    if candidates.is_empty() {
        candidates = availability
            .iter()
            .map(|(id, surfaces)| candidate(id, surfaces))
            .collect();
    }

    candidates
}

fn candidate(id: &str, surfaces: &BTreeSet<ApiSurface>) -> Candidate {
    Candidate {
        model_id: id.to_string(),
        surface: pick_surface(surfaces),
    }
}

/// Primary surface when the model is available there, else secondary.
fn pick_surface(surfaces: &BTreeSet<ApiSurface>) -> ApiSurface {
    if surfaces.contains(&ApiSurface::V1Beta) {
        ApiSurface::V1Beta
    } else {
        ApiSurface::V1
    }
}
