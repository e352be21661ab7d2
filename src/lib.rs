//! CareGate - Safety-bounded health triage gateway.
//!
//! Answers free-text health questions through a remote generative model when
//! one is reachable, and through a deterministic rule-based triage engine when
//! it is not. The fallback path needs no network access and always produces a
//! safe answer, so the `/triage` endpoint never fails outright.

pub mod api;
pub mod classifier;
pub mod config;
pub mod discovery;
pub mod error;
pub mod fallback;
pub mod http;
pub mod inference;
pub mod orchestrator;
pub mod prioritizer;
