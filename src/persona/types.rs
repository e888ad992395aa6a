//! Core types for persona classification.
//!
//! `ProfilingInput` is the subset of survey answers the classifier looks at;
//! `PersonaResult` is what callers persist and render.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

use super::catalog::PersonaId;

// ─────────────────────────────────────────────────────────────────
// Intention
// ─────────────────────────────────────────────────────────────────

/// What the respondent mainly wants from the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intention {
    /// "Quiero optimizar"
    Optimize,
    /// "¿Lo estoy haciendo bien?"
    Validate,
    /// "Ayúdame ya"
    Urgency,
}

impl Intention {
    pub fn all() -> &'static [Intention] {
        &[Intention::Optimize, Intention::Validate, Intention::Urgency]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intention::Optimize => "optimize",
            Intention::Validate => "validate",
            Intention::Urgency => "urgency",
        }
    }

    /// Label used in participant reports.
    pub fn label(&self) -> &'static str {
        match self {
            Intention::Optimize => "Optimizar (\"Quiero optimizar\")",
            Intention::Validate => "Validar (\"¿Lo estoy haciendo bien?\")",
            Intention::Urgency => "Urgencia (\"Ayúdame ya\")",
        }
    }
}

impl fmt::Display for Intention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intention {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "optimize" => Ok(Intention::Optimize),
            "validate" => Ok(Intention::Validate),
            "urgency" => Ok(Intention::Urgency),
            _ => Err(Error::InvalidInput(format!(
                "Unknown intention '{}'. Valid: optimize, validate, urgency",
                s
            ))),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Profiling Input
// ─────────────────────────────────────────────────────────────────

/// Profiling snapshot handed to the classifier.
///
/// Ranges are the caller's responsibility: familiarity is nominally 1–5 and
/// the priority list nominally holds 1–3 distinct intentions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilingInput {
    /// Self-rated tax expertise, 1 (none) to 5 (expert).
    pub tax_familiarity: i32,
    pub ai_daily_use: bool,
    pub used_ai_for_taxes: bool,
    pub consulted_expert: bool,
    /// Intentions in priority order; the first one is primary.
    pub intention_priority: Vec<Intention>,
}

// ─────────────────────────────────────────────────────────────────
// Suggestion / Result
// ─────────────────────────────────────────────────────────────────

/// A candidate persona produced by one matching clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub persona_id: PersonaId,
    pub persona_name: &'static str,
    pub score: u32,
    pub reason: &'static str,
    /// Position of the producing clause in evaluation order. Lower wins ties.
    pub sequence: usize,
}

/// Classification outcome, stored and rendered verbatim by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaResult {
    pub persona_id: PersonaId,
    pub persona_name: String,
    pub rationale: String,
}

impl From<&Suggestion> for PersonaResult {
    fn from(s: &Suggestion) -> Self {
        Self {
            persona_id: s.persona_id,
            persona_name: s.persona_name.to_string(),
            rationale: s.reason.to_string(),
        }
    }
}
