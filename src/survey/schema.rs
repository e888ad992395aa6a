//! Submission document and its validation rules.
//!
//! The JSON shape matches what the survey form posts: camelCase profiling
//! fields plus `qN_*` answer keys. Validation is strict here so that the
//! classifier can trust its input.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::persona::{catalog, Intention, PersonaId, PersonaResult, ProfilingInput};

use super::questions::{
    Question, OPEN_TEXT_MAX_CHARS, OTHER_MAX_CHARS, Q10, Q11, Q12, Q13, Q14, Q15, Q16, Q17,
    Q18, Q9,
};

// ─────────────────────────────────────────────────────────────────
// Submission
// ─────────────────────────────────────────────────────────────────

/// A complete survey submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Assigned on intake when missing.
    #[serde(default)]
    pub participant_id: String,

    #[serde(default)]
    pub consent: bool,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    #[serde(flatten)]
    pub profiling: ProfilingInput,

    /// Persona fields are recomputed on intake; client-provided values are advisory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_id: Option<PersonaId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_rationale: Option<String>,

    #[serde(flatten)]
    pub answers: Answers,
}

impl Submission {
    /// The classifier's view of this submission.
    pub fn profiling(&self) -> &ProfilingInput {
        &self.profiling
    }

    /// Currently assigned persona, if all three fields are set.
    pub fn persona(&self) -> Option<PersonaResult> {
        match (&self.persona_id, &self.persona_name, &self.persona_rationale) {
            (Some(id), Some(name), Some(rationale)) => Some(PersonaResult {
                persona_id: *id,
                persona_name: name.clone(),
                rationale: rationale.clone(),
            }),
            _ => None,
        }
    }

    pub fn assign_persona(&mut self, result: PersonaResult) {
        self.persona_id = Some(result.persona_id);
        self.persona_name = Some(result.persona_name);
        self.persona_rationale = Some(result.rationale);
    }

    /// Check every field; the first violation is returned.
    pub fn validate(&self) -> Result<()> {
        if self.participant_id.trim().is_empty() {
            return Err(Error::invalid_field("participantId", "Participant id is required"));
        }
        if !self.consent {
            return Err(Error::invalid_field("consent", "Consent must be given"));
        }
        if self.name.trim().chars().count() < 2 {
            return Err(Error::invalid_field("name", "Introduce tu nombre"));
        }
        if !is_valid_email(&self.email) {
            return Err(Error::invalid_field("email", "Introduce un email válido"));
        }

        validate_profiling(&self.profiling)?;

        match self.persona() {
            Some(persona) => {
                if catalog::get(persona.persona_id).name != persona.persona_name {
                    return Err(Error::invalid_field(
                        "personaName",
                        format!("Does not match persona '{}'", persona.persona_id),
                    ));
                }
                if persona.rationale.trim().is_empty() {
                    return Err(Error::invalid_field("personaRationale", "Rationale is required"));
                }
            }
            None => {
                return Err(Error::invalid_field("personaId", "Persona has not been assigned"));
            }
        }

        self.answers.validate()
    }
}

/// Range checks the classifier itself does not perform.
pub fn validate_profiling(input: &ProfilingInput) -> Result<()> {
    if !(1..=5).contains(&input.tax_familiarity) {
        return Err(Error::invalid_field(
            "taxFamiliarity",
            format!("Must be between 1 and 5, got {}", input.tax_familiarity),
        ));
    }

    let priority = &input.intention_priority;
    if priority.is_empty() {
        return Err(Error::invalid_field(
            "intentionPriority",
            "Selecciona al menos una intención",
        ));
    }
    if priority.len() > Intention::all().len() {
        return Err(Error::invalid_field(
            "intentionPriority",
            "At most 3 intentions may be ranked",
        ));
    }
    let distinct: HashSet<_> = priority.iter().collect();
    if distinct.len() != priority.len() {
        return Err(Error::invalid_field(
            "intentionPriority",
            "Intentions must not repeat",
        ));
    }

    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

// ─────────────────────────────────────────────────────────────────
// Answers
// ─────────────────────────────────────────────────────────────────

/// Answers to steps 2 and 3 of the survey.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answers {
    #[serde(rename = "q9_omniPromise", default)]
    pub q9_omni_promise: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q9_other: Option<String>,

    #[serde(rename = "q10_expectations", default)]
    pub q10_expectations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q10_other: Option<String>,

    #[serde(rename = "q11_dataExpected", default)]
    pub q11_data_expected: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q11_other: Option<String>,

    #[serde(rename = "q12_concerns", default)]
    pub q12_concerns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q12_other: Option<String>,

    #[serde(rename = "q13_responsibility", default)]
    pub q13_responsibility: String,

    #[serde(rename = "q14_trustSignals", default)]
    pub q14_trust_signals: Vec<String>,

    #[serde(rename = "q15_format", default)]
    pub q15_format: String,

    #[serde(rename = "q16_controls", default)]
    pub q16_controls: Vec<String>,

    #[serde(rename = "q17_uncertainty", default)]
    pub q17_uncertainty: String,

    #[serde(rename = "q18_errorHandling", default)]
    pub q18_error_handling: String,

    #[serde(rename = "q19_openText", default, skip_serializing_if = "Option::is_none")]
    pub q19_open_text: Option<String>,
}

/// A single answer value, before flattening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue<'a> {
    Many(&'a [String]),
    One(&'a str),
    Optional(Option<&'a str>),
}

impl AnswerValue<'_> {
    /// Multi-select values are joined with "; ", missing values become "".
    pub fn flatten(&self) -> String {
        match self {
            AnswerValue::Many(values) => values.join("; "),
            AnswerValue::One(value) => value.to_string(),
            AnswerValue::Optional(value) => value.unwrap_or_default().to_string(),
        }
    }
}

impl Answers {
    /// All answers keyed by their submission field name, in survey order.
    pub fn entries(&self) -> Vec<(&'static str, AnswerValue<'_>)> {
        vec![
            (Q9.key, AnswerValue::Many(&self.q9_omni_promise)),
            ("q9_other", AnswerValue::Optional(self.q9_other.as_deref())),
            (Q10.key, AnswerValue::Many(&self.q10_expectations)),
            ("q10_other", AnswerValue::Optional(self.q10_other.as_deref())),
            (Q11.key, AnswerValue::Many(&self.q11_data_expected)),
            ("q11_other", AnswerValue::Optional(self.q11_other.as_deref())),
            (Q12.key, AnswerValue::Many(&self.q12_concerns)),
            ("q12_other", AnswerValue::Optional(self.q12_other.as_deref())),
            (Q13.key, AnswerValue::One(&self.q13_responsibility)),
            (Q14.key, AnswerValue::Many(&self.q14_trust_signals)),
            (Q15.key, AnswerValue::One(&self.q15_format)),
            (Q16.key, AnswerValue::Many(&self.q16_controls)),
            (Q17.key, AnswerValue::One(&self.q17_uncertainty)),
            (Q18.key, AnswerValue::One(&self.q18_error_handling)),
            ("q19_openText", AnswerValue::Optional(self.q19_open_text.as_deref())),
        ]
    }

    /// Answers as (column, text) pairs for tabular exports.
    pub fn flatten(&self) -> Vec<(&'static str, String)> {
        self.entries()
            .into_iter()
            .map(|(key, value)| (key, value.flatten()))
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        check_multi(&Q9, &self.q9_omni_promise, self.q9_other.as_deref(), "q9_other")?;
        check_multi(&Q10, &self.q10_expectations, self.q10_other.as_deref(), "q10_other")?;
        check_multi(&Q11, &self.q11_data_expected, self.q11_other.as_deref(), "q11_other")?;
        check_multi(&Q12, &self.q12_concerns, self.q12_other.as_deref(), "q12_other")?;
        check_single(&Q13, &self.q13_responsibility)?;
        check_multi(&Q14, &self.q14_trust_signals, None, "")?;
        check_single(&Q15, &self.q15_format)?;
        check_multi(&Q16, &self.q16_controls, None, "")?;
        check_single(&Q17, &self.q17_uncertainty)?;
        check_single(&Q18, &self.q18_error_handling)?;
        check_text_len("q19_openText", self.q19_open_text.as_deref(), OPEN_TEXT_MAX_CHARS)
    }
}

fn check_multi(
    question: &Question,
    selected: &[String],
    other: Option<&str>,
    other_key: &str,
) -> Result<()> {
    if selected.is_empty() {
        return Err(Error::invalid_field(question.key, "Selecciona al menos una opción"));
    }
    if selected.len() > question.max_selections {
        return Err(Error::invalid_field(
            question.key,
            format!("Máximo {} opciones", question.max_selections),
        ));
    }
    check_options(question, selected.iter().map(String::as_str))?;
    if question.allows_other {
        check_text_len(other_key, other, OTHER_MAX_CHARS)?;
    }
    Ok(())
}

fn check_single(question: &Question, selected: &str) -> Result<()> {
    if selected.trim().is_empty() {
        return Err(Error::invalid_field(question.key, "Selecciona una opción"));
    }
    check_options(question, std::iter::once(selected))
}

fn check_options<'a>(question: &Question, selected: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for value in selected {
        if !question.has_option(value) {
            return Err(Error::invalid_field(
                question.key,
                format!("'{}' is not one of the offered options", value),
            ));
        }
        if !seen.insert(value) {
            return Err(Error::invalid_field(
                question.key,
                format!("'{}' selected more than once", value),
            ));
        }
    }
    Ok(())
}

fn check_text_len(key: &str, text: Option<&str>, max_chars: usize) -> Result<()> {
    match text {
        Some(t) if t.chars().count() > max_chars => Err(Error::invalid_field(
            key,
            format!("Máximo {} caracteres", max_chars),
        )),
        _ => Ok(()),
    }
}
