//! Review exports of stored submissions: JSON and CSV.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::StoredSubmission;

/// Body returned by the CSV export when there is nothing to export.
pub const EMPTY_CSV: &str = "No data";

/// Columns preceding the flattened answers.
const LEADING_COLUMNS: [&str; 11] = [
    "participant_id",
    "name",
    "email",
    "tax_familiarity",
    "ai_daily_use",
    "used_ai_for_taxes",
    "consulted_expert",
    "intention_priority",
    "persona_id",
    "persona_name",
    "persona_rationale",
];

const TRAILING_COLUMN: &str = "created_at";

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    /// Default file name used when exporting to a directory.
    pub fn file_name(&self) -> String {
        format!("omni-survey-export.{}", self.as_str())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(Error::InvalidInput(format!(
                "Unknown export format '{}' (expected json or csv)",
                other
            ))),
        }
    }
}

/// Render records in the requested format.
pub fn render(format: ExportFormat, records: &[StoredSubmission]) -> Result<String> {
    match format {
        ExportFormat::Json => to_json(records),
        ExportFormat::Csv => Ok(to_csv(records)),
    }
}

/// Pretty-printed JSON array.
pub fn to_json(records: &[StoredSubmission]) -> Result<String> {
    serde_json::to_string_pretty(records)
        .map_err(|e| Error::Internal(format!("Failed to encode export: {}", e)))
}

/// CSV with one row per record. Every data cell is quoted.
pub fn to_csv(records: &[StoredSubmission]) -> String {
    let Some(first) = records.first() else {
        return EMPTY_CSV.to_string();
    };

    let mut header: Vec<&str> = LEADING_COLUMNS.to_vec();
    header.extend(first.submission.answers.flatten().iter().map(|(key, _)| *key));
    header.push(TRAILING_COLUMN);

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(header.join(","));
    for record in records {
        let row: Vec<String> = csv_row(record).iter().map(|cell| quote(cell)).collect();
        lines.push(row.join(","));
    }
    lines.join("\n")
}

fn csv_row(record: &StoredSubmission) -> Vec<String> {
    let s = &record.submission;
    let p = &s.profiling;
    let priority: Vec<&str> = p.intention_priority.iter().map(|i| i.as_str()).collect();

    let mut row = vec![
        s.participant_id.clone(),
        s.name.clone(),
        s.email.clone(),
        p.tax_familiarity.to_string(),
        p.ai_daily_use.to_string(),
        p.used_ai_for_taxes.to_string(),
        p.consulted_expert.to_string(),
        // Compact JSON array, e.g. ["optimize","validate"]
        serde_json::to_string(&priority).unwrap_or_default(),
        s.persona_id.map(|id| id.to_string()).unwrap_or_default(),
        s.persona_name.clone().unwrap_or_default(),
        s.persona_rationale.clone().unwrap_or_default(),
    ];
    row.extend(s.answers.flatten().into_iter().map(|(_, value)| value));
    row.push(record.created_at.to_rfc3339());
    row
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}
