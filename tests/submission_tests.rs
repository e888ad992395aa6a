//! Submission intake, export and report tests
//!
//! Drives the full pipeline through the CLI against a sandboxed data directory.

mod common;

use std::fs;

use predicates::prelude::*;
use serde_json::json;

use common::{submission_fixture, Sandbox};

// ─────────────────────────────────────────────────────────────────
// Submit
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_submit_assigns_participant_id_and_persona() {
    let sandbox = Sandbox::new();
    let participant_id = sandbox.submit(&submission_fixture());

    assert!(participant_id.starts_with("TD-OMNI-"));
    assert_eq!(participant_id.len(), "TD-OMNI-".len() + 4);

    let record_path = sandbox
        .data_dir()
        .join("submissions")
        .join(format!("{}.json", participant_id));
    let record: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(record_path).unwrap()).unwrap();
    assert_eq!(record["participantId"], participant_id.as_str());
    assert_eq!(record["personaId"], "begona");
    assert_eq!(record["personaName"], "Begoña");
    assert!(record["id"].is_string());
    assert!(record["createdAt"].is_string());
}

#[test]
fn test_submit_uses_configured_prefix() {
    let sandbox = Sandbox::new();
    let path = sandbox.write_json("submission.json", &submission_fixture());

    sandbox
        .cmd()
        .env("OMNI_PARTICIPANT_PREFIX", "WS-BIO")
        .arg("submit")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("WS-BIO-"));
}

#[test]
fn test_submit_rejects_prefix_with_surrounding_whitespace() {
    let sandbox = Sandbox::new();
    let path = sandbox.write_json("submission.json", &submission_fixture());

    sandbox
        .cmd()
        .env("OMNI_PARTICIPANT_PREFIX", " WS")
        .arg("submit")
        .arg(&path)
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("Participant prefix"));
}

#[test]
fn test_submit_keeps_given_id_and_overrides_claimed_persona() {
    let sandbox = Sandbox::new();
    let mut doc = submission_fixture();
    doc["participantId"] = json!("TD-OMNI-BEEF");
    doc["personaId"] = json!("laura");
    doc["personaName"] = json!("Laura");
    doc["personaRationale"] = json!("Elegido a mano");

    assert_eq!(sandbox.submit(&doc), "TD-OMNI-BEEF");

    sandbox
        .cmd()
        .args(["submissions", "list", "--persona", "Begoña"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TD-OMNI-BEEF"));
}

#[test]
fn test_submit_reads_stdin() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["submit", "-"])
        .write_stdin(submission_fixture().to_string())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("TD-OMNI-"));
}

#[test]
fn test_submit_rejects_duplicate_participant() {
    let sandbox = Sandbox::new();
    let mut doc = submission_fixture();
    doc["participantId"] = json!("TD-OMNI-0001");
    sandbox.submit(&doc);

    let path = sandbox.write_json("again.json", &doc);
    sandbox
        .cmd()
        .arg("submit")
        .arg(&path)
        .assert()
        .failure()
        .code(40)
        .stderr(predicate::str::contains("E400"))
        .stderr(predicate::str::contains("TD-OMNI-0001"));
}

#[test]
fn test_submit_rejects_missing_consent() {
    let sandbox = Sandbox::new();
    let mut doc = submission_fixture();
    doc["consent"] = json!(false);
    let path = sandbox.write_json("no-consent.json", &doc);

    sandbox
        .cmd()
        .arg("submit")
        .arg(&path)
        .assert()
        .failure()
        .code(30)
        .stderr(predicate::str::contains("E300"))
        .stderr(predicate::str::contains("consent"));

    let stored = fs::read_dir(sandbox.data_dir().join("submissions")).unwrap();
    assert_eq!(stored.count(), 0);
}

#[test]
fn test_submit_rejects_too_many_selections() {
    let sandbox = Sandbox::new();
    let mut doc = submission_fixture();
    doc["q16_controls"] = json!([
        "Confirmar datos antes de calcular",
        "Ver criterios/fuentes",
        "Guardar y retomar"
    ]);
    let path = sandbox.write_json("greedy.json", &doc);

    sandbox
        .cmd()
        .arg("submit")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("q16_controls"));
}

#[test]
fn test_submit_rejects_malformed_json() {
    let sandbox = Sandbox::new();
    let path = sandbox.path().join("broken.json");
    fs::write(&path, "{ \"consent\": tru").unwrap();

    sandbox
        .cmd()
        .arg("submit")
        .arg(&path)
        .assert()
        .failure()
        .code(30)
        .stderr(predicate::str::contains("E301"));
}

#[test]
fn test_submit_missing_file() {
    Sandbox::new()
        .cmd()
        .args(["submit", "does-not-exist.json"])
        .assert()
        .failure()
        .code(20);
}

// ─────────────────────────────────────────────────────────────────
// Listing and Export
// ─────────────────────────────────────────────────────────────────

/// Store the fixture as Begoña plus a second respondent classified as Laura.
fn populated() -> Sandbox {
    let sandbox = Sandbox::new();

    let mut first = submission_fixture();
    first["participantId"] = json!("TD-OMNI-0001");
    sandbox.submit(&first);

    let mut second = submission_fixture();
    second["participantId"] = json!("TD-OMNI-0002");
    second["name"] = json!("Lucas \"Luki\" Pérez");
    second["taxFamiliarity"] = json!(1);
    second["consultedExpert"] = json!(false);
    second["intentionPriority"] = json!(["validate"]);
    sandbox.submit(&second);

    sandbox
}

#[test]
fn test_submissions_list_empty() {
    Sandbox::new()
        .cmd()
        .args(["submissions", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No submissions found."));
}

#[test]
fn test_submissions_list_filters_by_persona() {
    let sandbox = populated();

    sandbox
        .cmd()
        .args(["submissions", "list", "--persona", "laura"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TD-OMNI-0002"))
        .stdout(predicate::str::contains("TD-OMNI-0001").not());

    sandbox
        .cmd()
        .args(["submissions", "list", "--persona", "nobody"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E302"));
}

#[test]
fn test_export_json_to_stdout() {
    let sandbox = populated();
    let output = sandbox
        .cmd()
        .args(["export", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    // Newest first
    assert_eq!(rows[0]["participantId"], "TD-OMNI-0002");
    assert_eq!(rows[1]["participantId"], "TD-OMNI-0001");
}

#[test]
fn test_export_csv_with_persona_filter() {
    let sandbox = populated();
    let out = sandbox.path().join("exports").join("begona.csv");

    sandbox
        .cmd()
        .args(["export", "--format", "csv", "--persona", "Begoña", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 submissions"));

    let csv = fs::read_to_string(&out).unwrap();
    let lines: Vec<_> = csv.split('\n').collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("participant_id,name,email,tax_familiarity"));
    assert!(lines[0].ends_with(",q19_openText,created_at"));
    assert!(lines[1].starts_with("\"TD-OMNI-0001\",\"Carmen Iriarte\""));
    assert!(lines[1].contains("\"[\"\"optimize\"\",\"\"validate\"\"]\""));
    assert!(lines[1].contains("\"Botón \"\"hablar con experto\"\"; Historial de decisiones\""));
}

#[test]
fn test_export_csv_escapes_names() {
    let sandbox = populated();
    sandbox
        .cmd()
        .args(["export", "--format", "csv", "--persona", "Laura"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Lucas \"\"Luki\"\" Pérez\""));
}

#[test]
fn test_export_csv_empty() {
    Sandbox::new()
        .cmd()
        .args(["export", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::diff("No data\n"));
}

#[test]
fn test_export_uses_configured_defaults() {
    let sandbox = populated();
    let export_dir = sandbox.path().join("out");

    sandbox
        .cmd()
        .env("OMNI_EXPORT_FORMAT", "csv")
        .env("OMNI_EXPORT_DIR", &export_dir)
        .arg("export")
        .assert()
        .success();

    let csv = fs::read_to_string(export_dir.join("omni-survey-export.csv")).unwrap();
    assert_eq!(csv.lines().count(), 3);
}

// ─────────────────────────────────────────────────────────────────
// Report
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_report_to_stdout() {
    let sandbox = populated();
    sandbox
        .cmd()
        .args(["report", "TD-OMNI-0001"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("OMNI Pre-Survey\nTD-OMNI-0001 — Begoña"))
        .stdout(predicate::str::contains("Familiaridad con impuestos\n    4/5"))
        .stdout(predicate::str::contains("Q11 — Otro\n    Escrituras de la casa del pueblo"))
        .stdout(predicate::str::contains("Q19: Comentario abierto"));
}

#[test]
fn test_report_to_file() {
    let sandbox = populated();
    let out = sandbox.path().join("reports").join("TD-OMNI-0002.txt");

    sandbox
        .cmd()
        .args(["report", "TD-OMNI-0002", "--output"])
        .arg(&out)
        .assert()
        .success();

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("Persona asignada\n    Laura (laura)"));
    assert!(text.contains("¿Ha consultado a un gestor/experto?\n    No"));
}

#[test]
fn test_report_unknown_participant() {
    Sandbox::new()
        .cmd()
        .args(["report", "TD-OMNI-FFFF"])
        .assert()
        .failure()
        .code(40)
        .stderr(predicate::str::contains("E401"));
}
