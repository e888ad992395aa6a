//! Plain-text participant report.
//!
//! Layout: a cover block with identity and assigned persona, then one section
//! per survey step. Long values are word-wrapped to [`WIDTH`] columns.

use std::fmt::Write as _;

use crate::store::StoredSubmission;
use crate::survey::questions::{
    Question, OPEN_TEXT_TITLE, Q10, Q11, Q12, Q13, Q14, Q15, Q16, Q17, Q18, Q9,
};

/// Line width of the rendered report.
pub const WIDTH: usize = 78;

const TITLE: &str = "OMNI Pre-Survey";
const INDENT: &str = "    ";

/// Render the report for one stored submission.
pub fn render(record: &StoredSubmission) -> String {
    let s = &record.submission;
    let p = &s.profiling;
    let persona_name = s.persona_name.as_deref().unwrap_or_default();
    let persona_id = s.persona_id.map(|id| id.to_string()).unwrap_or_default();

    let mut out = Report::default();

    // Cover
    out.line(TITLE);
    out.line(&format!("{} — {}", s.participant_id, persona_name));
    out.rule('=');
    out.field("Participant ID", &s.participant_id);
    out.field("Nombre", &s.name);
    out.field("Email", &s.email);
    out.field("Persona asignada", &format!("{} ({})", persona_name, persona_id));
    out.field("Motivo", s.persona_rationale.as_deref().unwrap_or_default());
    out.field(
        "Fecha",
        &record.created_at.format("%d/%m/%Y %H:%M UTC").to_string(),
    );

    out.section("Paso 1 — Perfil del participante");
    out.field("Familiaridad con impuestos", &format!("{}/5", p.tax_familiarity));
    out.field("¿Usa agentes de IA a diario?", yes_no(p.ai_daily_use));
    out.field("¿Ha usado IA para temas fiscales?", yes_no(p.used_ai_for_taxes));
    out.field("¿Ha consultado a un gestor/experto?", yes_no(p.consulted_expert));
    let ranked: Vec<String> = p
        .intention_priority
        .iter()
        .enumerate()
        .map(|(idx, intention)| format!("{}. {}", idx + 1, intention.label()))
        .collect();
    out.list("Intención (orden de prioridad)", &ranked);

    let a = &s.answers;
    out.section("Paso 2 — Expectativas");
    out.multi(&Q9, &a.q9_omni_promise, a.q9_other.as_deref());
    out.multi(&Q10, &a.q10_expectations, a.q10_other.as_deref());
    out.multi(&Q11, &a.q11_data_expected, a.q11_other.as_deref());
    out.multi(&Q12, &a.q12_concerns, a.q12_other.as_deref());

    out.section("Paso 3 — Confianza y controles");
    out.field(Q13.title, &a.q13_responsibility);
    out.multi(&Q14, &a.q14_trust_signals, None);
    out.field(Q15.title, &a.q15_format);
    out.multi(&Q16, &a.q16_controls, None);
    out.field(Q17.title, &a.q17_uncertainty);
    out.field(Q18.title, &a.q18_error_handling);
    if let Some(text) = a.q19_open_text.as_deref().filter(|t| !t.trim().is_empty()) {
        out.field(OPEN_TEXT_TITLE, text);
    }

    out.finish()
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Sí"
    } else {
        "No"
    }
}

#[derive(Default)]
struct Report {
    buf: String,
}

impl Report {
    fn line(&mut self, text: &str) {
        let _ = writeln!(self.buf, "{}", text);
    }

    fn rule(&mut self, ch: char) {
        let _ = writeln!(self.buf, "{}", ch.to_string().repeat(WIDTH));
    }

    fn section(&mut self, title: &str) {
        self.buf.push('\n');
        self.line(&title.to_uppercase());
        self.rule('-');
    }

    fn field(&mut self, label: &str, value: &str) {
        self.line(label);
        for line in wrap(value, WIDTH - INDENT.len()) {
            let _ = writeln!(self.buf, "{}{}", INDENT, line);
        }
        self.buf.push('\n');
    }

    fn list(&mut self, label: &str, values: &[String]) {
        self.line(label);
        for value in values {
            let mut lines = wrap(value, WIDTH - INDENT.len() - 2).into_iter();
            if let Some(first) = lines.next() {
                let _ = writeln!(self.buf, "{}- {}", INDENT, first);
            }
            for rest in lines {
                let _ = writeln!(self.buf, "{}  {}", INDENT, rest);
            }
        }
        self.buf.push('\n');
    }

    fn multi(&mut self, question: &Question, values: &[String], other: Option<&str>) {
        self.list(question.title, values);
        if let Some(other) = other.filter(|o| !o.trim().is_empty()) {
            let prefix = question.title.split(':').next().unwrap_or(question.key);
            self.field(&format!("{} — Otro", prefix), other);
        }
    }

    fn finish(mut self) -> String {
        while self.buf.ends_with("\n\n") {
            self.buf.pop();
        }
        self.buf
    }
}

/// Greedy word wrap on whitespace. Words longer than `width` stay unbroken.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
