//! Rule-based persona classifier.
//!
//! Each clause in [`RULES`] is an independent heuristic for one persona with a
//! fixed score and rationale. Every matching clause emits a suggestion; if
//! none match, the first applicable entry of [`FALLBACKS`] is used instead.
//! Suggestions are then deduplicated per persona (highest score wins) and
//! ranked by `(score desc, sequence asc)`, where `sequence` is the clause's
//! position in evaluation order.
//!
//! Classification is total: it never fails and never yields `Otro`.

use tracing::debug;

use super::catalog::PersonaId;
use super::types::Intention::{Optimize, Urgency, Validate};
use super::types::{Intention, PersonaResult, ProfilingInput, Suggestion};

// ─────────────────────────────────────────────────────────────────
// Derived Signals
// ─────────────────────────────────────────────────────────────────

/// Predicates derived once per classification.
#[derive(Debug, Clone, Copy)]
struct Signals {
    familiarity: i32,
    primary: Intention,
    digital: bool,
    ai_tax_user: bool,
    consulted_expert: bool,
    low_tax: bool,
    med_tax: bool,
    /// Overlaps with `very_high_tax` at familiarity 5.
    high_tax: bool,
    very_high_tax: bool,
}

impl Signals {
    fn derive(input: &ProfilingInput) -> Self {
        let f = input.tax_familiarity;
        Self {
            familiarity: f,
            primary: input
                .intention_priority
                .first()
                .copied()
                .unwrap_or(Intention::Validate),
            digital: input.ai_daily_use,
            ai_tax_user: input.used_ai_for_taxes,
            consulted_expert: input.consulted_expert,
            low_tax: (1..=2).contains(&f),
            med_tax: f == 3,
            high_tax: (4..=5).contains(&f),
            very_high_tax: f == 5,
        }
    }

    fn wants(&self, intention: Intention) -> bool {
        self.primary == intention
    }
}

// ─────────────────────────────────────────────────────────────────
// Rule Table
// ─────────────────────────────────────────────────────────────────

/// One scoring heuristic.
struct RuleClause {
    persona: PersonaId,
    score: u32,
    reason: &'static str,
    matches: fn(&Signals) -> bool,
}

const fn clause(
    persona: PersonaId,
    score: u32,
    reason: &'static str,
    matches: fn(&Signals) -> bool,
) -> RuleClause {
    RuleClause {
        persona,
        score,
        reason,
        matches,
    }
}

/// Evaluation order is load-bearing: it breaks score ties.
static RULES: &[RuleClause] = &[
    // Laura: joven, primera renta
    clause(
        PersonaId::Laura,
        90,
        "Poca experiencia fiscal y no usa herramientas digitales — perfil de primera declaración",
        |s| s.low_tax && !s.consulted_expert && !s.ai_tax_user && !s.digital,
    ),
    clause(
        PersonaId::Laura,
        80,
        "Familiaridad fiscal muy baja, sin asesor — probablemente primeras rentas",
        |s| s.familiarity == 1 && !s.consulted_expert,
    ),
    // Oscar: senior por cuenta ajena
    clause(
        PersonaId::Oscar,
        85,
        "Alta familiaridad fiscal, autosuficiente, busca validar — perfil senior experimentado",
        |s| s.high_tax && !s.digital && !s.consulted_expert && s.wants(Validate),
    ),
    clause(
        PersonaId::Oscar,
        70,
        "Conocimiento fiscal alto, perfil no-digital que busca validación",
        |s| s.high_tax && !s.digital && s.wants(Validate),
    ),
    // Lucía: jubilada
    clause(
        PersonaId::Lucia,
        75,
        "Familiaridad media, depende de expertos, no digital — perfil tradicional con experiencia",
        |s| s.med_tax && s.consulted_expert && !s.digital && s.wants(Validate),
    ),
    // Alí: extranjero residente
    clause(
        PersonaId::Ali,
        75,
        "Muy poca familiaridad fiscal pero digital, con urgencia — posible caso de extranjero residente",
        |s| s.familiarity == 1 && s.digital && s.wants(Urgency),
    ),
    // Thomas: impatriado
    clause(
        PersonaId::Thomas,
        70,
        "Baja familiaridad + digital + experto + optimizar — posible caso especial (impatriado)",
        |s| s.low_tax && s.digital && s.consulted_expert && s.wants(Optimize),
    ),
    // Álvaro: expatriado
    clause(
        PersonaId::Alvaro,
        70,
        "Baja familiaridad + digital + experto + urgencia — posible caso expatriado",
        |s| s.low_tax && s.digital && s.consulted_expert && s.wants(Urgency),
    ),
    // Íñigo: primer hijo
    clause(
        PersonaId::Inigo,
        75,
        "Familiaridad media, autogestión, busca validar — perfil de transición vital (nuevo hijo, nueva compra)",
        |s| s.med_tax && !s.consulted_expert && !s.digital && s.wants(Validate),
    ),
    // Irene: familia numerosa
    clause(
        PersonaId::Irene,
        72,
        "Caso medio-complejo, usa experto, busca optimizar — perfil familiar con complejidad",
        |s| s.med_tax && s.consulted_expert && s.wants(Optimize),
    ),
    // Jaime: declaración conjunta
    clause(
        PersonaId::Jaime,
        73,
        "Familiaridad media, confía en expertos, busca validar — perfil de declaración conjunta",
        |s| s.med_tax && !s.digital && s.consulted_expert && s.wants(Validate),
    ),
    // Mónica: monoparental
    clause(
        PersonaId::Monica,
        80,
        "Baja familiaridad, no digital, urgencia — perfil vulnerable que necesita orientación rápida",
        |s| s.low_tax && !s.digital && s.wants(Urgency),
    ),
    clause(
        PersonaId::Monica,
        75,
        "Poca familiaridad fiscal con urgencia y sin asesor — necesita guía directa",
        |s| s.low_tax && s.wants(Urgency) && !s.consulted_expert,
    ),
    // Manu: compra vivienda
    clause(
        PersonaId::Manu,
        78,
        "Digital pero novato fiscal, busca seguridad y validación — perfil de primera gestión importante",
        |s| s.low_tax && s.digital && !s.consulted_expert && s.wants(Validate),
    ),
    // Elena: multipropietario
    clause(
        PersonaId::Elena,
        85,
        "Máxima familiaridad + experto + optimizar — perfil complejo con múltiples activos",
        |s| s.very_high_tax && s.consulted_expert && s.wants(Optimize),
    ),
    // Mariví: venta vivienda
    clause(
        PersonaId::Marivi,
        72,
        "Alta familiaridad con experto y necesidad de validar — perfil de operación puntual importante",
        |s| s.high_tax && s.consulted_expert && s.wants(Validate),
    ),
    // Edu: activo digital
    clause(
        PersonaId::Edu,
        88,
        "Digital activo, ya usa IA fiscal, busca optimizar — perfil inversor digital",
        |s| s.med_tax && s.digital && s.ai_tax_user && s.wants(Optimize),
    ),
    clause(
        PersonaId::Edu,
        85,
        "Perfil altamente digital con experiencia fiscal y IA — inversor activo",
        |s| s.high_tax && s.digital && s.ai_tax_user && s.wants(Optimize),
    ),
    // Aitor: curioso digital
    clause(
        PersonaId::Aitor,
        82,
        "Digital, ya probó IA fiscal, busca validar — curioso digital explorando opciones",
        |s| s.med_tax && s.digital && s.ai_tax_user && s.wants(Validate),
    ),
    clause(
        PersonaId::Aitor,
        70,
        "Poco conocimiento fiscal pero ya probó IA — curioso digital",
        |s| s.low_tax && s.digital && s.ai_tax_user,
    ),
    // Begoña: moderado tradicional
    clause(
        PersonaId::Begona,
        80,
        "Alto conocimiento, usa experto, no digital — perfil tradicional que busca optimizar",
        |s| s.high_tax && !s.digital && s.consulted_expert && s.wants(Optimize),
    ),
    clause(
        PersonaId::Begona,
        68,
        "Experto tradicional con buen conocimiento fiscal",
        |s| s.high_tax && !s.digital && s.consulted_expert,
    ),
    // JL: freelancer digital
    clause(
        PersonaId::Jl,
        82,
        "Digital, autónomo en lo fiscal, necesita ayuda rápida — perfil freelancer",
        |s| s.med_tax && s.digital && !s.consulted_expert && s.wants(Urgency),
    ),
    clause(
        PersonaId::Jl,
        76,
        "Digital pero poco experto en impuestos, con urgencia — necesita resolución rápida",
        |s| s.low_tax && s.digital && !s.consulted_expert && s.wants(Urgency),
    ),
    // Ana: pequeño empresario
    clause(
        PersonaId::Ana,
        82,
        "Alto conocimiento + digital + experto + optimizar — perfil empresarial",
        |s| s.high_tax && s.digital && s.wants(Optimize) && s.consulted_expert,
    ),
    clause(
        PersonaId::Ana,
        78,
        "Máxima familiaridad fiscal y digital, busca optimizar — perfil empresarial avanzado",
        |s| s.very_high_tax && s.digital && s.wants(Optimize),
    ),
];

/// Applied top to bottom, first match only, when no rule fires.
/// The last entry always matches.
static FALLBACKS: &[RuleClause] = &[
    clause(
        PersonaId::Edu,
        50,
        "Perfil digital orientado a optimización",
        |s| s.digital && s.wants(Optimize),
    ),
    clause(
        PersonaId::Jl,
        50,
        "Perfil digital con necesidad de respuesta rápida",
        |s| s.digital && s.wants(Urgency),
    ),
    clause(
        PersonaId::Aitor,
        50,
        "Perfil digital — curioso y explorador",
        |s| s.digital,
    ),
    clause(
        PersonaId::Begona,
        50,
        "Confía en asesores — perfil tradicional",
        |s| s.consulted_expert,
    ),
    clause(PersonaId::Oscar, 40, "Perfil estándar — caso base", |_| true),
];

impl RuleClause {
    fn suggest(&self, sequence: usize) -> Suggestion {
        Suggestion {
            persona_id: self.persona,
            persona_name: self.persona.persona().name,
            score: self.score,
            reason: self.reason,
            sequence,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Classification
// ─────────────────────────────────────────────────────────────────

/// Rank every candidate persona for `input`, best first.
///
/// One entry per persona; never empty.
pub fn rank(input: &ProfilingInput) -> Vec<Suggestion> {
    let signals = Signals::derive(input);

    let mut suggestions: Vec<Suggestion> = RULES
        .iter()
        .enumerate()
        .filter(|(_, rule)| (rule.matches)(&signals))
        .map(|(seq, rule)| rule.suggest(seq))
        .collect();

    if suggestions.is_empty() {
        let fallback = FALLBACKS
            .iter()
            .enumerate()
            .find(|(_, rule)| (rule.matches)(&signals));
        if let Some((offset, rule)) = fallback {
            suggestions.push(rule.suggest(RULES.len() + offset));
        }
    }

    let mut ranked = dedup_keep_max(suggestions);
    ranked.sort_by(|a, b| b.score.cmp(&a.score).then(a.sequence.cmp(&b.sequence)));
    ranked
}

/// Classify a respondent into exactly one persona.
pub fn classify(input: &ProfilingInput) -> PersonaResult {
    let ranked = rank(input);
    let result = match ranked.first() {
        Some(top) => PersonaResult::from(top),
        // Unreachable: the last fallback always matches.
        None => PersonaResult::from(&FALLBACKS[FALLBACKS.len() - 1].suggest(RULES.len())),
    };

    debug!(
        persona = %result.persona_id,
        score = ranked.first().map(|s| s.score).unwrap_or_default(),
        candidates = ranked.len(),
        "Respondent classified"
    );

    result
}

/// Keep one suggestion per persona: the highest score, first seen on equal
/// scores. Later lower-scoring duplicates are discarded, not merged.
fn dedup_keep_max(suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
    let mut best: Vec<Suggestion> = Vec::with_capacity(suggestions.len());
    for s in suggestions {
        match best.iter_mut().find(|b| b.persona_id == s.persona_id) {
            Some(existing) if s.score > existing.score => *existing = s,
            Some(_) => {}
            None => best.push(s),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::catalog;

    fn input(
        familiarity: i32,
        digital: bool,
        ai_taxes: bool,
        expert: bool,
        priority: &[Intention],
    ) -> ProfilingInput {
        ProfilingInput {
            tax_familiarity: familiarity,
            ai_daily_use: digital,
            used_ai_for_taxes: ai_taxes,
            consulted_expert: expert,
            intention_priority: priority.to_vec(),
        }
    }

    /// All non-empty ordered selections of distinct intentions (15 total).
    fn all_priorities() -> Vec<Vec<Intention>> {
        let mut out = Vec::new();
        for &a in Intention::all() {
            out.push(vec![a]);
            for &b in Intention::all().iter().filter(|&&b| b != a) {
                out.push(vec![a, b]);
                for &c in Intention::all().iter().filter(|&&c| c != a && c != b) {
                    out.push(vec![a, b, c]);
                }
            }
        }
        out
    }

    #[test]
    fn test_rule_table_never_names_fallback_persona() {
        assert!(RULES.iter().all(|r| r.persona != PersonaId::Otro));
        assert!(FALLBACKS.iter().all(|r| r.persona != PersonaId::Otro));
    }

    #[test]
    fn test_laura_scenario() {
        let result = classify(&input(1, false, false, false, &[Validate]));
        assert_eq!(result.persona_id, PersonaId::Laura);
        assert_eq!(result.persona_name, "Laura");
        assert!(result.rationale.starts_with("Poca experiencia fiscal"));
    }

    #[test]
    fn test_elena_scenario() {
        let ranked = rank(&input(5, false, false, true, &[Optimize]));
        assert_eq!(ranked[0].persona_id, PersonaId::Elena);
        assert_eq!(ranked[0].score, 85);
        // Begoña fires twice (80 and 68) but only one entry survives.
        let begona: Vec<_> = ranked
            .iter()
            .filter(|s| s.persona_id == PersonaId::Begona)
            .collect();
        assert_eq!(begona.len(), 1);
        assert_eq!(begona[0].score, 80);
    }

    #[test]
    fn test_self_managed_medium_validator_is_inigo() {
        let ranked = rank(&input(3, false, false, false, &[Validate]));
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].persona_id, PersonaId::Inigo);
        assert_eq!(ranked[0].score, 75);
    }

    #[test]
    fn test_fallback_to_oscar_base_case() {
        let ranked = rank(&input(3, false, false, false, &[Optimize]));
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].persona_id, PersonaId::Oscar);
        assert_eq!(ranked[0].score, 40);
        assert_eq!(ranked[0].reason, "Perfil estándar — caso base");
    }

    #[test]
    fn test_empty_priority_defaults_to_validate() {
        let empty = input(3, false, false, false, &[]);
        let explicit = input(3, false, false, false, &[Validate]);
        assert_eq!(classify(&empty), classify(&explicit));

        // With no rule matching under the validate default, the base case applies.
        let result = classify(&input(2, false, true, false, &[]));
        assert_eq!(result.persona_id, PersonaId::Oscar);
        assert_eq!(result.rationale, "Perfil estándar — caso base");
    }

    #[test]
    fn test_fallback_chain_order() {
        let cases = [
            (input(4, true, false, false, &[Optimize]), PersonaId::Edu),
            (input(4, true, false, false, &[Urgency]), PersonaId::Jl),
            (input(3, true, false, false, &[Validate]), PersonaId::Aitor),
            (input(3, false, false, true, &[Urgency]), PersonaId::Begona),
            (input(4, false, false, false, &[Urgency]), PersonaId::Oscar),
        ];
        for (case, expected) in cases {
            let ranked = rank(&case);
            assert_eq!(ranked.len(), 1, "fallback should be the only candidate");
            assert_eq!(ranked[0].persona_id, expected, "input {:?}", case);
            assert!(ranked[0].sequence >= RULES.len());
        }
    }

    #[test]
    fn test_dedup_keeps_highest_scoring_reason() {
        // Both Begoña clauses fire; the 80-point rationale must win.
        let result = classify(&input(4, false, false, true, &[Optimize]));
        assert_eq!(result.persona_id, PersonaId::Begona);
        assert_eq!(
            result.rationale,
            "Alto conocimiento, usa experto, no digital — perfil tradicional que busca optimizar"
        );

        // Both Laura clauses fire at familiarity 1; 90 dominates 80.
        let ranked = rank(&input(1, false, false, false, &[Urgency]));
        let laura = ranked
            .iter()
            .find(|s| s.persona_id == PersonaId::Laura)
            .unwrap();
        assert_eq!(laura.score, 90);
    }

    #[test]
    fn test_edu_medium_clause_outscores_high_clause() {
        let result = classify(&input(3, true, true, false, &[Optimize]));
        assert_eq!(result.persona_id, PersonaId::Edu);
        assert!(result.rationale.starts_with("Digital activo"));

        let result = classify(&input(4, true, true, false, &[Optimize]));
        assert_eq!(result.persona_id, PersonaId::Edu);
        assert!(result.rationale.starts_with("Perfil altamente digital"));
    }

    #[test]
    fn test_tie_broken_by_rule_order() {
        // Elena (85) and Edu (85) both fire; Elena's clause comes first.
        let case = input(5, true, true, true, &[Optimize]);
        for _ in 0..10 {
            let ranked = rank(&case);
            assert_eq!(ranked[0].persona_id, PersonaId::Elena);
            assert_eq!(ranked[1].persona_id, PersonaId::Edu);
            assert_eq!(ranked[0].score, ranked[1].score);
            assert_eq!(ranked[2].persona_id, PersonaId::Ana);
        }
    }

    #[test]
    fn test_only_primary_intention_matters() {
        let a = classify(&input(3, true, false, false, &[Urgency, Optimize]));
        let b = classify(&input(3, true, false, false, &[Urgency, Validate, Optimize]));
        assert_eq!(a, b);
        assert_eq!(a.persona_id, PersonaId::Jl);
    }

    #[test]
    fn test_out_of_range_familiarity_matches_no_tier() {
        for familiarity in [0, 6, -1, i32::MIN, i32::MAX] {
            let result = classify(&input(familiarity, false, false, false, &[Validate]));
            assert_eq!(result.persona_id, PersonaId::Oscar);
            assert_eq!(result.rationale, "Perfil estándar — caso base");
        }
    }

    #[test]
    fn test_totality_over_valid_inputs() {
        let mut count = 0;
        for familiarity in 1..=5 {
            for bits in 0..8u8 {
                for priority in all_priorities() {
                    let case = input(
                        familiarity,
                        bits & 1 != 0,
                        bits & 2 != 0,
                        bits & 4 != 0,
                        &priority,
                    );
                    let result = classify(&case);
                    let persona = catalog::get(result.persona_id);
                    assert_ne!(persona.id, PersonaId::Otro);
                    assert_eq!(persona.name, result.persona_name);
                    assert!(!result.rationale.is_empty());
                    assert_eq!(classify(&case), result);
                    count += 1;
                }
            }
        }
        assert_eq!(count, 600);
    }

    #[test]
    fn test_ranking_is_sorted_and_unique() {
        for familiarity in 1..=5 {
            for bits in 0..8u8 {
                for priority in all_priorities() {
                    let ranked = rank(&input(
                        familiarity,
                        bits & 1 != 0,
                        bits & 2 != 0,
                        bits & 4 != 0,
                        &priority,
                    ));
                    for pair in ranked.windows(2) {
                        assert!(
                            pair[0].score > pair[1].score
                                || (pair[0].score == pair[1].score
                                    && pair[0].sequence < pair[1].sequence)
                        );
                        assert_ne!(pair[0].persona_id, pair[1].persona_id);
                    }
                }
            }
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_intention() -> impl Strategy<Value = Intention> {
            prop_oneof![Just(Optimize), Just(Validate), Just(Urgency)]
        }

        proptest! {
            /// Any familiarity value, including out-of-range ones, yields a
            /// catalog persona other than the fallback archetype.
            #[test]
            fn classification_is_total(
                familiarity in any::<i32>(),
                digital in any::<bool>(),
                ai_taxes in any::<bool>(),
                expert in any::<bool>(),
                priority in prop::collection::vec(arb_intention(), 0..4),
            ) {
                let case = input(familiarity, digital, ai_taxes, expert, &priority);
                let result = classify(&case);
                prop_assert_ne!(result.persona_id, PersonaId::Otro);
                prop_assert_eq!(catalog::get(result.persona_id).name, result.persona_name.as_str());
                prop_assert!(!result.rationale.is_empty());
            }

            /// Intentions after the first never change the outcome.
            #[test]
            fn only_primary_intention_counts(
                familiarity in 1..=5i32,
                digital in any::<bool>(),
                ai_taxes in any::<bool>(),
                expert in any::<bool>(),
                primary in arb_intention(),
                rest in prop::collection::vec(arb_intention(), 0..3),
            ) {
                let mut priority = vec![primary];
                let short = classify(&input(familiarity, digital, ai_taxes, expert, &priority));
                priority.extend(rest);
                let long = classify(&input(familiarity, digital, ai_taxes, expert, &priority));
                prop_assert_eq!(short, long);
            }
        }
    }
}
