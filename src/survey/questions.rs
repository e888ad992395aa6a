//! Question catalog for survey steps 2 (expectations) and 3 (trust).
//!
//! Each question carries its report title, the closed option list and how many
//! options a respondent may pick. Single-choice questions have
//! `max_selections == 1`.

/// A closed-choice survey question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    /// Field name in the submission document.
    pub key: &'static str,
    /// Title used in reports.
    pub title: &'static str,
    pub options: &'static [&'static str],
    pub max_selections: usize,
    /// Whether a free-text "other" answer may accompany the selection.
    pub allows_other: bool,
}

impl Question {
    pub fn is_single_choice(&self) -> bool {
        self.max_selections == 1
    }

    pub fn has_option(&self, value: &str) -> bool {
        self.options.contains(&value)
    }
}

/// Maximum length of an "other" free-text answer, in characters.
pub const OTHER_MAX_CHARS: usize = 140;

/// Maximum length of the closing open comment, in characters.
pub const OPEN_TEXT_MAX_CHARS: usize = 300;

/// Title for the closing open comment (Q19).
pub const OPEN_TEXT_TITLE: &str = "Q19: Comentario abierto";

pub const Q9: Question = Question {
    key: "q9_omniPromise",
    title: "Q9: ¿Qué crees que es OMNI y qué te promete?",
    options: &[
        "Un asesor fiscal que me guía para tomar decisiones y optimizar",
        "Respuestas adaptadas a mi caso (no genéricas)",
        "Conocimiento fiscal actualizado en lenguaje sencillo",
        "Recuerda mi contexto y me ayuda con dudas recurrentes",
        "Me ayuda a validar si lo estoy haciendo bien (pasos, retenciones, borrador)",
        "Me ayuda a reducir riesgos y evitar errores caros",
        "Me da tranquilidad con un siguiente paso claro",
        "Sustituye al gestor en casos simples y escala a experto en complejos",
        "Me ahorra tiempo (menos investigación, más claridad)",
        "Puedo subir documentos/borrador para revisarlos",
    ],
    max_selections: 3,
    allows_other: true,
};

pub const Q10: Question = Question {
    key: "q10_expectations",
    title: "Q10: ¿Qué esperas que OMNI pueda hacer por ti?",
    options: &[
        "Simular resultado (pagar/devolver)",
        "Revisar retenciones",
        "Checklist deducciones",
        "Explicarlo en lenguaje simple",
        "Detectar riesgos/errores",
        "Pedirme los datos mínimos",
        "Preparar documentación",
        "Derivar a un experto",
        "Autónomos/IVA",
        "Inversiones/cripto",
        "Vivienda (alquiler/venta/compra)",
        "Ayudas/subvenciones",
    ],
    max_selections: 3,
    allows_other: true,
};

pub const Q11: Question = Question {
    key: "q11_dataExpected",
    title: "Q11: ¿Qué crees que te pedirá OMNI?",
    options: &[
        "Datos básicos (situación laboral, hijos, vivienda)",
        "Mi borrador de la renta",
        "Mis nóminas / retenciones",
        "Documentos de vivienda (alquiler/compra/venta)",
        "Extracto o informe de mi broker / inversiones / cripto",
        "Facturas y gastos (autónomos/actividad)",
        "Notificaciones o cartas (Hacienda/AEAT)",
        "Prefiero NO subir documentos; solo responder preguntas",
    ],
    max_selections: 3,
    allows_other: true,
};

pub const Q12: Question = Question {
    key: "q12_concerns",
    title: "Q12: ¿Qué te preocupa más?",
    options: &[
        "Que se equivoque con seguridad",
        "Que no sepa decir \"no sé\"",
        "Privacidad / datos sensibles",
        "Que me pida demasiados datos",
        "Que sea difícil de entender (jerga)",
        "Que no me dé un siguiente paso claro",
        "Que me haga perder tiempo con respuestas largas",
    ],
    max_selections: 2,
    allows_other: true,
};

pub const Q13: Question = Question {
    key: "q13_responsibility",
    title: "Q13: Nivel de responsabilidad esperado",
    options: &[
        "Solo orientación general",
        "Orientación + checklist de datos",
        "Validación con condiciones (\"si X entonces Y\")",
        "Recomendación segura + escalar a experto si hay riesgo",
    ],
    max_selections: 1,
    allows_other: false,
};

pub const Q14: Question = Question {
    key: "q14_trustSignals",
    title: "Q14: Señales de confianza",
    options: &[
        "Me pregunta lo necesario antes de afirmar",
        "Indica nivel de certeza / incertidumbre",
        "Explica el porqué con claridad",
        "Resume mi caso y confirma antes de actuar",
        "Ofrece revisar un documento/borrador",
        "Ofrece hablar con un especialista",
    ],
    max_selections: 3,
    allows_other: false,
};

pub const Q15: Question = Question {
    key: "q15_format",
    title: "Q15: Formato de respuesta preferido",
    options: &[
        "Pasos (paso a paso)",
        "Checklist (lista de verificación)",
        "Estimación (números orientativos + supuestos)",
        "Resumen + plan (2–3 ideas + siguiente paso)",
        "Enlaces y fuentes (para revisar por mi cuenta)",
    ],
    max_selections: 1,
    allows_other: false,
};

pub const Q16: Question = Question {
    key: "q16_controls",
    title: "Q16: Controles necesarios",
    options: &[
        "Confirmar datos antes de calcular",
        "Botón \"hablar con experto\"",
        "Ver criterios/fuentes",
        "Guardar y retomar",
        "Recibir un resumen por email/PDF",
        "Historial de decisiones",
    ],
    max_selections: 2,
    allows_other: false,
};

pub const Q17: Question = Question {
    key: "q17_uncertainty",
    title: "Q17: Si OMNI no está seguro...",
    options: &[
        "Pedir más datos",
        "Ofrecer 2–3 escenarios con condiciones",
        "Derivar a experto directamente",
        "Decirte que no puede ayudarte",
    ],
    max_selections: 1,
    allows_other: false,
};

pub const Q18: Question = Question {
    key: "q18_errorHandling",
    title: "Q18: Si OMNI falla...",
    options: &[
        "Reintentar automáticamente",
        "Pedirme la última frase y continuar",
        "Ofrecer caminos alternativos (simulación / experto)",
        "Avisar y dejar un resumen para retomar",
    ],
    max_selections: 1,
    allows_other: false,
};

/// Closed-choice questions in survey order.
pub fn all() -> [&'static Question; 10] {
    [&Q9, &Q10, &Q11, &Q12, &Q13, &Q14, &Q15, &Q16, &Q17, &Q18]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_option_counts() {
        assert_eq!(Q9.options.len(), 10);
        assert_eq!(Q10.options.len(), 12);
        assert_eq!(Q11.options.len(), 8);
        assert_eq!(Q12.options.len(), 7);
        assert_eq!(Q18.options.len(), 4);
    }

    #[test]
    fn test_keys_are_unique_and_ordered() {
        let keys: Vec<_> = all().iter().map(|q| q.key).collect();
        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
        assert_eq!(keys.first(), Some(&"q9_omniPromise"));
        assert_eq!(keys.last(), Some(&"q18_errorHandling"));
    }

    #[test]
    fn test_single_choice_questions() {
        let single: Vec<_> = all()
            .iter()
            .filter(|q| q.is_single_choice())
            .map(|q| q.key)
            .collect();
        assert_eq!(
            single,
            vec!["q13_responsibility", "q15_format", "q17_uncertainty", "q18_errorHandling"]
        );
    }

    #[test]
    fn test_has_option() {
        assert!(Q13.has_option("Solo orientación general"));
        assert!(!Q13.has_option("solo orientación general"));
    }
}
