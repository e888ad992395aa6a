//! Persona catalog: the 19 fixed respondent archetypes.
//!
//! The catalog is compiled in and never mutated. Both the classifier and the
//! presentation layer (listings, reports, exports) look personas up by id.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ─────────────────────────────────────────────────────────────────
// Persona Id
// ─────────────────────────────────────────────────────────────────

/// Stable identifier for a catalog persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonaId {
    Laura,
    Oscar,
    Lucia,
    Ali,
    Thomas,
    Alvaro,
    Inigo,
    Irene,
    Jaime,
    Monica,
    Manu,
    Elena,
    Marivi,
    Edu,
    Aitor,
    Begona,
    Jl,
    Ana,
    /// Fallback archetype for respondents that fit no profile clearly.
    /// No rule clause scores into it.
    Otro,
}

impl PersonaId {
    /// Slug used in stored records, CLI args and exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaId::Laura => "laura",
            PersonaId::Oscar => "oscar",
            PersonaId::Lucia => "lucia",
            PersonaId::Ali => "ali",
            PersonaId::Thomas => "thomas",
            PersonaId::Alvaro => "alvaro",
            PersonaId::Inigo => "inigo",
            PersonaId::Irene => "irene",
            PersonaId::Jaime => "jaime",
            PersonaId::Monica => "monica",
            PersonaId::Manu => "manu",
            PersonaId::Elena => "elena",
            PersonaId::Marivi => "marivi",
            PersonaId::Edu => "edu",
            PersonaId::Aitor => "aitor",
            PersonaId::Begona => "begona",
            PersonaId::Jl => "jl",
            PersonaId::Ana => "ana",
            PersonaId::Otro => "otro",
        }
    }

    /// Catalog entry for this id.
    pub fn persona(&self) -> &'static Persona {
        get(*self)
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PersonaId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let slug = s.trim().to_lowercase();
        PERSONAS
            .iter()
            .find(|p| p.id.as_str() == slug)
            .map(|p| p.id)
            .ok_or(Error::UnknownPersona { id: s.to_string() })
    }
}

// ─────────────────────────────────────────────────────────────────
// Persona
// ─────────────────────────────────────────────────────────────────

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: PersonaId,
    /// Display name.
    pub name: &'static str,
    /// One-line descriptor.
    pub short_desc: &'static str,
    /// Presentation colour hint (hex).
    pub color: &'static str,
}

const fn entry(
    id: PersonaId,
    name: &'static str,
    short_desc: &'static str,
    color: &'static str,
) -> Persona {
    Persona {
        id,
        name,
        short_desc,
        color,
    }
}

/// Catalog order is also the order of `PersonaId` variants; `get` relies on it.
static PERSONAS: [Persona; 19] = [
    entry(PersonaId::Laura, "Laura", "Joven, 1ª renta", "#22c55e"),
    entry(PersonaId::Oscar, "Oscar", "Senior, cuenta ajena", "#22c55e"),
    entry(PersonaId::Lucia, "Lucía", "Jubilada", "#8b5cf6"),
    entry(PersonaId::Ali, "Alí", "Extranjero residente", "#f59e0b"),
    entry(PersonaId::Thomas, "Thomas", "Impatriado (Beckham)", "#f59e0b"),
    entry(PersonaId::Alvaro, "Álvaro", "Expatriado (7P)", "#f59e0b"),
    entry(PersonaId::Inigo, "Íñigo", "Primer hijo", "#3b82f6"),
    entry(PersonaId::Irene, "Irene", "Fam. numerosa", "#3b82f6"),
    entry(PersonaId::Jaime, "Jaime", "Conjunta", "#3b82f6"),
    entry(PersonaId::Monica, "Mónica", "Monoparental", "#3b82f6"),
    entry(PersonaId::Manu, "Manu", "Compra vivienda", "#10b981"),
    entry(PersonaId::Elena, "Elena", "Multipropietario", "#10b981"),
    entry(PersonaId::Marivi, "Mariví", "Venta vivienda", "#10b981"),
    entry(PersonaId::Edu, "Edu", "Activo digital (cripto)", "#ec4899"),
    entry(PersonaId::Aitor, "Aitor", "Curioso digital", "#ec4899"),
    entry(PersonaId::Begona, "Begoña", "Moderado tradicional", "#ec4899"),
    entry(PersonaId::Jl, "JL", "Freelancer digital", "#6366f1"),
    entry(PersonaId::Ana, "Ana", "Pequeño empresario", "#6366f1"),
    entry(PersonaId::Otro, "Otro", "No encaja claramente", "#9ca3af"),
];

/// All personas in catalog order.
pub fn all() -> &'static [Persona] {
    &PERSONAS
}

/// Look up a persona by id.
pub fn get(id: PersonaId) -> &'static Persona {
    &PERSONAS[id as usize]
}

/// Look up a persona by slug (case-insensitive).
pub fn find(slug: &str) -> Option<&'static Persona> {
    slug.parse::<PersonaId>().ok().map(get)
}

/// Look up a persona by display name (case-insensitive).
pub fn find_by_name(name: &str) -> Option<&'static Persona> {
    let wanted = name.trim().to_lowercase();
    PERSONAS.iter().find(|p| p.name.to_lowercase() == wanted)
}
