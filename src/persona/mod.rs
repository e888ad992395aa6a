//! Persona system: the fixed archetype catalog and the rule-based classifier
//! that maps a respondent's profiling answers onto one of them.
//!
//! Classification is a pure function over a compiled-in rule table; it holds
//! no state and is safe to call from any thread.

pub mod catalog;
pub mod classifier;
pub mod types;

pub use catalog::PersonaId;
pub use classifier::{classify, rank};
pub use types::{Intention, PersonaResult, ProfilingInput, Suggestion};
