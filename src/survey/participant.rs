//! Participant identifiers, e.g. `TD-OMNI-3FA9`.

use uuid::Uuid;

/// Default identifier prefix.
pub const DEFAULT_PREFIX: &str = "TD-OMNI";

/// Generate a participant id: `{prefix}-` followed by 4 uppercase hex digits.
///
/// Ids are short for readability on printed cards, so collisions are
/// possible; the store rejects duplicates.
pub fn generate_participant_id(prefix: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, random[..4].to_uppercase())
}
