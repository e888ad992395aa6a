//! Survey intake: question catalog, submission document and participant ids.

pub mod participant;
pub mod questions;
pub mod schema;

pub use participant::generate_participant_id;
pub use schema::Submission;
