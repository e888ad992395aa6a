//! File-backed submission store.
//!
//! One pretty-printed JSON record per participant under
//! `<data_dir>/submissions/<participant_id>.json`. All records are loaded into
//! an in-memory index on open; writes go to disk first, then to the index. A record file is never
//! replaced, so concurrent writers cannot overwrite each other.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::survey::Submission;

// ─────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────

const SUBMISSIONS_DIR: &str = "submissions";
const RECORD_EXT: &str = "json";

// ─────────────────────────────────────────────────────────────────
// Stored Submission
// ─────────────────────────────────────────────────────────────────

/// A persisted submission with its storage metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSubmission {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub submission: Submission,
}

impl StoredSubmission {
    pub fn participant_id(&self) -> &str {
        &self.submission.participant_id
    }

    pub fn persona_name(&self) -> &str {
        self.submission.persona_name.as_deref().unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────
// Submission Store
// ─────────────────────────────────────────────────────────────────

/// Submission store keyed by participant id.
pub struct SubmissionStore {
    /// Directory holding one file per record.
    dir: PathBuf,

    index: RwLock<HashMap<String, StoredSubmission>>,
}

impl SubmissionStore {
    /// Open (and create if needed) the store under `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let dir = data_dir.join(SUBMISSIONS_DIR);
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| Error::IoWrite {
                path: dir.clone(),
                source: e,
            })?;
            debug!(path = %dir.display(), "Created submissions directory");
        }

        let mut index = HashMap::new();
        let entries = fs::read_dir(&dir).map_err(|e| Error::IoRead {
            path: dir.clone(),
            source: e,
        })?;
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXT) {
                continue;
            }
            let record = load_record(&path)?;
            index.insert(record.participant_id().to_string(), record);
        }

        debug!(path = %dir.display(), records = index.len(), "Submission store opened");

        Ok(Self {
            dir,
            index: RwLock::new(index),
        })
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }

    /// Persist a validated submission. Participant ids are unique.
    pub fn insert(&self, submission: Submission) -> Result<StoredSubmission> {
        check_participant_id(&submission.participant_id)?;

        let mut index = self.index.write();
        if index.contains_key(&submission.participant_id) {
            warn!(participant_id = %submission.participant_id, "Duplicate participant rejected");
            return Err(Error::DuplicateParticipant {
                participant_id: submission.participant_id,
            });
        }

        let record = StoredSubmission {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            submission,
        };

        let path = self.record_path(record.participant_id());
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| Error::Internal(format!("Failed to encode submission: {}", e)))?;

        // Write a private temp file, then link it into place. The link fails if
        // another store handle already committed this participant.
        let tmp = self.dir.join(format!(".{}.{}.tmp", record.participant_id(), record.id));
        fs::write(&tmp, json).map_err(|e| Error::IoWrite {
            path: tmp.clone(),
            source: e,
        })?;
        let linked = fs::hard_link(&tmp, &path);
        if let Err(e) = fs::remove_file(&tmp) {
            warn!(path = %tmp.display(), error = %e, "Failed to remove temp file");
        }
        match linked {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                warn!(participant_id = %record.participant_id(), "Duplicate participant rejected");
                return Err(Error::DuplicateParticipant {
                    participant_id: record.submission.participant_id,
                });
            }
            Err(e) => {
                return Err(Error::IoWrite {
                    path: path.clone(),
                    source: e,
                })
            }
        }

        info!(
            participant_id = %record.participant_id(),
            persona = %record.persona_name(),
            "Submission stored"
        );

        index.insert(record.participant_id().to_string(), record.clone());
        Ok(record)
    }

    /// Look up a submission by participant id.
    pub fn get(&self, participant_id: &str) -> Result<StoredSubmission> {
        self.index
            .read()
            .get(participant_id)
            .cloned()
            .ok_or_else(|| Error::SubmissionNotFound {
                participant_id: participant_id.to_string(),
            })
    }

    /// All submissions, newest first, optionally restricted to one persona name.
    pub fn list(&self, persona_name: Option<&str>) -> Vec<StoredSubmission> {
        let mut records: Vec<_> = self
            .index
            .read()
            .values()
            .filter(|r| persona_name.map_or(true, |name| r.persona_name() == name))
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.participant_id().cmp(b.participant_id()))
        });
        records
    }

    fn record_path(&self, participant_id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", participant_id, RECORD_EXT))
    }
}

fn load_record(path: &Path) -> Result<StoredSubmission> {
    let content = fs::read_to_string(path).map_err(|e| Error::IoRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| Error::StoreCorrupted {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Participant ids double as file names.
fn check_participant_id(participant_id: &str) -> Result<()> {
    let ok = !participant_id.is_empty()
        && participant_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(Error::invalid_field(
            "participantId",
            "Only letters, digits, '-' and '_' are allowed",
        ))
    }
}
