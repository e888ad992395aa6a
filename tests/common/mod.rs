//! Common test utilities and fixtures
//!
//! This module provides shared test infrastructure: fixture paths and an
//! isolated sandbox so CLI runs never touch the real home directory.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// Environment variables that would leak host configuration into a test run.
const HOST_OVERRIDES: [&str; 8] = [
    "OMNI_CONFIG",
    "OMNI_PARTICIPANT_PREFIX",
    "OMNI_EXPORT_FORMAT",
    "OMNI_EXPORT_DIR",
    "OMNI_LOG_LEVEL",
    "OMNI_LOG_FILE",
    "OMNI_LOG_JSON",
    "RUST_LOG",
];

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Get the valid config fixture path
pub fn valid_config_fixture() -> PathBuf {
    fixture_path("valid_config.toml")
}

/// Get the invalid config fixture path
pub fn invalid_config_fixture() -> PathBuf {
    fixture_path("invalid_config.toml")
}

/// A complete form submission without participant id or persona
pub fn submission_fixture() -> serde_json::Value {
    let content = fs::read_to_string(fixture_path("submission.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

/// Isolated home, working and data directories for one test.
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    /// The omni-survey binary, confined to this sandbox
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("omni-survey").unwrap();
        for var in HOST_OVERRIDES {
            cmd.env_remove(var);
        }
        cmd.current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join(".config"))
            .env("OMNI_DATA_DIR", self.data_dir());
        cmd
    }

    /// Write a JSON document into the sandbox and return its path
    pub fn write_json(&self, name: &str, value: &serde_json::Value) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
        path
    }

    /// Submit a document and return the participant id printed on stdout
    pub fn submit(&self, value: &serde_json::Value) -> String {
        let path = self.write_json("submission.json", value);
        let output = self.cmd().arg("submit").arg(&path).output().unwrap();
        assert!(
            output.status.success(),
            "submit failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_dir_exists() {
        assert!(fixtures_dir().exists(), "Fixtures directory should exist");
    }

    #[test]
    fn test_fixture_files_exist() {
        assert!(valid_config_fixture().exists());
        assert!(invalid_config_fixture().exists());
        assert!(fixture_path("submission.json").exists());
    }
}
