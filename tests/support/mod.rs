//! Test support utilities for gh-secrets integration tests.
//!
//! Provides an isolated working directory per test plus helpers for
//! standing up a fake GitHub API with wiremock.

#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::path::PathBuf;

use gh_secrets::core::constants::{DECLARATIONS_FILE, STATE_FILE};
use gh_secrets::core::state::StateFile;
use tempfile::TempDir;

/// Test environment with an isolated working directory.
///
/// Child processes use `.current_dir()`, so tests can run in parallel.
pub struct Test {
    pub dir: TempDir,
}

impl Test {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        Self { dir }
    }

    /// Create a test environment with a declarations file.
    pub fn with_declarations(contents: &str) -> Self {
        let t = Self::new();
        t.write_declarations(contents);
        t
    }

    pub fn write_declarations(&self, contents: &str) {
        std::fs::write(self.declarations_path(), contents).expect("failed to write declarations");
    }

    pub fn declarations_path(&self) -> PathBuf {
        self.dir.path().join(DECLARATIONS_FILE)
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.path().join(STATE_FILE)
    }

    /// Load the state file the binary wrote.
    pub fn state(&self) -> StateFile {
        StateFile::load(&self.state_path()).expect("failed to load state")
    }

    pub fn save_state(&self, state: &StateFile) {
        state.save(&self.state_path()).expect("failed to save state");
    }
}
