//! Common test utilities for ghactions integration tests
//!
//! This module provides:
//! - Access to the payload fixtures of the ghactions crate
//! - A guard that points the runner variables at a payload file
//! - Handler call counters

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempDir;

const FIXTURE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../ghactions/tests/fixtures");

/// Read a payload fixture by file name.
#[allow(dead_code)]
pub fn fixture(name: &str) -> Vec<u8> {
    let path = Path::new(FIXTURE_DIR).join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("fixture {}: {}", path.display(), e))
}

// ============================================================================
// Runner Environment
// ============================================================================

/// Runner environment for one test.
///
/// Clears every `GITHUB_*` variable on creation and again on drop, so tests
/// behave the same on a developer machine and inside a workflow run. Tests
/// using it must be `#[serial]`.
pub struct RunnerEnv {
    dir: TempDir,
}

#[allow(dead_code)]
impl RunnerEnv {
    pub fn new() -> Self {
        clear_github_vars();
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Write `payload` to the event file and point the runner variables at it.
    pub fn with_event(self, event_name: &str, payload: &[u8]) -> Self {
        let path = self.event_path();
        std::fs::write(&path, payload).unwrap();
        std::env::set_var("GITHUB_EVENT_NAME", event_name);
        std::env::set_var("GITHUB_EVENT_PATH", &path);
        self
    }

    /// Point the runner variables at an event file that does not exist.
    pub fn with_missing_event(self, event_name: &str) -> Self {
        std::env::set_var("GITHUB_EVENT_NAME", event_name);
        std::env::set_var("GITHUB_EVENT_PATH", self.dir.path().join("missing.json"));
        self
    }

    pub fn with_var(self, name: &str, value: &str) -> Self {
        std::env::set_var(name, value);
        self
    }

    pub fn event_path(&self) -> PathBuf {
        self.dir.path().join("event.json")
    }
}

impl Drop for RunnerEnv {
    fn drop(&mut self) {
        clear_github_vars();
    }
}

fn clear_github_vars() {
    let names: Vec<String> = std::env::vars()
        .map(|(name, _)| name)
        .filter(|name| name.starts_with("GITHUB_"))
        .collect();
    for name in names {
        std::env::remove_var(name);
    }
}

// ============================================================================
// Call Counting
// ============================================================================

/// Shared counter of handler invocations.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct CallCounter(Arc<AtomicUsize>);

#[allow(dead_code)]
impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
