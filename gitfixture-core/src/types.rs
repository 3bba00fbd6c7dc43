//! Domain types for a single repository sync.
//!
//! All path fields use `PathBuf`; file contents are raw bytes and are never
//! assumed to be UTF-8.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Remote that every push targets.
pub const DEFAULT_REMOTE: &str = "origin";

/// Branch that every push targets. Not configurable.
pub const DEFAULT_BRANCH: &str = "main";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A short `owner/name` repository identifier.
///
/// The identifier always maps to a GitHub SSH address; there is no
/// configuration point for other hosts or transports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RepoIdentifier(pub String);

impl RepoIdentifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `git@github.com:<owner>/<name>.git`
    pub fn remote_url(&self) -> String {
        format!("git@github.com:{}.git", self.0)
    }
}

impl fmt::Display for RepoIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RepoIdentifier {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RepoIdentifier {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Everything needed for one clone / write / commit / push cycle.
///
/// `files` keys are paths relative to the clone directory. Iteration order is
/// sorted by path; the sync result does not depend on it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncRequest {
    pub working_directory: PathBuf,
    pub repository: RepoIdentifier,
    pub commit_message: String,
    pub files: BTreeMap<PathBuf, Vec<u8>>,
}

impl SyncRequest {
    pub fn new(
        working_directory: impl Into<PathBuf>,
        repository: impl Into<RepoIdentifier>,
        commit_message: impl Into<String>,
    ) -> Self {
        Self {
            working_directory: working_directory.into(),
            repository: repository.into(),
            commit_message: commit_message.into(),
            files: BTreeMap::new(),
        }
    }

    /// Add (or replace) one file in the request.
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }
}
