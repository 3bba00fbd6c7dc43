//! YAML sync manifest.
//!
//! # Format
//!
//! ```yaml
//! repository: acme/widgets
//! directory: /tmp/x
//! message: update config
//! files:
//!   config.yaml: "key: value"          # inline content
//!   scripts/run.sh: { source: run.sh } # read from a local file
//! ```
//!
//! Every top-level key is optional so that command-line flags can fill in or
//! override them. A relative `source:` path is resolved against the directory
//! that holds the manifest.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ManifestError};
use crate::types::{RepoIdentifier, SyncRequest};

/// Content for one file entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileSource {
    /// Inline UTF-8 text, written verbatim.
    Inline(String),
    /// Bytes read from a local file at resolve time.
    Local { source: PathBuf },
}

/// A parsed sync manifest.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub files: BTreeMap<PathBuf, FileSource>,

    /// Directory `source:` paths are resolved against. Set by [`Manifest::load_at`].
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Manifest {
    /// Load a manifest from `path`.
    ///
    /// Returns `ManifestError::NotFound` if absent,
    /// `ManifestError::Parse` (with path + line context) if malformed YAML.
    pub fn load_at(path: &Path) -> Result<Self, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        let mut manifest = Self::from_yaml(&contents).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        manifest.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(manifest)
    }

    /// Parse manifest YAML. `base_dir` is left empty (current directory).
    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }

    /// Read every file entry into raw bytes.
    pub fn resolve_files(&self) -> Result<BTreeMap<PathBuf, Vec<u8>>, ManifestError> {
        let mut out = BTreeMap::new();
        for (path, source) in &self.files {
            let bytes = match source {
                FileSource::Inline(text) => text.clone().into_bytes(),
                FileSource::Local { source } => {
                    let local = self.base_dir.join(source);
                    std::fs::read(&local).map_err(|e| io_err(&local, e))?
                }
            };
            out.insert(path.clone(), bytes);
        }
        Ok(out)
    }

    /// Build a [`SyncRequest`]. Missing fields become empty values; the
    /// synchronizer rejects those before touching the filesystem.
    pub fn to_request(&self) -> Result<SyncRequest, ManifestError> {
        Ok(SyncRequest {
            working_directory: self.directory.clone().unwrap_or_default(),
            repository: RepoIdentifier::from(self.repository.clone().unwrap_or_default()),
            commit_message: self.message.clone().unwrap_or_default(),
            files: self.resolve_files()?,
        })
    }
}
