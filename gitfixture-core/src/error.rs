//! Error types for gitfixture-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from loading a sync manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file did not exist at the given path.
    #[error("manifest not found at {path}")]
    NotFound { path: PathBuf },

    /// YAML parse error on load, with file path and line context from serde_yaml.
    #[error("failed to parse manifest at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Reading the manifest or one of its `source:` files failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ManifestError {
    ManifestError::Io {
        path: path.into(),
        source,
    }
}
