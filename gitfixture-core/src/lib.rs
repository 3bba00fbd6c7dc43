//! gitfixture core library: request types, manifest loading, errors.
//!
//! Public API surface:
//! - [`types`]: [`RepoIdentifier`] and [`SyncRequest`]
//! - [`error`]: [`ManifestError`]
//! - [`manifest`]: YAML manifest load / resolve

pub mod error;
pub mod manifest;
pub mod types;

pub use error::ManifestError;
pub use manifest::{FileSource, Manifest};
pub use types::{RepoIdentifier, SyncRequest, DEFAULT_BRANCH, DEFAULT_REMOTE};
