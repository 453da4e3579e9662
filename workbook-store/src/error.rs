//! Error types for workbook-store.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use workbook_core::ValidationError;

/// What a [`StoreError::NotFound`] failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Workspace,
    Group,
    Page,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Workspace => write!(f, "workspace"),
            Entity::Group => write!(f, "group"),
            Entity::Page => write!(f, "page"),
        }
    }
}

/// All errors that can arise from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A referenced id does not exist in the current snapshot.
    #[error("{entity} '{id}' not found")]
    NotFound { entity: Entity, id: String },

    /// A payload or name failed validation; nothing was committed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A reorder index lies outside the sequence.
    #[error("index {index} out of range for sequence of length {len}")]
    OutOfRange { index: usize, len: usize },

    /// The mutation was committed in memory as `version` but the durable
    /// write failed. Retry with [`crate::WorkspaceStore::flush`].
    #[error("snapshot v{version} committed but not persisted: {source}")]
    Persistence {
        version: u64,
        #[source]
        source: PersistenceError,
    },

    /// Reading a stored workspace failed.
    #[error("failed to load workspace: {0}")]
    Load(#[source] PersistenceError),
}

impl StoreError {
    pub(crate) fn not_found(entity: Entity, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Failures of a persistence backend.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document (de)serialization error.
    #[error("workspace document JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend-specific failure that has no richer type.
    #[error("persistence backend error: {0}")]
    Backend(String),
}

/// Convenience constructor for [`PersistenceError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PersistenceError {
    PersistenceError::Io {
        path: path.into(),
        source,
    }
}

/// Errors loading [`crate::config::StoreConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error with the file path and serde_yaml's line context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}
