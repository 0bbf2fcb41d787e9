//! Error types for catalog loading and validation

use std::path::PathBuf;

/// Errors building or validating a [`Catalog`](crate::Catalog)
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// IO error reading a catalog file
    #[error("io error reading {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Malformed YAML document
    #[error("invalid catalog yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Base sequence has no entries
    #[error("base sequence is empty")]
    EmptyBase,

    /// No route-selection question, or more than one
    #[error("expected exactly one route selector, found {0}")]
    RouteSelectorCount(usize),

    /// Route selector lives outside the base sequence
    #[error("route selector '{0}' must be in the base sequence")]
    RouteSelectorOutsideBase(String),

    /// Two entries in one flow share a key or id
    #[error("duplicate key '{key}' in {route} flow")]
    DuplicateKey {
        /// Repeated key or closing id
        key: String,
        /// Flow in which it repeats
        route: String,
    },

    /// Visibility condition points at a key that is not asked earlier
    #[error("question '{key}' depends on unknown or later key '{depends_on}'")]
    UnknownVisibilityKey {
        /// Conditional question
        key: String,
        /// Controlling key it refers to
        depends_on: String,
    },

    /// Checkpoint key is not a base-sequence question
    #[error("checkpoint key '{0}' is not asked in the base sequence")]
    UnknownCheckpoint(String),

    /// Closing statement in the base, or followed by a prompted question
    #[error("closing statement '{id}' in {sequence} sequence must be in its trailing run")]
    MisplacedClosing {
        /// Id of the closing statement
        id: String,
        /// Sequence it appears in
        sequence: String,
    },

    /// Route sequence does not end with a closing statement
    #[error("{0} sequence must end with a closing statement")]
    MissingClosing(String),
}

impl CatalogError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
