//! Error types for chatform core
//!
//! Submission errors are local and recoverable: they block a transition
//! and are reported to the caller, but never corrupt the form state and
//! never end the session.

use chatform_catalog::CatalogError;
use serde::Serialize;
use std::path::PathBuf;

/// Free-text or choice validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ValidationError {
    /// Submitted text was blank
    #[error("answer is empty")]
    Empty,

    /// Submitted value failed the question's validator or is not an option
    #[error("invalid answer for '{key}'")]
    Invalid {
        /// Key of the question that rejected the value
        key: String,
    },
}

/// Route selection failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RoutingError {
    /// The route selector produced no recognised route
    #[error("value '{value}' does not select a route")]
    UnresolvedRoute {
        /// Submitted value
        value: String,
    },
}

/// Any reason a submission was refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(untagged)]
pub enum SubmitError {
    /// Validation failed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Routing failed
    #[error(transparent)]
    Routing(#[from] RoutingError),
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("io error reading {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configured catalog failed to load
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Session host errors
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    /// Timers need a Tokio runtime
    #[error("no tokio runtime available: wizard must be created inside a runtime")]
    NoRuntime,

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Submission hand-off failed
    #[error("submission failed: {0}")]
    Sink(#[from] SinkError),
}

/// Errors raised by a [`SubmissionSink`](crate::SubmissionSink)
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Could not serialize the submission
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Destination rejected or failed to accept the submission
    #[error("delivery failed: {0}")]
    Delivery(String),
}
