//! Hand-off of completed answers to an external collaborator
//!
//! The core never performs network I/O. Once a session is finished the host
//! passes a [`Submission`] to whatever [`SubmissionSink`] it owns.

use crate::error::SinkError;
use crate::state::{FormState, SessionGeneration};
use async_trait::async_trait;
use chatform_catalog::Route;
use serde::Serialize;
use std::collections::BTreeMap;

/// One transcript line in plain form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmittedLine {
    /// Answer key, `None` for closing statements
    pub key: Option<String>,
    /// Formatted prompt or closing text
    pub text: String,
    /// Displayed answer
    pub answer: String,
}

/// Completed answers of one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    /// Session the answers belong to
    pub session_generation: SessionGeneration,
    /// Selected route
    pub route: Route,
    /// Non-empty answers
    pub answers: BTreeMap<String, String>,
    /// Transcript
    pub transcript: Vec<SubmittedLine>,
}

impl Submission {
    pub(crate) fn from_state(state: &FormState) -> Self {
        let store = state.store();
        Self {
            session_generation: state.session_generation(),
            route: store.route(),
            answers: store.filled(),
            transcript: store
                .history()
                .iter()
                .map(|entry| SubmittedLine {
                    key: entry.question.key().map(str::to_string),
                    text: entry
                        .question
                        .prompt()
                        .or_else(|| entry.question.statement())
                        .map(|t| store.format(t))
                        .unwrap_or_default(),
                    answer: entry.displayed_answer.clone(),
                })
                .collect(),
        }
    }

    /// Serialize as pretty JSON
    ///
    /// # Errors
    /// `SinkError::Serialize` if serialization fails
    pub fn to_json(&self) -> Result<String, SinkError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Destination for completed submissions
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Deliver one submission
    ///
    /// # Errors
    /// Implementation-specific [`SinkError`]
    async fn deliver(&self, submission: &Submission) -> Result<(), SinkError>;
}
