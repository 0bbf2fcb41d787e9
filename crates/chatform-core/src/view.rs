//! Read-only projection rendered by the presentation layer

use crate::answers::{AnswerStore, HistoryEntry};
use crate::error::SubmitError;
use crate::state::{FormState, MessageId, SessionGeneration};
use chatform_catalog::{ChoiceOption, InputKind, PromptedQuestion, Route};
use serde::Serialize;

/// The question currently awaiting input, with placeholders filled in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveQuestion {
    /// Answer key
    pub key: String,
    /// Narrative shown before the prompt
    pub statement: Option<String>,
    /// Question text
    pub prompt: String,
    /// Input hint
    pub input_kind: InputKind,
    /// Choices; empty for free text
    pub options: Vec<ChoiceOption>,
}

impl ActiveQuestion {
    pub(crate) fn project(question: &PromptedQuestion, store: &AnswerStore) -> Self {
        Self {
            key: question.key.clone(),
            statement: question.statement.as_deref().map(|s| store.format(s)),
            prompt: store.format(&question.prompt),
            input_kind: question.input_kind,
            options: question.options.clone(),
        }
    }
}

/// One formatted transcript line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    /// Stable identifier within the session
    pub id: MessageId,
    /// Narrative (the whole text for closing statements)
    pub statement: Option<String>,
    /// Prompt, `None` for closing statements
    pub prompt: Option<String>,
    /// Displayed answer, empty for closing statements
    pub answer: String,
    /// Not yet animated by the presentation layer
    pub is_new: bool,
}

impl TranscriptEntry {
    fn project(id: MessageId, entry: &HistoryEntry, state: &FormState) -> Self {
        let store = state.store();
        Self {
            id,
            statement: entry.question.statement().map(|s| store.format(s)),
            prompt: entry.question.prompt().map(|p| store.format(p)),
            answer: entry.displayed_answer.clone(),
            is_new: !state.is_rendered(id),
        }
    }
}

/// Everything the presentation layer needs for one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    /// Prompt awaiting input, `None` while a closing chain runs or when done
    pub active_question: Option<ActiveQuestion>,
    /// Formatted transcript
    pub history: Vec<TranscriptEntry>,
    /// No further question to ask
    pub is_finished: bool,
    /// Error from the last refused submission
    pub pending_validation_error: Option<SubmitError>,
    /// Session token for remounting UI-local state
    pub session_generation: SessionGeneration,
    /// Selected route
    pub route: Route,
}

impl ViewModel {
    pub(crate) fn build(state: &FormState, active: Option<&PromptedQuestion>, is_finished: bool) -> Self {
        let store = state.store();
        Self {
            active_question: active.map(|q| ActiveQuestion::project(q, store)),
            history: store
                .history()
                .iter()
                .enumerate()
                .map(|(id, entry)| TranscriptEntry::project(id, entry, state))
                .collect(),
            is_finished,
            pending_validation_error: state.last_error().cloned(),
            session_generation: state.session_generation(),
            route: store.route(),
        }
    }

    /// Transcript entries not yet animated
    pub fn new_entries(&self) -> impl Iterator<Item = &TranscriptEntry> {
        self.history.iter().filter(|e| e.is_new)
    }
}
