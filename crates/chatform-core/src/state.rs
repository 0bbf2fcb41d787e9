//! Live session state
//!
//! Mutated only through the [`Navigator`](crate::Navigator).

use crate::answers::AnswerStore;
use crate::error::SubmitError;
use chatform_catalog::{Catalog, Route};
use serde::Serialize;
use std::collections::BTreeSet;

/// Opaque token bumped on every reset
///
/// The presentation layer keys transient UI state (scroll position, focus)
/// on it; timers carry it so they cannot touch a later session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct SessionGeneration(u64);

impl SessionGeneration {
    /// Following generation
    #[inline]
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Raw value
    #[inline]
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SessionGeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}

/// Identity of one armed auto-chain timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChainTicket {
    /// Session the chain was armed in
    pub generation: SessionGeneration,
    /// Monotonic arm counter within the navigator
    pub seq: u64,
}

/// Transcript entry identifier (its position in the history)
pub type MessageId = usize;

/// The live session
#[derive(Debug, Clone, Serialize)]
pub struct FormState {
    pub(crate) store: AnswerStore,
    pub(crate) step_index: usize,
    pub(crate) session_generation: SessionGeneration,
    pub(crate) rendered: BTreeSet<MessageId>,
    pub(crate) pending_chain: Option<ChainTicket>,
    pub(crate) last_error: Option<SubmitError>,
}

impl FormState {
    /// Initial state: empty answers, route unset, cursor at 0
    #[must_use]
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            store: AnswerStore::new(catalog),
            step_index: 0,
            session_generation: SessionGeneration::default(),
            rendered: BTreeSet::new(),
            pending_chain: None,
            last_error: None,
        }
    }

    /// Answers, route and transcript
    #[inline]
    #[must_use]
    pub fn store(&self) -> &AnswerStore {
        &self.store
    }

    /// Selected route
    #[inline]
    #[must_use]
    pub fn route(&self) -> Route {
        self.store.route()
    }

    /// Cursor into the effective question list
    #[inline]
    #[must_use]
    pub fn step_index(&self) -> usize {
        self.step_index
    }

    /// Current session token
    #[inline]
    #[must_use]
    pub fn session_generation(&self) -> SessionGeneration {
        self.session_generation
    }

    /// Auto-chain waiting on its timer, if any
    #[inline]
    #[must_use]
    pub fn pending_chain(&self) -> Option<ChainTicket> {
        self.pending_chain
    }

    /// Error from the last refused submission, until the next accepted one
    #[inline]
    #[must_use]
    pub fn last_error(&self) -> Option<&SubmitError> {
        self.last_error.as_ref()
    }

    /// Whether the presentation already animated a transcript entry
    #[inline]
    #[must_use]
    pub fn is_rendered(&self, id: MessageId) -> bool {
        self.rendered.contains(&id)
    }

    /// Record that a transcript entry was animated; true the first time
    pub fn mark_rendered(&mut self, id: MessageId) -> bool {
        self.rendered.insert(id)
    }

    /// Back to the initial state under a fresh generation
    pub(crate) fn reset(&mut self) {
        self.store.reset();
        self.step_index = 0;
        self.rendered.clear();
        self.pending_chain = None;
        self.last_error = None;
        self.session_generation = self.session_generation.next();
    }
}
