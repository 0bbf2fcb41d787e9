//! Step navigator
//!
//! The state machine that owns the cursor into the effective question list.
//! It decides what happens after each answer: advance, jump to the route
//! sequence at the checkpoint, or land on a closing statement and arm the
//! auto-chain.
//!
//! The navigator is synchronous and knows nothing about clocks. Arming a
//! chain yields a [`ChainTicket`]; whoever owns the timer hands the ticket
//! back to [`Navigator::fire_chain`] when it elapses. A ticket that is no
//! longer the pending one (superseded, or from before a reset) is ignored.

use crate::error::{RoutingError, SubmitError, ValidationError};
use crate::resolver::{effective_questions, first_route_question, ResolvedQuestion};
use crate::state::{ChainTicket, FormState, MessageId};
use crate::submission::Submission;
use crate::view::ViewModel;
use chatform_catalog::{Catalog, PromptedQuestion, Question, Route};
use std::sync::Arc;
use tracing::{debug, info};

/// Result of an accepted (or ignored) submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing to answer at the cursor
    Ignored,
    /// Cursor moved to a prompt, or past the end
    Advanced {
        /// New cursor position
        step_index: usize,
    },
    /// Cursor landed on a closing statement; a chain timer must be started
    ChainArmed(ChainTicket),
}

/// Result of an auto-chain timer firing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOutcome {
    /// Ticket was superseded or belongs to an earlier session
    Stale,
    /// Chain finished; cursor is on a prompt or past the end
    Completed,
    /// Chain landed on yet another closing statement and re-armed
    Rearmed(ChainTicket),
}

struct Accepted {
    value: String,
    displayed: String,
    route: Option<Route>,
}

/// Conversation state machine
#[derive(Debug, Clone)]
pub struct Navigator {
    catalog: Arc<Catalog>,
    state: FormState,
    chain_seq: u64,
}

impl Navigator {
    /// Fresh session over a catalog
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let state = FormState::new(&catalog);
        Self {
            catalog,
            state,
            chain_seq: 0,
        }
    }

    /// Catalog in use
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Session state (read-only)
    #[inline]
    #[must_use]
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Effective question list for the current answers
    #[must_use]
    pub fn effective_questions(&self) -> Vec<ResolvedQuestion<'_>> {
        effective_questions(&self.catalog, &self.state.store)
    }

    /// Prompt awaiting input at the cursor
    #[must_use]
    pub fn current(&self) -> Option<&PromptedQuestion> {
        self.effective_questions()
            .get(self.state.step_index)
            .and_then(|r| r.question.as_prompted())
    }

    /// True once the cursor is past the last question and no chain is pending
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.pending_chain.is_none()
            && self.state.step_index >= self.effective_questions().len()
    }

    /// Submit an answer for the question at the cursor
    ///
    /// Choice questions accept only one of their option values. Free text is
    /// trimmed, must be non-blank and must pass the question's validator. The
    /// route selector must map to a route.
    ///
    /// # Errors
    /// - `ValidationError::Empty` for blank input
    /// - `ValidationError::Invalid` for a failed validator or unknown option
    /// - `RoutingError::UnresolvedRoute` if the route selector maps to no route
    ///
    /// A refused submission leaves answers, history and cursor untouched.
    pub fn submit(&mut self, raw: &str) -> Result<Transition, SubmitError> {
        let catalog = Arc::clone(&self.catalog);
        let before = effective_questions(&catalog, &self.state.store);

        let Some(current) = before.get(self.state.step_index).copied() else {
            debug!(step = self.state.step_index, "submit past end of flow ignored");
            return Ok(Transition::Ignored);
        };
        let Question::Prompted(question) = current.question else {
            debug!(step = self.state.step_index, "submit during closing chain ignored");
            return Ok(Transition::Ignored);
        };

        let accepted = match Self::accept(question, raw) {
            Ok(accepted) => accepted,
            Err(e) => {
                debug!(key = %question.key, error = %e, "submission rejected");
                self.state.last_error = Some(e.clone());
                return Err(e);
            }
        };

        self.state.store.set(question.key.clone(), accepted.value);
        if let Some(route) = accepted.route {
            info!(%route, "route selected");
            self.state.store.select_route(route);
        }
        self.state
            .store
            .append_history(current.question.clone(), accepted.displayed);
        self.state.last_error = None;

        let after = effective_questions(&catalog, &self.state.store);
        let next = if catalog.checkpoint_key() == Some(question.key.as_str()) {
            first_route_question(&after).unwrap_or_else(|| Self::next_after(&after, current.slot))
        } else {
            Self::next_after(&after, current.slot)
        };

        Ok(self.land(&after, next))
    }

    /// Advance a pending auto-chain
    ///
    /// If the entry after the shown closing statement is another closing
    /// statement it is shown too and the cursor moves past it; otherwise the
    /// cursor moves onto that entry (or past the end).
    pub fn fire_chain(&mut self, ticket: ChainTicket) -> ChainOutcome {
        if self.state.pending_chain != Some(ticket) {
            debug!(?ticket, pending = ?self.state.pending_chain, "stale chain timer ignored");
            return ChainOutcome::Stale;
        }
        self.state.pending_chain = None;

        let catalog = Arc::clone(&self.catalog);
        let effective = effective_questions(&catalog, &self.state.store);
        let after = self.state.step_index + 1;

        let transition = match effective.get(after) {
            Some(entry) if entry.is_terminal() => {
                self.state
                    .store
                    .append_history(entry.question.clone(), String::new());
                self.land(&effective, after + 1)
            }
            _ => self.land(&effective, after),
        };

        match transition {
            Transition::ChainArmed(next) => ChainOutcome::Rearmed(next),
            Transition::Advanced { .. } | Transition::Ignored => {
                if self.is_finished() {
                    info!(route = %self.state.route(), "conversation finished");
                }
                ChainOutcome::Completed
            }
        }
    }

    /// Back to the first question under a new session generation
    ///
    /// Any pending chain ticket becomes stale.
    pub fn reset(&mut self) {
        self.state.reset();
        info!(generation = %self.state.session_generation, "session reset");
    }

    /// Record that a transcript entry was animated; true the first time
    pub fn mark_rendered(&mut self, id: MessageId) -> bool {
        self.state.mark_rendered(id)
    }

    /// Projection for the presentation layer
    #[must_use]
    pub fn view(&self) -> ViewModel {
        ViewModel::build(&self.state, self.current(), self.is_finished())
    }

    /// Completed answers, once finished
    #[must_use]
    pub fn submission(&self) -> Option<Submission> {
        self.is_finished().then(|| Submission::from_state(&self.state))
    }

    fn accept(question: &PromptedQuestion, raw: &str) -> Result<Accepted, SubmitError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty.into());
        }
        let invalid = || ValidationError::Invalid {
            key: question.key.clone(),
        };

        let (value, displayed) = if question.is_choice() {
            let option = question.option(trimmed).ok_or_else(invalid)?;
            (option.value.clone(), option.label.clone())
        } else {
            if let Some(validator) = &question.validator {
                if !validator.check(trimmed) {
                    return Err(invalid().into());
                }
            }
            (trimmed.to_string(), trimmed.to_string())
        };

        let route = match &question.route_selector {
            Some(selector) => {
                let route = selector.route_for(&value);
                if !route.is_set() {
                    return Err(RoutingError::UnresolvedRoute { value }.into());
                }
                Some(route)
            }
            None => None,
        };

        Ok(Accepted {
            value,
            displayed,
            route,
        })
    }

    fn next_after(effective: &[ResolvedQuestion<'_>], slot: usize) -> usize {
        effective
            .iter()
            .position(|r| r.slot > slot)
            .unwrap_or(effective.len())
    }

    fn land(&mut self, effective: &[ResolvedQuestion<'_>], next: usize) -> Transition {
        self.state.step_index = next;

        match effective.get(next) {
            Some(entry) if entry.is_terminal() => {
                self.state
                    .store
                    .append_history(entry.question.clone(), String::new());
                let ticket = self.arm_chain();
                debug!(step = next, seq = ticket.seq, "closing statement shown, chain armed");
                Transition::ChainArmed(ticket)
            }
            _ => {
                debug!(step = next, "advanced");
                Transition::Advanced { step_index: next }
            }
        }
    }

    fn arm_chain(&mut self) -> ChainTicket {
        self.chain_seq += 1;
        let ticket = ChainTicket {
            generation: self.state.session_generation,
            seq: self.chain_seq,
        };
        self.state.pending_chain = Some(ticket);
        ticket
    }
}
