//! Testing utilities for the chatform workspace
//!
//! Shared fixtures for driving a navigator or wizard through a conversation.

#![allow(missing_docs)]

use async_trait::async_trait;
use chatform_catalog::Catalog;
use chatform_core::{
    ChainOutcome, Navigator, SinkError, Submission, SubmissionSink, Transition, WizardConfig,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const NAME: &str = "Sam";
pub const EMAIL: &str = "sam@example.com";
pub const PHONE: &str = "07700 900123";

pub fn standard_catalog() -> Arc<Catalog> {
    Arc::new(Catalog::standard())
}

pub fn standard_navigator() -> Navigator {
    Navigator::new(standard_catalog())
}

/// Answers for the base sequence choosing `route`
pub fn base_answers(route: &str) -> Vec<String> {
    [NAME, route, EMAIL, PHONE].iter().map(|s| (*s).to_string()).collect()
}

/// Submit every answer in order, panicking on the first refusal
pub fn drive<S: AsRef<str>>(navigator: &mut Navigator, answers: &[S]) -> Transition {
    let mut last = Transition::Ignored;
    for answer in answers {
        let answer = answer.as_ref();
        last = navigator
            .submit(answer)
            .unwrap_or_else(|e| panic!("answer {answer:?} refused: {e}"));
    }
    last
}

/// Fire pending chain tickets until none is left; returns how many fired
pub fn complete_chain(navigator: &mut Navigator) -> usize {
    let mut fired = 0;
    while let Some(ticket) = navigator.state().pending_chain() {
        fired += 1;
        match navigator.fire_chain(ticket) {
            ChainOutcome::Stale => panic!("pending ticket {ticket:?} reported stale"),
            ChainOutcome::Completed | ChainOutcome::Rearmed(_) => {}
        }
    }
    fired
}

pub fn fast_config() -> WizardConfig {
    WizardConfig::new()
        .with_chain_delay(Duration::from_millis(10))
        .with_close_reset_delay(Duration::from_millis(10))
}

/// Sink recording every delivered submission
#[derive(Debug, Default)]
pub struct MemorySink {
    delivered: Mutex<Vec<Submission>>,
    failing: AtomicBool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent deliveries fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn delivered(&self) -> Vec<Submission> {
        self.delivered.lock().clone()
    }
}

#[async_trait]
impl SubmissionSink for MemorySink {
    async fn deliver(&self, submission: &Submission) -> Result<(), SinkError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SinkError::Delivery("memory sink set to fail".to_string()));
        }
        self.delivered.lock().push(submission.clone());
        Ok(())
    }
}
