//! Session host
//!
//! Wraps a [`Navigator`] with the timers the conversation needs:
//! - the auto-chain timer that walks through closing statements
//! - the deferred session reset after the host closes the wizard
//!
//! Every timer task holds only a weak reference to the navigator and carries
//! the ticket or generation it was armed for, so a task outliving its
//! session can never mutate a later one.

use crate::config::WizardConfig;
use crate::error::{SubmitError, WizardError};
use crate::navigator::{ChainOutcome, Navigator, Transition};
use crate::scheduler::Scheduler;
use crate::state::{ChainTicket, MessageId, SessionGeneration};
use crate::submission::{Submission, SubmissionSink};
use crate::view::ViewModel;
use chatform_catalog::Catalog;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info};

/// Conversational wizard session
///
/// Must be created inside a Tokio runtime. All state changes happen under
/// one lock, so no caller can observe a half-applied submission.
#[derive(Debug)]
pub struct Wizard {
    navigator: Arc<Mutex<Navigator>>,
    config: WizardConfig,
    chain_timer: Scheduler,
    reset_timer: Scheduler,
    open: AtomicBool,
    revision: Arc<watch::Sender<u64>>,
    delivered: Mutex<Option<SessionGeneration>>,
}

impl Wizard {
    /// Create a closed wizard over `catalog`
    ///
    /// # Errors
    /// `WizardError::NoRuntime` outside a Tokio runtime
    pub fn new(catalog: Arc<Catalog>, config: WizardConfig) -> Result<Self, WizardError> {
        let runtime = Handle::try_current().map_err(|_| WizardError::NoRuntime)?;
        let (revision, _) = watch::channel(0);

        Ok(Self {
            navigator: Arc::new(Mutex::new(Navigator::new(catalog))),
            config,
            chain_timer: Scheduler::new("auto-chain", runtime.clone()),
            reset_timer: Scheduler::new("session-reset", runtime),
            open: AtomicBool::new(false),
            revision: Arc::new(revision),
            delivered: Mutex::new(None),
        })
    }

    /// Create a wizard using the configured (or built-in) catalog
    ///
    /// # Errors
    /// - `WizardError::Config` if the catalog cannot be loaded
    /// - `WizardError::NoRuntime` outside a Tokio runtime
    pub fn from_config(config: WizardConfig) -> Result<Self, WizardError> {
        let catalog = config.catalog()?;
        Self::new(Arc::new(catalog), config)
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    /// Submit an answer for the active question
    ///
    /// Starts the auto-chain timer when the answer lands on a closing
    /// statement.
    ///
    /// # Errors
    /// See [`Navigator::submit`]; a refused submission changes nothing but
    /// the pending validation error.
    pub fn submit(&self, raw: &str) -> Result<Transition, SubmitError> {
        let result = {
            let mut navigator = self.navigator.lock();
            let result = navigator.submit(raw);
            if let Ok(Transition::ChainArmed(ticket)) = result {
                self.schedule_chain(ticket);
            }
            result
        };

        if !matches!(result, Ok(Transition::Ignored)) {
            bump(&self.revision);
        }
        result
    }

    /// Start over immediately, cancelling every pending timer
    pub fn reset(&self) {
        self.reset_timer.cancel();
        {
            let mut navigator = self.navigator.lock();
            self.chain_timer.cancel();
            navigator.reset();
        }
        bump(&self.revision);
    }

    /// Host lifecycle signal
    ///
    /// Closing defers the reset by the configured delay so the host's
    /// closing transition can finish; re-opening before then cancels it.
    pub fn set_open(&self, open: bool) {
        let was_open = self.open.swap(open, Ordering::SeqCst);
        match (was_open, open) {
            (true, false) => self.schedule_reset(),
            (false, true) => {
                if self.reset_timer.cancel() {
                    debug!("re-opened before deferred reset");
                }
            }
            _ => {}
        }
    }

    /// Whether the host currently shows the wizard
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Current projection for rendering
    #[must_use]
    pub fn view(&self) -> ViewModel {
        self.navigator.lock().view()
    }

    /// Current session token
    #[must_use]
    pub fn session_generation(&self) -> SessionGeneration {
        self.navigator.lock().state().session_generation()
    }

    /// No further question to ask
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.navigator.lock().is_finished()
    }

    /// Record that a transcript entry was animated; true the first time
    pub fn mark_rendered(&self, id: MessageId) -> bool {
        self.navigator.lock().mark_rendered(id)
    }

    /// Completed answers, once finished
    #[must_use]
    pub fn submission(&self) -> Option<Submission> {
        self.navigator.lock().submission()
    }

    /// Run `f` against the navigator under the session lock
    pub fn inspect<R>(&self, f: impl FnOnce(&Navigator) -> R) -> R {
        f(&self.navigator.lock())
    }

    /// Revision counter bumped on every state change, timer-driven ones included
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Wait until no auto-chain is pending
    pub async fn settled(&self) {
        let mut changes = self.subscribe();
        loop {
            if self.navigator.lock().state().pending_chain().is_none() {
                return;
            }
            if changes.changed().await.is_err() {
                return;
            }
        }
    }

    /// Hand the finished session to `sink`, at most once per session
    ///
    /// Returns `Ok(false)` when not finished yet or already delivered.
    ///
    /// # Errors
    /// `WizardError::Sink` if delivery fails; a later call may retry
    pub async fn deliver(&self, sink: &dyn SubmissionSink) -> Result<bool, WizardError> {
        let submission = self.submission();
        let Some(submission) = submission else {
            return Ok(false);
        };

        {
            let mut delivered = self.delivered.lock();
            if *delivered == Some(submission.session_generation) {
                return Ok(false);
            }
            *delivered = Some(submission.session_generation);
        }

        if let Err(e) = sink.deliver(&submission).await {
            *self.delivered.lock() = None;
            return Err(e.into());
        }

        info!(
            generation = %submission.session_generation,
            route = %submission.route,
            answers = submission.answers.len(),
            "submission delivered"
        );
        Ok(true)
    }

    fn schedule_chain(&self, ticket: ChainTicket) {
        let weak = Arc::downgrade(&self.navigator);
        let revision = Arc::clone(&self.revision);
        let delay = self.config.chain_delay();

        self.chain_timer.arm(async move {
            let mut ticket = ticket;
            loop {
                tokio::time::sleep(delay).await;
                let Some(navigator) = weak.upgrade() else {
                    return;
                };
                let outcome = navigator.lock().fire_chain(ticket);
                drop(navigator);

                match outcome {
                    ChainOutcome::Stale => return,
                    ChainOutcome::Completed => {
                        bump(&revision);
                        return;
                    }
                    ChainOutcome::Rearmed(next) => {
                        bump(&revision);
                        ticket = next;
                    }
                }
            }
        });
    }

    fn schedule_reset(&self) {
        let weak = Arc::downgrade(&self.navigator);
        let revision = Arc::clone(&self.revision);
        let chain_timer = self.chain_timer.clone();
        let delay = self.config.close_reset_delay();
        let generation = self.session_generation();
        debug!(%generation, ?delay, "wizard closed, reset deferred");

        self.reset_timer.arm(async move {
            tokio::time::sleep(delay).await;
            let Some(navigator) = weak.upgrade() else {
                return;
            };
            let reset = {
                let mut navigator = navigator.lock();
                if navigator.state().session_generation() == generation {
                    chain_timer.cancel();
                    navigator.reset();
                    true
                } else {
                    false
                }
            };
            if reset {
                bump(&revision);
            } else {
                debug!(%generation, "session already replaced, deferred reset skipped");
            }
        });
    }
}

impl Drop for Wizard {
    fn drop(&mut self) {
        self.chain_timer.cancel();
        self.reset_timer.cancel();
    }
}

fn bump(revision: &watch::Sender<u64>) {
    revision.send_modify(|r| *r = r.wrapping_add(1));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const ROUTE_OTHER: [&str; 5] = ["Sam", "other", "sam@example.com", "07700 900123", "hi there"];

    fn wizard() -> Wizard {
        Wizard::new(Arc::new(Catalog::standard()), WizardConfig::default()).unwrap()
    }

    fn feed(wizard: &Wizard, answers: &[&str]) -> Transition {
        let mut last = Transition::Ignored;
        for answer in answers {
            last = wizard.submit(answer).unwrap();
        }
        last
    }

    #[test]
    fn requires_runtime() {
        let result = Wizard::new(Arc::new(Catalog::standard()), WizardConfig::default());
        assert!(matches!(result, Err(WizardError::NoRuntime)));
    }

    #[tokio::test(start_paused = true)]
    async fn chain_completes_after_delay() {
        let wizard = wizard();
        assert!(matches!(feed(&wizard, &ROUTE_OTHER), Transition::ChainArmed(_)));
        assert!(!wizard.is_finished());

        tokio::time::sleep(Duration::from_millis(1_999)).await;
        assert!(!wizard.is_finished());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(wizard.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn settled_waits_for_chain() {
        let wizard = wizard();
        feed(&wizard, &ROUTE_OTHER);
        wizard.settled().await;
        assert!(wizard.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_reset_cancels_chain() {
        let wizard = wizard();
        feed(&wizard, &ROUTE_OTHER);
        let generation = wizard.session_generation();

        wizard.reset();
        assert_ne!(wizard.session_generation(), generation);

        tokio::time::sleep(Duration::from_secs(5)).await;
        let view = wizard.view();
        assert!(view.history.is_empty());
        assert_eq!(view.active_question.map(|q| q.key).as_deref(), Some("name"));
    }

    #[tokio::test(start_paused = true)]
    async fn close_defers_reset() {
        let wizard = wizard();
        wizard.set_open(true);
        feed(&wizard, &["Sam"]);
        let generation = wizard.session_generation();

        wizard.set_open(false);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(wizard.session_generation(), generation);
        assert_eq!(wizard.view().history.len(), 1);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_ne!(wizard.session_generation(), generation);
        assert!(wizard.view().history.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn reopen_cancels_deferred_reset() {
        let wizard = wizard();
        wizard.set_open(true);
        feed(&wizard, &["Sam"]);
        let generation = wizard.session_generation();

        wizard.set_open(false);
        tokio::time::sleep(Duration::from_millis(100)).await;
        wizard.set_open(true);
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(wizard.session_generation(), generation);
        assert_eq!(wizard.view().history.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn revision_bumps_on_timer_driven_change() {
        let wizard = wizard();
        let mut changes = wizard.subscribe();
        feed(&wizard, &ROUTE_OTHER);
        changes.borrow_and_update();

        changes.changed().await.unwrap();
        assert!(wizard.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_wizard_cancels_timers() {
        let wizard = wizard();
        feed(&wizard, &ROUTE_OTHER);
        let timer = wizard.chain_timer.clone();
        assert!(timer.is_armed());
        drop(wizard);
        assert!(!timer.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_wizard_cancels_deferred_reset() {
        let wizard = wizard();
        wizard.set_open(true);
        feed(&wizard, &["Sam"]);
        wizard.set_open(false);

        let timer = wizard.reset_timer.clone();
        assert!(timer.is_armed());
        drop(wizard);
        assert!(!timer.is_armed());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!timer.is_armed());
    }
}
