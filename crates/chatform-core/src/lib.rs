//! chatform Core - conversational form wizard
//!
//! Turns a [`Catalog`](chatform_catalog::Catalog) into a step-by-step
//! conversation:
//! - Resolves the effective question list for the selected route
//! - Records answers and the displayed transcript
//! - Validates and advances on each submission
//! - Walks through closing statements on a timer
//! - Resets the session when the host closes the wizard
//!
//! # Example
//!
//! ```rust
//! use chatform_core::prelude::*;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let wizard = Wizard::new(Arc::new(Catalog::standard()), WizardConfig::new())?;
//! wizard.set_open(true);
//!
//! wizard.submit("Sam")?;
//! let view = wizard.view();
//! assert_eq!(view.active_question.unwrap().key, "helpType");
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod answers;
pub mod config;
pub mod error;
pub mod navigator;
pub mod resolver;
pub mod scheduler;
pub mod state;
pub mod submission;
pub mod view;
pub mod wizard;

pub use answers::{AnswerStore, HistoryEntry};
pub use config::WizardConfig;
pub use error::{ConfigError, RoutingError, SinkError, SubmitError, ValidationError, WizardError};
pub use navigator::{ChainOutcome, Navigator, Transition};
pub use resolver::{effective_questions, first_route_question, is_visible, resolve, ResolvedQuestion};
pub use scheduler::Scheduler;
pub use state::{ChainTicket, FormState, MessageId, SessionGeneration};
pub use submission::{Submission, SubmissionSink, SubmittedLine};
pub use view::{ActiveQuestion, TranscriptEntry, ViewModel};
pub use wizard::Wizard;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for hosting a wizard
    pub use crate::{
        Navigator, Submission, SubmissionSink, SubmitError, Transition, ViewModel, Wizard,
        WizardConfig,
    };
    pub use chatform_catalog::{Catalog, Question, Route};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
