//! chatform Question Catalog
//!
//! Static, declarative definitions of every question the conversational
//! wizard can ask:
//! - [`Question`]: a prompted question or a closing statement (tagged union)
//! - [`Route`] / [`Sequence`]: the branch chosen by the visitor and the
//!   catalog block each question comes from
//! - [`Catalog`]: the base sequence plus three route sequences, built in
//!   ([`Catalog::standard`]) or loaded from YAML
//!
//! # Example
//!
//! ```rust
//! use chatform_catalog::{Catalog, Sequence};
//!
//! let catalog = Catalog::standard();
//! assert!(catalog.validate().is_ok());
//! assert!(catalog.sequence(Sequence::Career).last().unwrap().is_terminal());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod catalog;
mod error;
mod question;
mod route;

pub use catalog::{Catalog, DEFAULT_CHECKPOINT_KEY};
pub use error::CatalogError;
pub use question::{
    ChoiceOption, ClosingStatement, InputKind, PromptedQuestion, Question, RouteSelector,
    Validator, VisibleWhen,
};
pub use route::{Route, Sequence, UnknownRoute};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
