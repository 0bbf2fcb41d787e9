//! Question definitions
//!
//! A catalog entry is either a prompted question, which collects an answer
//! under a key, or a closing statement, which only narrates the end of the
//! conversation and carries no key at all.

use crate::route::Route;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 ()\-]{5,18}[0-9]$").expect("valid phone pattern"));

/// Keyboard / validation hint for free-text input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputKind {
    /// Plain text
    #[default]
    FreeText,
    /// Email address
    Email,
    /// Telephone number
    Phone,
}

/// One discrete choice of a single-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Value stored in the answer store
    pub value: String,
    /// Label shown to the visitor and in the transcript
    pub label: String,
}

impl ChoiceOption {
    /// Create a new option
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Predicate over submitted free text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Validator {
    /// Loose `local@domain.tld` shape
    Email,
    /// Digits with optional leading `+`, spaces, dashes and parentheses
    Phone,
    /// At least `min` characters
    MinLength {
        /// Minimum character count
        min: usize,
    },
}

impl Validator {
    /// Check a trimmed submission against this validator
    #[must_use]
    pub fn check(&self, value: &str) -> bool {
        match self {
            Validator::Email => EMAIL_PATTERN.is_match(value),
            Validator::Phone => PHONE_PATTERN.is_match(value),
            Validator::MinLength { min } => value.chars().count() >= *min,
        }
    }
}

/// Maps the chosen value of the route-selection question to a [`Route`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteSelector(BTreeMap<String, Route>);

impl RouteSelector {
    /// Build from `(value, route)` pairs
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Route)>,
        S: Into<String>,
    {
        Self(entries.into_iter().map(|(v, r)| (v.into(), r)).collect())
    }

    /// Route for a chosen value; `Unset` when the value is not mapped
    #[must_use]
    pub fn route_for(&self, value: &str) -> Route {
        self.0.get(value).copied().unwrap_or(Route::Unset)
    }

    /// Mapped values
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Visibility condition on a prior answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleWhen {
    /// Key of the controlling question
    pub key: String,
    /// Value that makes this question visible
    pub equals: String,
}

/// A question that waits for visitor input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptedQuestion {
    /// Answer store key
    pub key: String,
    /// Narrative shown before the prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
    /// Question text
    pub prompt: String,
    /// Input hint
    #[serde(default)]
    pub input_kind: InputKind,
    /// Discrete choices; non-empty means single-choice
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,
    /// Free-text validator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<Validator>,
    /// Present only on the route-selection question
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_selector: Option<RouteSelector>,
    /// Conditional visibility
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_when: Option<VisibleWhen>,
}

impl PromptedQuestion {
    /// Create a free-text question
    #[must_use]
    pub fn new(key: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            statement: None,
            prompt: prompt.into(),
            input_kind: InputKind::FreeText,
            options: Vec::new(),
            validator: None,
            route_selector: None,
            visible_when: None,
        }
    }

    /// With a narrative statement before the prompt
    #[must_use]
    pub fn with_statement(mut self, statement: impl Into<String>) -> Self {
        self.statement = Some(statement.into());
        self
    }

    /// With an input kind
    #[must_use]
    pub fn with_input_kind(mut self, kind: InputKind) -> Self {
        self.input_kind = kind;
        self
    }

    /// With single-choice options
    #[must_use]
    pub fn with_options<I>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = ChoiceOption>,
    {
        self.options = options.into_iter().collect();
        self
    }

    /// With a validator
    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Mark as the route-selection question
    #[must_use]
    pub fn with_route_selector(mut self, selector: RouteSelector) -> Self {
        self.route_selector = Some(selector);
        self
    }

    /// Only visible when `key` was answered with `equals`
    #[must_use]
    pub fn visible_when(mut self, key: impl Into<String>, equals: impl Into<String>) -> Self {
        self.visible_when = Some(VisibleWhen {
            key: key.into(),
            equals: equals.into(),
        });
        self
    }

    /// Check if this is a single-choice question
    #[inline]
    #[must_use]
    pub fn is_choice(&self) -> bool {
        !self.options.is_empty()
    }

    /// Find an option by value
    #[must_use]
    pub fn option(&self, value: &str) -> Option<&ChoiceOption> {
        self.options.iter().find(|o| o.value == value)
    }
}

/// Narrative entry at the end of a route; never waits for input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingStatement {
    /// Stable identifier, unique within its sequence
    pub id: String,
    /// Narrative text (may contain `{key}` placeholders)
    pub text: String,
}

impl ClosingStatement {
    /// Create a closing statement
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Question {
    /// Waits for an answer
    Prompted(PromptedQuestion),
    /// Auto-advanced narrative
    Closing(ClosingStatement),
}

impl Question {
    /// Answer key, `None` for closing statements
    #[inline]
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Question::Prompted(q) => Some(&q.key),
            Question::Closing(_) => None,
        }
    }

    /// Prompted variant, if any
    #[inline]
    #[must_use]
    pub fn as_prompted(&self) -> Option<&PromptedQuestion> {
        match self {
            Question::Prompted(q) => Some(q),
            Question::Closing(_) => None,
        }
    }

    /// True for closing statements
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Question::Closing(_))
    }

    /// True for the route-selection question
    #[inline]
    #[must_use]
    pub fn is_route_selector(&self) -> bool {
        matches!(self, Question::Prompted(q) if q.route_selector.is_some())
    }

    /// Narrative text shown before the prompt (the whole text for closings)
    #[must_use]
    pub fn statement(&self) -> Option<&str> {
        match self {
            Question::Prompted(q) => q.statement.as_deref(),
            Question::Closing(c) => Some(&c.text),
        }
    }

    /// Prompt text, `None` for closing statements
    #[must_use]
    pub fn prompt(&self) -> Option<&str> {
        self.as_prompted().map(|q| q.prompt.as_str())
    }
}

impl From<PromptedQuestion> for Question {
    fn from(q: PromptedQuestion) -> Self {
        Question::Prompted(q)
    }
}

impl From<ClosingStatement> for Question {
    fn from(c: ClosingStatement) -> Self {
        Question::Closing(c)
    }
}
