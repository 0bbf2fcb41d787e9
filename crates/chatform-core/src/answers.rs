//! Answer store
//!
//! Accumulated key/value record of everything the visitor entered, the
//! selected route, and the chronological transcript of
//! `(question, displayed answer)` pairs.

use chatform_catalog::{Catalog, Question, Route};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::BTreeMap;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder pattern"));

/// One transcript line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// The question that was asked (or the closing statement shown)
    pub question: Question,
    /// Option label or trimmed free text; empty for closing statements
    pub displayed_answer: String,
}

/// Answers, route and transcript of one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerStore {
    route: Route,
    values: BTreeMap<String, String>,
    history: Vec<HistoryEntry>,
}

impl AnswerStore {
    /// Create a store seeded with every catalog key as an empty string
    #[must_use]
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            route: Route::Unset,
            values: catalog
                .all_keys()
                .into_iter()
                .map(|k| (k.to_string(), String::new()))
                .collect(),
            history: Vec::new(),
        }
    }

    /// Upsert an answer; accepts any string, including empty
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Stored value, `None` if the key was never seeded or set
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// All values, including empty ones
    #[inline]
    #[must_use]
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Non-empty answers only
    #[must_use]
    pub fn filled(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Selected route
    #[inline]
    #[must_use]
    pub fn route(&self) -> Route {
        self.route
    }

    /// Record the selected route
    pub fn select_route(&mut self, route: Route) {
        self.route = route;
    }

    /// Append a transcript line
    pub fn append_history(&mut self, question: Question, displayed_answer: impl Into<String>) {
        self.history.push(HistoryEntry {
            question,
            displayed_answer: displayed_answer.into(),
        });
    }

    /// Transcript so far
    #[inline]
    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Replace every `{key}` with its stored answer
    ///
    /// Placeholders whose key is unknown or empty are left as written.
    #[must_use]
    pub fn format(&self, template: &str) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures<'_>| {
                match self.get(&caps[1]) {
                    Some(value) if !value.is_empty() => value.to_string(),
                    _ => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// Clear every value to empty, drop the transcript, unset the route
    pub fn reset(&mut self) {
        self.values.values_mut().for_each(String::clear);
        self.history.clear();
        self.route = Route::Unset;
    }
}
