//! The question catalog
//!
//! Four fixed sequences: `base`, asked on every route, followed by exactly
//! one of `project`, `career` or `other` once the visitor picks a route.
//! Sequences never change after construction.

use crate::error::CatalogError;
use crate::question::{ChoiceOption, ClosingStatement, InputKind, PromptedQuestion, Question, RouteSelector, Validator};
use crate::route::{Route, Sequence};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Default checkpoint: after the phone number, jump to the route sequence
pub const DEFAULT_CHECKPOINT_KEY: &str = "phone";

/// Declarative question catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Shared opening questions
    pub base: Vec<Question>,
    /// Project route
    #[serde(default)]
    pub project: Vec<Question>,
    /// Career route
    #[serde(default)]
    pub career: Vec<Question>,
    /// Catch-all route
    #[serde(default)]
    pub other: Vec<Question>,
    /// Key after which the flow jumps to the first route question
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint_key: Option<String>,
}

impl Catalog {
    /// Parse and validate a YAML catalog
    ///
    /// # Errors
    /// - `CatalogError::Yaml` on malformed input
    /// - any structural error from [`Catalog::validate`]
    pub fn from_yaml_str(source: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_yaml::from_str(source)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load and validate a YAML catalog file
    ///
    /// # Errors
    /// - `CatalogError::Io` if the file cannot be read
    /// - see [`Catalog::from_yaml_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let source =
            std::fs::read_to_string(path).map_err(|e| CatalogError::io_error(path, e))?;
        Self::from_yaml_str(&source)
    }

    /// Serialize to YAML
    ///
    /// # Errors
    /// `CatalogError::Yaml` if serialization fails
    pub fn to_yaml(&self) -> Result<String, CatalogError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Questions of one sequence
    #[inline]
    #[must_use]
    pub fn sequence(&self, seq: Sequence) -> &[Question] {
        match seq {
            Sequence::Base => &self.base,
            Sequence::Project => &self.project,
            Sequence::Career => &self.career,
            Sequence::Other => &self.other,
        }
    }

    /// The route-selection question, if the catalog has one
    #[must_use]
    pub fn route_selector(&self) -> Option<&PromptedQuestion> {
        self.base
            .iter()
            .filter_map(Question::as_prompted)
            .find(|q| q.route_selector.is_some())
    }

    /// Checkpoint key, if any
    #[inline]
    #[must_use]
    pub fn checkpoint_key(&self) -> Option<&str> {
        self.checkpoint_key.as_deref()
    }

    /// Every answer key across all routes, first occurrence order, no duplicates
    #[must_use]
    pub fn all_keys(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        [Sequence::Base, Sequence::Project, Sequence::Career, Sequence::Other]
            .into_iter()
            .flat_map(move |seq| self.sequence(seq))
            .filter_map(Question::key)
            .filter(|k| seen.insert(*k))
            .collect()
    }

    /// Check structural rules
    ///
    /// # Errors
    /// The first violated rule, as a [`CatalogError`]
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.base.is_empty() {
            return Err(CatalogError::EmptyBase);
        }

        let selectors: Vec<&str> = [Sequence::Base, Sequence::Project, Sequence::Career, Sequence::Other]
            .into_iter()
            .flat_map(move |seq| self.sequence(seq))
            .filter(|q| q.is_route_selector())
            .filter_map(Question::key)
            .collect();
        if selectors.len() != 1 {
            return Err(CatalogError::RouteSelectorCount(selectors.len()));
        }
        if self.route_selector().is_none() {
            return Err(CatalogError::RouteSelectorOutsideBase(selectors[0].to_string()));
        }

        for seq in [Sequence::Base, Sequence::Project, Sequence::Career, Sequence::Other] {
            Self::validate_closing_placement(seq, self.sequence(seq))?;
        }

        if let Some(checkpoint) = self.checkpoint_key() {
            if !self.base.iter().any(|q| q.key() == Some(checkpoint)) {
                return Err(CatalogError::UnknownCheckpoint(checkpoint.to_string()));
            }
        }

        for route in Route::SELECTABLE {
            let Some(seq) = Sequence::for_route(route) else {
                continue;
            };
            let tail = self.sequence(seq);
            if !tail.is_empty() && !tail.last().is_some_and(Question::is_terminal) {
                return Err(CatalogError::MissingClosing(route.to_string()));
            }
            Self::validate_flow(route, self.base.iter().chain(tail))?;
        }

        Ok(())
    }

    /// Closing statements only form the tail of a route sequence
    fn validate_closing_placement(seq: Sequence, questions: &[Question]) -> Result<(), CatalogError> {
        let trailing = match seq {
            Sequence::Base => 0,
            _ => questions.iter().rev().take_while(|q| q.is_terminal()).count(),
        };
        let body = &questions[..questions.len() - trailing];

        match body.iter().find_map(|q| match q {
            Question::Closing(c) => Some(c),
            Question::Prompted(_) => None,
        }) {
            Some(closing) => Err(CatalogError::MisplacedClosing {
                id: closing.id.clone(),
                sequence: seq.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn validate_flow<'a>(
        route: Route,
        flow: impl Iterator<Item = &'a Question>,
    ) -> Result<(), CatalogError> {
        let mut keys = HashSet::new();
        let mut closings = HashSet::new();

        for question in flow {
            match question {
                Question::Prompted(q) => {
                    if let Some(cond) = &q.visible_when {
                        if !keys.contains(cond.key.as_str()) {
                            return Err(CatalogError::UnknownVisibilityKey {
                                key: q.key.clone(),
                                depends_on: cond.key.clone(),
                            });
                        }
                    }
                    if !keys.insert(q.key.as_str()) {
                        return Err(CatalogError::DuplicateKey {
                            key: q.key.clone(),
                            route: route.to_string(),
                        });
                    }
                }
                Question::Closing(c) => {
                    if !closings.insert(c.id.as_str()) {
                        return Err(CatalogError::DuplicateKey {
                            key: c.id.clone(),
                            route: route.to_string(),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// The built-in contact wizard
    #[must_use]
    pub fn standard() -> Self {
        Self {
            base: standard_base(),
            project: standard_project(),
            career: standard_career(),
            other: standard_other(),
            checkpoint_key: Some(DEFAULT_CHECKPOINT_KEY.to_string()),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_base() -> Vec<Question> {
    vec![
        PromptedQuestion::new("name", "What's your name?")
            .with_statement("Hi there! Thanks for dropping by.")
            .into(),
        PromptedQuestion::new("helpType", "How can I help?")
            .with_statement("Great to meet you, {name}.")
            .with_options([
                ChoiceOption::new("project", "I have a project in mind"),
                ChoiceOption::new("career", "I'd like to talk about a role"),
                ChoiceOption::new("other", "Something else"),
            ])
            .with_route_selector(RouteSelector::new([
                ("project", Route::Project),
                ("career", Route::Career),
                ("other", Route::Other),
            ]))
            .into(),
        PromptedQuestion::new("email", "What's the best email to reach you on?")
            .with_input_kind(InputKind::Email)
            .with_validator(Validator::Email)
            .into(),
        PromptedQuestion::new("phone", "And a phone number, in case that's easier?")
            .with_input_kind(InputKind::Phone)
            .with_validator(Validator::Phone)
            .into(),
    ]
}

fn standard_project() -> Vec<Question> {
    vec![
        PromptedQuestion::new("projectType", "What kind of project is it?")
            .with_statement("Exciting! Tell me a little about it.")
            .with_options([
                ChoiceOption::new("website", "A website"),
                ChoiceOption::new("app", "An app"),
                ChoiceOption::new("brand", "Brand and identity"),
                ChoiceOption::new("unsure", "Not sure yet"),
            ])
            .into(),
        PromptedQuestion::new("projectBudget", "Roughly what budget are you working with?")
            .with_options([
                ChoiceOption::new("5-10", "£5k-£10k"),
                ChoiceOption::new("10-25", "£10k-£25k"),
                ChoiceOption::new("25+", "£25k+"),
                ChoiceOption::new("unknown", "Still working it out"),
            ])
            .into(),
        PromptedQuestion::new("projectTimeline", "When would you like to get started?").into(),
        PromptedQuestion::new("message", "Anything else I should know?").into(),
        ClosingStatement::new("project-thanks", "Thanks {name}, that's everything I need.").into(),
        ClosingStatement::new("project-followup", "I'll be in touch within two working days.").into(),
    ]
}

fn standard_career() -> Vec<Question> {
    vec![
        PromptedQuestion::new("careerRoleType", "What type of role is it?")
            .with_statement("Always happy to chat about new roles.")
            .with_options([
                ChoiceOption::new("contract", "Contract"),
                ChoiceOption::new("full-time", "Full-time"),
                ChoiceOption::new("either", "Open to either"),
            ])
            .into(),
        PromptedQuestion::new("careerDayRate", "What day rate do you have in mind?")
            .with_options([
                ChoiceOption::new("400-550", "£400-£550"),
                ChoiceOption::new("550-700", "£550-£700"),
                ChoiceOption::new("700+", "£700+"),
            ])
            .visible_when("careerRoleType", "contract")
            .into(),
        PromptedQuestion::new("careerSalary", "What salary range is the role?")
            .with_options([
                ChoiceOption::new("60-80", "£60k-£80k"),
                ChoiceOption::new("80-100", "£80k-£100k"),
                ChoiceOption::new("100+", "£100k+"),
            ])
            .visible_when("careerRoleType", "full-time")
            .into(),
        PromptedQuestion::new("careerPortfolio", "Is there a link to the job spec or company?").into(),
        ClosingStatement::new("career-thanks", "Thanks {name}, I appreciate you reaching out.").into(),
        ClosingStatement::new("career-followup", "I'll review the details and get back to you soon.").into(),
    ]
}

fn standard_other() -> Vec<Question> {
    vec![
        PromptedQuestion::new("message", "What's on your mind?")
            .with_statement("No problem at all.")
            .with_validator(Validator::MinLength { min: 2 })
            .into(),
        ClosingStatement::new("other-thanks", "Thanks {name}, I'll get back to you shortly.").into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn standard_catalog_is_valid() {
        assert!(Catalog::standard().validate().is_ok());
    }

    #[test]
    fn standard_route_selector_is_in_base() {
        let catalog = Catalog::standard();
        let selector = catalog.route_selector().unwrap();
        assert_eq!(selector.key, "helpType");
        let routes = selector.route_selector.as_ref().unwrap();
        for route in Route::SELECTABLE {
            assert_eq!(routes.route_for(route.as_str()), route);
        }
    }

    #[test]
    fn route_tails_end_with_closings() {
        let catalog = Catalog::standard();
        let closings = |seq| {
            catalog
                .sequence(seq)
                .iter()
                .rev()
                .take_while(|q: &&Question| q.is_terminal())
                .count()
        };
        assert_eq!(closings(Sequence::Project), 2);
        assert_eq!(closings(Sequence::Career), 2);
        assert_eq!(closings(Sequence::Other), 1);
    }

    #[test]
    fn all_keys_deduplicates_shared_keys() {
        let catalog = Catalog::standard();
        let keys = catalog.all_keys();
        assert_eq!(keys.iter().filter(|k| **k == "message").count(), 1);
        assert!(keys.contains(&"careerDayRate"));
        assert_eq!(keys[0], "name");
    }

    #[test]
    fn yaml_round_trip() {
        let catalog = Catalog::standard();
        let yaml = catalog.to_yaml().unwrap();
        let parsed = Catalog::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, catalog);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.yaml");
        std::fs::write(&path, Catalog::standard().to_yaml().unwrap()).unwrap();
        assert_eq!(Catalog::load(&path).unwrap(), Catalog::standard());

        let missing = Catalog::load(dir.path().join("nope.yaml"));
        assert!(matches!(missing, Err(CatalogError::Io { .. })));
    }

    #[test]
    fn rejects_missing_route_selector() {
        let mut catalog = Catalog::standard();
        catalog.base.retain(|q| !q.is_route_selector());
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::RouteSelectorCount(0))
        ));
    }

    #[test]
    fn rejects_duplicate_key_in_one_flow() {
        let mut catalog = Catalog::standard();
        catalog
            .other
            .insert(0, PromptedQuestion::new("email", "Again?").into());
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::DuplicateKey { ref key, .. }) if key == "email"
        ));
    }

    #[test]
    fn rejects_forward_visibility_reference() {
        let mut catalog = Catalog::standard();
        catalog.career.insert(
            0,
            PromptedQuestion::new("early", "Too early?")
                .visible_when("careerRoleType", "contract")
                .into(),
        );
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::UnknownVisibilityKey { .. })
        ));
    }

    #[test]
    fn rejects_route_without_closing() {
        let mut catalog = Catalog::standard();
        catalog.other.pop();
        assert!(matches!(catalog.validate(), Err(CatalogError::MissingClosing(ref r)) if r == "other"));
    }

    #[test]
    fn rejects_closing_in_base() {
        let yaml = r#"
base:
  - type: closing
    id: hello
    text: "Hello"
  - type: prompted
    key: name
    prompt: "Name?"
  - type: prompted
    key: route
    prompt: "Where to?"
    options:
      - { value: project, label: Project }
    route_selector:
      project: project
"#;
        assert!(matches!(
            Catalog::from_yaml_str(yaml),
            Err(CatalogError::MisplacedClosing { ref id, ref sequence }) if id == "hello" && sequence == "base"
        ));
    }

    #[test]
    fn rejects_closing_before_route_question() {
        let mut catalog = Catalog::standard();
        catalog
            .project
            .insert(1, ClosingStatement::new("early-thanks", "Thanks already").into());
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::MisplacedClosing { ref id, ref sequence }) if id == "early-thanks" && sequence == "project"
        ));
    }

    #[test]
    fn accepts_trailing_run_of_closings() {
        let mut catalog = Catalog::standard();
        catalog
            .other
            .push(ClosingStatement::new("other-followup", "Speak soon.").into());
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_checkpoint() {
        let mut catalog = Catalog::standard();
        catalog.checkpoint_key = Some("fax".to_string());
        assert!(matches!(catalog.validate(), Err(CatalogError::UnknownCheckpoint(_))));
    }

    #[test]
    fn yaml_closing_statement_shape() {
        let yaml = r#"
base:
  - type: prompted
    key: name
    prompt: "Name?"
  - type: prompted
    key: route
    prompt: "Where to?"
    options:
      - { value: project, label: Project }
    route_selector:
      project: project
project:
  - type: closing
    id: done
    text: "Bye {name}"
"#;
        let catalog = Catalog::from_yaml_str(yaml).unwrap();
        assert_eq!(catalog.project.len(), 1);
        assert!(catalog.project[0].is_terminal());
        assert_eq!(catalog.checkpoint_key(), None);
    }
}
