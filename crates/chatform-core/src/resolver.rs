//! Flow resolver
//!
//! Pure functions from `(route, answers)` to the ordered list of questions
//! that applies right now. Nothing here holds state.

use crate::answers::AnswerStore;
use chatform_catalog::{Catalog, Question, Route, Sequence};
use serde::Serialize;

/// A catalog entry placed in the resolved flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedQuestion<'a> {
    /// Position in the unfiltered resolved list; stable across visibility changes
    pub slot: usize,
    /// Catalog block this entry came from
    pub origin: Sequence,
    /// The entry itself
    pub question: &'a Question,
}

impl ResolvedQuestion<'_> {
    /// True for closing statements
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.question.is_terminal()
    }

    /// True when the entry belongs to a route sequence
    #[inline]
    #[must_use]
    pub fn is_route_specific(&self) -> bool {
        self.origin != Sequence::Base
    }
}

/// `base ++ routeSequence(route)`, or `base` alone while the route is unset
#[must_use]
pub fn resolve(catalog: &Catalog, route: Route) -> Vec<ResolvedQuestion<'_>> {
    let base = catalog.sequence(Sequence::Base).iter().map(|q| (Sequence::Base, q));
    let tail = Sequence::for_route(route)
        .into_iter()
        .flat_map(move |seq| catalog.sequence(seq).iter().map(move |q| (seq, q)));

    base.chain(tail)
        .enumerate()
        .map(|(slot, (origin, question))| ResolvedQuestion {
            slot,
            origin,
            question,
        })
        .collect()
}

/// Whether a resolved question applies given the current answers
///
/// Unconditional questions are always visible. A `visible_when` condition
/// holds only if its controlling key is asked earlier in `all_resolved` and
/// was answered with the expected value.
#[must_use]
pub fn is_visible(
    question: &ResolvedQuestion<'_>,
    answers: &AnswerStore,
    all_resolved: &[ResolvedQuestion<'_>],
) -> bool {
    let Some(cond) = question
        .question
        .as_prompted()
        .and_then(|q| q.visible_when.as_ref())
    else {
        return true;
    };

    let asked_earlier = all_resolved
        .iter()
        .any(|r| r.slot < question.slot && r.question.key() == Some(cond.key.as_str()));

    asked_earlier && answers.get(&cond.key) == Some(cond.equals.as_str())
}

/// The list the navigator walks: resolved for the stored route, visibility-filtered
#[must_use]
pub fn effective_questions<'c>(catalog: &'c Catalog, answers: &AnswerStore) -> Vec<ResolvedQuestion<'c>> {
    let resolved = resolve(catalog, answers.route());
    resolved
        .iter()
        .filter(|q| is_visible(q, answers, &resolved))
        .copied()
        .collect()
}

/// Index of the first route-specific question in an effective list
#[must_use]
pub fn first_route_question(effective: &[ResolvedQuestion<'_>]) -> Option<usize> {
    effective.iter().position(ResolvedQuestion::is_route_specific)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn keys(list: &[ResolvedQuestion<'_>]) -> Vec<Option<String>> {
        list.iter().map(|r| r.question.key().map(str::to_string)).collect()
    }

    fn route_strategy() -> impl Strategy<Value = Route> {
        prop_oneof![
            Just(Route::Unset),
            Just(Route::Project),
            Just(Route::Career),
            Just(Route::Other),
        ]
    }

    #[test]
    fn unset_route_resolves_to_base() {
        let catalog = Catalog::standard();
        let resolved = resolve(&catalog, Route::Unset);
        assert_eq!(resolved.len(), catalog.base.len());
        assert!(resolved.iter().all(|r| r.origin == Sequence::Base));
    }

    #[test]
    fn project_route_is_base_then_project() {
        let catalog = Catalog::standard();
        let resolved = resolve(&catalog, Route::Project);
        let expected: Vec<&Question> = catalog.base.iter().chain(&catalog.project).collect();
        let actual: Vec<&Question> = resolved.iter().map(|r| r.question).collect();
        assert_eq!(actual, expected);
        assert_eq!(first_route_question(&resolved), Some(catalog.base.len()));
        assert!(resolved.iter().enumerate().all(|(i, r)| r.slot == i));
    }

    fn career_store(role_type: &str) -> AnswerStore {
        let catalog = Catalog::standard();
        let mut store = AnswerStore::new(&catalog);
        store.select_route(Route::Career);
        store.set("careerRoleType", role_type);
        store
    }

    fn visible_keys(role_type: &str) -> Vec<String> {
        let catalog = Catalog::standard();
        let store = career_store(role_type);
        effective_questions(&catalog, &store)
            .iter()
            .filter_map(|r| r.question.key().map(str::to_string))
            .collect()
    }

    #[test]
    fn contract_shows_day_rate_only() {
        let keys = visible_keys("contract");
        assert!(keys.contains(&"careerDayRate".to_string()));
        assert!(!keys.contains(&"careerSalary".to_string()));
    }

    #[test]
    fn full_time_shows_salary_only() {
        let keys = visible_keys("full-time");
        assert!(!keys.contains(&"careerDayRate".to_string()));
        assert!(keys.contains(&"careerSalary".to_string()));
    }

    #[test]
    fn other_role_type_hides_both() {
        for role_type in ["either", ""] {
            let keys = visible_keys(role_type);
            assert!(!keys.contains(&"careerDayRate".to_string()));
            assert!(!keys.contains(&"careerSalary".to_string()));
        }
    }

    #[test]
    fn condition_needs_controlling_question_in_flow() {
        let catalog = Catalog::standard();
        let store = career_store("contract");
        let career_only: Vec<ResolvedQuestion<'_>> = resolve(&catalog, Route::Career)
            .into_iter()
            .filter(|r| r.question.key() != Some("careerRoleType"))
            .collect();
        let day_rate = career_only
            .iter()
            .find(|r| r.question.key() == Some("careerDayRate"))
            .unwrap();
        assert!(!is_visible(day_rate, &store, &career_only));
    }

    proptest! {
        #[test]
        fn prop_resolve_is_deterministic(route in route_strategy(), name in ".{0,12}") {
            let catalog = Catalog::standard();
            let mut store = AnswerStore::new(&catalog);
            store.select_route(route);
            store.set("name", name);

            let first = effective_questions(&catalog, &store);
            let second = effective_questions(&catalog, &store);
            prop_assert_eq!(first, second);
            prop_assert_eq!(keys(&resolve(&catalog, route)), keys(&resolve(&catalog, route)));
        }

        #[test]
        fn prop_route_flow_starts_with_base(route in route_strategy()) {
            let catalog = Catalog::standard();
            let resolved = resolve(&catalog, route);
            let base_len = catalog.base.len();
            for (r, q) in resolved.iter().zip(&catalog.base) {
                prop_assert_eq!(r.question, q);
            }
            let tail: Vec<&Question> = resolved[base_len..].iter().map(|r| r.question).collect();
            let expected: Vec<&Question> = Sequence::for_route(route)
                .map(|s| catalog.sequence(s).iter().collect())
                .unwrap_or_default();
            prop_assert_eq!(tail, expected);
        }

        #[test]
        fn prop_career_exclusivity(role_type in prop_oneof![
            Just("contract".to_string()),
            Just("full-time".to_string()),
            "[a-z-]{0,10}",
        ]) {
            let keys = visible_keys(&role_type);
            let day_rate = keys.contains(&"careerDayRate".to_string());
            let salary = keys.contains(&"careerSalary".to_string());
            prop_assert_eq!(day_rate, role_type == "contract");
            prop_assert_eq!(salary, role_type == "full-time");
            prop_assert!(!(day_rate && salary));
        }
    }
}
