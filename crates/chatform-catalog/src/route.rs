//! Routes and catalog sequences
//!
//! A [`Route`] is chosen once, by the route-selection question in the base
//! sequence. A [`Sequence`] names which block of the catalog a question came
//! from.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Conversation branch selected by the visitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    /// No route chosen yet
    #[default]
    Unset,
    /// Visitor has a project in mind
    Project,
    /// Visitor wants to talk about a role
    Career,
    /// Anything else
    Other,
}

impl Route {
    /// All selectable routes (excludes `Unset`)
    pub const SELECTABLE: [Route; 3] = [Route::Project, Route::Career, Route::Other];

    /// Wire name of this route
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Unset => "unset",
            Route::Project => "project",
            Route::Career => "career",
            Route::Other => "other",
        }
    }

    /// Check if a route has been chosen
    #[inline]
    #[must_use]
    pub fn is_set(&self) -> bool {
        !matches!(self, Route::Unset)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error parsing a route name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown route: '{0}'")]
pub struct UnknownRoute(pub String);

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unset" => Ok(Route::Unset),
            "project" => Ok(Route::Project),
            "career" => Ok(Route::Career),
            "other" => Ok(Route::Other),
            other => Err(UnknownRoute(other.to_string())),
        }
    }
}

/// Block of the catalog a question belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sequence {
    /// Shared opening questions, asked on every route
    Base,
    /// Project route
    Project,
    /// Career route
    Career,
    /// Catch-all route
    Other,
}

impl Sequence {
    /// Route-specific sequence for a route, `None` while unset
    #[inline]
    #[must_use]
    pub fn for_route(route: Route) -> Option<Sequence> {
        match route {
            Route::Unset => None,
            Route::Project => Some(Sequence::Project),
            Route::Career => Some(Sequence::Career),
            Route::Other => Some(Sequence::Other),
        }
    }

    /// Lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Sequence::Base => "base",
            Sequence::Project => "project",
            Sequence::Career => "career",
            Sequence::Other => "other",
        }
    }

    /// Route this sequence belongs to (`Unset` for the base)
    #[inline]
    #[must_use]
    pub fn route(&self) -> Route {
        match self {
            Sequence::Base => Route::Unset,
            Sequence::Project => Route::Project,
            Sequence::Career => Route::Career,
            Sequence::Other => Route::Other,
        }
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_parses_case_insensitively() {
        assert_eq!("Career".parse::<Route>().unwrap(), Route::Career);
        assert_eq!(" project ".parse::<Route>().unwrap(), Route::Project);
        assert!("sales".parse::<Route>().is_err());
    }

    #[test]
    fn route_display_round_trips() {
        for route in Route::SELECTABLE {
            assert_eq!(route.to_string().parse::<Route>().unwrap(), route);
        }
    }

    #[test]
    fn sequence_mapping() {
        assert_eq!(Sequence::for_route(Route::Unset), None);
        for route in Route::SELECTABLE {
            let seq = Sequence::for_route(route).unwrap();
            assert_eq!(seq.route(), route);
        }
        assert!(!Sequence::Base.route().is_set());
    }
}
