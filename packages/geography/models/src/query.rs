//! The geographic predicate list sent to the data service.
//!
//! Level names inside a [`GeoQuery`] use the service's vocabulary
//! (`tract`, `block group`) rather than the identifier-safe names used in
//! hierarchy definitions (`census_tract`, `block_group`).

use serde::{Deserialize, Serialize};

use crate::{CENSUS_TRACT, GeoValue};

/// Rewrites a hierarchy level name into the data service's vocabulary.
///
/// `census_tract` becomes `tract`; any other underscore becomes a space
/// (`block_group` -> `block group`).
#[must_use]
pub fn service_level_name(level: &str) -> String {
    if level == CENSUS_TRACT {
        "tract".to_string()
    } else {
        level.replace('_', " ")
    }
}

/// One `(level, code-or-wildcard)` pair of a [`GeoQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoPredicate {
    /// Level name in service vocabulary (e.g. `"block group"`).
    pub level: String,
    /// Resolved code or `*`.
    pub value: String,
}

/// Ordered geographic predicates, coarsest level first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeoQuery {
    predicates: Vec<GeoPredicate>,
}

impl GeoQuery {
    /// Builds a query from `(hierarchy level, resolved value)` pairs,
    /// renaming each level to the service vocabulary.
    ///
    /// Resolved values must be codes or the wildcard; a leftover name is
    /// passed through verbatim.
    #[must_use]
    pub fn from_resolved<'a, I>(levels: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a GeoValue)>,
    {
        Self {
            predicates: levels
                .into_iter()
                .map(|(level, value)| GeoPredicate {
                    level: service_level_name(level),
                    value: value.as_str().to_string(),
                })
                .collect(),
        }
    }

    /// Returns the predicates in order.
    #[must_use]
    pub fn predicates(&self) -> &[GeoPredicate] {
        &self.predicates
    }

    /// Returns the `(level, value)` pairs as string slices.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.predicates
            .iter()
            .map(|p| (p.level.as_str(), p.value.as_str()))
    }

    /// Number of predicates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Whether there are no predicates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// The `for` clause: the finest level and its value (`"county:059"`).
    #[must_use]
    pub fn for_clause(&self) -> Option<String> {
        self.predicates
            .last()
            .map(|p| format!("{}:{}", p.level, p.value))
    }

    /// The `in` clauses: every parent level and its value, coarsest first.
    #[must_use]
    pub fn in_clauses(&self) -> Vec<String> {
        let parents = self.predicates.len().saturating_sub(1);
        self.predicates[..parents]
            .iter()
            .map(|p| format!("{}:{}", p.level, p.value))
            .collect()
    }
}
