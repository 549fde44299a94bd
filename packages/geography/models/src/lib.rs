#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic level, code, and hierarchy types.
//!
//! These types describe *where* a statistical query applies: the value a
//! caller supplies for each geographic level ([`GeoValue`]), the ordered
//! chains of levels the data service accepts ([`HierarchyDefinition`]),
//! and the final predicate list sent to the service ([`query::GeoQuery`]).

pub mod fips;
pub mod query;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Level name for states.
pub const STATE: &str = "state";
/// Level name for counties.
pub const COUNTY: &str = "county";
/// Level name for census tracts.
pub const CENSUS_TRACT: &str = "census_tract";
/// Level name for block groups.
pub const BLOCK_GROUP: &str = "block_group";
/// Level name for census blocks.
pub const BLOCK: &str = "block";

/// Marker meaning "every entity at this level under the parent".
pub const WILDCARD: &str = "*";

/// A caller-supplied value for one geographic level.
///
/// Names still need to be resolved to codes through a code registry;
/// codes and the wildcard are sent to the data service as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum GeoValue {
    /// A human-readable place name (e.g. "Jefferson County").
    Name(String),
    /// An already-resolved numeric code (e.g. "059").
    Code(String),
    /// Every entity at this level.
    Wildcard,
}

impl GeoValue {
    /// Creates a [`GeoValue::Name`].
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Creates a [`GeoValue::Code`].
    #[must_use]
    pub fn code(code: impl Into<String>) -> Self {
        Self::Code(code.into())
    }

    /// Classifies free-form input: `*` is the wildcard, a non-empty string
    /// of ASCII digits is a code, anything else is a name.
    ///
    /// Callers that know better (a numeric place name, say) should build
    /// the variant directly instead.
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed == WILDCARD {
            Self::Wildcard
        } else if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Self::Code(trimmed.to_string())
        } else {
            Self::Name(trimmed.to_string())
        }
    }

    /// Returns the raw string form (`*` for the wildcard).
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Name(s) | Self::Code(s) => s,
            Self::Wildcard => WILDCARD,
        }
    }

    /// Whether this value still needs a name-to-code lookup.
    #[must_use]
    pub const fn is_name(&self) -> bool {
        matches!(self, Self::Name(_))
    }

    /// Whether this value is the wildcard marker.
    #[must_use]
    pub const fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }
}

impl fmt::Display for GeoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary levels used by the reference geocode sheet.
///
/// Only the levels a code registry indexes are listed; rows with any
/// other summary level fail to parse and are skipped by loaders.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum SummaryLevel {
    /// State (`"040"`).
    #[serde(rename = "040")]
    #[strum(serialize = "040")]
    State,
    /// County (`"050"`).
    #[serde(rename = "050")]
    #[strum(serialize = "050")]
    County,
}

impl SummaryLevel {
    /// The geographic level name this summary level corresponds to.
    #[must_use]
    pub const fn level_name(self) -> &'static str {
        match self {
            Self::State => STATE,
            Self::County => COUNTY,
        }
    }
}

/// An ordered chain of geographic levels, coarsest first.
///
/// Named by its finest level, except for derived short-circuit
/// definitions such as `all_counties`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyDefinition {
    /// Lookup name (e.g. `"census_tract"`).
    pub name: String,
    /// Level names from coarsest to finest.
    pub levels: Vec<String>,
}

impl HierarchyDefinition {
    /// Creates a definition from a name and its ordered levels.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            levels: levels.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the finest (last) level, if any.
    #[must_use]
    pub fn finest(&self) -> Option<&str> {
        self.levels.last().map(String::as_str)
    }

    /// Returns the set of level names in this definition.
    #[must_use]
    pub fn level_set(&self) -> BTreeSet<&str> {
        self.levels.iter().map(String::as_str).collect()
    }

    /// Whether this definition's level set is exactly `levels`.
    #[must_use]
    pub fn matches(&self, levels: &BTreeSet<&str>) -> bool {
        self.level_set() == *levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_raw_values() {
        assert_eq!(GeoValue::classify("*"), GeoValue::Wildcard);
        assert_eq!(GeoValue::classify("08"), GeoValue::code("08"));
        assert_eq!(GeoValue::classify(" 011724 "), GeoValue::code("011724"));
        assert_eq!(GeoValue::classify("Colorado"), GeoValue::name("Colorado"));
        assert_eq!(
            GeoValue::classify("Jefferson County"),
            GeoValue::name("Jefferson County")
        );
        assert_eq!(GeoValue::classify(""), GeoValue::name(""));
    }

    #[test]
    fn wildcard_displays_as_marker() {
        assert_eq!(GeoValue::Wildcard.to_string(), "*");
        assert_eq!(GeoValue::code("059").as_str(), "059");
    }

    #[test]
    fn summary_level_codes() {
        assert_eq!("040".parse::<SummaryLevel>().ok(), Some(SummaryLevel::State));
        assert_eq!("050".parse::<SummaryLevel>().ok(), Some(SummaryLevel::County));
        assert!("061".parse::<SummaryLevel>().is_err());
        assert_eq!(SummaryLevel::County.as_ref(), "050");
        assert_eq!(SummaryLevel::State.level_name(), STATE);
    }

    #[test]
    fn matches_exact_level_sets_only() {
        let def = HierarchyDefinition::new("county", [STATE, COUNTY]);
        let exact: BTreeSet<&str> = [COUNTY, STATE].into_iter().collect();
        let subset: BTreeSet<&str> = [STATE].into_iter().collect();
        let superset: BTreeSet<&str> = [STATE, COUNTY, CENSUS_TRACT].into_iter().collect();

        assert!(def.matches(&exact));
        assert!(!def.matches(&subset));
        assert!(!def.matches(&superset));
        assert_eq!(def.finest(), Some(COUNTY));
    }

    #[test]
    fn geo_value_serializes_tagged() {
        let json = serde_json::to_value(GeoValue::name("Colorado")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "name", "value": "Colorado"}));
        let wildcard = serde_json::to_value(GeoValue::Wildcard).unwrap();
        assert_eq!(wildcard, serde_json::json!({"type": "wildcard"}));
    }
}
