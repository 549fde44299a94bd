#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for resolving and answering a census query.
//!
//! A caller describes a request as table references plus a
//! [`GeoRequest`]. Resolution produces a [`QueryPlan`]; the data service
//! answers with a [`RawTable`], which is relabeled into a
//! [`LabeledTable`].

use std::collections::BTreeMap;

use census_query_geography_models::GeoValue;
use census_query_geography_models::query::GeoQuery;
use census_query_table_models::ColumnLabels;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Geography keyword arguments: level name -> supplied value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeoRequest {
    levels: BTreeMap<String, GeoValue>,
}

impl GeoRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Self::insert`].
    #[must_use]
    pub fn with(mut self, level: impl Into<String>, value: GeoValue) -> Self {
        self.insert(level, value);
        self
    }

    /// Sets the value for a level, returning any previous value.
    pub fn insert(&mut self, level: impl Into<String>, value: GeoValue) -> Option<GeoValue> {
        self.levels.insert(level.into(), value)
    }

    /// Returns the value supplied for a level.
    #[must_use]
    pub fn get(&self, level: &str) -> Option<&GeoValue> {
        self.levels.get(level)
    }

    /// Supplied level names.
    pub fn levels(&self) -> impl Iterator<Item = &str> {
        self.levels.keys().map(String::as_str)
    }

    /// `(level, value)` pairs, ordered by level name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &GeoValue)> {
        self.levels.iter().map(|(level, value)| (level.as_str(), value))
    }

    /// Number of supplied levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether no levels were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, GeoValue)> for GeoRequest {
    fn from_iter<I: IntoIterator<Item = (K, GeoValue)>>(iter: I) -> Self {
        let mut request = Self::new();
        for (level, value) in iter {
            request.insert(level, value);
        }
        request
    }
}

/// Everything the data service needs for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPlan {
    /// Name of the hierarchy the geography matched.
    pub hierarchy: String,
    /// Requested columns with their labels, in output order.
    pub columns: ColumnLabels,
    /// Geographic predicates, coarsest first.
    pub geography: GeoQuery,
}

impl QueryPlan {
    /// Column identifiers in output order.
    pub fn column_ids(&self) -> impl Iterator<Item = &str> {
        self.columns.ids()
    }
}

/// How result columns are made self-describing.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LabelMode {
    /// Replace each column identifier with its label.
    #[default]
    Rename,
    /// Keep identifiers as the header and add a row of labels under it.
    HeaderRow,
}

/// One row of a service response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    /// Geography column values (`state`, `county`, ...).
    pub geography: Vec<String>,
    /// Requested column values, aligned with [`RawTable::columns`].
    pub values: Vec<String>,
}

impl RawRow {
    /// Key identifying the geographic entity of this row.
    #[must_use]
    pub fn geo_key(&self) -> String {
        self.geography.join(":")
    }
}

/// A response from the data service, keyed by column identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    /// Geography column names returned by the service.
    pub geography_columns: Vec<String>,
    /// Requested column identifiers, in response order.
    pub columns: Vec<String>,
    /// Data rows.
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Position of a requested column, if present.
    #[must_use]
    pub fn column_index(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == id)
    }
}

/// A result table whose columns carry human-readable labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledTable {
    /// Geography column names, leading every row.
    pub geography_columns: Vec<String>,
    /// Value column header (labels or identifiers, per [`LabelMode`]).
    pub header: Vec<String>,
    /// Label row under the header, in [`LabelMode::HeaderRow`].
    pub label_row: Option<Vec<String>>,
    /// Data rows.
    pub rows: Vec<RawRow>,
}

impl LabeledTable {
    /// Full header line: geography columns then value columns.
    #[must_use]
    pub fn full_header(&self) -> Vec<&str> {
        self.geography_columns
            .iter()
            .chain(&self.header)
            .map(String::as_str)
            .collect()
    }
}
