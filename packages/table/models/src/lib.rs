#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Statistical table, column, and label types.
//!
//! A survey table such as `B01003` is made of estimate columns
//! (`B01003_001E`), each paired with a margin-of-error column
//! (`B01003_001M`). [`ColumnLabels`] holds the expanded identifiers with
//! their human-readable labels in a stable order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Trailing character of an estimate column identifier.
pub const ESTIMATE_SUFFIX: char = 'E';
/// Trailing character of a margin-of-error column identifier.
pub const MARGIN_SUFFIX: char = 'M';
/// Separator between label segments.
pub const LABEL_SEPARATOR: &str = "!!";
/// First label segment of every margin-of-error column.
pub const MARGIN_LABEL_PREFIX: &str = "MOE";

/// A survey product offered by the data service.
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Survey {
    /// American Community Survey, 1-year estimates.
    Acs1,
    /// American Community Survey, 3-year estimates.
    Acs3,
    /// American Community Survey, 5-year estimates.
    Acs5,
    /// American Community Survey, supplemental estimates.
    Acsse,
    /// Decennial census, summary file 1.
    Sf1,
}

impl Survey {
    /// Dataset path segment used by the data service (e.g. `"acs/acs5"`).
    #[must_use]
    pub const fn dataset_path(self) -> &'static str {
        match self {
            Self::Acs1 => "acs/acs1",
            Self::Acs3 => "acs/acs3",
            Self::Acs5 => "acs/acs5",
            Self::Acsse => "acs/acsse",
            Self::Sf1 => "dec/sf1",
        }
    }
}

/// Metadata the service publishes for one variable of a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
    /// Field label (e.g. `"Estimate!!Total"`).
    #[serde(default)]
    pub label: String,
    /// Table concept (e.g. `"TOTAL POPULATION"`).
    #[serde(default)]
    pub concept: String,
}

/// A column identifier paired with its human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column identifier (e.g. `"B01003_001E"`).
    pub id: String,
    /// Label (e.g. `"TOTAL POPULATION!!Estimate!!Total"`).
    pub label: String,
}

impl ColumnSpec {
    /// Creates a column spec.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    /// Parses an `ID=LABEL` pair. Returns `None` if either side is empty.
    #[must_use]
    pub fn parse_pair(raw: &str) -> Option<Self> {
        let (id, label) = raw.split_once('=')?;
        let (id, label) = (id.trim(), label.trim());
        if id.is_empty() || label.is_empty() {
            return None;
        }
        Some(Self::new(id, label))
    }
}

/// Column identifiers with labels, in first-inserted order.
///
/// Re-inserting an identifier replaces its label but keeps its original
/// position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ColumnSpec>", into = "Vec<ColumnSpec>")]
pub struct ColumnLabels {
    specs: Vec<ColumnSpec>,
    index: BTreeMap<String, usize>,
}

impl ColumnLabels {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or relabels a column.
    pub fn insert(&mut self, id: impl Into<String>, label: impl Into<String>) {
        let id = id.into();
        let label = label.into();

        if let Some(&i) = self.index.get(&id) {
            self.specs[i].label = label;
        } else {
            self.index.insert(id.clone(), self.specs.len());
            self.specs.push(ColumnSpec { id, label });
        }
    }

    /// Merges another set into this one; its labels win on collision.
    pub fn merge(&mut self, other: Self) {
        for spec in other.specs {
            self.insert(spec.id, spec.label);
        }
    }

    /// Returns the label for a column identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&str> {
        self.index.get(id).map(|&i| self.specs[i].label.as_str())
    }

    /// Whether the identifier is present.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether there are no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Iterates over the columns in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ColumnSpec> {
        self.specs.iter()
    }

    /// Column identifiers in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|s| s.id.as_str())
    }
}

impl From<Vec<ColumnSpec>> for ColumnLabels {
    fn from(specs: Vec<ColumnSpec>) -> Self {
        specs.into_iter().collect()
    }
}

impl From<ColumnLabels> for Vec<ColumnSpec> {
    fn from(labels: ColumnLabels) -> Self {
        labels.specs
    }
}

impl FromIterator<ColumnSpec> for ColumnLabels {
    fn from_iter<I: IntoIterator<Item = ColumnSpec>>(iter: I) -> Self {
        let mut labels = Self::new();
        for spec in iter {
            labels.insert(spec.id, spec.label);
        }
        labels
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ColumnLabels {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(id, label)| ColumnSpec::new(id, label))
            .collect()
    }
}

impl<'a> IntoIterator for &'a ColumnLabels {
    type Item = &'a ColumnSpec;
    type IntoIter = std::slice::Iter<'a, ColumnSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One entry of a caller's table list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TableRef {
    /// A semantic alias (e.g. `"pop"`) expanded through the catalog.
    Alias(String),
    /// Pre-built columns passed through unchanged.
    Literal(ColumnLabels),
}

impl TableRef {
    /// Creates a [`TableRef::Alias`].
    #[must_use]
    pub fn alias(alias: impl Into<String>) -> Self {
        Self::Alias(alias.into())
    }
}

impl From<&str> for TableRef {
    fn from(alias: &str) -> Self {
        Self::alias(alias)
    }
}

impl From<ColumnLabels> for TableRef {
    fn from(labels: ColumnLabels) -> Self {
        Self::Literal(labels)
    }
}

/// Whether an identifier names an estimate column (`..._001E`).
#[must_use]
pub fn is_estimate_id(id: &str) -> bool {
    id.ends_with(ESTIMATE_SUFFIX)
}

/// Derives the margin-of-error identifier from an estimate identifier by
/// replacing the trailing `E` with `M`.
#[must_use]
pub fn margin_id(estimate_id: &str) -> Option<String> {
    estimate_id
        .strip_suffix(ESTIMATE_SUFFIX)
        .map(|stem| format!("{stem}{MARGIN_SUFFIX}"))
}

/// Builds the estimate label `<concept>!!<field label>`.
#[must_use]
pub fn estimate_label(field: &FieldMetadata) -> String {
    format!("{}{LABEL_SEPARATOR}{}", field.concept, field.label)
}

/// Builds the margin label `MOE!!<estimate label>`.
#[must_use]
pub fn margin_label(estimate_label: &str) -> String {
    format!("{MARGIN_LABEL_PREFIX}{LABEL_SEPARATOR}{estimate_label}")
}
