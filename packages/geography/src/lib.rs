#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic code registry and hierarchy catalog.
//!
//! [`registry::CodeRegistry`] turns state and county names into FIPS codes
//! using the Census Bureau geocode sheet for a reference year.
//! [`hierarchy::HierarchyCatalog`] knows which chains of geographic levels
//! the data service accepts and picks the one that exactly matches the
//! levels a caller supplied. Both are loaded once and read-only afterwards.

pub mod hierarchy;
pub mod registry;

use thiserror::Error;

/// Errors that can occur during geography operations.
#[derive(Debug, Error)]
pub enum GeoError {
    /// A place name (or code) is absent from the loaded reference year.
    #[error("Unknown {level} '{value}' in {year} reference data")]
    UnknownGeography {
        /// Level the value was looked up at.
        level: String,
        /// The offending input, verbatim.
        value: String,
        /// Reference year of the registry.
        year: u16,
    },

    /// The supplied levels do not form any defined hierarchy.
    #[error("No geographic hierarchy matches levels [{}]", .levels.join(", "))]
    NoMatchingHierarchy {
        /// The supplied level names, sorted.
        levels: Vec<String>,
    },

    /// More than one hierarchy definition has the supplied level set.
    #[error(
        "Geographic levels [{}] match several hierarchies: {}",
        .levels.join(", "),
        .candidates.join(", ")
    )]
    AmbiguousHierarchy {
        /// The supplied level names, sorted.
        levels: Vec<String>,
        /// Names of every matching definition.
        candidates: Vec<String>,
    },

    /// A reference file is missing a required column.
    #[error("Missing required column '{column}'")]
    MissingColumn {
        /// Header text that was expected.
        column: String,
    },

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
