#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Semantic table aliases and column expansion.
//!
//! Short aliases such as `"pop"` are defined in an embedded TOML file
//! ([`aliases`]). The [`catalog::TableCatalog`] expands an alias into every
//! estimate column of its base table, each followed by its
//! margin-of-error sibling, using field metadata from an injected
//! [`metadata::TableMetadataSource`].

pub mod aliases;
pub mod catalog;
pub mod metadata;

use thiserror::Error;

/// Errors that can occur during table operations.
#[derive(Debug, Error)]
pub enum TableError {
    /// An alias has no catalog entry.
    #[error("Unknown table alias '{alias}'")]
    UnknownTable {
        /// The offending alias, verbatim.
        alias: String,
    },

    /// The metadata source has nothing for the requested table.
    #[error("No metadata for table {table} ({survey} {year})")]
    MissingMetadata {
        /// Base table identifier.
        table: String,
        /// Survey name.
        survey: String,
        /// Survey year.
        year: u16,
    },

    /// A literal column could not be parsed from `ID=LABEL` form.
    #[error("Invalid column '{input}', expected ID=LABEL")]
    InvalidColumn {
        /// The offending input, verbatim.
        input: String,
    },

    /// Alias definitions could not be parsed.
    #[error("Alias config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Metadata JSON could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
