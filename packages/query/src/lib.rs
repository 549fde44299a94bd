#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Census query resolution and result labeling.
//!
//! [`resolver::QueryResolver`] composes a code registry, a table catalog
//! and a hierarchy catalog to turn a request into a
//! [`census_query_models::QueryPlan`]. [`assemble::ResultAssembler`] puts
//! the plan's labels back onto the table the data service returns.
//! Neither performs I/O.

pub mod assemble;
pub mod resolver;

use census_query_geography::GeoError;
use census_query_table::TableError;
use thiserror::Error;

/// Errors that can occur while relabeling a result table.
#[derive(Debug, Error)]
pub enum AssembleError {
    /// The response carries a column that was never requested.
    #[error("Response column '{column}' has no label")]
    UnlabeledColumn {
        /// The offending column identifier, verbatim.
        column: String,
    },

    /// A row does not have one value per column.
    #[error("Row {row} has {found} values, expected {expected}")]
    RowWidth {
        /// Zero-based row index.
        row: usize,
        /// Number of columns in the header.
        expected: usize,
        /// Number of values in the row.
        found: usize,
    },

    /// CSV serialization error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error (output write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Any failure while resolving or assembling a query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Geographic resolution failed.
    #[error(transparent)]
    Geography(#[from] GeoError),

    /// Table expansion failed.
    #[error(transparent)]
    Table(#[from] TableError),

    /// Result labeling failed.
    #[error(transparent)]
    Assemble(#[from] AssembleError),
}
