//! Data downloads for a resolved [`QueryPlan`].
//!
//! The service answers with a JSON array of arrays: a header row of
//! variable and geography names, then one row per geographic entity.
//! Geography columns (`state`, `county`, ...) are appended after the
//! requested variables. Only the levels of the request's [`GeoQuery`]
//! count as geography; any other header is a value column.

use std::collections::BTreeMap;

use census_query_geography_models::query::GeoQuery;
use census_query_models::{QueryPlan, RawRow, RawTable};
use census_query_table_models::Survey;
use serde_json::Value;

use crate::{ClientConfig, ClientError};

/// Most variables the service accepts in one `get` parameter.
pub const MAX_VARIABLES_PER_REQUEST: usize = 50;

/// Query parameters for one data request.
#[must_use]
pub fn data_params(variables: &[&str], geography: &GeoQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![("get", variables.join(","))];

    if let Some(for_clause) = geography.for_clause() {
        params.push(("for", for_clause));
    }

    let parents = geography.in_clauses();
    if !parents.is_empty() {
        params.push(("in", parents.join(" ")));
    }

    params
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Splits a response into value columns and the geography columns named
/// by `geography`.
///
/// A variable the request did not ask for stays a value column, so the
/// assembler can reject it.
///
/// # Errors
///
/// Returns [`ClientError::Response`] if the header row is missing or a row
/// has the wrong number of cells.
pub fn parse_data_response(
    rows: Vec<Vec<Value>>,
    geography: &GeoQuery,
) -> Result<RawTable, ClientError> {
    let mut rows = rows.into_iter();
    let header: Vec<String> = rows
        .next()
        .ok_or_else(|| ClientError::Response {
            message: "response has no header row".to_string(),
        })?
        .iter()
        .map(cell_text)
        .collect();

    let is_value: Vec<bool> = header
        .iter()
        .map(|name| !geography.pairs().any(|(level, _)| level == name))
        .collect();

    let mut table = RawTable::default();
    for (name, &value) in header.iter().zip(&is_value) {
        if value {
            table.columns.push(name.clone());
        } else {
            table.geography_columns.push(name.clone());
        }
    }

    for (i, row) in rows.enumerate() {
        if row.len() != header.len() {
            return Err(ClientError::Response {
                message: format!(
                    "row {i} has {} cells, header has {}",
                    row.len(),
                    header.len()
                ),
            });
        }

        let mut raw = RawRow::default();
        for (cell, &value) in row.iter().zip(&is_value) {
            if value {
                raw.values.push(cell_text(cell));
            } else {
                raw.geography.push(cell_text(cell));
            }
        }
        table.rows.push(raw);
    }

    Ok(table)
}

/// Appends the columns of `next` onto `base`, joining rows on geography.
///
/// # Errors
///
/// Returns [`ClientError::Response`] if the two tables disagree on their
/// geography columns or on which entities they cover.
pub fn merge_tables(mut base: RawTable, next: RawTable) -> Result<RawTable, ClientError> {
    if base.geography_columns != next.geography_columns {
        return Err(ClientError::Response {
            message: format!(
                "geography columns differ between chunks: {:?} vs {:?}",
                base.geography_columns, next.geography_columns
            ),
        });
    }

    let mut by_key: BTreeMap<String, Vec<String>> = next
        .rows
        .into_iter()
        .map(|row| (row.geo_key(), row.values))
        .collect();

    for row in &mut base.rows {
        let key = row.geo_key();
        let values = by_key.remove(&key).ok_or_else(|| ClientError::Response {
            message: format!("geography {key} missing from a later chunk"),
        })?;
        row.values.extend(values);
    }

    if !by_key.is_empty() {
        return Err(ClientError::Response {
            message: format!("{} geographies only present in a later chunk", by_key.len()),
        });
    }

    base.columns.extend(next.columns);
    Ok(base)
}

fn empty_table(variables: &[&str], geography: &GeoQuery) -> RawTable {
    RawTable {
        geography_columns: geography.pairs().map(|(level, _)| level.to_string()).collect(),
        columns: variables.iter().map(ToString::to_string).collect(),
        rows: Vec::new(),
    }
}

/// Downloads every column of `plan`, in chunks the service accepts.
///
/// # Errors
///
/// Returns [`ClientError`] if any request fails or a response cannot be
/// interpreted. Nothing is returned for a partially successful download.
pub async fn fetch_data(
    client: &reqwest::Client,
    config: &ClientConfig,
    survey: Survey,
    year: u16,
    plan: &QueryPlan,
) -> Result<RawTable, ClientError> {
    let variables: Vec<&str> = plan.column_ids().collect();
    if variables.is_empty() {
        log::warn!("No columns requested; skipping download");
        return Ok(empty_table(&[], &plan.geography));
    }

    let url = config.dataset_url(survey, year);
    let chunks = variables.len().div_ceil(MAX_VARIABLES_PER_REQUEST);
    let mut merged: Option<RawTable> = None;

    for (i, chunk) in variables.chunks(MAX_VARIABLES_PER_REQUEST).enumerate() {
        log::info!(
            "Requesting {} variables from {url} (chunk {}/{chunks})",
            chunk.len(),
            i + 1
        );

        let params = data_params(chunk, &plan.geography);
        let body = crate::get_text(client, config, &url, &params).await?;

        // The service answers an empty selection with no body at all.
        let table = if body.trim().is_empty() {
            empty_table(chunk, &plan.geography)
        } else {
            parse_data_response(serde_json::from_str(&body)?, &plan.geography)?
        };

        log::debug!("Chunk {} returned {} rows", i + 1, table.rows.len());

        merged = Some(match merged {
            Some(base) => merge_tables(base, table)?,
            None => table,
        });
    }

    Ok(merged.unwrap_or_else(|| empty_table(&variables, &plan.geography)))
}
