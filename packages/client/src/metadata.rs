//! Table metadata downloads (`groups/<table>.json`).

use census_query_table::metadata::{StaticMetadataSource, TableFields, parse_groups_document};
use census_query_table_models::Survey;

use crate::{ClientConfig, ClientError};

/// URL of a table's groups document.
#[must_use]
pub fn metadata_url(config: &ClientConfig, survey: Survey, year: u16, table: &str) -> String {
    format!("{}/groups/{table}.json", config.dataset_url(survey, year))
}

/// Downloads the variable metadata of one base table.
///
/// # Errors
///
/// Returns [`ClientError`] if the request fails or the document cannot be
/// parsed.
pub async fn fetch_table_metadata(
    client: &reqwest::Client,
    config: &ClientConfig,
    survey: Survey,
    year: u16,
    table: &str,
) -> Result<TableFields, ClientError> {
    let url = metadata_url(config, survey, year, table);
    log::info!("Fetching metadata for table {table} ({survey} {year})");

    let body = crate::get_text(client, config, &url, &[]).await?;
    let fields = parse_groups_document(table, &body)?;

    log::debug!("Table {table}: {} variables", fields.len());
    Ok(fields)
}

/// Downloads metadata for several base tables into one in-memory source.
///
/// # Errors
///
/// Returns the first [`ClientError`] hit.
pub async fn fetch_metadata_source(
    client: &reqwest::Client,
    config: &ClientConfig,
    survey: Survey,
    year: u16,
    tables: &[&str],
) -> Result<StaticMetadataSource, ClientError> {
    let mut source = StaticMetadataSource::new();
    for table in tables {
        if source.contains(survey, year, table) {
            continue;
        }
        let fields = fetch_table_metadata(client, config, survey, year, table).await?;
        source.insert(survey, year, *table, fields);
    }
    Ok(source)
}
