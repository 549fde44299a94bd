#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! HTTP access to the census data service.
//!
//! Two requests are needed to answer a query: the table's variable
//! metadata ([`metadata`]), which feeds table expansion, and the data
//! itself ([`data`]), requested with the identifiers a
//! [`census_query_models::QueryPlan`] carries. Failures are returned as-is;
//! there is no retry.

pub mod data;
pub mod metadata;

use census_query_table::TableError;
use census_query_table_models::Survey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Public endpoint of the data service.
pub const DEFAULT_BASE_URL: &str = "https://api.census.gov/data";

/// Environment variable consulted for an API key.
pub const API_KEY_ENV: &str = "CENSUS_API_KEY";

/// Errors that can occur talking to the data service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Table metadata could not be interpreted.
    #[error(transparent)]
    Table(#[from] TableError),

    /// The response body did not have the expected shape.
    #[error("Malformed response: {message}")]
    Response {
        /// Description of what went wrong.
        message: String,
    },
}

/// Where and how to reach the data service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL, without a trailing slash.
    pub base_url: String,
    /// Optional API key sent as the `key` parameter.
    pub api_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

impl ClientConfig {
    /// URL of a survey's dataset for one year
    /// (e.g. `https://api.census.gov/data/2018/acs/acs5`).
    #[must_use]
    pub fn dataset_url(&self, survey: Survey, year: u16) -> String {
        format!(
            "{}/{year}/{}",
            self.base_url.trim_end_matches('/'),
            survey.dataset_path()
        )
    }
}

/// Builds the HTTP client used for every request.
///
/// # Errors
///
/// Returns [`ClientError::Http`] if the client cannot be constructed.
pub fn build_client() -> Result<reqwest::Client, ClientError> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("census_query/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Issues a GET with the API key attached and returns the body text.
async fn get_text(
    client: &reqwest::Client,
    config: &ClientConfig,
    url: &str,
    params: &[(&str, String)],
) -> Result<String, ClientError> {
    let mut request = client.get(url).query(params);
    if let Some(key) = &config.api_key {
        request = request.query(&[("key", key)]);
    }

    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ClientError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    Ok(body)
}
