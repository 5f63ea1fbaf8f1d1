//! Public holiday API client for the work-time ledger.
//!
//! Fetches the regional holiday dates that refine the nationwide set computed
//! by `wlog-core`. The default endpoint is the feiertage-api.de service, which
//! answers `GET {base}?jahr=<year>&nur_land=<REGION>` with an object keyed by
//! holiday name.

use std::fmt;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use wlog_core::HolidayFetcher;

/// Default holiday API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://feiertage-api.de/api/";

/// Default request timeout for API calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Holiday fetch errors.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// API returned an error response.
    #[error("API error: {message}")]
    Api { message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Holiday API client.
///
/// # Thread Safety
///
/// The client is safe to clone and share across threads. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client for the API at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::ClientBuild)?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Holiday dates (`YYYY-MM-DD`) for `region` in `year`, sorted.
    pub async fn fetch_dates(&self, region: &str, year: i32) -> Result<Vec<String>, FetchError> {
        tracing::debug!(base_url = %self.base_url, region, year, "fetching holidays");
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("jahr", year.to_string()), ("nur_land", region.to_string())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::Api {
                message: format!("status {status}: {}", body.trim()),
            });
        }
        parse_holiday_response(&body)
    }
}

impl HolidayFetcher for Client {
    type Error = FetchError;

    async fn fetch(&self, region: &str, year: i32) -> Result<Vec<String>, FetchError> {
        self.fetch_dates(region, year).await
    }
}

/// Extracts holiday dates from an API response body.
///
/// Accepts the feiertage-api.de shape (`{"Neujahrstag": {"datum": "..."}}`)
/// as well as a plain array of date strings or of `{"date": "..."}` objects.
/// An API-level `{"error": ...}` object maps to [`FetchError::Api`].
pub fn parse_holiday_response(body: &str) -> Result<Vec<String>, FetchError> {
    let value: Value =
        serde_json::from_str(body).map_err(|err| FetchError::InvalidResponse(err.to_string()))?;
    if let Some(error) = value.get("error") {
        let message = error
            .as_str()
            .map_or_else(|| error.to_string(), str::to_string);
        return Err(FetchError::Api { message });
    }

    let mut dates: Vec<String> = match &value {
        Value::Object(map) => map
            .values()
            .filter_map(|holiday| field_str(holiday, "datum"))
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(date) => Some(date.clone()),
                other => field_str(other, "date").or_else(|| field_str(other, "datum")),
            })
            .collect(),
        _ => {
            return Err(FetchError::InvalidResponse(
                "expected an object or array of holidays".to_string(),
            ));
        }
    };
    if dates.is_empty() {
        return Err(FetchError::InvalidResponse("no holiday dates".to_string()));
    }
    dates.sort();
    dates.dedup();
    Ok(dates)
}

fn field_str(value: &Value, field: &str) -> Option<String> {
    value.get(field)?.as_str().map(str::to_string)
}
