//! Page source implementation for the OpenAQ v3 "latest by parameter" API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use airglobe_core::{
    model::RawReading,
    ports::{FetchError, PagePort, PageRequest},
    service::PipelineError,
};

/// Public OpenAQ v3 API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openaq.org/v3";
/// OpenAQ parameter id for PM2.5.
pub const DEFAULT_PARAMETER_ID: u32 = 2;

const API_KEY_HEADER: &str = "X-API-Key";
const USER_AGENT: &str = concat!("airglobe/", env!("CARGO_PKG_VERSION"));

/// Response wrapper from /parameters/{id}/latest
#[derive(Debug, Deserialize)]
struct LatestResponse {
    // entries are decoded one by one so a stray non-object cannot fail the page
    results: Vec<Value>,
    // "meta" carries found/page/limit, nothing we rely on
}

#[derive(Debug, Clone)]
/// Connection settings for the OpenAQ API.
pub struct OpenAqSettings {
    /// API root without trailing slash.
    pub base_url: String,
    /// Pollutant parameter to query.
    pub parameter_id: u32,
    /// Key sent in the `X-API-Key` header.
    pub api_key: String,
}

impl OpenAqSettings {
    /// Settings for the public API with the default parameter.
    #[must_use]
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            parameter_id: DEFAULT_PARAMETER_ID,
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/parameters/{}/latest",
            self.base_url.trim_end_matches('/'),
            self.parameter_id
        )
    }
}

/// Page port fetching latest measurements from OpenAQ.
pub struct OpenAqPagePort {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl OpenAqPagePort {
    /// Create a new page port bound to the given HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingApiKey`] when the key is blank.
    pub fn new(client: Client, settings: &OpenAqSettings) -> Result<Self, PipelineError> {
        let api_key = settings.api_key.trim();
        if api_key.is_empty() {
            return Err(PipelineError::MissingApiKey);
        }

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint: settings.endpoint(),
        })
    }
}

#[async_trait]
impl PagePort for OpenAqPagePort {
    fn name(&self) -> &str {
        "openaq"
    }

    async fn fetch_page(&self, request: PageRequest) -> Result<Vec<RawReading>, FetchError> {
        let req = self
            .client
            .get(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("limit", request.limit), ("page", request.page)]);

        let latest = fetch_json::<LatestResponse>(req).await?;
        let received = latest.results.len();
        let readings: Vec<RawReading> = latest
            .results
            .into_iter()
            .filter_map(RawReading::from_value)
            .collect();
        debug!(
            page = request.page,
            received,
            skipped = received.saturating_sub(readings.len()),
            "openaq page decoded"
        );

        Ok(readings)
    }
}

/// Build the shared HTTP client used for upstream requests.
///
/// # Errors
///
/// Returns [`PipelineError::Client`] if the TLS backend cannot be initialized.
pub fn client() -> Result<Client, PipelineError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|err| PipelineError::Client(err.to_string()))
}

/// Build the page port for the OpenAQ provider.
///
/// # Errors
///
/// Returns [`PipelineError::MissingApiKey`] when the key is blank.
pub fn page_port(
    client: Client,
    settings: &OpenAqSettings,
) -> Result<Arc<dyn PagePort>, PipelineError> {
    Ok(Arc::new(OpenAqPagePort::new(client, settings)?))
}

// Small helper to fetch and decode JSON, keeping status and shape errors apart.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, FetchError> {
    let response = req.send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|err| FetchError::Decode(err.to_string()))
}
