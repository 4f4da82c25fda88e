//! Command-line and environment configuration for the server.

use std::time::Duration;

use airglobe_core::{DEFAULT_PAGE_COUNT, DEFAULT_PAGE_SIZE, PipelineConfig, PipelineError};
use airglobe_provider_openaq::{DEFAULT_BASE_URL, DEFAULT_PARAMETER_ID, OpenAqSettings};
use clap::Parser;

/// Every flag falls back to an environment variable.
#[derive(Debug, Clone, Parser)]
#[command(name = "airglobe-server", version, about = "Serve normalized air-quality points")]
pub struct Args {
    /// OpenAQ API key.
    #[arg(long, env = "OPENAQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// OpenAQ API root.
    #[arg(long, env = "OPENAQ_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// OpenAQ parameter id (2 is PM2.5).
    #[arg(long, env = "OPENAQ_PARAMETER_ID", default_value_t = DEFAULT_PARAMETER_ID)]
    pub parameter_id: u32,

    /// Pages fetched per request.
    #[arg(long, env = "AIRGLOBE_PAGES", default_value_t = DEFAULT_PAGE_COUNT)]
    pub pages: u32,

    /// Records per page.
    #[arg(long, env = "AIRGLOBE_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Largest page count a request may ask for.
    #[arg(long, env = "AIRGLOBE_MAX_PAGES", default_value_t = 10)]
    pub max_pages: u32,

    /// Largest page size a request may ask for.
    #[arg(long, env = "AIRGLOBE_MAX_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub max_page_size: u32,

    /// Deadline for a single upstream page, in seconds.
    #[arg(long, env = "AIRGLOBE_PAGE_TIMEOUT_SECS", default_value_t = 10)]
    pub page_timeout_secs: u64,

    /// Deadline for a whole request, in seconds.
    #[arg(long, env = "AIRGLOBE_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Interface to listen on.
    #[arg(long, env = "AIRGLOBE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,
}

impl Args {
    /// Pipeline limits derived from the flags.
    #[must_use]
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            page_count: self.pages,
            page_size: self.page_size,
            max_page_count: self.max_pages,
            max_page_size: self.max_page_size,
            page_timeout: Duration::from_secs(self.page_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    /// Upstream connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingApiKey`] when no key was given.
    pub fn openaq_settings(&self) -> Result<OpenAqSettings, PipelineError> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(PipelineError::MissingApiKey)?;

        Ok(OpenAqSettings {
            base_url: self.base_url.clone(),
            parameter_id: self.parameter_id,
            api_key: api_key.to_owned(),
        })
    }

    /// `host:port` string to bind.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
