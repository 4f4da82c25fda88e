//! HTTP boundary for the airglobe pipeline.

/// Routes, handlers and shared state.
pub mod api;
/// Command-line and environment configuration.
pub mod config;

use airglobe_core::{AirQualityService, PipelineError};
use airglobe_provider_openaq as openaq;

pub use api::{AppState, build_router};
pub use config::Args;

/// Wire the OpenAQ page port into a pipeline service.
///
/// # Errors
///
/// Returns a [`PipelineError`] for a missing API key, unusable limits, or a
/// client that cannot be built.
pub fn build_service(args: &Args) -> Result<AirQualityService, PipelineError> {
    let settings = args.openaq_settings()?;
    let port = openaq::page_port(openaq::client()?, &settings)?;
    AirQualityService::new(port, args.pipeline_config())
}
