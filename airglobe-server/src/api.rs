//! HTTP routes exposing the pipeline output.

use std::sync::Arc;

use airglobe_core::{
    AirQualityService, Annotation, AssembledPoint, PipelineError, PipelineReport, assemble,
};
use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Pipeline facade.
    pub service: Arc<AirQualityService>,
}

impl AppState {
    /// Wrap a service for use by the router.
    #[must_use]
    pub fn new(service: AirQualityService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Optional per-request overrides of the configured defaults.
#[derive(Debug, Default, Deserialize)]
pub struct AirQualityQuery {
    /// Number of upstream pages.
    pub pages: Option<u32>,
    /// Records per upstream page.
    pub page_size: Option<u32>,
    /// Attach severity and color to each point (default true).
    pub annotate: Option<bool>,
}

impl AirQualityQuery {
    fn resolve(&self, service: &AirQualityService) -> (u32, u32) {
        let config = service.config();
        (
            self.pages.unwrap_or(config.page_count),
            self.page_size.unwrap_or(config.page_size),
        )
    }

    fn annotation(&self) -> Annotation {
        if self.annotate.unwrap_or(true) {
            Annotation::Severity
        } else {
            Annotation::None
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok".
    pub status: String,
    /// Module name.
    pub module: String,
    /// Crate version.
    pub version: String,
}

/// Error body for non-success responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human readable reason.
    pub error: String,
}

/// Pipeline-level failure mapped onto an HTTP status.
#[derive(Debug)]
pub struct ApiError(pub PipelineError);

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(PipelineError::InvalidRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            PipelineError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            PipelineError::MissingApiKey
            | PipelineError::InvalidConfig(_)
            | PipelineError::DeadlineExceeded
            | PipelineError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self.0, "air-quality request failed");
        }
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// GET /api/air-quality
///
/// Always 200 with a (possibly empty) point array unless the pipeline itself
/// could not run.
pub async fn air_quality(
    State(state): State<AppState>,
    query: Result<Query<AirQualityQuery>, QueryRejection>,
) -> Result<Json<Vec<AssembledPoint>>, ApiError> {
    let Query(query) = query?;
    let (pages, page_size) = query.resolve(&state.service);
    let points = state.service.points(pages, page_size).await?;
    Ok(Json(assemble(points, query.annotation())))
}

/// GET /api/air-quality/report
///
/// Same run as `/api/air-quality`, with per-page outcomes attached.
pub async fn air_quality_report(
    State(state): State<AppState>,
    query: Result<Query<AirQualityQuery>, QueryRejection>,
) -> Result<Json<PipelineReport>, ApiError> {
    let Query(query) = query?;
    let (pages, page_size) = query.resolve(&state.service);
    Ok(Json(state.service.report(pages, page_size).await?))
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
        module: env!("CARGO_PKG_NAME").to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
    })
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/air-quality", get(air_quality))
        .route("/api/air-quality/report", get(air_quality_report))
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
