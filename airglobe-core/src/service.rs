//! High-level service facade running the fetch, normalize and report pipeline.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::PipelineConfig;
use crate::fetch::{FetchOrchestrator, PageFetcher, PageOutcome, PageResult, merge};
use crate::model::NormalizedPoint;
use crate::normalize::normalize;
use crate::ports::PagePort;

#[derive(thiserror::Error, Debug)]
/// Failures that prevent the pipeline from being attempted at all.
///
/// Page-level problems never show up here; they only reduce the point count.
pub enum PipelineError {
    /// No upstream API key was configured.
    #[error("Missing upstream API key")]
    MissingApiKey,
    /// Pipeline configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// Caller asked for a page count or size outside the allowed bounds.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// The run as a whole exceeded its deadline.
    #[error("Pipeline deadline exceeded")]
    DeadlineExceeded,
    /// The upstream client could not be constructed.
    #[error("Client setup failed: {0}")]
    Client(String),
}

#[derive(Debug, Clone, Serialize)]
/// Outcome of one page within a run.
pub struct PageSummary {
    /// 1-based page index.
    pub page: u32,
    /// Success or failure reason.
    pub outcome: PageOutcome,
    /// Raw records delivered by the page.
    pub received: usize,
}

impl From<&PageResult> for PageSummary {
    fn from(result: &PageResult) -> Self {
        Self {
            page: result.page,
            outcome: result.outcome.clone(),
            received: result.readings.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
/// Everything one pipeline run produced.
pub struct PipelineReport {
    /// Validated points.
    pub points: Vec<NormalizedPoint>,
    /// Per-page outcomes, ordered by page index.
    pub pages: Vec<PageSummary>,
    /// Raw records merged from successful pages.
    pub raw_count: usize,
    /// Raw records rejected by validation.
    pub dropped: usize,
    /// When the run finished.
    pub fetched_at: DateTime<Utc>,
}

impl PipelineReport {
    /// Number of pages that delivered data.
    #[must_use]
    pub fn successful_pages(&self) -> usize {
        self.pages
            .iter()
            .filter(|summary| summary.outcome.is_success())
            .count()
    }
}

/// Public entry point for fetching normalized air-quality points.
pub struct AirQualityService {
    orchestrator: FetchOrchestrator,
    config: PipelineConfig,
}

impl AirQualityService {
    /// Create a new service bound to the provided upstream port.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] when `config` is unusable.
    pub fn new(port: Arc<dyn PagePort>, config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let fetcher = PageFetcher::new(port, config.page_timeout);
        Ok(Self {
            orchestrator: FetchOrchestrator::new(fetcher),
            config,
        })
    }

    /// Configuration this service runs with.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline and return the points along with per-page outcomes.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidRequest`] for out-of-bounds arguments and
    /// [`PipelineError::DeadlineExceeded`] when the whole run takes too long.
    /// Failed pages are reported in [`PipelineReport::pages`], not as errors.
    pub async fn report(
        &self,
        page_count: u32,
        page_size: u32,
    ) -> Result<PipelineReport, PipelineError> {
        self.config.check_request(page_count, page_size)?;

        let results = tokio::time::timeout(
            self.config.request_timeout,
            self.orchestrator.fetch_pages(page_count, page_size),
        )
        .await
        .map_err(|_elapsed| PipelineError::DeadlineExceeded)?;

        let mut pages: Vec<PageSummary> = results.iter().map(PageSummary::from).collect();
        pages.sort_by_key(|summary| summary.page);

        let raw = merge(results);
        let raw_count = raw.len();
        let points = normalize(raw);
        let dropped = raw_count.saturating_sub(points.len());

        let report = PipelineReport {
            points,
            pages,
            raw_count,
            dropped,
            fetched_at: Utc::now(),
        };

        info!(
            pages_ok = report.successful_pages(),
            pages_total = report.pages.len(),
            raw = raw_count,
            kept = report.points.len(),
            dropped,
            "pipeline run finished"
        );

        Ok(report)
    }

    /// Run the pipeline and return only the validated points.
    ///
    /// # Errors
    ///
    /// See [`AirQualityService::report`].
    pub async fn points(
        &self,
        page_count: u32,
        page_size: u32,
    ) -> Result<Vec<NormalizedPoint>, PipelineError> {
        Ok(self.report(page_count, page_size).await?.points)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::classify::{SeverityBand, classify};
    use crate::model::RawReading;
    use crate::ports::{FetchError, PageRequest};

    struct FirstPageOnly {
        readings: Vec<RawReading>,
    }

    #[async_trait]
    impl PagePort for FirstPageOnly {
        fn name(&self) -> &str {
            "first-page-only"
        }

        async fn fetch_page(&self, request: PageRequest) -> Result<Vec<RawReading>, FetchError> {
            if request.page == 1 {
                Ok(self.readings.clone())
            } else {
                Err(FetchError::Status(500))
            }
        }
    }

    struct Stalled;

    #[async_trait]
    impl PagePort for Stalled {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn fetch_page(&self, _request: PageRequest) -> Result<Vec<RawReading>, FetchError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }
    }

    fn two_readings() -> Arc<FirstPageOnly> {
        Arc::new(FirstPageOnly {
            readings: vec![
                RawReading::new(Some((10.0, 20.0)), 30.0, Some("42")),
                RawReading::new(None, 5.0, Some("43")),
            ],
        })
    }

    #[tokio::test]
    async fn partial_page_loss_yields_surviving_point() {
        let service =
            AirQualityService::new(two_readings(), PipelineConfig::default()).expect("valid");

        let report = service.report(2, 2).await.expect("pipeline runs");

        assert_eq!(
            report.points,
            vec![NormalizedPoint {
                lat: 10.0,
                lng: 20.0,
                city: "Location 42".to_owned(),
                value: 30.0,
            }]
        );
        assert_eq!(classify(30.0), SeverityBand::Moderate);
        assert_eq!(report.raw_count, 2);
        assert_eq!(report.dropped, 1);
        assert_eq!(report.successful_pages(), 1);
        assert_eq!(report.pages.len(), 2);
        assert!(!report.pages.iter().any(|page| page.page == 2 && page.outcome.is_success()));
    }

    #[tokio::test]
    async fn repeated_runs_are_identical() {
        let service =
            AirQualityService::new(two_readings(), PipelineConfig::default()).expect("valid");

        let first = service.points(3, 10).await.expect("first run");
        let second = service.points(3, 10).await.expect("second run");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn rejects_out_of_bounds_requests() {
        let service =
            AirQualityService::new(two_readings(), PipelineConfig::default()).expect("valid");

        assert!(matches!(
            service.points(0, 10).await,
            Err(PipelineError::InvalidRequest(_))
        ));
    }

    #[test]
    fn refuses_invalid_config() {
        let config = PipelineConfig {
            page_size: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            AirQualityService::new(two_readings(), config),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    /// Pages 1 and 3 answer at once, page 2 stalls longer than the run deadline.
    struct OneSlowPage;

    #[async_trait]
    impl PagePort for OneSlowPage {
        fn name(&self) -> &str {
            "one-slow-page"
        }

        async fn fetch_page(&self, request: PageRequest) -> Result<Vec<RawReading>, FetchError> {
            if request.page == 2 {
                tokio::time::sleep(Duration::from_secs(45)).await;
            }
            let value = f64::from(request.page);
            Ok(vec![RawReading::new(Some((value, value)), value, None)])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_page_never_sinks_healthy_pages() {
        let config = PipelineConfig {
            page_timeout: Duration::from_secs(20),
            request_timeout: Duration::from_secs(30),
            ..PipelineConfig::default()
        };
        let service = AirQualityService::new(Arc::new(OneSlowPage), config).expect("valid");

        let report = service.report(3, 10).await.expect("pipeline runs");

        let mut values: Vec<f64> = report.points.iter().map(|point| point.value).collect();
        values.sort_by(f64::total_cmp);
        assert_eq!(values, [1.0, 3.0]);
        assert_eq!(report.successful_pages(), 2);
    }

    #[test]
    fn refuses_page_timeout_beyond_run_deadline() {
        let config = PipelineConfig {
            page_timeout: Duration::from_secs(60),
            request_timeout: Duration::from_secs(30),
            ..PipelineConfig::default()
        };
        assert!(matches!(
            AirQualityService::new(Arc::new(OneSlowPage), config),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn caller_cancellation_drops_outstanding_pages() {
        let config = PipelineConfig {
            page_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(20),
            ..PipelineConfig::default()
        };
        let service = AirQualityService::new(Arc::new(Stalled), config).expect("valid");

        let started = tokio::time::Instant::now();
        let outcome = tokio::time::timeout(Duration::from_secs(1), service.points(3, 10)).await;

        assert!(outcome.is_err());
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn all_pages_stalling_is_empty_not_an_error() {
        let config = PipelineConfig {
            page_timeout: Duration::from_secs(1),
            ..PipelineConfig::default()
        };
        let service = AirQualityService::new(Arc::new(Stalled), config).expect("valid");

        let report = service.report(3, 10).await.expect("pipeline runs");
        assert!(report.points.is_empty());
        assert_eq!(report.successful_pages(), 0);
    }
}
