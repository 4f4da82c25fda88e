//! Concurrent page fetching with per-page failure containment.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::model::RawReading;
use crate::ports::{FetchError, PagePort, PageRequest};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
/// How a single page fetch settled.
pub enum PageOutcome {
    /// Upstream delivered a well-formed page.
    Success,
    /// The page contributed nothing; the reason is advisory.
    Failed(String),
}

impl PageOutcome {
    /// Whether the page delivered data.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

#[derive(Debug, Clone)]
/// Readings and outcome of one settled page.
pub struct PageResult {
    /// 1-based page index.
    pub page: u32,
    /// Readings as delivered; always empty for a failed page.
    pub readings: Vec<RawReading>,
    /// Success or failure reason.
    pub outcome: PageOutcome,
}

/// Fetches one page and turns every failure into an empty, tagged result.
pub struct PageFetcher {
    port: Arc<dyn PagePort>,
    timeout: Duration,
}

impl PageFetcher {
    /// Create a fetcher bound to the given upstream port and per-page deadline.
    #[must_use]
    pub fn new(port: Arc<dyn PagePort>, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    /// Fetch page `page` of size `page_size`.
    ///
    /// Never fails: network errors, bad statuses, malformed bodies and
    /// timeouts all yield an empty reading list with [`PageOutcome::Failed`].
    pub async fn fetch_page(&self, page: u32, page_size: u32) -> PageResult {
        match self.try_fetch(PageRequest::new(page, page_size)).await {
            Ok(readings) => {
                debug!(
                    upstream = self.port.name(),
                    page,
                    count = readings.len(),
                    "page fetched"
                );
                PageResult {
                    page,
                    readings,
                    outcome: PageOutcome::Success,
                }
            }
            Err(err) => {
                warn!(upstream = self.port.name(), page, reason = %err, "page fetch failed");
                PageResult {
                    page,
                    readings: Vec::new(),
                    outcome: PageOutcome::Failed(err.to_string()),
                }
            }
        }
    }

    async fn try_fetch(&self, request: PageRequest) -> Result<Vec<RawReading>, FetchError> {
        request.validate()?;
        tokio::time::timeout(self.timeout, self.port.fetch_page(request))
            .await
            .map_err(|_elapsed| FetchError::Timeout)?
    }
}

/// Fans out over a fixed number of pages and merges whatever succeeded.
pub struct FetchOrchestrator {
    fetcher: PageFetcher,
}

impl FetchOrchestrator {
    /// Create an orchestrator around a page fetcher.
    #[must_use]
    pub fn new(fetcher: PageFetcher) -> Self {
        Self { fetcher }
    }

    /// Fetch pages `1..=page_count` concurrently and wait for all of them to settle.
    ///
    /// All page futures are polled from the calling task, so dropping the
    /// returned future cancels every page still in flight.
    pub async fn fetch_pages(&self, page_count: u32, page_size: u32) -> Vec<PageResult> {
        join_all((1..=page_count).map(|page| self.fetcher.fetch_page(page, page_size))).await
    }

    /// Fetch and merge all pages. Returns an empty list if every page failed.
    pub async fn fetch_all(&self, page_count: u32, page_size: u32) -> Vec<RawReading> {
        merge(self.fetch_pages(page_count, page_size).await)
    }
}

/// Concatenate the readings of every successful page.
#[must_use]
pub fn merge(results: Vec<PageResult>) -> Vec<RawReading> {
    results
        .into_iter()
        .filter(|result| result.outcome.is_success())
        .flat_map(|result| result.readings)
        .collect()
}
