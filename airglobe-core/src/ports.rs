//! Traits describing the upstream page source and shared helper types.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::model::RawReading;

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while fetching a single page from the upstream API.
pub enum FetchError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Upstream answered with a non-success status code.
    #[error("Upstream returned status {0}")]
    Status(u16),
    /// Response body did not have the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),
    /// The page did not settle within its deadline.
    #[error("Page timed out")]
    Timeout,
    /// Page index or size out of range.
    #[error("Invalid page request: {0}")]
    InvalidRequest(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// One page of a paginated upstream query.
pub struct PageRequest {
    /// 1-based page index.
    pub page: u32,
    /// Number of records per page.
    pub limit: u32,
}

impl PageRequest {
    /// Construct a new page request.
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Check the 1-based index and non-zero size constraints.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidRequest`] when either bound is violated.
    pub fn validate(&self) -> Result<(), FetchError> {
        if self.page == 0 {
            return Err(FetchError::InvalidRequest("page index is 1-based".into()));
        }
        if self.limit == 0 {
            return Err(FetchError::InvalidRequest("page size must be positive".into()));
        }
        Ok(())
    }
}

#[async_trait]
/// Trait for upstream backends that serve readings page by page.
pub trait PagePort: Send + Sync {
    /// Short name of the upstream, used in diagnostics.
    fn name(&self) -> &str;

    /// Fetch one page of raw readings.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the request fails or the body is malformed.
    async fn fetch_page(&self, request: PageRequest) -> Result<Vec<RawReading>, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_page_and_zero_limit() {
        assert!(matches!(
            PageRequest::new(0, 10).validate(),
            Err(FetchError::InvalidRequest(_))
        ));
        assert!(matches!(
            PageRequest::new(1, 0).validate(),
            Err(FetchError::InvalidRequest(_))
        ));
        assert!(PageRequest::new(1, 1).validate().is_ok());
    }
}
