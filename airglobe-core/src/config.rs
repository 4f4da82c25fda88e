//! Limits and deadlines applied to one pipeline invocation.

use std::time::Duration;

use crate::service::PipelineError;

/// Pages fetched per run when nothing else is configured.
pub const DEFAULT_PAGE_COUNT: u32 = 3;
/// Records requested per page when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Pipeline tuning shared by every invocation.
pub struct PipelineConfig {
    /// Default number of pages to fan out over.
    pub page_count: u32,
    /// Default number of records per page.
    pub page_size: u32,
    /// Upper bound for a caller-supplied page count.
    pub max_page_count: u32,
    /// Upper bound for a caller-supplied page size.
    pub max_page_size: u32,
    /// Deadline for a single page; a slower page counts as failed.
    pub page_timeout: Duration,
    /// Deadline for the whole run.
    pub request_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            page_count: DEFAULT_PAGE_COUNT,
            page_size: DEFAULT_PAGE_SIZE,
            max_page_count: 10,
            max_page_size: DEFAULT_PAGE_SIZE,
            page_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl PipelineConfig {
    /// Check that the configuration describes a runnable pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.page_count == 0 || self.max_page_count == 0 {
            return Err(PipelineError::InvalidConfig("page count must be at least 1".into()));
        }
        if self.page_size == 0 || self.max_page_size == 0 {
            return Err(PipelineError::InvalidConfig("page size must be at least 1".into()));
        }
        if self.page_count > self.max_page_count || self.page_size > self.max_page_size {
            return Err(PipelineError::InvalidConfig(
                "defaults exceed configured maxima".into(),
            ));
        }
        if self.page_timeout.is_zero() || self.request_timeout.is_zero() {
            return Err(PipelineError::InvalidConfig("timeouts must be non-zero".into()));
        }
        // A slow page must settle as failed before the run deadline can fire.
        if self.page_timeout >= self.request_timeout {
            return Err(PipelineError::InvalidConfig(
                "page timeout must be shorter than request timeout".into(),
            ));
        }
        Ok(())
    }

    /// Check a caller-supplied `(page_count, page_size)` pair against the maxima.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidRequest`] when either value is zero or too large.
    pub fn check_request(&self, page_count: u32, page_size: u32) -> Result<(), PipelineError> {
        if page_count == 0 || page_count > self.max_page_count {
            return Err(PipelineError::InvalidRequest(format!(
                "page count must be between 1 and {}",
                self.max_page_count
            )));
        }
        if page_size == 0 || page_size > self.max_page_size {
            return Err(PipelineError::InvalidRequest(format!(
                "page size must be between 1 and {}",
                self.max_page_size
            )));
        }
        Ok(())
    }
}
