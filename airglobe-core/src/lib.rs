//! Core types and pipeline wiring for the airglobe air-quality aggregator.

/// Packaging of normalized points into the outward response shape.
pub mod assemble;
/// Severity bands and their display metadata.
pub mod classify;
/// Numeric limits and deadlines of one pipeline run.
pub mod config;
/// Concurrent page fetching with per-page failure containment.
pub mod fetch;
/// Upstream records and normalized measurement points.
pub mod model;
/// Validation and cleaning of upstream records.
pub mod normalize;
/// Traits describing the upstream page source.
pub mod ports;
/// High-level service facade used by clients.
pub mod service;

pub use assemble::*;
pub use classify::*;
pub use config::*;
pub use fetch::*;
pub use model::*;
pub use normalize::*;
pub use ports::*;
pub use service::*;
