// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Metrics Backend
//!
//! Domain interface for time-series backends. Isolates the SLI handler from
//! vendor query APIs; implementations live in `infrastructure/`.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Anti-Corruption Layer for metrics query APIs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Domain interface for metrics backends
#[async_trait]
pub trait MetricsBackend: Send + Sync {
    /// Run `query` over `[start, end]` (Unix epoch seconds).
    async fn query_range(
        &self,
        query: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<MetricSeries>, MetricsError>;
}

/// One series returned by a range query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    /// Backend-side metric name, when reported
    pub metric: Option<String>,

    /// Points in ascending timestamp order
    pub points: Vec<DataPoint>,
}

impl MetricSeries {
    pub fn new(metric: Option<String>, points: Vec<DataPoint>) -> Self {
        Self { metric, points }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: f64,
    pub value: f64,
}

/// Most recent point of the first series, if there is one.
pub fn latest_value(series: &[MetricSeries]) -> Option<f64> {
    series
        .first()
        .and_then(|s| s.points.last())
        .map(|point| point.value)
}

/// Errors that can occur while querying a backend
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Query rejected: {0}")]
    Query(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}
