// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Datadog Metrics Backend Adapter
//
// Anti-Corruption Layer for the Datadog v1 timeseries query API
// (GET /api/v1/query?from=&to=&query=).

use crate::domain::metrics::{DataPoint, MetricSeries, MetricsBackend, MetricsError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_DATADOG_SITE: &str = "datadoghq.com";

pub struct DatadogClient {
    client: Client,
    api_url: String,
    api_key: String,
    app_key: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    series: Vec<DatadogSeries>,
}

#[derive(Deserialize)]
struct DatadogSeries {
    #[serde(default)]
    metric: Option<String>,
    #[serde(default)]
    pointlist: Vec<[Option<f64>; 2]>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<String>,
}

impl DatadogClient {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        app_key: impl Into<String>,
    ) -> Result<Self, MetricsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| MetricsError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
            app_key: app_key.into(),
        })
    }

    /// API base URL for a Datadog site, e.g. `datadoghq.eu` -> `https://api.datadoghq.eu`
    pub fn api_url_for_site(site: &str) -> String {
        format!("https://api.{}", site.trim().trim_end_matches('/'))
    }

    fn error_text(body: &str) -> String {
        serde_json::from_str::<ErrorResponse>(body)
            .ok()
            .filter(|e| !e.errors.is_empty())
            .map(|e| e.errors.join("; "))
            .unwrap_or_else(|| body.to_string())
    }
}

impl From<DatadogSeries> for MetricSeries {
    fn from(series: DatadogSeries) -> Self {
        // Datadog reports gaps as null values; those points carry no data.
        let points = series
            .pointlist
            .into_iter()
            .filter_map(|[timestamp, value]| {
                Some(DataPoint {
                    timestamp_ms: timestamp?,
                    value: value?,
                })
            })
            .collect();
        MetricSeries::new(series.metric, points)
    }
}

#[async_trait]
impl MetricsBackend for DatadogClient {
    async fn query_range(
        &self,
        query: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<MetricSeries>, MetricsError> {
        let url = format!("{}/api/v1/query", self.api_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .header("DD-API-KEY", &self.api_key)
            .header("DD-APPLICATION-KEY", &self.app_key)
            .header("Accept", "application/json")
            .query(&[
                ("from", start.to_string()),
                ("to", end.to_string()),
                ("query", query.to_string()),
            ])
            .send()
            .await
            .map_err(|e| MetricsError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = Self::error_text(&body);

            return Err(if status == 401 || status == 403 {
                MetricsError::Authentication(message)
            } else if status == 429 {
                MetricsError::RateLimited
            } else {
                MetricsError::Backend(format!("HTTP {}: {}", status, message))
            });
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| MetricsError::Decode(e.to_string()))?;

        if body.status.as_deref() == Some("error") {
            return Err(MetricsError::Query(
                body.error.unwrap_or_else(|| "query failed".to_string()),
            ));
        }

        Ok(body.series.into_iter().map(MetricSeries::from).collect())
    }
}
