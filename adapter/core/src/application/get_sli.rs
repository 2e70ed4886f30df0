// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Get SLI Use Case
//!
//! Application service answering `sh.keptn.event.get-sli.triggered`.
//!
//! # DDD Pattern: Application Service
//!
//! - **Layer:** Application
//! - **Responsibility:** Collect one value per requested indicator and report
//!   the aggregate verdict
//! - **Collaborators:**
//!   - Domain: `QueryCatalogSource`, `MetricsBackend`, `EventSender` ports
//!   - Application: `TaskReporter`
//!
//! # Flow
//!
//! 1. Validate: skip silently unless `sliProvider` is ours
//! 2. Announce: send `get-sli.started` (failures are logged only)
//! 3. Parse the evaluation window (failure aborts without `finished`)
//! 4. Fetch the query catalog (failure sends an errored `finished`, then aborts)
//! 5. For each indicator, in order: wait the settling delay, resolve, query
//! 6. Aggregate: any query failure makes the task errored/failed
//! 7. Report: send `get-sli.finished`
//!
//! Indicators are fetched strictly one after another. The delay before each
//! query is a backend consistency requirement, not a rate limit.

use crate::application::task_reporter::TaskReporter;
use crate::domain::adapter_config::AdapterConfig;
use crate::domain::catalog::{CatalogError, QueryCatalog, QueryCatalogSource};
use crate::domain::events::{CloudEvent, EventDeliveryError, TaskName};
use crate::domain::metrics::{latest_value, MetricsBackend, MetricsError};
use crate::domain::query::resolve_query;
use crate::domain::sli::{
    EventData, GetSliFinished, GetSliFinishedEventData, GetSliTriggeredEventData, SliResult,
    TaskResult, TaskStatus,
};
use crate::domain::window::{EvaluationWindow, TimestampParseError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// How an invocation ended when it did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum SliRetrieval {
    /// Event addressed to another provider; nothing was sent
    Skipped,

    /// `get-sli.finished` was sent with this payload
    Completed(GetSliFinishedEventData),
}

/// Failures that escape the handler
#[derive(Debug, thiserror::Error)]
pub enum GetSliError {
    #[error("Malformed evaluation window: {0}")]
    MalformedWindow(#[from] TimestampParseError),

    #[error("Failed to fetch SLI file {resource}: {source}")]
    Catalog {
        resource: String,
        #[source]
        source: CatalogError,
    },

    #[error("Failed to send get-sli.finished event: {0}")]
    FinishedDelivery(#[source] EventDeliveryError),
}

/// Get SLI Use Case
#[async_trait]
pub trait GetSliUseCase: Send + Sync {
    /// Handle one get-sli.triggered event
    ///
    /// # Errors
    ///
    /// - MalformedWindow: `start` or `end` is neither RFC3339 nor epoch seconds
    /// - Catalog: the SLI document could not be fetched (an errored
    ///   `finished` event has already been sent)
    /// - FinishedDelivery: the final `finished` event could not be sent
    async fn handle(
        &self,
        trigger: &CloudEvent,
        data: GetSliTriggeredEventData,
    ) -> Result<SliRetrieval, GetSliError>;
}

/// Per-indicator failure; never escapes the fetch loop
#[derive(Debug, thiserror::Error)]
enum IndicatorError {
    #[error("no query defined in the SLI file")]
    MissingQuery,

    #[error(transparent)]
    Query(#[from] MetricsError),
}

/// Standard implementation of GetSliUseCase
pub struct StandardGetSliUseCase {
    config: AdapterConfig,
    reporter: TaskReporter,
    catalog_source: Arc<dyn QueryCatalogSource>,
    metrics_backend: Arc<dyn MetricsBackend>,
}

impl StandardGetSliUseCase {
    pub fn new(
        config: AdapterConfig,
        reporter: TaskReporter,
        catalog_source: Arc<dyn QueryCatalogSource>,
        metrics_backend: Arc<dyn MetricsBackend>,
    ) -> Self {
        Self {
            config,
            reporter,
            catalog_source,
            metrics_backend,
        }
    }

    /// Send `get-sli.started`. A delivery failure here does not stop the task.
    async fn announce(&self, trigger: &CloudEvent, data: &GetSliTriggeredEventData) {
        if let Err(e) = self.reporter.send_started(TaskName::GetSli, trigger, data).await {
            warn!(error = %e, "Failed to send get-sli.started event, continuing");
        }
    }

    async fn fetch_indicator(
        &self,
        indicator: &str,
        catalog: &QueryCatalog,
        scope: &EventData,
        window: &EvaluationWindow,
    ) -> Result<Option<SliResult>, IndicatorError> {
        let template = catalog
            .query_for(indicator)
            .ok_or(IndicatorError::MissingQuery)?;
        let query = resolve_query(template, scope, window);
        debug!(indicator, query = %query, "Querying metrics backend");

        let started = Instant::now();
        let series = self
            .metrics_backend
            .query_range(&query, window.start_epoch(), window.end_epoch())
            .await;
        metrics::histogram!("sli_adapter_indicator_query_seconds")
            .record(started.elapsed().as_secs_f64());

        Ok(latest_value(&series?).map(|value| SliResult::success(indicator, value)))
    }

    fn finished_payload(
        &self,
        data: &GetSliTriggeredEventData,
        status: TaskStatus,
        result: TaskResult,
        message: Option<String>,
        indicator_values: Vec<SliResult>,
    ) -> GetSliFinishedEventData {
        GetSliFinishedEventData {
            event_data: data.event_data.finished(status, result, message),
            get_sli: GetSliFinished {
                start: data.get_sli.start.clone(),
                end: data.get_sli.end.clone(),
                indicator_values,
            },
        }
    }
}

#[async_trait]
impl GetSliUseCase for StandardGetSliUseCase {
    async fn handle(
        &self,
        trigger: &CloudEvent,
        data: GetSliTriggeredEventData,
    ) -> Result<SliRetrieval, GetSliError> {
        // Step 1: Validate
        if data.get_sli.sli_provider != self.config.provider {
            info!(
                provider = %data.get_sli.sli_provider,
                "Not handling get-sli event as it is meant for another provider"
            );
            return Ok(SliRetrieval::Skipped);
        }

        info!(
            project = %data.event_data.project,
            stage = %data.event_data.stage,
            service = %data.event_data.service,
            indicators = data.get_sli.indicators.len(),
            "Handling get-sli.triggered event"
        );

        // Step 2: Announce
        self.announce(trigger, &data).await;

        // Step 3: Parse window. No finished event is sent on this path.
        let window = EvaluationWindow::parse(&data.get_sli.start, &data.get_sli.end)
            .inspect_err(|e| error!(error = %e, "Invalid evaluation window, aborting"))?;

        // Step 4: Resolve catalog
        let resource = self.config.sli_resource_path.as_str();
        let catalog = match self
            .catalog_source
            .fetch_query_catalog(
                &data.event_data.project,
                &data.event_data.stage,
                &data.event_data.service,
                resource,
            )
            .await
        {
            Ok(catalog) => catalog,
            Err(source) => {
                let message = format!("Failed to fetch SLI file {}: {}", resource, source);
                error!(error = %source, resource, "Failed to fetch SLI file from config repo");

                let payload = self.finished_payload(
                    &data,
                    TaskStatus::Errored,
                    TaskResult::Failed,
                    Some(message),
                    Vec::new(),
                );
                if let Err(e) = self
                    .reporter
                    .send_finished(TaskName::GetSli, trigger, &payload)
                    .await
                {
                    error!(error = %e, "Failed to send errored get-sli.finished event");
                }
                metrics::counter!("sli_adapter_tasks_finished_total", "task" => "get-sli", "status" => "errored")
                    .increment(1);

                return Err(GetSliError::Catalog {
                    resource: resource.to_string(),
                    source,
                });
            }
        };
        debug!(queries = catalog.len(), "Loaded SLI query catalog");

        // Step 5: Fetch loop
        let delay = self.config.settling_delay.as_duration();
        let mut indicator_values = Vec::with_capacity(data.get_sli.indicators.len());
        let mut failed = Vec::new();

        for indicator in &data.get_sli.indicators {
            tokio::time::sleep(delay).await;

            match self
                .fetch_indicator(indicator, &catalog, &data.event_data, &window)
                .await
            {
                Ok(Some(sli)) => {
                    info!(indicator = %indicator, value = sli.value, "Retrieved SLI value");
                    metrics::counter!("sli_adapter_indicator_queries_total", "outcome" => "success")
                        .increment(1);
                    indicator_values.push(sli);
                }
                Ok(None) => {
                    info!(indicator = %indicator, "Backend returned no data points");
                    metrics::counter!("sli_adapter_indicator_queries_total", "outcome" => "empty")
                        .increment(1);
                }
                Err(e) => {
                    let outcome = match e {
                        IndicatorError::MissingQuery => "missing",
                        IndicatorError::Query(_) => "error",
                    };
                    error!(indicator = %indicator, error = %e, "Failed to retrieve SLI value");
                    metrics::counter!("sli_adapter_indicator_queries_total", "outcome" => outcome)
                        .increment(1);
                    failed.push(indicator.as_str());
                }
            }
        }

        // Step 6: Aggregate
        let (status, result, message) = if failed.is_empty() {
            (TaskStatus::Succeeded, TaskResult::Pass, None)
        } else {
            (
                TaskStatus::Errored,
                TaskResult::Failed,
                Some(format!("Could not retrieve SLI values for: {}", failed.join(", "))),
            )
        };
        let payload = self.finished_payload(&data, status, result, message, indicator_values);

        // Step 7: Report
        self.reporter
            .send_finished(TaskName::GetSli, trigger, &payload)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send get-sli.finished event");
                GetSliError::FinishedDelivery(e)
            })?;

        let status_label = match status {
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Errored => "errored",
        };
        metrics::counter!("sli_adapter_tasks_finished_total", "task" => "get-sli", "status" => status_label)
            .increment(1);
        info!(
            status = status_label,
            values = payload.indicator_values().len(),
            "Finished get-sli task"
        );

        Ok(SliRetrieval::Completed(payload))
    }
}
