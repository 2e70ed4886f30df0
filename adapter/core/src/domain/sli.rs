// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! SLI Task Payloads
//!
//! Wire shapes of the `data` attribute carried by get-sli and
//! configure-monitoring events.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Task inputs (`*TriggeredEventData`) and outcomes (`*FinishedEventData`)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Terminal status of a task execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Succeeded,
    Errored,
}

/// Verdict reported alongside the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskResult {
    Pass,
    #[serde(rename = "fail")]
    Failed,
}

/// Fields shared by every task event payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    #[serde(default)]
    pub project: String,

    #[serde(default)]
    pub stage: String,

    #[serde(default)]
    pub service: String,

    /// Opaque pass-through context; absent means empty
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl EventData {
    /// Copy of the routing fields with a terminal status attached.
    pub fn finished(&self, status: TaskStatus, result: TaskResult, message: Option<String>) -> Self {
        Self {
            project: self.project.clone(),
            stage: self.stage.clone(),
            service: self.service.clone(),
            labels: self.labels.clone(),
            status: Some(status),
            result: Some(result),
            message,
        }
    }
}

/// `data` of `sh.keptn.event.get-sli.triggered`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetSliTriggeredEventData {
    #[serde(flatten)]
    pub event_data: EventData,

    #[serde(rename = "get-sli")]
    pub get_sli: GetSliTriggered,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetSliTriggered {
    /// Backend this request is meant for (e.g. "datadog")
    #[serde(default)]
    pub sli_provider: String,

    #[serde(default)]
    pub start: String,

    #[serde(default)]
    pub end: String,

    /// Ordered; determines the order of `indicatorValues`
    #[serde(default)]
    pub indicators: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_filters: Vec<SliFilter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliFilter {
    pub key: String,
    pub value: String,
}

/// One collected indicator value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliResult {
    pub metric: String,
    pub value: f64,
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SliResult {
    pub fn success(metric: impl Into<String>, value: f64) -> Self {
        Self {
            metric: metric.into(),
            value,
            success: true,
            message: None,
        }
    }
}

/// `data` of `sh.keptn.event.get-sli.finished`; built once per invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetSliFinishedEventData {
    #[serde(flatten)]
    pub event_data: EventData,

    #[serde(rename = "get-sli")]
    pub get_sli: GetSliFinished,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetSliFinished {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub indicator_values: Vec<SliResult>,
}

impl GetSliFinishedEventData {
    pub fn status(&self) -> Option<TaskStatus> {
        self.event_data.status
    }

    pub fn result(&self) -> Option<TaskResult> {
        self.event_data.result
    }

    pub fn indicator_values(&self) -> &[SliResult] {
        &self.get_sli.indicator_values
    }
}

/// `data` of `sh.keptn.event.configure-monitoring.triggered`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigureMonitoringTriggeredEventData {
    #[serde(flatten)]
    pub event_data: EventData,

    /// Monitoring type requested by the CLI (e.g. "datadog")
    #[serde(default, rename = "type")]
    pub monitoring_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_get_sli_triggered() {
        let data: GetSliTriggeredEventData = serde_json::from_value(json!({
            "project": "podtatohead",
            "stage": "hardening",
            "service": "helloservice",
            "labels": {"buildId": "build-17"},
            "get-sli": {
                "sliProvider": "datadog",
                "start": "2024-01-01T00:00:00Z",
                "end": "2024-01-01T00:05:00Z",
                "indicators": ["response_time_p95", "error_rate"]
            }
        }))
        .unwrap();

        assert_eq!(data.event_data.project, "podtatohead");
        assert_eq!(data.event_data.labels["buildId"], "build-17");
        assert_eq!(data.get_sli.sli_provider, "datadog");
        assert_eq!(data.get_sli.indicators, vec!["response_time_p95", "error_rate"]);
        assert!(data.get_sli.custom_filters.is_empty());
    }

    #[test]
    fn test_missing_labels_are_empty() {
        let data: GetSliTriggeredEventData = serde_json::from_value(json!({
            "project": "p", "stage": "s", "service": "svc",
            "get-sli": {"sliProvider": "datadog", "start": "1", "end": "2"}
        }))
        .unwrap();

        assert!(data.event_data.labels.is_empty());
        assert!(data.get_sli.indicators.is_empty());
    }

    #[test]
    fn test_finished_payload_shape() {
        let trigger = EventData {
            project: "p".into(),
            stage: "s".into(),
            service: "svc".into(),
            ..Default::default()
        };
        let finished = GetSliFinishedEventData {
            event_data: trigger.finished(TaskStatus::Succeeded, TaskResult::Pass, None),
            get_sli: GetSliFinished {
                start: "1".into(),
                end: "2".into(),
                indicator_values: vec![SliResult::success("throughput", 42.5)],
            },
        };

        let value = serde_json::to_value(&finished).unwrap();
        assert_eq!(value["status"], "succeeded");
        assert_eq!(value["result"], "pass");
        assert_eq!(value["project"], "p");
        assert!(value.get("labels").is_none());
        assert!(value.get("message").is_none());
        assert_eq!(value["get-sli"]["indicatorValues"][0]["metric"], "throughput");
        assert_eq!(value["get-sli"]["indicatorValues"][0]["value"], 42.5);
        assert_eq!(value["get-sli"]["indicatorValues"][0]["success"], true);
    }

    #[test]
    fn test_configure_monitoring_type_field() {
        let data: ConfigureMonitoringTriggeredEventData = serde_json::from_value(json!({
            "project": "p", "service": "svc", "type": "datadog"
        }))
        .unwrap();
        assert_eq!(data.monitoring_type, "datadog");
        assert_eq!(data.event_data.stage, "");
    }
}
