// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Task Events
//!
//! CloudEvents 1.0 envelope exchanged with the orchestration platform, the
//! task names this service understands, and the outbound `EventSender` port.
//!
//! Event types follow `sh.keptn.event.<task>.<phase>`:
//!
//! ```text
//! sh.keptn.event.get-sli.triggered               -> handled
//! sh.keptn.event.get-sli.started                 <- emitted
//! sh.keptn.event.get-sli.finished                <- emitted
//! sh.keptn.event.configure-monitoring.triggered  -> handled
//! sh.keptn.event.monitoring.configure            -> handled (legacy CLI alias)
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;

pub const EVENT_TYPE_PREFIX: &str = "sh.keptn.event.";

/// Type still sent by older platform CLIs for configure-monitoring
pub const LEGACY_CONFIGURE_MONITORING_EVENT_TYPE: &str = "sh.keptn.event.monitoring.configure";

pub const CLOUD_EVENTS_SPEC_VERSION: &str = "1.0";

/// Tasks this service takes part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskName {
    GetSli,
    ConfigureMonitoring,
}

impl TaskName {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskName::GetSli => "get-sli",
            TaskName::ConfigureMonitoring => "configure-monitoring",
        }
    }

    pub fn triggered_event_type(&self) -> String {
        format!("{}{}.triggered", EVENT_TYPE_PREFIX, self.as_str())
    }

    pub fn started_event_type(&self) -> String {
        format!("{}{}.started", EVENT_TYPE_PREFIX, self.as_str())
    }

    pub fn finished_event_type(&self) -> String {
        format!("{}{}.finished", EVENT_TYPE_PREFIX, self.as_str())
    }
}

impl std::fmt::Display for TaskName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CloudEvents 1.0 envelope in structured JSON form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudEvent {
    #[serde(default = "default_spec_version")]
    pub specversion: String,

    pub id: String,

    pub source: String,

    #[serde(rename = "type")]
    pub event_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacontenttype: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,

    /// Correlation context shared by every event of one sequence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shkeptncontext: Option<String>,

    /// Id of the triggered event a started/finished event answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggeredid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Extension attributes not modelled above
    #[serde(flatten)]
    pub extensions: HashMap<String, serde_json::Value>,
}

fn default_spec_version() -> String {
    CLOUD_EVENTS_SPEC_VERSION.to_string()
}

impl CloudEvent {
    pub fn new(id: impl Into<String>, source: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            specversion: default_spec_version(),
            id: id.into(),
            source: source.into(),
            event_type: event_type.into(),
            datacontenttype: None,
            time: None,
            shkeptncontext: None,
            triggeredid: None,
            data: None,
            extensions: HashMap::new(),
        }
    }

    /// Attach a JSON payload as `data`.
    pub fn with_data<T: Serialize>(mut self, data: &T) -> Result<Self, serde_json::Error> {
        self.data = Some(serde_json::to_value(data)?);
        self.datacontenttype = Some("application/json".to_string());
        Ok(self)
    }

    /// Decode `data` into a task payload. A missing `data` decodes as `null`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.clone().unwrap_or(serde_json::Value::Null))
    }

    pub fn keptn_context(&self) -> &str {
        self.shkeptncontext.as_deref().unwrap_or_default()
    }
}

/// Raised when an outbound event could not be handed to the platform
#[derive(Debug, thiserror::Error)]
pub enum EventDeliveryError {
    #[error("Failed to encode event: {0}")]
    Encoding(String),

    #[error("Event broker unreachable: {0}")]
    Network(String),

    #[error("Event broker rejected event with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl From<serde_json::Error> for EventDeliveryError {
    fn from(err: serde_json::Error) -> Self {
        EventDeliveryError::Encoding(err.to_string())
    }
}

/// Outbound port to the platform's event broker
#[async_trait]
pub trait EventSender: Send + Sync {
    async fn send(&self, event: CloudEvent) -> Result<(), EventDeliveryError>;
}
