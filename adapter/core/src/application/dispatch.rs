// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Event Dispatch
//!
//! Maps inbound envelopes onto a closed set of task events and routes each
//! to its use case.
//!
//! # Event Flow
//!
//! ```text
//! CloudEvent (HTTP receiver)
//!   |
//!   | TaskEvent::from_cloud_event  (type -> variant, data -> typed payload)
//!   v
//! EventDispatcher::dispatch
//!   |-- GetSliTriggered              -> GetSliUseCase
//!   '-- ConfigureMonitoringTriggered -> ConfigureMonitoringUseCase
//! ```

use crate::application::configure_monitoring::ConfigureMonitoringUseCase;
use crate::application::get_sli::{GetSliError, GetSliUseCase, SliRetrieval};
use crate::domain::events::{
    CloudEvent, EventDeliveryError, TaskName, LEGACY_CONFIGURE_MONITORING_EVENT_TYPE,
};
use crate::domain::sli::{ConfigureMonitoringTriggeredEventData, GetSliTriggeredEventData};
use std::sync::Arc;
use tracing::{info, info_span, Instrument};

/// A recognized inbound task event with its decoded payload
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    GetSliTriggered(GetSliTriggeredEventData),
    ConfigureMonitoringTriggered(ConfigureMonitoringTriggeredEventData),
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Unhandled event type: {0}")]
    UnhandledEventType(String),

    #[error("Invalid {event_type} payload: {source}")]
    InvalidPayload {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    GetSli(#[from] GetSliError),

    #[error("configure-monitoring failed: {0}")]
    ConfigureMonitoring(#[from] EventDeliveryError),
}

impl TaskEvent {
    /// Decode `event` into a task event.
    ///
    /// # Errors
    ///
    /// - UnhandledEventType: no task is registered for `event.type`
    /// - InvalidPayload: `data` does not match the task's payload shape
    pub fn from_cloud_event(event: &CloudEvent) -> Result<Self, DispatchError> {
        let event_type = event.event_type.as_str();

        if event_type == TaskName::GetSli.triggered_event_type() {
            return decode(event).map(TaskEvent::GetSliTriggered);
        }

        if event_type == TaskName::ConfigureMonitoring.triggered_event_type()
            || event_type == LEGACY_CONFIGURE_MONITORING_EVENT_TYPE
        {
            return decode(event).map(TaskEvent::ConfigureMonitoringTriggered);
        }

        Err(DispatchError::UnhandledEventType(event_type.to_string()))
    }

    pub fn task(&self) -> TaskName {
        match self {
            TaskEvent::GetSliTriggered(_) => TaskName::GetSli,
            TaskEvent::ConfigureMonitoringTriggered(_) => TaskName::ConfigureMonitoring,
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(event: &CloudEvent) -> Result<T, DispatchError> {
    event.data_as().map_err(|source| DispatchError::InvalidPayload {
        event_type: event.event_type.clone(),
        source,
    })
}

/// What a dispatched event produced
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    GetSli(SliRetrieval),
    ConfigureMonitoring,
}

/// Routes task events to their use cases
#[derive(Clone)]
pub struct EventDispatcher {
    service_name: String,
    get_sli: Arc<dyn GetSliUseCase>,
    configure_monitoring: Arc<dyn ConfigureMonitoringUseCase>,
}

impl EventDispatcher {
    pub fn new(
        service_name: impl Into<String>,
        get_sli: Arc<dyn GetSliUseCase>,
        configure_monitoring: Arc<dyn ConfigureMonitoringUseCase>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            get_sli,
            configure_monitoring,
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Run the use case for `task`. `trigger` is the envelope `task` was decoded from.
    pub async fn dispatch(
        &self,
        trigger: &CloudEvent,
        task: TaskEvent,
    ) -> Result<DispatchOutcome, DispatchError> {
        let span = info_span!(
            "task_event",
            service = %self.service_name,
            event_id = %trigger.id,
            keptn_context = %trigger.keptn_context(),
            task = %task.task(),
        );

        async move {
            info!(event_type = %trigger.event_type, "Processing task event");
            match task {
                TaskEvent::GetSliTriggered(data) => {
                    let retrieval = self.get_sli.handle(trigger, data).await?;
                    Ok(DispatchOutcome::GetSli(retrieval))
                }
                TaskEvent::ConfigureMonitoringTriggered(data) => {
                    self.configure_monitoring.handle(trigger, data).await?;
                    Ok(DispatchOutcome::ConfigureMonitoring)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Decode and dispatch in one step.
    pub async fn process(&self, event: &CloudEvent) -> Result<DispatchOutcome, DispatchError> {
        let task = TaskEvent::from_cloud_event(event)?;
        self.dispatch(event, task).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(event_type: &str, data: serde_json::Value) -> CloudEvent {
        let mut event = CloudEvent::new("e-1", "test", event_type);
        event.data = Some(data);
        event
    }

    #[test]
    fn test_get_sli_triggered_is_recognized() {
        let event = envelope(
            "sh.keptn.event.get-sli.triggered",
            json!({
                "project": "p", "stage": "s", "service": "svc",
                "get-sli": {"sliProvider": "datadog", "start": "1", "end": "2", "indicators": ["a"]}
            }),
        );
        let task = TaskEvent::from_cloud_event(&event).unwrap();
        assert_eq!(task.task(), TaskName::GetSli);
        match task {
            TaskEvent::GetSliTriggered(data) => assert_eq!(data.get_sli.indicators, vec!["a"]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_configure_monitoring_both_types() {
        for event_type in [
            "sh.keptn.event.configure-monitoring.triggered",
            "sh.keptn.event.monitoring.configure",
        ] {
            let event = envelope(event_type, json!({"project": "p", "service": "svc", "type": "datadog"}));
            let task = TaskEvent::from_cloud_event(&event).unwrap();
            assert_eq!(task.task(), TaskName::ConfigureMonitoring);
        }
    }

    #[test]
    fn test_unhandled_type() {
        let event = envelope("sh.keptn.event.deployment.triggered", json!({}));
        let err = TaskEvent::from_cloud_event(&event).unwrap_err();
        assert!(matches!(err, DispatchError::UnhandledEventType(t) if t == "sh.keptn.event.deployment.triggered"));
    }

    #[test]
    fn test_finished_events_are_not_tasks() {
        let event = envelope("sh.keptn.event.get-sli.finished", json!({}));
        assert!(TaskEvent::from_cloud_event(&event).is_err());
    }

    #[test]
    fn test_invalid_payload() {
        let event = envelope(
            "sh.keptn.event.get-sli.triggered",
            json!({"project": "p", "get-sli": {"indicators": "not-a-list"}}),
        );
        let err = TaskEvent::from_cloud_event(&event).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidPayload { .. }));
    }

    #[test]
    fn test_missing_data_is_invalid_for_get_sli() {
        let event = CloudEvent::new("e-2", "test", "sh.keptn.event.get-sli.triggered");
        assert!(matches!(
            TaskEvent::from_cloud_event(&event),
            Err(DispatchError::InvalidPayload { .. })
        ));
    }
}
