// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Task Reporter
//!
//! Builds the started/finished envelopes answering a triggered event and
//! hands them to the `EventSender`.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Collaborators:** `EventSender` (infrastructure)

use crate::domain::events::{CloudEvent, EventDeliveryError, EventSender, TaskName};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub struct TaskReporter {
    sender: Arc<dyn EventSender>,
    source: String,
}

impl TaskReporter {
    pub fn new(sender: Arc<dyn EventSender>, source: impl Into<String>) -> Self {
        Self {
            sender,
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Emit `<task>.started` for `trigger`.
    pub async fn send_started<T: Serialize + Sync>(
        &self,
        task: TaskName,
        trigger: &CloudEvent,
        payload: &T,
    ) -> Result<(), EventDeliveryError> {
        let event = self.reply(task.started_event_type(), trigger, payload)?;
        self.sender.send(event).await
    }

    /// Emit `<task>.finished` for `trigger`.
    pub async fn send_finished<T: Serialize + Sync>(
        &self,
        task: TaskName,
        trigger: &CloudEvent,
        payload: &T,
    ) -> Result<(), EventDeliveryError> {
        let event = self.reply(task.finished_event_type(), trigger, payload)?;
        self.sender.send(event).await
    }

    fn reply<T: Serialize>(
        &self,
        event_type: String,
        trigger: &CloudEvent,
        payload: &T,
    ) -> Result<CloudEvent, EventDeliveryError> {
        let mut event = CloudEvent::new(Uuid::new_v4().to_string(), self.source.clone(), event_type)
            .with_data(payload)?;
        event.time = Some(Utc::now());
        event.shkeptncontext = trigger.shkeptncontext.clone();
        event.triggeredid = Some(trigger.id.clone());

        debug!(
            event_type = %event.event_type,
            triggered_id = %trigger.id,
            "Prepared task reply"
        );
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::event_sender::InMemoryEventSender;
    use serde_json::json;

    #[tokio::test]
    async fn test_reply_links_to_trigger() {
        let sender = Arc::new(InMemoryEventSender::new());
        let reporter = TaskReporter::new(sender.clone(), "datadog-service");

        let mut trigger = CloudEvent::new("trigger-1", "lighthouse-service", "sh.keptn.event.get-sli.triggered");
        trigger.shkeptncontext = Some("ctx-1".to_string());

        reporter
            .send_started(TaskName::GetSli, &trigger, &json!({"project": "p"}))
            .await
            .unwrap();
        reporter
            .send_finished(TaskName::GetSli, &trigger, &json!({"status": "succeeded"}))
            .await
            .unwrap();

        let sent = sender.sent_events();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].event_type, "sh.keptn.event.get-sli.started");
        assert_eq!(sent[1].event_type, "sh.keptn.event.get-sli.finished");
        for event in &sent {
            assert_eq!(event.source, "datadog-service");
            assert_eq!(event.triggeredid.as_deref(), Some("trigger-1"));
            assert_eq!(event.keptn_context(), "ctx-1");
            assert!(event.time.is_some());
            assert_ne!(event.id, "trigger-1");
        }
        assert_ne!(sent[0].id, sent[1].id);
        assert_eq!(sent[1].data.as_ref().unwrap()["status"], "succeeded");
    }
}
