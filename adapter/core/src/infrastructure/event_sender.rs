// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Event Senders
//!
//! `EventSender` implementations:
//! - **HttpEventSender** - POSTs structured CloudEvents to the platform's event broker
//! - **InMemoryEventSender** - records events; used by tests and dry runs

use crate::domain::events::{CloudEvent, EventDeliveryError, EventSender};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_EVENT_BROKER_URL: &str = "http://localhost:8081/event";

const CLOUD_EVENTS_JSON: &str = "application/cloudevents+json";

pub struct HttpEventSender {
    client: Client,
    broker_url: String,
}

impl HttpEventSender {
    pub fn new(broker_url: impl Into<String>) -> Result<Self, EventDeliveryError> {
        Self::with_timeout(broker_url, Duration::from_secs(30))
    }

    pub fn with_timeout(broker_url: impl Into<String>, timeout: Duration) -> Result<Self, EventDeliveryError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EventDeliveryError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            broker_url: broker_url.into(),
        })
    }
}

#[async_trait]
impl EventSender for HttpEventSender {
    async fn send(&self, event: CloudEvent) -> Result<(), EventDeliveryError> {
        let body = serde_json::to_vec(&event)?;

        let response = self
            .client
            .post(&self.broker_url)
            .header(reqwest::header::CONTENT_TYPE, CLOUD_EVENTS_JSON)
            .body(body)
            .send()
            .await
            .map_err(|e| EventDeliveryError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EventDeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(event_type = %event.event_type, event_id = %event.id, "Sent event to broker");
        Ok(())
    }
}

/// Records every event instead of delivering it.
#[derive(Clone, Default)]
pub struct InMemoryEventSender {
    events: Arc<RwLock<Vec<CloudEvent>>>,
    fail_all: bool,
    fail_types: Vec<String>,
}

impl InMemoryEventSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender rejecting every event
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// Reject events of `event_type`, record the rest
    pub fn fail_on(mut self, event_type: impl Into<String>) -> Self {
        self.fail_types.push(event_type.into());
        self
    }

    /// Events recorded so far, in send order
    pub fn sent_events(&self) -> Vec<CloudEvent> {
        self.events
            .read()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn sent_types(&self) -> Vec<String> {
        self.sent_events()
            .into_iter()
            .map(|event| event.event_type)
            .collect()
    }
}

#[async_trait]
impl EventSender for InMemoryEventSender {
    async fn send(&self, event: CloudEvent) -> Result<(), EventDeliveryError> {
        if self.fail_all || self.fail_types.iter().any(|t| t == &event.event_type) {
            return Err(EventDeliveryError::Network(format!(
                "delivery of {} refused",
                event.event_type
            )));
        }

        self.events
            .write()
            .map_err(|_| EventDeliveryError::Network("event log lock poisoned".to_string()))?
            .push(event);
        Ok(())
    }
}
