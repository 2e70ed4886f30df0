// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! HTTP Event Receiver
//!
//! Accepts CloudEvents pushed by the platform's event distributor in both
//! content modes:
//!
//! - **structured**: the body is the whole envelope as JSON
//! - **binary**: attributes travel as `ce-*` headers, the body is `data`
//!
//! Recognized task events are acknowledged with `202 Accepted` and handled on
//! a task spawned through the caller's `TaskTracker`, so shutdown can wait for
//! in-flight invocations to send their `finished` event. Everything else is
//! rejected with `400`.

use crate::application::dispatch::{EventDispatcher, TaskEvent};
use crate::domain::events::{CloudEvent, CLOUD_EVENTS_SPEC_VERSION};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::task::TaskTracker;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

const BINARY_HEADER_PREFIX: &str = "ce-";

pub struct AppState {
    pub dispatcher: Arc<EventDispatcher>,
    /// Handlers of accepted events; drained on shutdown
    pub tasks: TaskTracker,
}

pub fn app(dispatcher: Arc<EventDispatcher>, receive_path: &str, tasks: TaskTracker) -> Router {
    let state = Arc::new(AppState { dispatcher, tasks });
    let receive_path = if receive_path.starts_with('/') {
        receive_path.to_string()
    } else {
        format!("/{}", receive_path)
    };

    Router::new()
        .route("/health", get(health))
        .route(&receive_path, post(receive_event))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": state.dispatcher.service_name(),
    }))
}

async fn receive_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let event = match decode_envelope(&headers, &body) {
        Ok(event) => event,
        Err(message) => {
            warn!(error = %message, "Rejected malformed CloudEvent");
            return bad_request(message);
        }
    };

    metrics::counter!("sli_adapter_events_received_total", "type" => event.event_type.clone())
        .increment(1);

    let task = match TaskEvent::from_cloud_event(&event) {
        Ok(task) => task,
        Err(e) => {
            warn!(event_type = %event.event_type, event_id = %event.id, error = %e, "Ignoring event");
            return bad_request(e.to_string());
        }
    };

    info!(event_type = %event.event_type, event_id = %event.id, "Accepted event");

    let dispatcher = state.dispatcher.clone();
    let event_id = event.id.clone();
    state.tasks.spawn(async move {
        if let Err(e) = dispatcher.dispatch(&event, task).await {
            error!(event_id = %event.id, error = %e, "Task event handling failed");
        }
    });

    (StatusCode::ACCEPTED, Json(json!({ "id": event_id }))).into_response()
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

/// Build the envelope from either content mode.
fn decode_envelope(headers: &HeaderMap, body: &[u8]) -> Result<CloudEvent, String> {
    if headers.contains_key("ce-id") || headers.contains_key("ce-specversion") {
        decode_binary(headers, body)
    } else {
        serde_json::from_slice(body).map_err(|e| format!("Invalid CloudEvent body: {}", e))
    }
}

fn decode_binary(headers: &HeaderMap, body: &[u8]) -> Result<CloudEvent, String> {
    let mut attributes: HashMap<String, String> = HashMap::new();
    for (name, value) in headers {
        if let Some(attribute) = name.as_str().strip_prefix(BINARY_HEADER_PREFIX) {
            let value = value
                .to_str()
                .map_err(|_| format!("Header {} is not valid text", name))?;
            attributes.insert(attribute.to_string(), value.to_string());
        }
    }

    let mut required = |name: &str| {
        attributes
            .remove(name)
            .ok_or_else(|| format!("Missing required header ce-{}", name))
    };
    let id = required("id")?;
    let source = required("source")?;
    let event_type = required("type")?;

    let mut event = CloudEvent::new(id, source, event_type);
    event.specversion = attributes
        .remove("specversion")
        .unwrap_or_else(|| CLOUD_EVENTS_SPEC_VERSION.to_string());
    event.time = attributes
        .remove("time")
        .map(|t| {
            DateTime::parse_from_rfc3339(&t)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| format!("Invalid ce-time '{}': {}", t, e))
        })
        .transpose()?;
    event.shkeptncontext = attributes.remove("shkeptncontext");
    event.triggeredid = attributes.remove("triggeredid");
    event.datacontenttype = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if !body.iter().all(u8::is_ascii_whitespace) {
        let data: Value =
            serde_json::from_slice(body).map_err(|e| format!("Invalid event data: {}", e))?;
        event.data = Some(data);
    }

    event.extensions = attributes
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect();

    Ok(event)
}
