// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sli_adapter_core::application::configure_monitoring::ConfigureMonitoringUseCase;
use sli_adapter_core::application::dispatch::EventDispatcher;
use sli_adapter_core::application::get_sli::{GetSliError, GetSliUseCase, SliRetrieval};
use sli_adapter_core::domain::events::{CloudEvent, EventDeliveryError};
use sli_adapter_core::domain::sli::{
    ConfigureMonitoringTriggeredEventData, EventData, GetSliTriggeredEventData,
};
use sli_adapter_core::presentation::api::app;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::task::TaskTracker;
use tower::ServiceExt;

/// Handled task, as seen by the use cases: (trigger id, keptn context, detail)
type Seen = (String, String, String);

struct RecordingGetSli {
    seen: mpsc::UnboundedSender<Seen>,
    /// Simulated settling delay before the handler records anything
    delay: Duration,
}

#[async_trait]
impl GetSliUseCase for RecordingGetSli {
    async fn handle(
        &self,
        trigger: &CloudEvent,
        data: GetSliTriggeredEventData,
    ) -> Result<SliRetrieval, GetSliError> {
        tokio::time::sleep(self.delay).await;
        let _ = self.seen.send((
            trigger.id.clone(),
            trigger.keptn_context().to_string(),
            data.get_sli.indicators.join(","),
        ));
        Ok(SliRetrieval::Skipped)
    }
}

struct RecordingConfigureMonitoring {
    seen: mpsc::UnboundedSender<Seen>,
}

#[async_trait]
impl ConfigureMonitoringUseCase for RecordingConfigureMonitoring {
    async fn handle(
        &self,
        trigger: &CloudEvent,
        data: ConfigureMonitoringTriggeredEventData,
    ) -> Result<EventData, EventDeliveryError> {
        let _ = self.seen.send((
            trigger.id.clone(),
            trigger.keptn_context().to_string(),
            data.monitoring_type.clone(),
        ));
        Ok(data.event_data)
    }
}

fn router_with(
    receive_path: &str,
    get_sli_delay: Duration,
    tasks: TaskTracker,
) -> (Router, mpsc::UnboundedReceiver<Seen>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let dispatcher = EventDispatcher::new(
        "datadog-service",
        Arc::new(RecordingGetSli {
            seen: tx.clone(),
            delay: get_sli_delay,
        }),
        Arc::new(RecordingConfigureMonitoring { seen: tx }),
    );
    (app(Arc::new(dispatcher), receive_path, tasks), rx)
}

fn router(receive_path: &str) -> (Router, mpsc::UnboundedReceiver<Seen>) {
    router_with(receive_path, Duration::ZERO, TaskTracker::new())
}

fn get_sli_triggered(id: &str) -> Value {
    json!({
        "specversion": "1.0",
        "id": id,
        "source": "lighthouse-service",
        "type": "sh.keptn.event.get-sli.triggered",
        "shkeptncontext": "ctx-1",
        "data": {
            "project": "sockshop",
            "stage": "staging",
            "service": "carts",
            "get-sli": {
                "sliProvider": "datadog",
                "start": "2024-01-01T00:00:00Z",
                "end": "2024-01-01T00:05:00Z",
                "indicators": ["response_time_p95", "error_rate"]
            }
        }
    })
}

fn structured(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/cloudevents+json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn next_seen(rx: &mut mpsc::UnboundedReceiver<Seen>) -> Seen {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("handler was not invoked")
        .expect("channel closed")
}

#[tokio::test]
async fn test_health() {
    let (app, _rx) = router("/");
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"status": "ok", "service": "datadog-service"})
    );
}

#[tokio::test]
async fn test_structured_get_sli_is_accepted_and_dispatched() {
    let (app, mut rx) = router("/");
    let response = app
        .oneshot(structured(get_sli_triggered("evt-1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(json_body(response).await["id"], "evt-1");

    let (id, context, indicators) = next_seen(&mut rx).await;
    assert_eq!(id, "evt-1");
    assert_eq!(context, "ctx-1");
    assert_eq!(indicators, "response_time_p95,error_rate");
}

#[tokio::test]
async fn test_binary_legacy_configure_monitoring() {
    let (app, mut rx) = router("/");
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .header("ce-specversion", "1.0")
        .header("ce-id", "evt-2")
        .header("ce-source", "cli")
        .header("ce-type", "sh.keptn.event.monitoring.configure")
        .header("ce-shkeptncontext", "ctx-2")
        .body(Body::from(
            json!({"project": "sockshop", "service": "carts", "type": "datadog"}).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let (id, context, monitoring_type) = next_seen(&mut rx).await;
    assert_eq!(id, "evt-2");
    assert_eq!(context, "ctx-2");
    assert_eq!(monitoring_type, "datadog");
}

#[tokio::test]
async fn test_custom_receive_path() {
    let (app, mut rx) = router("events");
    let mut request = structured(json!({
        "id": "evt-3",
        "source": "shipyard",
        "type": "sh.keptn.event.configure-monitoring.triggered",
        "data": {"project": "sockshop", "service": "carts", "type": "datadog"}
    }));
    *request.uri_mut() = "/events".parse().unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(next_seen(&mut rx).await.0, "evt-3");
}

#[tokio::test]
async fn test_unhandled_event_type_is_rejected() {
    let (app, mut rx) = router("/");
    let response = app
        .oneshot(structured(json!({
            "id": "evt-4",
            "source": "shipyard",
            "type": "sh.keptn.event.deployment.triggered",
            "data": {}
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("sh.keptn.event.deployment.triggered"));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_malformed_envelope_is_rejected() {
    let (app, _rx) = router("/");
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/cloudevents+json")
        .body(Body::from("{\"id\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_payload_is_rejected() {
    let (app, _rx) = router("/");
    let response = app
        .oneshot(structured(json!({
            "id": "evt-5",
            "source": "lighthouse-service",
            "type": "sh.keptn.event.get-sli.triggered",
            "data": {"project": "sockshop", "get-sli": {"indicators": 42}}
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test(start_paused = true)]
async fn test_closing_tracker_waits_for_in_flight_task() {
    let tasks = TaskTracker::new();
    let (app, mut rx) = router_with("/", Duration::from_secs(120), tasks.clone());

    let response = app
        .oneshot(structured(get_sli_triggered("evt-6")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    // The handler is still inside its delay when shutdown begins.
    assert!(rx.try_recv().is_err());
    assert_eq!(tasks.len(), 1);

    let before = tokio::time::Instant::now();
    tasks.close();
    tasks.wait().await;

    assert!(before.elapsed() >= Duration::from_secs(120));
    let (id, _, _) = rx.try_recv().expect("handler finished before wait returned");
    assert_eq!(id, "evt-6");
    assert!(tasks.is_empty());
}
