// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Configure Monitoring Use Case
//!
//! Acknowledges `configure-monitoring.triggered`. Datadog needs no per-service
//! setup from this side, so the task succeeds immediately.

use crate::application::task_reporter::TaskReporter;
use crate::domain::events::{CloudEvent, EventDeliveryError, TaskName};
use crate::domain::sli::{ConfigureMonitoringTriggeredEventData, EventData, TaskResult, TaskStatus};
use async_trait::async_trait;
use tracing::info;

pub const CONFIGURE_MONITORING_MESSAGE: &str =
    "Datadog monitoring is configured through the Datadog agent; nothing to do";

#[async_trait]
pub trait ConfigureMonitoringUseCase: Send + Sync {
    /// Send started then finished; delivery errors are returned unchanged.
    async fn handle(
        &self,
        trigger: &CloudEvent,
        data: ConfigureMonitoringTriggeredEventData,
    ) -> Result<EventData, EventDeliveryError>;
}

pub struct StandardConfigureMonitoringUseCase {
    reporter: TaskReporter,
}

impl StandardConfigureMonitoringUseCase {
    pub fn new(reporter: TaskReporter) -> Self {
        Self { reporter }
    }
}

#[async_trait]
impl ConfigureMonitoringUseCase for StandardConfigureMonitoringUseCase {
    async fn handle(
        &self,
        trigger: &CloudEvent,
        data: ConfigureMonitoringTriggeredEventData,
    ) -> Result<EventData, EventDeliveryError> {
        info!(
            project = %data.event_data.project,
            service = %data.event_data.service,
            monitoring_type = %data.monitoring_type,
            "Handling configure-monitoring.triggered event"
        );

        self.reporter
            .send_started(TaskName::ConfigureMonitoring, trigger, &data)
            .await?;

        let finished = data.event_data.finished(
            TaskStatus::Succeeded,
            TaskResult::Pass,
            Some(CONFIGURE_MONITORING_MESSAGE.to_string()),
        );
        self.reporter
            .send_finished(TaskName::ConfigureMonitoring, trigger, &finished)
            .await?;

        metrics::counter!("sli_adapter_tasks_finished_total", "task" => "configure-monitoring", "status" => "succeeded")
            .increment(1);
        Ok(finished)
    }
}
