// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Service wiring and HTTP server

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::task::TaskTracker;
use tracing::{error, info};

use sli_adapter_core::{
    application::{
        EventDispatcher, StandardConfigureMonitoringUseCase, StandardGetSliUseCase, TaskReporter,
    },
    domain::adapter_config::{AdapterConfig, SettlingDelay},
    infrastructure::{
        catalog::{create_catalog_source, CatalogBackend},
        datadog::DatadogClient,
        event_sender::HttpEventSender,
    },
    presentation::api,
};

use crate::Cli;

pub async fn start_server(cli: Cli) -> Result<()> {
    let config = AdapterConfig {
        service_name: cli.service_name.clone(),
        provider: cli.sli_provider.clone(),
        ..AdapterConfig::default()
    }
    .with_settling_delay(SettlingDelay::from_seconds(cli.sleep_before_api));

    config.validate().context("Configuration validation failed")?;

    info!(
        settling_delay_secs = config.settling_delay.as_secs(),
        resource = %config.sli_resource_path,
        "Configuration loaded"
    );

    // Initialize adapters
    let backend = CatalogBackend::for_environment(&cli.env, &cli.resource_dir, &cli.configuration_service);
    info!(backend = ?backend, "Using SLI catalog source");
    let catalog_source =
        create_catalog_source(backend).context("Failed to initialize SLI catalog source")?;

    let api_url = cli
        .dd_api_url
        .clone()
        .unwrap_or_else(|| DatadogClient::api_url_for_site(&cli.dd_site));
    info!(api_url = %api_url, "Using Datadog API");
    let metrics_backend = Arc::new(
        DatadogClient::new(api_url, cli.dd_api_key.clone(), cli.dd_app_key.clone())
            .context("Failed to initialize Datadog client")?,
    );

    let event_sender = Arc::new(
        HttpEventSender::new(cli.event_broker.clone())
            .context("Failed to initialize event sender")?,
    );
    let reporter = TaskReporter::new(event_sender, config.service_name.clone());

    // Initialize services
    let service_name = config.service_name.clone();
    let get_sli = Arc::new(StandardGetSliUseCase::new(
        config,
        reporter.clone(),
        catalog_source,
        metrics_backend,
    ));
    let configure_monitoring = Arc::new(StandardConfigureMonitoringUseCase::new(reporter));
    let dispatcher = Arc::new(EventDispatcher::new(service_name, get_sli, configure_monitoring));

    let tasks = TaskTracker::new();
    let app = api::app(dispatcher, &cli.path, tasks.clone());

    // Start HTTP server
    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Receiving events on {}{}", addr, cli.path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    drain_task_events(tasks).await;
    info!("SLI adapter shut down");

    Ok(())
}

/// Resolves on SIGINT or SIGTERM. A signal that cannot be installed is logged
/// and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let received = tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    };
    info!(signal = received, "Shutdown requested, no longer accepting events");
}

/// Let every accepted task event reach its terminal state.
async fn drain_task_events(tasks: TaskTracker) {
    tasks.close();
    if !tasks.is_empty() {
        info!(in_flight = tasks.len(), "Waiting for in-flight task events to finish");
    }
    tasks.wait().await;
}
