// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Datadog SLI Adapter
//!
//! The `sli-adapter` binary receives `get-sli` and `configure-monitoring`
//! task events over HTTP, queries Datadog, and reports started/finished events
//! to the platform's event broker.
//!
//! Every flag can be set through the environment variable named next to it;
//! a `.env` file in the working directory is loaded first.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use metrics_exporter_prometheus::PrometheusBuilder;
use sli_adapter_core::infrastructure::datadog::DEFAULT_DATADOG_SITE;
use sli_adapter_core::infrastructure::event_sender::DEFAULT_EVENT_BROKER_URL;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

mod server;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// Datadog SLI adapter - answer get-sli task events with Datadog metrics
#[derive(Parser, Debug)]
#[command(name = "sli-adapter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Port the CloudEvent receiver listens on
    #[arg(long, env = "RCV_PORT", default_value = "8080")]
    pub port: u16,

    /// Path the CloudEvent receiver accepts events on
    #[arg(long, env = "RCV_PATH", default_value = "/")]
    pub path: String,

    /// Address the receiver binds to
    #[arg(long, env = "RCV_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Deployment environment; `local` reads the SLI document from RESOURCE_DIR
    #[arg(long, env = "ENV", default_value = "local")]
    pub env: String,

    /// Configuration service base URL (non-local environments)
    #[arg(
        long,
        env = "CONFIGURATION_SERVICE",
        default_value = "http://configuration-service:8080"
    )]
    pub configuration_service: String,

    /// Directory holding `datadog/sli.yaml` in local mode
    #[arg(long, env = "RESOURCE_DIR", default_value = "resources", value_name = "DIR")]
    pub resource_dir: PathBuf,

    /// Event broker URL started/finished events are posted to
    #[arg(long, env = "K_SINK", default_value = DEFAULT_EVENT_BROKER_URL)]
    pub event_broker: String,

    /// Datadog site, e.g. datadoghq.eu
    #[arg(long, env = "DD_SITE", default_value = DEFAULT_DATADOG_SITE)]
    pub dd_site: String,

    /// Datadog API base URL (overrides DD_SITE)
    #[arg(long, env = "DD_API_URL")]
    pub dd_api_url: Option<String>,

    #[arg(long, env = "DD_API_KEY", hide_env_values = true)]
    pub dd_api_key: String,

    #[arg(long, env = "DD_APP_KEY", hide_env_values = true)]
    pub dd_app_key: String,

    /// Seconds to wait before each Datadog query (minimum 60)
    #[arg(long, env = "SLEEP_BEFORE_API_IN_SECONDS", default_value = "60")]
    pub sleep_before_api: u64,

    /// `sliProvider` value this instance answers
    #[arg(long, env = "SLI_PROVIDER", default_value = "datadog")]
    pub sli_provider: String,

    /// Source of every event this service emits
    #[arg(long, env = "SERVICE_NAME", default_value = "datadog-service")]
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "text")]
    log_format: LogFormat,

    /// Serve Prometheus metrics on this port
    #[arg(long, env = "METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.log_format)?;

    if let Some(port) = cli.metrics_port {
        install_metrics_exporter(port)?;
    }

    info!(
        service = %cli.service_name,
        provider = %cli.sli_provider,
        env = %cli.env,
        "Starting SLI adapter"
    );

    server::start_server(cli).await
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        LogFormat::Text => builder.compact().init(),
        LogFormat::Json => builder.json().with_current_span(true).init(),
    }

    Ok(())
}

fn install_metrics_exporter(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus exporter")?;

    info!("Prometheus metrics listening on {}", addr);
    Ok(())
}
