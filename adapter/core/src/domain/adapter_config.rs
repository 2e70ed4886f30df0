// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Adapter Configuration
//
// Immutable settings handed to the task handlers at construction time:
// - identity used as CloudEvent `source`
// - SLI provider this instance answers for
// - location of the SLI document
// - settling delay before every backend query

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::catalog::SLI_RESOURCE_PATH;

/// Wait before every metrics query; never below [`SettlingDelay::FLOOR_SECONDS`].
///
/// The backend ingests asynchronously and serves incomplete aggregates for
/// points younger than this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub struct SettlingDelay(u64);

impl SettlingDelay {
    pub const FLOOR_SECONDS: u64 = 60;

    /// Build from a configured value, raising it to the floor if needed.
    pub fn from_seconds(seconds: u64) -> Self {
        if seconds < Self::FLOOR_SECONDS {
            tracing::warn!(
                configured = seconds,
                effective = Self::FLOOR_SECONDS,
                "Settling delay below minimum, using the minimum instead"
            );
            return Self(Self::FLOOR_SECONDS);
        }
        Self(seconds)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Default for SettlingDelay {
    fn default() -> Self {
        Self(Self::FLOOR_SECONDS)
    }
}

impl From<u64> for SettlingDelay {
    fn from(seconds: u64) -> Self {
        Self::from_seconds(seconds)
    }
}

impl From<SettlingDelay> for u64 {
    fn from(delay: SettlingDelay) -> Self {
        delay.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// CloudEvent `source` of everything this service emits
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// `sliProvider` value this instance handles; others are skipped
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Path of the SLI document in the configuration namespace
    #[serde(default = "default_sli_resource_path")]
    pub sli_resource_path: String,

    #[serde(default)]
    pub settling_delay: SettlingDelay,
}

fn default_service_name() -> String {
    "datadog-service".to_string()
}

fn default_provider() -> String {
    "datadog".to_string()
}

fn default_sli_resource_path() -> String {
    SLI_RESOURCE_PATH.to_string()
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            provider: default_provider(),
            sli_resource_path: default_sli_resource_path(),
            settling_delay: SettlingDelay::default(),
        }
    }
}

impl AdapterConfig {
    pub fn with_settling_delay(mut self, delay: SettlingDelay) -> Self {
        self.settling_delay = delay;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.service_name.trim().is_empty() {
            anyhow::bail!("service_name cannot be empty");
        }

        if self.provider.trim().is_empty() {
            anyhow::bail!("provider cannot be empty");
        }

        if self.sli_resource_path.trim().is_empty() {
            anyhow::bail!("sli_resource_path cannot be empty");
        }

        Ok(())
    }
}
