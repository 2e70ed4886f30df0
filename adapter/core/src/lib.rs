// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! SLI Adapter Core
//!
//! Answers `get-sli` and `configure-monitoring` task events by querying
//! Datadog and reporting started/finished events back to the platform.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Domain model, use cases, adapters and the HTTP receiver

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;
