// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Task payloads, the evaluation window, query catalogs and the ports
//! (`EventSender`, `QueryCatalogSource`, `MetricsBackend`) the handlers
//! depend on.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer

pub mod adapter_config;
pub mod catalog;
pub mod events;
pub mod metrics;
pub mod query;
pub mod sli;
pub mod window;
