// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod catalog;
pub mod datadog;
pub mod event_sender;

pub use datadog::DatadogClient;
pub use event_sender::{HttpEventSender, InMemoryEventSender};
