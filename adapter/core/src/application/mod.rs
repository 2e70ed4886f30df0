// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod configure_monitoring;
pub mod dispatch;
pub mod get_sli;
pub mod task_reporter;

// Re-export use cases for convenience
pub use configure_monitoring::{ConfigureMonitoringUseCase, StandardConfigureMonitoringUseCase};
pub use dispatch::{DispatchError, DispatchOutcome, EventDispatcher, TaskEvent};
pub use get_sli::{GetSliError, GetSliUseCase, SliRetrieval, StandardGetSliUseCase};
pub use task_reporter::TaskReporter;
