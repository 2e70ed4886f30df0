// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Query Template Resolution
//!
//! Turns a raw catalog query into a backend-ready query by literal
//! placeholder substitution.
//!
//! # Supported Placeholders
//!
//! - `$PROJECT` / `$project`
//! - `$STAGE` / `$stage`
//! - `$SERVICE` / `$service`
//! - `$DURATION` - window length in whole seconds, rounded up
//!
//! Anything else is left verbatim; the backend rejects invalid queries itself.

use crate::domain::sli::EventData;
use crate::domain::window::EvaluationWindow;

/// Substitute every placeholder occurrence in `template`.
pub fn resolve_query(template: &str, scope: &EventData, window: &EvaluationWindow) -> String {
    let duration = window.duration_seconds().to_string();

    let substitutions: [(&str, &str); 7] = [
        ("$PROJECT", scope.project.as_str()),
        ("$STAGE", scope.stage.as_str()),
        ("$SERVICE", scope.service.as_str()),
        ("$project", scope.project.as_str()),
        ("$stage", scope.stage.as_str()),
        ("$service", scope.service.as_str()),
        ("$DURATION", duration.as_str()),
    ];

    substitutions
        .iter()
        .fold(template.to_string(), |query, &(placeholder, value)| {
            query.replace(placeholder, value)
        })
}
