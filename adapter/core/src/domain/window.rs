// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Evaluation Window
//!
//! Parses the `start`/`end` bounds of a get-sli task. Callers send either an
//! RFC3339 timestamp or Unix epoch seconds encoded as a string, depending on
//! the platform version that emitted the event.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Timestamp parsing and window arithmetic

use chrono::{DateTime, Utc};

/// Raised when a bound is neither RFC3339 nor an integer epoch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid timestamp '{value}': expected RFC3339 or Unix epoch seconds")]
pub struct TimestampParseError {
    pub value: String,
}

/// Parse a window bound, trying RFC3339 first and epoch seconds second.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, TimestampParseError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    value
        .parse::<i64>()
        .ok()
        .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
        .ok_or_else(|| TimestampParseError {
            value: value.to_string(),
        })
}

/// Parsed `[start, end]` bounds of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl EvaluationWindow {
    /// Parse both bounds independently. The first failure wins.
    pub fn parse(start: &str, end: &str) -> Result<Self, TimestampParseError> {
        Ok(Self {
            start: parse_timestamp(start)?,
            end: parse_timestamp(end)?,
        })
    }

    /// Window length in whole seconds, rounded up.
    pub fn duration_seconds(&self) -> i64 {
        let span = self.end - self.start;
        // Nanoseconds overflow i64 past ~292 years; milliseconds suffice there.
        match span.num_nanoseconds() {
            Some(nanos) => ceil_div(nanos, 1_000_000_000),
            None => ceil_div(span.num_milliseconds(), 1_000),
        }
    }

    pub fn start_epoch(&self) -> i64 {
        self.start.timestamp()
    }

    pub fn end_epoch(&self) -> i64 {
        self.end.timestamp()
    }
}

/// Ceiling division for positive and negative spans alike
fn ceil_div(value: i64, unit: i64) -> i64 {
    value.div_euclid(unit) + i64::from(value.rem_euclid(unit) != 0)
}
