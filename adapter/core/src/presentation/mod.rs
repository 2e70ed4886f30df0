// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`sli-adapter-core`)
//!
//! HTTP surface that turns pushed CloudEvents into task events. No business
//! logic lives here; all real work is delegated to `crate::application`.
//!
//! | Module | Transport | Description |
//! |--------|-----------|-------------|
//! | [`api`] | HTTP (Axum) | CloudEvent receiver + health endpoint |

pub mod api;
