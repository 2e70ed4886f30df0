// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Query Catalog
//!
//! Indicator name -> raw query template, read from the SLI document stored in
//! the service's configuration namespace.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Catalog model and the `QueryCatalogSource` port
//!
//! Implementations live in `infrastructure/catalog/`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Location of the SLI document inside the service configuration.
pub const SLI_RESOURCE_PATH: &str = "datadog/sli.yaml";

/// Per-indicator query templates for one (project, stage, service).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryCatalog {
    queries: HashMap<String, String>,
}

impl QueryCatalog {
    pub fn new(queries: HashMap<String, String>) -> Self {
        Self { queries }
    }

    /// Raw template for `indicator`, if the document defines it
    pub fn query_for(&self, indicator: &str) -> Option<&str> {
        self.queries.get(indicator).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Overlay `other` on top of `self`; entries in `other` win.
    pub fn merge(&mut self, other: QueryCatalog) {
        self.queries.extend(other.queries);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryCatalog {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            queries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// On-disk shape of `sli.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SliDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_version: Option<String>,

    #[serde(default)]
    pub indicators: HashMap<String, String>,
}

impl SliDocument {
    pub fn from_yaml(content: &str) -> Result<Self, CatalogError> {
        // An empty file is a document without indicators.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| CatalogError::Invalid(e.to_string()))
    }

    pub fn into_catalog(self) -> QueryCatalog {
        QueryCatalog::new(self.indicators)
    }
}

/// Errors raised while fetching a catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("SLI resource '{resource}' not found for {project}/{stage}/{service}")]
    NotFound {
        project: String,
        stage: String,
        service: String,
        resource: String,
    },

    #[error("Configuration source unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid SLI document: {0}")]
    Invalid(String),
}

/// Port to the configuration source holding the SLI document.
#[async_trait]
pub trait QueryCatalogSource: Send + Sync {
    /// Fetch the catalog stored at `resource_path` for the given scope.
    async fn fetch_query_catalog(
        &self,
        project: &str,
        stage: &str,
        service: &str,
        resource_path: &str,
    ) -> Result<QueryCatalog, CatalogError>;
}
