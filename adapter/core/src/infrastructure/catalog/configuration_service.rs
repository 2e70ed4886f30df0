// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration Service Catalog Source
//!
//! Reads the SLI document from the platform's configuration service.
//!
//! # API Endpoints Used
//!
//! - `GET /v1/project/{project}/resource/{uri}`
//! - `GET /v1/project/{project}/stage/{stage}/resource/{uri}`
//! - `GET /v1/project/{project}/stage/{stage}/service/{service}/resource/{uri}`
//!
//! The three levels are merged; a more specific level overrides a broader one.

use crate::domain::catalog::{CatalogError, QueryCatalog, QueryCatalogSource, SliDocument};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Unreserved characters stay literal; `/` inside the URI is escaped.
const RESOURCE_URI: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub struct ConfigurationServiceCatalogSource {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Resource {
    #[serde(default)]
    resource_content: String,
}

impl ConfigurationServiceCatalogSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self, CatalogError> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Resource URLs from broadest to most specific
    fn resource_urls(&self, project: &str, stage: &str, service: &str, resource_path: &str) -> [String; 3] {
        let uri = utf8_percent_encode(resource_path, RESOURCE_URI).to_string();
        let project_url = format!("{}/v1/project/{}", self.base_url, project);
        let stage_url = format!("{}/stage/{}", project_url, stage);
        let service_url = format!("{}/service/{}", stage_url, service);

        [
            format!("{}/resource/{}", project_url, uri),
            format!("{}/resource/{}", stage_url, uri),
            format!("{}/resource/{}", service_url, uri),
        ]
    }

    /// `Ok(None)` when the resource does not exist at this level
    async fn fetch_level(&self, url: &str) -> Result<Option<QueryCatalog>, CatalogError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let resource: Resource = response
                    .json()
                    .await
                    .map_err(|e| CatalogError::Invalid(format!("Malformed resource response: {}", e)))?;

                let raw = STANDARD
                    .decode(resource.resource_content.trim())
                    .map_err(|e| CatalogError::Invalid(format!("Resource content is not base64: {}", e)))?;
                let content = String::from_utf8(raw)
                    .map_err(|e| CatalogError::Invalid(format!("Resource content is not UTF-8: {}", e)))?;

                Ok(Some(SliDocument::from_yaml(&content)?.into_catalog()))
            }
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("HTTP {}", status));
                Err(CatalogError::Unavailable(format!(
                    "Configuration service returned {}: {}",
                    status, body
                )))
            }
        }
    }
}

#[async_trait]
impl QueryCatalogSource for ConfigurationServiceCatalogSource {
    async fn fetch_query_catalog(
        &self,
        project: &str,
        stage: &str,
        service: &str,
        resource_path: &str,
    ) -> Result<QueryCatalog, CatalogError> {
        let mut merged: Option<QueryCatalog> = None;

        for url in self.resource_urls(project, stage, service, resource_path) {
            match self.fetch_level(&url).await? {
                Some(catalog) => {
                    debug!(url = %url, indicators = catalog.len(), "Loaded SLI document level");
                    merged.get_or_insert_with(QueryCatalog::default).merge(catalog);
                }
                None => debug!(url = %url, "No SLI document at this level"),
            }
        }

        merged.ok_or_else(|| CatalogError::NotFound {
            project: project.to_string(),
            stage: stage.to_string(),
            service: service.to_string(),
            resource: resource_path.to_string(),
        })
    }
}
