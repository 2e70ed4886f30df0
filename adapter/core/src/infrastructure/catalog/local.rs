// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Local Filesystem Catalog Source
//!
//! Reads the SLI document from `<resource_dir>/<resource_path>` for
//! single-node development. Every (project, stage, service) sees the same file.

use crate::domain::catalog::{CatalogError, QueryCatalog, QueryCatalogSource, SliDocument};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

pub struct LocalCatalogSource {
    resource_dir: PathBuf,
}

impl LocalCatalogSource {
    pub fn new(resource_dir: impl Into<PathBuf>) -> Self {
        Self {
            resource_dir: resource_dir.into(),
        }
    }

    fn resolve_path(&self, resource_path: &str) -> PathBuf {
        let resource_path = resource_path.strip_prefix('/').unwrap_or(resource_path);
        self.resource_dir.join(resource_path)
    }
}

#[async_trait]
impl QueryCatalogSource for LocalCatalogSource {
    async fn fetch_query_catalog(
        &self,
        project: &str,
        stage: &str,
        service: &str,
        resource_path: &str,
    ) -> Result<QueryCatalog, CatalogError> {
        let path = self.resolve_path(resource_path);
        debug!(path = %path.display(), "Reading SLI document from disk");

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CatalogError::NotFound {
                    project: project.to_string(),
                    stage: stage.to_string(),
                    service: service.to_string(),
                    resource: resource_path.to_string(),
                });
            }
            Err(e) => {
                return Err(CatalogError::Unavailable(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        Ok(SliDocument::from_yaml(&content)?.into_catalog())
    }
}
