// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Catalog Infrastructure Module
//!
//! Concrete `QueryCatalogSource` implementations for the places an SLI
//! document can live.

pub mod configuration_service;
pub mod local;

pub use configuration_service::ConfigurationServiceCatalogSource;
pub use local::LocalCatalogSource;

use crate::domain::catalog::{CatalogError, QueryCatalogSource};
use std::path::PathBuf;
use std::sync::Arc;

/// Catalog source configuration
#[derive(Debug, Clone)]
pub enum CatalogBackend {
    /// Files under a local directory (development, `ENV=local`)
    Local { resource_dir: PathBuf },

    /// The platform's configuration service
    ConfigurationService { url: String },
}

impl CatalogBackend {
    /// Pick the backend for an `ENV` value; `local` reads from disk.
    pub fn for_environment(
        env: &str,
        resource_dir: impl Into<PathBuf>,
        configuration_service_url: impl Into<String>,
    ) -> Self {
        if env.eq_ignore_ascii_case("local") {
            CatalogBackend::Local {
                resource_dir: resource_dir.into(),
            }
        } else {
            CatalogBackend::ConfigurationService {
                url: configuration_service_url.into(),
            }
        }
    }
}

/// Factory function to create a catalog source from configuration
pub fn create_catalog_source(
    backend: CatalogBackend,
) -> Result<Arc<dyn QueryCatalogSource>, CatalogError> {
    Ok(match backend {
        CatalogBackend::Local { resource_dir } => Arc::new(LocalCatalogSource::new(resource_dir)),
        CatalogBackend::ConfigurationService { url } => {
            Arc::new(ConfigurationServiceCatalogSource::new(url)?)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_for_environment() {
        assert!(matches!(
            CatalogBackend::for_environment("local", "/tmp/res", "http://cs:8080"),
            CatalogBackend::Local { .. }
        ));
        assert!(matches!(
            CatalogBackend::for_environment("production", "/tmp/res", "http://cs:8080"),
            CatalogBackend::ConfigurationService { url } if url == "http://cs:8080"
        ));
    }
}
