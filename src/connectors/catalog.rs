use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use super::fixtures;
use super::traits::CatalogProvider;
use super::types::{DeprecationRecord, ProviderMode};

/// Catalog read from a JSON export of the docs.python.org deprecation list
pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogProvider for JsonCatalog {
    async fn load(&self) -> Result<Vec<DeprecationRecord>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read catalog {}", self.path.display()))?;

        let records: Vec<DeprecationRecord> = serde_json::from_str(&raw)
            .with_context(|| format!("Malformed catalog {}", self.path.display()))?;

        info!("Loaded {} deprecation records from {}", records.len(), self.path.display());
        Ok(records)
    }

    fn mode(&self) -> ProviderMode {
        ProviderMode::Live
    }
}

/// Built-in catalog used when no export is configured
#[derive(Default)]
pub struct FixtureCatalog;

#[async_trait]
impl CatalogProvider for FixtureCatalog {
    async fn load(&self) -> Result<Vec<DeprecationRecord>> {
        Ok(fixtures::deprecation_catalog())
    }

    fn mode(&self) -> ProviderMode {
        ProviderMode::Offline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_json_catalog_fills_optional_fields() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"feature": "smtpd module", "version_deprecated": "3.6", "version_removed": "3.12"}},
                {{"feature": "ast.Num", "version_deprecated": "3.8", "version_removed": "3.14",
                  "module": "ast", "description": "Use ast.Constant instead.",
                  "replacement": "ast.Constant", "url": "https://docs.python.org/3/deprecations/"}}
            ]"#
        )
        .unwrap();

        let records = JsonCatalog::new(file.path()).load().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].module, None);
        assert_eq!(records[0].description, "");
        assert_eq!(records[1].replacement.as_deref(), Some("ast.Constant"));
    }

    #[tokio::test]
    async fn test_json_catalog_reports_malformed_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let err = JsonCatalog::new(file.path()).load().await.unwrap_err();
        assert!(format!("{:#}", err).contains("Malformed catalog"));
    }

    #[tokio::test]
    async fn test_fixture_catalog_is_offline() {
        let catalog = FixtureCatalog;
        assert_eq!(catalog.mode(), ProviderMode::Offline);
        assert!(!catalog.load().await.unwrap().is_empty());
    }
}
