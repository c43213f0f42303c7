//! Deployment configuration backed by a JSON document (app/etc/env.json)

use crate::adapter::DeploymentConfig;
use serde_json::Value;
use std::path::Path;

/// Deployment settings loaded from a JSON file
#[derive(Debug, Clone, PartialEq)]
pub struct FileDeploymentConfig {
    document: Value,
}

impl Default for FileDeploymentConfig {
    fn default() -> Self {
        Self::from_value(Value::Object(Default::default()))
    }
}

impl FileDeploymentConfig {
    /// Load settings from `path`; a missing file yields empty settings
    pub fn load(path: &Path) -> Result<Self, DeploymentConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No deployment configuration, using empty settings");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| DeploymentConfigError::IoError(path.display().to_string(), e.to_string()))?;

        let document = serde_json::from_str(&contents)
            .map_err(|e| DeploymentConfigError::ParseError(path.display().to_string(), e.to_string()))?;

        Ok(Self::from_value(document))
    }

    pub fn from_value(document: Value) -> Self {
        Self { document }
    }
}

impl DeploymentConfig for FileDeploymentConfig {
    fn get(&self, key: &str) -> Option<Value> {
        key.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(&self.document, |node, segment| node.get(segment))
            .cloned()
    }
}

/// Deployment configuration error types
#[derive(Debug, thiserror::Error)]
pub enum DeploymentConfigError {
    #[error("Failed to read deployment config {0}: {1}")]
    IoError(String, String),

    #[error("Invalid deployment config {0}: {1}")]
    ParseError(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_key_lookup() {
        let config = FileDeploymentConfig::from_value(json!({
            "db": {"table_prefix": "", "connection": {"default": {"host": "localhost"}}}
        }));

        assert_eq!(config.get("db/table_prefix"), Some(json!("")));
        assert_eq!(config.get("db/connection/default/host"), Some(json!("localhost")));
        assert_eq!(config.get("db/missing"), None);
        assert_eq!(config.get("cache/frontend"), None);
    }

    #[test]
    fn missing_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileDeploymentConfig::load(&dir.path().join("env.json")).unwrap();
        assert_eq!(config.get("db/table_prefix"), None);
    }

    #[test]
    fn loads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env.json");
        std::fs::write(&path, r#"{"db": {"table_prefix": "m2_"}}"#).unwrap();

        let config = FileDeploymentConfig::load(&path).unwrap();
        assert_eq!(config.get("db/table_prefix"), Some(json!("m2_")));
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env.json");
        std::fs::write(&path, "{db").unwrap();

        assert!(matches!(
            FileDeploymentConfig::load(&path),
            Err(DeploymentConfigError::ParseError(..))
        ));
    }
}
