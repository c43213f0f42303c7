//! Configuration schema (schemaward.toml)

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Sentinel module argument meaning "every registered module"
pub const ALL_MODULES: &str = "all";

/// Directory inside a module holding its configuration files
pub const MODULE_ETC_DIR: &str = "etc";

/// Deployment configuration key of the table name prefix
pub const TABLE_PREFIX_PATH: &str = "db/table_prefix";

pub const DEFAULT_WHITELIST_FILE_NAME: &str = "db_schema_whitelist.json";
pub const DEFAULT_SCHEMA_FILE_NAME: &str = "db_schema.json";

fn default_whitelist_file_name() -> String {
    DEFAULT_WHITELIST_FILE_NAME.to_string()
}

fn default_schema_file_name() -> String {
    DEFAULT_SCHEMA_FILE_NAME.to_string()
}

fn default_module_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("app/code")]
}

fn default_primary_schema() -> PathBuf {
    PathBuf::from("app/etc/db_schema.json")
}

fn default_deployment_config() -> PathBuf {
    PathBuf::from("app/etc/env.json")
}

fn default_indent() -> usize {
    4
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// File name of the generated whitelist inside `<module>/etc`
    #[serde(default = "default_whitelist_file_name")]
    pub whitelist_file_name: String,

    /// File name of the declared schema inside `<module>/etc`
    #[serde(default = "default_schema_file_name")]
    pub schema_file_name: String,

    /// Directories scanned for `<Vendor>/<Module>/etc/module.xml`
    #[serde(default = "default_module_dirs")]
    pub module_dirs: Vec<PathBuf>,

    /// Declared schema of the primary (baseline) tables
    #[serde(default = "default_primary_schema")]
    pub primary_schema: PathBuf,

    /// Deployment configuration document (JSON)
    #[serde(default = "default_deployment_config")]
    pub deployment_config: PathBuf,

    /// Modules never processed when generating for all modules (glob patterns)
    #[serde(default)]
    pub skip_modules: Vec<String>,

    /// Indentation width of persisted whitelist files
    #[serde(default = "default_indent")]
    pub indent: usize,

    /// Explicit module registrations, name -> path
    #[serde(default)]
    pub modules: BTreeMap<String, PathBuf>,

    /// Project root path (for resolving relative paths)
    #[serde(skip)]
    pub project_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            whitelist_file_name: default_whitelist_file_name(),
            schema_file_name: default_schema_file_name(),
            module_dirs: default_module_dirs(),
            primary_schema: default_primary_schema(),
            deployment_config: default_deployment_config(),
            skip_modules: Vec::new(),
            indent: default_indent(),
            modules: BTreeMap::new(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.project_root = std::env::current_dir().unwrap_or_default();
        Ok(config)
    }

    /// Set the project root
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    /// Resolve a configured path against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    /// Whitelist file location of a module rooted at `module_path`
    pub fn whitelist_path(&self, module_path: &Path) -> PathBuf {
        module_path.join(MODULE_ETC_DIR).join(&self.whitelist_file_name)
    }

    /// Declared schema location of a module rooted at `module_path`
    pub fn schema_path(&self, module_path: &Path) -> PathBuf {
        module_path.join(MODULE_ETC_DIR).join(&self.schema_file_name)
    }

    /// Check if a module matches any skip pattern
    pub fn is_module_skipped(&self, module: &str) -> bool {
        self.skip_modules.iter().any(|pattern| {
            if pattern.contains('*') {
                glob_match(pattern, module)
            } else {
                pattern == module
            }
        })
    }
}

/// Simple glob matching (single `*` wildcard)
fn glob_match(pattern: &str, text: &str) -> bool {
    if pattern == "*" || pattern == "**" {
        return true;
    }

    if let Some(star_pos) = pattern.find('*') {
        let prefix = &pattern[..star_pos];
        let suffix = &pattern[star_pos + 1..];

        text.len() >= prefix.len() + suffix.len() && text.starts_with(prefix) && text.ends_with(suffix)
    } else {
        pattern == text
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.whitelist_file_name, "db_schema_whitelist.json");
        assert_eq!(config.module_dirs, vec![PathBuf::from("app/code")]);
        assert_eq!(config.indent, 4);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            skip_modules = ["Magento_*"]

            [modules]
            Acme_Blog = "vendor/acme/blog"
            "#,
        )
        .unwrap();

        assert_eq!(config.schema_file_name, DEFAULT_SCHEMA_FILE_NAME);
        assert_eq!(config.modules["Acme_Blog"], PathBuf::from("vendor/acme/blog"));
        assert!(config.is_module_skipped("Magento_Catalog"));
        assert!(!config.is_module_skipped("Acme_Blog"));
    }

    #[test]
    fn from_file_sets_project_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schemaward.toml");
        std::fs::write(&path, "indent = 2\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.indent, 2);
        assert_eq!(config.project_root, dir.path());
        assert_eq!(
            config.resolve(Path::new("app/etc/env.json")),
            dir.path().join("app/etc/env.json")
        );
    }

    #[test]
    fn unreadable_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = Config::from_file(&dir.path().join("schemaward.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::IoError(_)));

        let invalid = Config::from_toml("indent = \"wide\"").unwrap_err();
        assert!(matches!(invalid, ConfigError::ParseError(_)));
    }

    #[test]
    fn module_file_locations() {
        let config = Config::default();
        let module = Path::new("/srv/app/code/Acme/Blog");
        assert_eq!(
            config.whitelist_path(module),
            PathBuf::from("/srv/app/code/Acme/Blog/etc/db_schema_whitelist.json")
        );
        assert_eq!(
            config.schema_path(module),
            PathBuf::from("/srv/app/code/Acme/Blog/etc/db_schema.json")
        );
    }

    #[test]
    fn glob_matching() {
        assert!(glob_match("*", "anything"));
        assert!(glob_match("Magento_*", "Magento_Store"));
        assert!(glob_match("*_Sample", "Acme_Sample"));
        assert!(!glob_match("Magento_*", "Acme_Blog"));
        assert!(!glob_match("ab*ba", "aba"));
    }
}
