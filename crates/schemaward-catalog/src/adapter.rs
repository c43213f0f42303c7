//! Collaborator traits consumed by whitelist generation

use schemaward_core::{DeclaredSchema, SchemaModel, WhitelistDocument, WhitelistError};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of registered component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Module,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Module => "module",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which declared schema to read
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReadScope {
    /// Tables declared by one module
    Module(String),

    /// Baseline tables shared by the whole installation
    Primary,

    /// Tables declared by every registered module, merged
    AllModules,
}

impl fmt::Display for ReadScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module(name) => write!(f, "module {}", name),
            Self::Primary => write!(f, "primary"),
            Self::AllModules => write!(f, "all modules"),
        }
    }
}

/// Errors that can occur when reading declared schemas
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("Failed to read {0}: {1}")]
    IoError(String, String),

    #[error("Invalid declared schema in {0}: {1}")]
    ParseError(String, String),

    #[error("Module '{0}' is not registered")]
    UnknownModule(String),
}

/// Errors that can occur when writing a whitelist
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Failed to write {0}: {1}")]
    IoError(String, String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

/// Installation deployment settings
pub trait DeploymentConfig: Send + Sync {
    /// Look up a value by `/`-separated path (e.g. `db/table_prefix`)
    fn get(&self, key: &str) -> Option<serde_json::Value>;
}

/// Registry of installed components and their locations
pub trait ComponentRegistry: Send + Sync {
    /// Root directory of one component
    fn path(&self, kind: ComponentType, name: &str) -> Option<PathBuf>;

    /// Every component of a kind, name -> root directory
    fn paths(&self, kind: ComponentType) -> BTreeMap<String, PathBuf>;
}

/// Reader of declared schema data
pub trait SchemaReader: Send + Sync {
    fn read(&self, scope: &ReadScope) -> Result<DeclaredSchema, ReadError>;
}

/// Provider of the resolved schema model
pub trait SchemaConfig: Send + Sync {
    fn declaration_config(&self) -> Result<SchemaModel, ReadError>;
}

/// Store of whitelist documents
pub trait Persistor: Send + Sync {
    fn persist(&self, document: &WhitelistDocument, path: &Path) -> Result<(), PersistError>;

    /// Existing document at `path`, empty when there is none
    fn load(&self, path: &Path) -> Result<WhitelistDocument, WhitelistError> {
        WhitelistDocument::load_or_default(path)
    }
}
