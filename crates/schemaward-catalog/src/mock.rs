//! In-memory collaborators for testing
//!
//! These collaborators keep everything in memory. They are useful for:
//! - Unit testing the whitelist builder without module directories
//! - Counting how often a scope is read (primary caching)
//! - Capturing persisted documents without touching disk
//!
//! ## Usage
//!
//! ```rust,ignore
//! use schemaward_catalog::mock::{MemoryReader, MemoryRegistry};
//! use schemaward_core::{DeclaredSchema, TableDeclaration, ColumnDeclaration};
//!
//! let registry = MemoryRegistry::new().with_module("Acme_Blog", "/srv/app/code/Acme/Blog");
//! let reader = MemoryReader::new().with_module(
//!     "Acme_Blog",
//!     DeclaredSchema::new().with_table(
//!         "blog_post",
//!         TableDeclaration::new().with_column("post_id", ColumnDeclaration::new("int")),
//!     ),
//! );
//! ```

use crate::adapter::{
    ComponentRegistry, ComponentType, DeploymentConfig, PersistError, Persistor, ReadError, ReadScope,
    SchemaReader,
};
use schemaward_core::{DeclaredSchema, WhitelistDocument, WhitelistError};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Module registry held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    modules: BTreeMap<String, PathBuf>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.modules.insert(name.into(), path.into());
        self
    }
}

impl ComponentRegistry for MemoryRegistry {
    fn path(&self, kind: ComponentType, name: &str) -> Option<PathBuf> {
        match kind {
            ComponentType::Module => self.modules.get(name).cloned(),
        }
    }

    fn paths(&self, kind: ComponentType) -> BTreeMap<String, PathBuf> {
        match kind {
            ComponentType::Module => self.modules.clone(),
        }
    }
}

/// Schema reader returning predefined declarations
///
/// Modules without a declaration read as empty. Every read is counted per
/// scope so tests can assert caching behavior.
#[derive(Debug, Default)]
pub struct MemoryReader {
    modules: BTreeMap<String, DeclaredSchema>,
    primary: DeclaredSchema,
    reads: Mutex<HashMap<ReadScope, usize>>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the declaration of a module
    pub fn with_module(mut self, name: impl Into<String>, schema: DeclaredSchema) -> Self {
        self.modules.insert(name.into(), schema);
        self
    }

    /// Set the primary declaration
    pub fn with_primary(mut self, schema: DeclaredSchema) -> Self {
        self.primary = schema;
        self
    }

    /// Number of reads of a scope so far
    pub fn read_count(&self, scope: &ReadScope) -> usize {
        self.reads
            .lock()
            .map(|reads| reads.get(scope).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

impl SchemaReader for MemoryReader {
    fn read(&self, scope: &ReadScope) -> Result<DeclaredSchema, ReadError> {
        if let Ok(mut reads) = self.reads.lock() {
            *reads.entry(scope.clone()).or_insert(0) += 1;
        }

        Ok(match scope {
            ReadScope::Primary => self.primary.clone(),
            ReadScope::Module(name) => self.modules.get(name).cloned().unwrap_or_default(),
            ReadScope::AllModules => {
                let mut merged = DeclaredSchema::new();
                for schema in self.modules.values() {
                    merged.extend(schema.clone());
                }
                merged
            }
        })
    }
}

/// Persistor capturing writes instead of touching disk
///
/// Loads serve the last document written to a path, falling back to
/// documents seeded with [`MemoryPersistor::with_existing`].
#[derive(Debug, Default)]
pub struct MemoryPersistor {
    existing: BTreeMap<PathBuf, WhitelistDocument>,
    writes: Mutex<Vec<(PathBuf, WhitelistDocument)>>,
}

impl MemoryPersistor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document as if it already existed at `path`
    pub fn with_existing(mut self, path: impl Into<PathBuf>, document: WhitelistDocument) -> Self {
        self.existing.insert(path.into(), document);
        self
    }

    /// Every write so far, in order
    pub fn writes(&self) -> Vec<(PathBuf, WhitelistDocument)> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().map(|w| w.len()).unwrap_or(0)
    }

    /// Last document written to `path`
    pub fn written(&self, path: &Path) -> Option<WhitelistDocument> {
        self.writes()
            .into_iter()
            .rev()
            .find(|(written, _)| written == path)
            .map(|(_, document)| document)
    }
}

impl Persistor for MemoryPersistor {
    fn persist(&self, document: &WhitelistDocument, path: &Path) -> Result<(), PersistError> {
        self.writes
            .lock()
            .map_err(|e| PersistError::IoError(path.display().to_string(), e.to_string()))?
            .push((path.to_path_buf(), document.clone()));
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<WhitelistDocument, WhitelistError> {
        Ok(self
            .written(path)
            .or_else(|| self.existing.get(path).cloned())
            .unwrap_or_default())
    }
}

/// Deployment settings held in memory, keyed by full path
#[derive(Debug, Clone, Default)]
pub struct MemoryDeploymentConfig {
    values: BTreeMap<String, serde_json::Value>,
}

impl MemoryDeploymentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.values.insert(key.into(), value);
        self
    }
}

impl DeploymentConfig for MemoryDeploymentConfig {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.values.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemaward_core::{ColumnDeclaration, TableDeclaration};

    fn blog_schema() -> DeclaredSchema {
        DeclaredSchema::new().with_table(
            "blog_post",
            TableDeclaration::new().with_column("post_id", ColumnDeclaration::new("int")),
        )
    }

    #[test]
    fn reader_counts_reads_per_scope() {
        let reader = MemoryReader::new().with_module("Acme_Blog", blog_schema());

        reader.read(&ReadScope::Primary).unwrap();
        reader.read(&ReadScope::Primary).unwrap();
        let module = reader.read(&ReadScope::Module("Acme_Blog".to_string())).unwrap();

        assert_eq!(module.table_names(), vec!["blog_post"]);
        assert_eq!(reader.read_count(&ReadScope::Primary), 2);
        assert_eq!(reader.read_count(&ReadScope::AllModules), 0);
    }

    #[test]
    fn unknown_module_reads_empty() {
        let reader = MemoryReader::new();
        assert!(reader.read(&ReadScope::Module("Acme_None".to_string())).unwrap().is_empty());
    }

    #[test]
    fn persistor_captures_last_write() {
        let persistor = MemoryPersistor::new();
        let path = PathBuf::from("/srv/Acme/Blog/etc/db_schema_whitelist.json");

        persistor.persist(&WhitelistDocument::new(), &path).unwrap();
        let mut document = WhitelistDocument::new();
        document.insert("blog_post", schemaward_core::ElementCategory::Column, "post_id");
        persistor.persist(&document, &path).unwrap();

        assert_eq!(persistor.write_count(), 2);
        assert_eq!(persistor.written(&path), Some(document.clone()));
        assert_eq!(persistor.load(&path).unwrap(), document);
    }

    #[test]
    fn persistor_loads_seeded_documents() {
        let path = PathBuf::from("/srv/Acme/Blog/etc/db_schema_whitelist.json");
        let mut existing = WhitelistDocument::new();
        existing.insert("t1", schemaward_core::ElementCategory::Column, "a");

        let persistor = MemoryPersistor::new().with_existing(&path, existing.clone());

        assert_eq!(persistor.load(&path).unwrap(), existing);
        assert!(persistor.load(Path::new("/elsewhere.json")).unwrap().is_empty());
        assert_eq!(persistor.write_count(), 0);
    }

    #[test]
    fn registry_lists_modules_in_name_order() {
        let registry = MemoryRegistry::new()
            .with_module("Magento_Store", "/m/store")
            .with_module("Acme_Blog", "/a/blog");

        let names: Vec<_> = registry.paths(ComponentType::Module).into_keys().collect();
        assert_eq!(names, vec!["Acme_Blog", "Magento_Store"]);
    }
}
