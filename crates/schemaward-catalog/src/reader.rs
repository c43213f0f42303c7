//! JSON declared-schema reader and the schema model built from it
//!
//! Each module keeps its declared schema at `<module>/etc/db_schema.json`;
//! the primary baseline lives at the configured `primary_schema` path. A
//! missing file declares nothing.

use crate::adapter::{ComponentRegistry, ComponentType, ReadError, ReadScope, SchemaConfig, SchemaReader};
use schemaward_core::{Config, DeclaredSchema, SchemaModel, MODULE_ETC_DIR};
use std::path::{Path, PathBuf};

/// Reads `db_schema.json` files of registered modules
pub struct JsonSchemaReader<'a> {
    registry: &'a dyn ComponentRegistry,
    schema_file_name: String,
    primary_schema: PathBuf,
}

impl<'a> JsonSchemaReader<'a> {
    pub fn new(registry: &'a dyn ComponentRegistry, config: &Config) -> Self {
        Self {
            registry,
            schema_file_name: config.schema_file_name.clone(),
            primary_schema: config.resolve(&config.primary_schema),
        }
    }

    fn module_schema_path(&self, module_path: &Path) -> PathBuf {
        module_path.join(MODULE_ETC_DIR).join(&self.schema_file_name)
    }

    fn read_file(path: &Path) -> Result<DeclaredSchema, ReadError> {
        if !path.exists() {
            tracing::trace!(path = %path.display(), "No declared schema file");
            return Ok(DeclaredSchema::new());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| ReadError::IoError(path.display().to_string(), e.to_string()))?;

        serde_json::from_str(&contents)
            .map_err(|e| ReadError::ParseError(path.display().to_string(), e.to_string()))
    }
}

impl SchemaReader for JsonSchemaReader<'_> {
    fn read(&self, scope: &ReadScope) -> Result<DeclaredSchema, ReadError> {
        match scope {
            ReadScope::Primary => Self::read_file(&self.primary_schema),
            ReadScope::Module(name) => {
                let module_path = self
                    .registry
                    .path(ComponentType::Module, name)
                    .ok_or_else(|| ReadError::UnknownModule(name.clone()))?;
                Self::read_file(&self.module_schema_path(&module_path))
            }
            ReadScope::AllModules => {
                let mut merged = DeclaredSchema::new();
                for (name, module_path) in self.registry.paths(ComponentType::Module) {
                    tracing::trace!(module = %name, file = %self.schema_file_name, "Reading declared schema");
                    merged.extend(Self::read_file(&self.module_schema_path(&module_path))?);
                }
                Ok(merged)
            }
        }
    }
}

/// Schema model assembled from the primary declaration and every module
pub struct ReaderSchemaConfig<'a> {
    reader: &'a dyn SchemaReader,
}

impl<'a> ReaderSchemaConfig<'a> {
    pub fn new(reader: &'a dyn SchemaReader) -> Self {
        Self { reader }
    }
}

impl SchemaConfig for ReaderSchemaConfig<'_> {
    fn declaration_config(&self) -> Result<SchemaModel, ReadError> {
        let mut declared = self.reader.read(&ReadScope::Primary)?;
        declared.extend(self.reader.read(&ReadScope::AllModules)?);

        let model = SchemaModel::from_declared(&declared);
        tracing::debug!(tables = model.len(), "Built declaration schema model");
        Ok(model)
    }
}
