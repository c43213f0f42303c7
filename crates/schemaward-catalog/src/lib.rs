//! Collaborators for whitelist generation
//!
//! This crate provides the traits the generator consumes and the adapters
//! that back them:
//! - Component registry (module discovery on disk)
//! - Declared schema reader (`db_schema.json` per module, primary baseline)
//! - Schema model assembled from all declarations
//! - Deployment configuration (`app/etc/env.json`)
//! - JSON whitelist persistor
//! - In-memory mocks for tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemaward_catalog::{FsComponentRegistry, JsonSchemaReader, ReadScope, SchemaReader};
//!
//! let registry = FsComponentRegistry::discover(&config);
//! let reader = JsonSchemaReader::new(&registry, &config);
//! let declared = reader.read(&ReadScope::Module("Acme_Blog".to_string()))?;
//! ```

pub mod adapter;
pub mod registry;
pub mod reader;
pub mod deployment;
pub mod persistor;
pub mod mock;

pub use adapter::{
    ComponentRegistry, ComponentType, DeploymentConfig, PersistError, Persistor, ReadError, ReadScope,
    SchemaConfig, SchemaReader,
};
pub use registry::FsComponentRegistry;
pub use reader::{JsonSchemaReader, ReaderSchemaConfig};
pub use deployment::{DeploymentConfigError, FileDeploymentConfig};
pub use persistor::JsonPersistor;
pub use mock::{MemoryDeploymentConfig, MemoryPersistor, MemoryReader, MemoryRegistry};
