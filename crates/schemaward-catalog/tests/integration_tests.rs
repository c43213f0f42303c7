//! Integration tests for the filesystem collaborators
//!
//! Each test lays out a throwaway installation (see `fixtures`) and drives the
//! registry, reader, schema model, deployment config and persistor against it.
//!
//! ```bash
//! cargo test -p schemaward-catalog --test integration_tests
//! ```

mod fixtures;

use pretty_assertions::assert_eq;
use schemaward_catalog::{
    ComponentRegistry, ComponentType, DeploymentConfig, FileDeploymentConfig, FsComponentRegistry,
    JsonPersistor, JsonSchemaReader, Persistor, ReadScope, ReaderSchemaConfig, SchemaConfig,
    SchemaReader,
};
use schemaward_core::{Config, ElementCategory, WhitelistDocument};

fn config_for(install: &fixtures::Installation) -> Config {
    Config::default().with_project_root(&install.root)
}

#[test]
fn test_discovers_installed_modules() {
    let install = fixtures::installation();
    let registry = FsComponentRegistry::discover(&config_for(&install));

    let names: Vec<_> = registry.paths(ComponentType::Module).into_keys().collect();
    assert_eq!(names, vec!["Acme_Blog", "Magento_Catalog"]);
    assert_eq!(
        registry.path(ComponentType::Module, "Acme_Blog"),
        Some(install.path("app/code/Acme/Blog"))
    );
}

#[test]
fn test_reads_module_declaration() {
    let install = fixtures::installation();
    let config = config_for(&install);
    let registry = FsComponentRegistry::discover(&config);
    let reader = JsonSchemaReader::new(&registry, &config);

    let blog = reader.read(&ReadScope::Module("Acme_Blog".to_string())).unwrap();
    assert_eq!(blog.table_names(), vec!["blog_post", "core_config_data"]);

    let post = &blog.table["blog_post"];
    assert_eq!(post.column.len(), 3);
    assert_eq!(post.index.len(), 1);
    assert_eq!(post.constraint.len(), 2);
    assert!(post.constraint[1].is_foreign());
}

#[test]
fn test_all_modules_scope_merges_declarations() {
    let install = fixtures::installation();
    let config = config_for(&install);
    let registry = FsComponentRegistry::discover(&config);
    let reader = JsonSchemaReader::new(&registry, &config);

    let all = reader.read(&ReadScope::AllModules).unwrap();
    assert_eq!(
        all.table_names(),
        vec!["blog_post", "catalog_category", "core_config_data"]
    );
}

#[test]
fn test_schema_model_resolves_cross_module_references() {
    let install = fixtures::installation();
    let config = config_for(&install);
    let registry = FsComponentRegistry::discover(&config);
    let reader = JsonSchemaReader::new(&registry, &config);

    let model = ReaderSchemaConfig::new(&reader).declaration_config().unwrap();

    let store = model.find_table("store").expect("primary table in model");
    assert!(store.find_column("store_id").is_some());

    let core_config = model.find_table("core_config_data").unwrap();
    assert_eq!(core_config.column_names(), vec!["blog_flag", "config_id", "path"]);
}

#[test]
fn test_deployment_config_from_installation() {
    let install = fixtures::installation();
    let config = config_for(&install);

    let deployment = FileDeploymentConfig::load(&config.resolve(&config.deployment_config)).unwrap();
    assert_eq!(deployment.get("db/table_prefix"), Some(serde_json::json!("")));
}

#[test]
fn test_persisted_whitelist_reloads() {
    let install = fixtures::installation();
    let config = config_for(&install);
    let path = config.whitelist_path(&install.path("app/code/Acme/Blog"));

    let mut document = WhitelistDocument::new();
    document.insert("blog_post", ElementCategory::Column, "post_id");
    document.insert("blog_post", ElementCategory::Constraint, "PRIMARY");

    JsonPersistor::new(config.indent).persist(&document, &path).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("{\n    \"blog_post\""));
    assert_eq!(WhitelistDocument::from_file(&path).unwrap(), document);
}
