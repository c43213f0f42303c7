//! Test fixtures for collaborator integration tests
//!
//! Builds a small installation tree on disk: a primary declaration, two
//! vendor modules with declared schemas and a deployment config.

use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway installation rooted in a temp dir
pub struct Installation {
    _tmp: TempDir,
    pub root: PathBuf,
}

impl Installation {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        Self { _tmp: tmp, root }
    }

    /// Write a JSON file relative to the root, creating parents
    pub fn write_json(&self, relative: &str, value: serde_json::Value) -> PathBuf {
        let path = self.root.join(relative);
        std::fs::create_dir_all(path.parent().expect("parent dir")).expect("create parents");
        std::fs::write(&path, serde_json::to_string_pretty(&value).expect("serialize"))
            .expect("write fixture");
        path
    }

    /// Create `app/code/<vendor>/<module>` with a module marker
    pub fn add_module(&self, vendor: &str, module: &str) -> PathBuf {
        let path = self.root.join("app/code").join(vendor).join(module);
        std::fs::create_dir_all(path.join("etc")).expect("create module");
        std::fs::write(path.join("etc/module.xml"), "<config/>").expect("write marker");
        path
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}

/// Primary tables owned by the installation baseline
pub fn primary_schema() -> serde_json::Value {
    json!({
        "table": {
            "store": {
                "column": {
                    "store_id": {"type": "smallint", "nullable": false},
                    "code": {"type": "varchar"}
                },
                "constraint": [{"type": "primary", "column": ["store_id"]}]
            },
            "core_config_data": {
                "column": {
                    "config_id": {"type": "int"},
                    "path": {"type": "varchar"}
                }
            }
        }
    })
}

/// Blog module declaring its own table and extending a primary one
pub fn blog_schema() -> serde_json::Value {
    json!({
        "table": {
            "blog_post": {
                "column": {
                    "post_id": {"type": "int", "identity": true},
                    "store_id": {"type": "smallint"},
                    "title": {"type": "varchar", "length": 255}
                },
                "index": [{"column": ["title"], "indexType": "fulltext"}],
                "constraint": [
                    {"type": "primary", "column": ["post_id"]},
                    {"type": "foreign", "column": "store_id",
                     "referenceTable": "store", "referenceColumn": "store_id", "onDelete": "CASCADE"}
                ]
            },
            "core_config_data": {
                "column": {"blog_flag": {"type": "boolean"}}
            }
        }
    })
}

/// Catalog module declaring one table
pub fn catalog_schema() -> serde_json::Value {
    json!({
        "table": {
            "catalog_category": {
                "column": {
                    "entity_id": {"type": "int"},
                    "name": {"type": "varchar"}
                }
            }
        }
    })
}

/// Full installation: primary schema, Acme_Blog, Magento_Catalog, env.json
pub fn installation() -> Installation {
    let install = Installation::new();
    install.write_json("app/etc/db_schema.json", primary_schema());
    install.write_json("app/etc/env.json", json!({"db": {"table_prefix": ""}}));

    let blog = install.add_module("Acme", "Blog");
    write_module_schema(&blog, blog_schema());

    let catalog = install.add_module("Magento", "Catalog");
    write_module_schema(&catalog, catalog_schema());

    install
}

pub fn write_module_schema(module: &Path, schema: serde_json::Value) {
    std::fs::write(
        module.join("etc/db_schema.json"),
        serde_json::to_string_pretty(&schema).expect("serialize"),
    )
    .expect("write module schema");
}
