//! Filesystem component registry
//!
//! Modules are discovered under each configured module directory as
//! `<Vendor>/<Module>/etc/module.xml` and registered as `Vendor_Module`.
//! Explicit registrations from the config are added on top and win on
//! name clashes.

use crate::adapter::{ComponentRegistry, ComponentType};
use schemaward_core::{Config, MODULE_ETC_DIR};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File marking a directory as a module
pub const MODULE_MARKER: &str = "module.xml";

/// Registry of modules found on disk
#[derive(Debug, Clone, Default)]
pub struct FsComponentRegistry {
    modules: BTreeMap<String, PathBuf>,
}

impl FsComponentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the configured module directories and add explicit registrations
    pub fn discover(config: &Config) -> Self {
        let mut registry = Self::new();

        for dir in &config.module_dirs {
            let root = config.resolve(dir);
            for (name, path) in scan_module_dir(&root) {
                registry.register(name, path);
            }
        }

        for (name, path) in &config.modules {
            registry.register(name.clone(), config.resolve(path));
        }

        tracing::debug!(modules = registry.modules.len(), "Module discovery finished");
        registry
    }

    /// Register a module at `path`
    pub fn register(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.modules.insert(name.into(), path.into());
    }

    pub fn with_module(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.register(name, path);
        self
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ComponentRegistry for FsComponentRegistry {
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

/// Find `<Vendor>/<Module>` directories carrying a module marker
fn scan_module_dir(root: &Path) -> Vec<(String, PathBuf)> {
    if !root.is_dir() {
        tracing::debug!(dir = %root.display(), "Module directory does not exist");
        return Vec::new();
    }

    WalkDir::new(root)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir())
        .filter(|entry| entry.path().join(MODULE_ETC_DIR).join(MODULE_MARKER).is_file())
        .filter_map(|entry| {
            let module = entry.file_name().to_str()?;
            let vendor = entry.path().parent()?.file_name()?.to_str()?;
            Some((format!("{}_{}", vendor, module), entry.into_path()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn make_module(root: &Path, vendor: &str, module: &str) -> PathBuf {
        let path = root.join(vendor).join(module);
        std::fs::create_dir_all(path.join("etc")).unwrap();
        std::fs::write(path.join("etc").join(MODULE_MARKER), "<config/>").unwrap();
        path
    }

    #[test]
    fn discovers_vendor_modules() {
        let dir = tempfile::tempdir().unwrap();
        let code = dir.path().join("app/code");
        let blog = make_module(&code, "Acme", "Blog");
        let store = make_module(&code, "Magento", "Store");
        std::fs::create_dir_all(code.join("Acme/NotAModule/etc")).unwrap();

        let config = Config::default().with_project_root(dir.path());
        let registry = FsComponentRegistry::discover(&config);

        let paths = registry.paths(ComponentType::Module);
        assert_eq!(paths.keys().collect::<Vec<_>>(), vec!["Acme_Blog", "Magento_Store"]);
        assert_eq!(registry.path(ComponentType::Module, "Acme_Blog"), Some(blog));
        assert_eq!(registry.path(ComponentType::Module, "Magento_Store"), Some(store));
    }

    #[test]
    fn explicit_registrations_override_scan() {
        let dir = tempfile::tempdir().unwrap();
        make_module(&dir.path().join("app/code"), "Acme", "Blog");

        let mut config = Config::default().with_project_root(dir.path());
        config.modules.insert("Acme_Blog".to_string(), PathBuf::from("vendor/acme/blog"));

        let registry = FsComponentRegistry::discover(&config);
        assert_eq!(
            registry.path(ComponentType::Module, "Acme_Blog"),
            Some(dir.path().join("vendor/acme/blog"))
        );
    }

    #[test]
    fn missing_module_dir_yields_empty_registry() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default().with_project_root(dir.path());
        assert!(FsComponentRegistry::discover(&config).is_empty());
    }
}
