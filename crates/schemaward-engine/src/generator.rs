//! Whitelist generation entry point
//!
//! Guards the installation, resolves the schema model once and runs the
//! builder for one module or every registered module.

use crate::error::GenerateError;
use crate::whitelist_builder::WhitelistBuilder;
use schemaward_catalog::{ComponentType, DeploymentConfig, SchemaConfig};
use schemaward_core::{GenerationReport, ModuleOutcome, SchemaModel, ALL_MODULES, TABLE_PREFIX_PATH};
use serde_json::Value;
use tracing::{info, warn};

/// Fail when the installation uses a table prefix
///
/// Whitelists record unprefixed names, so a prefixed installation would
/// produce entries that never match.
pub fn check_installation(deployment: &dyn DeploymentConfig) -> Result<(), GenerateError> {
    match deployment.get(TABLE_PREFIX_PATH) {
        Some(prefix) if is_truthy(&prefix) => {
            warn!(prefix = %prefix, "Installation uses a table prefix");
            Err(GenerateError::table_prefix_configured())
        }
        _ => Ok(()),
    }
}

/// Loose truthiness of a configuration value
///
/// Empty strings, `"0"`, zero, `false`, `null` and empty collections are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty() && text != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
    }
}

/// Generates whitelists for modules
pub struct WhitelistGenerator<'a> {
    deployment: &'a dyn DeploymentConfig,
    schema_config: &'a dyn SchemaConfig,
    builder: WhitelistBuilder<'a>,
}

impl<'a> WhitelistGenerator<'a> {
    pub fn new(
        deployment: &'a dyn DeploymentConfig,
        schema_config: &'a dyn SchemaConfig,
        builder: WhitelistBuilder<'a>,
    ) -> Self {
        Self {
            deployment,
            schema_config,
            builder,
        }
    }

    /// Generate the whitelist of `module`, or of every module for `all`
    ///
    /// Stops at the first module that fails; whitelists already written stay
    /// on disk.
    pub fn generate(&self, module: &str) -> Result<GenerationReport, GenerateError> {
        check_installation(self.deployment)?;

        let schema = self.schema_config.declaration_config()?;
        let mut report = GenerationReport::new();

        if module == ALL_MODULES {
            let modules = self.builder.registry().paths(ComponentType::Module);
            info!(count = modules.len(), "Generating whitelists for all modules");

            for name in modules.into_keys() {
                if self.builder.config().is_module_skipped(&name) {
                    info!(module = %name, "Skipping module");
                    report.record_module(name, ModuleOutcome::Skipped);
                    continue;
                }
                self.generate_module(&schema, &name, &mut report)?;
            }
        } else {
            self.generate_module(&schema, module, &mut report)?;
        }

        Ok(report)
    }

    fn generate_module(
        &self,
        schema: &SchemaModel,
        module: &str,
        report: &mut GenerationReport,
    ) -> Result<(), GenerateError> {
        let generation = self.builder.persist_module(schema, module)?;
        report.record_module(module, generation.outcome);
        report.record_skipped(generation.skipped);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemaward_catalog::MemoryDeploymentConfig;
    use serde_json::json;

    #[test]
    fn truthiness_follows_loose_rules() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!("0"), json!([]), json!({})] {
            assert!(!is_truthy(&falsy), "{} should be falsy", falsy);
        }
        for truthy in [json!(true), json!(1), json!("mage_"), json!("00"), json!(["x"]), json!({"a": 1})] {
            assert!(is_truthy(&truthy), "{} should be truthy", truthy);
        }
    }

    #[test]
    fn prefixed_installation_is_rejected() {
        let deployment = MemoryDeploymentConfig::new().with_value(TABLE_PREFIX_PATH, json!("mage_"));

        let err = check_installation(&deployment).unwrap_err();
        assert!(matches!(err, GenerateError::ConfigurationMismatch(_)));
        assert_eq!(
            err.to_string(),
            "Installation was configured with a table prefix. Please re-install without prefix."
        );
    }

    #[test]
    fn missing_or_empty_prefix_passes() {
        assert!(check_installation(&MemoryDeploymentConfig::new()).is_ok());

        let deployment = MemoryDeploymentConfig::new().with_value(TABLE_PREFIX_PATH, json!(""));
        assert!(check_installation(&deployment).is_ok());
    }
}
