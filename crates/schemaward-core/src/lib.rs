//! Schemaward Core
//!
//! Domain model shared by every schemaward crate: declared schema data, the
//! queryable schema model, the whitelist document and its merge, configuration
//! and the generation report.

pub mod diagnostic;
pub mod schema;
pub mod whitelist;
pub mod report;
pub mod config;

pub use diagnostic::{SkipCode, SkippedElement};
pub use schema::{
    Column, ColumnDeclaration, ColumnList, ConstraintDeclaration, DeclaredSchema, IndexDeclaration,
    SchemaModel, Table, TableDeclaration,
};
pub use whitelist::{merge_branches, ElementCategory, WhitelistDocument, WhitelistError, WhitelistNode};
pub use report::{GenerationReport, ModuleOutcome, ModuleReport, ReportSummary, ReportVersion};
pub use config::{Config, ConfigError, ALL_MODULES, MODULE_ETC_DIR, TABLE_PREFIX_PATH};
