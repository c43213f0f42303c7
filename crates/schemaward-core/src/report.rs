//! Generation report (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use crate::diagnostic::SkippedElement;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// What happened to one module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModuleOutcome {
    /// Whitelist written with `tables` tables in total
    Written { path: PathBuf, tables: usize },

    /// Nothing declared after filtering primary tables; file left untouched
    NoDeclaredTables,

    /// Module excluded by configuration
    Skipped,
}

/// Per-module entry of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleReport {
    pub module: String,

    #[serde(flatten)]
    pub outcome: ModuleOutcome,
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Modules visited, skipped ones included
    pub modules: usize,

    /// Whitelist files written
    pub files_written: usize,

    /// Modules with nothing to whitelist
    pub unchanged: usize,

    /// Elements left out of whitelists
    pub elements_skipped: usize,
}

/// Generation report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Summary statistics
    pub summary: ReportSummary,

    /// Per-module outcomes, in processing order
    pub modules: Vec<ModuleReport>,

    /// Elements that produced no entry
    pub skipped: Vec<SkippedElement>,
}

impl Default for GenerationReport {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary: ReportSummary::default(),
            modules: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Record the outcome of one module
    pub fn record_module(&mut self, module: impl Into<String>, outcome: ModuleOutcome) {
        match &outcome {
            ModuleOutcome::Written { .. } => self.summary.files_written += 1,
            ModuleOutcome::NoDeclaredTables => self.summary.unchanged += 1,
            ModuleOutcome::Skipped => {}
        }
        self.summary.modules += 1;
        self.modules.push(ModuleReport {
            module: module.into(),
            outcome,
        });
    }

    /// Record elements left out of a whitelist
    pub fn record_skipped(&mut self, skipped: impl IntoIterator<Item = SkippedElement>) {
        self.skipped.extend(skipped);
        self.summary.elements_skipped = self.skipped.len();
    }

    /// Paths of every whitelist written
    pub fn written_paths(&self) -> Vec<&PathBuf> {
        self.modules
            .iter()
            .filter_map(|m| match &m.outcome {
                ModuleOutcome::Written { path, .. } => Some(path),
                _ => None,
            })
            .collect()
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save report to file
    pub fn save_to_file(&self, path: &std::path::Path) -> std::io::Result<()> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}
