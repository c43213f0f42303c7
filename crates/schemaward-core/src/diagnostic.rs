//! Notes on declared elements left out of a whitelist
//!
//! Skipping an element is never an error. Each skip is still recorded with a
//! stable code so a report can explain why an index or constraint is missing.
//! NEVER rename codes - they appear in saved reports.

use crate::whitelist::ElementCategory;
use serde::{Deserialize, Serialize};

/// Reason an element produced no whitelist entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipCode {
    /// Index declared without any column
    IndexWithoutColumns,

    /// Constraint declared without a type
    ConstraintWithoutType,

    /// Non-foreign constraint declared without any column
    ConstraintWithoutColumns,

    /// Foreign key missing column, referenceTable or referenceColumn
    ForeignKeyIncomplete,

    /// Foreign key whose column or referenced table/column is not in the schema
    ForeignKeyUnresolved,

    /// Owning table is not in the schema model
    TableNotInSchema,

    /// Index or constraint whose fields could not be read
    MalformedElement,
}

impl SkipCode {
    /// Get the code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IndexWithoutColumns => "INDEX_WITHOUT_COLUMNS",
            Self::ConstraintWithoutType => "CONSTRAINT_WITHOUT_TYPE",
            Self::ConstraintWithoutColumns => "CONSTRAINT_WITHOUT_COLUMNS",
            Self::ForeignKeyIncomplete => "FOREIGN_KEY_INCOMPLETE",
            Self::ForeignKeyUnresolved => "FOREIGN_KEY_UNRESOLVED",
            Self::TableNotInSchema => "TABLE_NOT_IN_SCHEMA",
            Self::MalformedElement => "MALFORMED_ELEMENT",
        }
    }
}

impl std::fmt::Display for SkipCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A declared element that was not whitelisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedElement {
    pub code: SkipCode,

    /// Module declaring the element
    pub module: String,

    /// Owning table
    pub table: String,

    pub category: ElementCategory,

    /// Name given in the declaration, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_name: Option<String>,

    /// Human-readable explanation
    pub message: String,
}

impl SkippedElement {
    pub fn new(
        code: SkipCode,
        module: impl Into<String>,
        table: impl Into<String>,
        category: ElementCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            module: module.into(),
            table: table.into(),
            category,
            declared_name: None,
            message: message.into(),
        }
    }

    pub fn with_declared_name(mut self, name: Option<&str>) -> Self {
        self.declared_name = name.map(str::to_string);
        self
    }
}
