//! Whitelist construction for one module
//!
//! A module's whitelist is rebuilt in four steps:
//! 1. Load the existing whitelist (or start empty)
//! 2. Read the module declaration and drop tables owned by the primary schema
//! 3. Extract fixed-name elements (columns) and autogenerated names (indexes, constraints)
//! 4. Merge `existing <- fixed <- generated` per table and persist
//!
//! Entries are never removed. Elements that cannot be named are skipped and
//! reported, not treated as errors.

use crate::error::GenerateError;
use crate::name_resolver::ElementNameResolver;
use schemaward_catalog::{ComponentRegistry, ComponentType, Persistor, ReadError, ReadScope, SchemaReader};
use schemaward_core::{
    ColumnList, Config, ConstraintDeclaration, DeclaredSchema, ElementCategory, IndexDeclaration,
    ModuleOutcome, SchemaModel, SkipCode, SkippedElement, Table, TableDeclaration, WhitelistDocument,
};
use std::cell::OnceCell;
use tracing::{debug, info};

/// Outcome of building one module's whitelist
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleGeneration {
    pub outcome: ModuleOutcome,

    /// Elements left out, in declaration order
    pub skipped: Vec<SkippedElement>,
}

/// Builds and persists module whitelists
///
/// The primary schema is read at most once per builder and reused for every
/// module processed through it.
pub struct WhitelistBuilder<'a> {
    config: &'a Config,
    registry: &'a dyn ComponentRegistry,
    reader: &'a dyn SchemaReader,
    persistor: &'a dyn Persistor,
    resolver: &'a dyn ElementNameResolver,
    primary: OnceCell<DeclaredSchema>,
}

impl<'a> WhitelistBuilder<'a> {
    pub fn new(
        config: &'a Config,
        registry: &'a dyn ComponentRegistry,
        reader: &'a dyn SchemaReader,
        persistor: &'a dyn Persistor,
        resolver: &'a dyn ElementNameResolver,
    ) -> Self {
        Self {
            config,
            registry,
            reader,
            persistor,
            resolver,
            primary: OnceCell::new(),
        }
    }

    /// Registry the builder resolves module paths through
    pub fn registry(&self) -> &'a dyn ComponentRegistry {
        self.registry
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// Primary schema, read on first use
    pub fn primary_schema(&self) -> Result<&DeclaredSchema, ReadError> {
        if let Some(primary) = self.primary.get() {
            return Ok(primary);
        }

        let primary = self.reader.read(&ReadScope::Primary)?;
        debug!(tables = primary.table.len(), "Loaded primary schema");
        Ok(self.primary.get_or_init(|| primary))
    }

    /// Build the whitelist of `module` against `schema` and persist it
    pub fn persist_module(&self, schema: &SchemaModel, module: &str) -> Result<ModuleGeneration, GenerateError> {
        let module_path = self
            .registry
            .path(ComponentType::Module, module)
            .ok_or_else(|| GenerateError::UnknownModule(module.to_string()))?;
        let whitelist_path = self.config.whitelist_path(&module_path);

        let mut document = self.persistor.load(&whitelist_path)?;

        let declared = self.reader.read(&ReadScope::Module(module.to_string()))?;
        let declared = filter_primary_tables(declared, self.primary_schema()?);

        if declared.is_empty() {
            info!(module, "No declared tables outside the primary schema");
            return Ok(ModuleGeneration {
                outcome: ModuleOutcome::NoDeclaredTables,
                skipped: Vec::new(),
            });
        }

        let mut skipped = Vec::new();
        for (table_name, table) in &declared.table {
            let fixed = fixed_name_elements(table_name, table);
            let generated = autogenerated_elements(module, table_name, table, schema, self.resolver);

            for note in &generated.skipped {
                debug!(
                    module,
                    table = %note.table,
                    code = %note.code,
                    "Skipped {}: {}",
                    note.category,
                    note.message
                );
            }

            document.ensure_table(table_name.as_str());
            document.merge(fixed);
            document.merge(generated.document);
            skipped.extend(generated.skipped);
        }

        self.persistor.persist(&document, &whitelist_path)?;
        info!(module, path = %whitelist_path.display(), tables = document.len(), "Wrote whitelist");

        Ok(ModuleGeneration {
            outcome: ModuleOutcome::Written {
                path: whitelist_path,
                tables: document.len(),
            },
            skipped,
        })
    }
}

/// Drop every module table that is also declared by the primary schema
pub fn filter_primary_tables(declared: DeclaredSchema, primary: &DeclaredSchema) -> DeclaredSchema {
    declared.without_tables_of(primary)
}

/// Columns of a table, whitelisted under their declared names
pub fn fixed_name_elements(table_name: &str, table: &TableDeclaration) -> WhitelistDocument {
    let mut document = WhitelistDocument::new();
    for column in table.column.keys() {
        document.insert(table_name, ElementCategory::Column, column.as_str());
    }
    document
}

/// Indexes and constraints named by the resolver, plus what could not be named
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AutogeneratedElements {
    pub document: WhitelistDocument,
    pub skipped: Vec<SkippedElement>,
}

/// Canonical names of a table's indexes and constraints
///
/// Declared `name` fields are ignored; names always come from the resolver.
pub fn autogenerated_elements(
    module: &str,
    table_name: &str,
    table: &TableDeclaration,
    schema: &SchemaModel,
    resolver: &dyn ElementNameResolver,
) -> AutogeneratedElements {
    let owner = schema.find_table(table_name);
    let mut elements = AutogeneratedElements::default();

    for index in &table.index {
        match index_name(owner, index, resolver) {
            Ok(name) => elements.document.insert(table_name, ElementCategory::Index, name),
            Err(skip) => elements.skipped.push(
                skip.into_element(module, table_name, ElementCategory::Index)
                    .with_declared_name(index.name.as_deref()),
            ),
        }
    }

    for constraint in &table.constraint {
        match constraint_name(schema, owner, constraint, resolver) {
            Ok(name) => elements.document.insert(table_name, ElementCategory::Constraint, name),
            Err(skip) => elements.skipped.push(
                skip.into_element(module, table_name, ElementCategory::Constraint)
                    .with_declared_name(constraint.name.as_deref()),
            ),
        }
    }

    elements
}

/// Why an element produced no name
#[derive(Debug, Clone, PartialEq, Eq)]
struct Skip {
    code: SkipCode,
    message: String,
}

impl Skip {
    fn new(code: SkipCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Declaration that could not be read at all
    fn malformed(reason: Option<&str>) -> Result<(), Self> {
        match reason {
            Some(reason) => Err(Self::new(SkipCode::MalformedElement, format!("unreadable declaration: {}", reason))),
            None => Ok(()),
        }
    }

    fn table_not_in_schema() -> Self {
        Self::new(SkipCode::TableNotInSchema, "owning table is not in the schema model")
    }

    fn into_element(self, module: &str, table: &str, category: ElementCategory) -> SkippedElement {
        SkippedElement::new(self.code, module, table, category, self.message)
    }
}

fn index_name(
    owner: Option<&Table>,
    index: &IndexDeclaration,
    resolver: &dyn ElementNameResolver,
) -> Result<String, Skip> {
    Skip::malformed(index.malformed.as_deref())?;

    let columns = index
        .columns()
        .ok_or_else(|| Skip::new(SkipCode::IndexWithoutColumns, "index declares no columns"))?;
    let table = owner.ok_or_else(Skip::table_not_in_schema)?;

    Ok(resolver.full_index_name(table, columns, index.index_type.as_deref()))
}

fn constraint_name(
    schema: &SchemaModel,
    owner: Option<&Table>,
    constraint: &ConstraintDeclaration,
    resolver: &dyn ElementNameResolver,
) -> Result<String, Skip> {
    Skip::malformed(constraint.malformed.as_deref())?;

    let constraint_type = constraint
        .constraint_type
        .as_deref()
        .ok_or_else(|| Skip::new(SkipCode::ConstraintWithoutType, "constraint declares no type"))?;

    if constraint.is_foreign() {
        return foreign_key_name(schema, owner, constraint, resolver);
    }

    let columns = constraint.columns().ok_or_else(|| {
        Skip::new(
            SkipCode::ConstraintWithoutColumns,
            format!("{} constraint declares no columns", constraint_type),
        )
    })?;
    let table = owner.ok_or_else(Skip::table_not_in_schema)?;

    Ok(resolver.full_index_name(table, columns, Some(constraint_type)))
}

fn foreign_key_name(
    schema: &SchemaModel,
    owner: Option<&Table>,
    constraint: &ConstraintDeclaration,
    resolver: &dyn ElementNameResolver,
) -> Result<String, Skip> {
    let (Some(column), Some(reference_table), Some(reference_column)) = (
        constraint.column.as_ref().and_then(ColumnList::single),
        constraint.reference_table.as_deref(),
        constraint.reference_column.as_deref(),
    ) else {
        return Err(Skip::new(
            SkipCode::ForeignKeyIncomplete,
            "foreign key needs one column, referenceTable and referenceColumn",
        ));
    };

    let table = owner.ok_or_else(Skip::table_not_in_schema)?;
    let unresolved = |what: String| Skip::new(SkipCode::ForeignKeyUnresolved, format!("{} is not in the schema model", what));

    let local_column = table
        .find_column(column)
        .ok_or_else(|| unresolved(format!("column {}.{}", table.name, column)))?;
    let referenced = schema
        .find_table(reference_table)
        .ok_or_else(|| unresolved(format!("referenced table {}", reference_table)))?;
    let referenced_column = referenced
        .find_column(reference_column)
        .ok_or_else(|| unresolved(format!("referenced column {}.{}", reference_table, reference_column)))?;

    Ok(resolver.full_fk_name(table, local_column, referenced, referenced_column))
}
