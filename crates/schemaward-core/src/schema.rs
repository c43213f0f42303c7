//! Declared schema data and the queryable schema model
//!
//! `DeclaredSchema` is the nested table/column/index/constraint description a
//! reader produces for one scope. `SchemaModel` is the resolved view used to
//! look up tables and columns by name when naming indexes and foreign keys.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Declared schema for one scope (a module, the primary baseline, or all modules)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclaredSchema {
    /// Tables keyed by name
    #[serde(default)]
    pub table: BTreeMap<String, TableDeclaration>,
}

impl DeclaredSchema {
    /// Create an empty declaration
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table
    pub fn with_table(mut self, name: impl Into<String>, table: TableDeclaration) -> Self {
        self.table.insert(name.into(), table);
        self
    }

    /// Whether no table is declared
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Declared table names, sorted
    pub fn table_names(&self) -> Vec<&str> {
        self.table.keys().map(String::as_str).collect()
    }

    /// Drop every table that is also declared in `owner`
    ///
    /// Tables are removed wholesale, never field by field.
    pub fn without_tables_of(mut self, owner: &DeclaredSchema) -> Self {
        self.table.retain(|name, _| !owner.table.contains_key(name));
        self
    }

    /// Fold another declaration into this one
    ///
    /// Columns are merged by name (later wins), index and constraint lists
    /// are appended in order.
    pub fn extend(&mut self, other: DeclaredSchema) {
        for (name, incoming) in other.table {
            let table = self.table.entry(name).or_default();
            table.column.extend(incoming.column);
            table.index.extend(incoming.index);
            table.constraint.extend(incoming.constraint);
        }
    }
}

/// Declared structure of one table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableDeclaration {
    /// Columns keyed by name
    #[serde(default, deserialize_with = "column_map")]
    pub column: BTreeMap<String, ColumnDeclaration>,

    /// Index declarations (unordered)
    #[serde(default, deserialize_with = "element_list")]
    pub index: Vec<IndexDeclaration>,

    /// Constraint declarations (unordered)
    #[serde(default, deserialize_with = "element_list")]
    pub constraint: Vec<ConstraintDeclaration>,
}

impl TableDeclaration {
    /// Create an empty table declaration
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column
    pub fn with_column(mut self, name: impl Into<String>, column: ColumnDeclaration) -> Self {
        self.column.insert(name.into(), column);
        self
    }

    /// Add an index
    pub fn with_index(mut self, index: IndexDeclaration) -> Self {
        self.index.push(index);
        self
    }

    /// Add a constraint
    pub fn with_constraint(mut self, constraint: ConstraintDeclaration) -> Self {
        self.constraint.push(constraint);
        self
    }
}

/// Column map of a table
///
/// An empty map may be encoded as `[]`; anything that is not an object
/// declares no columns.
fn column_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, ColumnDeclaration>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(columns) => columns
            .into_iter()
            .map(|(name, attributes)| (name, ColumnDeclaration { attributes }))
            .collect(),
        _ => BTreeMap::new(),
    })
}

/// Index or constraint list of a table
///
/// Accepts a list, or an object keyed by element name (the key fills in a
/// missing `name`). Any other value becomes a single element that fails to
/// parse and is reported as malformed.
fn element_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<Value>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Array(elements) => elements.into_iter().map(T::from).collect(),
        Value::Object(elements) => elements
            .into_iter()
            .map(|(key, mut element)| {
                if let Value::Object(fields) = &mut element {
                    fields.entry("name").or_insert(Value::String(key));
                }
                T::from(element)
            })
            .collect(),
        other => vec![T::from(other)],
    })
}

/// Name given in a declaration, when it is a string
fn declared_name(element: &Value) -> Option<String> {
    element.get("name").and_then(Value::as_str).map(str::to_string)
}

/// Column metadata as declared, kept verbatim
///
/// Only the column name takes part in whitelisting, so the metadata is never
/// validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnDeclaration {
    pub attributes: Value,
}

impl ColumnDeclaration {
    /// Create a column of the given type
    pub fn new(column_type: impl Into<String>) -> Self {
        Self {
            attributes: serde_json::json!({ "type": column_type.into() }),
        }
    }

    /// Declared column type, when it is a string
    pub fn column_type(&self) -> Option<&str> {
        self.attributes.get("type").and_then(Value::as_str)
    }
}

/// Participating columns of an index or constraint
///
/// Foreign keys name a single column, other elements a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnList {
    Single(String),
    Many(Vec<String>),
}

impl ColumnList {
    /// Column names in declaration order
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::Single(name) => std::slice::from_ref(name),
            Self::Many(names) => names,
        }
    }

    /// The column name when exactly one is given
    pub fn single(&self) -> Option<&str> {
        match self.as_slice() {
            [name] => Some(name),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ColumnList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::Many(iter.into_iter().map(Into::into).collect())
    }
}

/// An index as declared
///
/// Parsed element by element: an entry whose fields do not fit keeps its
/// declared name and records the parse failure in `malformed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct IndexDeclaration {
    /// Declared name. Never used for whitelisting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<ColumnList>,

    /// Index type tag (btree, hash, fulltext, ...)
    #[serde(rename = "indexType", skip_serializing_if = "Option::is_none")]
    pub index_type: Option<String>,

    /// Why the declaration could not be read
    #[serde(skip)]
    pub malformed: Option<String>,
}

#[derive(Deserialize)]
struct IndexFields {
    #[serde(default)]
    column: Option<ColumnList>,

    #[serde(rename = "indexType", default)]
    index_type: Option<String>,
}

impl From<Value> for IndexDeclaration {
    fn from(element: Value) -> Self {
        let name = declared_name(&element);
        match serde_json::from_value::<IndexFields>(element) {
            Ok(fields) => Self {
                name,
                column: fields.column,
                index_type: fields.index_type,
                malformed: None,
            },
            Err(e) => Self {
                name,
                malformed: Some(e.to_string()),
                ..Self::default()
            },
        }
    }
}

impl IndexDeclaration {
    /// Create an index over the given columns
    pub fn on<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column: Some(columns.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, index_type: impl Into<String>) -> Self {
        self.index_type = Some(index_type.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Participating columns, if any are declared
    pub fn columns(&self) -> Option<&[String]> {
        self.column
            .as_ref()
            .map(ColumnList::as_slice)
            .filter(|columns| !columns.is_empty())
    }
}

/// A constraint as declared
///
/// Parsed element by element like [`IndexDeclaration`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct ConstraintDeclaration {
    /// Declared name. Never used for whitelisting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Constraint type tag (foreign, unique, primary)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub constraint_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<ColumnList>,

    #[serde(rename = "referenceTable", skip_serializing_if = "Option::is_none")]
    pub reference_table: Option<String>,

    #[serde(rename = "referenceColumn", skip_serializing_if = "Option::is_none")]
    pub reference_column: Option<String>,

    #[serde(rename = "onDelete", skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,

    /// Why the declaration could not be read
    #[serde(skip)]
    pub malformed: Option<String>,
}

#[derive(Deserialize)]
struct ConstraintFields {
    #[serde(rename = "type", default)]
    constraint_type: Option<String>,

    #[serde(default)]
    column: Option<ColumnList>,

    #[serde(rename = "referenceTable", default)]
    reference_table: Option<String>,

    #[serde(rename = "referenceColumn", default)]
    reference_column: Option<String>,
}

impl From<Value> for ConstraintDeclaration {
    fn from(element: Value) -> Self {
        let name = declared_name(&element);
        let on_delete = element.get("onDelete").and_then(Value::as_str).map(str::to_string);

        match serde_json::from_value::<ConstraintFields>(element) {
            Ok(fields) => Self {
                name,
                constraint_type: fields.constraint_type,
                column: fields.column,
                reference_table: fields.reference_table,
                reference_column: fields.reference_column,
                on_delete,
                malformed: None,
            },
            Err(e) => Self {
                name,
                malformed: Some(e.to_string()),
                ..Self::default()
            },
        }
    }
}

impl ConstraintDeclaration {
    pub const FOREIGN: &'static str = "foreign";
    pub const UNIQUE: &'static str = "unique";
    pub const PRIMARY: &'static str = "primary";

    /// Create a constraint of an arbitrary type over the given columns
    pub fn of_type<I, S>(constraint_type: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            constraint_type: Some(constraint_type.into()),
            column: Some(columns.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn unique<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::of_type(Self::UNIQUE, columns)
    }

    pub fn primary<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::of_type(Self::PRIMARY, columns)
    }

    /// Create a foreign key from `column` to `reference_table.reference_column`
    pub fn foreign(
        column: impl Into<String>,
        reference_table: impl Into<String>,
        reference_column: impl Into<String>,
    ) -> Self {
        Self {
            constraint_type: Some(Self::FOREIGN.to_string()),
            column: Some(ColumnList::Single(column.into())),
            reference_table: Some(reference_table.into()),
            reference_column: Some(reference_column.into()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether this is a foreign key constraint
    pub fn is_foreign(&self) -> bool {
        self.constraint_type.as_deref() == Some(Self::FOREIGN)
    }

    /// Participating columns, if any are declared
    pub fn columns(&self) -> Option<&[String]> {
        self.column
            .as_ref()
            .map(ColumnList::as_slice)
            .filter(|columns| !columns.is_empty())
    }
}

/// A column in the schema model
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Declared type, when known
    pub column_type: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: None,
        }
    }
}

/// A table in the schema model
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Table name
    pub name: String,

    /// Columns in name order
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Resolved schema of the whole installation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaModel {
    tables: BTreeMap<String, Table>,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the model from a declaration
    pub fn from_declared(declared: &DeclaredSchema) -> Self {
        let tables = declared
            .table
            .iter()
            .map(|(name, declaration)| {
                let columns = declaration
                    .column
                    .iter()
                    .map(|(column_name, column)| Column {
                        name: column_name.clone(),
                        column_type: column.column_type().map(str::to_string),
                    })
                    .collect();

                (
                    name.clone(),
                    Table {
                        name: name.clone(),
                        columns,
                    },
                )
            })
            .collect();

        Self { tables }
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.add_table(table);
        self
    }

    pub fn add_table(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Find a table by name
    pub fn find_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
