//! Canonical names of indexes and constraints
//!
//! Names are derived from the owning table, the participating columns (in
//! declaration order) and the element type. Names that do not fit the
//! identifier limit are abbreviated and, failing that, hashed.

use schemaward_core::{Column, ConstraintDeclaration, Table};

/// Longest identifier accepted by the database
pub const IDENTIFIER_MAX_LENGTH: usize = 64;

/// Names the autogenerated elements of a table
pub trait ElementNameResolver {
    /// Canonical name of an index or non-foreign constraint
    fn full_index_name(&self, table: &Table, columns: &[String], index_type: Option<&str>) -> String;

    /// Canonical name of a foreign key
    fn full_fk_name(
        &self,
        table: &Table,
        column: &Column,
        reference_table: &Table,
        reference_column: &Column,
    ) -> String;
}

/// Word abbreviations applied to over-long names
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("address", "addr"),
    ("admin", "adm"),
    ("aggregat", "aggr"),
    ("agreement", "agrt"),
    ("attribute", "attr"),
    ("bundle", "bndl"),
    ("calculation", "calc"),
    ("catalog", "cat"),
    ("category", "ctgr"),
    ("checkout", "chkt"),
    ("compare", "cmp"),
    ("customer", "cstr"),
    ("datetime", "dtime"),
    ("decimal", "dec"),
    ("directory", "dir"),
    ("downloadable", "dl"),
    ("element", "elm"),
    ("enterprise", "ent"),
    ("entity", "entt"),
    ("fieldset", "fset"),
    ("gallery", "glr"),
    ("index", "idx"),
    ("inventory", "inv"),
    ("label", "lbl"),
    ("layout", "lyt"),
    ("link", "lnk"),
    ("media", "mda"),
    ("minimal", "min"),
    ("newsletter", "nlttr"),
    ("notification", "ntfc"),
    ("option", "opt"),
    ("product", "prd"),
    ("query", "qr"),
    ("resource", "res"),
    ("search", "srch"),
    ("session", "sess"),
    ("shipping", "shpp"),
    ("status", "sts"),
    ("super", "spr"),
    ("title", "ttl"),
    ("user", "usr"),
    ("value", "val"),
    ("varchar", "vchr"),
    ("website", "ws"),
];

/// Resolver following the installation's identifier convention
///
/// - `primary` constraints are always named `PRIMARY`
/// - other names are `<table>_<columns...>` upper-cased
/// - when that exceeds [`IDENTIFIER_MAX_LENGTH`], words are abbreviated,
///   then the name falls back to `<prefix><md5>` (`IDX_`, `UNQ_`, `FTI_`, `FK_`)
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentifierNameResolver;

impl IdentifierNameResolver {
    pub fn new() -> Self {
        Self
    }

    fn index_prefix(index_type: Option<&str>) -> &'static str {
        match index_type.map(str::to_ascii_lowercase).as_deref() {
            Some("unique") => "unq_",
            Some("fulltext") => "fti_",
            _ => "idx_",
        }
    }
}

impl ElementNameResolver for IdentifierNameResolver {
    fn full_index_name(&self, table: &Table, columns: &[String], index_type: Option<&str>) -> String {
        if index_type.is_some_and(|t| t.eq_ignore_ascii_case(ConstraintDeclaration::PRIMARY)) {
            return ConstraintDeclaration::PRIMARY.to_ascii_uppercase();
        }

        let entity = std::iter::once(table.name.as_str())
            .chain(columns.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("_");

        shorten_entity_name(&entity, Self::index_prefix(index_type)).to_ascii_uppercase()
    }

    fn full_fk_name(
        &self,
        table: &Table,
        column: &Column,
        reference_table: &Table,
        reference_column: &Column,
    ) -> String {
        let entity = format!(
            "{}_{}_{}_{}",
            table.name, column.name, reference_table.name, reference_column.name
        );

        shorten_entity_name(&entity, "fk_").to_ascii_uppercase()
    }
}

/// Fit `entity` into [`IDENTIFIER_MAX_LENGTH`]
pub fn shorten_entity_name(entity: &str, prefix: &str) -> String {
    if entity.len() <= IDENTIFIER_MAX_LENGTH {
        return entity.to_string();
    }

    let abbreviated = abbreviate(entity);
    if abbreviated.len() <= IDENTIFIER_MAX_LENGTH {
        return abbreviated;
    }

    let mut hashed = format!("{}{:x}", prefix, md5::compute(entity.as_bytes()));
    hashed.truncate(IDENTIFIER_MAX_LENGTH);
    hashed
}

/// Replace known words left to right, longest match first
fn abbreviate(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut rest = name;

    while let Some(ch) = rest.chars().next() {
        let matched = ABBREVIATIONS
            .iter()
            .filter(|(word, _)| rest.starts_with(word))
            .max_by_key(|(word, _)| word.len());

        match matched {
            Some((word, short)) => {
                out.push_str(short);
                rest = &rest[word.len()..];
            }
            None => {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn short_index_name_is_table_and_columns() {
        let resolver = IdentifierNameResolver::new();
        let table = Table::new("t1");

        assert_eq!(resolver.full_index_name(&table, &columns(&["b"]), Some("btree")), "T1_B");
        assert_eq!(resolver.full_index_name(&table, &columns(&["a", "b"]), None), "T1_A_B");
    }

    #[test]
    fn primary_constraint_is_always_primary() {
        let resolver = IdentifierNameResolver::new();
        let table = Table::new("catalog_category_entity");

        assert_eq!(
            resolver.full_index_name(&table, &columns(&["entity_id"]), Some("primary")),
            "PRIMARY"
        );
    }

    #[test]
    fn naming_is_deterministic_and_order_sensitive() {
        let resolver = IdentifierNameResolver::new();
        let table = Table::new("sales_order");
        let forward = columns(&["store_id", "created_at"]);
        let reversed = columns(&["created_at", "store_id"]);

        assert_eq!(
            resolver.full_index_name(&table, &forward, Some("btree")),
            resolver.full_index_name(&table, &forward, Some("btree"))
        );
        assert_ne!(
            resolver.full_index_name(&table, &forward, Some("btree")),
            resolver.full_index_name(&table, &reversed, Some("btree"))
        );
    }

    #[test]
    fn unique_constraint_keeps_full_name_when_it_fits() {
        let resolver = IdentifierNameResolver::new();
        let table = Table::new("catalog_category_entity_int");

        assert_eq!(
            resolver.full_index_name(
                &table,
                &columns(&["entity_id", "attribute_id", "store_id"]),
                Some("unique")
            ),
            "CATALOG_CATEGORY_ENTITY_INT_ENTITY_ID_ATTRIBUTE_ID_STORE_ID"
        );
    }

    #[test]
    fn long_foreign_key_name_is_abbreviated() {
        let resolver = IdentifierNameResolver::new();
        let table = Table::new("catalog_category_entity_int");
        let column = Column::new("attribute_id");
        let reference_table = Table::new("eav_attribute");
        let reference_column = Column::new("attribute_id");

        assert_eq!(
            resolver.full_fk_name(&table, &column, &reference_table, &reference_column),
            "CAT_CTGR_ENTT_INT_ATTR_ID_EAV_ATTR_ATTR_ID"
        );
    }

    #[test]
    fn hopeless_names_are_hashed_with_prefix() {
        let resolver = IdentifierNameResolver::new();
        let table = Table::new("very_long_custom_table_name_without_known_words_xyz");
        let cols = columns(&["first_long_column_qqq", "second_long_column_zzz"]);

        let unique = resolver.full_index_name(&table, &cols, Some("unique"));
        assert!(unique.starts_with("UNQ_"));
        assert_eq!(unique.len(), 4 + 32);

        let fulltext = resolver.full_index_name(&table, &cols, Some("fulltext"));
        assert!(fulltext.starts_with("FTI_"));

        let index = resolver.full_index_name(&table, &cols, Some("btree"));
        assert!(index.starts_with("IDX_"));
        assert_eq!(&index[4..], &unique[4..]);
    }

    #[test]
    fn abbreviation_prefers_longest_word() {
        assert_eq!(abbreviate("catalog_category"), "cat_ctgr");
        assert_eq!(abbreviate("entity_datetime"), "entt_dtime");
        assert_eq!(abbreviate("xyz"), "xyz");
    }

    #[test]
    fn shorten_keeps_names_within_limit() {
        let exact = "a".repeat(IDENTIFIER_MAX_LENGTH);
        assert_eq!(shorten_entity_name(&exact, "idx_"), exact);

        let long = "q".repeat(IDENTIFIER_MAX_LENGTH + 1);
        let shortened = shorten_entity_name(&long, "idx_");
        assert!(shortened.len() <= IDENTIFIER_MAX_LENGTH);
        assert!(shortened.starts_with("idx_"));
    }
}
