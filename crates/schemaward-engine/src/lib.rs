//! Schemaward Engine
//!
//! Whitelist generation: canonical element naming, per-module whitelist
//! building and the generation entry point.

pub mod error;
pub mod name_resolver;
pub mod whitelist_builder;
pub mod generator;

pub use error::GenerateError;
pub use name_resolver::{shorten_entity_name, ElementNameResolver, IdentifierNameResolver, IDENTIFIER_MAX_LENGTH};
pub use whitelist_builder::{
    autogenerated_elements, filter_primary_tables, fixed_name_elements, AutogeneratedElements,
    ModuleGeneration, WhitelistBuilder,
};
pub use generator::{check_installation, WhitelistGenerator};
