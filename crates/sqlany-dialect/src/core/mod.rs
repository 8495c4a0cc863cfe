//! Core types shared by the introspection and translation engines.
//!
//! - [`schema`]: table, column, and foreign key descriptors
//! - [`value`]: values, rows, and bound parameters
//! - [`identifier`]: quoting and table name resolution
//! - [`traits`]: seams to the execution backend and metadata sources

pub mod identifier;
pub mod schema;
pub mod traits;
pub mod value;

pub use identifier::{resolve_table_name, SqlAnywhereQuoter, TableName};
pub use schema::{AbstractType, Column, ForeignKey, Table};
pub use traits::{AttributeSource, CatalogExecutor, ConnectionAttribute, Quoter, TableSchemaSource};
pub use value::{Params, Row, SqlValue};
