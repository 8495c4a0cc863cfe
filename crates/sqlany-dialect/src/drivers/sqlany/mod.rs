//! SQL Anywhere driver.
//!
//! - [`SchemaIntrospector`]: table metadata from the system catalog
//! - [`DialectTranslator`]: engine-specific statement text
//! - [`Session`]: server version, identity values, savepoints
//! - `OdbcExecutor` (feature `odbc`): execution backend over ODBC

pub mod catalog;
mod dialect;
mod pagination;
mod reader;
mod session;

#[cfg(feature = "odbc")]
mod odbc;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::{inline_params, CatalogQuery, ConstraintKind, TableType};
pub use dialect::{
    create_savepoint_sql, release_savepoint_sql, rollback_savepoint_sql, DialectTranslator,
    InOperator, ValueRow, DEFAULT_ORDER_BY,
};
pub use pagination::{find_insertion_point, inject_limit_clause, InsertionPoint};
pub use reader::{classify_column, typecast_default, ColumnInfo, SchemaIntrospector};
pub use session::{Session, LAST_IDENTITY_SQL, SERVER_VERSION_SQL};

#[cfg(feature = "odbc")]
pub use odbc::OdbcExecutor;
