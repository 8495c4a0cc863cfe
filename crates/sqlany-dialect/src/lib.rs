//! # sqlany-dialect
//!
//! SQL Anywhere dialect layer for engine-neutral query and schema code.
//!
//! This library provides:
//!
//! - **Schema introspection** from the system catalog (columns, primary
//!   keys, unique indexes, foreign keys)
//! - **Statement translation** for pagination, renames, comments,
//!   composite IN conditions and existence checks
//! - **Type mapping** between abstract column types and engine declarations
//! - **Session helpers** for server version, identity values and savepoints
//!
//! Statements are executed by a caller-supplied [`CatalogExecutor`]; the
//! `odbc` feature adds one over `odbc-api`.
//!
//! ## Example
//!
//! ```rust
//! use sqlany_dialect::{DialectConfig, DialectTranslator};
//!
//! let translator = DialectTranslator::new(DialectConfig::default());
//! let sql = translator.build_order_by_and_limit("SELECT * FROM T", "", Some(10), None);
//! assert_eq!(sql, "SELECT TOP 10 * FROM T ORDER BY (SELECT NULL)");
//! ```

pub mod config;
pub mod core;
pub mod dialect;
pub mod drivers;
pub mod error;

// Re-exports for convenient access
pub use config::{Config, ConnectionConfig, DialectConfig, OffsetMode};
pub use self::core::{
    AbstractType, AttributeSource, CatalogExecutor, Column, ConnectionAttribute, ForeignKey,
    Params, Quoter, Row, SqlValue, Table, TableSchemaSource,
};
pub use dialect::TypeMap;
pub use drivers::{DialectTranslator, InOperator, SchemaIntrospector, Session};
pub use error::{DialectError, Result};

#[cfg(feature = "odbc")]
pub use drivers::OdbcExecutor;
