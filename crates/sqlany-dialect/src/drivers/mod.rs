//! Database driver implementations.
//!
//! Only SQL Anywhere is provided. The driver module keeps catalog queries,
//! introspection, statement translation and session helpers together; an
//! execution backend is plugged in through [`CatalogExecutor`](crate::core::CatalogExecutor).

pub mod sqlany;

pub use sqlany::{DialectTranslator, InOperator, SchemaIntrospector, Session};

#[cfg(feature = "odbc")]
pub use sqlany::OdbcExecutor;
