//! Seams to the collaborators this crate does not implement itself.
//!
//! - [`CatalogExecutor`]: sends SQL text with bound parameters
//! - [`AttributeSource`]: reports connection attributes from the driver
//! - [`Quoter`]: identifier and value quoting
//! - [`TableSchemaSource`]: resolves table metadata (introspector or a caller cache)

use async_trait::async_trait;

use crate::error::Result;

use super::schema::Table;
use super::value::{Params, Row, SqlValue};

/// Executes statements against the database.
///
/// Every call is one round trip. Introspection awaits them one after
/// another and never retries.
#[async_trait]
pub trait CatalogExecutor: Send + Sync {
    /// Run a query and return all rows.
    async fn query(&self, sql: &str, params: &Params) -> Result<Vec<Row>>;

    /// Run a statement and return the affected row count.
    async fn execute(&self, sql: &str, params: &Params) -> Result<u64>;

    /// Run a query and return the first column of the first row.
    async fn query_scalar(&self, sql: &str, params: &Params) -> Result<Option<SqlValue>> {
        let rows = self.query(sql, params).await?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.into_values().into_iter().next()))
    }
}

/// Connection attributes a driver may be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionAttribute {
    ServerVersion,
    ClientVersion,
    DriverName,
    ServerInfo,
}

impl ConnectionAttribute {
    /// Attribute name for messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionAttribute::ServerVersion => "server version",
            ConnectionAttribute::ClientVersion => "client version",
            ConnectionAttribute::DriverName => "driver name",
            ConnectionAttribute::ServerInfo => "server info",
        }
    }
}

/// Reads connection attributes from the underlying driver.
#[async_trait]
pub trait AttributeSource: Send + Sync {
    /// Fetch an attribute; drivers that cannot report it return an error.
    async fn attribute(&self, attr: ConnectionAttribute) -> Result<Option<String>>;
}

/// Quotes identifiers and values for embedding in SQL text.
pub trait Quoter: Send + Sync {
    /// Quote a possibly schema-qualified table name.
    fn quote_table_name(&self, name: &str) -> String;

    /// Quote a possibly table-qualified column name.
    fn quote_column_name(&self, name: &str) -> String;

    /// Render a value as a SQL literal.
    fn quote_value(&self, value: &SqlValue) -> String;
}

/// Resolves table metadata by name.
#[async_trait]
pub trait TableSchemaSource: Send + Sync {
    /// Load metadata for a table, `None` when it does not exist.
    async fn table_schema(&self, name: &str) -> Result<Option<Table>>;
}
