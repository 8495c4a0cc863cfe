//! ODBC execution backend for SQL Anywhere.
//!
//! **Requirements:**
//! - The `odbc` feature must be enabled
//! - The SQL Anywhere ODBC driver must be installed and registered with the
//!   driver manager under the name given in `connection.driver`
//!
//! Values come back as text; typed interpretation happens in the
//! introspector. Named parameters are inlined as literals before execution.
//!
//! One connection is opened per executor and every statement runs on it, so
//! `@@IDENTITY` and savepoints see the same session as the statements before
//! them.

use std::sync::OnceLock;

use async_trait::async_trait;
use odbc_api::{buffers::TextRowSet, Connection, ConnectionOptions, Cursor, Environment, ResultSetMetadata};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::core::traits::{AttributeSource, CatalogExecutor, ConnectionAttribute};
use crate::core::value::{Params, Row, SqlValue};
use crate::error::{DialectError, Result};

use super::catalog::inline_params;

const BATCH_SIZE: usize = 1000;
const MAX_TEXT_LEN: usize = 4096;

static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

/// Process-wide ODBC environment, created on first use.
fn shared_environment() -> Result<&'static Environment> {
    if let Some(env) = ENVIRONMENT.get() {
        return Ok(env);
    }
    let env = Environment::new()
        .map_err(|e| DialectError::database("creating ODBC environment", e))?;
    // Losing a race drops this environment.
    let _ = ENVIRONMENT.set(env);
    ENVIRONMENT
        .get()
        .ok_or_else(|| DialectError::Config("ODBC environment unavailable".to_string()))
}

/// Catalog executor over a single ODBC connection.
pub struct OdbcExecutor {
    /// Serializes ODBC calls on the session.
    connection: Mutex<Connection<'static>>,
    target: String,
}

impl OdbcExecutor {
    /// Open the connection and verify that it answers.
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        let env = shared_environment()?;
        let connection_string = config.connection_string();
        let target = format!("{}:{}/{}", config.host, config.port, config.database);

        debug!(
            "ODBC connection string (credentials hidden): Driver={{{}}};Host={}:{};DatabaseName={};...",
            config.driver, config.host, config.port, config.database
        );

        let conn = env
            .connect_with_connection_string(&connection_string, ConnectionOptions::default())
            .map_err(|e| {
                DialectError::database(
                    format!("connecting to {} with driver '{}'", target, config.driver),
                    e,
                )
            })?;
        conn.execute("SELECT 1", ())
            .map_err(|e| DialectError::database(format!("checking connection to {}", target), e))?;

        info!("Connected to SQL Anywhere via ODBC: {}", target);

        Ok(Self {
            connection: Mutex::new(conn),
            target,
        })
    }

    /// `host:port/database` this executor is connected to.
    pub fn target(&self) -> &str {
        &self.target
    }
}

fn query_sync(conn: &Connection<'_>, sql: &str) -> Result<Vec<Row>> {
    let mut rows = Vec::new();

    let cursor = conn
        .execute(sql, ())
        .map_err(|e| DialectError::database(format!("running query: {}", sql), e))?;

    if let Some(mut cursor) = cursor {
        let num_cols = cursor.num_result_cols()?.max(0) as u16;
        let mut names = Vec::with_capacity(num_cols as usize);
        for col in 1..=num_cols {
            names.push(cursor.col_name(col)?);
        }

        let mut buffers = TextRowSet::for_cursor(BATCH_SIZE, &mut cursor, Some(MAX_TEXT_LEN))?;
        let mut row_cursor = cursor.bind_buffer(&mut buffers)?;

        while let Some(batch) = row_cursor.fetch()? {
            for row_idx in 0..batch.num_rows() {
                let values = (0..num_cols as usize)
                    .map(|col| {
                        batch.at(col, row_idx).map_or(SqlValue::Null, |bytes| {
                            SqlValue::Text(String::from_utf8_lossy(bytes).into_owned())
                        })
                    })
                    .collect();
                rows.push(Row::new(names.clone(), values));
            }
        }
    }

    Ok(rows)
}

fn execute_sync(conn: &Connection<'_>, sql: &str) -> Result<u64> {
    let mut statement = conn.preallocate()?;
    statement
        .execute(sql, ())
        .map_err(|e| DialectError::database(format!("executing: {}", sql), e))?;
    Ok(statement.row_count()?.unwrap_or(0) as u64)
}

#[async_trait]
impl CatalogExecutor for OdbcExecutor {
    async fn query(&self, sql: &str, params: &Params) -> Result<Vec<Row>> {
        let sql = inline_params(sql, params)?;
        let conn = self.connection.lock().await;
        let rows = query_sync(&conn, &sql)?;
        debug!("ODBC query returned {} rows", rows.len());
        Ok(rows)
    }

    async fn execute(&self, sql: &str, params: &Params) -> Result<u64> {
        let sql = inline_params(sql, params)?;
        let conn = self.connection.lock().await;
        execute_sync(&conn, &sql)
    }
}

#[async_trait]
impl AttributeSource for OdbcExecutor {
    async fn attribute(&self, attr: ConnectionAttribute) -> Result<Option<String>> {
        match attr {
            ConnectionAttribute::ServerInfo => {
                let conn = self.connection.lock().await;
                Ok(Some(conn.database_management_system_name()?))
            }
            other => Err(DialectError::not_supported(format!(
                "ODBC driver does not report {}",
                other.as_str()
            ))),
        }
    }
}
