//! Connection-level helpers: server version, identity values, savepoints.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::traits::{AttributeSource, CatalogExecutor, ConnectionAttribute};
use crate::core::value::{Params, SqlValue};
use crate::error::{DialectError, Result};

use super::dialect::{create_savepoint_sql, release_savepoint_sql, rollback_savepoint_sql};

/// Scalar query used when the driver cannot report the server version.
pub const SERVER_VERSION_SQL: &str = "SELECT CAST(SERVERPROPERTY('productversion') AS VARCHAR)";

/// Identity value generated by the last insert on this connection.
pub const LAST_IDENTITY_SQL: &str = "SELECT @@IDENTITY";

/// Wraps a connection with the engine-specific session operations.
pub struct Session<E> {
    executor: Arc<E>,
}

impl<E> Session<E>
where
    E: CatalogExecutor + AttributeSource,
{
    pub fn new(executor: Arc<E>) -> Self {
        Self { executor }
    }

    /// Underlying executor.
    pub fn executor(&self) -> &Arc<E> {
        &self.executor
    }

    /// Read a connection attribute.
    ///
    /// When the driver fails to report the server version, the version is
    /// asked from the server itself. Other attribute failures propagate.
    pub async fn attribute(&self, attr: ConnectionAttribute) -> Result<Option<String>> {
        match self.executor.attribute(attr).await {
            Ok(value) => Ok(value),
            Err(e) if attr == ConnectionAttribute::ServerVersion => {
                warn!("Driver cannot report server version ({}), querying server", e);
                let version = self
                    .executor
                    .query_scalar(SERVER_VERSION_SQL, &Params::new())
                    .await?
                    .filter(|v| !v.is_null())
                    .map(|v| v.to_string());
                if let Some(ref v) = version {
                    info!("Server version {}", v);
                }
                Ok(version)
            }
            Err(e) => Err(e),
        }
    }

    /// Server version string.
    pub async fn server_version(&self) -> Result<Option<String>> {
        self.attribute(ConnectionAttribute::ServerVersion).await
    }

    /// Last identity value generated on this connection, in any table.
    pub async fn last_insert_id(&self) -> Result<Option<i64>> {
        match self
            .executor
            .query_scalar(LAST_IDENTITY_SQL, &Params::new())
            .await?
        {
            None | Some(SqlValue::Null) => Ok(None),
            Some(value) => value.as_i64().map(Some).ok_or_else(|| {
                DialectError::SchemaExtraction(format!(
                    "@@IDENTITY returned a non-integer value: {}",
                    value
                ))
            }),
        }
    }

    async fn run(&self, sql: String) -> Result<()> {
        debug!("{}", sql);
        self.executor.execute(&sql, &Params::new()).await?;
        Ok(())
    }

    /// Set a named savepoint in the current transaction.
    pub async fn create_savepoint(&self, name: &str) -> Result<()> {
        self.run(create_savepoint_sql(name)?).await
    }

    /// Release a named savepoint.
    pub async fn release_savepoint(&self, name: &str) -> Result<()> {
        self.run(release_savepoint_sql(name)?).await
    }

    /// Roll back to a named savepoint.
    pub async fn rollback_savepoint(&self, name: &str) -> Result<()> {
        self.run(rollback_savepoint_sql(name)?).await
    }
}
