//! Configuration validation.

use super::Config;
use crate::error::{DialectError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    if let Some(conn) = &config.connection {
        if conn.host.is_empty() {
            return Err(DialectError::Config("connection.host is required".into()));
        }
        if conn.database.is_empty() {
            return Err(DialectError::Config("connection.database is required".into()));
        }
        if conn.user.is_empty() {
            return Err(DialectError::Config("connection.user is required".into()));
        }
        if conn.port == 0 {
            return Err(DialectError::Config("connection.port must be non-zero".into()));
        }
        if conn.driver.trim().is_empty() {
            return Err(DialectError::Config("connection.driver cannot be empty".into()));
        }
    }

    let dialect = &config.dialect;
    if dialect.param_prefix.len() < 2 || !dialect.param_prefix.starts_with(':') {
        return Err(DialectError::Config(format!(
            "dialect.param_prefix must start with ':' followed by a name, got '{}'",
            dialect.param_prefix
        )));
    }
    if !dialect.param_prefix[1..]
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(DialectError::Config(format!(
            "dialect.param_prefix may only contain letters, digits, and '_' after ':', got '{}'",
            dialect.param_prefix
        )));
    }
    if dialect.default_schema.contains('.') || dialect.default_schema.contains('"') {
        return Err(DialectError::Config(format!(
            "dialect.default_schema must be a bare schema name, got '{}'",
            dialect.default_schema
        )));
    }
    if dialect.comment_property.is_empty() || dialect.comment_property.contains('\'') {
        return Err(DialectError::Config(
            "dialect.comment_property must be non-empty and contain no quotes".into(),
        ));
    }

    Ok(())
}
