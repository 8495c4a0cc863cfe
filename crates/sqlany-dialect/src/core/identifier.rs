//! Identifier quoting, value literals, and table name resolution.
//!
//! SQL Anywhere quotes identifiers with double quotes. Quoting is
//! idempotent: a name that already contains a double quote is assumed to be
//! quoted and passes through untouched, so callers may hand in either raw
//! or pre-quoted names.

use serde::{Deserialize, Serialize};

use crate::error::{DialectError, Result};

use super::traits::Quoter;
use super::value::SqlValue;

/// Maximum identifier length accepted by the engine.
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Validate an identifier for security issues.
///
/// Rejects empty names, names containing null bytes, and names longer than
/// the engine limit.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DialectError::parameter("Identifier cannot be empty"));
    }

    if name.contains('\0') {
        return Err(DialectError::parameter(format!(
            "Identifier contains null byte: {:?}",
            name
        )));
    }

    if name.chars().count() > MAX_IDENTIFIER_LENGTH {
        return Err(DialectError::parameter(format!(
            "Identifier exceeds maximum length of {} characters: {:?}",
            MAX_IDENTIFIER_LENGTH, name
        )));
    }

    Ok(())
}

/// Quote a table name that has no schema prefix.
pub fn quote_simple_table_name(name: &str) -> String {
    if name.contains('"') {
        name.to_string()
    } else {
        format!("\"{}\"", name)
    }
}

/// Quote a column name that has no table prefix. `*` is left alone.
pub fn quote_simple_column_name(name: &str) -> String {
    if name.contains('"') || name == "*" {
        name.to_string()
    } else {
        format!("\"{}\"", name)
    }
}

/// Quote a possibly schema-qualified table name part by part.
///
/// Expressions (anything with a parenthesis) are returned unchanged.
pub fn quote_table_name(name: &str) -> String {
    if name.contains('(') {
        return name.to_string();
    }
    name.split('.')
        .map(quote_simple_table_name)
        .collect::<Vec<_>>()
        .join(".")
}

/// Quote a possibly table-qualified column name.
///
/// Expressions (anything with a parenthesis) are returned unchanged.
pub fn quote_column_name(name: &str) -> String {
    if name.contains('(') {
        return name.to_string();
    }
    match name.rfind('.') {
        Some(pos) if !name.contains('"') => format!(
            "{}.{}",
            quote_table_name(&name[..pos]),
            quote_simple_column_name(&name[pos + 1..])
        ),
        _ => quote_simple_column_name(name),
    }
}

/// Render a value as a SQL literal.
///
/// Strings have embedded single quotes doubled.
pub fn quote_value(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => "NULL".to_string(),
        SqlValue::Bool(_) | SqlValue::I64(_) | SqlValue::F64(_) | SqlValue::Decimal(_) => {
            value.to_string()
        }
        SqlValue::Bytes(_) => value.to_string(),
        SqlValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
        other => format!("'{}'", other),
    }
}

/// Default quoting rules of the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlAnywhereQuoter;

impl Quoter for SqlAnywhereQuoter {
    fn quote_table_name(&self, name: &str) -> String {
        quote_table_name(name)
    }

    fn quote_column_name(&self, name: &str) -> String {
        quote_column_name(name)
    }

    fn quote_value(&self, value: &SqlValue) -> String {
        quote_value(value)
    }
}

/// A table name split into schema and table, plus the display name used as cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableName {
    /// Schema (owner) name.
    pub schema: String,
    /// Bare table name.
    pub name: String,
    /// `schema.name` when the schema differs from the default, otherwise `name`.
    pub full_name: String,
}

/// Resolve a possibly quoted, possibly schema-qualified name.
///
/// Quotes are stripped before splitting on `.`. With more than two parts
/// the last two are used, so a leading database qualifier is ignored.
pub fn resolve_table_name(name: &str, default_schema: &str) -> TableName {
    let unquoted = name.replace('"', "");
    let parts: Vec<&str> = unquoted.split('.').collect();

    if parts.len() >= 2 {
        let schema = parts[parts.len() - 2].to_string();
        let table = parts[parts.len() - 1].to_string();
        let full_name = if schema != default_schema {
            format!("{}.{}", schema, table)
        } else {
            table.clone()
        };
        TableName {
            schema,
            name: table,
            full_name,
        }
    } else {
        TableName {
            schema: default_schema.to_string(),
            name: unquoted.clone(),
            full_name: unquoted,
        }
    }
}
