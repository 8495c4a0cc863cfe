//! Declarative catalog queries against the SQL Anywhere system tables.
//!
//! Each query is a fixed join graph with named `:param` placeholders, so
//! the SQL text never contains caller data and can be checked without a
//! live engine.

use std::fmt;
use std::str::FromStr;

use crate::core::identifier::quote_value;
use crate::core::value::{Params, SqlValue};
use crate::error::{DialectError, Result};

/// `SYSTAB.table_type` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum TableType {
    Base = 1,
    MaterializedView = 2,
    View = 21,
}

impl TableType {
    /// Types listed by [`CatalogQuery::table_names`]; materialized views are left out.
    pub const LISTED: [TableType; 2] = [TableType::Base, TableType::View];

    /// `SYSTAB.table_type` code.
    pub fn code(&self) -> i64 {
        *self as i64
    }
}

/// Index-backed constraint kinds that can be enumerated from `SYSIDX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
}

impl ConstraintKind {
    /// `SYSIDX.index_category` value for this kind.
    pub fn index_category(&self) -> i64 {
        match self {
            ConstraintKind::PrimaryKey => 1,
            ConstraintKind::Unique => 3,
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::PrimaryKey => f.write_str("PRIMARY KEY"),
            ConstraintKind::Unique => f.write_str("UNIQUE"),
        }
    }
}

impl FromStr for ConstraintKind {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PRIMARY KEY" => Ok(ConstraintKind::PrimaryKey),
            "UNIQUE" => Ok(ConstraintKind::Unique),
            other => Err(DialectError::parameter(format!(
                "invalid constraint type '{}', use PRIMARY KEY or UNIQUE",
                other
            ))),
        }
    }
}

const COLUMNS_SQL: &str = r#"SELECT t1.column_name, t1.nulls, STRING(t5.domain_name, '(', t1.width, ')') AS data_type,
    t1."default" AS column_default,
    (IF t1."default" IN ('autoincrement', 'global autoincrement') THEN 1 ELSE 0 END IF) AS is_identity,
    t4.remarks AS "comment"
FROM SYSTABCOL AS t1
INNER JOIN SYSTAB AS t2
    ON t2.table_id = t1.table_id
INNER JOIN SYSOBJECT AS t3
    ON t3.object_id = t1.object_id
LEFT JOIN SYSREMARK AS t4
    ON t4.object_id = t1.object_id
INNER JOIN SYSDOMAIN AS t5
    ON t5.domain_id = t1.domain_id
WHERE t2.table_name = :tableName
ORDER BY t1.column_id"#;

const TABLE_CONSTRAINTS_SQL: &str = r#"SELECT SYSIDX.index_name, SYSCOLUMN.column_name AS field_name
FROM SYSIDX
INNER JOIN SYSTABLE
    ON SYSTABLE.table_id = SYSIDX.table_id
    AND SYSTABLE.table_name = :tableName
INNER JOIN SYSIDXCOL
    ON SYSIDXCOL.index_id = SYSIDX.index_id
    AND SYSIDXCOL.table_id = SYSIDX.table_id
INNER JOIN SYSCOLUMN
    ON SYSIDXCOL.column_id = SYSCOLUMN.column_id
    AND SYSIDXCOL.table_id = SYSCOLUMN.table_id
WHERE SYSIDX.index_category = :indexCategory
ORDER BY SYSIDX.index_name, SYSIDXCOL."sequence""#;

// The referencing side is the table being loaded. Referenced columns are
// paired with local ones by key position, not by column id.
const FOREIGN_KEYS_SQL: &str = r#"SELECT fi.index_name AS "fk_name", ft4.column_name AS "fk_column_name",
    pt2.table_name AS "uq_table_name", pt4.column_name AS "uq_column_name"
FROM SYSFKEY AS t1
INNER JOIN SYSIDX AS fi
    ON fi.table_id = t1.foreign_table_id
    AND fi.index_id = t1.foreign_index_id
INNER JOIN SYSTAB AS ft2
    ON ft2.table_id = t1.foreign_table_id
INNER JOIN SYSIDXCOL AS ft3
    ON ft3.table_id = t1.foreign_table_id
    AND ft3.index_id = t1.foreign_index_id
INNER JOIN SYSTABCOL AS ft4
    ON ft4.table_id = t1.foreign_table_id
    AND ft4.column_id = ft3.column_id
INNER JOIN SYSTAB AS pt2
    ON pt2.table_id = t1.primary_table_id
INNER JOIN SYSIDXCOL AS pt3
    ON pt3.table_id = t1.primary_table_id
    AND pt3.index_id = t1.primary_index_id
    AND pt3."sequence" = ft3."sequence"
INNER JOIN SYSTABCOL AS pt4
    ON pt4.table_id = t1.primary_table_id
    AND pt4.column_id = pt3.column_id
WHERE ft2.table_name = :tableName
ORDER BY fi.index_name, ft3."sequence""#;

const TABLE_NAMES_SQL: &str = r#"SELECT t.table_name
FROM SYSTAB AS t
WHERE t.table_type IN (:baseType, :viewType)
ORDER BY t.table_name"#;

/// A named catalog query with its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    /// Stable query name, used in logs and by test fakes.
    pub name: &'static str,
    /// SQL text with `:param` placeholders.
    pub sql: &'static str,
    /// Named parameters, keys include the leading colon.
    pub params: Params,
}

impl CatalogQuery {
    fn new(name: &'static str, sql: &'static str) -> Self {
        Self {
            name,
            sql,
            params: Params::new(),
        }
    }

    fn bind(mut self, name: &str, value: impl Into<SqlValue>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    /// Column discovery for one table.
    pub fn columns(table: &str) -> Self {
        Self::new("columns", COLUMNS_SQL).bind(":tableName", table)
    }

    /// Index columns of one constraint kind for one table.
    pub fn table_constraints(table: &str, kind: ConstraintKind) -> Self {
        let name = match kind {
            ConstraintKind::PrimaryKey => "primary_key",
            ConstraintKind::Unique => "unique_indexes",
        };
        Self::new(name, TABLE_CONSTRAINTS_SQL)
            .bind(":tableName", table)
            .bind(":indexCategory", kind.index_category())
    }

    /// Foreign keys declared on one table.
    pub fn foreign_keys(table: &str) -> Self {
        Self::new("foreign_keys", FOREIGN_KEYS_SQL).bind(":tableName", table)
    }

    /// Base tables and views.
    pub fn table_names() -> Self {
        let [base, view] = TableType::LISTED;
        Self::new("table_names", TABLE_NAMES_SQL)
            .bind(":baseType", base.code())
            .bind(":viewType", view.code())
    }

    /// Rewrite named placeholders to `?` and return values in placeholder order.
    pub fn to_positional(&self) -> Result<(String, Vec<SqlValue>)> {
        let mut values = Vec::new();
        let sql = rewrite_placeholders(self.sql, |name| {
            let value = self.lookup(name)?;
            values.push(value.clone());
            Ok("?".to_string())
        })?;
        Ok((sql, values))
    }

    /// Render the query with parameter values inlined as literals.
    pub fn inline(&self) -> Result<String> {
        rewrite_placeholders(self.sql, |name| Ok(quote_value(self.lookup(name)?)))
    }

    fn lookup(&self, name: &str) -> Result<&SqlValue> {
        self.params.get(name).ok_or_else(|| {
            DialectError::parameter(format!(
                "catalog query '{}' has no value bound for {}",
                self.name, name
            ))
        })
    }
}

/// Inline named parameters of arbitrary SQL as literals.
///
/// Used by drivers that cannot bind named parameters.
pub fn inline_params(sql: &str, params: &Params) -> Result<String> {
    rewrite_placeholders(sql, |name| {
        params
            .get(name)
            .map(quote_value)
            .ok_or_else(|| DialectError::parameter(format!("no value bound for {}", name)))
    })
}

/// Replace every `:name` placeholder outside quoted text.
fn rewrite_placeholders<F>(sql: &str, mut replace: F) -> Result<String>
where
    F: FnMut(&str) -> Result<String>,
{
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.char_indices().peekable();
    let mut quote: Option<char> = None;

    while let Some((i, c)) = chars.next() {
        match quote {
            Some(q) => {
                out.push(c);
                if c == q {
                    quote = None;
                }
            }
            None if c == '\'' || c == '"' => {
                quote = Some(c);
                out.push(c);
            }
            None if c == ':' => {
                let start = i + 1;
                let mut end = start;
                while let Some(&(j, n)) = chars.peek() {
                    if n.is_ascii_alphanumeric() || n == '_' {
                        end = j + n.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                if end == start {
                    out.push(c);
                } else {
                    out.push_str(&replace(&sql[i..end])?);
                }
            }
            None => out.push(c),
        }
    }

    Ok(out)
}
