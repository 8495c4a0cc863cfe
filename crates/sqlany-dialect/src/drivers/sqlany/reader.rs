//! Schema introspection from the SQL Anywhere system catalog.
//!
//! Metadata is reconstructed purely from catalog queries: primary key,
//! columns, then foreign keys, issued one after another per load.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::DialectConfig;
use crate::core::identifier::resolve_table_name;
use crate::core::schema::{AbstractType, Column, ForeignKey, Table};
use crate::core::traits::{CatalogExecutor, TableSchemaSource};
use crate::core::value::{Row, SqlValue};
use crate::dialect::PhysicalType;
use crate::error::{DialectError, Result};

use super::catalog::{CatalogQuery, ConstraintKind};

/// Raw column discovery row.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub column_name: String,
    pub nulls: String,
    pub data_type: String,
    pub column_default: Option<String>,
    pub is_identity: bool,
    pub comment: Option<String>,
}

impl ColumnInfo {
    /// Decode a column discovery row.
    pub fn from_row(row: &Row) -> Result<Self> {
        let column_name = row.get_string("column_name").ok_or_else(|| {
            DialectError::SchemaExtraction("column row without column_name".to_string())
        })?;
        Ok(Self {
            column_name,
            nulls: row.get_string("nulls").unwrap_or_default(),
            data_type: row.get_string("data_type").unwrap_or_default(),
            column_default: row.get_string("column_default"),
            is_identity: row.get_i64("is_identity").unwrap_or(0) == 1,
            comment: row.get_string("comment"),
        })
    }
}

/// Classify a discovery row into a column descriptor.
///
/// Width narrowing: `bit(1)` and `tinyint(1)` become boolean, `bit(32)`
/// becomes integer, and any wider `bit` becomes bigint.
pub fn classify_column(info: &ColumnInfo, primary_key: &[String]) -> Column {
    let parsed = PhysicalType::parse(&info.data_type);
    let mut abstract_type = parsed.abstract_type();

    let size = parsed.args.first().and_then(|a| a.parse::<u32>().ok());
    let scale = parsed.args.get(1).and_then(|a| a.parse::<u32>().ok());

    if let Some(size) = size {
        let name = parsed.name.as_str();
        if size == 1 && (name == "tinyint" || name == "bit") {
            abstract_type = AbstractType::Boolean;
        } else if name == "bit" {
            if size > 32 {
                abstract_type = AbstractType::Bigint;
            } else if size == 32 {
                abstract_type = AbstractType::Integer;
            }
        }
    }

    let is_primary_key = primary_key
        .iter()
        .any(|pk| pk.eq_ignore_ascii_case(&info.column_name));

    let raw_default = info
        .column_default
        .as_deref()
        .filter(|d| !d.eq_ignore_ascii_case("(NULL)") && !d.eq_ignore_ascii_case("NULL"));

    let engine_managed = is_primary_key
        || info.is_identity
        || (abstract_type == AbstractType::Timestamp
            && raw_default.is_some_and(is_current_timestamp));

    let default_value = if engine_managed {
        None
    } else {
        raw_default.map(|d| typecast_default(d, abstract_type))
    };

    Column {
        name: info.column_name.clone(),
        abstract_type,
        db_type: info.data_type.clone(),
        size,
        precision: size,
        scale,
        allow_null: info.nulls == "Y",
        is_primary_key,
        auto_increment: info.is_identity,
        unsigned: parsed.unsigned,
        comment: info.comment.clone().unwrap_or_default(),
        default_value,
    }
}

fn is_current_timestamp(default: &str) -> bool {
    matches!(
        default.trim().to_ascii_lowercase().as_str(),
        "current_timestamp" | "current timestamp" | "current utc timestamp" | "timestamp"
    )
}

/// Convert a catalog default expression into a value of the column's type.
///
/// Text that does not parse for the target type is kept verbatim.
pub fn typecast_default(raw: &str, abstract_type: AbstractType) -> SqlValue {
    let trimmed = raw.trim();
    let text = unquote_literal(trimmed);

    let parsed = match abstract_type {
        t if t.is_integer() => text.parse::<i64>().ok().map(SqlValue::I64),
        AbstractType::Boolean => match text.to_ascii_lowercase().as_str() {
            "1" | "true" | "on" => Some(SqlValue::Bool(true)),
            "0" | "false" | "off" => Some(SqlValue::Bool(false)),
            _ => None,
        },
        AbstractType::Float | AbstractType::Double => text.parse::<f64>().ok().map(SqlValue::F64),
        AbstractType::Decimal | AbstractType::Money => {
            text.parse::<Decimal>().ok().map(SqlValue::Decimal)
        }
        AbstractType::Date => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .ok()
            .map(SqlValue::Date),
        AbstractType::Time => NaiveTime::parse_from_str(&text, "%H:%M:%S%.f")
            .ok()
            .map(SqlValue::Time),
        AbstractType::Datetime | AbstractType::Timestamp => {
            NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(SqlValue::DateTime)
        }
        _ => Some(SqlValue::Text(text.clone())),
    };

    parsed.unwrap_or(SqlValue::Text(text))
}

/// Strip one level of single quotes and undouble embedded quotes.
fn unquote_literal(s: &str) -> String {
    if s.len() >= 2 && s.starts_with('\'') && s.ends_with('\'') {
        s[1..s.len() - 1].replace("''", "'")
    } else {
        s.to_string()
    }
}

/// Loads table metadata through catalog queries.
///
/// Stateless apart from its configuration: concurrent loads share nothing.
pub struct SchemaIntrospector<E: CatalogExecutor> {
    executor: Arc<E>,
    default_schema: String,
}

impl<E: CatalogExecutor> SchemaIntrospector<E> {
    /// Create an introspector for the session default schema in `config`.
    pub fn new(executor: Arc<E>, config: &DialectConfig) -> Self {
        Self {
            executor,
            default_schema: config.default_schema.clone(),
        }
    }

    /// Session default schema.
    pub fn default_schema(&self) -> &str {
        &self.default_schema
    }

    async fn run(&self, query: &CatalogQuery) -> Result<Vec<Row>> {
        debug!("Running catalog query '{}' with {:?}", query.name, query.params);
        self.executor.query(query.sql, &query.params).await
    }

    /// Load metadata for a table, `None` when it does not exist.
    ///
    /// Failures of column discovery mean "not found". Failures reading
    /// primary keys or foreign keys are returned as errors.
    pub async fn load_table(&self, name: &str) -> Result<Option<Table>> {
        let resolved = resolve_table_name(name, &self.default_schema);
        let mut table = Table::new(resolved.schema, resolved.name, resolved.full_name);

        table.primary_key = self
            .find_table_constraints(&table.name, ConstraintKind::PrimaryKey)
            .await?
            .into_iter()
            .map(|(_, column)| column)
            .collect();

        if !self.find_columns(&mut table).await? {
            return Ok(None);
        }

        table.foreign_keys = self.find_foreign_keys(&table.name).await?;

        debug!(
            "Loaded {} columns, {} foreign keys for {}",
            table.columns.len(),
            table.foreign_keys.len(),
            table.full_name
        );
        Ok(Some(table))
    }

    /// Populate columns and the identity sequence marker; false when the table is absent.
    async fn find_columns(&self, table: &mut Table) -> Result<bool> {
        let query = CatalogQuery::columns(&table.name);
        let rows = match self.run(&query).await {
            Ok(rows) if rows.is_empty() => {
                debug!("No columns found for {}", table.full_name);
                return Ok(false);
            }
            Ok(rows) => rows,
            Err(e) => {
                warn!(
                    "Column discovery for {} failed, treating table as missing: {}",
                    table.full_name, e
                );
                return Ok(false);
            }
        };

        for row in &rows {
            let info = ColumnInfo::from_row(row)?;
            let column = classify_column(&info, &table.primary_key);
            if column.is_primary_key && column.auto_increment {
                table.sequence_name = Some(String::new());
            }
            table.columns.insert(column.name.clone(), column);
        }

        Ok(true)
    }

    /// `(index_name, column_name)` pairs for one constraint kind.
    pub async fn find_table_constraints(
        &self,
        table_name: &str,
        kind: ConstraintKind,
    ) -> Result<Vec<(String, String)>> {
        let query = CatalogQuery::table_constraints(table_name, kind);
        let rows = self.run(&query).await?;

        rows.iter()
            .map(|row| {
                let index = row.get_string("index_name").unwrap_or_default();
                let field = row.get_string("field_name").ok_or_else(|| {
                    DialectError::SchemaExtraction(format!(
                        "{} row for {} without field_name",
                        kind, table_name
                    ))
                })?;
                Ok((index, field))
            })
            .collect()
    }

    /// Same as [`find_table_constraints`](Self::find_table_constraints) with a textual kind.
    pub async fn find_table_constraints_by_name(
        &self,
        table_name: &str,
        kind: &str,
    ) -> Result<Vec<(String, String)>> {
        let kind: ConstraintKind = kind.parse()?;
        self.find_table_constraints(table_name, kind).await
    }

    /// Unique indexes of a table: index name → column names in key order.
    pub async fn find_unique_indexes(&self, table: &Table) -> Result<IndexMap<String, Vec<String>>> {
        let mut result: IndexMap<String, Vec<String>> = IndexMap::new();
        for (index, column) in self
            .find_table_constraints(&table.name, ConstraintKind::Unique)
            .await?
        {
            result.entry(index).or_default().push(column);
        }
        Ok(result)
    }

    /// Foreign keys declared on a table, grouped by constraint.
    pub async fn find_foreign_keys(&self, table_name: &str) -> Result<Vec<ForeignKey>> {
        let query = CatalogQuery::foreign_keys(table_name);
        let rows = self.run(&query).await?;

        let mut keys: IndexMap<String, ForeignKey> = IndexMap::new();
        for row in &rows {
            let (Some(column), Some(ref_table), Some(ref_column)) = (
                row.get_string("fk_column_name"),
                row.get_string("uq_table_name"),
                row.get_string("uq_column_name"),
            ) else {
                return Err(DialectError::SchemaExtraction(format!(
                    "incomplete foreign key row for {}",
                    table_name
                )));
            };
            let name = row
                .get_string("fk_name")
                .unwrap_or_else(|| format!("{}_{}", ref_table, column));

            keys.entry(name.clone())
                .or_insert_with(|| ForeignKey {
                    name,
                    ref_table,
                    columns: IndexMap::new(),
                })
                .columns
                .insert(column, ref_column);
        }

        Ok(keys.into_values().collect())
    }

    /// Names of base tables and views, without schema prefix.
    pub async fn find_table_names(&self) -> Result<Vec<String>> {
        let rows = self.run(&CatalogQuery::table_names()).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get_string("table_name"))
            .collect())
    }
}

#[async_trait]
impl<E: CatalogExecutor> TableSchemaSource for SchemaIntrospector<E> {
    async fn table_schema(&self, name: &str) -> Result<Option<Table>> {
        self.load_table(name).await
    }
}
