//! SQL Anywhere statement translation.
//!
//! Every builder takes generic structural input and returns the exact
//! statement text the engine accepts. Only [`DialectTranslator::check_integrity`]
//! consults the database, and only through a [`TableSchemaSource`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::config::{DialectConfig, OffsetMode};
use crate::core::identifier::{validate_identifier, SqlAnywhereQuoter};
use crate::core::traits::{Quoter, TableSchemaSource};
use crate::core::value::{Params, SqlValue};
use crate::dialect::TypeMap;
use crate::error::{DialectError, Result};

use super::pagination::{find_insertion_point, inject_limit_clause, InsertionPoint};

/// Ordering used when pagination is requested without one.
pub const DEFAULT_ORDER_BY: &str = "ORDER BY (SELECT NULL)";

/// One tuple of a composite IN condition: column name → value.
///
/// A missing column or a `Null` value compares with `IS NULL`.
pub type ValueRow = IndexMap<String, SqlValue>;

/// Membership operator of an IN condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InOperator {
    In,
    NotIn,
}

impl InOperator {
    fn comparison(&self) -> &'static str {
        match self {
            InOperator::In => " = ",
            InOperator::NotIn => " != ",
        }
    }

    fn null_test(&self) -> &'static str {
        match self {
            InOperator::In => " IS NULL",
            InOperator::NotIn => " IS NOT NULL",
        }
    }

    /// Joins the column tests of one tuple.
    fn within_row(&self) -> &'static str {
        match self {
            InOperator::In => " AND ",
            InOperator::NotIn => " OR ",
        }
    }

    /// Joins the tuples.
    fn across_rows(&self) -> &'static str {
        match self {
            InOperator::In => " OR ",
            InOperator::NotIn => " AND ",
        }
    }
}

impl fmt::Display for InOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InOperator::In => f.write_str("IN"),
            InOperator::NotIn => f.write_str("NOT IN"),
        }
    }
}

impl FromStr for InOperator {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_uppercase().as_str() {
            "IN" => Ok(InOperator::In),
            "NOT IN" => Ok(InOperator::NotIn),
            _ => Err(DialectError::parameter(format!(
                "unknown IN operator '{}'",
                s
            ))),
        }
    }
}

/// Builds SQL Anywhere statements from generic inputs.
#[derive(Clone)]
pub struct DialectTranslator {
    quoter: Arc<dyn Quoter>,
    config: DialectConfig,
    types: TypeMap,
}

impl fmt::Debug for DialectTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialectTranslator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for DialectTranslator {
    fn default() -> Self {
        Self::new(DialectConfig::default())
    }
}

impl DialectTranslator {
    /// Create a translator using the engine's default quoting.
    pub fn new(config: DialectConfig) -> Self {
        Self {
            quoter: Arc::new(SqlAnywhereQuoter),
            config,
            types: TypeMap::new(),
        }
    }

    /// Replace the quoting collaborator.
    pub fn with_quoter(mut self, quoter: Arc<dyn Quoter>) -> Self {
        self.quoter = quoter;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &DialectConfig {
        &self.config
    }

    /// Append ordering and apply `TOP`/`START AT` pagination.
    ///
    /// `order_by` is either a bare expression list (`id DESC`) or a full
    /// `ORDER BY` clause. An offset of zero means no offset. Without a
    /// limit, an offset is rendered as `TOP ALL START AT n`.
    pub fn build_order_by_and_limit(
        &self,
        sql: &str,
        order_by: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> String {
        let order_by = order_by_clause(order_by);
        let offset = offset.filter(|o| *o > 0);

        if limit.is_none() && offset.is_none() {
            return if order_by.is_empty() {
                sql.to_string()
            } else {
                format!("{} {}", sql, order_by)
            };
        }

        let order_by = if order_by.is_empty() {
            DEFAULT_ORDER_BY.to_string()
        } else {
            order_by
        };

        let mut clause = match limit {
            Some(n) => format!("TOP {}", n),
            None => "TOP ALL".to_string(),
        };
        if let Some(offset) = offset {
            let start = match self.config.offset_mode {
                OffsetMode::PassThrough => offset,
                OffsetMode::OneBased => offset.saturating_add(1),
            };
            clause.push_str(&format!(" START AT {}", start));
        }

        match find_insertion_point(sql) {
            InsertionPoint::At(_) => debug!("Paginating with '{}'", clause),
            InsertionPoint::AlreadyLimited => {
                warn!("Statement already has TOP, ignoring requested '{}'", clause)
            }
            InsertionPoint::NoSelect => debug!("No SELECT to paginate, ignoring '{}'", clause),
        }
        format!("{} {}", inject_limit_clause(sql, &clause), order_by)
    }

    /// `sp_rename` call renaming a table.
    pub fn rename_table(&self, old_name: &str, new_name: &str) -> String {
        format!(
            "sp_rename {}, {}",
            self.quoter.quote_table_name(old_name),
            self.quoter.quote_table_name(new_name)
        )
    }

    /// `sp_rename` call renaming a column within its table.
    pub fn rename_column(&self, table: &str, old_name: &str, new_name: &str) -> String {
        format!(
            "sp_rename '{}.{}', {}, 'COLUMN'",
            self.quoter.quote_table_name(table),
            self.quoter.quote_column_name(old_name),
            self.quoter.quote_column_name(new_name)
        )
    }

    /// Change a column's type; abstract types are expanded, anything else is kept.
    pub fn alter_column(&self, table: &str, column: &str, column_type: &str) -> String {
        format!(
            "ALTER TABLE {} ALTER COLUMN {} {}",
            self.quoter.quote_table_name(table),
            self.quoter.quote_column_name(column),
            self.types.column_type(column_type)
        )
    }

    /// Enable or disable constraint checking on a table.
    ///
    /// Fails with a parameter error when `schemas` does not know the table.
    pub async fn check_integrity<S>(
        &self,
        schemas: &S,
        enable: bool,
        schema: &str,
        table: &str,
    ) -> Result<String>
    where
        S: TableSchemaSource + ?Sized,
    {
        let name = if schema.is_empty() {
            table.to_string()
        } else {
            format!("{}.{}", schema, table)
        };
        let quoted = self.quoter.quote_table_name(&name);

        if schemas.table_schema(&quoted).await?.is_none() {
            return Err(DialectError::parameter(format!(
                "Table not found: {}",
                quoted
            )));
        }

        let mode = if enable { "CHECK" } else { "NOCHECK" };
        Ok(format!("ALTER TABLE {} {} CONSTRAINT ALL", quoted, mode))
    }

    fn table_property_target(&self, table: &str) -> String {
        format!(
            "@level1type = N'Table',  @level1name = {}",
            self.quoter.quote_table_name(table)
        )
    }

    fn column_property_target(&self, table: &str, column: &str) -> String {
        format!(
            "{}, @level2type = N'Column', @level2name = {}",
            self.table_property_target(table),
            self.quoter.quote_column_name(column)
        )
    }

    fn update_property(&self, comment: &str, target: String) -> String {
        format!(
            "sp_updateextendedproperty @name = N'{}', @value = {}, {}",
            self.config.comment_property,
            self.quoter.quote_value(&SqlValue::from(comment)),
            target
        )
    }

    fn drop_property(&self, target: String) -> String {
        format!(
            "sp_dropextendedproperty @name = N'{}', {}",
            self.config.comment_property, target
        )
    }

    /// Set the comment of a table.
    pub fn add_comment_on_table(&self, table: &str, comment: &str) -> String {
        self.update_property(comment, self.table_property_target(table))
    }

    /// Set the comment of a column.
    pub fn add_comment_on_column(&self, table: &str, column: &str, comment: &str) -> String {
        self.update_property(comment, self.column_property_target(table, column))
    }

    /// Remove the comment of a table.
    pub fn drop_comment_from_table(&self, table: &str) -> String {
        self.drop_property(self.table_property_target(table))
    }

    /// Remove the comment of a column.
    pub fn drop_comment_from_column(&self, table: &str, column: &str) -> String {
        self.drop_property(self.column_property_target(table, column))
    }

    fn quote_condition_column(&self, column: &str) -> String {
        if column.contains('(') {
            column.to_string()
        } else {
            self.quoter.quote_column_name(column)
        }
    }

    /// Expand a multi-column `IN`/`NOT IN` into boolean logic.
    ///
    /// Values are bound into `params` under `<param_prefix><n>`, where `n`
    /// is the number of parameters already bound. Column expressions
    /// containing `(` are used as is.
    pub fn build_composite_in_condition(
        &self,
        operator: InOperator,
        columns: &[&str],
        rows: &[ValueRow],
        params: &mut Params,
    ) -> Result<String> {
        if columns.is_empty() {
            return Err(DialectError::parameter(
                "composite IN condition needs at least one column",
            ));
        }
        if rows.is_empty() {
            return Ok(match operator {
                InOperator::In => "0=1".to_string(),
                InOperator::NotIn => "1=1".to_string(),
            });
        }

        let quoted: Vec<String> = columns
            .iter()
            .map(|c| self.quote_condition_column(c))
            .collect();

        let mut tuples = Vec::with_capacity(rows.len());
        for row in rows {
            let mut tests = Vec::with_capacity(columns.len());
            for (column, quoted_column) in columns.iter().zip(&quoted) {
                match row.get(*column).filter(|v| !v.is_null()) {
                    Some(value) => {
                        let name = format!("{}{}", self.config.param_prefix, params.len());
                        params.insert(name.clone(), value.clone());
                        tests.push(format!("{}{}{}", quoted_column, operator.comparison(), name));
                    }
                    None => tests.push(format!("{}{}", quoted_column, operator.null_test())),
                }
            }
            tuples.push(format!("({})", tests.join(operator.within_row())));
        }

        Ok(format!("({})", tuples.join(operator.across_rows())))
    }

    /// `column IN (subquery)`; row-constructor subqueries are not supported.
    pub fn build_subquery_in_condition(
        &self,
        operator: InOperator,
        columns: &[&str],
        subquery: &str,
    ) -> Result<String> {
        match columns {
            [column] => Ok(format!(
                "{} {} ({})",
                self.quote_condition_column(column),
                operator,
                subquery
            )),
            [] => Err(DialectError::parameter(
                "subquery IN condition needs a column",
            )),
            _ => Err(DialectError::not_supported(format!(
                "{} with a subquery over {} columns",
                operator,
                columns.len()
            ))),
        }
    }

    /// Wrap a select as a 1/0 existence check.
    pub fn select_exists(&self, sql: &str) -> String {
        format!("SELECT CASE WHEN EXISTS({}) THEN 1 ELSE 0 END", sql)
    }
}

fn order_by_clause(order_by: &str) -> String {
    let trimmed = order_by.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let mut words = trimmed.split_whitespace();
    let has_keyword = matches!(
        (words.next(), words.next()),
        (Some(a), Some(b)) if a.eq_ignore_ascii_case("ORDER") && b.eq_ignore_ascii_case("BY")
    );
    if has_keyword {
        trimmed.to_string()
    } else {
        format!("ORDER BY {}", trimmed)
    }
}

/// Savepoint names are emitted unquoted, so only plain identifiers pass.
fn validate_savepoint_name(name: &str) -> Result<()> {
    validate_identifier(name)?;
    let mut chars = name.chars();
    let plain = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '#' | '@'));
    if plain {
        Ok(())
    } else {
        Err(DialectError::parameter(format!(
            "invalid savepoint name '{}'",
            name
        )))
    }
}

/// `SAVE TRANSACTION name`.
pub fn create_savepoint_sql(name: &str) -> Result<String> {
    validate_savepoint_name(name)?;
    Ok(format!("SAVE TRANSACTION {}", name))
}

/// `RELEASE TRANSACTION name`.
pub fn release_savepoint_sql(name: &str) -> Result<String> {
    validate_savepoint_name(name)?;
    Ok(format!("RELEASE TRANSACTION {}", name))
}

/// `ROLLBACK TRANSACTION name`.
pub fn rollback_savepoint_sql(name: &str) -> Result<String> {
    validate_savepoint_name(name)?;
    Ok(format!("ROLLBACK TRANSACTION {}", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::Table;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn translator() -> DialectTranslator {
        DialectTranslator::default()
    }

    fn row(pairs: &[(&str, SqlValue)]) -> ValueRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// Knows a fixed set of tables and records the names it was asked for.
    struct KnownTables {
        names: Vec<&'static str>,
        asked: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TableSchemaSource for KnownTables {
        async fn table_schema(&self, name: &str) -> Result<Option<Table>> {
            self.asked.lock().unwrap().push(name.to_string());
            let resolved = crate::core::identifier::resolve_table_name(name, "");
            Ok(self
                .names
                .iter()
                .any(|n| *n == resolved.full_name)
                .then(|| Table::new(resolved.schema, resolved.name, resolved.full_name)))
        }
    }

    #[test]
    fn test_order_by_only() {
        let t = translator();
        assert_eq!(t.build_order_by_and_limit("SELECT * FROM T", "", None, None), "SELECT * FROM T");
        assert_eq!(
            t.build_order_by_and_limit("SELECT * FROM T", "id DESC", None, None),
            "SELECT * FROM T ORDER BY id DESC"
        );
        assert_eq!(
            t.build_order_by_and_limit("SELECT * FROM T", "order by id", None, Some(0)),
            "SELECT * FROM T order by id"
        );
    }

    #[test]
    fn test_order_by_only_is_stable() {
        let t = translator();
        let a = t.build_order_by_and_limit("SELECT a FROM T", "a", None, None);
        let b = t.build_order_by_and_limit("SELECT a FROM T", "a", None, None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_limit_synthesizes_order() {
        assert_eq!(
            translator().build_order_by_and_limit("SELECT * FROM T", "", Some(10), Some(0)),
            "SELECT TOP 10 * FROM T ORDER BY (SELECT NULL)"
        );
    }

    #[test]
    fn test_limit_and_offset() {
        assert_eq!(
            translator().build_order_by_and_limit("SELECT * FROM T", "id", Some(5), Some(20)),
            "SELECT TOP 5 START AT 20 * FROM T ORDER BY id"
        );
    }

    #[test]
    fn test_offset_without_limit() {
        assert_eq!(
            translator().build_order_by_and_limit("SELECT a FROM T", "a", None, Some(3)),
            "SELECT TOP ALL START AT 3 a FROM T ORDER BY a"
        );
    }

    #[test]
    fn test_one_based_offset_mode() {
        let t = DialectTranslator::new(DialectConfig {
            offset_mode: OffsetMode::OneBased,
            ..DialectConfig::default()
        });
        assert_eq!(
            t.build_order_by_and_limit("SELECT * FROM T", "id", Some(5), Some(20)),
            "SELECT TOP 5 START AT 21 * FROM T ORDER BY id"
        );
    }

    #[test]
    fn test_limit_after_distinct() {
        assert_eq!(
            translator().build_order_by_and_limit("SELECT DISTINCT a FROM T", "a", Some(2), None),
            "SELECT DISTINCT TOP 2 a FROM T ORDER BY a"
        );
    }

    #[test]
    fn test_limit_zero_is_kept() {
        assert_eq!(
            translator().build_order_by_and_limit("SELECT * FROM T", "", Some(0), None),
            "SELECT TOP 0 * FROM T ORDER BY (SELECT NULL)"
        );
    }

    #[test]
    fn test_renames() {
        let t = translator();
        assert_eq!(t.rename_table("old", "new"), "sp_rename \"old\", \"new\"");
        assert_eq!(
            t.rename_column("orders", "qty", "quantity"),
            "sp_rename '\"orders\".\"qty\"', \"quantity\", 'COLUMN'"
        );
    }

    #[test]
    fn test_alter_column() {
        let t = translator();
        assert_eq!(
            t.alter_column("orders", "note", "string(64) NOT NULL"),
            "ALTER TABLE \"orders\" ALTER COLUMN \"note\" nvarchar(64) NOT NULL"
        );
        assert_eq!(
            t.alter_column("orders", "note", "varchar(10)"),
            "ALTER TABLE \"orders\" ALTER COLUMN \"note\" varchar(10)"
        );
    }

    #[test]
    fn test_comments() {
        let t = translator();
        assert_eq!(
            t.add_comment_on_table("orders", "Customer's orders"),
            "sp_updateextendedproperty @name = N'MS_Description', @value = 'Customer''s orders', \
             @level1type = N'Table',  @level1name = \"orders\""
        );
        assert_eq!(
            t.add_comment_on_column("orders", "qty", "units"),
            "sp_updateextendedproperty @name = N'MS_Description', @value = 'units', \
             @level1type = N'Table',  @level1name = \"orders\", \
             @level2type = N'Column', @level2name = \"qty\""
        );
        assert_eq!(
            t.drop_comment_from_table("orders"),
            "sp_dropextendedproperty @name = N'MS_Description', @level1type = N'Table',  @level1name = \"orders\""
        );
        assert_eq!(
            t.drop_comment_from_column("orders", "qty"),
            "sp_dropextendedproperty @name = N'MS_Description', @level1type = N'Table',  \
             @level1name = \"orders\", @level2type = N'Column', @level2name = \"qty\""
        );
    }

    #[test]
    fn test_composite_in() {
        let t = translator();
        let rows = vec![
            row(&[("a", SqlValue::I64(1)), ("b", SqlValue::I64(2))]),
            row(&[("a", SqlValue::I64(3))]),
        ];
        let mut params = Params::new();
        let sql = t
            .build_composite_in_condition(InOperator::In, &["a", "b"], &rows, &mut params)
            .unwrap();
        assert_eq!(
            sql,
            "((\"a\" = :qp0 AND \"b\" = :qp1) OR (\"a\" = :qp2 AND \"b\" IS NULL))"
        );
        assert_eq!(params.len(), 3);
        assert_eq!(params[":qp2"], SqlValue::I64(3));
    }

    #[test]
    fn test_composite_not_in() {
        let t = translator();
        let rows = vec![
            row(&[("a", SqlValue::I64(1)), ("b", SqlValue::I64(2))]),
            row(&[("a", SqlValue::I64(3)), ("b", SqlValue::Null)]),
        ];
        let mut params = Params::new();
        let sql = t
            .build_composite_in_condition(InOperator::NotIn, &["a", "b"], &rows, &mut params)
            .unwrap();
        assert_eq!(
            sql,
            "((\"a\" != :qp0 OR \"b\" != :qp1) AND (\"a\" != :qp2 OR \"b\" IS NOT NULL))"
        );
    }

    #[test]
    fn test_composite_in_continues_parameter_numbering() {
        let t = translator();
        let mut params = Params::new();
        params.insert(":qp0".to_string(), SqlValue::from("x"));
        let rows = vec![row(&[("LOWER(a)", SqlValue::I64(1))])];
        let sql = t
            .build_composite_in_condition(InOperator::In, &["LOWER(a)"], &rows, &mut params)
            .unwrap();
        assert_eq!(sql, "((LOWER(a) = :qp1))");
    }

    #[test]
    fn test_composite_in_edge_cases() {
        let t = translator();
        let mut params = Params::new();
        assert_eq!(
            t.build_composite_in_condition(InOperator::In, &["a"], &[], &mut params)
                .unwrap(),
            "0=1"
        );
        assert!(matches!(
            t.build_composite_in_condition(InOperator::In, &[], &[], &mut params),
            Err(DialectError::Parameter(_))
        ));
    }

    #[test]
    fn test_in_operator_parsing() {
        assert_eq!("in".parse::<InOperator>().unwrap(), InOperator::In);
        assert_eq!("NOT   IN".parse::<InOperator>().unwrap(), InOperator::NotIn);
        assert!(matches!(
            "BETWEEN".parse::<InOperator>(),
            Err(DialectError::Parameter(_))
        ));
    }

    #[test]
    fn test_subquery_in() {
        let t = translator();
        assert_eq!(
            t.build_subquery_in_condition(InOperator::NotIn, &["id"], "SELECT id FROM U")
                .unwrap(),
            "\"id\" NOT IN (SELECT id FROM U)"
        );
        let err = t
            .build_subquery_in_condition(InOperator::In, &["a", "b"], "SELECT a, b FROM U")
            .unwrap_err();
        assert!(matches!(err, DialectError::NotSupported(_)));
    }

    #[test]
    fn test_select_exists() {
        assert_eq!(
            translator().select_exists("SELECT 1 FROM T WHERE x=1"),
            "SELECT CASE WHEN EXISTS(SELECT 1 FROM T WHERE x=1) THEN 1 ELSE 0 END"
        );
    }

    #[test]
    fn test_savepoint_sql() {
        assert_eq!(create_savepoint_sql("sp1").unwrap(), "SAVE TRANSACTION sp1");
        assert_eq!(release_savepoint_sql("sp1").unwrap(), "RELEASE TRANSACTION sp1");
        assert_eq!(rollback_savepoint_sql("sp1").unwrap(), "ROLLBACK TRANSACTION sp1");
        assert!(create_savepoint_sql("").is_err());
    }

    #[test]
    fn test_savepoint_name_must_be_plain_identifier() {
        assert!(create_savepoint_sql("sp1; DROP TABLE orders").is_err());
        assert!(release_savepoint_sql("1sp").is_err());
        assert!(rollback_savepoint_sql("a b").is_err());
        assert!(rollback_savepoint_sql("sp'x").is_err());
        assert_eq!(
            create_savepoint_sql("_sp_1").unwrap(),
            "SAVE TRANSACTION _sp_1"
        );
    }

    #[test]
    fn test_existing_top_is_kept() {
        let sql =
            translator().build_order_by_and_limit("SELECT TOP 3 a FROM T", "a", Some(5), Some(20));
        assert_eq!(sql, "SELECT TOP 3 a FROM T ORDER BY a");
    }

    #[tokio::test]
    async fn test_check_integrity() {
        let known = KnownTables {
            names: vec!["sales.orders"],
            asked: Mutex::new(Vec::new()),
        };
        let t = translator();

        let sql = t.check_integrity(&known, false, "sales", "orders").await.unwrap();
        assert_eq!(sql, "ALTER TABLE \"sales\".\"orders\" NOCHECK CONSTRAINT ALL");

        let sql = t.check_integrity(&known, true, "sales", "orders").await.unwrap();
        assert_eq!(sql, "ALTER TABLE \"sales\".\"orders\" CHECK CONSTRAINT ALL");

        let err = t.check_integrity(&known, true, "", "missing").await.unwrap_err();
        assert!(matches!(err, DialectError::Parameter(_)));
        assert!(err.to_string().contains("missing"));

        assert_eq!(known.asked.lock().unwrap()[0], "\"sales\".\"orders\"");
    }

    #[tokio::test]
    async fn test_check_integrity_with_introspector() {
        use crate::drivers::sqlany::catalog::CatalogQuery;
        use crate::drivers::sqlany::testing::{column_row, FakeExecutor};
        use crate::drivers::SchemaIntrospector;

        let fake = FakeExecutor::new().on(
            CatalogQuery::columns("orders"),
            vec![column_row("id", "N", "integer(4)", None, false, None)],
        );
        let introspector = SchemaIntrospector::new(Arc::new(fake), &DialectConfig::default());

        let sql = translator()
            .check_integrity(&introspector, true, "", "orders")
            .await
            .unwrap();
        assert_eq!(sql, "ALTER TABLE \"orders\" CHECK CONSTRAINT ALL");
    }
}
