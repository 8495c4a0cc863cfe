//! In-memory catalog executor for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::traits::{AttributeSource, CatalogExecutor, ConnectionAttribute};
use crate::core::value::{Params, Row, SqlValue};
use crate::error::{DialectError, Result};

use super::catalog::CatalogQuery;

enum Canned {
    Rows(Vec<Row>),
    Fail(String),
}

/// Returns canned rows for registered (sql, params) pairs and records every call.
///
/// Unregistered queries return no rows.
#[derive(Default)]
pub struct FakeExecutor {
    responses: Vec<(String, Params, Canned)>,
    attributes: Vec<(ConnectionAttribute, std::result::Result<String, String>)>,
    calls: Mutex<Vec<(String, Params)>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, query: CatalogQuery, rows: Vec<Row>) -> Self {
        self.responses
            .push((query.sql.to_string(), query.params, Canned::Rows(rows)));
        self
    }

    pub fn on_sql(mut self, sql: &str, rows: Vec<Row>) -> Self {
        self.responses
            .push((sql.to_string(), Params::new(), Canned::Rows(rows)));
        self
    }

    pub fn fail(mut self, query: CatalogQuery, message: &str) -> Self {
        self.responses.push((
            query.sql.to_string(),
            query.params,
            Canned::Fail(message.to_string()),
        ));
        self
    }

    pub fn with_attribute(
        mut self,
        attr: ConnectionAttribute,
        value: std::result::Result<&str, &str>,
    ) -> Self {
        self.attributes.push((
            attr,
            value.map(str::to_string).map_err(str::to_string),
        ));
        self
    }

    pub fn calls(&self) -> Vec<(String, Params)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CatalogExecutor for FakeExecutor {
    async fn query(&self, sql: &str, params: &Params) -> Result<Vec<Row>> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.clone()));

        for (canned_sql, canned_params, canned) in &self.responses {
            if canned_sql == sql && canned_params == params {
                return match canned {
                    Canned::Rows(rows) => Ok(rows.clone()),
                    Canned::Fail(msg) => Err(DialectError::database(
                        "running fake query",
                        std::io::Error::new(std::io::ErrorKind::Other, msg.clone()),
                    )),
                };
            }
        }
        Ok(Vec::new())
    }

    async fn execute(&self, sql: &str, params: &Params) -> Result<u64> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.clone()));
        Ok(0)
    }
}

#[async_trait]
impl AttributeSource for FakeExecutor {
    async fn attribute(&self, attr: ConnectionAttribute) -> Result<Option<String>> {
        match self.attributes.iter().find(|(a, _)| *a == attr) {
            Some((_, Ok(v))) => Ok(Some(v.clone())),
            Some((_, Err(msg))) => Err(DialectError::database(
                format!("reading {}", attr.as_str()),
                std::io::Error::new(std::io::ErrorKind::Unsupported, msg.clone()),
            )),
            None => Ok(None),
        }
    }
}

/// A row shaped like the column discovery result.
pub fn column_row(
    name: &str,
    nulls: &str,
    data_type: &str,
    default: Option<&str>,
    identity: bool,
    comment: Option<&str>,
) -> Row {
    Row::from_pairs([
        ("column_name", SqlValue::from(name)),
        ("nulls", SqlValue::from(nulls)),
        ("data_type", SqlValue::from(data_type)),
        ("column_default", SqlValue::from(default)),
        ("is_identity", SqlValue::I64(i64::from(identity))),
        ("comment", SqlValue::from(comment)),
    ])
}

/// A row shaped like the index constraint result.
pub fn constraint_row(index: &str, field: &str) -> Row {
    Row::from_pairs([("index_name", index), ("field_name", field)])
}

/// A row shaped like the foreign key result.
pub fn foreign_key_row(name: &str, column: &str, ref_table: &str, ref_column: &str) -> Row {
    Row::from_pairs([
        ("fk_name", name),
        ("fk_column_name", column),
        ("uq_table_name", ref_table),
        ("uq_column_name", ref_column),
    ])
}
