//! Table, column, and constraint metadata reconstructed from the catalog.
//!
//! Descriptors are built fresh by every load and never mutated afterwards;
//! caching them is the caller's business.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{DialectError, Result};

use super::value::SqlValue;

/// Engine-neutral column type.
///
/// `Upk` and `Ubigpk` exist only on the declaration side; introspection
/// never produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbstractType {
    Pk,
    Upk,
    Bigpk,
    Ubigpk,
    String,
    Text,
    Char,
    Smallint,
    Integer,
    Bigint,
    Float,
    Double,
    Decimal,
    Datetime,
    Timestamp,
    Time,
    Date,
    Binary,
    Boolean,
    Money,
}

impl AbstractType {
    /// Every abstract type, in declaration order.
    pub const ALL: [AbstractType; 20] = [
        AbstractType::Pk,
        AbstractType::Upk,
        AbstractType::Bigpk,
        AbstractType::Ubigpk,
        AbstractType::String,
        AbstractType::Text,
        AbstractType::Char,
        AbstractType::Smallint,
        AbstractType::Integer,
        AbstractType::Bigint,
        AbstractType::Float,
        AbstractType::Double,
        AbstractType::Decimal,
        AbstractType::Datetime,
        AbstractType::Timestamp,
        AbstractType::Time,
        AbstractType::Date,
        AbstractType::Binary,
        AbstractType::Boolean,
        AbstractType::Money,
    ];

    /// Portable type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AbstractType::Pk => "pk",
            AbstractType::Upk => "upk",
            AbstractType::Bigpk => "bigpk",
            AbstractType::Ubigpk => "ubigpk",
            AbstractType::String => "string",
            AbstractType::Text => "text",
            AbstractType::Char => "char",
            AbstractType::Smallint => "smallint",
            AbstractType::Integer => "integer",
            AbstractType::Bigint => "bigint",
            AbstractType::Float => "float",
            AbstractType::Double => "double",
            AbstractType::Decimal => "decimal",
            AbstractType::Datetime => "datetime",
            AbstractType::Timestamp => "timestamp",
            AbstractType::Time => "time",
            AbstractType::Date => "date",
            AbstractType::Binary => "binary",
            AbstractType::Boolean => "boolean",
            AbstractType::Money => "money",
        }
    }

    /// Whether this is one of the identity primary key shorthands.
    pub fn is_primary_key(&self) -> bool {
        matches!(
            self,
            AbstractType::Pk | AbstractType::Upk | AbstractType::Bigpk | AbstractType::Ubigpk
        )
    }

    /// Whether values of this type are whole numbers.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            AbstractType::Smallint | AbstractType::Integer | AbstractType::Bigint
        ) || self.is_primary_key()
    }
}

impl fmt::Display for AbstractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AbstractType {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        AbstractType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| DialectError::parameter(format!("unknown abstract type '{}'", s)))
    }
}

/// Metadata of one physical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name as stored in the catalog.
    pub name: String,

    /// Classified portable type.
    pub abstract_type: AbstractType,

    /// Raw engine type string (e.g. "nvarchar(255)").
    pub db_type: String,

    /// Declared width, when the type string carried one.
    pub size: Option<u32>,

    /// Numeric precision; mirrors `size`.
    pub precision: Option<u32>,

    /// Numeric scale.
    pub scale: Option<u32>,

    /// Whether the column allows NULL.
    pub allow_null: bool,

    /// Whether the column is part of the primary key.
    pub is_primary_key: bool,

    /// Whether the engine generates the value on insert.
    pub auto_increment: bool,

    /// Whether the type is unsigned.
    pub unsigned: bool,

    /// Column remark, empty when none.
    pub comment: String,

    /// Typed default, unset when the engine manages the value.
    pub default_value: Option<SqlValue>,
}

/// Foreign key constraint owned by a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Constraint (role) name.
    pub name: String,

    /// Referenced table name.
    pub ref_table: String,

    /// Local column → referenced column, in key order.
    pub columns: IndexMap<String, String>,
}

/// Table or view metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Schema (owner) name.
    pub schema: String,

    /// Table name.
    pub name: String,

    /// Name qualified with the schema only when it differs from the session default.
    pub full_name: String,

    /// Columns in catalog discovery order.
    pub columns: IndexMap<String, Column>,

    /// Primary key column names in key order.
    pub primary_key: Vec<String>,

    /// Foreign key constraints.
    pub foreign_keys: Vec<ForeignKey>,

    /// `Some("")` when an identity column is its own sequence, `None` without auto-increment.
    pub sequence_name: Option<String>,
}

impl Table {
    /// Create an empty descriptor for a resolved name.
    pub fn new(
        schema: impl Into<String>,
        name: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            full_name: full_name.into(),
            columns: IndexMap::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
            sequence_name: None,
        }
    }

    /// Look up a column, exact name first, then case-insensitively.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name).or_else(|| {
            self.columns
                .values()
                .find(|c| c.name.eq_ignore_ascii_case(name))
        })
    }

    /// Column names in discovery order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    /// Check if the table has a primary key.
    pub fn has_pk(&self) -> bool {
        !self.primary_key.is_empty()
    }

    /// Columns flagged as primary key, in discovery order.
    pub fn pk_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values().filter(|c| c.is_primary_key)
    }

    /// Check if an identity primary key column acts as the table's sequence.
    pub fn has_identity_sequence(&self) -> bool {
        self.sequence_name.as_deref() == Some("")
    }
}
