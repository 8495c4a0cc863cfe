//! Configuration type definitions.

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Database connection, needed only for live introspection.
    #[serde(default)]
    pub connection: Option<ConnectionConfig>,

    /// Translation and introspection behavior.
    #[serde(default)]
    pub dialect: DialectConfig,
}

/// SQL Anywhere connection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database host.
    pub host: String,

    /// Database port (default: 2638).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Engine server name (defaults to the database name).
    #[serde(default)]
    pub server: Option<String>,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// ODBC driver name (default: "SQL Anywhere 17").
    #[serde(default = "default_driver")]
    pub driver: String,
}

/// How a pagination offset is rendered into `START AT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetMode {
    /// Emit the offset unchanged; the caller supplies a 1-based row number.
    #[default]
    PassThrough,
    /// Treat the offset as rows to skip and emit `offset + 1`.
    OneBased,
}

/// Translation and introspection behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialectConfig {
    /// Session default schema; names in it are not schema-qualified.
    #[serde(default)]
    pub default_schema: String,

    /// Prefix for auto-named bound parameters (default: ":qp").
    #[serde(default = "default_param_prefix")]
    pub param_prefix: String,

    /// Offset rendering for `START AT`.
    #[serde(default)]
    pub offset_mode: OffsetMode,

    /// Extended property holding table and column comments.
    #[serde(default = "default_comment_property")]
    pub comment_property: String,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            default_schema: String::new(),
            param_prefix: default_param_prefix(),
            offset_mode: OffsetMode::default(),
            comment_property: default_comment_property(),
        }
    }
}

fn default_port() -> u16 {
    2638
}

fn default_driver() -> String {
    "SQL Anywhere 17".to_string()
}

fn default_param_prefix() -> String {
    ":qp".to_string()
}

fn default_comment_property() -> String {
    "MS_Description".to_string()
}
