//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

impl ConnectionConfig {
    /// Build an ODBC connection string for the SQL Anywhere driver.
    pub fn connection_string(&self) -> String {
        let server = self.server.as_deref().unwrap_or(&self.database);
        format!(
            "Driver={{{}}};Host={}:{};ServerName={};DatabaseName={};UID={};PWD={};",
            self.driver, self.host, self.port, server, self.database, self.user, self.password
        )
    }
}
