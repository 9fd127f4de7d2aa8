//! Environment configuration

use crate::dialogue::{DepartmentTable, TableError};
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidVar { name: &'static str, value: String },
    #[error(transparent)]
    Departments(#[from] TableError),
}

/// Server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Replacement department table; the built-in one is used when unset
    pub departments_path: Option<PathBuf>,
}

impl ServerConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidVar` if `RECEPTIONIST_PORT` is not a port
    /// number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("RECEPTIONIST_PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidVar {
                name: "RECEPTIONIST_PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            port,
            departments_path: lookup("RECEPTIONIST_DEPARTMENTS").map(PathBuf::from),
        })
    }

    /// Built-in table, or the one at `departments_path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Departments` if the file can't be loaded.
    pub fn department_table(&self) -> Result<DepartmentTable, ConfigError> {
        match &self.departments_path {
            Some(path) => Ok(DepartmentTable::from_file(path)?),
            None => Ok(DepartmentTable::default()),
        }
    }
}

/// Console front-end settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub server_url: String,
    /// Run the dialogue core in-process instead of over HTTP
    pub local: bool,
    pub departments_path: Option<PathBuf>,
}

impl ConsoleConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            server_url: lookup("RECEPTIONIST_SERVER_URL")
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            local: lookup("RECEPTIONIST_LOCAL").is_some_and(|v| v == "1" || v == "true"),
            departments_path: lookup("RECEPTIONIST_DEPARTMENTS").map(PathBuf::from),
        }
    }
}
