//! Loading the database connection from the environment.

use super::{ConnectionDescriptor, ConnectionError, ConnectionResult};
use std::collections::HashMap;
use tracing::{debug, info};

/// Environment variable holding the database connection string.
pub const DATABASE_CONNECTION_ENV: &str = "DATABASE_CONNECTION";

/// Source for environment variables.
pub trait EnvSource: Send + Sync {
    /// Get an environment variable value.
    fn get(&self, name: &str) -> Option<String>;

    /// Check if a variable exists.
    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Default environment source using std::env.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Environment source backed by a HashMap.
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    /// Create a new map-based environment source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvSource for MapEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Resolves the external database connection, if one is configured.
///
/// An unset or blank variable means no external database; the caller keeps
/// its local default. A set variable must parse, there is no fallback on a
/// bad connection string.
#[derive(Debug, Clone, Copy)]
pub struct DatabaseSettings;

impl DatabaseSettings {
    /// Read the connection from an arbitrary environment source.
    ///
    /// ```rust
    /// use tubesync_common::connection::{DatabaseSettings, MapEnvSource};
    ///
    /// let env = MapEnvSource::new().set("DATABASE_CONNECTION", "mysql://u:p@db/app");
    /// let conn = DatabaseSettings::from_source(&env).unwrap().unwrap();
    /// assert_eq!(conn.port, 3306);
    ///
    /// assert!(DatabaseSettings::from_source(&MapEnvSource::new()).unwrap().is_none());
    /// ```
    pub fn from_source<S: EnvSource>(source: &S) -> ConnectionResult<Option<ConnectionDescriptor>> {
        let Some(raw) = source.get(DATABASE_CONNECTION_ENV) else {
            debug!(var = DATABASE_CONNECTION_ENV, "No external database configured");
            return Ok(None);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            debug!(var = DATABASE_CONNECTION_ENV, "External database variable is blank");
            return Ok(None);
        }

        let conn = ConnectionDescriptor::parse(raw)?;
        info!(
            driver = %conn.driver,
            host = %conn.host,
            database = %conn.name,
            "Database configuration loaded from environment"
        );
        Ok(Some(conn))
    }

    /// Read the connection from the process environment.
    pub fn from_env() -> ConnectionResult<Option<ConnectionDescriptor>> {
        Self::from_source(&StdEnvSource)
    }

    /// Like [`from_source`](Self::from_source), but a missing connection is an error.
    pub fn require_from_source<S: EnvSource>(source: &S) -> ConnectionResult<ConnectionDescriptor> {
        Self::from_source(source)?
            .ok_or_else(|| ConnectionError::EnvNotFound(DATABASE_CONNECTION_ENV.to_string()))
    }

    /// Like [`from_env`](Self::from_env), but a missing connection is an error.
    pub fn require_from_env() -> ConnectionResult<ConnectionDescriptor> {
        Self::require_from_source(&StdEnvSource)
    }
}
