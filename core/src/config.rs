//! Database connection parameters

use std::fmt;

use crate::error::{CoreError, Result};

/// Charset used for imports when the caller does not name one
pub const DEFAULT_CHARSET_MODE: &str = "utf8";

/// Connection parameters for the shop database
///
/// Built once and never mutated. Host and user are required; an empty
/// password is treated the same as no password.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    host: String,
    port: Option<u16>,
    user: String,
    password: Option<String>,
    database: String,
    charset_mode: String,
}

impl ConnectionParams {
    /// Create connection parameters, rejecting an empty host or user
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        database: impl Into<String>,
    ) -> Result<Self> {
        let host = host.into();
        let user = user.into();
        if host.trim().is_empty() {
            return Err(CoreError::Config("database host is required".to_string()));
        }
        if user.trim().is_empty() {
            return Err(CoreError::Config("database user is required".to_string()));
        }

        Ok(Self {
            host,
            port: None,
            user,
            password: None,
            database: database.into(),
            charset_mode: DEFAULT_CHARSET_MODE.to_string(),
        })
    }

    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password.filter(|p| !p.is_empty());
        self
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    pub fn with_charset_mode(mut self, charset_mode: impl Into<String>) -> Self {
        self.charset_mode = charset_mode.into();
        self
    }

    /// Load connection parameters from environment variables
    pub fn from_env() -> Result<Self> {
        let database = std::env::var("DB_NAME")
            .map_err(|_| CoreError::Config("DB_NAME is required".to_string()))?;
        let port = match std::env::var("DB_PORT") {
            Ok(raw) if !raw.is_empty() => Some(
                raw.parse()
                    .map_err(|_| CoreError::Config(format!("Invalid DB_PORT: {}", raw)))?,
            ),
            _ => None,
        };

        Ok(Self::new(
            std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            std::env::var("DB_USER").unwrap_or_else(|_| "root".to_string()),
            database,
        )?
        .with_password(std::env::var("DB_PASSWORD").ok())
        .with_port(port)
        .with_charset_mode(
            std::env::var("DB_CHARSET").unwrap_or_else(|_| DEFAULT_CHARSET_MODE.to_string()),
        ))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn charset_mode(&self) -> &str {
        &self.charset_mode
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("charset_mode", &self.charset_mode)
            .finish()
    }
}
