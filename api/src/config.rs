//! Application configuration

use anyhow::{Context, Result};
use std::path::PathBuf;

use shopfix_core::services::ServiceConfig;
use shopfix_core::ConnectionParams;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Shop installation root
    pub shop_path: PathBuf,
    /// Directory for dumps and other temporary files
    pub temp_dir: PathBuf,
    /// Shop id
    pub shop_id: u32,
    /// Shop database connection
    pub connection: ConnectionParams,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT")?,
            shop_path: std::env::var("SHOP_PATH")
                .context("SHOP_PATH is required")?
                .into(),
            temp_dir: std::env::var("TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir().join("shopfix")),
            shop_id: std::env::var("SHOP_ID")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .context("Invalid SHOP_ID")?,
            connection: ConnectionParams::from_env().context("Invalid database settings")?,
        })
    }

    /// Configuration handed to services
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            shop_path: self.shop_path.clone(),
            temp_dir: self.temp_dir.clone(),
            shop_id: self.shop_id,
            connection: self.connection.clone(),
        }
    }
}
