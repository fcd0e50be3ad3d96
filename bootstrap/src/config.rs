//! Test environment configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use shopfix_core::services::ServiceConfig;
use shopfix_core::ConnectionParams;

/// Database section of the test configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: Option<u16>,
    pub user: String,
    pub password: Option<String>,
    pub name: String,
    pub charset: String,
}

/// Test environment configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TestConfig {
    /// Shop installation root
    pub shop_path: PathBuf,
    /// Shop URL, informational
    pub shop_url: Option<String>,
    /// Shop id
    pub shop_id: u32,
    /// Directory emptied before the suite; holds the original dump
    pub temp_dir: Option<PathBuf>,
    /// Shop directory on a remote host mounted locally
    pub remote_dir: Option<PathBuf>,
    /// Setup files copied into the shop before installing
    pub setup_path: Option<PathBuf>,
    /// Install a fresh shop before the suite
    pub install_shop: bool,
    /// Dump the database before the suite and restore it afterwards
    pub restore_after_suite: bool,
    /// Add demo data when installing
    pub add_demo_data: bool,
    /// Shop serial stored on install
    pub serial: Option<String>,
    pub database: DatabaseConfig,
}

impl TestConfig {
    /// Load from an optional config file, overridden by `SHOPFIX_*` variables
    /// (`SHOPFIX_DATABASE__HOST` sets `database.host`)
    pub fn load(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("shop_id", 1)?
            .set_default("install_shop", false)?
            .set_default("restore_after_suite", false)?
            .set_default("add_demo_data", true)?
            .set_default("database.host", "localhost")?
            .set_default("database.user", "root")?
            .set_default("database.charset", "utf8")?
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("SHOPFIX")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read test configuration")?;

        settings
            .try_deserialize()
            .context("Invalid test configuration")
    }

    /// Directory holding the database dump and the restore marker
    pub fn dump_dir(&self) -> PathBuf {
        self.temp_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("shopfix"))
    }

    /// Where setup files are copied to
    pub fn shop_directory(&self) -> &Path {
        self.remote_dir.as_deref().unwrap_or(&self.shop_path)
    }

    pub fn connection(&self) -> Result<ConnectionParams> {
        let db = &self.database;
        Ok(ConnectionParams::new(&db.host, &db.user, &db.name)
            .context("Invalid database configuration")?
            .with_port(db.port)
            .with_password(db.password.clone())
            .with_charset_mode(&db.charset))
    }

    /// Services run against the directory setup files were copied to
    pub fn service_config(&self) -> Result<ServiceConfig> {
        Ok(ServiceConfig {
            shop_path: self.shop_directory().to_path_buf(),
            temp_dir: self.dump_dir(),
            shop_id: self.shop_id,
            connection: self.connection()?,
        })
    }
}
