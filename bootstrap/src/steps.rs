//! Environment preparation and restoration steps

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::config::TestConfig;
use shopfix_core::files::{copy_files, create_empty_directory};
use shopfix_core::services::installer::{ADD_DEMO_DATA_PARAMETER, SERIAL_PARAMETER};
use shopfix_core::services::preparation::{
    dump_file, DUMP_DB_PARAMETER, DUMP_PREFIX_PARAMETER, RESTORE_DB_PARAMETER,
};
use shopfix_core::services::{ServiceRegistry, ServiceRequest, ShopInstaller, ShopPreparation};

/// Prefix of the dump taken before the suite runs
pub const ORIGINAL_DUMP_PREFIX: &str = "orig_db_dump";

/// Written next to the dump once it was taken successfully
const RESTORE_MARKER: &str = "orig_db_dump.ok";

/// Runs the bootstrap sequence against in-process services
pub struct Bootstrap {
    config: TestConfig,
    registry: ServiceRegistry,
}

impl Bootstrap {
    pub fn new(config: TestConfig) -> Self {
        Self {
            config,
            registry: ServiceRegistry::with_defaults(),
        }
    }

    fn marker_path(&self) -> PathBuf {
        self.config.dump_dir().join(RESTORE_MARKER)
    }

    /// Prepare the environment before the suite
    pub async fn prepare(&self) -> Result<()> {
        if let Some(ref temp_dir) = self.config.temp_dir {
            create_empty_directory(temp_dir)
                .with_context(|| format!("Failed to prepare {}", temp_dir.display()))?;
        }

        if self.config.restore_after_suite {
            self.dump_original_database().await?;
        }

        if self.config.install_shop {
            self.install_shop().await?;
        }

        match self.config.shop_url {
            Some(ref url) => info!("Test environment prepared for {}", url),
            None => info!("Test environment prepared"),
        }
        Ok(())
    }

    /// Restore the original database after the suite; returns whether anything was restored
    pub async fn restore(&self) -> Result<bool> {
        let marker = self.marker_path();
        if !marker.exists() {
            warn!("No original dump recorded, skipping restore");
            return Ok(false);
        }

        let request = ServiceRequest::new()
            .with_parameter(RESTORE_DB_PARAMETER, true)
            .with_parameter(DUMP_PREFIX_PARAMETER, ORIGINAL_DUMP_PREFIX);
        self.registry
            .call(
                ShopPreparation::NAME,
                &self.config.service_config()?,
                &request,
            )
            .await
            .context("Failed to restore the original database")?;

        info!("Original database restored");
        Ok(true)
    }

    /// A failed dump is not fatal; it only disables the restore
    async fn dump_original_database(&self) -> Result<()> {
        std::fs::create_dir_all(self.config.dump_dir())?;
        let marker = self.marker_path();
        if marker.exists() {
            std::fs::remove_file(&marker)?;
        }

        let request = ServiceRequest::new()
            .with_parameter(DUMP_DB_PARAMETER, true)
            .with_parameter(DUMP_PREFIX_PARAMETER, ORIGINAL_DUMP_PREFIX);
        let result = self
            .registry
            .call(
                ShopPreparation::NAME,
                &self.config.service_config()?,
                &request,
            )
            .await;

        match result {
            Ok(_) => {
                let dump = dump_file(&self.config.dump_dir(), ORIGINAL_DUMP_PREFIX)?;
                std::fs::write(&marker, dump.to_string_lossy().as_bytes())?;
                info!("Original database dumped to {}", dump.display());
            }
            Err(e) => {
                error!("Failed to dump original database, restore disabled: {}", e);
            }
        }
        Ok(())
    }

    /// Copy setup files into the shop, if configured
    pub fn copy_setup_files(&self) -> Result<u64> {
        let Some(ref setup_path) = self.config.setup_path else {
            return Ok(0);
        };
        let target = self.config.shop_directory().join("setup");
        let copied = copy_files(setup_path, &target)
            .with_context(|| format!("Failed to copy setup files to {}", target.display()))?;

        info!("Copied {} setup files to {}", copied, target.display());
        Ok(copied)
    }

    async fn install_shop(&self) -> Result<()> {
        self.copy_setup_files()?;

        let mut request =
            ServiceRequest::new().with_parameter(ADD_DEMO_DATA_PARAMETER, self.config.add_demo_data);
        if let Some(ref serial) = self.config.serial {
            request = request.with_parameter(SERIAL_PARAMETER, serial.as_str());
        }

        self.registry
            .call(ShopInstaller::NAME, &self.config.service_config()?, &request)
            .await
            .context("Failed to install shop")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use std::path::Path;

    fn test_config(root: &Path) -> TestConfig {
        TestConfig {
            shop_path: root.join("shop"),
            shop_url: None,
            shop_id: 1,
            temp_dir: Some(root.join("tmp")),
            remote_dir: None,
            setup_path: None,
            install_shop: false,
            restore_after_suite: false,
            add_demo_data: true,
            serial: None,
            database: DatabaseConfig {
                host: "localhost".to_string(),
                port: None,
                user: "root".to_string(),
                password: None,
                name: "oxid".to_string(),
                charset: "utf8".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_prepare_empties_temp_dir() {
        let root = tempfile::tempdir().unwrap();
        let config = test_config(root.path());
        let stale = root.path().join("tmp/stale.sql");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "old").unwrap();

        Bootstrap::new(config).prepare().await.unwrap();

        assert!(root.path().join("tmp").is_dir());
        assert!(!stale.exists());
    }

    #[tokio::test]
    async fn test_restore_without_marker_is_skipped() {
        let root = tempfile::tempdir().unwrap();
        let restored = Bootstrap::new(test_config(root.path()))
            .restore()
            .await
            .unwrap();
        assert!(!restored);
    }

    #[test]
    fn test_copy_setup_files_into_shop() {
        let root = tempfile::tempdir().unwrap();
        let setup = root.path().join("setup-src");
        std::fs::create_dir_all(setup.join("Sql")).unwrap();
        std::fs::write(setup.join("Sql/database_schema.sql"), "--").unwrap();

        let mut config = test_config(root.path());
        config.setup_path = Some(setup);
        let copied = Bootstrap::new(config).copy_setup_files().unwrap();

        assert_eq!(copied, 1);
        assert!(root
            .path()
            .join("shop/setup/Sql/database_schema.sql")
            .exists());
    }

    #[test]
    fn test_installer_reads_copied_setup_from_remote_dir() {
        let root = tempfile::tempdir().unwrap();
        let setup = root.path().join("setup-src");
        std::fs::create_dir_all(setup.join("Sql")).unwrap();
        std::fs::write(setup.join("Sql/database_schema.sql"), "--").unwrap();

        let mut config = test_config(root.path());
        config.setup_path = Some(setup);
        config.remote_dir = Some(root.path().join("remote"));
        let service_config = config.service_config().unwrap();
        Bootstrap::new(config).copy_setup_files().unwrap();

        assert_eq!(service_config.shop_path, root.path().join("remote"));
        assert!(service_config
            .shop_path
            .join("setup/Sql/database_schema.sql")
            .exists());
        assert!(!root.path().join("shop/setup").exists());
    }

    #[test]
    fn test_no_setup_path_copies_nothing() {
        let root = tempfile::tempdir().unwrap();
        let copied = Bootstrap::new(test_config(root.path()))
            .copy_setup_files()
            .unwrap();
        assert_eq!(copied, 0);
    }
}
