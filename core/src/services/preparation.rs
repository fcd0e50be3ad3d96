//! `ShopPreparation` service: dump, restore and import the shop database

use async_trait::async_trait;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{ServiceConfig, ServiceRequest, ServiceResponse, ShopService};
use crate::adapter::SqlDriver;
use crate::database::DatabaseHandler;
use crate::error::{CoreError, Result};
use crate::runner::CommandRunner;

pub const DUMP_DB_PARAMETER: &str = "dumpDB";
pub const RESTORE_DB_PARAMETER: &str = "restoreDB";
pub const IMPORT_SQL_PARAMETER: &str = "importSql";
pub const DUMP_PREFIX_PARAMETER: &str = "dump-prefix";
pub const DEFAULT_DUMP_PREFIX: &str = "tmp_db_dump";

pub struct ShopPreparation {
    config: ServiceConfig,
}

impl ShopPreparation {
    pub const NAME: &'static str = "ShopPreparation";

    pub fn boxed(config: &ServiceConfig) -> Box<dyn ShopService> {
        Box::new(Self {
            config: config.clone(),
        })
    }
}

#[async_trait]
impl ShopService for ShopPreparation {
    async fn init(&self, request: &ServiceRequest) -> Result<ServiceResponse> {
        let mut handler = DatabaseHandler::connect(self.config.connection.clone()).await?;
        prepare(&mut handler, &self.config.temp_dir, request).await
    }
}

/// Dump file for `prefix` inside `temp_dir`
pub fn dump_file(temp_dir: &Path, prefix: &str) -> Result<PathBuf> {
    if prefix.is_empty() || prefix.contains(['/', '\\']) || prefix == ".." {
        return Err(CoreError::InvalidParameter(format!(
            "invalid dump prefix '{}'",
            prefix
        )));
    }
    Ok(temp_dir.join(format!("{}.sql", prefix)))
}

/// Apply the requested actions in order: dump, restore, import
pub async fn prepare<D: SqlDriver, R: CommandRunner>(
    handler: &mut DatabaseHandler<D, R>,
    temp_dir: &Path,
    request: &ServiceRequest,
) -> Result<ServiceResponse> {
    let prefix = request
        .string(DUMP_PREFIX_PARAMETER)
        .unwrap_or(DEFAULT_DUMP_PREFIX);
    let dump = dump_file(temp_dir, prefix)?;
    let mut actions = Vec::new();

    if request.flag(DUMP_DB_PARAMETER) {
        handler.export(&dump, &[]).await?;
        actions.push(DUMP_DB_PARAMETER);
    }

    if request.flag(RESTORE_DB_PARAMETER) {
        handler.import(&dump, None).await?;
        actions.push(RESTORE_DB_PARAMETER);
    }

    if let Some(file) = request.string(IMPORT_SQL_PARAMETER) {
        handler.import(file, None).await?;
        actions.push(IMPORT_SQL_PARAMETER);
    }

    info!("Shop preparation finished: {:?}", actions);
    Ok(json!({
        "actions": actions,
        "dump_file": dump.to_string_lossy(),
    }))
}
