//! `ShopInstaller` service

use async_trait::async_trait;
use serde_json::json;
use std::path::Path;
use tracing::info;

use super::{ServiceConfig, ServiceRequest, ServiceResponse, ShopService};
use crate::adapter::SqlDriver;
use crate::database::DatabaseHandler;
use crate::error::Result;
use crate::runner::CommandRunner;

pub const ADD_DEMO_DATA_PARAMETER: &str = "addDemoData";
pub const SERIAL_PARAMETER: &str = "serial";

const SCHEMA_FILE: &str = "Sql/database_schema.sql";
const INITIAL_DATA_FILE: &str = "Sql/initial_data.sql";
const DEMO_DATA_FILE: &str = "Sql/demodata.sql";

/// Installs a fresh shop database from the setup directory
pub struct ShopInstaller {
    config: ServiceConfig,
}

impl ShopInstaller {
    pub const NAME: &'static str = "ShopInstaller";

    pub fn boxed(config: &ServiceConfig) -> Box<dyn ShopService> {
        Box::new(Self {
            config: config.clone(),
        })
    }
}

#[async_trait]
impl ShopService for ShopInstaller {
    async fn init(&self, request: &ServiceRequest) -> Result<ServiceResponse> {
        let setup_dir = self.config.shop_path.join("setup");
        let mut handler = DatabaseHandler::connect(self.config.connection.clone()).await?;
        install(&mut handler, &setup_dir, self.config.shop_id, request).await
    }
}

pub async fn install<D: SqlDriver, R: CommandRunner>(
    handler: &mut DatabaseHandler<D, R>,
    setup_dir: &Path,
    shop_id: u32,
    request: &ServiceRequest,
) -> Result<ServiceResponse> {
    handler.recreate_database().await?;

    let mut files = vec![SCHEMA_FILE, INITIAL_DATA_FILE];
    if request.flag(ADD_DEMO_DATA_PARAMETER) {
        files.push(DEMO_DATA_FILE);
    }
    for file in &files {
        handler.import(setup_dir.join(file), None).await?;
    }

    let serial = request.string(SERIAL_PARAMETER).filter(|s| !s.is_empty());
    if let Some(serial) = serial {
        let sql = format!(
            "UPDATE `oxconfig` SET `OXVARVALUE` = {} WHERE `OXVARNAME` = 'sSerialNr' AND `OXSHOPID` = {}",
            handler.escape(serial),
            shop_id
        );
        handler.exec(&sql).await?;
    }

    info!(
        "Installed shop into {} from {}",
        handler.params().database(),
        setup_dir.display()
    );
    Ok(json!({
        "imported": files,
        "serial": serial.is_some(),
    }))
}
