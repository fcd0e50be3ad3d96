//! `ShopObjectConstructor` service

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use super::constructor::{ConstructorFactory, ConstructorParams};
use super::{ServiceConfig, ServiceRequest, ServiceResponse, ShopService};
use crate::adapter::SqlDriver;
use crate::database::DatabaseHandler;
use crate::error::{CoreError, Result};
use crate::runner::CommandRunner;

pub const CLASS_PARAMETER: &str = "cl";
pub const OXID_PARAMETER: &str = "oxid";
pub const CLASS_PARAMS_PARAMETER: &str = "classparams";

/// Applies `classparams` to a shop object picked by class key
pub struct ShopObjectConstructor {
    config: ServiceConfig,
}

impl ShopObjectConstructor {
    pub const NAME: &'static str = "ShopObjectConstructor";

    pub fn boxed(config: &ServiceConfig) -> Box<dyn ShopService> {
        Box::new(Self {
            config: config.clone(),
        })
    }
}

#[async_trait]
impl ShopService for ShopObjectConstructor {
    async fn init(&self, request: &ServiceRequest) -> Result<ServiceResponse> {
        let mut handler = DatabaseHandler::connect(self.config.connection.clone()).await?;
        construct(
            &mut handler,
            &ConstructorFactory::with_defaults(),
            self.config.shop_id,
            request,
        )
        .await
    }
}

pub async fn construct<D: SqlDriver, R: CommandRunner>(
    handler: &mut DatabaseHandler<D, R>,
    factory: &ConstructorFactory,
    shop_id: u32,
    request: &ServiceRequest,
) -> Result<ServiceResponse> {
    let class_name = request
        .string(CLASS_PARAMETER)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| CoreError::InvalidParameter(format!("'{}' is required", CLASS_PARAMETER)))?;

    let class_params = match request.parameter(CLASS_PARAMS_PARAMETER) {
        None | Some(serde_json::Value::Null) => serde_json::Map::new(),
        Some(serde_json::Value::Object(map)) => map.clone(),
        Some(_) => {
            return Err(CoreError::InvalidParameter(format!(
                "'{}' must be an object",
                CLASS_PARAMS_PARAMETER
            )))
        }
    };

    let params = ConstructorParams {
        oxid: request.string(OXID_PARAMETER).map(str::to_string),
        class_params,
        shop_id,
    };

    let statements = factory.get_constructor(class_name).statements(&params)?;
    let mut affected = 0;
    for sql in &statements {
        affected += handler.exec(sql).await?;
    }

    info!(
        "Constructed {} with {} statements ({} rows)",
        class_name,
        statements.len(),
        affected
    );
    Ok(json!({
        "class": class_name,
        "statements": statements.len(),
        "affected_rows": affected,
    }))
}
