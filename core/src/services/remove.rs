//! `Files/Remove` service

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use super::{ServiceConfig, ServiceRequest, ServiceResponse, ShopService};
use crate::error::Result;
use crate::files::remove_paths;

/// Removes the paths listed in the `files` parameter
pub struct RemoveFiles;

impl RemoveFiles {
    pub const NAME: &'static str = "Files/Remove";
    pub const FILES_PARAMETER: &'static str = "files";

    pub fn boxed(_config: &ServiceConfig) -> Box<dyn ShopService> {
        Box::new(Self)
    }
}

#[async_trait]
impl ShopService for RemoveFiles {
    async fn init(&self, request: &ServiceRequest) -> Result<ServiceResponse> {
        let files = request.strings(Self::FILES_PARAMETER)?;
        let removed = remove_paths(&files)?;

        info!("Removed {} of {} requested paths", removed, files.len());
        Ok(json!({ "removed": removed }))
    }
}
