//! Service dispatch handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use shopfix_core::services::{ServiceRequest, ServiceResponse};

/// Service call response
#[derive(Debug, Serialize)]
pub struct CallServiceResponse {
    pub service: String,
    pub result: ServiceResponse,
}

/// Registered service names
#[derive(Debug, Serialize)]
pub struct ServiceListResponse {
    pub services: Vec<String>,
}

/// List registered services
pub async fn list_services(State(state): State<AppState>) -> Json<ServiceListResponse> {
    Json(ServiceListResponse {
        services: state.registry.names().map(str::to_string).collect(),
    })
}

/// Run the named service with the JSON body as its parameters
pub async fn call_service(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<ServiceRequest>,
) -> ApiResult<Json<CallServiceResponse>> {
    let name = name.trim_matches('/').to_string();
    if name.is_empty() {
        return Err(ApiError::BadRequest("service name is required".to_string()));
    }

    info!("Dispatching service {}", name);
    let result = state
        .registry
        .call(&name, &state.services, &request)
        .await?;

    Ok(Json(CallServiceResponse {
        service: name,
        result,
    }))
}
