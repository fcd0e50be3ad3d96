//! API handlers

pub mod services;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Database the services operate on
    pub database: String,
    /// Number of registered services
    pub services: usize,
}

/// Health check endpoint; does not touch the database
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database: state.services.connection.database().to_string(),
        services: state.registry.names().count(),
    })
}
