//! Application state

use std::sync::Arc;

use crate::config::AppConfig;
use shopfix_core::services::{ServiceConfig, ServiceRegistry};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration passed to every service
    pub services: Arc<ServiceConfig>,
    /// Service lookup by name
    pub registry: Arc<ServiceRegistry>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: &AppConfig) -> Self {
        Self::with_registry(config.service_config(), ServiceRegistry::with_defaults())
    }

    pub fn with_registry(services: ServiceConfig, registry: ServiceRegistry) -> Self {
        Self {
            services: Arc::new(services),
            registry: Arc::new(registry),
        }
    }
}
