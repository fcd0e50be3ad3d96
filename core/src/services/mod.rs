//! Named setup/teardown services
//!
//! A service is looked up by name in a [`ServiceRegistry`] and invoked with
//! a [`ServiceRequest`]. The HTTP server and the bootstrap CLI share the
//! same registry.

pub mod constructor;
pub mod installer;
pub mod object_constructor;
pub mod preparation;
pub mod remove;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

use crate::config::ConnectionParams;
use crate::error::{CoreError, Result};

pub use installer::ShopInstaller;
pub use object_constructor::ShopObjectConstructor;
pub use preparation::ShopPreparation;
pub use remove::RemoveFiles;

/// Result body returned by a service
pub type ServiceResponse = serde_json::Value;

/// Configuration handed to every service when it is built
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Shop installation root
    pub shop_path: PathBuf,
    /// Directory for database dumps and markers
    pub temp_dir: PathBuf,
    /// Shop id used for `oxconfig` rows
    pub shop_id: u32,
    /// Shop database connection
    pub connection: ConnectionParams,
}

/// Parameters of one service call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceRequest {
    parameters: serde_json::Map<String, serde_json::Value>,
}

impl ServiceRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.parameters.insert(name.to_string(), value.into());
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&serde_json::Value> {
        self.parameters.get(name)
    }

    /// String parameter; numbers are not coerced
    pub fn string(&self, name: &str) -> Option<&str> {
        self.parameter(name).and_then(|v| v.as_str())
    }

    /// Loose truthiness as sent by form-encoded callers: `true`, non-zero
    /// numbers and strings other than `""`, `"0"` and `"false"`
    pub fn flag(&self, name: &str) -> bool {
        match self.parameter(name) {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
            Some(serde_json::Value::String(s)) => !matches!(s.as_str(), "" | "0" | "false"),
            _ => false,
        }
    }

    /// A string or an array of strings, flattened into a list
    pub fn strings(&self, name: &str) -> Result<Vec<String>> {
        match self.parameter(name) {
            None | Some(serde_json::Value::Null) => Ok(Vec::new()),
            Some(serde_json::Value::String(s)) => Ok(vec![s.clone()]),
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        CoreError::InvalidParameter(format!("'{}' must contain only strings", name))
                    })
                })
                .collect(),
            Some(_) => Err(CoreError::InvalidParameter(format!(
                "'{}' must be a string or a list of strings",
                name
            ))),
        }
    }
}

/// A unit of test-environment setup or teardown
#[async_trait]
pub trait ShopService: Send + Sync {
    async fn init(&self, request: &ServiceRequest) -> Result<ServiceResponse>;
}

/// Builds a service from the shared configuration
pub type ServiceFactory = fn(&ServiceConfig) -> Box<dyn ShopService>;

/// Maps service names to their factories
pub struct ServiceRegistry {
    factories: BTreeMap<String, ServiceFactory>,
}

impl ServiceRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry with every built-in service
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(RemoveFiles::NAME, RemoveFiles::boxed);
        registry.register(ShopPreparation::NAME, ShopPreparation::boxed);
        registry.register(ShopInstaller::NAME, ShopInstaller::boxed);
        registry.register(ShopObjectConstructor::NAME, ShopObjectConstructor::boxed);
        registry
    }

    pub fn register(&mut self, name: &str, factory: ServiceFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build the service registered under `name`
    pub fn create(&self, name: &str, config: &ServiceConfig) -> Result<Box<dyn ShopService>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| CoreError::UnknownService(name.to_string()))?;
        Ok(factory(config))
    }

    /// Build and run a service in one step
    pub async fn call(
        &self,
        name: &str,
        config: &ServiceConfig,
        request: &ServiceRequest,
    ) -> Result<ServiceResponse> {
        let service = self.create(name, config)?;
        info!("Calling service {}", name);
        service.init(request).await
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
