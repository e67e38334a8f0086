//! Request payloads sent to the Configuration Manager.
//!
//! Every request names the `provider` the manager should resolve against.
//! The three shapes share that field and are unified under
//! [`ConfigurationRequest`] so one client entry point can dispatch any of them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConfigManagerError, Result};

/// A service announcing itself and its configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ServiceRegistrationRequest {
    provider: String,
    service: String,
    configuration: Map<String, Value>,
}

impl ServiceRegistrationRequest {
    pub fn new(provider: &str, service: &str, configuration: Map<String, Value>) -> Self {
        Self {
            provider: provider.to_string(),
            service: service.to_string(),
            configuration,
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn configuration(&self) -> &Map<String, Value> {
        &self.configuration
    }

    pub fn validate(&self) -> Result<()> {
        require_identity(&self.provider, &self.service)
    }
}

/// Binds the interface exposed by `service` to the consuming `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ServicePairingRequest {
    provider: String,
    service: String,
    target: String,
    configuration: Map<String, Value>,
}

impl ServicePairingRequest {
    pub fn new(provider: &str, service: &str, target: &str, configuration: Map<String, Value>) -> Self {
        Self {
            provider: provider.to_string(),
            service: service.to_string(),
            target: target.to_string(),
            configuration,
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn configuration(&self) -> &Map<String, Value> {
        &self.configuration
    }

    pub fn validate(&self) -> Result<()> {
        require_identity(&self.provider, &self.service)?;
        if self.target.trim().is_empty() {
            return Err(ConfigManagerError::InvalidRequest(
                "pairing target must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Identifies which stored configuration to fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ServiceConfigurationRequest {
    provider: String,
    service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target: Option<String>,
}

impl ServiceConfigurationRequest {
    pub fn new(provider: &str, service: &str) -> Self {
        Self {
            provider: provider.to_string(),
            service: service.to_string(),
            target: None,
        }
    }

    /// Fetch the configuration of a specific pairing instead of the service itself.
    pub fn with_target(mut self, target: &str) -> Self {
        self.target = Some(target.to_string());
        self
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn validate(&self) -> Result<()> {
        require_identity(&self.provider, &self.service)
    }
}

fn require_identity(provider: &str, service: &str) -> Result<()> {
    if provider.trim().is_empty() {
        return Err(ConfigManagerError::InvalidRequest("provider must not be empty".to_string()));
    }
    if service.trim().is_empty() {
        return Err(ConfigManagerError::InvalidRequest("service must not be empty".to_string()));
    }
    Ok(())
}

/// Which endpoint a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Registration,
    Pairing,
    Configuration,
}

/// Any request the Configuration Manager understands.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationRequest {
    Registration(ServiceRegistrationRequest),
    Pairing(ServicePairingRequest),
    Configuration(ServiceConfigurationRequest),
}

impl ConfigurationRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Registration(_) => RequestKind::Registration,
            Self::Pairing(_) => RequestKind::Pairing,
            Self::Configuration(_) => RequestKind::Configuration,
        }
    }

    pub fn provider(&self) -> &str {
        match self {
            Self::Registration(r) => r.provider(),
            Self::Pairing(r) => r.provider(),
            Self::Configuration(r) => r.provider(),
        }
    }

    pub fn service(&self) -> &str {
        match self {
            Self::Registration(r) => r.service(),
            Self::Pairing(r) => r.service(),
            Self::Configuration(r) => r.service(),
        }
    }

    /// Reject requests the manager could never resolve.
    ///
    /// Provider and service must be non-blank; a pairing also needs a target.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Registration(r) => r.validate(),
            Self::Pairing(r) => r.validate(),
            Self::Configuration(r) => r.validate(),
        }
    }

    /// JSON body for the request.
    pub fn to_json(&self) -> Result<Value> {
        let value = match self {
            Self::Registration(r) => serde_json::to_value(r)?,
            Self::Pairing(r) => serde_json::to_value(r)?,
            Self::Configuration(r) => serde_json::to_value(r)?,
        };
        Ok(value)
    }
}

impl From<ServiceRegistrationRequest> for ConfigurationRequest {
    fn from(request: ServiceRegistrationRequest) -> Self {
        Self::Registration(request)
    }
}

impl From<ServicePairingRequest> for ConfigurationRequest {
    fn from(request: ServicePairingRequest) -> Self {
        Self::Pairing(request)
    }
}

impl From<ServiceConfigurationRequest> for ConfigurationRequest {
    fn from(request: ServiceConfigurationRequest) -> Self {
        Self::Configuration(request)
    }
}

/// JSON Schema of a request type, for publishing the wire contract.
pub fn json_schema_for<T: JsonSchema>() -> Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(&schema).unwrap_or_default()
}
