//! Async client for the Configuration Manager.

use std::future::Future;

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::{ConfigManagerError, Result};
use crate::http::{call_service, ok_body, parse_body};
use crate::request::{
    ConfigurationRequest, ServiceConfigurationRequest, ServicePairingRequest, ServiceRegistrationRequest,
};
use crate::settings::ClientSettings;

/// Stateless proxy to the Configuration Manager.
///
/// Each call sends exactly one POST and never retries or caches. The client
/// holds only immutable settings and a reference-counted `reqwest::Client`,
/// so clones are cheap and one instance can be shared across tasks.
#[derive(Debug, Clone)]
pub struct ConfigurationManagerClient {
    settings: ClientSettings,
    client: Client,
}

impl ConfigurationManagerClient {
    /// Create a client for the given settings.
    pub fn new(settings: ClientSettings) -> Result<Self> {
        settings.validate()?;
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ConfigManagerError::InvalidSettings(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { settings, client })
    }

    /// Create a client from `CONFIGURATION_MANAGER_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientSettings::from_env()?)
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Announce a service and its configuration. Returns the manager's JSON reply.
    pub async fn register(&self, request: &ServiceRegistrationRequest) -> Result<Map<String, Value>> {
        request.validate()?;
        info!(provider = request.provider(), service = request.service(), "Registering service");
        self.post(&self.settings.register_url(), request).await
    }

    /// Bind `request.service()` to `request.target()`.
    pub async fn pair(&self, request: &ServicePairingRequest) -> Result<Map<String, Value>> {
        request.validate()?;
        info!(
            provider = request.provider(),
            service = request.service(),
            pair_target = request.target(),
            "Pairing service"
        );
        self.post(&self.settings.pair_url(), request).await
    }

    /// Fetch a stored configuration as raw JSON.
    pub async fn get(&self, request: &ServiceConfigurationRequest) -> Result<Map<String, Value>> {
        self.get_as(request).await
    }

    /// Fetch a stored configuration and deserialize it into `T`.
    pub async fn get_as<T: DeserializeOwned>(&self, request: &ServiceConfigurationRequest) -> Result<T> {
        request.validate()?;
        info!(
            provider = request.provider(),
            service = request.service(),
            pair_target = ?request.target(),
            "Fetching service configuration"
        );
        self.post(&self.settings.get_url(), request).await
    }

    /// Dispatch any request variant to its endpoint.
    pub async fn send(&self, request: &ConfigurationRequest) -> Result<Map<String, Value>> {
        match request {
            ConfigurationRequest::Registration(r) => self.register(r).await,
            ConfigurationRequest::Pairing(r) => self.pair(r).await,
            ConfigurationRequest::Configuration(r) => self.get(r).await,
        }
    }

    async fn post<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = call_service(&self.client, Method::POST, url, Some(body), self.settings.timeout).await?;
        let body = ok_body(response).await?;
        parse_body(&body)
    }
}

/// Race `operation` against a caller-supplied cancel signal.
///
/// If `cancel` completes first the operation future is dropped, which aborts
/// its in-flight request, and `ConfigManagerError::Cancelled` is returned.
pub async fn cancellable<T, F, C>(operation: F, cancel: C) -> Result<T>
where
    F: Future<Output = Result<T>>,
    C: Future<Output = ()>,
{
    tokio::select! {
        biased;
        _ = cancel => {
            warn!("Request cancelled before the Configuration Manager replied");
            Err(ConfigManagerError::Cancelled)
        }
        result = operation => result,
    }
}
