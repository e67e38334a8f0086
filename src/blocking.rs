//! Blocking client for the Configuration Manager.
//!
//! Same contract as [`crate::ConfigurationManagerClient`], built on
//! `reqwest::blocking` for synchronous services. Do not call it from inside an
//! async runtime thread; use the async client there.

use reqwest::blocking::Client;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::error::{ConfigManagerError, Result};
use crate::http::{call_service_blocking, ok_body_blocking, parse_body};
use crate::request::{
    ConfigurationRequest, ServiceConfigurationRequest, ServicePairingRequest, ServiceRegistrationRequest,
};
use crate::settings::ClientSettings;

#[derive(Debug, Clone)]
pub struct BlockingConfigurationManagerClient {
    settings: ClientSettings,
    client: Client,
}

impl BlockingConfigurationManagerClient {
    pub fn new(settings: ClientSettings) -> Result<Self> {
        settings.validate()?;
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ConfigManagerError::InvalidSettings(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { settings, client })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ClientSettings::from_env()?)
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn register(&self, request: &ServiceRegistrationRequest) -> Result<Map<String, Value>> {
        request.validate()?;
        info!(provider = request.provider(), service = request.service(), "Registering service");
        self.post(&self.settings.register_url(), request)
    }

    pub fn pair(&self, request: &ServicePairingRequest) -> Result<Map<String, Value>> {
        request.validate()?;
        info!(
            provider = request.provider(),
            service = request.service(),
            pair_target = request.target(),
            "Pairing service"
        );
        self.post(&self.settings.pair_url(), request)
    }

    pub fn get(&self, request: &ServiceConfigurationRequest) -> Result<Map<String, Value>> {
        self.get_as(request)
    }

    pub fn get_as<T: DeserializeOwned>(&self, request: &ServiceConfigurationRequest) -> Result<T> {
        request.validate()?;
        info!(
            provider = request.provider(),
            service = request.service(),
            pair_target = ?request.target(),
            "Fetching service configuration"
        );
        self.post(&self.settings.get_url(), request)
    }

    pub fn send(&self, request: &ConfigurationRequest) -> Result<Map<String, Value>> {
        match request {
            ConfigurationRequest::Registration(r) => self.register(r),
            ConfigurationRequest::Pairing(r) => self.pair(r),
            ConfigurationRequest::Configuration(r) => self.get(r),
        }
    }

    fn post<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = call_service_blocking(&self.client, Method::POST, url, Some(body), self.settings.timeout)?;
        let body = ok_body_blocking(response)?;
        parse_body(&body)
    }
}
