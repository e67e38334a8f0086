//! Building blocks for services that sit behind the Configuration Manager.
//!
//! [`ServiceProviders`] is the per-service registry of provider handlers and
//! the place a service registers itself from. [`ServiceConnector`] is the
//! consuming side: it asks the manager where a service lives and then calls it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::client::ConfigurationManagerClient;
use crate::error::{ConfigManagerError, Result};
use crate::http::{call_service, ok_body, parse_body};
use crate::request::{ServiceConfigurationRequest, ServiceRegistrationRequest};
use crate::settings::DEFAULT_TIMEOUT_SECS;
use crate::utils::{build_base_url, join_url};

/// Named provider handlers for one service.
pub struct ServiceProviders<P> {
    service_name: String,
    providers: HashMap<String, Arc<P>>,
}

impl<P> ServiceProviders<P> {
    pub fn new(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            providers: HashMap::new(),
        }
    }

    pub fn with_provider(mut self, name: &str, provider: P) -> Self {
        self.insert(name, provider);
        self
    }

    pub fn insert(&mut self, name: &str, provider: P) {
        self.providers.insert(name.to_string(), Arc::new(provider));
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Sorted names of the registered providers.
    pub fn provider_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Handler for `provider`, or `ProviderNotSupported` (503).
    pub fn get_provider(&self, provider: &str) -> Result<Arc<P>> {
        self.providers.get(provider).cloned().ok_or_else(|| {
            warn!(service = %self.service_name, provider, "Provider not supported");
            ConfigManagerError::ProviderNotSupported {
                provider: provider.to_string(),
            }
        })
    }

    /// Register this service with the Configuration Manager.
    pub async fn register_service(
        &self,
        client: &ConfigurationManagerClient,
        provider: &str,
        configuration: Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        info!(service = %self.service_name, provider, "Starting service registration");
        let request = ServiceRegistrationRequest::new(provider, &self.service_name, configuration);
        let response = client.register(&request).await?;
        info!(service = %self.service_name, response = ?response, "Service registration response");
        Ok(response)
    }
}

/// Host and port a service is reachable at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    pub hostname: String,
    pub port: u16,
}

impl ConnectionParams {
    pub fn base_url(&self) -> String {
        build_base_url(&self.hostname, self.port)
    }
}

/// Client-side handle on another service, located through the Configuration Manager.
#[derive(Debug)]
pub struct ServiceConnector {
    service_name: String,
    connection: Option<ConnectionParams>,
    http: reqwest::Client,
    timeout: Duration,
}

impl ServiceConnector {
    pub fn new(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            connection: None,
            http: reqwest::Client::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn connection(&self) -> Option<&ConnectionParams> {
        self.connection.as_ref()
    }

    /// Base URL of the connected service, once set up.
    pub fn url(&self) -> Option<String> {
        self.connection.as_ref().map(ConnectionParams::base_url)
    }

    /// Resolve this service's connection parameters from the manager.
    pub async fn setup_connection(
        &mut self,
        client: &ConfigurationManagerClient,
        provider: &str,
    ) -> Result<&ConnectionParams> {
        let request = ServiceConfigurationRequest::new(provider, &self.service_name);
        let params: ConnectionParams = client.get_as(&request).await?;
        info!(service = %self.service_name, url = %params.base_url(), "Service connection resolved");
        Ok(self.connection.insert(params))
    }

    /// Call the connected service and return its raw response.
    pub async fn call<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let base = self.url().ok_or(ConfigManagerError::NotConnected)?;
        call_service(&self.http, method, &join_url(&base, path), body, self.timeout).await
    }

    /// Call the connected service and parse its 200 JSON reply into `T`.
    pub async fn call_json<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.call(method, path, body).await?;
        let body = ok_body(response).await?;
        parse_body(&body)
    }
}
