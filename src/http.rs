//! Generic HTTP-call helper.
//!
//! Every outbound call of the crate goes through [`call_service`] (or its
//! blocking twin). Transport failures become [`ConfigManagerError::Transport`];
//! the response is returned untouched so callers decide what a good status is.
//! [`ok_body`] applies the Configuration Manager rule: anything but 200 is a
//! [`ConfigManagerError::ProxyError`] carrying the body verbatim.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::{ConfigManagerError, Result};

/// Send one request, optionally with a JSON body.
pub async fn call_service<B>(
    client: &reqwest::Client,
    method: Method,
    url: &str,
    body: Option<&B>,
    timeout: Duration,
) -> Result<reqwest::Response>
where
    B: Serialize + ?Sized,
{
    info!(%method, url, "Sending request");
    let mut builder = client.request(method, url).timeout(timeout);
    if let Some(body) = body {
        builder = builder.json(body);
    }

    match builder.send().await {
        Ok(response) => {
            debug!(url, status = response.status().as_u16(), "Received response");
            Ok(response)
        }
        Err(e) => {
            error!(url, error = %e, "Failed to send request");
            Err(ConfigManagerError::Transport(e))
        }
    }
}

/// Blocking variant of [`call_service`].
pub fn call_service_blocking<B>(
    client: &reqwest::blocking::Client,
    method: Method,
    url: &str,
    body: Option<&B>,
    timeout: Duration,
) -> Result<reqwest::blocking::Response>
where
    B: Serialize + ?Sized,
{
    info!(%method, url, "Sending request");
    let mut builder = client.request(method, url).timeout(timeout);
    if let Some(body) = body {
        builder = builder.json(body);
    }

    match builder.send() {
        Ok(response) => {
            debug!(url, status = response.status().as_u16(), "Received response");
            Ok(response)
        }
        Err(e) => {
            error!(url, error = %e, "Failed to send request");
            Err(ConfigManagerError::Transport(e))
        }
    }
}

/// Body of a 200 response, or `ProxyError` with the status and body text.
///
/// A body that cannot be read is a `Transport` error whatever the status.
pub async fn ok_body(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let url = response.url().to_string();
    if status != StatusCode::OK {
        let message = response.text().await.map_err(|e| {
            error!(url = %url, status = status.as_u16(), error = %e, "Failed to read error response body");
            ConfigManagerError::Transport(e)
        })?;
        error!(url = %url, status = status.as_u16(), body = %message, "Remote service rejected request");
        return Err(ConfigManagerError::ProxyError {
            status: status.as_u16(),
            message,
        });
    }
    let body = response.text().await?;
    info!(url = %url, "Request successful");
    Ok(body)
}

/// Blocking variant of [`ok_body`].
pub fn ok_body_blocking(response: reqwest::blocking::Response) -> Result<String> {
    let status = response.status();
    let url = response.url().to_string();
    if status != StatusCode::OK {
        let message = response.text().map_err(|e| {
            error!(url = %url, status = status.as_u16(), error = %e, "Failed to read error response body");
            ConfigManagerError::Transport(e)
        })?;
        error!(url = %url, status = status.as_u16(), body = %message, "Remote service rejected request");
        return Err(ConfigManagerError::ProxyError {
            status: status.as_u16(),
            message,
        });
    }
    let body = response.text()?;
    info!(url = %url, "Request successful");
    Ok(body)
}

/// Parse a response body into `T`.
pub fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        error!(error = %e, "Response body does not match the requested type");
        ConfigManagerError::Deserialization(e)
    })
}
